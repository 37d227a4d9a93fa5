//! Image I/O

use image::{ImageBuffer, ImageFormat, Rgb};
use tinsel_core::pbrt::*;
use tinsel_core::spectrum::*;

/// Extended Reinhard tone map of luminance with white point `limit`; the
/// color is scaled to preserve its hue.
///
/// * `rgb`   - Linear radiance.
/// * `limit` - Luminance that maps to 1.
pub fn tonemap(rgb: &Spectrum, limit: Float) -> Spectrum {
    let l = rgb.y();
    if l <= 0.0 {
        return Spectrum::ZERO;
    }
    let white_sq = sqr(max(limit, 1e-3));
    let mapped = l * (1.0 + l / white_sq) / (1.0 + l);
    *rgb * (mapped / l)
}

/// Converts linear radiance to 8-bit sRGB after exposure and tone mapping.
///
/// * `rgb`      - Linear radiance.
/// * `exposure` - Exposure multiplier.
/// * `limit`    - White point of the tone map.
pub fn to_srgb8(rgb: &Spectrum, exposure: Float, limit: Float) -> [u8; 3] {
    let c = tonemap(&(*rgb * exposure), limit).to_rgb();
    [clamp_byte(c[0]), clamp_byte(c[1]), clamp_byte(c[2])]
}

/// Clamp floating point value to 8-bit range [0, 255].
///
/// * `v` - Value to clamp.
#[inline]
fn clamp_byte(v: Float) -> u8 {
    clamp(255.0 * gamma_correct(v) + 0.5, 0.0, 255.0) as u8
}

/// Writes resolved pixels as an 8-bit PNG.
///
/// * `path`     - Output file path.
/// * `pixels`   - Per-pixel means in row-major order.
/// * `width`    - Image width.
/// * `height`   - Image height.
/// * `exposure` - Exposure multiplier.
/// * `limit`    - White point of the tone map.
pub fn write_png(
    path: &str,
    pixels: &[Spectrum],
    width: u32,
    height: u32,
    exposure: Float,
    limit: Float,
) -> Result<(), String> {
    if pixels.len() != width as usize * height as usize {
        return Err(format!("{} pixels do not fill a {width}x{height} image", pixels.len()));
    }
    info!("Writing image {path} with resolution {width}x{height}");

    let imgbuf = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb(to_srgb8(&pixels[(y * width + x) as usize], exposure, limit))
    });

    imgbuf
        .save_with_format(path, ImageFormat::Png)
        .map_err(|err| format!("Error saving output image {path}: {err}."))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
