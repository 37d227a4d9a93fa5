//! Common

use crate::PathIntegrator;
use tinsel_core::camera::Camera;
use tinsel_core::error::RenderError;
use tinsel_core::film::Film;
use tinsel_core::geometry::*;
use tinsel_core::integrator::*;
use tinsel_core::options::{Options, RenderMode};
use tinsel_core::sampler::Sampler;
use tinsel_core::scene::Scene;
use tinsel_core::spectrum::*;

/// Positions a sampler at a pixel sample and generates its camera ray.
/// Returns the ray, the filter weight of the sample and the sampler.
///
/// * `camera`       - The camera.
/// * `options`      - Render options.
/// * `resolution`   - Image resolution.
/// * `pixel`        - Pixel coordinates.
/// * `sample_index` - Sample index within the pixel.
pub fn start_sample(
    camera: &Camera,
    options: &Options,
    resolution: (u32, u32),
    pixel: (u32, u32),
    sample_index: u64,
) -> (Ray, Float, Sampler) {
    let mut sampler = Sampler::new(options.seed);
    sampler.start_pixel_sample(pixel, sample_index);

    let (offset, weight) = options.filter.sample(&sampler.get_2d());
    let p_film = Point2f::new(
        pixel.0 as Float + 0.5 + offset.x,
        pixel.1 as Float + 0.5 + offset.y,
    );
    let u_lens = sampler.get_2d();
    let ray = camera.generate_ray(&p_film, resolution.0, resolution.1, &u_lens);
    (ray, weight, sampler)
}

/// Returns the color of a primary ray in the debug render modes.
///
/// * `scene` - The scene.
/// * `mode`  - Render mode.
/// * `ray`   - The primary ray.
pub fn visualize(scene: &Scene, mode: RenderMode, ray: &Ray) -> Spectrum {
    match mode {
        RenderMode::Normals => scene
            .intersect(ray)
            .map_or(Spectrum::ZERO, |isect| normal_to_color(&isect.n_s)),
        RenderMode::Complexity => complexity_to_color(&scene.intersect_with_stats(ray).1),
        RenderMode::PathTrace => Spectrum::ZERO,
    }
}

/// Computes one sample of a pixel in the current render mode. Returns the
/// sanitized radiance and the filter weight.
///
/// * `integrator`   - The path integrator.
/// * `scene`        - The scene.
/// * `camera`       - The camera.
/// * `options`      - Render options.
/// * `resolution`   - Image resolution.
/// * `pixel`        - Pixel coordinates.
/// * `sample_index` - Sample index within the pixel.
pub fn sample_pixel(
    integrator: &PathIntegrator,
    scene: &Scene,
    camera: &Camera,
    options: &Options,
    resolution: (u32, u32),
    pixel: (u32, u32),
    sample_index: u64,
) -> (Spectrum, Float) {
    let (ray, weight, sampler) = start_sample(camera, options, resolution, pixel, sample_index);
    let l = match options.mode {
        RenderMode::PathTrace => integrator.li(scene, &ray, &sampler),
        mode => visualize(scene, mode, &ray),
    };
    (sanitize_radiance(l, options.clamp), weight)
}

/// Returns the number of samples per pixel the next batch adds, honouring the
/// sample budget. 0 means the film is complete.
///
/// * `options` - Render options.
/// * `film`    - The accumulation buffer.
pub fn batch_samples(options: &Options, film: &Film) -> u64 {
    let batch = options.samples_per_batch.max(1) as u64;
    match options.max_samples {
        Some(max) => min(batch, max.saturating_sub(film.samples())),
        None => batch,
    }
}

/// Validates that a renderer was initialized for the resolution of `film`.
///
/// * `resolution` - Resolution passed to `Renderer::init()`.
/// * `film`       - The accumulation buffer.
pub fn check_resolution(resolution: Option<(u32, u32)>, film: &Film) -> Result<(u32, u32), RenderError> {
    let expected = resolution.ok_or(RenderError::NotInitialized)?;
    let actual = film.resolution();
    if expected != actual {
        return Err(RenderError::SizeMismatch { expected, actual });
    }
    Ok(expected)
}

/// Validates a resolution passed to `Renderer::init()`.
///
/// * `width`  - Image width.
/// * `height` - Image height.
pub fn check_init(width: u32, height: u32) -> Result<(u32, u32), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::Backend(format!("invalid resolution {width}x{height}")));
    }
    Ok((width, height))
}

/// Validates the options passed to `Renderer::render()`.
///
/// * `options` - Render options.
pub fn check_options(options: &Options) -> Result<(), RenderError> {
    if !options.filter.is_valid() {
        return Err(RenderError::Backend(format!("invalid filter {:?}", options.filter)));
    }
    Ok(())
}

/// Returns the number of worker threads to use; 0 selects one per logical
/// CPU and larger requests are clamped to it.
///
/// * `threads` - Requested thread count.
pub fn worker_count(threads: usize) -> usize {
    let max_threads = num_cpus::get().max(1);
    match threads {
        0 => max_threads,
        n if n > max_threads => {
            warn!("Num threads {} > max logical CPUs {}", n, max_threads);
            max_threads
        }
        n => n,
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
