//! Trowbridge-Reitz (GGX) Distribution

use super::MicrofacetDistribution;
use crate::geometry::*;
use crate::reflection::*;

/// Smallest alpha used by the GGX lobe; keeps the distribution finite for
/// perfectly smooth materials.
pub const MIN_ALPHA: Float = 0.001;

/// Implements the anisotropic variant of the Trowbridge-Reitz distribution
/// with sampling of the visible normals.
#[derive(Copy, Clone, Debug, Default)]
pub struct TrowbridgeReitzDistribution {
    /// For microfacets oriented perpendicular to the x-axis and where
    /// α = sqrt(2) * σ and σ is the RMS slope of microfacets.
    alpha_x: Float,

    /// For microfacets oriented perpendicular to the y-axis and where
    /// α = sqrt(2) * σ and σ is the RMS slope of microfacets.
    alpha_y: Float,
}

impl TrowbridgeReitzDistribution {
    /// Create a new `TrowbridgeReitzDistribution`.
    ///
    /// * `alpha_x` - Roughness along the tangent.
    /// * `alpha_y` - Roughness along the bitangent.
    pub fn new(alpha_x: Float, alpha_y: Float) -> Self {
        Self {
            alpha_x: max(MIN_ALPHA, alpha_x),
            alpha_y: max(MIN_ALPHA, alpha_y),
        }
    }

    /// Maps perceptual roughness and anisotropy in [0, 1] to alpha values.
    /// Anisotropy stretches the lobe along the tangent.
    ///
    /// * `roughness`   - Roughness parameter value.
    /// * `anisotropic` - Anisotropy parameter value.
    pub fn from_roughness(roughness: Float, anisotropic: Float) -> Self {
        let aspect = (1.0 - 0.9 * clamp(anisotropic, 0.0, 1.0)).sqrt();
        let r2 = sqr(clamp(roughness, 0.0, 1.0));
        Self::new(r2 / aspect, r2 * aspect)
    }

    /// Returns the alpha values along the tangent and bitangent.
    pub fn alpha(&self) -> (Float, Float) {
        (self.alpha_x, self.alpha_y)
    }
}

impl MicrofacetDistribution for TrowbridgeReitzDistribution {
    fn get_sample_visible_area(&self) -> bool {
        true
    }

    /// Return the differential area of microfacets oriented with the surface
    /// normal `wh`.
    ///
    /// * `wh` - A sample normal from the distrubition of normal vectors.
    #[rustfmt::skip]
    fn d(&self, wh: &Vector3f) -> Float {
        let tan2_theta = tan_2_theta(wh);
        if tan2_theta.is_infinite() || tan2_theta.is_nan() {
            0.0
        } else {
            let cos4_theta = cos_2_theta(wh) * cos_2_theta(wh);
            let e =
                (cos_2_phi(wh) / (self.alpha_x * self.alpha_x) +
                 sin_2_phi(wh) / (self.alpha_y * self.alpha_y)) *
                tan2_theta;
            1.0 / (PI * self.alpha_x * self.alpha_y * cos4_theta * (1.0 + e) * (1.0 + e))
        }
    }

    /// Returns the invisible masked microfacet area per visible microfacet area.
    ///
    /// * `w` - The direction from camera/viewer.
    #[rustfmt::skip]
    fn lambda(&self, w: &Vector3f) -> Float {
        let abs_tan_theta = tan_theta(w).abs();
        if abs_tan_theta.is_infinite() || abs_tan_theta.is_nan() {
            0.0
        } else {
            // Compute `alpha` for direction `w`.
            let alpha = (cos_2_phi(w) * self.alpha_x * self.alpha_x +
                         sin_2_phi(w) * self.alpha_y * self.alpha_y).sqrt();
            let alpha2_tan2_theta = (alpha * abs_tan_theta) * (alpha * abs_tan_theta);
            (-1.0 + (1.0 + alpha2_tan2_theta).sqrt()) / 2.0
        }
    }

    /// Returns a sample from the distribution of visible normals.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    fn sample_wh(&self, wo: &Vector3f, u: &Point2f) -> Vector3f {
        let flip = wo.z < 0.0;
        let wo_up = if flip { -(*wo) } else { *wo };
        let wh = trowbridge_reitz_sample(&wo_up, self.alpha_x, self.alpha_y, u.x, u.y);
        if flip {
            -wh
        } else {
            wh
        }
    }
}

/// Samples slopes of the visible normals of the isotropic unit-roughness
/// distribution.
///
/// * `cos_theta` - Cosine of the angle θ measured from the incident direction
///                 to the z-axis.
/// * `u1`        - The uniform random value.
/// * `u2`        - The uniform random value.
fn trowbridge_reitz_sample_11(cos_theta: Float, u1: Float, u2: Float) -> (Float, Float) {
    // special case (normal incidence)
    if cos_theta > 0.9999 {
        let r = (u1 / (1.0 - u1)).sqrt();
        let phi = TWO_PI * u2;
        return (r * phi.cos(), r * phi.sin());
    }

    let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
    let tan_theta = sin_theta / cos_theta;
    let a = 1.0 / tan_theta;
    let g1 = 2.0 / (1.0 + (1.0 + 1.0 / (a * a)).sqrt());

    // Sample slope_x.
    let a = 2.0 * u1 / g1 - 1.0;
    let tmp = min(1.0 / (a * a - 1.0), 1e10);
    let b = tan_theta;
    let d = safe_sqrt(b * b * tmp * tmp - (a * a - b * b) * tmp);
    let slope_x_1 = b * tmp - d;
    let slope_x_2 = b * tmp + d;
    let slope_x = if a < 0.0 || slope_x_2 > 1.0 / tan_theta {
        slope_x_1
    } else {
        slope_x_2
    };

    // Sample slope_y.
    let (s, u2) = if u2 > 0.5 {
        (1.0, 2.0 * (u2 - 0.5))
    } else {
        (-1.0, 2.0 * (0.5 - u2))
    };
    let z = (u2 * (u2 * (u2 * 0.27385 - 0.73369) + 0.46341))
        / (u2 * (u2 * (u2 * 0.093073 + 0.309420) - 1.000000) + 0.597999);
    let slope_y = s * z * (1.0 + slope_x * slope_x).sqrt();

    (slope_x, slope_y)
}

/// Samples a visible normal by stretching the configuration to unit
/// roughness, sampling slopes there and unstretching.
///
/// * `wi`      - Incident direction in the upper hemisphere.
/// * `alpha_x` - Roughness along the tangent.
/// * `alpha_y` - Roughness along the bitangent.
/// * `u1`      - The uniform random value.
/// * `u2`      - The uniform random value.
fn trowbridge_reitz_sample(
    wi: &Vector3f,
    alpha_x: Float,
    alpha_y: Float,
    u1: Float,
    u2: Float,
) -> Vector3f {
    // 1. Stretch wi.
    let wi_stretched = Vector3f::new(alpha_x * wi.x, alpha_y * wi.y, wi.z).normalize();

    // 2. Simulate P22_{wi}(x_slope, y_slope, 1, 1)
    let (mut slope_x, mut slope_y) = trowbridge_reitz_sample_11(cos_theta(&wi_stretched), u1, u2);

    // 3. Rotate.
    let tmp = cos_phi(&wi_stretched) * slope_x - sin_phi(&wi_stretched) * slope_y;
    slope_y = sin_phi(&wi_stretched) * slope_x + cos_phi(&wi_stretched) * slope_y;
    slope_x = tmp;

    // 4. Unstretch.
    slope_x *= alpha_x;
    slope_y *= alpha_y;

    // 5. Compute normal.
    Vector3f::new(-slope_x, -slope_y, 1.0).normalize()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
