//! Generalized Trowbridge-Reitz (γ = 1) distribution used by clearcoat.

use super::MicrofacetDistribution;
use crate::geometry::*;
use crate::reflection::*;

/// Fixed masking roughness of the clearcoat layer.
pub const CLEARCOAT_MASKING_ALPHA: Float = 0.25;

/// Isotropic GTR1 ("Berry") distribution. Its long tails give clearcoat the
/// characteristic haze; masking uses Smith GGX with a fixed alpha.
#[derive(Copy, Clone, Debug)]
pub struct Gtr1Distribution {
    /// Distribution alpha.
    alpha: Float,
}

impl Gtr1Distribution {
    /// Create a new `Gtr1Distribution` from the clearcoat gloss parameter.
    /// Gloss 0 maps to alpha 0.1 and gloss 1 to alpha 0.001.
    ///
    /// * `gloss` - Clearcoat gloss in [0, 1].
    pub fn from_gloss(gloss: Float) -> Self {
        Self {
            alpha: lerp(clamp(gloss, 0.0, 1.0), 0.1, 0.001),
        }
    }
}

impl MicrofacetDistribution for Gtr1Distribution {
    fn get_sample_visible_area(&self) -> bool {
        false
    }

    fn d(&self, wh: &Vector3f) -> Float {
        let a2 = self.alpha * self.alpha;
        let cos2 = cos_2_theta(wh);
        let t = 1.0 + (a2 - 1.0) * cos2;
        (a2 - 1.0) / (PI * a2.ln() * t)
    }

    fn lambda(&self, w: &Vector3f) -> Float {
        let abs_tan_theta = tan_theta(w).abs();
        if abs_tan_theta.is_infinite() || abs_tan_theta.is_nan() {
            0.0
        } else {
            let a = CLEARCOAT_MASKING_ALPHA * abs_tan_theta;
            (-1.0 + (1.0 + a * a).sqrt()) / 2.0
        }
    }

    /// Samples `D(wh) cos θh` directly.
    fn sample_wh(&self, wo: &Vector3f, u: &Point2f) -> Vector3f {
        let a2 = self.alpha * self.alpha;
        let cos_theta = safe_sqrt((1.0 - a2.powf(1.0 - u.x)) / (1.0 - a2));
        let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
        let wh = spherical_direction(sin_theta, cos_theta, TWO_PI * u.y);
        if same_hemisphere(wo, &wh) {
            wh
        } else {
            -wh
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
