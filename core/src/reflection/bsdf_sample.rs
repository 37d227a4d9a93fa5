//! BSDF Sample

use super::*;

/// Result of importance sampling the BSDF.
#[derive(Copy, Clone, Debug)]
pub struct BSDFSample {
    /// The sampled incident direction in world space.
    pub wi: Vector3f,

    /// BSDF value for the sampled pair of directions.
    pub f: Spectrum,

    /// `f * |cos θi| / pdf`.
    pub weight: Spectrum,

    /// Combined density of all lobes for `wi`, with respect to solid angle.
    pub pdf: Float,

    /// The lobe that produced `wi`.
    pub lobe: Lobe,
}

impl BSDFSample {
    /// Create a new `BSDFSample`.
    ///
    /// * `wi`     - The sampled incident direction.
    /// * `f`      - BSDF value.
    /// * `cos_i`  - Absolute cosine of `wi` with the shading normal.
    /// * `pdf`    - Combined pdf; must be positive.
    /// * `lobe`   - The sampled lobe.
    pub fn new(wi: Vector3f, f: Spectrum, cos_i: Float, pdf: Float, lobe: Lobe) -> Self {
        Self {
            wi,
            f,
            weight: f * (cos_i / pdf),
            pdf,
            lobe,
        }
    }
}
