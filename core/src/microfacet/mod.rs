//! Microfacet Distribution Models

use crate::geometry::*;
use crate::reflection::*;

mod gtr1;
mod trowbridge_reitz;

// Re-exports
pub use gtr1::*;
pub use trowbridge_reitz::*;

/// Interface for microfacet distribution models. Directions are expressed in
/// the local shading frame with the normal along `+z`.
pub trait MicrofacetDistribution {
    /// Returns whether `sample_wh` samples only the visible microfacets.
    fn get_sample_visible_area(&self) -> bool;

    /// Return the differential area of microfacets oriented with the surface
    /// normal `wh`.
    ///
    /// * `wh` - A sample normal from the distrubition of normal vectors.
    fn d(&self, wh: &Vector3f) -> Float;

    /// Returns the invisible masked microfacet area per visible microfacet area.
    ///
    /// * `w` - The direction from camera/viewer.
    fn lambda(&self, w: &Vector3f) -> Float;

    /// Evaluates Smith's masking-shadowing function which gives the fraction of
    /// microfacets that are visible from a given direction.
    ///
    /// * `w` - The direction from camera/viewer.
    fn g1(&self, w: &Vector3f) -> Float {
        1.0 / (1.0 + self.lambda(w))
    }

    /// Returns the fraction of microfacets in a differential area that are
    /// visible from both directions `wo` and `wi`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    fn g(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        1.0 / (1.0 + self.lambda(wo) + self.lambda(wi))
    }

    /// Returns a sample from the distribution of normal vectors.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    fn sample_wh(&self, wo: &Vector3f, u: &Point2f) -> Vector3f;

    /// Evaluates the PDF for the given outgoing direction and sampled surface
    /// normal.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wh` - A sample normal from the distrubition of normal vectors.
    fn pdf(&self, wo: &Vector3f, wh: &Vector3f) -> Float {
        if self.get_sample_visible_area() {
            let cos_o = abs_cos_theta(wo);
            if cos_o == 0.0 {
                return 0.0;
            }
            self.d(wh) * self.g1(wo) * wo.abs_dot(wh) / cos_o
        } else {
            self.d(wh) * abs_cos_theta(wh)
        }
    }

    /// Returns the density of the reflected direction `wi` given `wo`, which
    /// includes the Jacobian of the half-vector reflection mapping.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    fn reflection_pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if !same_hemisphere(wo, wi) {
            return 0.0;
        }
        match (*wo + *wi).try_normalize() {
            Some(wh) => {
                let wh = wh.face_forward(&Vector3f::new(0.0, 0.0, 1.0));
                let wo_dot_wh = wo.abs_dot(&wh);
                if wo_dot_wh == 0.0 {
                    0.0
                } else {
                    self.pdf(wo, &wh) / (4.0 * wo_dot_wh)
                }
            }
            None => 0.0,
        }
    }
}
