//! Reflection and surface scattering models

use crate::geometry::*;
use crate::spectrum::*;

mod bsdf;
mod bsdf_sample;
mod common;
mod disney;

// Re-export
pub use bsdf::*;
pub use bsdf_sample::*;
pub use common::*;
pub use disney::*;

/// The lobes of the material model.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lobe {
    /// Fresnel-weighted retro-reflective diffuse term with sheen.
    Diffuse,

    /// Anisotropic GGX specular term.
    Specular,

    /// Fixed-roughness clearcoat term.
    Clearcoat,
}
