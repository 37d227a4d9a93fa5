//! Material

use crate::pbrt::*;
use crate::spectrum::*;

/// Parameters of the layered material model. Every scalar parameter lives in
/// [0, 1]; `Material::sanitized` enforces this before shading.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    /// Diffuse albedo for dielectrics and reflectance at normal incidence for
    /// metals.
    pub base_color: Spectrum,

    /// Blend between dielectric (0) and metallic (1) behaviour.
    pub metallic: Float,

    /// Perceptual roughness of the specular lobe.
    pub roughness: Float,

    /// Dielectric specular amount; 0.5 corresponds to an index of refraction
    /// of 1.5.
    pub specular: Float,

    /// Tints the dielectric specular towards the base color.
    pub specular_tint: Float,

    /// Stretches the specular highlight along the tangent.
    pub anisotropic: Float,

    /// Grazing retro-reflection for cloth-like surfaces.
    pub sheen: Float,

    /// Tints the sheen towards the base color.
    pub sheen_tint: Float,

    /// Strength of the clearcoat layer.
    pub clearcoat: Float,

    /// Glossiness of the clearcoat layer; 1 is a sharp highlight.
    pub clearcoat_gloss: Float,

    /// Blend between the diffuse lobe and a flattened subsurface
    /// approximation.
    pub subsurface: Float,

    /// Radiance emitted from the front side of the surface.
    pub emission: Spectrum,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Spectrum::new(0.82),
            metallic: 0.0,
            roughness: 0.5,
            specular: 0.5,
            specular_tint: 0.0,
            anisotropic: 0.0,
            sheen: 0.0,
            sheen_tint: 0.0,
            clearcoat: 0.0,
            clearcoat_gloss: 1.0,
            subsurface: 0.0,
            emission: Spectrum::ZERO,
        }
    }
}

impl Material {
    /// Returns a rough dielectric with the given albedo.
    ///
    /// * `base_color` - Diffuse albedo.
    pub fn diffuse(base_color: Spectrum) -> Self {
        Self {
            base_color,
            roughness: 1.0,
            specular: 0.0,
            ..Default::default()
        }
    }

    /// Returns a metal.
    ///
    /// * `base_color` - Reflectance at normal incidence.
    /// * `roughness`  - Perceptual roughness.
    pub fn metal(base_color: Spectrum, roughness: Float) -> Self {
        Self {
            base_color,
            metallic: 1.0,
            roughness,
            ..Default::default()
        }
    }

    /// Returns a black-bodied emitter.
    ///
    /// * `emission` - Emitted radiance.
    pub fn emissive(emission: Spectrum) -> Self {
        Self {
            base_color: Spectrum::ZERO,
            specular: 0.0,
            roughness: 1.0,
            emission,
            ..Default::default()
        }
    }

    /// Returns true if the surface emits light.
    pub fn is_emissive(&self) -> bool {
        !self.emission.is_black()
    }

    /// Returns a copy with every parameter clamped into its valid range and
    /// non-finite values replaced by 0.
    pub fn sanitized(&self) -> Self {
        let unit = |v: Float| if v.is_finite() { clamp(v, 0.0, 1.0) } else { 0.0 };
        let positive = |v: Float| if v.is_finite() { max(v, 0.0) } else { 0.0 };
        Self {
            base_color: self.base_color.map(unit),
            metallic: unit(self.metallic),
            roughness: unit(self.roughness),
            specular: unit(self.specular),
            specular_tint: unit(self.specular_tint),
            anisotropic: unit(self.anisotropic),
            sheen: unit(self.sheen),
            sheen_tint: unit(self.sheen_tint),
            clearcoat: unit(self.clearcoat),
            clearcoat_gloss: unit(self.clearcoat_gloss),
            subsurface: unit(self.subsurface),
            emission: self.emission.map(positive),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
