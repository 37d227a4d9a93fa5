//! BSDF

use super::*;
use crate::material::Material;
use crate::sampler::Sampler;

/// The material model placed at a surface point. Converts world space
/// directions into the local shading frame and rejects configurations that
/// cross the geometric surface.
#[derive(Copy, Clone, Debug)]
pub struct BSDF {
    /// Shading frame; `frame.n` is the shading normal.
    pub frame: Frame,

    /// The geometric normal, oriented to the same side as the shading normal.
    pub ng: Vector3f,

    /// The reflection model.
    pub brdf: DisneyBRDF,
}

impl BSDF {
    /// Creates a new `BSDF`. Both normals must be unit length and face the
    /// outgoing direction.
    ///
    /// * `ns`       - Shading normal.
    /// * `ng`       - Geometric normal.
    /// * `tangent`  - Preferred tangent for anisotropy.
    /// * `material` - The material parameters.
    pub fn new(ns: &Vector3f, ng: &Vector3f, tangent: &Vector3f, material: &Material) -> Self {
        Self {
            frame: Frame::from_normal_tangent(ns, tangent),
            ng: *ng,
            brdf: DisneyBRDF::new(material),
        }
    }

    /// Returns true if both directions lie above the geometric surface.
    fn above_surface(&self, wo: &Vector3f, wi: &Vector3f) -> bool {
        wo.dot(&self.ng) > 0.0 && wi.dot(&self.ng) > 0.0
    }

    /// Evaluates the BSDF for a pair of world space unit directions and returns
    /// its value with the combined sampling pdf. Returns zero for directions
    /// below the surface or degenerate inputs.
    ///
    /// * `wo` - Outgoing direction (towards the viewer).
    /// * `wi` - Incident direction (towards the light).
    pub fn evaluate(&self, wo: &Vector3f, wi: &Vector3f) -> (Spectrum, Float) {
        if !wo.is_finite() || !wi.is_finite() || !self.above_surface(wo, wi) {
            return (Spectrum::ZERO, 0.0);
        }
        let wo_l = self.frame.to_local(wo);
        let wi_l = self.frame.to_local(wi);
        if cos_theta(&wo_l) <= 0.0 || cos_theta(&wi_l) <= 0.0 {
            return (Spectrum::ZERO, 0.0);
        }
        (self.brdf.f(&wo_l, &wi_l), self.brdf.pdf(&wo_l, &wi_l))
    }

    /// Returns the combined pdf of sampling `wi` given `wo`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if !wo.is_finite() || !wi.is_finite() || !self.above_surface(wo, wi) {
            return 0.0;
        }
        self.brdf
            .pdf(&self.frame.to_local(wo), &self.frame.to_local(wi))
    }

    /// Importance samples an incident direction. Returns `None` if the
    /// configuration is degenerate or the sample carries no energy.
    ///
    /// * `wo`      - Outgoing direction.
    /// * `sampler` - The sampler.
    pub fn sample(&self, wo: &Vector3f, sampler: &mut Sampler) -> Option<BSDFSample> {
        if !wo.is_finite() || wo.dot(&self.ng) <= 0.0 {
            return None;
        }
        let wo_l = self.frame.to_local(wo);
        let (wi_l, f, pdf, lobe) = self.brdf.sample_f(&wo_l, sampler)?;
        let wi = self.frame.from_local(&wi_l);
        if wi.dot(&self.ng) <= 0.0 {
            return None;
        }
        Some(BSDFSample::new(wi, f, cos_theta(&wi_l), pdf, lobe))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RNG;
    use float_cmp::approx_eq;

    fn unit_z() -> Vector3f {
        Vector3f::new(0.0, 0.0, 1.0)
    }

    fn uniform_hemisphere(rng: &mut RNG) -> Vector3f {
        let z = rng.uniform_float();
        let r = safe_sqrt(1.0 - z * z);
        let phi = TWO_PI * rng.uniform_float();
        Vector3f::new(r * phi.cos(), r * phi.sin(), z)
    }

    fn test_materials() -> Vec<Material> {
        vec![
            Material::diffuse(Spectrum::ONE),
            Material::default(),
            Material::metal(Spectrum::ONE, 0.05),
            Material::metal(Spectrum::from_rgb(0.9, 0.6, 0.3), 0.6),
            Material {
                roughness: 0.2,
                clearcoat: 1.0,
                sheen: 1.0,
                ..Material::diffuse(Spectrum::ONE)
            },
            Material {
                roughness: 0.4,
                anisotropic: 1.0,
                specular: 1.0,
                subsurface: 1.0,
                ..Material::default()
            },
            saturated_specular(0.1),
            saturated_specular(0.3),
            saturated_specular(0.6),
        ]
    }

    /// Fully tinted specular over a saturated base color.
    fn saturated_specular(roughness: Float) -> Material {
        Material {
            base_color: Spectrum::from_rgb(0.0, 0.0, 1.0),
            metallic: 0.0,
            roughness,
            specular: 1.0,
            specular_tint: 1.0,
            ..Material::default()
        }
    }

    fn random_material(rng: &mut RNG) -> Material {
        Material {
            base_color: Spectrum::from_rgb(rng.uniform_float(), rng.uniform_float(), rng.uniform_float()),
            metallic: rng.uniform_float(),
            roughness: rng.uniform_float(),
            specular: rng.uniform_float(),
            specular_tint: rng.uniform_float(),
            anisotropic: rng.uniform_float(),
            sheen: rng.uniform_float(),
            sheen_tint: rng.uniform_float(),
            clearcoat: rng.uniform_float(),
            clearcoat_gloss: rng.uniform_float(),
            subsurface: rng.uniform_float(),
            emission: Spectrum::ZERO,
        }
    }

    #[test]
    fn reciprocity() {
        let mut rng = RNG::new(7);
        let n = unit_z();
        let tangent = Vector3f::new(1.0, 0.0, 0.0);
        for _ in 0..1000 {
            let bsdf = BSDF::new(&n, &n, &tangent, &random_material(&mut rng));
            let wo = uniform_hemisphere(&mut rng);
            let wi = uniform_hemisphere(&mut rng);
            let (f1, _) = bsdf.evaluate(&wo, &wi);
            let (f2, _) = bsdf.evaluate(&wi, &wo);
            for c in 0..3 {
                let tol = 1e-4 * max(1.0, max(f1[c], f2[c]));
                assert!(
                    (f1[c] - f2[c]).abs() <= tol,
                    "f(wo, wi) = {:?} but f(wi, wo) = {:?}",
                    f1,
                    f2
                );
            }
        }
    }

    #[test]
    fn energy_bound() {
        // Directional albedo ∫ f cos θi dωi estimated by importance sampling.
        let n = unit_z();
        let tangent = Vector3f::new(1.0, 0.0, 0.0);
        let samples = 50_000;
        for material in test_materials() {
            let bsdf = BSDF::new(&n, &n, &tangent, &material);
            for &cos_o in [0.3, 0.6, 1.0].iter() {
                let wo = Vector3f::new(safe_sqrt(1.0 - cos_o * cos_o), 0.0, cos_o);
                let mut sampler = Sampler::new(11);
                sampler.start_pixel_sample((0, 0), 0);
                let mut albedo = Spectrum::ZERO;
                for _ in 0..samples {
                    if let Some(s) = bsdf.sample(&wo, &mut sampler) {
                        albedo += s.weight;
                    }
                }
                albedo /= samples as Float;
                assert!(
                    albedo.max_component_value() <= 1.05,
                    "albedo {:?} for {:?} at cos {}",
                    albedo,
                    material,
                    cos_o
                );
            }
        }
    }

    #[test]
    fn saturated_specular_albedo_is_bounded() {
        // Uniform hemisphere estimate so the check does not depend on the
        // sampling routine being correct.
        let n = unit_z();
        let tangent = Vector3f::new(1.0, 0.0, 0.0);
        let cos_o: Float = 0.8;
        let wo = Vector3f::new(safe_sqrt(1.0 - cos_o * cos_o), 0.0, cos_o);
        let samples = 200_000;
        for &roughness in [0.1, 0.3, 0.6].iter() {
            let bsdf = BSDF::new(&n, &n, &tangent, &saturated_specular(roughness));
            let mut rng = RNG::new(3);
            let mut albedo = Spectrum::ZERO;
            for _ in 0..samples {
                let wi = uniform_hemisphere(&mut rng);
                let (f, _) = bsdf.evaluate(&wo, &wi);
                albedo += f * (wi.z * TWO_PI);
            }
            albedo /= samples as Float;
            for c in 0..3 {
                assert!(
                    albedo[c] <= 1.05,
                    "channel {} albedo {:?} at roughness {}",
                    c,
                    albedo,
                    roughness
                );
            }
        }
    }

    #[test]
    fn below_geometric_surface_is_rejected() {
        let ns = Vector3f::new(0.3, 0.0, 1.0).normalize();
        let ng = unit_z();
        let bsdf = BSDF::new(&ns, &ng, &Vector3f::new(1.0, 0.0, 0.0), &Material::default());

        // Above the shading hemisphere but below the geometric surface.
        let wi = Vector3f::new(0.99, 0.0, -0.05).normalize();
        let wo = unit_z();
        assert!(bsdf.evaluate(&wo, &wi).0.is_black());
        assert_eq!(bsdf.pdf(&wo, &wi), 0.0);
        assert!(bsdf.sample(&-wo, &mut Sampler::new(0)).is_none());
    }

    #[test]
    fn sample_matches_evaluate() {
        let mut rng = RNG::new(5);
        let mut sampler = Sampler::new(5);
        let n = unit_z();
        let tangent = Vector3f::new(1.0, 0.0, 0.0);
        for _ in 0..500 {
            let bsdf = BSDF::new(&n, &n, &tangent, &random_material(&mut rng));
            let wo = uniform_hemisphere(&mut rng);
            if let Some(s) = bsdf.sample(&wo, &mut sampler) {
                let (f, pdf) = bsdf.evaluate(&wo, &s.wi);
                assert!(s.pdf > 0.0);
                assert!(approx_eq!(Float, pdf, s.pdf, epsilon = 1e-4 * max(1.0, pdf)));
                assert!(approx_eq!(Float, f[0], s.f[0], epsilon = 1e-4 * max(1.0, f[0])));
                assert!(!s.weight.has_nans());
            }
        }
    }
}
