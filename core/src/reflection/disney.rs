//! Layered physically-based BRDF (diffuse, specular, clearcoat, sheen).

use super::*;
use crate::material::Material;
use crate::microfacet::*;
use crate::sampler::Sampler;
use crate::sampling::cosine_hemisphere_pdf;

/// Fraction of energy the clearcoat layer can take at full strength.
const CLEARCOAT_SCALE: Float = 0.25;

/// Reflectance of the clearcoat layer at normal incidence (IOR 1.5).
const CLEARCOAT_F0: Float = 0.04;

/// Smallest selection weight of the specular lobe. Every lobe that can be
/// non-zero must be selectable or the estimator loses energy.
const MIN_SPECULAR_WEIGHT: Float = 0.02;

/// The material model evaluated in the local shading frame where the normal
/// is `+z`. Directions below the surface yield zero.
///
/// The model mixes the lobes so that reflectance never exceeds 1:
///
/// f = c·f_clearcoat + (1 - c)·[f_specular + (1 - m)·(1 - Fd(θi))(1 - Fd(θo))·f_diffuse]
///
/// where `c` is the clearcoat weight, `m` is metallic and `Fd` is the
/// dielectric Fresnel term of the specular layer.
#[derive(Copy, Clone, Debug)]
pub struct DisneyBRDF {
    /// Base color.
    base_color: Spectrum,

    /// Metallic blend.
    metallic: Float,

    /// Perceptual roughness.
    roughness: Float,

    /// Subsurface blend.
    subsurface: Float,

    /// Specular reflectance at normal incidence.
    spec0: Spectrum,

    /// Reflectance at normal incidence of the dielectric layer, at most 1
    /// per channel.
    dielectric_spec0: Spectrum,

    /// Sheen color including its strength.
    sheen_color: Spectrum,

    /// Clearcoat layer weight.
    clearcoat_weight: Float,

    /// Specular microfacet distribution.
    specular: TrowbridgeReitzDistribution,

    /// Clearcoat microfacet distribution.
    clearcoat: Gtr1Distribution,
}

/// Lobe selection probabilities for an outgoing direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LobeWeights {
    /// Probability of sampling the diffuse lobe.
    pub diffuse: Float,

    /// Probability of sampling the specular lobe.
    pub specular: Float,

    /// Probability of sampling the clearcoat lobe.
    pub clearcoat: Float,
}

impl DisneyBRDF {
    /// Create a new `DisneyBRDF` from material parameters.
    ///
    /// * `material` - The material; parameters are clamped into range.
    pub fn new(material: &Material) -> Self {
        let m = material.sanitized();

        let lum = m.base_color.y();
        let tint = if lum > 0.0 {
            m.base_color / lum
        } else {
            Spectrum::ONE
        };

        // A saturated tint pushes single channels past 1 before the clamp.
        let dielectric_spec0 = (lerp(m.specular_tint, Spectrum::ONE, tint) * (0.08 * m.specular))
            .clamp(0.0, 1.0);
        let spec0 = lerp(m.metallic, dielectric_spec0, m.base_color);
        let sheen_color = lerp(m.sheen_tint, Spectrum::ONE, tint) * m.sheen;

        Self {
            base_color: m.base_color,
            metallic: m.metallic,
            roughness: m.roughness,
            subsurface: m.subsurface,
            spec0,
            dielectric_spec0,
            sheen_color,
            clearcoat_weight: CLEARCOAT_SCALE * m.clearcoat,
            specular: TrowbridgeReitzDistribution::from_roughness(m.roughness, m.anisotropic),
            clearcoat: Gtr1Distribution::from_gloss(m.clearcoat_gloss),
        }
    }

    /// Returns the value of the distribution function for the given pair of
    /// directions.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn f(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        let cos_o = cos_theta(wo);
        let cos_i = cos_theta(wi);
        if cos_o <= 0.0 || cos_i <= 0.0 {
            return Spectrum::ZERO;
        }
        let wh = match (*wo + *wi).try_normalize() {
            Some(wh) => wh,
            None => return Spectrum::ZERO,
        };
        let cos_d = clamp(wi.dot(&wh), 0.0, 1.0);

        let base = self.f_specular(wo, wi, &wh, cos_i, cos_o, cos_d)
            + self.f_diffuse(cos_i, cos_o, cos_d);
        let coat = self.f_clearcoat(wo, wi, &wh, cos_i, cos_o, cos_d);
        base * (1.0 - self.clearcoat_weight) + coat * self.clearcoat_weight
    }

    /// Diffuse lobe: energy-normalized retro-reflective diffuse blended with
    /// the subsurface approximation, plus sheen; attenuated by the energy
    /// reflected by the specular layer.
    fn f_diffuse(&self, cos_i: Float, cos_o: Float, cos_d: Float) -> Spectrum {
        if self.metallic >= 1.0 {
            return Spectrum::ZERO;
        }
        let fl = schlick_weight(cos_i);
        let fv = schlick_weight(cos_o);
        let r = self.roughness;

        // Retro-reflection with the energy bias and factor that keep it close
        // to energy conserving across roughness.
        let energy_bias = lerp(r, 0.0, 0.5);
        let energy_factor = lerp(r, 1.0, 1.0 / 1.51);
        let fd90 = energy_bias + 2.0 * cos_d * cos_d * r;
        let fd = (1.0 + (fd90 - 1.0) * fl) * (1.0 + (fd90 - 1.0) * fv) * energy_factor;

        // Hanrahan-Krueger inspired flattening.
        let fss90 = cos_d * cos_d * r;
        let fss = (1.0 + (fss90 - 1.0) * fl) * (1.0 + (fss90 - 1.0) * fv);
        let ss = 1.25 * (fss * (1.0 / (cos_i + cos_o) - 0.5) + 0.5);

        let shape = lerp(self.subsurface, min(fd, 1.0), min(ss, 1.0));
        let sheen = self.sheen_color * schlick_weight(cos_d);
        let albedo = (self.base_color * shape + sheen).clamp(0.0, 1.0);

        let transmitted = self.transmitted(cos_i) * self.transmitted(cos_o);

        albedo * transmitted * ((1.0 - self.metallic) * INV_PI)
    }

    /// Per channel fraction of energy that passes the dielectric specular
    /// layer at the given angle.
    ///
    /// * `cos` - Cosine of the angle to the normal.
    fn transmitted(&self, cos: Float) -> Spectrum {
        (Spectrum::ONE - fr_schlick_spectrum(&self.dielectric_spec0, cos)).clamp(0.0, 1.0)
    }

    /// Specular lobe: anisotropic GGX with Smith masking and Schlick Fresnel.
    fn f_specular(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        wh: &Vector3f,
        cos_i: Float,
        cos_o: Float,
        cos_d: Float,
    ) -> Spectrum {
        let d = self.specular.d(wh);
        let g = self.specular.g(wo, wi);
        let f = fr_schlick_spectrum(&self.spec0, cos_d);
        f * (d * g / (4.0 * cos_i * cos_o))
    }

    /// Clearcoat lobe: GTR1 distribution with fixed masking roughness.
    fn f_clearcoat(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        wh: &Vector3f,
        cos_i: Float,
        cos_o: Float,
        cos_d: Float,
    ) -> Spectrum {
        if self.clearcoat_weight <= 0.0 {
            return Spectrum::ZERO;
        }
        let d = self.clearcoat.d(wh);
        let g = self.clearcoat.g(wo, wi);
        let f = fr_schlick(CLEARCOAT_F0, cos_d);
        Spectrum::new(f * d * g / (4.0 * cos_i * cos_o))
    }

    /// Returns the lobe selection probabilities for an outgoing direction,
    /// proportional to an estimate of the energy each lobe reflects.
    ///
    /// * `wo` - Outgoing direction.
    pub fn lobe_weights(&self, wo: &Vector3f) -> LobeWeights {
        let cos_o = clamp(cos_theta(wo), 0.0, 1.0);
        let base = 1.0 - self.clearcoat_weight;

        let specular =
            base * max(fr_schlick_spectrum(&self.spec0, cos_o).y(), MIN_SPECULAR_WEIGHT);
        let diffuse = base
            * (1.0 - self.metallic)
            * (self.transmitted(cos_o) * (self.base_color + self.sheen_color)).y();
        let clearcoat = self.clearcoat_weight * fr_schlick(CLEARCOAT_F0, cos_o);

        let total = specular + diffuse + clearcoat;
        LobeWeights {
            diffuse: diffuse / total,
            specular: specular / total,
            clearcoat: clearcoat / total,
        }
    }

    /// Returns the combined density of sampling `wi`: the sum over lobes of
    /// each lobe's pdf weighted by its selection probability.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if cos_theta(wo) <= 0.0 || cos_theta(wi) <= 0.0 {
            return 0.0;
        }
        let w = self.lobe_weights(wo);
        let mut pdf = w.specular * self.specular.reflection_pdf(wo, wi);
        if w.diffuse > 0.0 {
            pdf += w.diffuse * cosine_hemisphere_pdf(cos_theta(wi));
        }
        if w.clearcoat > 0.0 {
            pdf += w.clearcoat * self.clearcoat.reflection_pdf(wo, wi);
        }
        pdf
    }

    /// Chooses a lobe with probability proportional to its energy and samples
    /// an incident direction from it. Returns the direction, the BRDF value,
    /// the combined pdf and the chosen lobe, or `None` when the sample carries
    /// no energy.
    ///
    /// * `wo`      - Outgoing direction.
    /// * `sampler` - The sampler.
    pub fn sample_f(
        &self,
        wo: &Vector3f,
        sampler: &mut Sampler,
    ) -> Option<(Vector3f, Spectrum, Float, Lobe)> {
        if cos_theta(wo) <= 0.0 {
            return None;
        }
        let w = self.lobe_weights(wo);
        let u = sampler.get_1d();
        let lobe = if u < w.diffuse {
            Lobe::Diffuse
        } else if u < w.diffuse + w.specular {
            Lobe::Specular
        } else {
            Lobe::Clearcoat
        };

        let wi = match lobe {
            Lobe::Diffuse => sampler.sample_cosine_hemisphere().0,
            Lobe::Specular => {
                let (wh, _) = sampler.sample_microfacet_normal(&self.specular, wo);
                reflect(wo, &wh)
            }
            Lobe::Clearcoat => {
                let (wh, _) = sampler.sample_microfacet_normal(&self.clearcoat, wo);
                reflect(wo, &wh)
            }
        };
        if cos_theta(&wi) <= 0.0 {
            return None;
        }

        let pdf = self.pdf(wo, &wi);
        let f = self.f(wo, &wi);
        if pdf <= 0.0 || !pdf.is_finite() || f.is_black() {
            return None;
        }
        Some((wi, f, pdf, lobe))
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

    fn random_direction(rng: &mut RNG) -> Vector3f {
        let z = max(rng.uniform_float(), 0.05);
        let r = safe_sqrt(1.0 - z * z);
        let phi = TWO_PI * rng.uniform_float();
        Vector3f::new(r * phi.cos(), r * phi.sin(), z)
    }

    #[test]
    fn below_surface_is_black() {
        let brdf = DisneyBRDF::new(&Material::default());
        let up = Vector3f::new(0.0, 0.0, 1.0);
        let down = Vector3f::new(0.0, 0.0, -1.0);
        assert!(brdf.f(&up, &down).is_black());
        assert!(brdf.f(&down, &up).is_black());
        assert_eq!(brdf.pdf(&up, &down), 0.0);
    }

    #[test]
    fn lobe_weights_sum_to_one() {
        let mut rng = RNG::new(3);
        for _ in 0..200 {
            let brdf = DisneyBRDF::new(&random_material(&mut rng));
            let w = brdf.lobe_weights(&random_direction(&mut rng));
            assert!(approx_eq!(Float, w.diffuse + w.specular + w.clearcoat, 1.0, epsilon = 1e-5));
            assert!(w.specular > 0.0);
        }
    }

    #[test]
    fn sample_pdf_matches_pdf() {
        let mut rng = RNG::new(17);
        let mut sampler = Sampler::new(17);
        for _ in 0..200 {
            let brdf = DisneyBRDF::new(&random_material(&mut rng));
            let wo = random_direction(&mut rng);
            if let Some((wi, f, pdf, _)) = brdf.sample_f(&wo, &mut sampler) {
                assert!(approx_eq!(Float, pdf, brdf.pdf(&wo, &wi), ulps = 4));
                assert_eq!(f, brdf.f(&wo, &wi));
            }
        }
    }

    #[test]
    fn pdf_integrates_to_one() {
        // ∫ pdf dω over the hemisphere, estimated with uniform directions.
        let mut rng = RNG::new(23);
        let materials = [
            Material::default(),
            Material::metal(Spectrum::new(0.9), 0.5),
            Material {
                clearcoat: 1.0,
                clearcoat_gloss: 0.3,
                ..Material::diffuse(Spectrum::new(0.5))
            },
        ];
        for m in materials.iter() {
            let brdf = DisneyBRDF::new(m);
            let wo = Vector3f::new(0.3, 0.1, 0.9).normalize();
            let n = 200_000;
            let mut sum = 0.0_f64;
            for _ in 0..n {
                let z = rng.uniform_float();
                let r = safe_sqrt(1.0 - z * z);
                let phi = TWO_PI * rng.uniform_float();
                let wi = Vector3f::new(r * phi.cos(), r * phi.sin(), z);
                sum += (brdf.pdf(&wo, &wi) * TWO_PI) as f64;
            }
            let integral = (sum / n as f64) as Float;
            assert!(integral > 0.9 && integral < 1.05, "pdf integral {integral}");
        }
    }
}
