//! Area lights

use crate::geometry::*;
use crate::material::Material;
use crate::primitive::Triangle;
use crate::sampler::Sampler;
use crate::sampling::area_to_solid_angle_pdf;
use crate::spectrum::*;

/// A sampled point on a light as seen from a reference point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightSample {
    /// Sampled point on the light.
    pub p: Point3f,

    /// Unit normal of the light at `p`.
    pub n: Vector3f,

    /// Unit direction from the reference point towards `p`.
    pub wi: Vector3f,

    /// Distance from the reference point to `p`.
    pub dist: Float,

    /// Radiance emitted towards the reference point.
    pub le: Spectrum,

    /// Solid angle density of the sample including the light selection
    /// probability.
    pub pdf: Float,

    /// Index of the emitting primitive.
    pub primitive: usize,
}

/// An emissive triangle. Emission leaves the front face only.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AreaLight {
    /// Index of the emitting primitive.
    pub primitive: usize,

    /// Vertex positions.
    pub p: [Point3f; 3],

    /// Unit winding normal.
    pub n: Vector3f,

    /// Emitted radiance.
    pub le: Spectrum,
}

impl AreaLight {
    /// Creates an area light for an emissive triangle. Returns `None` if the
    /// triangle is degenerate or the material does not emit.
    ///
    /// * `primitive` - Index of the triangle.
    /// * `triangle`  - The triangle.
    /// * `material`  - The triangle's material.
    pub fn new(primitive: usize, triangle: &Triangle, material: &Material) -> Option<Self> {
        let le = material.sanitized().emission;
        if le.is_black() || triangle.is_degenerate() {
            return None;
        }
        Some(Self {
            primitive,
            p: triangle.p,
            n: triangle.normal()?,
            le,
        })
    }

    /// Returns the radiance leaving the light in direction `w`.
    ///
    /// * `w` - Direction pointing away from the light.
    pub fn l(&self, w: &Vector3f) -> Spectrum {
        if self.n.dot(w) > 0.0 {
            self.le
        } else {
            Spectrum::ZERO
        }
    }

    /// Samples a point on the light uniformly by area. Returns `None` if the
    /// point is seen edge-on or from behind.
    ///
    /// * `p_ref`   - Reference point.
    /// * `sampler` - The sampler.
    pub fn sample_li(&self, p_ref: &Point3f, sampler: &mut Sampler) -> Option<LightSample> {
        let (p, pdf) = sampler.sample_light_point(&self.p, &self.n, p_ref);
        let d = p - *p_ref;
        let dist = d.length();
        if pdf <= 0.0 || !pdf.is_finite() || dist <= 0.0 {
            return None;
        }
        let wi = d / dist;
        let le = self.l(&-wi);
        if le.is_black() {
            return None;
        }
        Some(LightSample {
            p,
            n: self.n,
            wi,
            dist,
            le,
            pdf,
            primitive: self.primitive,
        })
    }

    /// Returns the solid angle density of sampling `p_light` from `p_ref`.
    ///
    /// * `p_ref`   - Reference point.
    /// * `p_light` - Point on the light.
    pub fn pdf_li(&self, p_ref: &Point3f, p_light: &Point3f) -> Float {
        let area = 0.5 * (self.p[1] - self.p[0]).cross(&(self.p[2] - self.p[0])).length();
        if area <= 0.0 {
            return 0.0;
        }
        area_to_solid_angle_pdf(1.0 / area, p_ref, p_light, &self.n)
    }
}

/// The emissive primitives of a scene, selected uniformly for next event
/// estimation.
#[derive(Clone, Debug, Default)]
pub struct LightSet {
    /// The lights.
    lights: Vec<AreaLight>,

    /// Maps a primitive index to its light, if it emits.
    by_primitive: Vec<Option<u32>>,
}

impl LightSet {
    /// Derives the light set from the emissive materials of a scene.
    ///
    /// * `primitives` - The primitives.
    /// * `materials`  - The materials; indices must be valid.
    pub fn new(primitives: &[Triangle], materials: &[Material]) -> Self {
        let mut lights = vec![];
        let mut by_primitive = vec![None; primitives.len()];
        for (i, t) in primitives.iter().enumerate() {
            let light = materials
                .get(t.material as usize)
                .and_then(|m| AreaLight::new(i, t, m));
            if let Some(light) = light {
                by_primitive[i] = Some(lights.len() as u32);
                lights.push(light);
            }
        }
        Self {
            lights,
            by_primitive,
        }
    }

    /// Returns the number of lights.
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Returns true if the scene has no lights.
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Returns the lights.
    pub fn lights(&self) -> &[AreaLight] {
        &self.lights
    }

    /// Returns the light of a primitive, if it emits.
    ///
    /// * `primitive` - Primitive index.
    pub fn get(&self, primitive: usize) -> Option<&AreaLight> {
        self.by_primitive
            .get(primitive)
            .copied()
            .flatten()
            .map(|i| &self.lights[i as usize])
    }

    /// Selects a light uniformly and samples a point on it.
    ///
    /// * `p_ref`   - Reference point.
    /// * `sampler` - The sampler.
    pub fn sample(&self, p_ref: &Point3f, sampler: &mut Sampler) -> Option<LightSample> {
        if self.lights.is_empty() {
            return None;
        }
        let light = &self.lights[sampler.get_index(self.lights.len())];
        let mut ls = light.sample_li(p_ref, sampler)?;
        ls.pdf /= self.lights.len() as Float;
        Some(ls)
    }

    /// Returns the density with which `sample` would produce `p_light` on the
    /// given primitive.
    ///
    /// * `primitive` - Primitive index of the light.
    /// * `p_ref`     - Reference point.
    /// * `p_light`   - Point on the light.
    pub fn pdf(&self, primitive: usize, p_ref: &Point3f, p_light: &Point3f) -> Float {
        match self.get(primitive) {
            Some(light) => light.pdf_li(p_ref, p_light) / self.lights.len() as Float,
            None => 0.0,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn ceiling() -> (Vec<Triangle>, Vec<Material>) {
        // Facing down at y = 1.
        let p = [
            Point3f::new(-0.5, 1.0, -0.5),
            Point3f::new(0.5, 1.0, -0.5),
            Point3f::new(0.5, 1.0, 0.5),
            Point3f::new(-0.5, 1.0, 0.5),
        ];
        let floor = Triangle::new(
            Point3f::new(-1.0, 0.0, -1.0),
            Point3f::new(0.0, 0.0, 1.0),
            Point3f::new(1.0, 0.0, -1.0),
            0,
        );
        let prims = vec![
            floor,
            Triangle::new(p[0], p[1], p[2], 1),
            Triangle::new(p[0], p[2], p[3], 1),
        ];
        let materials = vec![
            Material::diffuse(Spectrum::new(0.5)),
            Material::emissive(Spectrum::new(4.0)),
        ];
        (prims, materials)
    }

    #[test]
    fn derives_lights_from_materials() {
        let (prims, materials) = ceiling();
        let lights = LightSet::new(&prims, &materials);
        assert_eq!(lights.len(), 2);
        assert!(lights.get(0).is_none());
        assert_eq!(lights.get(2).map(|l| l.primitive), Some(2));
        assert_eq!(lights.get(1).map(|l| l.n), Some(Vector3f::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn sample_pdf_matches_pdf() {
        let (prims, materials) = ceiling();
        let lights = LightSet::new(&prims, &materials);
        let p_ref = Point3f::new(0.1, 0.0, 0.2);
        let mut sampler = Sampler::new(1);
        for i in 0..100 {
            sampler.start_pixel_sample((i, 0), 0);
            let ls = lights.sample(&p_ref, &mut sampler).expect("light faces the floor");
            assert_eq!(ls.le, Spectrum::new(4.0));
            assert!(approx_eq!(Float, ls.wi.length(), 1.0, epsilon = 1e-5));
            let pdf = lights.pdf(ls.primitive, &p_ref, &ls.p);
            assert!(approx_eq!(Float, ls.pdf, pdf, epsilon = 1e-3 * pdf));
        }
    }

    #[test]
    fn emission_is_one_sided() {
        let (prims, materials) = ceiling();
        let lights = LightSet::new(&prims, &materials);
        let above = Point3f::new(0.0, 2.0, 0.0);
        let mut sampler = Sampler::new(1);
        assert!(lights.sample(&above, &mut sampler).is_none());
        let light = lights.get(1).expect("light");
        assert!(light.l(&Vector3f::new(0.0, 1.0, 0.0)).is_black());
        assert!(!light.l(&Vector3f::new(0.0, -1.0, 0.0)).is_black());
    }
}
