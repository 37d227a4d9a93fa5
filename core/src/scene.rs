//! Scene

use crate::camera::Camera;
use crate::error::BuildError;
use crate::geometry::*;
use crate::light::*;
use crate::material::Material;
use crate::primitive::*;
use crate::spectrum::*;
use std::sync::Arc;

/// Scene.
#[derive(Clone)]
pub struct Scene {
    /// The primitives, referenced by index everywhere else.
    pub primitives: Arc<Vec<Triangle>>,

    /// Materials referenced by primitives.
    pub materials: Vec<Material>,

    /// Emissive primitives.
    pub lights: LightSet,

    /// The camera.
    pub camera: Camera,

    /// Radiance of rays that leave the scene.
    pub background: Spectrum,

    /// An aggregate of all primitives in the scene.
    pub aggregate: ArcAggregate,

    /// The bounding box of the scene geometry.
    pub world_bound: Bounds3f,
}

impl Scene {
    /// Creates a new `Scene`. The light set is derived from the emissive
    /// materials.
    ///
    /// * `primitives` - The primitives the aggregate was built over.
    /// * `materials`  - Materials referenced by the primitives.
    /// * `camera`     - The camera.
    /// * `background` - Radiance of rays that leave the scene.
    /// * `aggregate`  - An aggregate of all primitives in the scene.
    pub fn new(
        primitives: Arc<Vec<Triangle>>,
        materials: Vec<Material>,
        camera: Camera,
        background: Spectrum,
        aggregate: ArcAggregate,
    ) -> Result<Self, BuildError> {
        if primitives.is_empty() {
            return Err(BuildError::EmptyScene);
        }
        if let Some((i, t)) = primitives
            .iter()
            .enumerate()
            .find(|(_, t)| t.material as usize >= materials.len())
        {
            return Err(BuildError::InvalidMaterial {
                primitive: i,
                material: t.material,
            });
        }

        let materials: Vec<Material> = materials.iter().map(Material::sanitized).collect();
        let lights = LightSet::new(&primitives, &materials);
        if lights.is_empty() {
            warn!("Scene has no emissive primitives; only the background lights it");
        }
        info!(
            "Scene: {} primitives, {} materials, {} emissive primitives",
            primitives.len(),
            materials.len(),
            lights.len()
        );

        Ok(Self {
            world_bound: aggregate.world_bound(),
            primitives,
            materials,
            lights,
            camera,
            background: if background.is_finite() {
                background.clamp(0.0, INFINITY)
            } else {
                Spectrum::ZERO
            },
            aggregate,
        })
    }

    /// Traces the ray into the scene and returns the closest intersection.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        self.aggregate.intersect(ray)
    }

    /// Traces the ray into the scene and returns whether or not an
    /// intersection occurred.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        self.aggregate.intersect_p(ray)
    }

    /// Traces the ray and returns the closest intersection together with the
    /// cost of the traversal.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect_with_stats(&self, ray: &Ray) -> (Option<Intersection>, TraversalStats) {
        self.aggregate.intersect_with_stats(ray)
    }

    /// Returns the material of an intersection.
    ///
    /// * `isect` - The intersection.
    pub fn material(&self, isect: &Intersection) -> &Material {
        &self.materials[isect.material as usize]
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::look_at(
            Point3f::new(0.0, 0.0, 5.0),
            Point3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            45.0,
        )
        .expect("valid camera")
    }

    fn build(prims: Vec<Triangle>, materials: Vec<Material>) -> Result<Scene, BuildError> {
        let prims = Arc::new(prims);
        let aggregate: ArcAggregate = Arc::new(LinearAggregate::new(Arc::clone(&prims)));
        Scene::new(prims, materials, camera(), Spectrum::ZERO, aggregate)
    }

    fn triangle(material: u32) -> Triangle {
        Triangle::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            material,
        )
    }

    #[test]
    fn rejects_empty_scene() {
        assert_eq!(build(vec![], vec![Material::default()]).err(), Some(BuildError::EmptyScene));
    }

    #[test]
    fn rejects_missing_material() {
        let err = build(vec![triangle(0), triangle(2)], vec![Material::default()]).err();
        assert_eq!(
            err,
            Some(BuildError::InvalidMaterial {
                primitive: 1,
                material: 2
            })
        );
    }

    #[test]
    fn derives_lights() {
        let scene = build(
            vec![triangle(0), triangle(1)],
            vec![Material::default(), Material::emissive(Spectrum::ONE)],
        )
        .expect("valid scene");
        assert_eq!(scene.lights.len(), 1);
        assert!(scene.lights.get(1).is_some());
    }
}
