//! Aggregates

use super::*;
use crate::geometry::*;
use std::sync::Arc;

/// Spatial query interface over the primitives of a scene.
pub trait Aggregate: Send + Sync {
    /// Returns the bounding box of all primitives.
    fn world_bound(&self) -> Bounds3f;

    /// Returns the closest intersection within the ray's interval, if any.
    ///
    /// * `ray` - The ray.
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        self.intersect_with_stats(ray).0
    }

    /// Returns true if any primitive intersects the ray within its interval.
    /// May terminate on the first hit found.
    ///
    /// * `ray` - The ray.
    fn intersect_p(&self, ray: &Ray) -> bool;

    /// Returns the closest intersection together with the traversal cost.
    ///
    /// * `ray` - The ray.
    fn intersect_with_stats(&self, ray: &Ray) -> (Option<Intersection>, TraversalStats);
}

/// Atomic reference counted `Aggregate`.
pub type ArcAggregate = Arc<dyn Aggregate>;

/// Aggregate that tests every primitive. Serves as the reference for
/// accelerated aggregates and for very small scenes.
pub struct LinearAggregate {
    /// The primitives.
    primitives: Arc<Vec<Triangle>>,

    /// Bounds of all primitives.
    bounds: Bounds3f,
}

impl LinearAggregate {
    /// Create a new `LinearAggregate`.
    ///
    /// * `primitives` - The primitives.
    pub fn new(primitives: Arc<Vec<Triangle>>) -> Self {
        let bounds = primitives
            .iter()
            .fold(Bounds3f::EMPTY, |b, p| b.union(&p.bounds()));
        Self { primitives, bounds }
    }
}

impl Aggregate for LinearAggregate {
    fn world_bound(&self) -> Bounds3f {
        self.bounds
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        self.primitives
            .iter()
            .any(|p| p.intersect(ray, ray.t_max).is_some())
    }

    fn intersect_with_stats(&self, ray: &Ray) -> (Option<Intersection>, TraversalStats) {
        let mut t_max = ray.t_max;
        let mut closest = None;
        for (i, p) in self.primitives.iter().enumerate() {
            if let Some(hit) = p.intersect(ray, t_max) {
                t_max = hit.t;
                closest = Some((i, hit));
            }
        }
        let stats = TraversalStats {
            nodes_visited: 0,
            primitives_tested: self.primitives.len() as u32,
        };
        let isect = closest.and_then(|(i, hit)| Intersection::new(&self.primitives[i], i, hit.t, hit.b));
        (isect, stats)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn quad(z: Float, material: u32) -> Vec<Triangle> {
        let p = [
            Point3f::new(-1.0, -1.0, z),
            Point3f::new(1.0, -1.0, z),
            Point3f::new(1.0, 1.0, z),
            Point3f::new(-1.0, 1.0, z),
        ];
        vec![
            Triangle::new(p[0], p[1], p[2], material),
            Triangle::new(p[0], p[2], p[3], material),
        ]
    }

    #[test]
    fn closest_hit_wins() {
        let mut prims = quad(0.0, 0);
        prims.extend(quad(1.0, 1));
        let agg = LinearAggregate::new(Arc::new(prims));
        let ray = Ray::new(Point3f::new(0.1, 0.2, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        let isect = agg.intersect(&ray).expect("hit");
        assert_eq!(isect.material, 1);
        assert!(approx_eq!(Float, isect.t, 4.0, ulps = 4));
        assert!(agg.intersect_p(&ray));

        let (n_g, _, front) = isect.oriented_normals(&-ray.d);
        assert!(front);
        assert_eq!(n_g, Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn shadow_ray_stops_short() {
        let agg = LinearAggregate::new(Arc::new(quad(0.0, 0)));
        let ray = Ray::with_interval(
            Point3f::new(0.0, 0.0, 2.0),
            Vector3f::new(0.0, 0.0, -1.0),
            0.0,
            1.9,
        );
        assert!(!agg.intersect_p(&ray));
        assert!(agg.intersect(&ray).is_none());
    }

    #[test]
    fn back_face_flips_normals() {
        let agg = LinearAggregate::new(Arc::new(quad(0.0, 0)));
        let ray = Ray::new(Point3f::new(0.0, 0.5, -1.0), Vector3f::new(0.0, 0.0, 1.0));
        let isect = agg.intersect(&ray).expect("hit");
        let (n_g, n_s, front) = isect.oriented_normals(&-ray.d);
        assert!(!front);
        assert_eq!(n_g, Vector3f::new(0.0, 0.0, -1.0));
        assert_eq!(n_s, n_g);
    }
}
