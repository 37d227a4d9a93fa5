//! Surface intersections

use super::Triangle;
use crate::geometry::*;

/// Description of the closest surface hit along a ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    /// Ray parameter of the hit.
    pub t: Float,

    /// Index of the primitive in the scene.
    pub primitive: usize,

    /// Barycentric coordinates of the hit.
    pub b: [Float; 3],

    /// Hit point.
    pub p: Point3f,

    /// Unit geometric normal given by the triangle winding.
    pub n_g: Vector3f,

    /// Unit shading normal; equals `n_g` when the triangle has no normals.
    pub n_s: Vector3f,

    /// Tangent used to orient anisotropic reflection.
    pub tangent: Vector3f,

    /// Surface texture coordinates.
    pub uv: Point2f,

    /// Material index.
    pub material: u32,
}

impl Intersection {
    /// Interpolates the surface data of a triangle hit. Returns `None` for
    /// degenerate triangles.
    ///
    /// * `triangle`  - The triangle that was hit.
    /// * `primitive` - Index of the triangle.
    /// * `t`         - Ray parameter of the hit.
    /// * `b`         - Barycentric coordinates.
    pub fn new(triangle: &Triangle, primitive: usize, t: Float, b: [Float; 3]) -> Option<Self> {
        let n_g = triangle.normal()?;

        // Shading normals that disagree with the winding are flipped so both
        // normals describe the same side.
        let n_s = match triangle.shading_normal_at(&b) {
            Some(n) if n.dot(&n_g) < 0.0 => -n,
            Some(n) => n,
            None => n_g,
        };

        Some(Self {
            t,
            primitive,
            b,
            p: triangle.point_at(&b),
            n_g,
            n_s,
            tangent: triangle.dpdu(),
            uv: triangle.uv_at(&b),
            material: triangle.material,
        })
    }

    /// Returns the normals flipped to the side of the outgoing direction
    /// `wo`: `(n_g, n_s)`. Returns whether the front face was hit.
    ///
    /// * `wo` - Direction from the hit point back along the ray.
    pub fn oriented_normals(&self, wo: &Vector3f) -> (Vector3f, Vector3f, bool) {
        if self.n_g.dot(wo) >= 0.0 {
            (self.n_g, self.n_s, true)
        } else {
            (-self.n_g, -self.n_s, false)
        }
    }
}

/// Cost counters gathered while traversing an aggregate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Number of interior and leaf nodes visited.
    pub nodes_visited: u32,

    /// Number of ray-primitive tests.
    pub primitives_tested: u32,
}

impl TraversalStats {
    /// Returns the sum of both counters.
    pub fn total(&self) -> u32 {
        self.nodes_visited + self.primitives_tested
    }
}
