//! Triangles

use crate::geometry::*;
use std::mem::size_of;

/// Smallest area a triangle can have before it is considered degenerate.
pub const DEGENERATE_AREA: Float = 1e-12;

/// A single triangle with optional per-vertex shading normals and texture
/// coordinates. Vertices are in world space; the front face is the side the
/// counter-clockwise winding normal `(p1 - p0) × (p2 - p0)` points to.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    /// Vertex positions.
    pub p: [Point3f; 3],

    /// Optional per-vertex shading normals.
    pub n: Option<[Vector3f; 3]>,

    /// Optional per-vertex texture coordinates.
    pub uv: Option<[Point2f; 3]>,

    /// Index into the scene's material table.
    pub material: u32,
}

/// Result of a successful ray-triangle test before any shading data is
/// interpolated.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter of the hit.
    pub t: Float,

    /// Barycentric coordinates of the hit for `p0`, `p1` and `p2`.
    pub b: [Float; 3],
}

impl Triangle {
    /// Create a new `Triangle` without shading normals or texture coordinates.
    ///
    /// * `p0`       - First vertex.
    /// * `p1`       - Second vertex.
    /// * `p2`       - Third vertex.
    /// * `material` - Material index.
    pub fn new(p0: Point3f, p1: Point3f, p2: Point3f, material: u32) -> Self {
        Self {
            p: [p0, p1, p2],
            n: None,
            uv: None,
            material,
        }
    }

    /// Returns the triangle with per-vertex shading normals.
    ///
    /// * `n` - The normals.
    pub fn with_normals(mut self, n: [Vector3f; 3]) -> Self {
        self.n = Some(n);
        self
    }

    /// Returns the triangle with per-vertex texture coordinates.
    ///
    /// * `uv` - The texture coordinates.
    pub fn with_uvs(mut self, uv: [Point2f; 3]) -> Self {
        self.uv = Some(uv);
        self
    }

    /// Returns the world space bounding box.
    pub fn bounds(&self) -> Bounds3f {
        Bounds3f::from(self.p[0])
            .union_point(&self.p[1])
            .union_point(&self.p[2])
    }

    /// Returns the centroid of the vertices.
    pub fn centroid(&self) -> Point3f {
        (self.p[0] + self.p[1] + self.p[2]) / 3.0
    }

    /// Returns the unnormalized winding normal, whose length is twice the area.
    fn winding(&self) -> Vector3f {
        (self.p[1] - self.p[0]).cross(&(self.p[2] - self.p[0]))
    }

    /// Returns the surface area.
    pub fn area(&self) -> Float {
        0.5 * self.winding().length()
    }

    /// Returns the unit geometric normal or `None` for degenerate triangles.
    pub fn normal(&self) -> Option<Vector3f> {
        self.winding().try_normalize()
    }

    /// Returns true if any vertex is non-finite or the area is too small to
    /// define a normal.
    pub fn is_degenerate(&self) -> bool {
        !self.p.iter().all(|p| p.is_finite())
            || !(self.area() > DEGENERATE_AREA)
            || self.normal().is_none()
    }

    /// Watertight ray-triangle intersection. Returns the hit if the ray
    /// crosses the triangle strictly inside `(ray.t_min, t_max]`; both faces
    /// are hit.
    ///
    /// * `ray`   - The ray.
    /// * `t_max` - Current upper bound of the ray interval.
    pub fn intersect(&self, ray: &Ray, t_max: Float) -> Option<TriangleHit> {
        let [p0, p1, p2] = self.p;

        // Translate vertices based on ray origin.
        let o = Vector3f::from(ray.o);
        let mut p0t = Vector3f::from(p0) - o;
        let mut p1t = Vector3f::from(p1) - o;
        let mut p2t = Vector3f::from(p2) - o;

        // Permute components of triangle vertices and ray direction.
        let kz = ray.d.abs().max_dimension();
        let kx = kz + 1;
        let ky = kx + 1;
        let d = ray.d.permute(kx, ky, kz);
        if d.z == 0.0 {
            return None;
        }
        p0t = p0t.permute(kx, ky, kz);
        p1t = p1t.permute(kx, ky, kz);
        p2t = p2t.permute(kx, ky, kz);

        // Apply shear transformation to translated vertex positions.
        let sx = -d.x / d.z;
        let sy = -d.y / d.z;
        let sz = 1.0 / d.z;
        p0t.x += sx * p0t.z;
        p0t.y += sy * p0t.z;
        p1t.x += sx * p1t.z;
        p1t.y += sy * p1t.z;
        p2t.x += sx * p2t.z;
        p2t.y += sy * p2t.z;

        // Compute edge function coefficients.
        let mut e0 = p1t.x * p2t.y - p1t.y * p2t.x;
        let mut e1 = p2t.x * p0t.y - p2t.y * p0t.x;
        let mut e2 = p0t.x * p1t.y - p0t.y * p1t.x;

        // Fallback to double precision at triangle edges.
        if size_of::<Float>() == size_of::<f32>() && (e0 == 0.0 || e1 == 0.0 || e2 == 0.0) {
            e0 = ((p2t.y as f64) * (p1t.x as f64) - (p2t.x as f64) * (p1t.y as f64)) as Float;
            e1 = ((p0t.y as f64) * (p2t.x as f64) - (p0t.x as f64) * (p2t.y as f64)) as Float;
            e2 = ((p1t.y as f64) * (p0t.x as f64) - (p1t.x as f64) * (p0t.y as f64)) as Float;
        }

        // Edge and determinant tests.
        if (e0 < 0.0 || e1 < 0.0 || e2 < 0.0) && (e0 > 0.0 || e1 > 0.0 || e2 > 0.0) {
            return None;
        }
        let det = e0 + e1 + e2;
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        // Scaled hit distance tested against the ray interval.
        p0t.z *= sz;
        p1t.z *= sz;
        p2t.z *= sz;
        let t_scaled = e0 * p0t.z + e1 * p1t.z + e2 * p2t.z;
        if det < 0.0 && (t_scaled >= ray.t_min * det || t_scaled < t_max * det) {
            return None;
        } else if det > 0.0 && (t_scaled <= ray.t_min * det || t_scaled > t_max * det) {
            return None;
        }

        let inv_det = 1.0 / det;
        let b = [e0 * inv_det, e1 * inv_det, e2 * inv_det];
        let t = t_scaled * inv_det;

        // Ensure that computed `t` is conservatively greater than zero.
        let max_z_t = Vector3f::new(p0t.z, p1t.z, p2t.z).abs().max_component();
        let delta_z = gamma(3) * max_z_t;
        let max_x_t = Vector3f::new(p0t.x, p1t.x, p2t.x).abs().max_component();
        let max_y_t = Vector3f::new(p0t.y, p1t.y, p2t.y).abs().max_component();
        let delta_x = gamma(5) * (max_x_t + max_z_t);
        let delta_y = gamma(5) * (max_y_t + max_z_t);
        let delta_e = 2.0 * (gamma(2) * max_x_t * max_y_t + delta_y * max_x_t + delta_x * max_y_t);
        let max_e = Vector3f::new(e0, e1, e2).abs().max_component();
        let delta_t = 3.0
            * (gamma(3) * max_e * max_z_t + delta_e * max_z_t + delta_z * max_e)
            * inv_det.abs();
        if t <= delta_t {
            return None;
        }

        Some(TriangleHit { t, b })
    }

    /// Returns the point with the given barycentric coordinates.
    ///
    /// * `b` - Barycentric coordinates.
    pub fn point_at(&self, b: &[Float; 3]) -> Point3f {
        self.p[0] * b[0] + self.p[1] * b[1] + self.p[2] * b[2]
    }

    /// Returns the interpolated texture coordinates, defaulting to the
    /// parameterization `(0,0), (1,0), (1,1)`.
    ///
    /// * `b` - Barycentric coordinates.
    pub fn uv_at(&self, b: &[Float; 3]) -> Point2f {
        let uv = self.uv.unwrap_or([
            Point2f::new(0.0, 0.0),
            Point2f::new(1.0, 0.0),
            Point2f::new(1.0, 1.0),
        ]);
        uv[0] * b[0] + uv[1] * b[1] + uv[2] * b[2]
    }

    /// Returns the interpolated unit shading normal, or `None` when the
    /// triangle has no normals or they interpolate to zero.
    ///
    /// * `b` - Barycentric coordinates.
    pub fn shading_normal_at(&self, b: &[Float; 3]) -> Option<Vector3f> {
        let n = self.n?;
        (n[0] * b[0] + n[1] * b[1] + n[2] * b[2]).try_normalize()
    }

    /// Returns the partial derivative of position with respect to `u`, used
    /// as the tangent for anisotropic shading. Falls back to the first edge
    /// when texture coordinates are degenerate.
    pub fn dpdu(&self) -> Vector3f {
        let [p0, p1, p2] = self.p;
        let uv = self.uv.unwrap_or([
            Point2f::new(0.0, 0.0),
            Point2f::new(1.0, 0.0),
            Point2f::new(1.0, 1.0),
        ]);
        let duv02 = uv[0] - uv[2];
        let duv12 = uv[1] - uv[2];
        let dp02 = p0 - p2;
        let dp12 = p1 - p2;
        let determinant = duv02.x * duv12.y - duv02.y * duv12.x;
        if determinant.abs() < 1e-8 {
            return p1 - p0;
        }
        (dp02 * duv12.y - dp12 * duv02.y) / determinant
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            0,
        )
    }

    #[test]
    fn hit_from_both_sides() {
        let tri = unit_triangle();
        let down = Ray::new(Point3f::new(0.25, 0.25, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        let up = Ray::new(Point3f::new(0.25, 0.25, -2.0), Vector3f::new(0.0, 0.0, 1.0));

        let hit = tri.intersect(&down, INFINITY).expect("hit from above");
        assert!(approx_eq!(Float, hit.t, 1.0, ulps = 4));
        assert!(approx_eq!(Float, hit.b[0] + hit.b[1] + hit.b[2], 1.0, ulps = 4));
        assert!(approx_eq!(Float, hit.b[1], 0.25, ulps = 8));
        assert!(approx_eq!(Float, hit.b[2], 0.25, ulps = 8));

        let hit = tri.intersect(&up, INFINITY).expect("hit from below");
        assert!(approx_eq!(Float, hit.t, 2.0, ulps = 4));
    }

    #[test]
    fn respects_interval() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3f::new(0.25, 0.25, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(tri.intersect(&ray, 0.5).is_none());
        let ray = Ray::with_interval(ray.o, ray.d, 1.5, INFINITY);
        assert!(tri.intersect(&ray, INFINITY).is_none());
    }

    #[test]
    fn misses_outside() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3f::new(0.75, 0.75, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(tri.intersect(&ray, INFINITY).is_none());
        let parallel = Ray::new(Point3f::new(-1.0, 0.25, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(tri.intersect(&parallel, INFINITY).is_none());
    }

    #[test]
    fn geometry_queries() {
        let tri = unit_triangle();
        assert!(approx_eq!(Float, tri.area(), 0.5));
        assert_eq!(tri.normal(), Some(Vector3f::new(0.0, 0.0, 1.0)));
        assert!(!tri.is_degenerate());
        let b = tri.bounds();
        assert_eq!(b.p_min, Point3f::new(0.0, 0.0, 0.0));
        assert_eq!(b.p_max, Point3f::new(1.0, 1.0, 0.0));

        let line = Triangle::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
            0,
        );
        assert!(line.is_degenerate());
        let nan = Triangle::new(
            Point3f::new(Float::NAN, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            0,
        );
        assert!(nan.is_degenerate());
    }

    proptest! {
        #[test]
        fn hit_point_lies_on_ray(u in 0.01..0.49f32, v in 0.01..0.49f32, h in 0.1..10.0f32) {
            let tri = unit_triangle();
            let target = Point3f::new(u, v, 0.0);
            let o = Point3f::new(0.3, -0.2, h);
            let ray = Ray::new(o, target - o);
            let hit = tri.intersect(&ray, INFINITY);
            prop_assert!(hit.is_some());
            let hit = hit.unwrap();
            let p = tri.point_at(&hit.b);
            prop_assert!(p.distance(&ray.at(hit.t)) < 1e-4);
            prop_assert!(approx_eq!(Float, hit.t, 1.0, epsilon = 1e-4));
        }
    }
}
