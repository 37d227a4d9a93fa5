//! 3-D Axis Aligned Bounding Boxes.

use super::{gamma, Axis, Float, Point3, Point3f, Ray, Vector3, Vector3f, INFINITY};
use std::ops::Index;

/// 3-D Axis Aligned Bounding Box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3<T> {
    /// Minimum bounds.
    pub p_min: Point3<T>,

    /// Maximum bounds.
    pub p_max: Point3<T>,
}

/// 3-D bounding box containing `Float` points.
pub type Bounds3f = Bounds3<Float>;

impl Bounds3f {
    /// An inverted box that is the identity of `union`.
    pub const EMPTY: Self = Self {
        p_min: Point3 {
            x: INFINITY,
            y: INFINITY,
            z: INFINITY,
        },
        p_max: Point3 {
            x: -INFINITY,
            y: -INFINITY,
            z: -INFINITY,
        },
    };

    /// Creates a new bounding box from 2 opposite corners.
    ///
    /// * `p1` - First corner.
    /// * `p2` - Second corner.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// Returns true if the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }

    /// Returns the smallest box containing this box and a point.
    ///
    /// * `p` - The point.
    pub fn union_point(&self, p: &Point3f) -> Self {
        Self {
            p_min: self.p_min.min(p),
            p_max: self.p_max.max(p),
        }
    }

    /// Returns the smallest box containing this box and another box.
    ///
    /// * `other` - The other box.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p_min: self.p_min.min(&other.p_min),
            p_max: self.p_max.max(&other.p_max),
        }
    }

    /// Returns true if another box lies entirely inside this box.
    ///
    /// * `other` - The other box.
    pub fn contains(&self, other: &Self) -> bool {
        other.p_min.x >= self.p_min.x
            && other.p_min.y >= self.p_min.y
            && other.p_min.z >= self.p_min.z
            && other.p_max.x <= self.p_max.x
            && other.p_max.y <= self.p_max.y
            && other.p_max.z <= self.p_max.z
    }

    /// Returns the vector from the minimum to the maximum corner.
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    /// Returns the centre of the box.
    pub fn centroid(&self) -> Point3f {
        (self.p_min + self.p_max) * 0.5
    }

    /// Returns the surface area of the box; 0 for an empty box.
    pub fn surface_area(&self) -> Float {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Returns the axis along which the box is widest.
    pub fn maximum_extent(&self) -> Axis {
        self.diagonal().max_dimension()
    }

    /// Returns the position of a point relative to the corners of the box;
    /// the minimum corner maps to 0 and the maximum corner to 1 on each axis.
    ///
    /// * `p` - The point.
    pub fn offset(&self, p: &Point3f) -> Vector3f {
        let mut o = *p - self.p_min;
        if self.p_max.x > self.p_min.x {
            o.x /= self.p_max.x - self.p_min.x;
        }
        if self.p_max.y > self.p_min.y {
            o.y /= self.p_max.y - self.p_min.y;
        }
        if self.p_max.z > self.p_min.z {
            o.z /= self.p_max.z - self.p_min.z;
        }
        o
    }

    /// Slab test against a ray using its precomputed reciprocal direction.
    /// Returns the parametric distance at which the ray enters the box,
    /// clamped to the ray's interval, or `None` if the ray misses the box
    /// within `[t_min, t_max]`.
    ///
    /// * `ray`        - The ray.
    /// * `t_max`      - Current upper bound of the ray interval.
    /// * `inv_dir`    - Reciprocal of the ray direction.
    /// * `dir_is_neg` - 1 for each negative direction component, else 0.
    pub fn intersect_p_inv(
        &self,
        ray: &Ray,
        t_max: Float,
        inv_dir: &Vector3f,
        dir_is_neg: &[usize; 3],
    ) -> Option<Float> {
        // Check for ray intersection against x and y slabs.
        let mut t0 = (self[dir_is_neg[0]].x - ray.o.x) * inv_dir.x;
        let mut t1 = (self[1 - dir_is_neg[0]].x - ray.o.x) * inv_dir.x;
        let ty0 = (self[dir_is_neg[1]].y - ray.o.y) * inv_dir.y;
        let mut ty1 = (self[1 - dir_is_neg[1]].y - ray.o.y) * inv_dir.y;

        // Update `t1` and `ty1` to ensure robust bounds intersection.
        t1 *= 1.0 + 2.0 * gamma(3);
        ty1 *= 1.0 + 2.0 * gamma(3);
        if t0 > ty1 || ty0 > t1 {
            return None;
        }
        if ty0 > t0 {
            t0 = ty0;
        }
        if ty1 < t1 {
            t1 = ty1;
        }

        // Check for ray intersection against z slab.
        let tz0 = (self[dir_is_neg[2]].z - ray.o.z) * inv_dir.z;
        let mut tz1 = (self[1 - dir_is_neg[2]].z - ray.o.z) * inv_dir.z;
        tz1 *= 1.0 + 2.0 * gamma(3);
        if t0 > tz1 || tz0 > t1 {
            return None;
        }
        if tz0 > t0 {
            t0 = tz0;
        }
        if tz1 < t1 {
            t1 = tz1;
        }

        if t0 < t_max && t1 > ray.t_min {
            Some(if t0 > ray.t_min { t0 } else { ray.t_min })
        } else {
            None
        }
    }
}

impl Default for Bounds3f {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<Point3f> for Bounds3f {
    fn from(p: Point3f) -> Self {
        Self { p_min: p, p_max: p }
    }
}

impl<T> Index<usize> for Bounds3<T> {
    type Output = Point3<T>;

    /// Index 0 returns the minimum corner and 1 the maximum corner.
    fn index(&self, i: usize) -> &Self::Output {
        match i {
            0 => &self.p_min,
            1 => &self.p_max,
            _ => panic!("invalid index {i} into Bounds3"),
        }
    }
}

impl<T: Copy> Bounds3<T> {
    /// Returns the extent of the box along one axis.
    ///
    /// * `axis` - The axis.
    pub fn extent(&self, axis: Axis) -> (T, T) {
        (self.p_min[axis], self.p_max[axis])
    }
}

impl From<Bounds3f> for (Vector3f, Vector3f) {
    fn from(b: Bounds3f) -> Self {
        (Vector3::from(b.p_min), Vector3::from(b.p_max))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn unit_box() -> Bounds3f {
        Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0))
    }

    fn slab_test(b: &Bounds3f, ray: &Ray) -> Option<Float> {
        let inv_dir = ray.d.recip();
        let dir_is_neg = [
            (inv_dir.x < 0.0) as usize,
            (inv_dir.y < 0.0) as usize,
            (inv_dir.z < 0.0) as usize,
        ];
        b.intersect_p_inv(ray, ray.t_max, &inv_dir, &dir_is_neg)
    }

    #[test]
    fn empty_is_union_identity() {
        let b = unit_box();
        assert_eq!(Bounds3f::EMPTY.union(&b), b);
        assert_eq!(Bounds3f::EMPTY.surface_area(), 0.0);
        assert!(Bounds3f::EMPTY.is_empty());
    }

    #[test]
    fn surface_area_of_unit_box() {
        assert!(approx_eq!(Float, unit_box().surface_area(), 6.0));
    }

    #[test]
    fn offset_maps_corners() {
        let b = Bounds3f::new(Point3f::new(-1.0, 0.0, 2.0), Point3f::new(1.0, 4.0, 6.0));
        assert_eq!(b.offset(&b.p_min), Vector3f::zero());
        assert_eq!(b.offset(&b.p_max), Vector3f::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn slab_test_hits_and_misses() {
        let b = unit_box();
        let hit = Ray::new(Point3f::new(0.5, 0.5, -2.0), Vector3f::new(0.0, 0.0, 1.0));
        let t = slab_test(&b, &hit);
        assert!(t.is_some());
        assert!(approx_eq!(Float, t.unwrap_or(-1.0), 2.0, epsilon = 1e-5));

        let miss = Ray::new(Point3f::new(2.5, 0.5, -2.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(slab_test(&b, &miss).is_none());

        let behind = Ray::new(Point3f::new(0.5, 0.5, 2.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(slab_test(&b, &behind).is_none());
    }

    #[test]
    fn slab_test_from_inside_returns_t_min() {
        let b = unit_box();
        let ray = Ray::new(Point3f::new(0.5, 0.5, 0.5), Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(slab_test(&b, &ray), Some(ray.t_min));
    }
}
