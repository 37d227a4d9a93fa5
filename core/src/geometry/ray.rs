//! Rays

use super::{Float, Point3f, Vector3f, INFINITY, RAY_EPSILON, SHADOW_EPSILON};

/// A ray with a valid parametric interval `[t_min, t_max]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Minimum extent of the ray.
    pub t_min: Float,

    /// Maximum extent of the ray.
    pub t_max: Float,
}

impl Ray {
    /// Returns an unbounded ray.
    ///
    /// * `o` - Origin.
    /// * `d` - Direction.
    pub fn new(o: Point3f, d: Vector3f) -> Self {
        Self {
            o,
            d,
            t_min: 0.0,
            t_max: INFINITY,
        }
    }

    /// Returns a ray restricted to an interval.
    ///
    /// * `o`     - Origin.
    /// * `d`     - Direction.
    /// * `t_min` - Minimum extent of the ray.
    /// * `t_max` - Maximum extent of the ray.
    pub fn with_interval(o: Point3f, d: Vector3f, t_min: Float, t_max: Float) -> Self {
        Self { o, d, t_min, t_max }
    }

    /// Returns a ray leaving a surface point, offset along the geometric
    /// normal to the side `d` points into so it doesn't re-hit the surface.
    ///
    /// * `p`   - Surface point.
    /// * `n_g` - Geometric normal at `p`.
    /// * `d`   - Direction.
    pub fn spawn(p: &Point3f, n_g: &Vector3f, d: &Vector3f) -> Self {
        Self::new(offset_ray_origin(p, n_g, d), *d)
    }

    /// Returns a shadow ray from a surface point towards another point; the
    /// interval stops just short of the target.
    ///
    /// * `p`      - Surface point.
    /// * `n_g`    - Geometric normal at `p`.
    /// * `target` - The point to connect to.
    pub fn spawn_to(p: &Point3f, n_g: &Vector3f, target: &Point3f) -> Self {
        let o = offset_ray_origin(p, n_g, &(*target - *p));
        let d = *target - o;
        Self::with_interval(o, d, 0.0, 1.0 - SHADOW_EPSILON)
    }

    /// Returns true if any component is NaN.
    pub fn has_nans(&self) -> bool {
        self.o.x.is_nan()
            || self.o.y.is_nan()
            || self.o.z.is_nan()
            || self.d.has_nans()
            || self.t_min.is_nan()
            || self.t_max.is_nan()
    }

    /// Get position along the ray at given parameter.
    ///
    /// * `t` - Parameter to evaluate.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

/// Offsets a surface point along the normal, scaled by the magnitude of the
/// point so that the offset survives rounding far from the origin.
///
/// * `p`   - Surface point.
/// * `n_g` - Geometric normal at `p`.
/// * `w`   - Direction the new ray travels in.
pub fn offset_ray_origin(p: &Point3f, n_g: &Vector3f, w: &Vector3f) -> Point3f {
    let scale = RAY_EPSILON * (1.0 + p.x.abs().max(p.y.abs()).max(p.z.abs()));
    let offset = *n_g * scale;
    if w.dot(n_g) < 0.0 {
        *p - offset
    } else {
        *p + offset
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
