//! Orthonormal frames

use super::{vector3, Float, Vector3f};

/// Create a new coordinate system from a single unit vector and return
/// the two remaining vectors.
///
/// * `v1` - The first unit vector to form part of the coordinate system.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        vector3(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        vector3(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    let v3 = v1.cross(&v2);
    (v2, v3)
}

/// Orthonormal shading frame. Local coordinates have `n` along +z, `s` along
/// +x and `t` along +y.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// Tangent.
    pub s: Vector3f,

    /// Bitangent.
    pub t: Vector3f,

    /// Normal.
    pub n: Vector3f,
}

impl Frame {
    /// Creates a frame around a unit normal with an arbitrary tangent.
    ///
    /// * `n` - Unit normal.
    pub fn from_normal(n: &Vector3f) -> Self {
        let (s, t) = coordinate_system(n);
        Self { s, t, n: *n }
    }

    /// Creates a frame around a unit normal whose tangent is the projection of
    /// `tangent` onto the plane of the normal. Falls back to an arbitrary
    /// tangent when the projection degenerates.
    ///
    /// * `n`       - Unit normal.
    /// * `tangent` - Preferred tangent direction.
    pub fn from_normal_tangent(n: &Vector3f, tangent: &Vector3f) -> Self {
        match (*tangent - *n * n.dot(tangent)).try_normalize() {
            Some(s) => Self {
                s,
                t: n.cross(&s),
                n: *n,
            },
            None => Self::from_normal(n),
        }
    }

    /// Transforms a world space vector into the frame.
    ///
    /// * `v` - World space vector.
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        vector3(v.dot(&self.s), v.dot(&self.t), v.dot(&self.n))
    }

    /// Transforms a vector in the frame back into world space.
    ///
    /// * `v` - Local vector.
    pub fn from_local(&self, v: &Vector3f) -> Vector3f {
        self.s * v.x + self.t * v.y + self.n * v.z
    }

    /// Returns the cosine between the frame normal and a world vector.
    ///
    /// * `v` - World space vector.
    pub fn cos_theta(&self, v: &Vector3f) -> Float {
        v.dot(&self.n)
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

    proptest! {
        #[test]
        fn frame_is_orthonormal(
            x in -1.0..1.0f32,
            y in -1.0..1.0f32,
            z in -1.0..1.0f32,
        ) {
            let v = Vector3f::new(x, y, z);
            prop_assume!(v.length_squared() > 1e-3);
            let f = Frame::from_normal(&v.normalize());
            prop_assert!(approx_eq!(Float, f.s.length(), 1.0, epsilon = 1e-4));
            prop_assert!(approx_eq!(Float, f.t.length(), 1.0, epsilon = 1e-4));
            prop_assert!(f.s.dot(&f.n).abs() < 1e-4);
            prop_assert!(f.t.dot(&f.n).abs() < 1e-4);
            prop_assert!(f.s.dot(&f.t).abs() < 1e-4);
        }

        #[test]
        fn local_round_trip(
            x in -1.0..1.0f32,
            y in -1.0..1.0f32,
            z in -1.0..1.0f32,
        ) {
            let f = Frame::from_normal(&Vector3f::new(0.3, -0.4, 0.866).normalize());
            let v = Vector3f::new(x, y, z);
            let back = f.from_local(&f.to_local(&v));
            prop_assert!((back - v).length() < 1e-4);
        }
    }
}
