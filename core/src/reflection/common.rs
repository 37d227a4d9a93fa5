//! Common

use super::*;

/// Returns cosθ for a normalized vector in the shading coordinate system.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

/// Returns cos^2(θ) for a normalized vector in the shading coordinate system.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn cos_2_theta(w: &Vector3f) -> Float {
    w.z * w.z
}

/// Returns |cosθ| for a normalized vector in the shading coordinate system.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    w.z.abs()
}

/// Returns sin^2(θ) for a normalized vector in the shading coordinate system.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn sin_2_theta(w: &Vector3f) -> Float {
    max(0.0, 1.0 - cos_2_theta(w))
}

/// Returns sinθ for a normalized vector in the shading coordinate system.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn sin_theta(w: &Vector3f) -> Float {
    sin_2_theta(w).sqrt()
}

/// Returns tanθ for a normalized vector in the shading coordinate system.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn tan_theta(w: &Vector3f) -> Float {
    sin_theta(w) / cos_theta(w)
}

/// Returns tan^2(θ) for a normalized vector in the shading coordinate system.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn tan_2_theta(w: &Vector3f) -> Float {
    sin_2_theta(w) / cos_2_theta(w)
}

/// Returns cosφ for a normalized vector in the shading coordinate system.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn cos_phi(w: &Vector3f) -> Float {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        1.0
    } else {
        clamp(w.x / sin_theta, -1.0, 1.0)
    }
}

/// Returns sinφ for a normalized vector in the shading coordinate system.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn sin_phi(w: &Vector3f) -> Float {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        0.0
    } else {
        clamp(w.y / sin_theta, -1.0, 1.0)
    }
}

/// Returns cos^2(φ) for a normalized vector in the shading coordinate system.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn cos_2_phi(w: &Vector3f) -> Float {
    cos_phi(w) * cos_phi(w)
}

/// Returns sin^2(φ) for a normalized vector in the shading coordinate system.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn sin_2_phi(w: &Vector3f) -> Float {
    sin_phi(w) * sin_phi(w)
}

/// Returns true if two vectors are in the same hemisphere.
///
/// * `w` - First vector.
/// * `wp` - Second vector.
#[inline(always)]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    w.z * wp.z > 0.0
}

/// Returns the direction vector for spherical coordinates in the shading
/// coordinate system.
///
/// * `sin_theta` - sinθ.
/// * `cos_theta` - cosθ.
/// * `phi`       - φ.
#[inline(always)]
pub fn spherical_direction(sin_theta: Float, cos_theta: Float, phi: Float) -> Vector3f {
    Vector3f::new(
        clamp(sin_theta, -1.0, 1.0) * phi.cos(),
        clamp(sin_theta, -1.0, 1.0) * phi.sin(),
        clamp(cos_theta, -1.0, 1.0),
    )
}

/// Reflect a vector about the given normal.
///
/// * `wo` - Outgoing direction.
/// * `n`  - The normal.
#[inline(always)]
pub fn reflect(wo: &Vector3f, n: &Vector3f) -> Vector3f {
    -(*wo) + *n * (2.0 * wo.dot(n))
}

/// Returns the Schlick weight `(1 - cosθ)^5`.
///
/// * `cos_theta` - Cosine of the angle.
#[inline(always)]
pub fn schlick_weight(cos_theta: Float) -> Float {
    pow5(clamp(1.0 - cos_theta, 0.0, 1.0))
}

/// Returns the Schlick approximation to the Fresnel reflection equations:
///
/// Fr(cosθ) = R + (1 - R)(1 - cosθ)^5
///
/// * `r0`        - Reflectance at normal incidence.
/// * `cos_theta` - Angle made by incident direction.
#[inline(always)]
pub fn fr_schlick(r0: Float, cos_theta: Float) -> Float {
    lerp(schlick_weight(cos_theta), r0, 1.0)
}

/// Spectral variant of `fr_schlick`.
///
/// * `r0`        - Reflectance at normal incidence.
/// * `cos_theta` - Angle made by incident direction.
#[inline(always)]
pub fn fr_schlick_spectrum(r0: &Spectrum, cos_theta: Float) -> Spectrum {
    let w = schlick_weight(cos_theta);
    *r0 + (Spectrum::ONE - *r0) * w
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
