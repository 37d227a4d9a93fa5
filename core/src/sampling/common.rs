//! Common

use crate::geometry::*;

/// Sample a point on a unit disk by mapping from a unit square to the unit
/// circle. The concentric mapping takes points in [-1, 1]^2 to unit disk by
/// uniformly mapping concentric squares to concentric circles.
///
/// * `u` - The random sample point.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // Map uniform random numbers to [-1,1]^2.
    let u_offset = Point2f::new(2.0 * u.x - 1.0, 2.0 * u.y - 1.0);

    // Handle degeneracy at the origin.
    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::new(0.0, 0.0);
    }

    // Apply concentric mapping to point
    let (r, theta) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, PI_OVER_FOUR * (u_offset.y / u_offset.x))
    } else {
        (
            u_offset.y,
            PI_OVER_TWO - PI_OVER_FOUR * (u_offset.x / u_offset.y),
        )
    };

    r * Point2f::new(theta.cos(), theta.sin())
}

/// Sample a direction on the `+z` hemisphere using cosine-weighted sampling.
///
/// * `u` - The random sample point.
#[inline]
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = safe_sqrt(1.0 - d.x * d.x - d.y * d.y);
    Vector3f::new(d.x, d.y, z)
}

/// Returns the PDF for cosine-weighted sampling a direction from a hemisphere.
///
/// * `cos_theta` - Cosine term of incident radiance.
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    max(cos_theta, 0.0) * INV_PI
}

/// Uniformly sample barycentric coordinates on a triangle.
///
/// * `u` - The random sample point.
pub fn uniform_sample_triangle(u: &Point2f) -> Point2f {
    let su0 = u.x.sqrt();
    Point2f::new(1.0 - su0, u.y * su0)
}

/// Converts a density with respect to surface area at `p_light` into a
/// density with respect to solid angle as seen from `p_ref`. Returns 0 when
/// the surface is seen exactly edge-on.
///
/// * `pdf_area` - Density with respect to area.
/// * `p_ref`    - The point the light is seen from.
/// * `p_light`  - The point on the light.
/// * `n_light`  - Unit surface normal at `p_light`.
pub fn area_to_solid_angle_pdf(
    pdf_area: Float,
    p_ref: &Point3f,
    p_light: &Point3f,
    n_light: &Vector3f,
) -> Float {
    let d = *p_light - *p_ref;
    let dist2 = d.length_squared();
    if dist2 == 0.0 {
        return 0.0;
    }
    let cos_light = n_light.abs_dot(&d) / dist2.sqrt();
    if cos_light <= 0.0 {
        0.0
    } else {
        pdf_area * dist2 / cos_light
    }
}

/// Weight samples using the balance heuristic.
///
/// * `nf`    - Number of samples taken from `f_pdf`.
/// * `f_pdf` - First sampling distribution.
/// * `ng`    - Number of samples taken from `g_pdf`.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn balance_heuristic(nf: u32, f_pdf: Float, ng: u32, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f + g > 0.0 {
        f / (f + g)
    } else {
        0.0
    }
}

/// Weight samples using the power heuristic with exponent 2.
///
/// * `nf`    - Number of samples taken from `f_pdf`.
/// * `f_pdf` - First sampling distribution.
/// * `ng`    - Number of samples taken from `g_pdf`.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn power_heuristic(nf: u32, f_pdf: Float, ng: u32, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f.is_infinite() {
        return 1.0;
    }
    let denom = f * f + g * g;
    if denom > 0.0 {
        (f * f) / denom
    } else {
        0.0
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
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn concentric_disk_inside_unit_circle(u in 0.0..1.0f32, v in 0.0..1.0f32) {
            let p = concentric_sample_disk(&Point2f::new(u, v));
            prop_assert!(p.x * p.x + p.y * p.y <= 1.0 + 1e-5);
        }

        #[test]
        fn cosine_hemisphere_is_upper_unit(u in 0.0..1.0f32, v in 0.0..1.0f32) {
            let w = cosine_sample_hemisphere(&Point2f::new(u, v));
            prop_assert!(w.z >= 0.0);
            prop_assert!(approx_eq!(Float, w.length(), 1.0, epsilon = 1e-4));
        }

        #[test]
        fn triangle_barycentrics_are_valid(u in 0.0..1.0f32, v in 0.0..1.0f32) {
            let b = uniform_sample_triangle(&Point2f::new(u, v));
            prop_assert!(b.x >= 0.0 && b.y >= 0.0 && b.x + b.y <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn cosine_estimator_integrates_cosine() {
        // E[cos / pdf] = π over the hemisphere.
        let mut rng = RNG::new(5);
        let n = 4096;
        let mut sum = 0.0;
        for _ in 0..n {
            let w = cosine_sample_hemisphere(&Point2f::new(rng.uniform_float(), rng.uniform_float()));
            let pdf = cosine_hemisphere_pdf(w.z);
            if pdf > 0.0 {
                sum += w.z / pdf;
            }
        }
        assert!(approx_eq!(Float, sum / n as Float, PI, epsilon = 1e-3));
    }

    #[test]
    fn heuristics_sum_to_one() {
        let a = power_heuristic(1, 0.3, 1, 1.7);
        let b = power_heuristic(1, 1.7, 1, 0.3);
        assert!(approx_eq!(Float, a + b, 1.0, epsilon = 1e-6));
        let a = balance_heuristic(1, 0.3, 1, 1.7);
        let b = balance_heuristic(1, 1.7, 1, 0.3);
        assert!(approx_eq!(Float, a + b, 1.0, epsilon = 1e-6));
        assert_eq!(power_heuristic(1, 0.0, 1, 0.0), 0.0);
    }

    #[test]
    fn solid_angle_pdf_follows_inverse_square() {
        let n = Vector3f::new(0.0, -1.0, 0.0);
        let p_ref = Point3f::new(0.0, 0.0, 0.0);
        let near = area_to_solid_angle_pdf(1.0, &p_ref, &Point3f::new(0.0, 1.0, 0.0), &n);
        let far = area_to_solid_angle_pdf(1.0, &p_ref, &Point3f::new(0.0, 2.0, 0.0), &n);
        assert!(approx_eq!(Float, near, 1.0));
        assert!(approx_eq!(Float, far, 4.0));
        let edge_on = Vector3f::new(1.0, 0.0, 0.0);
        assert_eq!(area_to_solid_angle_pdf(1.0, &p_ref, &Point3f::new(0.0, 1.0, 0.0), &edge_on), 0.0);
    }
}
