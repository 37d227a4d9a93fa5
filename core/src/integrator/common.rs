//! Common

use crate::geometry::*;
use crate::primitive::TraversalStats;
use crate::spectrum::*;
use crate::{stat_counter, stat_inc, stat_register_fns};

stat_counter!("Integrator/NaN radiance samples", NAN_RADIANCE, integrator_stats_nan);
stat_counter!("Integrator/Infinite radiance samples", INF_RADIANCE, integrator_stats_inf);
stat_counter!("Integrator/Negative radiance samples", NEGATIVE_RADIANCE, integrator_stats_negative);

stat_register_fns!(integrator_stats_nan, integrator_stats_inf, integrator_stats_negative);

/// Registers the radiance statistics. Call once per renderer.
pub fn register_integrator_stats() {
    register_stats();
}

/// Replaces NaN, infinite or negative radiance with black and clamps each
/// channel to `max_value`. A single bad sample then never corrupts the
/// running mean of its pixel.
///
/// * `l`         - Radiance of one sample.
/// * `max_value` - Per-channel clamp.
pub fn sanitize_radiance(l: Spectrum, max_value: Float) -> Spectrum {
    if l.has_nans() {
        stat_inc!(NAN_RADIANCE, 1);
        debug!("NaN radiance sample discarded");
        return Spectrum::ZERO;
    }
    if !l.is_finite() {
        stat_inc!(INF_RADIANCE, 1);
        debug!("Infinite radiance sample discarded");
        return Spectrum::ZERO;
    }
    if l.has_negatives() {
        stat_inc!(NEGATIVE_RADIANCE, 1);
        debug!("Negative radiance sample {:?} discarded", l);
        return Spectrum::ZERO;
    }
    if max_value.is_finite() {
        l.clamp(0.0, max(max_value, 0.0))
    } else {
        l
    }
}

/// Maps a unit normal to a displayable color `0.5 * n + 0.5`.
///
/// * `n` - Unit normal.
pub fn normal_to_color(n: &Vector3f) -> Spectrum {
    Spectrum::from_rgb(0.5 * n.x + 0.5, 0.5 * n.y + 0.5, 0.5 * n.z + 0.5)
}

/// Traversal cost that maps to full intensity on the heat map.
pub const COMPLEXITY_SCALE: Float = 128.0;

/// Maps traversal cost to a blue-to-red heat color.
///
/// * `stats` - Traversal statistics of the primary ray.
pub fn complexity_to_color(stats: &TraversalStats) -> Spectrum {
    let t = clamp(stats.total() as Float / COMPLEXITY_SCALE, 0.0, 1.0);
    Spectrum::from_rgb(t, 1.0 - (2.0 * t - 1.0).abs(), 1.0 - t)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_discards_bad_samples() {
        assert_eq!(
            sanitize_radiance(Spectrum::from_rgb(1.0, Float::NAN, 0.0), INFINITY),
            Spectrum::ZERO
        );
        assert_eq!(
            sanitize_radiance(Spectrum::from_rgb(1.0, INFINITY, 0.0), INFINITY),
            Spectrum::ZERO
        );
        assert_eq!(
            sanitize_radiance(Spectrum::from_rgb(1.0, -0.1, 0.0), INFINITY),
            Spectrum::ZERO
        );
        assert_eq!(
            sanitize_radiance(Spectrum::from_rgb(1.0, 5.0, 0.0), 2.0),
            Spectrum::from_rgb(1.0, 2.0, 0.0)
        );
    }

    #[test]
    fn normal_colors() {
        assert_eq!(
            normal_to_color(&Vector3f::new(0.0, 0.0, 1.0)),
            Spectrum::from_rgb(0.5, 0.5, 1.0)
        );
    }

    #[test]
    fn complexity_saturates() {
        let cold = complexity_to_color(&TraversalStats::default());
        assert_eq!(cold, Spectrum::from_rgb(0.0, 0.0, 1.0));
        let hot = complexity_to_color(&TraversalStats {
            nodes_visited: 1000,
            primitives_tested: 1000,
        });
        assert_eq!(hot, Spectrum::from_rgb(1.0, 0.0, 0.0));
    }
}
