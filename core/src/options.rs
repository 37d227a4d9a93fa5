//! Render options

use crate::filter::Filter;
use crate::geometry::*;

/// Selects what a render pass writes into the film.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Full path-traced radiance.
    #[default]
    PathTrace,

    /// First-hit shading normal mapped to `0.5 * n + 0.5`.
    Normals,

    /// Heat map of the acceleration structure work for primary rays.
    Complexity,
}

/// Options recognized by the renderers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Options {
    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,

    /// Maximum number of bounces.
    pub max_depth: u32,

    /// Samples per pixel after which the session stops adding batches.
    pub max_samples: Option<u64>,

    /// Samples per pixel added by each render pass.
    pub samples_per_batch: u32,

    /// Exposure multiplier applied by the host before tone mapping.
    pub exposure: Float,

    /// White point of the tone mapping curve.
    pub limit: Float,

    /// Per-channel clamp applied to the radiance of a single sample.
    pub clamp: Float,

    /// Render mode.
    pub mode: RenderMode,

    /// Pixel reconstruction filter.
    pub filter: Filter,

    /// Seed for the sample streams.
    pub seed: u64,

    /// Depth from which Russian roulette may terminate paths.
    pub rr_depth: u32,

    /// Lower bound of the Russian roulette survival probability.
    pub rr_min_probability: Float,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 512,
            height: 256,
            max_depth: 4,
            max_samples: None,
            samples_per_batch: 16,
            exposure: 1.0,
            limit: 1.5,
            clamp: INFINITY,
            mode: RenderMode::PathTrace,
            filter: Filter::default(),
            seed: 0,
            rr_depth: 3,
            rr_min_probability: 0.05,
        }
    }
}

impl Options {
    /// Returns true if switching from `self` to `other` changes the estimate
    /// so that accumulated samples must be discarded. Exposure, limit and the
    /// sample budget only affect display or scheduling.
    ///
    /// * `other` - The new options.
    pub fn invalidates(&self, other: &Options) -> bool {
        self.width != other.width
            || self.height != other.height
            || self.max_depth != other.max_depth
            || self.clamp != other.clamp
            || self.mode != other.mode
            || self.filter != other.filter
            || self.seed != other.seed
            || self.rr_depth != other.rr_depth
            || self.rr_min_probability != other.rr_min_probability
    }

    /// Returns true once `samples` reaches the sample budget.
    ///
    /// * `samples` - Samples per pixel accumulated so far.
    pub fn is_complete(&self, samples: u64) -> bool {
        self.max_samples.map_or(false, |max| samples >= max)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_changes_keep_accumulation() {
        let a = Options::default();
        let b = Options {
            exposure: 2.0,
            limit: 4.0,
            max_samples: Some(64),
            ..a
        };
        assert!(!a.invalidates(&b));
        let c = Options { max_depth: 8, ..a };
        assert!(a.invalidates(&c));
        let d = Options {
            mode: RenderMode::Normals,
            ..a
        };
        assert!(a.invalidates(&d));
    }

    #[test]
    fn sample_budget() {
        let o = Options::default();
        assert!(!o.is_complete(1 << 40));
        let o = Options {
            max_samples: Some(32),
            ..o
        };
        assert!(!o.is_complete(16));
        assert!(o.is_complete(32));
    }
}
