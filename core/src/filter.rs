//! Pixel reconstruction filters

use crate::geometry::*;

/// Reconstruction filter applied to primary samples. Samples are jittered
/// uniformly over the filter support and weighted by the filter value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Filter {
    /// Constant weight over a square of half-width `radius`.
    Box { radius: Float },

    /// Truncated Gaussian with half-width `radius`, shifted so that it is zero
    /// at the support boundary.
    Gaussian { radius: Float, falloff: Float },
}

impl Default for Filter {
    fn default() -> Self {
        Filter::Gaussian {
            radius: 0.75,
            falloff: 1.0,
        }
    }
}

impl Filter {
    /// Returns the half-width of the filter support.
    pub fn radius(&self) -> Float {
        match self {
            Filter::Box { radius } => *radius,
            Filter::Gaussian { radius, .. } => *radius,
        }
    }

    /// Returns true if the filter gives positive weight near the pixel
    /// centre. A negative, zero or NaN radius or falloff would weight every
    /// sample by 0 and the image would never converge.
    pub fn is_valid(&self) -> bool {
        let positive = |v: Float| v.is_finite() && v > 0.0;
        match *self {
            Filter::Box { radius } => positive(radius),
            Filter::Gaussian { radius, falloff } => positive(radius) && positive(falloff),
        }
    }

    /// Evaluates the filter at an offset from the pixel centre.
    ///
    /// * `p` - Offset from the pixel centre.
    pub fn evaluate(&self, p: &Point2f) -> Float {
        match self {
            Filter::Box { radius } => {
                if p.x.abs() <= *radius && p.y.abs() <= *radius {
                    1.0
                } else {
                    0.0
                }
            }
            Filter::Gaussian { radius, falloff } => {
                gaussian(p.x, *radius, *falloff) * gaussian(p.y, *radius, *falloff)
            }
        }
    }

    /// Maps uniform variates to a film offset and the weight of the sample.
    ///
    /// * `u` - Two uniform variates in [0, 1).
    pub fn sample(&self, u: &Point2f) -> (Point2f, Float) {
        let r = self.radius();
        let offset = Point2f::new(lerp(u.x, -r, r), lerp(u.y, -r, r));
        (offset, self.evaluate(&offset))
    }
}

/// 1-D Gaussian shifted to zero at `radius`.
fn gaussian(d: Float, radius: Float, falloff: Float) -> Float {
    max(0.0, (-falloff * d * d).exp() - (-falloff * radius * radius).exp())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn degenerate_filters_are_invalid() {
        assert!(Filter::default().is_valid());
        assert!(Filter::Box { radius: 0.5 }.is_valid());
        assert!(!Filter::Box { radius: -0.5 }.is_valid());
        assert!(!Filter::Box { radius: 0.0 }.is_valid());
        assert!(!Filter::Box { radius: Float::NAN }.is_valid());
        assert!(!Filter::Gaussian {
            radius: Float::INFINITY,
            falloff: 1.0
        }
        .is_valid());
        assert!(!Filter::Gaussian {
            radius: 0.75,
            falloff: 0.0
        }
        .is_valid());
    }

    #[test]
    fn gaussian_vanishes_at_support() {
        let f = Filter::default();
        assert!(approx_eq!(Float, f.evaluate(&Point2f::new(0.75, 0.0)), 0.0));
        assert!(f.evaluate(&Point2f::new(0.0, 0.0)) > f.evaluate(&Point2f::new(0.5, 0.0)));
        assert!(f.evaluate(&Point2f::new(0.5, 0.5)) > 0.0);
    }

    #[test]
    fn box_is_constant() {
        let f = Filter::Box { radius: 0.5 };
        let (offset, weight) = f.sample(&Point2f::new(0.9, 0.1));
        assert!(offset.x.abs() <= 0.5 && offset.y.abs() <= 0.5);
        assert_eq!(weight, 1.0);
        assert_eq!(f.evaluate(&Point2f::new(0.6, 0.0)), 0.0);
    }
}
