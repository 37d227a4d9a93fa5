//! 2-D Points

use super::Float;
use num_traits::Num;
use std::ops::{Add, Mul, Sub};

/// A 2-D point containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,
}

/// 2-D point containing `Float` values.
pub type Point2f = Point2<Float>;

/// Creates a new 2-D point.
///
/// * `x` - X-coordinate.
/// * `y` - Y-coordinate.
#[inline(always)]
pub fn point2<T>(x: T, y: T) -> Point2<T> {
    Point2 { x, y }
}

impl<T: Num> Point2<T> {
    /// Creates a new 2-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Num> Add for Point2<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        point2(self.x + other.x, self.y + other.y)
    }
}

impl<T: Num> Sub for Point2<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        point2(self.x - other.x, self.y - other.y)
    }
}

impl<T: Num + Copy> Mul<T> for Point2<T> {
    type Output = Self;

    fn mul(self, f: T) -> Self::Output {
        point2(self.x * f, self.y * f)
    }
}

impl Mul<Point2f> for Float {
    type Output = Point2f;

    fn mul(self, p: Point2f) -> Self::Output {
        p * self
    }
}
