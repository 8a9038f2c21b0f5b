use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Smallest divisor any parameter-derived scale is allowed to reach.
pub const EPSILON: f64 = 1e-6;

/// Linear remap of `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
/// Output ranges may be inverted (`out_min > out_max`). No clamping.
#[inline]
pub fn remap(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Replaces a divisor whose magnitude is below [`EPSILON`] (or NaN) with `EPSILON`.
#[inline]
pub fn guard_divisor(value: f64) -> f64 {
    if value.abs() < EPSILON || value.is_nan() {
        EPSILON
    } else {
        value
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (self - other).length()
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    #[inline]
    fn mul(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}

impl Neg for Point {
    type Output = Point;
    #[inline]
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn remap_is_linear() {
        assert_relative_eq!(remap(0.0, -1.0, 1.0, 0.0, 1.0), 0.5);
        assert_relative_eq!(remap(-1.0, -1.0, 1.0, 0.0, 1.0), 0.0);
        assert_relative_eq!(remap(1.0, -1.0, 1.0, 0.0, 1.0), 1.0);
        assert_relative_eq!(remap(42.0, 0.0, 200.0, 0.0, 1.0), 0.21);
    }

    #[test]
    fn remap_handles_inverted_output() {
        assert_relative_eq!(remap(0.25, 0.0, 1.0, 1.0, 0.0), 0.75);
        assert_relative_eq!(remap(1.0, 0.0, 1.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn remap_extrapolates() {
        assert_relative_eq!(remap(2.0, 0.0, 1.0, 0.0, 10.0), 20.0);
    }

    #[test]
    fn guard_divisor_replaces_degenerate_values() {
        assert_eq!(guard_divisor(0.0), EPSILON);
        assert_eq!(guard_divisor(1e-9), EPSILON);
        assert_eq!(guard_divisor(f64::NAN), EPSILON);
        assert_eq!(guard_divisor(42.0), 42.0);
        assert_eq!(guard_divisor(-3.0), -3.0);
    }

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);
        assert_eq!(b - a, Point::new(3.0, 4.0));
        assert_relative_eq!(a.distance(b), 5.0);
        assert_eq!(-a * 2.0, Point::new(-2.0, -4.0));
    }
}
