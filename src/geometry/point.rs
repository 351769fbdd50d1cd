//! 2D point/vector type and angle helpers
//!
//! All coordinates are f64 millimeters. Angles are radians, measured
//! counterclockwise from the positive x axis.

use std::f64::consts::TAU;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::Serialize;

/// A 2D point, also used as a vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians
    pub fn from_angle(angle: f64) -> Self {
        Self { x: angle.cos(), y: angle.sin() }
    }

    pub fn squared_norm(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn norm(&self) -> f64 {
        self.squared_norm().sqrt()
    }

    pub fn distance(&self, other: Point) -> f64 {
        (*self - other).norm()
    }

    pub fn squared_distance(&self, other: Point) -> f64 {
        (*self - other).squared_norm()
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product; sign gives turn direction
    pub fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Same direction, rescaled to `length`. The zero vector stays zero.
    pub fn resize(&self, length: f64) -> Point {
        let n = self.norm();
        if n < f64::EPSILON {
            return Point::ZERO;
        }
        *self * (length / n)
    }

    /// Counterclockwise perpendicular
    pub fn perpendicular(&self) -> Point {
        Point { x: -self.y, y: self.x }
    }

    /// Angle of this vector in [0, 2π)
    pub fn angle(&self) -> f64 {
        normalize_angle(self.y.atan2(self.x))
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point { x: (self.x + other.x) / 2.0, y: (self.y + other.y) / 2.0 }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point { x: self.x * rhs, y: self.y * rhs }
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point { x: self.x / rhs, y: self.y / rhs }
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point { x: -self.x, y: -self.y }
    }
}

/// Normalize an angle to [0, 2π). Closed form, safe for any finite input.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can return TAU itself when the input is a tiny negative
    if a >= TAU {
        a - TAU
    } else {
        a
    }
}

/// Counterclockwise sweep from `from` to `to`, in [0, 2π)
pub fn ccw_sweep(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// Quantize a millimeter coordinate to a 0.1 µm grid for hashing
pub fn quantize_mm(value: f64) -> i64 {
    const SCALE: f64 = 10000.0; // 0.1 micron precision
    (value * SCALE).round() as i64
}

/// Quantized (x, y) pair, usable as an exact hash/equality key
pub fn quantize_point(p: Point) -> (i64, i64) {
    (quantize_mm(p.x), quantize_mm(p.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_resize() {
        let v = Point::new(3.0, 4.0);
        let r = v.resize(10.0);
        assert!((r.norm() - 10.0).abs() < 1e-9);
        assert!((r.x - 6.0).abs() < 1e-9);
        assert!((r.y - 8.0).abs() < 1e-9);
        assert_eq!(Point::ZERO.resize(5.0), Point::ZERO);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(0.0) - 0.0).abs() < 1e-12);
        assert!((normalize_angle(TAU + 0.5) - 0.5).abs() < 1e-12);
        assert!((normalize_angle(-PI / 2.0) - 3.0 * PI / 2.0).abs() < 1e-12);
        // Large magnitudes stay bounded without iteration
        assert!(normalize_angle(1e9) >= 0.0);
        assert!(normalize_angle(1e9) < TAU);
        assert!(normalize_angle(-1e9) >= 0.0);
        assert!(normalize_angle(-1e9) < TAU);
    }

    #[test]
    fn test_ccw_sweep() {
        assert!((ccw_sweep(0.0, PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert!((ccw_sweep(PI / 2.0, 0.0) - 3.0 * PI / 2.0).abs() < 1e-12);
        assert!((ccw_sweep(1.0, 1.0) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_quantize_point() {
        let a = Point::new(1.00001, -2.0);
        let b = Point::new(1.000011, -2.0000004);
        // Differences below the 0.1 µm grid collapse to the same key
        assert_eq!(quantize_point(a), quantize_point(b));
        assert_ne!(quantize_point(a), quantize_point(Point::new(1.001, -2.0)));
    }
}
