//! Geometric primitives used by animatable style values.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

#[inline]
fn lerp32(from: f32, to: f32, progress: f64) -> f32 {
    (from as f64 + (to as f64 - from as f64) * progress) as f32
}

/// A 2D point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn lerp(&self, other: Point, progress: f64) -> Point {
        Point::new(
            lerp32(self.x, other.x, progress),
            lerp32(self.y, other.y, progress),
        )
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A 2D size. Also used for elliptical corner radii.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn square(side: f32) -> Self {
        Self { width: side, height: side }
    }

    #[inline]
    pub fn lerp(&self, other: Size, progress: f64) -> Size {
        Size::new(
            lerp32(self.width, other.width, progress),
            lerp32(self.height, other.height, progress),
        )
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Edge sizes (border widths).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeSizes {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeSizes {
    pub const ZERO: EdgeSizes = EdgeSizes {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    #[inline]
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    #[inline]
    pub const fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }
}

/// A 2D affine transformation matrix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub m31: f32,
    pub m32: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn new(m11: f32, m12: f32, m21: f32, m22: f32, m31: f32, m32: f32) -> Self {
        Self { m11, m12, m21, m22, m31, m32 }
    }

    pub fn translation(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `angle` radians.
    pub fn rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            m11: self.m11 * other.m11 + self.m12 * other.m21,
            m12: self.m11 * other.m12 + self.m12 * other.m22,
            m21: self.m21 * other.m11 + self.m22 * other.m21,
            m22: self.m21 * other.m12 + self.m22 * other.m22,
            m31: self.m31 * other.m11 + self.m32 * other.m21 + other.m31,
            m32: self.m31 * other.m12 + self.m32 * other.m22 + other.m32,
        }
    }

    pub fn transform_point(&self, point: Point) -> Point {
        Point::new(
            self.m11 * point.x + self.m21 * point.y + self.m31,
            self.m12 * point.x + self.m22 * point.y + self.m32,
        )
    }

    /// Component-wise interpolation towards `other`.
    pub fn lerp(&self, other: &Transform, progress: f64) -> Transform {
        Transform {
            m11: lerp32(self.m11, other.m11, progress),
            m12: lerp32(self.m12, other.m12, progress),
            m21: lerp32(self.m21, other.m21, progress),
            m22: lerp32(self.m22, other.m22, progress),
            m31: lerp32(self.m31, other.m31, progress),
            m32: lerp32(self.m32, other.m32, progress),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_lerp() {
        let p = Point::new(0.0, 10.0).lerp(Point::new(10.0, 20.0), 0.5);
        assert!((p.x - 5.0).abs() < 0.001);
        assert!((p.y - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_size_lerp_extrapolates() {
        let s = Size::square(10.0).lerp(Size::new(20.0, 30.0), 1.5);
        assert!((s.width - 25.0).abs() < 0.001);
        assert!((s.height - 40.0).abs() < 0.001);
    }

    #[test]
    fn test_transform_then() {
        let t = Transform::scale(2.0, 2.0).then(&Transform::translation(5.0, 0.0));
        let p = t.transform_point(Point::new(1.0, 1.0));
        assert!((p.x - 7.0).abs() < 0.001);
        assert!((p.y - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_transform_lerp() {
        let t = Transform::identity().lerp(&Transform::translation(10.0, 20.0), 0.25);
        assert!((t.m31 - 2.5).abs() < 0.001);
        assert!((t.m32 - 5.0).abs() < 0.001);
        assert!(Transform::identity().lerp(&Transform::identity(), 0.3).is_identity());
    }
}
