//! Plane geometry shared by every other module: points, sizes, rectangles,
//! piece transforms and angle arithmetic.
//!
//! World space is y-up. Rotations are signed degrees, counter-clockwise,
//! normalized to `[0, 360)` wherever they are stored.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point (or displacement) in world or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotate around the origin by `degrees`, counter-clockwise.
    #[must_use]
    pub fn rotated(self, degrees: f64) -> Point {
        let (s, c) = degrees.to_radians().sin_cos();
        Point { x: self.x * c - self.y * s, y: self.x * s + self.y * c }
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

impl From<[f64; 2]> for Point {
    fn from(v: [f64; 2]) -> Self {
        Point { x: v[0], y: v[1] }
    }
}

/// Non-uniform scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Largest per-axis absolute difference to `other`.
    #[must_use]
    pub fn max_axis_delta(self, other: Scale) -> f64 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl From<[f64; 2]> for Scale {
    fn from(v: [f64; 2]) -> Self {
        Scale { x: v[0], y: v[1] }
    }
}

/// Unscaled width and height of a piece or slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<[f64; 2]> for Size {
    fn from(v: [f64; 2]) -> Self {
        Size { width: v[0], height: v[1] }
    }
}

/// Axis-aligned rectangle stored as min/max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Build from a bottom-left corner and a size, like `Rect(x, y, w, h)`.
    #[must_use]
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { min_x: x, min_y: y, max_x: x + width, max_y: y + height }
    }

    /// Build from a center point and half extents.
    #[must_use]
    pub fn from_center(center: Point, half_w: f64, half_h: f64) -> Self {
        Self {
            min_x: center.x - half_w,
            min_y: center.y - half_h,
            max_x: center.x + half_w,
            max_y: center.y + half_h,
        }
    }

    /// Smallest rectangle containing every point. `None` for an empty slice.
    #[must_use]
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut r = Rect { min_x: first.x, min_y: first.y, max_x: first.x, max_y: first.y };
        for p in &points[1..] {
            r.min_x = r.min_x.min(p.x);
            r.min_y = r.min_y.min(p.y);
            r.max_x = r.max_x.max(p.x);
            r.max_y = r.max_y.max(p.y);
        }
        Some(r)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point { x: (self.min_x + self.max_x) * 0.5, y: (self.min_y + self.max_y) * 0.5 }
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Strict overlap: rectangles that only share an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        other.max_x > self.min_x && other.min_x < self.max_x && other.max_y > self.min_y && other.min_y < self.max_y
    }

    /// Shrink by `dx` on the left and right and `dy` on the top and bottom.
    #[must_use]
    pub fn shrink(&self, dx: f64, dy: f64) -> Rect {
        Rect { min_x: self.min_x + dx, min_y: self.min_y + dy, max_x: self.max_x - dx, max_y: self.max_y - dy }
    }

    /// Same rectangle with min/max swapped where they were inverted.
    #[must_use]
    pub fn normalized(&self) -> Rect {
        Rect {
            min_x: self.min_x.min(self.max_x),
            min_y: self.min_y.min(self.max_y),
            max_x: self.min_x.max(self.max_x),
            max_y: self.min_y.max(self.max_y),
        }
    }

    /// Grow by `d` on every side.
    #[must_use]
    pub fn expand(&self, d: f64) -> Rect {
        self.shrink(-d, -d)
    }
}

/// Position, rotation and scale of a piece or slot reference.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Point,
    /// Degrees in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub scale: Scale,
}

impl Transform {
    #[must_use]
    pub fn at(position: Point) -> Self {
        Self { position, rotation: 0.0, scale: Scale::default() }
    }

    #[must_use]
    pub fn new(position: Point, rotation: f64, scale: Scale) -> Self {
        Self { position, rotation: normalize_degrees(rotation), scale }
    }

    /// The four world-space corners of a `size` rectangle centered on the
    /// position, after scale and rotation.
    #[must_use]
    pub fn corners(&self, size: Size) -> [Point; 4] {
        let hw = size.width * self.scale.x * 0.5;
        let hh = size.height * self.scale.y * 0.5;
        [Point::new(-hw, -hh), Point::new(hw, -hh), Point::new(hw, hh), Point::new(-hw, hh)]
            .map(|c| self.position + c.rotated(self.rotation))
    }

    /// Axis-aligned bounding region of the transformed rectangle.
    #[must_use]
    pub fn bounds(&self, size: Size) -> Rect {
        let corners = self.corners(size);
        Rect::enclosing(&corners).unwrap_or_else(|| Rect::from_center(self.position, 0.0, 0.0))
    }
}

/// Wrap any angle into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if d >= 360.0 { 0.0 } else { d }
}

/// Angular difference along the shorter arc, in `[0, 180]`.
#[must_use]
pub fn circular_delta(a: f64, b: f64) -> f64 {
    let raw = (normalize_degrees(a) - normalize_degrees(b)).abs();
    if raw > 180.0 { 360.0 - raw } else { raw }
}
