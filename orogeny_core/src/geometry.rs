// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 3D points and axis-aligned boxes.
//!
//! 2D geometry uses [`kurbo`] types directly; these fill in the Z axis.

use kurbo::{Point, Rect};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A point in 3D space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3 {
    /// The origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Drops the Z coordinate.
    #[inline]
    #[must_use]
    pub const fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for Point3 {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y, 0.0)
    }
}

/// An axis-aligned box in 3D space.
///
/// A box whose max is below its min on any axis is empty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Bounds3 {
    /// An empty box.
    pub const EMPTY: Self = Self {
        min: Point3::new(0.0, 0.0, 0.0),
        max: Point3::new(-1.0, -1.0, -1.0),
    };

    /// Creates a box from its minimum corner and extents.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, width: f64, height: f64, depth: f64) -> Self {
        Self {
            min: Point3::new(x, y, z),
            max: Point3::new(x + width, y + height, z + depth),
        }
    }

    /// Creates a flat box at `z = 0` from a rectangle.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        let r = rect.abs();
        Self {
            min: Point3::new(r.x0, r.y0, 0.0),
            max: Point3::new(r.x1, r.y1, 0.0),
        }
    }

    /// Projects onto the XY plane.
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(self.min.x, self.min.y, self.max.x, self.max.y)
    }

    /// Smallest box containing every point, or [`EMPTY`](Self::EMPTY) when
    /// `points` is empty.
    #[must_use]
    pub fn bounding(points: &[Point3]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::EMPTY;
        };
        let mut min = *first;
        let mut max = *first;
        for p in rest {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Self { min, max }
    }

    /// Extent along X.
    #[inline]
    #[must_use]
    pub fn width(self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along Y.
    #[inline]
    #[must_use]
    pub fn height(self) -> f64 {
        self.max.y - self.min.y
    }

    /// Extent along Z.
    #[inline]
    #[must_use]
    pub fn depth(self) -> f64 {
        self.max.z - self.min.z
    }

    /// Whether the box has a negative extent on any axis.
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// The 8 corners, min-Z face first.
    #[must_use]
    pub fn corners(self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(a.x, b.y, b.z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_of_points() {
        let b = Bounds3::bounding(&[
            Point3::new(1.0, 5.0, 0.0),
            Point3::new(-2.0, 3.0, 4.0),
            Point3::new(0.0, 7.0, -1.0),
        ]);
        assert_eq!(b.min, Point3::new(-2.0, 3.0, -1.0), "min corner");
        assert_eq!(b.max, Point3::new(1.0, 7.0, 4.0), "max corner");
        assert_eq!(b.depth(), 5.0, "depth spans both z extremes");
    }

    #[test]
    fn empty_input_gives_empty_box() {
        assert!(Bounds3::bounding(&[]).is_empty(), "no points, no box");
        assert!(!Bounds3::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0).is_empty(), "degenerate box is not empty");
    }

    #[test]
    fn rect_round_trip() {
        let r = Rect::new(10.0, 20.0, 30.0, 50.0);
        assert_eq!(Bounds3::from_rect(r).to_rect(), r, "flat box keeps its rect");
    }

    #[test]
    fn distance_is_euclidean() {
        let d = Point3::new(1.0, 2.0, 2.0).distance(Point3::ORIGIN);
        assert!((d - 3.0).abs() < 1e-12, "got {d}");
    }
}
