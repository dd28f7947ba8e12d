// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

use crate::geometry::Point3;

use super::{Transform, TransformCache, TransformKind};

/// A 2D shear about a pivot.
///
/// `x` is the multiplier by which Y shifts X coordinates, `y` the multiplier
/// by which X shifts Y coordinates.
#[derive(Clone, Debug, Default)]
pub struct Shear {
    x: f64,
    y: f64,
    pivot: Point,
    cache: TransformCache,
}

impl Shear {
    /// Shears about the origin.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self::with_pivot(x, y, 0.0, 0.0)
    }

    /// Shears about `(px, py)`.
    #[must_use]
    pub const fn with_pivot(x: f64, y: f64, px: f64, py: f64) -> Self {
        Self {
            x,
            y,
            pivot: Point::new(px, py),
            cache: TransformCache::new(),
        }
    }

    /// X multiplier.
    #[inline]
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y multiplier.
    #[inline]
    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// The fixed point.
    #[inline]
    #[must_use]
    pub fn pivot(&self) -> Point {
        self.pivot
    }

    /// Sets the X multiplier.
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
        self.cache.invalidate();
    }

    /// Sets the Y multiplier.
    pub fn set_y(&mut self, y: f64) {
        self.y = y;
        self.cache.invalidate();
    }

    /// Moves the fixed point.
    pub fn set_pivot(&mut self, pivot: Point) {
        self.pivot = pivot;
        self.cache.invalidate();
    }
}

impl PartialEq for Shear {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.pivot == other.pivot
    }
}

impl Transform for Shear {
    fn mxy(&self) -> f64 {
        self.x
    }
    fn tx(&self) -> f64 {
        -self.x * self.pivot.y
    }
    fn myx(&self) -> f64 {
        self.y
    }
    fn ty(&self) -> f64 {
        -self.y * self.pivot.x
    }

    fn cache(&self) -> Option<&TransformCache> {
        Some(&self.cache)
    }

    fn kind(&self) -> TransformKind<'_> {
        TransformKind::Shear(self)
    }

    fn is_2d(&self) -> bool {
        true
    }

    fn is_identity(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    fn determinant(&self) -> f64 {
        1.0 - self.x * self.y
    }

    fn transform_3d(&self, p: Point3) -> Point3 {
        let c = self.pivot;
        Point3::new(
            p.x + self.x * (p.y - c.y),
            p.y + self.y * (p.x - c.x),
            p.z,
        )
    }

    fn delta_transform_3d(&self, v: Point3) -> Point3 {
        Point3::new(v.x + self.x * v.y, v.y + self.y * v.x, v.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::transform::AnyTransform;
    use crate::transform::test_util::*;

    #[test]
    fn elements_follow_derivation_table() {
        let s = Shear::with_pivot(2.0, 0.5, 3.0, 4.0);
        assert_eq!(s.mxx(), 1.0, "unit diagonal");
        assert_eq!(s.mxy(), 2.0, "mxy is the X multiplier");
        assert_eq!(s.tx(), -8.0, "-x * py");
        assert_eq!(s.ty(), -1.5, "-y * px");
        assert!(Shear::default().is_identity(), "no shear");
    }

    #[test]
    fn single_axis_inverse_is_closed_form() {
        match Shear::with_pivot(0.75, 0.0, 1.0, 2.0).create_inverse() {
            Ok(AnyTransform::Shear(s)) => {
                assert_eq!(s, Shear::with_pivot(-0.75, 0.0, 1.0, 2.0), "negated X");
            }
            other => panic!("expected Shear, got {other:?}"),
        }
        match Shear::new(0.0, -3.0).create_inverse() {
            Ok(AnyTransform::Shear(s)) => assert_eq!(s, Shear::new(0.0, 3.0), "negated Y"),
            other => panic!("expected Shear, got {other:?}"),
        }
    }

    #[test]
    fn two_axis_inverse_goes_dense() {
        let s = Shear::with_pivot(0.5, 0.25, 1.0, -1.0);
        let inv = s.create_inverse();
        assert!(matches!(inv, Ok(AnyTransform::Affine(_))), "got {inv:?}");
        if let Ok(inv) = inv {
            for p in sample_points() {
                assert!(
                    approx_point(inv.transform_3d(s.transform_3d(p)), p),
                    "round trip at {p:?}"
                );
            }
        }
    }

    #[test]
    fn degenerate_shear_is_not_invertible() {
        let s = Shear::new(2.0, 0.5);
        assert_eq!(s.determinant(), 0.0, "1 - x * y");
        assert_eq!(
            s.create_inverse().map(|_| ()),
            Err(TransformError::NonInvertible),
            "singular"
        );
    }
}
