// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::error::TransformError;
use crate::geometry::Point3;

use super::{ImmutableTransform, Transform, TransformCache, TransformKind};

/// Axis-aligned scaling about a pivot.
#[derive(Clone, Debug)]
pub struct Scale {
    x: f64,
    y: f64,
    z: f64,
    pivot: Point3,
    cache: TransformCache,
}

impl Default for Scale {
    fn default() -> Self {
        Self::new_3d(1.0, 1.0, 1.0)
    }
}

impl Scale {
    /// Scales X and Y about the origin.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self::new_3d(x, y, 1.0)
    }

    /// Scales all three axes about the origin.
    #[must_use]
    pub const fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self::with_pivot(x, y, z, Point3::ORIGIN)
    }

    /// Scales all three axes about `pivot`.
    #[must_use]
    pub const fn with_pivot(x: f64, y: f64, z: f64, pivot: Point3) -> Self {
        Self {
            x,
            y,
            z,
            pivot,
            cache: TransformCache::new(),
        }
    }

    /// X factor.
    #[inline]
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y factor.
    #[inline]
    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Z factor.
    #[inline]
    #[must_use]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// The fixed point.
    #[inline]
    #[must_use]
    pub fn pivot(&self) -> Point3 {
        self.pivot
    }

    /// Sets the X factor.
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
        self.cache.invalidate();
    }

    /// Sets the Y factor.
    pub fn set_y(&mut self, y: f64) {
        self.y = y;
        self.cache.invalidate();
    }

    /// Sets the Z factor.
    pub fn set_z(&mut self, z: f64) {
        self.z = z;
        self.cache.invalidate();
    }

    /// Moves the fixed point.
    pub fn set_pivot(&mut self, pivot: Point3) {
        self.pivot = pivot;
        self.cache.invalidate();
    }
}

impl PartialEq for Scale {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z && self.pivot == other.pivot
    }
}

impl Transform for Scale {
    fn mxx(&self) -> f64 {
        self.x
    }
    fn myy(&self) -> f64 {
        self.y
    }
    fn mzz(&self) -> f64 {
        self.z
    }
    fn tx(&self) -> f64 {
        (1.0 - self.x) * self.pivot.x
    }
    fn ty(&self) -> f64 {
        (1.0 - self.y) * self.pivot.y
    }
    fn tz(&self) -> f64 {
        (1.0 - self.z) * self.pivot.z
    }

    fn cache(&self) -> Option<&TransformCache> {
        Some(&self.cache)
    }

    fn kind(&self) -> TransformKind<'_> {
        TransformKind::Scale(self)
    }

    fn determinant(&self) -> f64 {
        self.x * self.y * self.z
    }

    fn is_identity(&self) -> bool {
        self.x == 1.0 && self.y == 1.0 && self.z == 1.0
    }

    fn transform_3d(&self, p: Point3) -> Point3 {
        let c = self.pivot;
        Point3::new(
            (p.x - c.x) * self.x + c.x,
            (p.y - c.y) * self.y + c.y,
            (p.z - c.z) * self.z + c.z,
        )
    }

    fn delta_transform_3d(&self, v: Point3) -> Point3 {
        Point3::new(v.x * self.x, v.y * self.y, v.z * self.z)
    }

    fn compute_inverse(&self) -> Result<ImmutableTransform, TransformError> {
        if self.x == 0.0 || self.y == 0.0 || self.z == 0.0 {
            return Err(TransformError::NonInvertible);
        }
        Ok(Self::with_pivot(1.0 / self.x, 1.0 / self.y, 1.0 / self.z, self.pivot).to_immutable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::AnyTransform;
    use crate::transform::test_util::*;

    #[test]
    fn elements_follow_derivation_table() {
        let s = Scale::with_pivot(2.0, 3.0, 1.0, Point3::new(10.0, 20.0, 30.0));
        assert_eq!(s.mxx(), 2.0, "mxx is the X factor");
        assert_eq!(s.mxy(), 0.0, "no shear");
        assert_eq!(s.tx(), -10.0, "(1 - x) * px");
        assert_eq!(s.ty(), -40.0, "(1 - y) * py");
        assert_eq!(s.tz(), 0.0, "unit Z factor leaves pz fixed for free");
        assert!(s.is_2d(), "unit Z factor");
        assert!(Scale::default().is_identity(), "unit factors");
    }

    #[test]
    fn pivot_stays_fixed() {
        let pivot = Point3::new(4.0, -1.0, 2.0);
        let s = Scale::with_pivot(3.0, 0.5, 7.0, pivot);
        assert_eq!(s.transform_3d(pivot), pivot, "pivot is a fixed point");
        assert!(
            approx_point(s.to_immutable().transform_3d(pivot), pivot),
            "dense form agrees"
        );
    }

    #[test]
    fn zero_factor_is_not_invertible() {
        assert_eq!(
            Scale::new(0.0, 1.0).create_inverse().map(|_| ()),
            Err(TransformError::NonInvertible),
            "zero X factor"
        );
        assert_eq!(
            Scale::new(0.0, 1.0).inverse_transform_3d(Point3::ORIGIN),
            Err(TransformError::NonInvertible),
            "inverse point mapping fails too"
        );
    }

    #[test]
    fn inverse_reciprocates_factors() {
        match Scale::new(2.0, 1.0).create_inverse() {
            Ok(AnyTransform::Scale(s)) => {
                assert_eq!(s, Scale::new(0.5, 1.0), "reciprocal factors");
            }
            other => panic!("expected Scale, got {other:?}"),
        }
    }

    #[test]
    fn scales_with_same_pivot_multiply() {
        let pivot = Point3::new(1.0, 2.0, 0.0);
        let a = Scale::with_pivot(2.0, 3.0, 1.0, pivot);
        let b = Scale::with_pivot(4.0, 0.5, 1.0, pivot);
        match a.create_concatenation(&b) {
            AnyTransform::Scale(s) => {
                assert_eq!(s, Scale::with_pivot(8.0, 1.5, 1.0, pivot), "multiplied factors");
            }
            other => panic!("expected Scale, got {other:?}"),
        }
    }

    #[test]
    fn scales_with_different_pivots_go_dense() {
        let a = Scale::with_pivot(2.0, 2.0, 1.0, Point3::new(1.0, 0.0, 0.0));
        let b = Scale::new(3.0, 3.0);
        let c = a.create_concatenation(&b);
        assert!(matches!(c, AnyTransform::Affine(_)), "got {c:?}");
        for p in sample_points() {
            assert!(
                approx_point(c.transform_3d(p), a.transform_3d(b.transform_3d(p))),
                "dense result at {p:?}"
            );
        }
    }
}
