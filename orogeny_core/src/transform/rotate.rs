// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::cell::Cell;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::error::TransformError;
use crate::geometry::Point3;

use super::{
    IDENTITY_ELEMENTS, ImmutableTransform, MXX, MXY, MXZ, MYX, MYY, MYZ, MZX, MZY, MZZ, TX, TY,
    TZ, Transform, TransformCache, TransformKind,
};

/// Last derived elements of a rotation, valid until the next parameter change.
#[derive(Clone, Copy, Debug)]
struct MatrixCache {
    valid: bool,
    is_3d: bool,
    elements: [f64; 12],
}

impl MatrixCache {
    const INVALID: Self = Self {
        valid: false,
        is_3d: false,
        elements: IDENTITY_ELEMENTS,
    };
}

/// A rotation by `angle` degrees about an axis through a pivot.
///
/// The default axis is +Z, which makes this a plain 2D rotation.
#[derive(Clone, Debug)]
pub struct Rotate {
    angle: f64,
    axis: Point3,
    pivot: Point3,
    cache: TransformCache,
    forward: Cell<MatrixCache>,
    backward: Cell<MatrixCache>,
}

impl Default for Rotate {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Rotate {
    /// The X axis.
    pub const X_AXIS: Point3 = Point3::new(1.0, 0.0, 0.0);
    /// The Y axis.
    pub const Y_AXIS: Point3 = Point3::new(0.0, 1.0, 0.0);
    /// The Z axis.
    pub const Z_AXIS: Point3 = Point3::new(0.0, 0.0, 1.0);

    /// Rotates about the Z axis through the origin.
    #[must_use]
    pub const fn new(angle: f64) -> Self {
        Self::with_axis(angle, Self::Z_AXIS, Point3::ORIGIN)
    }

    /// Rotates about the Z axis through `pivot`.
    #[must_use]
    pub const fn with_pivot(angle: f64, pivot: Point3) -> Self {
        Self::with_axis(angle, Self::Z_AXIS, pivot)
    }

    /// Rotates about `axis` through `pivot`.
    #[must_use]
    pub const fn with_axis(angle: f64, axis: Point3, pivot: Point3) -> Self {
        Self {
            angle,
            axis,
            pivot,
            cache: TransformCache::new(),
            forward: Cell::new(MatrixCache::INVALID),
            backward: Cell::new(MatrixCache::INVALID),
        }
    }

    /// Angle in degrees.
    #[inline]
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Rotation axis, not necessarily normalised.
    #[inline]
    #[must_use]
    pub fn axis(&self) -> Point3 {
        self.axis
    }

    /// Point the axis passes through.
    #[inline]
    #[must_use]
    pub fn pivot(&self) -> Point3 {
        self.pivot
    }

    /// Sets the angle in degrees.
    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
        self.invalidate();
    }

    /// Sets the axis.
    pub fn set_axis(&mut self, axis: Point3) {
        self.axis = axis;
        self.invalidate();
    }

    /// Moves the pivot.
    pub fn set_pivot(&mut self, pivot: Point3) {
        self.pivot = pivot;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.forward.set(MatrixCache::INVALID);
        self.backward.set(MatrixCache::INVALID);
        self.cache.invalidate();
    }

    /// The axis scaled to unit length, or `None` for a zero axis.
    pub(crate) fn unit_axis(&self) -> Option<Point3> {
        normalize(self.axis)
    }

    fn derived(&self, slot: &Cell<MatrixCache>, angle: f64) -> MatrixCache {
        let cached = slot.get();
        if cached.valid {
            return cached;
        }
        let (is_3d, elements) = rotation_elements(angle, self.axis, self.pivot);
        let fresh = MatrixCache {
            valid: true,
            is_3d,
            elements,
        };
        slot.set(fresh);
        fresh
    }

    fn matrix(&self) -> MatrixCache {
        self.derived(&self.forward, self.angle)
    }

    fn inverse_matrix(&self) -> MatrixCache {
        self.derived(&self.backward, -self.angle)
    }
}

impl PartialEq for Rotate {
    fn eq(&self, other: &Self) -> bool {
        self.angle == other.angle && self.axis == other.axis && self.pivot == other.pivot
    }
}

impl Transform for Rotate {
    fn mxx(&self) -> f64 {
        self.matrix().elements[MXX]
    }
    fn mxy(&self) -> f64 {
        self.matrix().elements[MXY]
    }
    fn mxz(&self) -> f64 {
        self.matrix().elements[MXZ]
    }
    fn tx(&self) -> f64 {
        self.matrix().elements[TX]
    }
    fn myx(&self) -> f64 {
        self.matrix().elements[MYX]
    }
    fn myy(&self) -> f64 {
        self.matrix().elements[MYY]
    }
    fn myz(&self) -> f64 {
        self.matrix().elements[MYZ]
    }
    fn ty(&self) -> f64 {
        self.matrix().elements[TY]
    }
    fn mzx(&self) -> f64 {
        self.matrix().elements[MZX]
    }
    fn mzy(&self) -> f64 {
        self.matrix().elements[MZY]
    }
    fn mzz(&self) -> f64 {
        self.matrix().elements[MZZ]
    }
    fn tz(&self) -> f64 {
        self.matrix().elements[TZ]
    }

    fn elements(&self) -> [f64; 12] {
        self.matrix().elements
    }

    fn cache(&self) -> Option<&TransformCache> {
        Some(&self.cache)
    }

    fn kind(&self) -> TransformKind<'_> {
        TransformKind::Rotate(self)
    }

    fn is_2d(&self) -> bool {
        !self.matrix().is_3d
    }

    fn determinant(&self) -> f64 {
        1.0
    }

    fn compute_inverse(&self) -> Result<ImmutableTransform, TransformError> {
        Ok(ImmutableTransform::from_elements(self.inverse_matrix().elements))
    }
}

fn normalize(v: Point3) -> Option<Point3> {
    let mag = v.distance(Point3::ORIGIN);
    if mag == 0.0 {
        None
    } else {
        Some(Point3::new(v.x / mag, v.y / mag, v.z / mag))
    }
}

/// Elements of a rotation by `angle` degrees about `axis` through `pivot`,
/// plus whether the result has a Z effect.
fn rotation_elements(angle: f64, axis: Point3, pivot: Point3) -> (bool, [f64; 12]) {
    if axis.x == 0.0 && axis.y == 0.0 {
        // Axis along ±Z: a planar rotation. A zero axis is the identity.
        let angle = if axis.z > 0.0 {
            angle
        } else if axis.z < 0.0 {
            -angle
        } else {
            return (false, IDENTITY_ELEMENTS);
        };
        let rad = angle.to_radians();
        let (sin, cos) = (rad.sin(), rad.cos());
        let mut e = IDENTITY_ELEMENTS;
        e[MXX] = cos;
        e[MXY] = -sin;
        e[MYX] = sin;
        e[MYY] = cos;
        e[TX] = pivot.x - cos * pivot.x + sin * pivot.y;
        e[TY] = pivot.y - sin * pivot.x - cos * pivot.y;
        return (false, e);
    }

    let Some(a) = normalize(axis) else {
        return (false, IDENTITY_ELEMENTS);
    };
    let rad = angle.to_radians();
    let (sin, cos) = (rad.sin(), rad.cos());
    let t = 1.0 - cos;
    let mut e = [0.0; 12];
    e[MXX] = cos + a.x * a.x * t;
    e[MXY] = a.x * a.y * t - a.z * sin;
    e[MXZ] = a.x * a.z * t + a.y * sin;
    e[MYX] = a.y * a.x * t + a.z * sin;
    e[MYY] = cos + a.y * a.y * t;
    e[MYZ] = a.y * a.z * t - a.x * sin;
    e[MZX] = a.z * a.x * t - a.y * sin;
    e[MZY] = a.z * a.y * t + a.x * sin;
    e[MZZ] = cos + a.z * a.z * t;
    let p = pivot;
    e[TX] = p.x - (e[MXX] * p.x + e[MXY] * p.y + e[MXZ] * p.z);
    e[TY] = p.y - (e[MYX] * p.x + e[MYY] * p.y + e[MYZ] * p.z);
    e[TZ] = p.z - (e[MZX] * p.x + e[MZY] * p.y + e[MZZ] * p.z);
    (!super::is_2d_of(&e), e)
}
