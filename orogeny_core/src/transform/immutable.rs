// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State-classified matrix snapshot.
//!
//! [`ImmutableTransform`] carries two tags derived from its elements:
//! [`State2d`] describes the XY block and [`State3d`] whether anything
//! involves Z. Every constructor and mutator recomputes both tags before
//! returning, and every operation dispatches on them to skip arithmetic
//! that cannot change the result.

use core::fmt;

use kurbo::Point;

use crate::error::TransformError;
use crate::geometry::Point3;

use super::{
    IDENTITY_ELEMENTS, MXX, MXY, MXZ, MYX, MYY, MYZ, MZX, MZY, MZZ, TX, TY, TZ, Transform,
    TransformKind,
};

/// Classification of the XY block.
///
/// *Shear* means an off-diagonal term is nonzero, *scale* means a diagonal
/// term is not 1 (or, with shear, nonzero), *translate* means `tx` or `ty`
/// is nonzero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State2d {
    /// No effect.
    Identity,
    /// Translation only.
    Translate,
    /// Diagonal scale only.
    Scale,
    /// Diagonal scale and translation.
    ScaleTranslate,
    /// Off-diagonal terms with a zero diagonal.
    Shear,
    /// Off-diagonal terms with a zero diagonal, plus translation.
    ShearTranslate,
    /// Full 2×2 block.
    ShearScale,
    /// Full 2×2 block plus translation.
    ShearScaleTranslate,
}

impl State2d {
    fn classify(e: &[f64; 12]) -> Self {
        let translate = e[TX] != 0.0 || e[TY] != 0.0;
        if e[MXY] == 0.0 && e[MYX] == 0.0 {
            match (e[MXX] == 1.0 && e[MYY] == 1.0, translate) {
                (true, false) => Self::Identity,
                (true, true) => Self::Translate,
                (false, false) => Self::Scale,
                (false, true) => Self::ScaleTranslate,
            }
        } else {
            match (e[MXX] == 0.0 && e[MYY] == 0.0, translate) {
                (true, false) => Self::Shear,
                (true, true) => Self::ShearTranslate,
                (false, false) => Self::ShearScale,
                (false, true) => Self::ShearScaleTranslate,
            }
        }
    }

    /// Whether an off-diagonal term is nonzero.
    #[must_use]
    pub const fn has_shear(self) -> bool {
        matches!(
            self,
            Self::Shear | Self::ShearTranslate | Self::ShearScale | Self::ShearScaleTranslate
        )
    }

    /// Whether the diagonal differs from identity.
    #[must_use]
    pub const fn has_scale(self) -> bool {
        matches!(
            self,
            Self::Scale | Self::ScaleTranslate | Self::ShearScale | Self::ShearScaleTranslate
        )
    }

    /// Whether `tx` or `ty` is nonzero.
    #[must_use]
    pub const fn has_translate(self) -> bool {
        matches!(
            self,
            Self::Translate
                | Self::ScaleTranslate
                | Self::ShearTranslate
                | Self::ShearScaleTranslate
        )
    }
}

/// Classification of the Z row and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State3d {
    /// Z is untouched; [`State2d`] fully describes the transform.
    Non3d,
    /// Axis-aligned translation with a unit diagonal.
    Translate,
    /// Axis-aligned scale with no translation.
    Scale,
    /// Axis-aligned scale and translation.
    ScaleTranslate,
    /// Anything else.
    Complex,
}

impl State3d {
    fn classify(e: &[f64; 12], state2d: State2d) -> Self {
        if e[MXZ] != 0.0 || e[MYZ] != 0.0 || e[MZX] != 0.0 || e[MZY] != 0.0 {
            return Self::Complex;
        }
        let z_translate = e[TZ] != 0.0;
        let z_scale = e[MZZ] != 1.0;
        if !z_translate && !z_scale {
            return Self::Non3d;
        }
        if state2d.has_shear() {
            return Self::Complex;
        }
        match (
            z_scale || state2d.has_scale(),
            z_translate || state2d.has_translate(),
        ) {
            (false, _) => Self::Translate,
            (true, false) => Self::Scale,
            (true, true) => Self::ScaleTranslate,
        }
    }
}

/// A resolved affine matrix with cached classification tags.
///
/// This is the value every other transform reduces to for fast repeated
/// application.
#[derive(Clone, Copy, PartialEq)]
pub struct ImmutableTransform {
    e: [f64; 12],
    state2d: State2d,
    state3d: State3d,
}

impl Default for ImmutableTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for ImmutableTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ImmutableTransform[{:?}/{:?}] {:?}",
            self.state2d, self.state3d, self.e
        )
    }
}

impl ImmutableTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        e: IDENTITY_ELEMENTS,
        state2d: State2d::Identity,
        state3d: State3d::Non3d,
    };

    /// Creates a transform from row-major elements.
    #[must_use]
    pub fn from_elements(e: [f64; 12]) -> Self {
        let mut m = Self::IDENTITY;
        m.e = e;
        m.update_state();
        m
    }

    /// Creates a 2D transform from its two rows.
    #[must_use]
    pub fn new_2d(mxx: f64, mxy: f64, tx: f64, myx: f64, myy: f64, ty: f64) -> Self {
        Self::from_elements([
            mxx, mxy, 0.0, tx, //
            myx, myy, 0.0, ty, //
            0.0, 0.0, 1.0, 0.0,
        ])
    }

    /// Creates a transform from its three rows.
    #[must_use]
    pub fn new_3d(
        mxx: f64,
        mxy: f64,
        mxz: f64,
        tx: f64,
        myx: f64,
        myy: f64,
        myz: f64,
        ty: f64,
        mzx: f64,
        mzy: f64,
        mzz: f64,
        tz: f64,
    ) -> Self {
        Self::from_elements([mxx, mxy, mxz, tx, myx, myy, myz, ty, mzx, mzy, mzz, tz])
    }

    /// A pure translation.
    #[must_use]
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut e = IDENTITY_ELEMENTS;
        e[TX] = x;
        e[TY] = y;
        e[TZ] = z;
        Self::from_elements(e)
    }

    /// Converts a kurbo affine (always 2D).
    #[must_use]
    pub fn from_kurbo(a: kurbo::Affine) -> Self {
        let [a, b, c, d, e, f] = a.as_coeffs();
        Self::new_2d(a, c, e, b, d, f)
    }

    /// Converts to a kurbo affine.
    pub fn to_kurbo(&self) -> Result<kurbo::Affine, TransformError> {
        if self.state3d != State3d::Non3d {
            return Err(TransformError::NotTwoDimensional);
        }
        let e = &self.e;
        Ok(kurbo::Affine::new([
            e[MXX], e[MYX], e[MXY], e[MYY], e[TX], e[TY],
        ]))
    }

    /// Row-major elements.
    #[inline]
    #[must_use]
    pub const fn to_elements(&self) -> [f64; 12] {
        self.e
    }

    /// Classification of the XY block.
    #[inline]
    #[must_use]
    pub const fn state_2d(&self) -> State2d {
        self.state2d
    }

    /// Classification of the Z row and column.
    #[inline]
    #[must_use]
    pub const fn state_3d(&self) -> State3d {
        self.state3d
    }

    /// Overwrites one element and reclassifies.
    pub(crate) fn set_element(&mut self, index: usize, value: f64) {
        self.e[index] = value;
        self.update_state();
    }

    fn update_state(&mut self) {
        self.state2d = State2d::classify(&self.e);
        self.state3d = State3d::classify(&self.e, self.state2d);
    }

    /// Sets `self` to `a × b`, so `b` acts on a point first.
    ///
    /// Two planar operands use the 2D product.
    pub fn set_to_concatenation(&mut self, a: &Self, b: &Self) {
        let planar = a.state3d == State3d::Non3d && b.state3d == State3d::Non3d;
        let (a, b) = (&a.e, &b.e);
        if planar {
            self.e = [
                a[MXX] * b[MXX] + a[MXY] * b[MYX],
                a[MXX] * b[MXY] + a[MXY] * b[MYY],
                0.0,
                a[MXX] * b[TX] + a[MXY] * b[TY] + a[TX],
                a[MYX] * b[MXX] + a[MYY] * b[MYX],
                a[MYX] * b[MXY] + a[MYY] * b[MYY],
                0.0,
                a[MYX] * b[TX] + a[MYY] * b[TY] + a[TY],
                0.0,
                0.0,
                1.0,
                0.0,
            ];
        } else {
            self.e = multiply(a, b);
        }
        self.update_state();
    }

    /// `self × other`.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut out = Self::IDENTITY;
        out.set_to_concatenation(self, other);
        out
    }

    /// The inverse matrix.
    ///
    /// Fails with [`TransformError::NonInvertible`] when the determinant or a
    /// relevant scale factor is zero.
    pub fn invert(&self) -> Result<Self, TransformError> {
        let e = &self.e;
        let mut r = *self;
        let o = &mut r.e;
        match self.state3d {
            State3d::Non3d => match self.state2d {
                State2d::Identity => {}
                State2d::Translate => {
                    o[TX] = -e[TX];
                    o[TY] = -e[TY];
                }
                State2d::Scale | State2d::ScaleTranslate => {
                    if e[MXX] == 0.0 || e[MYY] == 0.0 {
                        return Err(TransformError::NonInvertible);
                    }
                    o[MXX] = 1.0 / e[MXX];
                    o[MYY] = 1.0 / e[MYY];
                    o[TX] = -e[TX] / e[MXX];
                    o[TY] = -e[TY] / e[MYY];
                }
                State2d::Shear | State2d::ShearTranslate => {
                    if e[MXY] == 0.0 || e[MYX] == 0.0 {
                        return Err(TransformError::NonInvertible);
                    }
                    o[MYX] = 1.0 / e[MXY];
                    o[MXY] = 1.0 / e[MYX];
                    o[TX] = -e[TY] / e[MYX];
                    o[TY] = -e[TX] / e[MXY];
                }
                State2d::ShearScale | State2d::ShearScaleTranslate => {
                    let det = e[MXX] * e[MYY] - e[MXY] * e[MYX];
                    if det == 0.0 {
                        return Err(TransformError::NonInvertible);
                    }
                    o[MXX] = e[MYY] / det;
                    o[MYX] = -e[MYX] / det;
                    o[MXY] = -e[MXY] / det;
                    o[MYY] = e[MXX] / det;
                    o[TX] = (e[MXY] * e[TY] - e[MYY] * e[TX]) / det;
                    o[TY] = (e[MYX] * e[TX] - e[MXX] * e[TY]) / det;
                }
            },
            State3d::Translate => {
                o[TX] = -e[TX];
                o[TY] = -e[TY];
                o[TZ] = -e[TZ];
            }
            State3d::Scale | State3d::ScaleTranslate => {
                if e[MXX] == 0.0 || e[MYY] == 0.0 || e[MZZ] == 0.0 {
                    return Err(TransformError::NonInvertible);
                }
                o[MXX] = 1.0 / e[MXX];
                o[MYY] = 1.0 / e[MYY];
                o[MZZ] = 1.0 / e[MZZ];
                o[TX] = -e[TX] / e[MXX];
                o[TY] = -e[TY] / e[MYY];
                o[TZ] = -e[TZ] / e[MZZ];
            }
            State3d::Complex => *o = invert_complex(e)?,
        }
        r.update_state();
        Ok(r)
    }

    /// Transforms a 2D point by the inverse without building the inverse.
    pub fn inverse_transform_point(&self, p: Point) -> Result<Point, TransformError> {
        if self.state3d != State3d::Non3d {
            return Err(TransformError::NotTwoDimensional);
        }
        let (x, y) = self.inverse_2d(p.x, p.y, true)?;
        Ok(Point::new(x, y))
    }

    /// State-dispatched inverse of the XY block, optionally including
    /// translation.
    fn inverse_2d(&self, x: f64, y: f64, translate: bool) -> Result<(f64, f64), TransformError> {
        let e = &self.e;
        let (x, y) = if translate {
            (x - e[TX], y - e[TY])
        } else {
            (x, y)
        };
        match self.state2d {
            State2d::Identity | State2d::Translate => Ok((x, y)),
            State2d::Scale | State2d::ScaleTranslate => {
                if e[MXX] == 0.0 || e[MYY] == 0.0 {
                    return Err(TransformError::NonInvertible);
                }
                Ok((x / e[MXX], y / e[MYY]))
            }
            State2d::Shear | State2d::ShearTranslate => {
                if e[MXY] == 0.0 || e[MYX] == 0.0 {
                    return Err(TransformError::NonInvertible);
                }
                Ok((y / e[MYX], x / e[MXY]))
            }
            State2d::ShearScale | State2d::ShearScaleTranslate => {
                let det = e[MXX] * e[MYY] - e[MXY] * e[MYX];
                if det == 0.0 {
                    return Err(TransformError::NonInvertible);
                }
                Ok((
                    (x * e[MYY] - y * e[MXY]) / det,
                    (y * e[MXX] - x * e[MYX]) / det,
                ))
            }
        }
    }

    fn inverse_3d(&self, p: Point3, translate: bool) -> Result<Point3, TransformError> {
        let e = &self.e;
        let (tx, ty, tz) = if translate {
            (e[TX], e[TY], e[TZ])
        } else {
            (0.0, 0.0, 0.0)
        };
        match self.state3d {
            State3d::Non3d => {
                let (x, y) = self.inverse_2d(p.x, p.y, translate)?;
                Ok(Point3::new(x, y, p.z))
            }
            State3d::Translate => Ok(Point3::new(p.x - tx, p.y - ty, p.z - tz)),
            State3d::Scale | State3d::ScaleTranslate => {
                if e[MXX] == 0.0 || e[MYY] == 0.0 || e[MZZ] == 0.0 {
                    return Err(TransformError::NonInvertible);
                }
                Ok(Point3::new(
                    (p.x - tx) / e[MXX],
                    (p.y - ty) / e[MYY],
                    (p.z - tz) / e[MZZ],
                ))
            }
            State3d::Complex => {
                let inv = self.invert()?;
                Ok(if translate {
                    inv.transform_3d(p)
                } else {
                    inv.delta_transform_3d(p)
                })
            }
        }
    }
}

/// Full 3×4 product `a × b`.
pub(crate) fn multiply(a: &[f64; 12], b: &[f64; 12]) -> [f64; 12] {
    let mut out = [0.0; 12];
    for row in 0..3 {
        let r = row * 4;
        for col in 0..4 {
            let mut v = a[r] * b[col] + a[r + 1] * b[4 + col] + a[r + 2] * b[8 + col];
            if col == 3 {
                v += a[r + 3];
            }
            out[r + col] = v;
        }
    }
    out
}

/// Transposed cofactor matrix over the determinant.
fn invert_complex(e: &[f64; 12]) -> Result<[f64; 12], TransformError> {
    let [mxx, mxy, mxz, tx, myx, myy, myz, ty, mzx, mzy, mzz, tz] = *e;
    let det = super::determinant_of(e);
    if det == 0.0 {
        return Err(TransformError::NonInvertible);
    }
    let cxx = myy * mzz - myz * mzy;
    let cyx = -myx * mzz + myz * mzx;
    let czx = myx * mzy - myy * mzx;
    let cxt =
        -mxy * (myz * tz - mzz * ty) - mxz * (ty * mzy - tz * myy) - tx * (myy * mzz - mzy * myz);
    let cxy = -mxy * mzz + mxz * mzy;
    let cyy = mxx * mzz - mxz * mzx;
    let czy = -mxx * mzy + mxy * mzx;
    let cyt =
        mxx * (myz * tz - mzz * ty) + mxz * (ty * mzx - tz * myx) + tx * (myx * mzz - mzx * myz);
    let cxz = mxy * myz - mxz * myy;
    let cyz = -mxx * myz + mxz * myx;
    let czz = mxx * myy - mxy * myx;
    let czt =
        -mxx * (myy * tz - mzy * ty) - mxy * (ty * mzx - tz * myx) - tx * (myx * mzy - mzx * myy);
    Ok([
        cxx / det,
        cxy / det,
        cxz / det,
        cxt / det,
        cyx / det,
        cyy / det,
        cyz / det,
        cyt / det,
        czx / det,
        czy / det,
        czz / det,
        czt / det,
    ])
}

impl Transform for ImmutableTransform {
    fn mxx(&self) -> f64 {
        self.e[MXX]
    }
    fn mxy(&self) -> f64 {
        self.e[MXY]
    }
    fn mxz(&self) -> f64 {
        self.e[MXZ]
    }
    fn tx(&self) -> f64 {
        self.e[TX]
    }
    fn myx(&self) -> f64 {
        self.e[MYX]
    }
    fn myy(&self) -> f64 {
        self.e[MYY]
    }
    fn myz(&self) -> f64 {
        self.e[MYZ]
    }
    fn ty(&self) -> f64 {
        self.e[TY]
    }
    fn mzx(&self) -> f64 {
        self.e[MZX]
    }
    fn mzy(&self) -> f64 {
        self.e[MZY]
    }
    fn mzz(&self) -> f64 {
        self.e[MZZ]
    }
    fn tz(&self) -> f64 {
        self.e[TZ]
    }

    fn elements(&self) -> [f64; 12] {
        self.e
    }

    fn kind(&self) -> TransformKind<'_> {
        TransformKind::Immutable(self)
    }

    fn to_immutable(&self) -> Self {
        *self
    }

    fn is_2d(&self) -> bool {
        self.state3d == State3d::Non3d
    }

    fn is_identity(&self) -> bool {
        self.state3d == State3d::Non3d && self.state2d == State2d::Identity
    }

    fn determinant(&self) -> f64 {
        let e = &self.e;
        match self.state3d {
            State3d::Non3d => match self.state2d {
                State2d::Identity | State2d::Translate => 1.0,
                State2d::Scale | State2d::ScaleTranslate => e[MXX] * e[MYY],
                State2d::Shear | State2d::ShearTranslate => -(e[MXY] * e[MYX]),
                State2d::ShearScale | State2d::ShearScaleTranslate => {
                    e[MXX] * e[MYY] - e[MXY] * e[MYX]
                }
            },
            State3d::Translate => 1.0,
            State3d::Scale | State3d::ScaleTranslate => e[MXX] * e[MYY] * e[MZZ],
            State3d::Complex => super::determinant_of(e),
        }
    }

    fn transform_3d(&self, p: Point3) -> Point3 {
        let e = &self.e;
        let Point3 { x, y, z } = p;
        match self.state3d {
            State3d::Non3d => match self.state2d {
                State2d::Identity => p,
                State2d::Translate => Point3::new(x + e[TX], y + e[TY], z),
                State2d::Scale => Point3::new(x * e[MXX], y * e[MYY], z),
                State2d::ScaleTranslate => {
                    Point3::new(x * e[MXX] + e[TX], y * e[MYY] + e[TY], z)
                }
                State2d::Shear => Point3::new(y * e[MXY], x * e[MYX], z),
                State2d::ShearTranslate => {
                    Point3::new(y * e[MXY] + e[TX], x * e[MYX] + e[TY], z)
                }
                State2d::ShearScale => Point3::new(
                    e[MXX] * x + e[MXY] * y,
                    e[MYX] * x + e[MYY] * y,
                    z,
                ),
                State2d::ShearScaleTranslate => Point3::new(
                    e[MXX] * x + e[MXY] * y + e[TX],
                    e[MYX] * x + e[MYY] * y + e[TY],
                    z,
                ),
            },
            State3d::Translate => Point3::new(x + e[TX], y + e[TY], z + e[TZ]),
            State3d::Scale => Point3::new(x * e[MXX], y * e[MYY], z * e[MZZ]),
            State3d::ScaleTranslate => Point3::new(
                x * e[MXX] + e[TX],
                y * e[MYY] + e[TY],
                z * e[MZZ] + e[TZ],
            ),
            State3d::Complex => super::apply(e, p),
        }
    }

    fn delta_transform_3d(&self, v: Point3) -> Point3 {
        let e = &self.e;
        let Point3 { x, y, z } = v;
        match self.state3d {
            State3d::Non3d => match self.state2d {
                State2d::Identity | State2d::Translate => v,
                State2d::Scale | State2d::ScaleTranslate => Point3::new(x * e[MXX], y * e[MYY], z),
                State2d::Shear | State2d::ShearTranslate => Point3::new(y * e[MXY], x * e[MYX], z),
                State2d::ShearScale | State2d::ShearScaleTranslate => Point3::new(
                    e[MXX] * x + e[MXY] * y,
                    e[MYX] * x + e[MYY] * y,
                    z,
                ),
            },
            State3d::Translate => v,
            State3d::Scale | State3d::ScaleTranslate => {
                Point3::new(x * e[MXX], y * e[MYY], z * e[MZZ])
            }
            State3d::Complex => super::apply_delta(e, v),
        }
    }

    fn compute_inverse(&self) -> Result<Self, TransformError> {
        self.invert()
    }

    fn inverse_transform_3d(&self, p: Point3) -> Result<Point3, TransformError> {
        self.inverse_3d(p, true)
    }

    fn inverse_delta_transform_3d(&self, v: Point3) -> Result<Point3, TransformError> {
        self.inverse_3d(v, false)
    }
}
