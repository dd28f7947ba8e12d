// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine transform algebra.
//!
//! Every transform exposes the 12 elements of a row-major 3×4 affine matrix
//!
//! ```text
//! | mxx mxy mxz tx |
//! | myx myy myz ty |
//! | mzx mzy mzz tz |
//! |  0   0   0   1 |
//! ```
//!
//! through the [`Transform`] trait. The trait's provided methods build
//! everything else (determinant, point mapping, inversion, bulk buffers,
//! bounds, matrix-shaped views) from those elements.
//!
//! Concrete variants store only their parameters and derive elements on
//! demand:
//!
//! - [`Translate`], [`Scale`], [`Shear`], [`Rotate`] are the specialised
//!   forms. Concatenating or inverting them collapses to another specialised
//!   form where the algebra allows.
//! - [`Affine`] is a mutable dense matrix.
//! - [`ImmutableTransform`] is a `Copy` matrix snapshot whose classification
//!   tags select the cheapest arithmetic for each operation.
//! - [`AnyTransform`] is the closed union of the above.
//!
//! Concatenation follows node transform-list order: `a.create_concatenation(b)`
//! has matrix `a × b`, so `b` acts on a point first.

use alloc::vec::Vec;

use kurbo::{Point, Vec2};

use crate::error::TransformError;
use crate::geometry::{Bounds3, Point3};

mod affine;
mod any;
mod bulk;
mod cache;
mod concat;
mod immutable;
mod rotate;
mod scale;
mod shear;
mod translate;

pub use affine::Affine;
pub use any::{AnyTransform, concatenate_all};
pub use cache::TransformCache;
pub use immutable::{ImmutableTransform, State2d, State3d};
pub use rotate::Rotate;
pub use scale::Scale;
pub use shear::Shear;
pub use translate::Translate;

pub(crate) const MXX: usize = 0;
pub(crate) const MXY: usize = 1;
pub(crate) const MXZ: usize = 2;
pub(crate) const TX: usize = 3;
pub(crate) const MYX: usize = 4;
pub(crate) const MYY: usize = 5;
pub(crate) const MYZ: usize = 6;
pub(crate) const TY: usize = 7;
pub(crate) const MZX: usize = 8;
pub(crate) const MZY: usize = 9;
pub(crate) const MZZ: usize = 10;
pub(crate) const TZ: usize = 11;

/// Row-major elements of the identity matrix.
pub(crate) const IDENTITY_ELEMENTS: [f64; 12] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0,
];

/// Shape of a materialised matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatrixType {
    /// 2D affine matrix, two rows of `[mxx mxy tx]`.
    Mt2d2x3,
    /// 2D matrix with the implicit `[0 0 1]` row.
    Mt2d3x3,
    /// 3D affine matrix, three rows of four.
    Mt3d3x4,
    /// 3D matrix with the implicit `[0 0 0 1]` row.
    Mt3d4x4,
}

impl MatrixType {
    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn rows(self) -> usize {
        match self {
            Self::Mt2d2x3 => 2,
            Self::Mt2d3x3 | Self::Mt3d3x4 => 3,
            Self::Mt3d4x4 => 4,
        }
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn columns(self) -> usize {
        match self {
            Self::Mt2d2x3 | Self::Mt2d3x3 => 3,
            Self::Mt3d3x4 | Self::Mt3d4x4 => 4,
        }
    }

    /// Total element count.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.rows() * self.columns()
    }

    /// Whether this shape only describes 2D transforms.
    #[inline]
    #[must_use]
    pub const fn is_2d(self) -> bool {
        matches!(self, Self::Mt2d2x3 | Self::Mt2d3x3)
    }
}

/// A borrowed view of a transform's concrete variant.
///
/// Concatenation and inversion match on pairs of kinds to find algebraic
/// shortcuts. Transforms implemented outside this crate report
/// [`Other`](Self::Other) and always take the dense path.
#[derive(Clone, Copy, Debug)]
pub enum TransformKind<'a> {
    /// A [`Translate`].
    Translate(&'a Translate),
    /// A [`Scale`].
    Scale(&'a Scale),
    /// A [`Rotate`].
    Rotate(&'a Rotate),
    /// A [`Shear`].
    Shear(&'a Shear),
    /// An [`Affine`].
    Affine(&'a Affine),
    /// An [`ImmutableTransform`].
    Immutable(&'a ImmutableTransform),
    /// Anything else.
    Other,
}

/// A 3D affine transform.
///
/// Implementors supply whichever elements differ from identity (the defaults
/// return identity values) and, optionally, a [`TransformCache`] that holds
/// the lazily derived classification flags and inverse. Every mutation of an
/// implementor must call [`TransformCache::invalidate`].
pub trait Transform {
    /// X coordinate scaling element.
    fn mxx(&self) -> f64 {
        1.0
    }
    /// XY coordinate element.
    fn mxy(&self) -> f64 {
        0.0
    }
    /// XZ coordinate element.
    fn mxz(&self) -> f64 {
        0.0
    }
    /// X coordinate translation element.
    fn tx(&self) -> f64 {
        0.0
    }
    /// YX coordinate element.
    fn myx(&self) -> f64 {
        0.0
    }
    /// Y coordinate scaling element.
    fn myy(&self) -> f64 {
        1.0
    }
    /// YZ coordinate element.
    fn myz(&self) -> f64 {
        0.0
    }
    /// Y coordinate translation element.
    fn ty(&self) -> f64 {
        0.0
    }
    /// ZX coordinate element.
    fn mzx(&self) -> f64 {
        0.0
    }
    /// ZY coordinate element.
    fn mzy(&self) -> f64 {
        0.0
    }
    /// Z coordinate scaling element.
    fn mzz(&self) -> f64 {
        1.0
    }
    /// Z coordinate translation element.
    fn tz(&self) -> f64 {
        0.0
    }

    /// Derived-value cache, if this transform keeps one.
    fn cache(&self) -> Option<&TransformCache> {
        None
    }

    /// The concrete variant, for shortcut dispatch.
    fn kind(&self) -> TransformKind<'_> {
        TransformKind::Other
    }

    /// All 12 elements in row-major order.
    fn elements(&self) -> [f64; 12] {
        [
            self.mxx(),
            self.mxy(),
            self.mxz(),
            self.tx(),
            self.myx(),
            self.myy(),
            self.myz(),
            self.ty(),
            self.mzx(),
            self.mzy(),
            self.mzz(),
            self.tz(),
        ]
    }

    /// Determinant of the 3×3 linear block.
    ///
    /// The transform is invertible iff this is nonzero.
    fn determinant(&self) -> f64 {
        determinant_of(&self.elements())
    }

    /// Whether the transform leaves the Z axis alone.
    fn is_2d(&self) -> bool {
        match self.cache() {
            Some(cache) => cache.is_2d_or_else(|| is_2d_of(&self.elements())),
            None => is_2d_of(&self.elements()),
        }
    }

    /// Whether the transform has no effect at all.
    fn is_identity(&self) -> bool {
        match self.cache() {
            Some(cache) => cache.is_identity_or_else(|| self.elements() == IDENTITY_ELEMENTS),
            None => self.elements() == IDENTITY_ELEMENTS,
        }
    }

    /// Snapshot of the current matrix.
    fn to_immutable(&self) -> ImmutableTransform {
        ImmutableTransform::from_elements(self.elements())
    }

    /// Computes the inverse matrix, bypassing any cache.
    fn compute_inverse(&self) -> Result<ImmutableTransform, TransformError> {
        self.to_immutable().invert()
    }

    /// The inverse matrix, from the cache when present.
    ///
    /// A cleared or invalidated cache is refilled on demand. Failures are not
    /// cached.
    fn inverse(&self) -> Result<ImmutableTransform, TransformError> {
        let Some(cache) = self.cache() else {
            return self.compute_inverse();
        };
        if let Some(inverse) = cache.inverse() {
            return Ok(inverse);
        }
        let inverse = self.compute_inverse()?;
        cache.store_inverse(inverse);
        Ok(inverse)
    }

    /// Fails with [`TransformError::NotTwoDimensional`] when the transform
    /// has a Z effect.
    fn ensure_2d(&self) -> Result<(), TransformError> {
        if self.is_2d() {
            Ok(())
        } else {
            Err(TransformError::NotTwoDimensional)
        }
    }

    // -- Point mapping --

    /// Transforms a 3D point.
    fn transform_3d(&self, p: Point3) -> Point3 {
        apply(&self.elements(), p)
    }

    /// Transforms a 3D vector, ignoring translation.
    fn delta_transform_3d(&self, v: Point3) -> Point3 {
        apply_delta(&self.elements(), v)
    }

    /// Transforms a 2D point.
    fn transform_2d(&self, p: Point) -> Result<Point, TransformError> {
        self.ensure_2d()?;
        Ok(self.transform_3d(Point3::from(p)).to_point())
    }

    /// Transforms a 2D vector, ignoring translation.
    fn delta_transform_2d(&self, v: Vec2) -> Result<Vec2, TransformError> {
        self.ensure_2d()?;
        let r = self.delta_transform_3d(Point3::new(v.x, v.y, 0.0));
        Ok(Vec2::new(r.x, r.y))
    }

    /// Transforms a 3D point by the inverse.
    fn inverse_transform_3d(&self, p: Point3) -> Result<Point3, TransformError> {
        Ok(self.inverse()?.transform_3d(p))
    }

    /// Transforms a 3D vector by the inverse, ignoring translation.
    fn inverse_delta_transform_3d(&self, v: Point3) -> Result<Point3, TransformError> {
        Ok(self.inverse()?.delta_transform_3d(v))
    }

    /// Transforms a 2D point by the inverse.
    fn inverse_transform_2d(&self, p: Point) -> Result<Point, TransformError> {
        self.ensure_2d()?;
        Ok(self.inverse_transform_3d(Point3::from(p))?.to_point())
    }

    /// Transforms a 2D vector by the inverse, ignoring translation.
    fn inverse_delta_transform_2d(&self, v: Vec2) -> Result<Vec2, TransformError> {
        self.ensure_2d()?;
        let r = self.inverse_delta_transform_3d(Point3::new(v.x, v.y, 0.0))?;
        Ok(Vec2::new(r.x, r.y))
    }

    // -- Bulk buffers --

    /// Transforms `n` packed `[x, y]` pairs from `src` into `dst`.
    ///
    /// Nothing is written unless every index is in range.
    fn transform_2d_points(
        &self,
        src: &[f64],
        src_off: usize,
        dst: &mut [f64],
        dst_off: usize,
        n: usize,
    ) -> Result<(), TransformError> {
        self.ensure_2d()?;
        let m = self.to_immutable();
        bulk::map(src, src_off, dst, dst_off, n, 2, |p| m.transform_3d(p))
    }

    /// Transforms `n` packed `[x, y]` pairs within one buffer.
    ///
    /// Source and destination ranges may overlap.
    fn transform_2d_points_within(
        &self,
        buf: &mut [f64],
        src_off: usize,
        dst_off: usize,
        n: usize,
    ) -> Result<(), TransformError> {
        self.ensure_2d()?;
        let m = self.to_immutable();
        bulk::map_within(buf, src_off, dst_off, n, 2, |p| m.transform_3d(p))
    }

    /// Transforms `n` packed `[x, y, z]` triples from `src` into `dst`.
    fn transform_3d_points(
        &self,
        src: &[f64],
        src_off: usize,
        dst: &mut [f64],
        dst_off: usize,
        n: usize,
    ) -> Result<(), TransformError> {
        let m = self.to_immutable();
        bulk::map(src, src_off, dst, dst_off, n, 3, |p| m.transform_3d(p))
    }

    /// Transforms `n` packed `[x, y, z]` triples within one buffer.
    fn transform_3d_points_within(
        &self,
        buf: &mut [f64],
        src_off: usize,
        dst_off: usize,
        n: usize,
    ) -> Result<(), TransformError> {
        let m = self.to_immutable();
        bulk::map_within(buf, src_off, dst_off, n, 3, |p| m.transform_3d(p))
    }

    /// Inverse-transforms `n` packed `[x, y]` pairs from `src` into `dst`.
    fn inverse_transform_2d_points(
        &self,
        src: &[f64],
        src_off: usize,
        dst: &mut [f64],
        dst_off: usize,
        n: usize,
    ) -> Result<(), TransformError> {
        self.ensure_2d()?;
        let inv = self.inverse()?;
        bulk::map(src, src_off, dst, dst_off, n, 2, |p| inv.transform_3d(p))
    }

    /// Inverse-transforms `n` packed `[x, y]` pairs within one buffer.
    fn inverse_transform_2d_points_within(
        &self,
        buf: &mut [f64],
        src_off: usize,
        dst_off: usize,
        n: usize,
    ) -> Result<(), TransformError> {
        self.ensure_2d()?;
        let inv = self.inverse()?;
        bulk::map_within(buf, src_off, dst_off, n, 2, |p| inv.transform_3d(p))
    }

    /// Inverse-transforms `n` packed `[x, y, z]` triples from `src` into `dst`.
    fn inverse_transform_3d_points(
        &self,
        src: &[f64],
        src_off: usize,
        dst: &mut [f64],
        dst_off: usize,
        n: usize,
    ) -> Result<(), TransformError> {
        let inv = self.inverse()?;
        bulk::map(src, src_off, dst, dst_off, n, 3, |p| inv.transform_3d(p))
    }

    /// Inverse-transforms `n` packed `[x, y, z]` triples within one buffer.
    fn inverse_transform_3d_points_within(
        &self,
        buf: &mut [f64],
        src_off: usize,
        dst_off: usize,
        n: usize,
    ) -> Result<(), TransformError> {
        let inv = self.inverse()?;
        bulk::map_within(buf, src_off, dst_off, n, 3, |p| inv.transform_3d(p))
    }

    // -- Bounds --

    /// Axis-aligned bounds of the transformed box.
    ///
    /// A flat box at `z = 0` under a 2D transform maps 4 corners, anything
    /// else maps all 8.
    fn transform_bounds(&self, bounds: Bounds3) -> Bounds3 {
        map_bounds(&self.to_immutable(), bounds)
    }

    /// Axis-aligned bounds of the box under the inverse transform.
    fn inverse_transform_bounds(&self, bounds: Bounds3) -> Result<Bounds3, TransformError> {
        Ok(map_bounds(&self.inverse()?, bounds))
    }

    // -- Matrix-shaped views --

    /// The matrix in the requested shape, row-major.
    fn to_array(&self, ty: MatrixType) -> Result<Vec<f64>, TransformError> {
        let values = self.shaped(ty)?;
        Ok(values[..ty.len()].to_vec())
    }

    /// One row of the matrix in the requested shape.
    fn row(&self, ty: MatrixType, row: usize) -> Result<Vec<f64>, TransformError> {
        let values = self.shaped(ty)?;
        if row >= ty.rows() {
            return Err(TransformError::RowOutOfBounds { matrix: ty, row });
        }
        let cols = ty.columns();
        Ok(values[row * cols..(row + 1) * cols].to_vec())
    }

    /// One column of the matrix in the requested shape.
    fn column(&self, ty: MatrixType, column: usize) -> Result<Vec<f64>, TransformError> {
        let values = self.shaped(ty)?;
        let cols = ty.columns();
        if column >= cols {
            return Err(TransformError::ColumnOutOfBounds { matrix: ty, column });
        }
        Ok((0..ty.rows()).map(|r| values[r * cols + column]).collect())
    }

    /// A single matrix element in the requested shape.
    fn element(&self, ty: MatrixType, row: usize, column: usize) -> Result<f64, TransformError> {
        let values = self.shaped(ty)?;
        if row >= ty.rows() || column >= ty.columns() {
            return Err(TransformError::ElementOutOfBounds {
                matrix: ty,
                row,
                column,
            });
        }
        Ok(values[row * ty.columns() + column])
    }

    /// The matrix laid out for `ty` in the first [`MatrixType::len`] slots.
    fn shaped(&self, ty: MatrixType) -> Result<[f64; 16], TransformError> {
        if ty.is_2d() && !self.is_2d() {
            return Err(TransformError::MatrixTypeFor3d(ty));
        }
        let e = self.elements();
        let mut out = [0.0; 16];
        match ty {
            MatrixType::Mt2d2x3 | MatrixType::Mt2d3x3 => {
                out[..6].copy_from_slice(&[e[MXX], e[MXY], e[TX], e[MYX], e[MYY], e[TY]]);
                if ty == MatrixType::Mt2d3x3 {
                    out[8] = 1.0;
                }
            }
            MatrixType::Mt3d3x4 | MatrixType::Mt3d4x4 => {
                out[..12].copy_from_slice(&e);
                if ty == MatrixType::Mt3d4x4 {
                    out[15] = 1.0;
                }
            }
        }
        Ok(out)
    }

    // -- Comparison and composition --

    /// Whether both transforms map every sampled corner of `region` to
    /// points no farther than `max_delta` apart.
    ///
    /// The corners at the region's minimum Z are always sampled; the maximum
    /// Z face is added when either transform is 3D and the region has depth.
    fn similar_to(&self, other: &dyn Transform, region: Bounds3, max_delta: f64) -> bool {
        let a = self.to_immutable();
        let b = other.to_immutable();
        let both_2d = a.is_2d() && b.is_2d();
        let corners = region.corners();
        let sampled = if both_2d || region.depth() == 0.0 {
            &corners[..4]
        } else {
            &corners[..]
        };
        sampled
            .iter()
            .all(|&p| a.transform_3d(p).distance(b.transform_3d(p)) <= max_delta)
    }

    /// The transform equivalent to listing `self` then `other` in a node's
    /// transform list (matrix `self × other`).
    ///
    /// Specialised pairs collapse to a specialised result; everything else
    /// produces a dense [`Affine`].
    fn create_concatenation(&self, other: &dyn Transform) -> AnyTransform {
        concat::concatenate(self.kind(), &self.elements(), other)
    }

    /// A new transform that undoes this one.
    fn create_inverse(&self) -> Result<AnyTransform, TransformError> {
        concat::invert(self.kind(), &self.elements())
    }
}

/// Cofactor expansion of the linear block.
pub(crate) fn determinant_of(e: &[f64; 12]) -> f64 {
    e[MXX] * (e[MYY] * e[MZZ] - e[MZY] * e[MYZ])
        + e[MXY] * (e[MYZ] * e[MZX] - e[MZZ] * e[MYX])
        + e[MXZ] * (e[MYX] * e[MZY] - e[MZX] * e[MYY])
}

/// No element couples Z with X or Y, Z is unscaled, and Z is untranslated.
pub(crate) fn is_2d_of(e: &[f64; 12]) -> bool {
    e[MXZ] == 0.0
        && e[MYZ] == 0.0
        && e[MZX] == 0.0
        && e[MZY] == 0.0
        && e[MZZ] == 1.0
        && e[TZ] == 0.0
}

pub(crate) fn apply(e: &[f64; 12], p: Point3) -> Point3 {
    Point3::new(
        e[MXX] * p.x + e[MXY] * p.y + e[MXZ] * p.z + e[TX],
        e[MYX] * p.x + e[MYY] * p.y + e[MYZ] * p.z + e[TY],
        e[MZX] * p.x + e[MZY] * p.y + e[MZZ] * p.z + e[TZ],
    )
}

pub(crate) fn apply_delta(e: &[f64; 12], v: Point3) -> Point3 {
    Point3::new(
        e[MXX] * v.x + e[MXY] * v.y + e[MXZ] * v.z,
        e[MYX] * v.x + e[MYY] * v.y + e[MYZ] * v.z,
        e[MZX] * v.x + e[MZY] * v.y + e[MZZ] * v.z,
    )
}

fn map_bounds(m: &ImmutableTransform, bounds: Bounds3) -> Bounds3 {
    let corners = bounds.corners();
    let flat = m.is_2d() && bounds.min.z == 0.0 && bounds.max.z == 0.0;
    let sampled = if flat { &corners[..4] } else { &corners[..] };
    let mut mapped = [Point3::ORIGIN; 8];
    for (out, &p) in mapped.iter_mut().zip(sampled) {
        *out = m.transform_3d(p);
    }
    Bounds3::bounding(&mapped[..sampled.len()])
}
