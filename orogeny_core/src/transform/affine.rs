// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::error::TransformError;
use crate::geometry::Point3;

use super::{
    ImmutableTransform, MXX, MXY, MXZ, MYX, MYY, MYZ, MZX, MZY, MZZ, Rotate, Scale, Shear, TX,
    TY, TZ, Transform, TransformCache, TransformKind, Translate,
};

/// A mutable dense affine matrix.
///
/// Every setter reclassifies the matrix and invalidates derived values, so
/// reads after a mutation never observe a stale inverse.
#[derive(Clone, Debug, Default)]
pub struct Affine {
    m: ImmutableTransform,
    cache: TransformCache,
}

impl PartialEq for Affine {
    fn eq(&self, other: &Self) -> bool {
        self.m == other.m
    }
}

impl From<ImmutableTransform> for Affine {
    fn from(m: ImmutableTransform) -> Self {
        Self {
            m,
            cache: TransformCache::new(),
        }
    }
}

impl From<kurbo::Affine> for Affine {
    fn from(a: kurbo::Affine) -> Self {
        ImmutableTransform::from_kurbo(a).into()
    }
}

macro_rules! setters {
    ($($(#[$doc:meta])* $name:ident => $index:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self, value: f64) {
                self.set($index, value);
            }
        )*
    };
}

impl Affine {
    /// Creates a 2D matrix from its two rows.
    #[must_use]
    pub fn new(mxx: f64, mxy: f64, tx: f64, myx: f64, myy: f64, ty: f64) -> Self {
        ImmutableTransform::new_2d(mxx, mxy, tx, myx, myy, ty).into()
    }

    /// Creates a matrix from its three rows.
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
        ImmutableTransform::new_3d(mxx, mxy, mxz, tx, myx, myy, myz, ty, mzx, mzy, mzz, tz).into()
    }

    /// Creates a matrix from row-major elements.
    #[must_use]
    pub fn from_elements(e: [f64; 12]) -> Self {
        ImmutableTransform::from_elements(e).into()
    }

    /// The current matrix as a snapshot.
    #[inline]
    #[must_use]
    pub fn as_immutable(&self) -> &ImmutableTransform {
        &self.m
    }

    fn set(&mut self, index: usize, value: f64) {
        self.m.set_element(index, value);
        self.cache.invalidate();
    }

    fn replace(&mut self, m: ImmutableTransform) {
        self.m = m;
        self.cache.invalidate();
    }

    setters! {
        /// Sets the X scaling element.
        set_mxx => MXX;
        /// Sets the XY element.
        set_mxy => MXY;
        /// Sets the XZ element.
        set_mxz => MXZ;
        /// Sets the X translation.
        set_tx => TX;
        /// Sets the YX element.
        set_myx => MYX;
        /// Sets the Y scaling element.
        set_myy => MYY;
        /// Sets the YZ element.
        set_myz => MYZ;
        /// Sets the Y translation.
        set_ty => TY;
        /// Sets the ZX element.
        set_mzx => MZX;
        /// Sets the ZY element.
        set_mzy => MZY;
        /// Sets the Z scaling element.
        set_mzz => MZZ;
        /// Sets the Z translation.
        set_tz => TZ;
    }

    /// Copies the matrix of any transform.
    pub fn set_to_transform(&mut self, t: &dyn Transform) {
        self.replace(t.to_immutable());
    }

    /// Resets to identity.
    pub fn set_to_identity(&mut self) {
        self.replace(ImmutableTransform::IDENTITY);
    }

    /// `self = self × t`, so `t` applies to points first.
    pub fn append(&mut self, t: &dyn Transform) {
        self.replace(self.m.concat(&t.to_immutable()));
    }

    /// `self = t × self`, so `t` applies to points last.
    pub fn prepend(&mut self, t: &dyn Transform) {
        self.replace(t.to_immutable().concat(&self.m));
    }

    /// Appends a translation.
    pub fn append_translation(&mut self, x: f64, y: f64, z: f64) {
        self.append(&Translate::new(x, y, z));
    }

    /// Appends a scale about `pivot`.
    pub fn append_scale(&mut self, x: f64, y: f64, z: f64, pivot: Point3) {
        self.append(&Scale::with_pivot(x, y, z, pivot));
    }

    /// Appends a rotation of `angle` degrees about `axis` through `pivot`.
    pub fn append_rotation(&mut self, angle: f64, axis: Point3, pivot: Point3) {
        self.append(&Rotate::with_axis(angle, axis, pivot));
    }

    /// Appends a shear about the origin.
    pub fn append_shear(&mut self, x: f64, y: f64) {
        self.append(&Shear::new(x, y));
    }

    /// Inverts in place.
    ///
    /// On failure the matrix is left unchanged.
    pub fn invert(&mut self) -> Result<(), TransformError> {
        let inverse = self.m.invert()?;
        self.replace(inverse);
        Ok(())
    }
}

impl Transform for Affine {
    fn mxx(&self) -> f64 {
        self.m.mxx()
    }
    fn mxy(&self) -> f64 {
        self.m.mxy()
    }
    fn mxz(&self) -> f64 {
        self.m.mxz()
    }
    fn tx(&self) -> f64 {
        self.m.tx()
    }
    fn myx(&self) -> f64 {
        self.m.myx()
    }
    fn myy(&self) -> f64 {
        self.m.myy()
    }
    fn myz(&self) -> f64 {
        self.m.myz()
    }
    fn ty(&self) -> f64 {
        self.m.ty()
    }
    fn mzx(&self) -> f64 {
        self.m.mzx()
    }
    fn mzy(&self) -> f64 {
        self.m.mzy()
    }
    fn mzz(&self) -> f64 {
        self.m.mzz()
    }
    fn tz(&self) -> f64 {
        self.m.tz()
    }

    fn elements(&self) -> [f64; 12] {
        self.m.to_elements()
    }

    fn cache(&self) -> Option<&TransformCache> {
        Some(&self.cache)
    }

    fn kind(&self) -> TransformKind<'_> {
        TransformKind::Affine(self)
    }

    fn to_immutable(&self) -> ImmutableTransform {
        self.m
    }

    fn is_2d(&self) -> bool {
        self.m.is_2d()
    }

    fn is_identity(&self) -> bool {
        self.m.is_identity()
    }

    fn determinant(&self) -> f64 {
        self.m.determinant()
    }

    fn transform_3d(&self, p: Point3) -> Point3 {
        self.m.transform_3d(p)
    }

    fn delta_transform_3d(&self, v: Point3) -> Point3 {
        self.m.delta_transform_3d(v)
    }

    fn compute_inverse(&self) -> Result<ImmutableTransform, TransformError> {
        self.m.invert()
    }
}
