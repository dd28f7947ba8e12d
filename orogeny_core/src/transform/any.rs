// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::error::TransformError;
use crate::geometry::Point3;

use super::{
    Affine, ImmutableTransform, Rotate, Scale, Shear, Transform, TransformCache, TransformKind,
    Translate,
};

/// Any transform this crate defines.
///
/// This is what concatenation and inversion return, and what a node's
/// transform list holds.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyTransform {
    /// A translation.
    Translate(Translate),
    /// An axis-aligned scale.
    Scale(Scale),
    /// A rotation.
    Rotate(Rotate),
    /// A 2D shear.
    Shear(Shear),
    /// A mutable dense matrix.
    Affine(Affine),
    /// A classified matrix snapshot.
    Immutable(ImmutableTransform),
}

impl Default for AnyTransform {
    fn default() -> Self {
        Self::Immutable(ImmutableTransform::IDENTITY)
    }
}

macro_rules! impl_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for AnyTransform {
                fn from(t: $variant) -> Self {
                    Self::$variant(t)
                }
            }
        )*
    };
}

impl_from!(Translate, Scale, Rotate, Shear, Affine);

impl From<ImmutableTransform> for AnyTransform {
    fn from(t: ImmutableTransform) -> Self {
        Self::Immutable(t)
    }
}

impl AnyTransform {
    fn inner(&self) -> &dyn Transform {
        match self {
            Self::Translate(t) => t,
            Self::Scale(t) => t,
            Self::Rotate(t) => t,
            Self::Shear(t) => t,
            Self::Affine(t) => t,
            Self::Immutable(t) => t,
        }
    }
}

impl Transform for AnyTransform {
    fn mxx(&self) -> f64 {
        self.inner().mxx()
    }
    fn mxy(&self) -> f64 {
        self.inner().mxy()
    }
    fn mxz(&self) -> f64 {
        self.inner().mxz()
    }
    fn tx(&self) -> f64 {
        self.inner().tx()
    }
    fn myx(&self) -> f64 {
        self.inner().myx()
    }
    fn myy(&self) -> f64 {
        self.inner().myy()
    }
    fn myz(&self) -> f64 {
        self.inner().myz()
    }
    fn ty(&self) -> f64 {
        self.inner().ty()
    }
    fn mzx(&self) -> f64 {
        self.inner().mzx()
    }
    fn mzy(&self) -> f64 {
        self.inner().mzy()
    }
    fn mzz(&self) -> f64 {
        self.inner().mzz()
    }
    fn tz(&self) -> f64 {
        self.inner().tz()
    }

    fn elements(&self) -> [f64; 12] {
        self.inner().elements()
    }

    fn cache(&self) -> Option<&TransformCache> {
        self.inner().cache()
    }

    fn kind(&self) -> TransformKind<'_> {
        self.inner().kind()
    }

    fn determinant(&self) -> f64 {
        self.inner().determinant()
    }

    fn is_2d(&self) -> bool {
        self.inner().is_2d()
    }

    fn is_identity(&self) -> bool {
        self.inner().is_identity()
    }

    fn to_immutable(&self) -> ImmutableTransform {
        self.inner().to_immutable()
    }

    fn compute_inverse(&self) -> Result<ImmutableTransform, TransformError> {
        self.inner().compute_inverse()
    }

    fn inverse(&self) -> Result<ImmutableTransform, TransformError> {
        self.inner().inverse()
    }

    fn transform_3d(&self, p: Point3) -> Point3 {
        self.inner().transform_3d(p)
    }

    fn delta_transform_3d(&self, v: Point3) -> Point3 {
        self.inner().delta_transform_3d(v)
    }

    fn inverse_transform_3d(&self, p: Point3) -> Result<Point3, TransformError> {
        self.inner().inverse_transform_3d(p)
    }

    fn inverse_delta_transform_3d(&self, v: Point3) -> Result<Point3, TransformError> {
        self.inner().inverse_delta_transform_3d(v)
    }
}

/// Resolves a transform list to one matrix.
///
/// The first entry is outermost: the last entry applies to points first.
#[must_use]
pub fn concatenate_all(list: &[AnyTransform]) -> ImmutableTransform {
    list.iter()
        .fold(ImmutableTransform::IDENTITY, |acc, t| acc.concat(&t.to_immutable()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::test_util::*;

    #[test]
    fn delegation_reaches_variant_cache() {
        let t: AnyTransform = Translate::new(1.0, 2.0, 0.0).into();
        assert!(t.cache().is_some(), "variant cache is visible");
        assert!(matches!(t.kind(), TransformKind::Translate(_)), "variant kind");
        let m: AnyTransform = ImmutableTransform::IDENTITY.into();
        assert!(m.cache().is_none(), "snapshots are uncached");
        assert!(m.is_identity(), "identity snapshot");
    }

    #[test]
    fn list_resolves_outermost_first() {
        let list = [
            AnyTransform::from(Translate::new(10.0, 0.0, 0.0)),
            AnyTransform::from(Rotate::new(90.0)),
            AnyTransform::from(Scale::new(2.0, 2.0)),
        ];
        let m = concatenate_all(&list);
        // Scale, then rotate, then translate.
        let p = m.transform_3d(Point3::new(1.0, 0.0, 0.0));
        assert!(approx_point(p, Point3::new(10.0, 2.0, 0.0)), "got {p:?}");
        assert!(concatenate_all(&[]).is_identity(), "empty list");
    }
}
