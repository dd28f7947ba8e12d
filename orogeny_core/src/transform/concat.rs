// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Algebraic shortcuts for concatenation and inversion.
//!
//! Pairs of specialised transforms that stay closed under composition
//! collapse to the same variant. Everything else falls back to a dense
//! [`Affine`].

use crate::error::TransformError;
use crate::geometry::Point3;

use super::{
    Affine, AnyTransform, ImmutableTransform, Rotate, Scale, Shear, Transform, TransformKind,
    Translate,
};

/// `lhs × other`, where `lhs` is described by its kind and elements.
pub(crate) fn concatenate(
    lhs: TransformKind<'_>,
    lhs_elements: &[f64; 12],
    other: &dyn Transform,
) -> AnyTransform {
    match (lhs, other.kind()) {
        (TransformKind::Translate(a), TransformKind::Translate(b)) => {
            Translate::new(a.x() + b.x(), a.y() + b.y(), a.z() + b.z()).into()
        }
        (TransformKind::Scale(a), TransformKind::Scale(b)) if a.pivot() == b.pivot() => {
            Scale::with_pivot(a.x() * b.x(), a.y() * b.y(), a.z() * b.z(), a.pivot()).into()
        }
        (TransformKind::Translate(t), TransformKind::Scale(s)) => {
            match shifted_pivot(s, t, |_, t| t) {
                Some(scale) => scale.into(),
                None => dense(lhs_elements, other),
            }
        }
        (TransformKind::Scale(s), TransformKind::Translate(t)) => {
            match shifted_pivot(s, t, |s, t| s * t) {
                Some(scale) => scale.into(),
                None => dense(lhs_elements, other),
            }
        }
        (TransformKind::Rotate(a), TransformKind::Rotate(b))
            if a.pivot() == b.pivot()
                && a.unit_axis().is_some()
                && a.unit_axis() == b.unit_axis() =>
        {
            Rotate::with_axis(a.angle() + b.angle(), a.axis(), a.pivot()).into()
        }
        (TransformKind::Immutable(a), TransformKind::Immutable(b)) => a.concat(b).into(),
        _ => dense(lhs_elements, other),
    }
}

/// A scale about a moved pivot that absorbs an adjacent translation.
///
/// Solving `s (x - q) + q = s (x - p) + p + shift` for `q` gives
/// `q = p + shift / (1 - s)` on every axis the translation touches, which
/// requires `s` to be neither 0 nor 1 there.
fn shifted_pivot(s: &Scale, t: &Translate, shift: impl Fn(f64, f64) -> f64) -> Option<Scale> {
    let axis = |factor: f64, offset: f64, pivot: f64| -> Option<f64> {
        if offset == 0.0 {
            Some(pivot)
        } else if factor == 0.0 || factor == 1.0 {
            None
        } else {
            Some(pivot + shift(factor, offset) / (1.0 - factor))
        }
    };
    let p = s.pivot();
    let pivot = Point3::new(
        axis(s.x(), t.x(), p.x)?,
        axis(s.y(), t.y(), p.y)?,
        axis(s.z(), t.z(), p.z)?,
    );
    Some(Scale::with_pivot(s.x(), s.y(), s.z(), pivot))
}

fn dense(lhs: &[f64; 12], other: &dyn Transform) -> AnyTransform {
    let product = ImmutableTransform::from_elements(*lhs).concat(&other.to_immutable());
    Affine::from(product).into()
}

/// Inverse of the transform described by `kind` and `elements`.
pub(crate) fn invert(
    kind: TransformKind<'_>,
    elements: &[f64; 12],
) -> Result<AnyTransform, TransformError> {
    match kind {
        TransformKind::Translate(t) => Ok(Translate::new(-t.x(), -t.y(), -t.z()).into()),
        TransformKind::Scale(s) => {
            if s.x() == 0.0 || s.y() == 0.0 || s.z() == 0.0 {
                return Err(TransformError::NonInvertible);
            }
            Ok(Scale::with_pivot(1.0 / s.x(), 1.0 / s.y(), 1.0 / s.z(), s.pivot()).into())
        }
        TransformKind::Shear(s) if s.y() == 0.0 || s.x() == 0.0 => {
            let p = s.pivot();
            Ok(Shear::with_pivot(-s.x(), -s.y(), p.x, p.y).into())
        }
        TransformKind::Rotate(r) => Ok(Rotate::with_axis(-r.angle(), r.axis(), r.pivot()).into()),
        TransformKind::Immutable(m) => Ok(m.invert()?.into()),
        TransformKind::Shear(_) | TransformKind::Affine(_) | TransformKind::Other => {
            let inverse = ImmutableTransform::from_elements(*elements).invert()?;
            Ok(Affine::from(inverse).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::test_util::*;

    fn assert_same_effect(actual: &AnyTransform, a: &dyn Transform, b: &dyn Transform) {
        for p in sample_points() {
            let expected = a.transform_3d(b.transform_3d(p));
            assert!(
                approx_point(actual.transform_3d(p), expected),
                "{actual:?} at {p:?}: expected {expected:?}"
            );
        }
    }

    #[test]
    fn translate_then_scale_moves_pivot() {
        let t = Translate::new(3.0, 0.0, 0.0);
        let s = Scale::with_pivot(2.0, 5.0, 1.0, Point3::new(1.0, 1.0, 0.0));
        let c = t.create_concatenation(&s);
        let AnyTransform::Scale(collapsed) = &c else {
            panic!("expected Scale, got {c:?}");
        };
        assert_eq!(collapsed.pivot(), Point3::new(-2.0, 1.0, 0.0), "p + t / (1 - s)");
        assert_same_effect(&c, &t, &s);
    }

    #[test]
    fn scale_then_translate_moves_pivot() {
        let s = Scale::with_pivot(3.0, 0.5, 1.0, Point3::new(0.0, 2.0, 0.0));
        let t = Translate::new(1.0, 4.0, 0.0);
        let c = s.create_concatenation(&t);
        assert!(matches!(c, AnyTransform::Scale(_)), "got {c:?}");
        assert_same_effect(&c, &s, &t);
    }

    #[test]
    fn unit_factor_under_translation_goes_dense() {
        let t = Translate::new(1.0, 1.0, 0.0);
        let s = Scale::new(1.0, 2.0);
        let c = t.create_concatenation(&s);
        assert!(matches!(c, AnyTransform::Affine(_)), "got {c:?}");
        assert_same_effect(&c, &t, &s);
    }

    #[test]
    fn rotations_about_different_pivots_go_dense() {
        let a = Rotate::with_pivot(30.0, Point3::new(1.0, 0.0, 0.0));
        let b = Rotate::new(60.0);
        let c = a.create_concatenation(&b);
        assert!(matches!(c, AnyTransform::Affine(_)), "got {c:?}");
        assert_same_effect(&c, &a, &b);
    }

    #[test]
    fn mixed_variants_go_dense() {
        let a = Shear::new(0.5, 0.0);
        let b = Affine::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let c = a.create_concatenation(&b);
        assert!(matches!(c, AnyTransform::Affine(_)), "got {c:?}");
        assert_same_effect(&c, &a, &b);
    }

    #[test]
    fn immutables_stay_immutable() {
        let a = ImmutableTransform::translation(1.0, 2.0, 3.0);
        let b = ImmutableTransform::new_2d(2.0, 0.0, 0.0, 0.0, 2.0, 0.0);
        let c = a.create_concatenation(&b);
        assert!(matches!(c, AnyTransform::Immutable(_)), "got {c:?}");
        assert_same_effect(&c, &a, &b);
        let inv = c.create_inverse();
        assert!(matches!(inv, Ok(AnyTransform::Immutable(_))), "got {inv:?}");
    }

    #[test]
    fn affine_inverse_is_dense() {
        let a = Affine::new(2.0, 0.0, 1.0, 0.0, 4.0, 2.0);
        let inv = a.create_inverse();
        assert!(matches!(inv, Ok(AnyTransform::Affine(_))), "got {inv:?}");
        let singular = Affine::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(
            singular.create_inverse().map(|_| ()),
            Err(TransformError::NonInvertible),
            "zero matrix"
        );
    }
}
