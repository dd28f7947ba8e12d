// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::geometry::Point3;

use super::{ImmutableTransform, Transform, TransformCache, TransformKind};

/// A translation by `(x, y, z)`.
#[derive(Clone, Debug, Default)]
pub struct Translate {
    x: f64,
    y: f64,
    z: f64,
    cache: TransformCache,
}

impl Translate {
    /// Creates a translation.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            cache: TransformCache::new(),
        }
    }

    /// X distance.
    #[inline]
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y distance.
    #[inline]
    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Z distance.
    #[inline]
    #[must_use]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Sets the X distance.
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
        self.cache.invalidate();
    }

    /// Sets the Y distance.
    pub fn set_y(&mut self, y: f64) {
        self.y = y;
        self.cache.invalidate();
    }

    /// Sets the Z distance.
    pub fn set_z(&mut self, z: f64) {
        self.z = z;
        self.cache.invalidate();
    }
}

impl PartialEq for Translate {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

impl Transform for Translate {
    fn tx(&self) -> f64 {
        self.x
    }
    fn ty(&self) -> f64 {
        self.y
    }
    fn tz(&self) -> f64 {
        self.z
    }

    fn cache(&self) -> Option<&TransformCache> {
        Some(&self.cache)
    }

    fn kind(&self) -> TransformKind<'_> {
        TransformKind::Translate(self)
    }

    fn determinant(&self) -> f64 {
        1.0
    }

    fn is_2d(&self) -> bool {
        self.z == 0.0
    }

    fn is_identity(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    fn transform_3d(&self, p: Point3) -> Point3 {
        Point3::new(p.x + self.x, p.y + self.y, p.z + self.z)
    }

    fn delta_transform_3d(&self, v: Point3) -> Point3 {
        v
    }

    fn compute_inverse(&self) -> Result<ImmutableTransform, crate::error::TransformError> {
        Ok(ImmutableTransform::translation(-self.x, -self.y, -self.z))
    }
}
