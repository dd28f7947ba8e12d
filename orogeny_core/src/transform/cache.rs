// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily derived values shared by the mutable transform variants.

use core::cell::Cell;

use super::ImmutableTransform;

/// Read-through cache of a transform's classification flags and inverse.
///
/// Each slot is filled on first read and emptied by
/// [`invalidate`](Self::invalidate), which every mutating setter calls. The
/// inverse slot can additionally be dropped at any time with
/// [`clear_inverse`](Self::clear_inverse); readers recompute on a miss.
#[derive(Clone, Debug, Default)]
pub struct TransformCache {
    is_2d: Cell<Option<bool>>,
    is_identity: Cell<Option<bool>>,
    inverse: Cell<Option<ImmutableTransform>>,
}

impl TransformCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            is_2d: Cell::new(None),
            is_identity: Cell::new(None),
            inverse: Cell::new(None),
        }
    }

    /// Empties every slot.
    #[inline]
    pub fn invalidate(&self) {
        self.is_2d.set(None);
        self.is_identity.set(None);
        self.inverse.set(None);
    }

    /// Releases the cached inverse, keeping the cheap flags.
    #[inline]
    pub fn clear_inverse(&self) {
        self.inverse.set(None);
    }

    /// Cached 2D flag, computed with `f` on a miss.
    pub fn is_2d_or_else(&self, f: impl FnOnce() -> bool) -> bool {
        read_through(&self.is_2d, f)
    }

    /// Cached identity flag, computed with `f` on a miss.
    pub fn is_identity_or_else(&self, f: impl FnOnce() -> bool) -> bool {
        read_through(&self.is_identity, f)
    }

    /// The cached inverse, if present.
    #[inline]
    #[must_use]
    pub fn inverse(&self) -> Option<ImmutableTransform> {
        self.inverse.get()
    }

    /// Stores a freshly computed inverse.
    #[inline]
    pub fn store_inverse(&self, inverse: ImmutableTransform) {
        self.inverse.set(Some(inverse));
    }
}

fn read_through(slot: &Cell<Option<bool>>, f: impl FnOnce() -> bool) -> bool {
    if let Some(v) = slot.get() {
        return v;
    }
    let v = f();
    slot.set(Some(v));
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Transform, Translate};

    #[test]
    fn flags_computed_once_until_invalidated() {
        let cache = TransformCache::new();
        let mut calls = 0;
        assert!(cache.is_2d_or_else(|| {
            calls += 1;
            true
        }), "first read computes");
        assert!(cache.is_2d_or_else(|| {
            calls += 1;
            false
        }), "second read hits");
        assert_eq!(calls, 1, "computed exactly once");

        cache.invalidate();
        assert!(!cache.is_2d_or_else(|| false), "recomputed after invalidate");
    }

    #[test]
    fn cleared_inverse_is_recomputed() {
        let mut t = Translate::new(2.0, 3.0, 0.0);
        let first = t.inverse();
        assert!(first.is_ok(), "translate is invertible");
        assert!(t.cache().is_some_and(|c| c.inverse().is_some()), "inverse cached");

        if let Some(cache) = t.cache() {
            cache.clear_inverse();
        }
        assert_eq!(t.inverse(), first, "recomputed inverse matches");

        t.set_x(5.0);
        assert!(t.cache().is_some_and(|c| c.inverse().is_none()), "setter invalidates");
        let p = t.inverse_transform_3d(crate::geometry::Point3::new(5.0, 3.0, 0.0));
        assert_eq!(p, Ok(crate::geometry::Point3::new(0.0, 0.0, 0.0)), "fresh inverse used");
    }
}
