// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channels.
//!
//! The [`NodeStore`](crate::scene::NodeStore) tracks invalidation with
//! [`understory_dirty`]. A node's world transform depends on its parent's, so
//! every child has a dependency edge to its parent on [`TRANSFORM`] and marks
//! on that channel use [`EagerPolicy`](understory_dirty::EagerPolicy):
//! marking a node marks its whole subtree.
//!
//! Callers never query dirty state directly.
//! [`NodeStore::evaluate`](crate::scene::NodeStore::evaluate) drains the
//! channel and reports what it recomputed.

use understory_dirty::Channel;

/// A node's transform list, one of its transforms, or its ancestry changed.
pub const TRANSFORM: Channel = Channel::new(0);
