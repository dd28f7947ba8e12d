// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform nodes.
//!
//! A *node* is a point in a tree that positions its subtree with an ordered
//! list of transforms. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//! - A transform list of [`TransformId`]s. The first entry is outermost.
//! - **Computed properties** produced by [`evaluate`](NodeStore::evaluate):
//!   the local transform (the list resolved to one matrix) and the world
//!   transform (the product of ancestor local transforms and the node's own).
//!
//! Transforms live in the store and are shared by id. Each keeps an index of
//! the nodes that list it; this back-reference is used only to invalidate
//! those nodes, never for ownership.

mod evaluate;
mod id;
mod store;
mod traverse;

pub use evaluate::SceneChanges;
pub use id::{INVALID, NodeId, TransformId};
pub use store::NodeStore;
pub use traverse::Children;
