// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evaluation of dirty nodes.
//!
//! [`NodeStore::evaluate`] drains the [`TRANSFORM`](crate::dirty::TRANSFORM)
//! channel in dependency order, so parents are always recomputed before
//! their children. Each drained node resolves its transform list to a local
//! matrix and multiplies it under its parent's world matrix.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId};
use super::store::NodeStore;
use crate::dirty;
use crate::transform::{ImmutableTransform, Transform};

/// What a single [`NodeStore::evaluate`] call recomputed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneChanges {
    /// Nodes whose local and world transforms were recomputed, parents
    /// before children.
    pub transforms: Vec<NodeId>,
    /// Whether nodes were created, destroyed, or moved since the last call.
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.topology_changed = false;
    }
}

impl NodeStore {
    /// Recomputes every invalidated node and reports what changed.
    pub fn evaluate(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let dirty_nodes: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_nodes {
            let local = self.transform_list[idx as usize]
                .iter()
                .fold(ImmutableTransform::IDENTITY, |acc, t| {
                    acc.concat(&self.transforms[t.idx as usize].to_immutable())
                });
            let parent_idx = self.parent[idx as usize];
            let world = if parent_idx != INVALID {
                self.world_transform[parent_idx as usize].concat(&local)
            } else {
                local
            };
            self.local_transform[idx as usize] = local;
            self.world_transform[idx as usize] = world;
        }
        changes
            .transforms
            .extend(dirty_nodes.iter().map(|&idx| self.node_id(idx)));
    }

    /// Live nodes in depth-first pre-order, as raw slot indices.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::geometry::Point3;
    use crate::transform::test_util::approx_point;
    use crate::transform::{AnyTransform, Rotate, Scale, Translate};

    #[test]
    fn world_transforms_compose_down_the_tree() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);

        let shift = store.create_transform(Translate::new(10.0, 0.0, 0.0));
        let grow = store.create_transform(Scale::new(2.0, 2.0));
        store.push_transform(parent, shift);
        store.push_transform(child, grow);

        let changes = store.evaluate();
        assert_eq!(changes.transforms, vec![parent, child], "parents first");
        assert!(changes.topology_changed, "new nodes");

        let p = store.world_transform(child).transform_3d(Point3::new(1.0, 1.0, 0.0));
        assert!(approx_point(p, Point3::new(12.0, 2.0, 0.0)), "scaled then shifted: {p:?}");
        assert_eq!(
            store.local_transform(child),
            Scale::new(2.0, 2.0).to_immutable(),
            "local is just the node's list"
        );
    }

    #[test]
    fn list_order_is_outermost_first() {
        let mut store = NodeStore::new();
        let node = store.create_node();
        let t = store.create_transform(Translate::new(5.0, 0.0, 0.0));
        let r = store.create_transform(Rotate::new(90.0));
        store.push_transform(node, t);
        store.push_transform(node, r);
        let _ = store.evaluate();
        let p = store.world_transform(node).transform_3d(Point3::new(1.0, 0.0, 0.0));
        assert!(approx_point(p, Point3::new(5.0, 1.0, 0.0)), "rotated then shifted: {p:?}");
    }

    #[test]
    fn updating_a_shared_transform_touches_only_its_dependents() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let b = store.create_node();
        let a_child = store.create_node();
        let lonely = store.create_node();
        store.add_child(a, a_child);

        let shared = store.create_transform(Translate::default());
        store.push_transform(a, shared);
        store.push_transform(b, shared);
        let _ = store.evaluate();

        store.update_transform(shared, |t| {
            if let AnyTransform::Translate(t) = t {
                t.set_x(3.0);
            }
        });
        let changes = store.evaluate();
        assert!(!changes.topology_changed, "no structural change");
        assert!(changes.transforms.contains(&a), "dependent");
        assert!(changes.transforms.contains(&b), "dependent");
        assert!(changes.transforms.contains(&a_child), "descendant of a dependent");
        assert!(!changes.transforms.contains(&lonely), "untouched");
        assert_eq!(store.world_transform(a_child).tx(), 3.0, "inherited the update");
    }

    #[test]
    fn clean_store_evaluates_to_nothing() {
        let mut store = NodeStore::new();
        let _root = store.create_node();
        let _ = store.evaluate();
        let changes = store.evaluate();
        assert_eq!(changes, SceneChanges::default(), "nothing to do");
    }

    #[test]
    fn detaching_resets_world_to_local() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);
        let shift = store.create_transform(Translate::new(0.0, 7.0, 0.0));
        store.push_transform(parent, shift);
        let _ = store.evaluate();
        assert_eq!(store.world_transform(child).ty(), 7.0, "inherited");

        store.remove_from_parent(child);
        let changes = store.evaluate();
        assert_eq!(changes.transforms, vec![child], "only the detached node");
        assert!(store.world_transform(child).is_identity(), "no ancestry left");
        assert_eq!(store.traversal_order(), &[0, 1], "two roots");
    }
}
