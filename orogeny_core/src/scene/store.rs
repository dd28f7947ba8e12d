// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with transform ownership and dependents.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::transform::{AnyTransform, ImmutableTransform};

use super::id::{INVALID, NodeId, TransformId};
use super::traverse::Children;

/// Nodes, the transforms they reference, and the caches derived from both.
///
/// Each node has a parent, ordered children, and an ordered transform list.
/// Transforms are owned by the store and shared by id: every transform keeps
/// an index of the nodes that list it, so changing one invalidates exactly
/// those nodes and their descendants.
///
/// Handles are generational; using a handle after its node or transform has
/// been destroyed panics.
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Per-node transform lists --
    pub(crate) transform_list: Vec<Vec<TransformId>>,

    // -- Computed (written by evaluate) --
    pub(crate) local_transform: Vec<ImmutableTransform>,
    pub(crate) world_transform: Vec<ImmutableTransform>,

    // -- Node allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Transform slab --
    pub(crate) transforms: Vec<AnyTransform>,
    pub(crate) dependents: Vec<Vec<u32>>,
    pub(crate) transform_generation: Vec<u32>,
    pub(crate) transform_free_list: Vec<u32>,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            transform_list: Vec::new(),
            local_transform: Vec::new(),
            world_transform: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            transforms: Vec::new(),
            dependents: Vec::new(),
            transform_generation: Vec::new(),
            transform_free_list: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
        }
    }

    // -- Node allocation --

    /// Creates a detached node with an empty transform list.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.transform_list[i].clear();
            self.local_transform[i] = ImmutableTransform::IDENTITY;
            self.world_transform[i] = ImmutableTransform::IDENTITY;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.transform_list.push(Vec::new());
            self.local_transform.push(ImmutableTransform::IDENTITY);
            self.world_transform.push(ImmutableTransform::IDENTITY);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.dirty.mark(idx, dirty::TRANSFORM);
        self.node_id(idx)
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// The node is detached from its parent and dropped from the dependents
    /// of every transform it listed. The transforms themselves survive.
    ///
    /// # Panics
    ///
    /// Panics if the node has children or the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        let list = core::mem::take(&mut self.transform_list[idx as usize]);
        for t in list {
            self.dependents[t.idx as usize].retain(|&n| n != idx);
        }

        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
        self.traversal_dirty = true;
    }

    /// Whether `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology --

    /// Adds `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        self.link_last(parent.idx, child.idx);
    }

    /// Detaches `child` from its parent, making it a root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        let p = self.parent[c as usize];
        assert!(p != INVALID, "node has no parent");

        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);
        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.traversal_dirty = true;
    }

    /// Moves `child` under `new_parent`, detaching it first if needed.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        self.validate(child);
        self.validate(new_parent);
        let c = child.idx;
        let old = self.parent[c as usize];
        if old != INVALID {
            self.unlink_from_parent(c);
            self.dirty.remove_dependency(c, old, dirty::TRANSFORM);
        }
        self.link_last(new_parent.idx, c);
    }

    /// The parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.node_id(p))
    }

    /// The direct children of a node, in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Live nodes without a parent, in slot order.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx))
            .map(|idx| self.node_id(idx))
            .collect()
    }

    // -- Transforms --

    /// Takes ownership of a transform and returns its handle.
    pub fn create_transform(&mut self, transform: impl Into<AnyTransform>) -> TransformId {
        let transform = transform.into();
        let idx = if let Some(idx) = self.transform_free_list.pop() {
            let i = idx as usize;
            self.transform_generation[i] += 1;
            self.transforms[i] = transform;
            self.dependents[i].clear();
            idx
        } else {
            let idx = u32::try_from(self.transforms.len()).unwrap_or(INVALID);
            assert!(idx != INVALID, "transform slab is full");
            self.transforms.push(transform);
            self.dependents.push(Vec::new());
            self.transform_generation.push(0);
            idx
        };
        self.transform_id(idx)
    }

    /// Drops a transform, removing it from every node that lists it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_transform(&mut self, id: TransformId) {
        self.validate_transform(id);
        let i = id.idx as usize;
        for node in core::mem::take(&mut self.dependents[i]) {
            self.transform_list[node as usize].retain(|&t| t != id);
            self.dirty.mark_with(node, dirty::TRANSFORM, &EagerPolicy);
        }
        self.transforms[i] = AnyTransform::default();
        self.transform_generation[i] += 1;
        self.transform_free_list.push(id.idx);
    }

    /// Whether `id` refers to a live transform.
    #[must_use]
    pub fn is_transform_alive(&self, id: TransformId) -> bool {
        (id.idx as usize) < self.transforms.len()
            && self.transform_generation[id.idx as usize] == id.generation
            && !self.transform_free_list.contains(&id.idx)
    }

    /// The current value of a transform.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn transform(&self, id: TransformId) -> &AnyTransform {
        self.validate_transform(id);
        &self.transforms[id.idx as usize]
    }

    /// Mutates a transform in place and invalidates every node that lists it,
    /// along with their descendants.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn update_transform<R>(
        &mut self,
        id: TransformId,
        f: impl FnOnce(&mut AnyTransform) -> R,
    ) -> R {
        self.validate_transform(id);
        let i = id.idx as usize;
        let result = f(&mut self.transforms[i]);
        for &node in &self.dependents[i] {
            self.dirty.mark_with(node, dirty::TRANSFORM, &EagerPolicy);
        }
        result
    }

    /// Replaces a transform's value. See [`update_transform`](Self::update_transform).
    pub fn set_transform(&mut self, id: TransformId, transform: impl Into<AnyTransform>) {
        let transform = transform.into();
        self.update_transform(id, |t| *t = transform);
    }

    /// Appends a transform to a node's list. The last transform in the list
    /// applies to points first.
    ///
    /// A transform may appear in a list more than once.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn push_transform(&mut self, node: NodeId, transform: TransformId) {
        self.validate(node);
        self.validate_transform(transform);
        self.transform_list[node.idx as usize].push(transform);
        let dependents = &mut self.dependents[transform.idx as usize];
        if !dependents.contains(&node.idx) {
            dependents.push(node.idx);
        }
        self.dirty.mark_with(node.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Removes the first occurrence of a transform from a node's list.
    /// Returns `false` if the node did not list it.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove_transform(&mut self, node: NodeId, transform: TransformId) -> bool {
        self.validate(node);
        self.validate_transform(transform);
        let list = &mut self.transform_list[node.idx as usize];
        let Some(pos) = list.iter().position(|&t| t == transform) else {
            return false;
        };
        list.remove(pos);
        if !list.contains(&transform) {
            self.dependents[transform.idx as usize].retain(|&n| n != node.idx);
        }
        self.dirty.mark_with(node.idx, dirty::TRANSFORM, &EagerPolicy);
        true
    }

    /// A node's transform list, outermost first.
    #[must_use]
    pub fn transforms(&self, node: NodeId) -> &[TransformId] {
        self.validate(node);
        &self.transform_list[node.idx as usize]
    }

    /// The nodes whose lists contain a transform, in the order they first
    /// listed it.
    #[must_use]
    pub fn dependents(&self, id: TransformId) -> Vec<NodeId> {
        self.validate_transform(id);
        self.dependents[id.idx as usize]
            .iter()
            .map(|&idx| self.node_id(idx))
            .collect()
    }

    // -- Computed properties --

    /// The node's transform list resolved to one matrix.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn local_transform(&self, id: NodeId) -> ImmutableTransform {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// The product of all ancestor local transforms and the node's own.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> ImmutableTransform {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    // -- Internal helpers --

    pub(crate) fn node_id(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    fn transform_id(&self, idx: u32) -> TransformId {
        TransformId {
            idx,
            generation: self.transform_generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Panics if the handle is stale.
    fn validate_transform(&self, id: TransformId) {
        assert!(
            self.is_transform_alive(id),
            "stale TransformId: {id:?}"
        );
    }

    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.traversal_dirty = true;
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::transform::{Scale, Translate};

    #[test]
    fn create_and_destroy() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        assert!(store.is_alive(id), "fresh node");
        store.destroy_node(id);
        assert!(!store.is_alive(id), "destroyed");
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = NodeStore::new();
        let id1 = store.create_node();
        store.destroy_node(id1);
        let id2 = store.create_node();
        assert!(!store.is_alive(id1), "old handle");
        assert!(store.is_alive(id2), "new handle");
        assert_eq!(id1.idx, id2.idx, "slot reused");
        assert_ne!(id1.generation, id2.generation, "generation bumped");
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn stale_node_panics() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        store.destroy_node(id);
        let _ = store.parent(id);
    }

    #[test]
    #[should_panic(expected = "stale TransformId")]
    fn stale_transform_panics() {
        let mut store = NodeStore::new();
        let t = store.create_transform(Translate::default());
        store.destroy_transform(t);
        let _ = store.transform(t);
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroying_a_parent_panics() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);
        store.destroy_node(parent);
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let a = store.create_node();
        let b = store.create_node();
        store.add_child(parent, a);
        store.add_child(parent, b);
        assert_eq!(store.children(parent).collect::<Vec<_>>(), vec![a, b], "ordered");
        assert_eq!(store.parent(b), Some(parent), "linked");
        assert_eq!(store.roots(), vec![parent], "one root");

        store.remove_from_parent(a);
        assert_eq!(store.children(parent).collect::<Vec<_>>(), vec![b], "unlinked");
        assert_eq!(store.parent(a), None, "detached");
    }

    #[test]
    fn reparent_moves_the_subtree() {
        let mut store = NodeStore::new();
        let p1 = store.create_node();
        let p2 = store.create_node();
        let child = store.create_node();
        store.add_child(p1, child);
        store.reparent(child, p2);
        assert_eq!(store.parent(child), Some(p2), "new parent");
        assert!(store.children(p1).next().is_none(), "old parent emptied");
    }

    #[test]
    fn dependents_track_transform_lists() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let b = store.create_node();
        let shared = store.create_transform(Scale::new(2.0, 2.0));

        store.push_transform(a, shared);
        store.push_transform(a, shared);
        store.push_transform(b, shared);
        assert_eq!(store.dependents(shared), vec![a, b], "each node once");
        assert_eq!(store.transforms(a), &[shared, shared], "listed twice");

        assert!(store.remove_transform(a, shared), "first occurrence");
        assert_eq!(store.dependents(shared), vec![a, b], "still listed once");
        assert!(store.remove_transform(a, shared), "second occurrence");
        assert_eq!(store.dependents(shared), vec![b], "no longer depends");
        assert!(!store.remove_transform(a, shared), "nothing left");

        store.destroy_transform(shared);
        assert!(store.transforms(b).is_empty(), "removed from lists");
    }

    #[test]
    fn destroying_a_node_releases_its_transforms() {
        let mut store = NodeStore::new();
        let node = store.create_node();
        let t = store.create_transform(Translate::new(1.0, 0.0, 0.0));
        store.push_transform(node, t);
        store.destroy_node(node);
        assert!(store.dependents(t).is_empty(), "no dependents");
        assert!(store.is_transform_alive(t), "transform survives");
    }
}
