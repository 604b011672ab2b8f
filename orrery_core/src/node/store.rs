// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use glam::{DQuat, DVec3};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::component::ComponentTypes;
use super::desc::NodeDesc;
use super::id::{INVALID, NodeId};
use super::payload::NodeKind;
use super::traverse::{Children, collect_preorder};
use crate::dirty;
use crate::resolver::PositionResolver;
use crate::visibility::FadeState;

/// Struct-of-arrays storage for all nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Identity --
    pub(crate) id: Vec<i64>,
    pub(crate) names: Vec<Vec<String>>,
    pub(crate) localized_name: Vec<Option<String>>,

    // -- Local properties (set by callers) --
    pub(crate) pos: Vec<DVec3>,
    pub(crate) orientation: Vec<DQuat>,
    pub(crate) size: Vec<f64>,
    pub(crate) fade: Vec<FadeState>,
    pub(crate) components: Vec<ComponentTypes>,
    pub(crate) force_label: Vec<bool>,
    pub(crate) resolver: Vec<Option<PositionResolver>>,
    pub(crate) kind: Vec<NodeKind>,

    // -- Computed properties (written by update) --
    pub(crate) translation: Vec<DVec3>,
    pub(crate) dist: Vec<f64>,
    pub(crate) view_angle: Vec<f64>,
    pub(crate) view_angle_apparent: Vec<f64>,
    pub(crate) opacity: Vec<f64>,
    pub(crate) overflow: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) live: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            id: Vec::new(),
            names: Vec::new(),
            localized_name: Vec::new(),
            pos: Vec::new(),
            orientation: Vec::new(),
            size: Vec::new(),
            fade: Vec::new(),
            components: Vec::new(),
            force_label: Vec::new(),
            resolver: Vec::new(),
            kind: Vec::new(),
            translation: Vec::new(),
            dist: Vec::new(),
            view_angle: Vec::new(),
            view_angle_apparent: Vec::new(),
            opacity: Vec::new(),
            overflow: Vec::new(),
            generation: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a detached node from `desc` and returns its handle.
    ///
    /// The descriptor's `parent` and `wrapped` fields are ignored; wiring the
    /// node into the tree is the caller's job.
    pub fn create_node(&mut self, desc: NodeDesc) -> NodeId {
        let NodeDesc {
            names,
            id,
            localized_name,
            kind,
            components,
            pos,
            size,
            orientation,
            resolver,
            visible,
            force_label,
            ..
        } = desc;
        let fade = FadeState::new(visible);

        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.id[i] = id;
            self.names[i] = names;
            self.localized_name[i] = localized_name;
            self.pos[i] = pos;
            self.orientation[i] = orientation;
            self.size[i] = size;
            self.fade[i] = fade;
            self.components[i] = components;
            self.force_label[i] = force_label;
            self.resolver[i] = resolver;
            self.kind[i] = kind;
            self.translation[i] = DVec3::ZERO;
            self.dist[i] = 0.0;
            self.view_angle[i] = 0.0;
            self.view_angle_apparent[i] = 0.0;
            self.opacity[i] = 0.0;
            self.overflow[i] = false;
            self.live[i] = true;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.id.push(id);
            self.names.push(names);
            self.localized_name.push(localized_name);
            self.pos.push(pos);
            self.orientation.push(orientation);
            self.size.push(size);
            self.fade.push(fade);
            self.components.push(components);
            self.force_label.push(force_label);
            self.resolver.push(resolver);
            self.kind.push(kind);
            self.translation.push(DVec3::ZERO);
            self.dist.push(0.0);
            self.view_angle.push(0.0);
            self.view_angle_apparent.push(0.0);
            self.opacity.push(0.0);
            self.overflow.push(false);
            self.generation.push(0);
            self.live.push(true);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a node, freeing its slot for reuse, and returns its payload.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_node(&mut self, id: NodeId) -> NodeKind {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.live[idx as usize] = false;
        self.resolver[idx as usize] = None;
        let kind = core::mem::take(&mut self.kind[idx as usize]);

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        kind
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.live[id.idx as usize]
    }

    /// Returns the handle of the live node at raw slot `idx`, if any.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> Option<NodeId> {
        (idx < self.len && self.live[idx as usize]).then(|| NodeId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        let last = self.last_child(p);
        if last == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        // Child depends on parent for inherited visibility.
        let _ = self.dirty.add_dependency(c, p, dirty::VISIBILITY);

        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from its current parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::VISIBILITY);

        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(NodeId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the handles of the subtree rooted at `id`, in pre-order.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        self.validate(id);
        let mut stack = Vec::new();
        let mut order = Vec::new();
        collect_preorder(self, id.idx, &mut stack, &mut order);
        order
            .into_iter()
            .map(|idx| NodeId {
                idx,
                generation: self.generation[idx as usize],
            })
            .collect()
    }

    /// Returns the live nodes that have no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID)
            .filter_map(|idx| self.id_at(idx))
            .collect()
    }

    /// Returns the current traversal order (depth-first pre-order).
    ///
    /// Only valid after an update (or an explicit rebuild) since the last
    /// topology change.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    /// Rebuilds the depth-first pre-order traversal of all live nodes.
    ///
    /// Uses `stack` as scratch space. Returns `true` if a rebuild happened.
    pub(crate) fn rebuild_traversal_order(&mut self, stack: &mut Vec<u32>) -> bool {
        if !self.traversal_dirty {
            return false;
        }
        let mut order = core::mem::take(&mut self.traversal_order);
        order.clear();
        for root in self.roots() {
            collect_preorder(self, root.idx, stack, &mut order);
        }
        self.traversal_order = order;
        self.traversal_dirty = false;
        true
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns every name of a node; the first is canonical.
    #[must_use]
    pub fn names(&self, id: NodeId) -> &[String] {
        self.validate(id);
        &self.names[id.idx as usize]
    }

    /// Returns the canonical name of a node.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.validate(id);
        self.name_at(id.idx)
    }

    /// Returns the numeric id of a node.
    #[must_use]
    pub fn numeric_id(&self, id: NodeId) -> i64 {
        self.validate(id);
        self.id[id.idx as usize]
    }

    /// Returns the localized name, falling back to the canonical name.
    #[must_use]
    pub fn display_name(&self, id: NodeId) -> &str {
        self.validate(id);
        match &self.localized_name[id.idx as usize] {
            Some(name) => name,
            None => self.name_at(id.idx),
        }
    }

    /// Returns the parent-relative position.
    #[must_use]
    pub fn pos(&self, id: NodeId) -> DVec3 {
        self.validate(id);
        self.pos[id.idx as usize]
    }

    /// Returns the orientation.
    #[must_use]
    pub fn orientation(&self, id: NodeId) -> DQuat {
        self.validate(id);
        self.orientation[id.idx as usize]
    }

    /// Returns the diameter.
    #[must_use]
    pub fn size(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.size[id.idx as usize]
    }

    /// Returns the user visibility flag.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.fade[id.idx as usize].is_visible()
    }

    /// Returns the visibility fade state.
    #[must_use]
    pub fn fade(&self, id: NodeId) -> FadeState {
        self.validate(id);
        self.fade[id.idx as usize]
    }

    /// Returns the category tags.
    #[must_use]
    pub fn components(&self, id: NodeId) -> ComponentTypes {
        self.validate(id);
        self.components[id.idx as usize]
    }

    /// Returns whether the label is forced on.
    #[must_use]
    pub fn force_label(&self, id: NodeId) -> bool {
        self.validate(id);
        self.force_label[id.idx as usize]
    }

    /// Returns the position resolver, if any.
    #[must_use]
    pub fn resolver(&self, id: NodeId) -> Option<&PositionResolver> {
        self.validate(id);
        self.resolver[id.idx as usize].as_ref()
    }

    /// Returns the payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        self.validate(id);
        &self.kind[id.idx as usize]
    }

    /// Returns the payload mutably.
    #[must_use]
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        self.validate(id);
        &mut self.kind[id.idx as usize]
    }

    /// Returns the camera-relative position computed by the last update.
    #[must_use]
    pub fn translation(&self, id: NodeId) -> DVec3 {
        self.validate(id);
        self.translation[id.idx as usize]
    }

    /// Returns the distance to the camera computed by the last update.
    #[must_use]
    pub fn dist(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.dist[id.idx as usize]
    }

    /// Returns the raw view angle computed by the last update.
    #[must_use]
    pub fn view_angle(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.view_angle[id.idx as usize]
    }

    /// Returns the field-of-view adjusted view angle.
    #[must_use]
    pub fn view_angle_apparent(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.view_angle_apparent[id.idx as usize]
    }

    /// Returns the opacity computed by the last update.
    #[must_use]
    pub fn opacity(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.opacity[id.idx as usize]
    }

    /// Returns whether the node's coordinates are out of their time range.
    #[must_use]
    pub fn is_overflow(&self, id: NodeId) -> bool {
        self.validate(id);
        self.overflow[id.idx as usize]
    }

    // -- Mutation API --

    /// Sets the parent-relative position. Overwritten by the resolver, if any.
    pub fn set_pos(&mut self, id: NodeId, pos: DVec3) {
        self.validate(id);
        self.pos[id.idx as usize] = pos;
    }

    /// Sets the orientation.
    pub fn set_orientation(&mut self, id: NodeId, orientation: DQuat) {
        self.validate(id);
        self.orientation[id.idx as usize] = orientation;
    }

    /// Sets the diameter.
    pub fn set_size(&mut self, id: NodeId, size: f64) {
        self.validate(id);
        self.size[id.idx as usize] = size;
    }

    /// Sets the user visibility flag, starting a fade at `now_ms`.
    ///
    /// Marks the VISIBILITY channel dirty with eager propagation to
    /// descendants. Returns `true` if the flag changed.
    pub fn set_visible(&mut self, id: NodeId, visible: bool, now_ms: u64, fade_ms: u64) -> bool {
        self.validate(id);
        let changed = self.fade[id.idx as usize].set_visible(visible, now_ms, fade_ms);
        if changed {
            self.dirty
                .mark_with(id.idx, dirty::VISIBILITY, &EagerPolicy);
        }
        changed
    }

    /// Forces the label on or off.
    pub fn set_force_label(&mut self, id: NodeId, force: bool) {
        self.validate(id);
        self.force_label[id.idx as usize] = force;
    }

    /// Sets the category tags.
    pub fn set_components(&mut self, id: NodeId, components: ComponentTypes) {
        self.validate(id);
        self.components[id.idx as usize] = components;
    }

    /// Replaces the position resolver.
    pub fn set_resolver(&mut self, id: NodeId, resolver: Option<PositionResolver>) {
        self.validate(id);
        self.resolver[id.idx as usize] = resolver;
    }

    // -- Raw-index accessors for backends --
    //
    // These accept raw slot indices (as found in `RenderLists` and
    // `FrameChanges`) rather than `NodeId` handles, skipping generation
    // validation.

    /// Returns the canonical name at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn name_at(&self, idx: u32) -> &str {
        self.check_slot(idx);
        self.names[idx as usize].first().map_or("", String::as_str)
    }

    /// Returns the camera-relative position at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn translation_at(&self, idx: u32) -> DVec3 {
        self.check_slot(idx);
        self.translation[idx as usize]
    }

    /// Returns the orientation at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn orientation_at(&self, idx: u32) -> DQuat {
        self.check_slot(idx);
        self.orientation[idx as usize]
    }

    /// Returns the diameter at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn size_at(&self, idx: u32) -> f64 {
        self.check_slot(idx);
        self.size[idx as usize]
    }

    /// Returns the distance to the camera at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn dist_at(&self, idx: u32) -> f64 {
        self.check_slot(idx);
        self.dist[idx as usize]
    }

    /// Returns the raw view angle at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn view_angle_at(&self, idx: u32) -> f64 {
        self.check_slot(idx);
        self.view_angle[idx as usize]
    }

    /// Returns the opacity at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn opacity_at(&self, idx: u32) -> f64 {
        self.check_slot(idx);
        self.opacity[idx as usize]
    }

    /// Returns the payload at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn kind_at(&self, idx: u32) -> &NodeKind {
        self.check_slot(idx);
        &self.kind[idx as usize]
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn check_slot(&self, idx: u32) {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
    }

    /// Returns the last child of `idx`, or [`INVALID`].
    pub(crate) fn last_child(&self, idx: u32) -> u32 {
        let mut last = self.first_child[idx as usize];
        if last == INVALID {
            return INVALID;
        }
        while self.next_sibling[last as usize] != INVALID {
            last = self.next_sibling[last as usize];
        }
        last
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
    use super::*;

    fn node(store: &mut NodeStore, name: &str) -> NodeId {
        store.create_node(NodeDesc::new(name))
    }

    #[test]
    fn create_and_destroy() {
        let mut store = NodeStore::new();
        let id = node(&mut store, "a");
        assert!(store.is_alive(id));
        assert_eq!(store.name(id), "a");
        store.destroy_node(id);
        assert!(!store.is_alive(id));
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = NodeStore::new();
        let id1 = node(&mut store, "a");
        store.destroy_node(id1);
        let id2 = node(&mut store, "b");
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
        assert_eq!(store.name(id2), "b", "slot state is reset on reuse");
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut store = NodeStore::new();
        let parent = node(&mut store, "p");
        let a = node(&mut store, "a");
        let b = node(&mut store, "b");
        let c = node(&mut store, "c");
        store.add_child(parent, a);
        store.add_child(parent, b);
        store.add_child(parent, c);

        let kids: Vec<_> = store.children(parent).collect();
        assert_eq!(kids, vec![a, b, c]);

        store.remove_from_parent(b);
        let kids: Vec<_> = store.children(parent).collect();
        assert_eq!(kids, vec![a, c]);
        assert_eq!(store.parent(b), None);
    }

    #[test]
    fn traversal_order_is_depth_first() {
        let mut store = NodeStore::new();
        let a = node(&mut store, "a");
        let b = node(&mut store, "b");
        let c = node(&mut store, "c");
        let d = node(&mut store, "d");

        // Tree: a -> [b -> [d], c]
        store.add_child(a, b);
        store.add_child(a, c);
        store.add_child(b, d);

        let mut stack = Vec::new();
        assert!(store.rebuild_traversal_order(&mut stack));
        assert_eq!(store.traversal_order(), &[a.idx, b.idx, d.idx, c.idx]);
        assert!(!store.rebuild_traversal_order(&mut stack), "cache is clean");
        assert_eq!(store.subtree(b), vec![b, d]);
    }

    #[test]
    fn roots_skip_freed_slots() {
        let mut store = NodeStore::new();
        let a = node(&mut store, "a");
        let b = node(&mut store, "b");
        let c = node(&mut store, "c");
        store.add_child(a, c);
        store.destroy_node(b);
        assert_eq!(store.roots(), vec![a]);
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut store = NodeStore::new();
        let parent = node(&mut store, "p");
        let child = node(&mut store, "c");
        store.add_child(parent, child);
        store.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_get() {
        let mut store = NodeStore::new();
        let id = node(&mut store, "a");
        store.destroy_node(id);
        let _ = store.translation(id);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_add_child() {
        let mut store = NodeStore::new();
        let root = node(&mut store, "root");
        let id = node(&mut store, "a");
        store.destroy_node(id);
        store.add_child(root, id);
    }

    #[test]
    fn visibility_marks_subtree() {
        let mut store = NodeStore::new();
        let parent = node(&mut store, "p");
        let child = node(&mut store, "c");
        store.add_child(parent, child);

        assert!(store.set_visible(parent, false, 0, 100));
        assert!(!store.set_visible(parent, false, 10, 100), "no-op flip");
        let marked: Vec<u32> = store
            .dirty
            .drain(dirty::VISIBILITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        assert!(marked.contains(&parent.idx));
        assert!(marked.contains(&child.idx));
    }
}
