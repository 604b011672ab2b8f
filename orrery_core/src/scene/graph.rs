// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph construction and mutation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::arena::FrameArena;
use super::update::{SceneEvent, SortNote};
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::index::{IndexEntry, NameIndex, StarHandle};
use crate::node::{ComponentTypes, NodeDesc, NodeId, NodeKind, NodeStore, ROOT_ID};
use crate::orbit::OrbitSamples;
use crate::particles::{ParticleFilter, RecordView, SortOutput};
use crate::predict::{ChainLink, NodeSnapshot};
use crate::render_list::RenderLists;
use crate::resolver::ResolveOutcome;
use crate::tasks::{Executor, FrameTasks, RayonExecutor, TaskSender};
use crate::time::FrameTime;
use crate::trace::SortEventKind;

/// Canonical name of the root node.
pub const ROOT_NAME: &str = "Universe";

/// The scene: a node tree plus its name and star indices.
///
/// All mutation happens on the frame thread through `&mut self`. Background
/// jobs talk back through the [`TaskSender`] returned by
/// [`task_sender`](Self::task_sender).
pub struct SceneGraph {
    pub(super) store: NodeStore,
    pub(super) root: NodeId,
    pub(super) index: NameIndex,
    pub(super) config: SceneConfig,
    pub(super) tasks: FrameTasks,
    pub(super) executor: Arc<dyn Executor>,
    pub(super) lists: RenderLists,
    pub(super) arena: FrameArena,
    pub(super) enabled: ComponentTypes,
    pub(super) focus: Option<NodeId>,
    pub(super) time: Option<FrameTime>,
    pub(super) frame_index: u64,
    pub(super) pending_events: Vec<SceneEvent>,
    pub(super) sort_notes: Vec<SortNote>,
    pub(super) has_octree: bool,
    pub(super) has_star_group: bool,
    pub(super) clock: Instant,
}

impl core::fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneGraph")
            .field("nodes", &self.store.node_count())
            .field("names", &self.index.len())
            .field("stars", &self.index.star_count())
            .field("enabled", &self.enabled)
            .field("focus", &self.focus)
            .field("frame_index", &self.frame_index)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl SceneGraph {
    /// Creates a graph holding only the root, backed by the rayon pool.
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        let mut store = NodeStore::new();
        let root = store.create_node(NodeDesc::new(ROOT_NAME).with_id(ROOT_ID));
        let index = NameIndex::new();
        index.insert(
            ROOT_NAME,
            IndexEntry {
                node: root,
                particle: None,
                focusable: false,
            },
        );
        Self {
            store,
            root,
            index,
            config,
            tasks: FrameTasks::new(),
            executor: Arc::new(RayonExecutor),
            lists: RenderLists::new(),
            arena: FrameArena::default(),
            enabled: ComponentTypes::ALL,
            focus: None,
            time: None,
            frame_index: 0,
            pending_events: Vec::new(),
            sort_notes: Vec::new(),
            has_octree: false,
            has_star_group: false,
            clock: Instant::now(),
        }
    }

    /// Replaces the executor background jobs run on.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    // -- Construction --

    /// Loads a batch of nodes.
    ///
    /// Every node is indexed first (names, positive numeric ids, members of
    /// octree wrappers, and catalog stars) so that parents may appear in any
    /// order. Then every declared parent is resolved; if one is missing or
    /// the batch contains a parent cycle, nothing is inserted and the error
    /// is returned. Finally the nodes are attached and their positions
    /// resolved at `time`.
    pub fn initialize(
        &mut self,
        nodes: Vec<NodeDesc>,
        time: &FrameTime,
        has_octree: bool,
        has_star_group: bool,
    ) -> Result<(), SceneError> {
        info!(nodes = nodes.len(), has_octree, has_star_group, "inserting nodes");
        self.has_octree = has_octree;
        self.has_star_group = has_star_group;

        let mut created: Vec<(NodeId, Option<String>)> = Vec::with_capacity(nodes.len());
        let mut members: Vec<(NodeId, NodeId)> = Vec::new();
        for mut desc in nodes {
            let parent = desc.parent.take();
            let wrapped = core::mem::take(&mut desc.wrapped);
            let id = self.store.create_node(desc);
            self.index_node(id);
            for member in wrapped {
                let m = self.store.create_node(member);
                self.index_node(m);
                members.push((m, id));
            }
            created.push((id, parent));
        }

        let resolved = created
            .iter()
            .map(|(id, parent)| self.resolve_parent(*id, parent.as_deref()))
            .collect::<Result<Vec<_>, _>>()
            .and_then(|parents| {
                self.check_cycles(created.iter().map(|(id, _)| *id).zip(parents.iter().copied()))?;
                Ok(parents)
            });
        let parents = match resolved {
            Ok(parents) => parents,
            Err(err) => {
                let all = created.iter().map(|(id, _)| *id).chain(members.iter().map(|(m, _)| *m));
                for id in all.collect::<Vec<_>>() {
                    self.index.remove_node(id);
                    self.store.destroy_node(id);
                }
                return Err(err);
            }
        };

        for (&(id, _), parent) in created.iter().zip(parents) {
            self.store.add_child(parent, id);
        }
        for &(member, wrapper) in &members {
            self.store.add_child(wrapper, member);
        }

        let new = created.iter().map(|(id, _)| *id).chain(members.iter().map(|(m, _)| *m));
        for id in new.collect::<Vec<_>>() {
            self.resolve_now(id, time);
            self.announce(id);
        }
        self.time = Some(*time);

        info!(
            children = self.store.children(self.root).count(),
            names = self.index.len(),
            stars = self.index.star_count(),
            "scene graph initialized"
        );
        Ok(())
    }

    /// Inserts one node under its declared parent (the root if none).
    ///
    /// Octree members in `desc.wrapped` are inserted as its children. With
    /// `add_to_index` the new nodes' names and catalog stars are indexed.
    pub fn insert(&mut self, mut desc: NodeDesc, add_to_index: bool) -> Result<NodeId, SceneError> {
        let parent = match desc.parent.take() {
            None => self.root,
            Some(name) => self.lookup_parent(&name).ok_or_else(|| SceneError::ParentNotFound {
                node: desc.name().to_owned(),
                parent: name,
            })?,
        };
        let wrapped = core::mem::take(&mut desc.wrapped);
        let id = self.store.create_node(desc);
        self.store.add_child(parent, id);
        let mut new = vec![id];
        for member in wrapped {
            let m = self.store.create_node(member);
            self.store.add_child(id, m);
            new.push(m);
        }
        for n in new {
            if add_to_index {
                self.index_node(n);
            }
            if let Some(time) = self.time {
                self.resolve_now(n, &time);
            }
            self.announce(n);
        }
        Ok(id)
    }

    /// Removes a node and its whole subtree.
    ///
    /// Catalog stars of removed nodes always leave the star index; names
    /// leave the name index only with `remove_from_index`. Clears the focus
    /// if it was inside the subtree.
    pub fn remove(&mut self, id: NodeId, remove_from_index: bool) -> Result<(), SceneError> {
        if id == self.root {
            return Err(SceneError::RootRemoval);
        }
        self.check_alive(id)?;
        let subtree = self.store.subtree(id);
        self.store.remove_from_parent(id);
        // Reverse pre-order visits children before their parent.
        for &node in subtree.iter().rev() {
            if remove_from_index {
                self.index.remove_node(node);
            } else {
                self.index.remove_stars_of(node);
            }
            if self.focus == Some(node) {
                self.focus = None;
                self.pending_events.push(SceneEvent::FocusCleared(node));
            }
            if let NodeKind::ParticleSet(_) = self.store.destroy_node(node) {
                self.pending_events.push(SceneEvent::GpuMeshDisposed(node));
            }
        }
        debug!(removed = subtree.len(), "subtree removed");
        Ok(())
    }

    /// Removes a particle set and drops any sort still in flight for it.
    pub fn dispose_particle_set(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.check_alive(id)?;
        if self.store.kind(id).as_particle_set().is_none() {
            return Err(SceneError::NotAParticleSet(id));
        }
        self.remove(id, true)
    }

    // -- Mutation --

    /// Shows or hides a node, fading over the configured duration. Returns
    /// whether the flag changed.
    pub fn set_visible(&mut self, id: NodeId, visible: bool, now_ms: u64) -> Result<bool, SceneError> {
        self.check_alive(id)?;
        Ok(self.store.set_visible(id, visible, now_ms, self.config.fade_ms))
    }

    /// Forces a node's label on or off.
    pub fn set_force_label(&mut self, id: NodeId, force: bool) -> Result<(), SceneError> {
        self.check_alive(id)?;
        self.store.set_force_label(id, force);
        Ok(())
    }

    /// Turns a category on or off globally.
    pub fn set_component_enabled(&mut self, components: ComponentTypes, on: bool) {
        self.enabled.set(components, on);
    }

    /// Categories currently enabled.
    #[must_use]
    pub fn enabled_components(&self) -> ComponentTypes {
        self.enabled
    }

    /// Shows or hides one record of a particle set. A change invalidates the
    /// set's GPU geometry.
    pub fn set_particle_visible(
        &mut self,
        id: NodeId,
        index: u32,
        visible: bool,
    ) -> Result<bool, SceneError> {
        self.check_alive(id)?;
        let set = self
            .store
            .kind_mut(id)
            .as_particle_set_mut()
            .ok_or(SceneError::NotAParticleSet(id))?;
        let changed = set.set_visible(index, visible)?;
        if changed {
            self.pending_events.push(SceneEvent::GpuMeshDisposed(id));
        }
        Ok(changed)
    }

    /// Replaces the record filter of a particle set.
    pub fn set_particle_filter(
        &mut self,
        id: NodeId,
        filter: Option<ParticleFilter>,
    ) -> Result<(), SceneError> {
        self.check_alive(id)?;
        self.store
            .kind_mut(id)
            .as_particle_set_mut()
            .ok_or(SceneError::NotAParticleSet(id))?
            .set_filter(filter);
        self.pending_events.push(SceneEvent::GpuMeshDisposed(id));
        Ok(())
    }

    // -- Focus --

    /// Returns whether `id` can become the camera focus: it is alive, of a
    /// focusable kind, and its coordinates are valid.
    #[must_use]
    pub fn can_focus(&self, id: NodeId) -> bool {
        self.store.is_alive(id) && self.store.kind(id).is_focusable() && !self.store.is_overflow(id)
    }

    /// Sets or clears the focus.
    pub fn set_focus(&mut self, focus: Option<NodeId>) -> Result<(), SceneError> {
        if let Some(id) = focus {
            self.check_alive(id)?;
            if !self.can_focus(id) {
                return Err(SceneError::NotFocusable(id));
            }
        }
        self.release_record_focus();
        self.focus = focus;
        Ok(())
    }

    /// Focuses one record of a particle set. The set becomes the focus node.
    pub fn set_focus_particle(&mut self, id: NodeId, index: u32) -> Result<(), SceneError> {
        self.check_alive(id)?;
        let len = self
            .store
            .kind(id)
            .as_particle_set()
            .ok_or(SceneError::NotAParticleSet(id))?
            .len();
        if index as usize >= len {
            return Err(SceneError::ParticleOutOfRange { index, len });
        }
        if !self.can_focus(id) {
            return Err(SceneError::NotFocusable(id));
        }
        if self.focus != Some(id) {
            self.release_record_focus();
        }
        self.store
            .kind_mut(id)
            .as_particle_set_mut()
            .ok_or(SceneError::NotAParticleSet(id))?
            .set_focus_index(index)?;
        self.focus = Some(id);
        Ok(())
    }

    /// Focuses whatever `name` resolves to: a node, or a named record of a
    /// particle set.
    pub fn focus_by_name(&mut self, name: &str) -> Result<NodeId, SceneError> {
        let entry = self
            .index
            .get(name)
            .filter(|e| self.store.is_alive(e.node))
            .ok_or_else(|| SceneError::NameNotFound(name.to_owned()))?;
        match entry.particle {
            Some(index) => self.set_focus_particle(entry.node, index)?,
            None => self.set_focus(Some(entry.node))?,
        }
        Ok(entry.node)
    }

    /// The current focus.
    #[must_use]
    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    /// View of the focused particle set record as of the last update.
    #[must_use]
    pub fn focus_record(&self) -> Option<RecordView> {
        let id = self.focus?;
        self.store.kind(id).as_particle_set()?.focus()
    }

    /// Drops the record focus of the currently focused set.
    pub(super) fn release_record_focus(&mut self) {
        if let Some(id) = self.focus.filter(|&f| self.store.is_alive(f)) {
            if let Some(set) = self.store.kind_mut(id).as_particle_set_mut() {
                set.clear_focus();
            }
        }
    }

    // -- Accessors --

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node storage.
    #[must_use]
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Node storage, mutably.
    ///
    /// Topology changes made through the store bypass the indices; use
    /// [`insert`](Self::insert) and [`remove`](Self::remove) for those.
    #[must_use]
    pub fn store_mut(&mut self) -> &mut NodeStore {
        &mut self.store
    }

    /// The shared name and star index.
    #[must_use]
    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    /// Scene parameters.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Render lists of the last update.
    #[must_use]
    pub fn render_lists(&self) -> &RenderLists {
        &self.lists
    }

    /// A handle background work can post frame tasks through.
    #[must_use]
    pub fn task_sender(&self) -> TaskSender {
        self.tasks.sender()
    }

    /// Number of updates run so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Time of the last update, or of initialization.
    #[must_use]
    pub fn time(&self) -> Option<FrameTime> {
        self.time
    }

    /// Whether the loaded data contains an octree.
    #[must_use]
    pub fn has_octree(&self) -> bool {
        self.has_octree
    }

    /// Whether the loaded data contains a star group.
    #[must_use]
    pub fn has_star_group(&self) -> bool {
        self.has_star_group
    }

    /// Captures what [`predict`](crate::predict::predict) needs to position
    /// `id` at other times.
    pub fn snapshot(&self, id: NodeId) -> Result<NodeSnapshot, SceneError> {
        self.check_alive(id)?;
        let mut chain = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            chain.push(ChainLink {
                pos: self.store.pos(n),
                resolver: self.store.resolver(n).cloned(),
            });
            cur = self.store.parent(n);
        }
        chain.reverse();
        Ok(NodeSnapshot::new(id, self.store.size(id), chain))
    }

    // -- Background completions --

    /// Swaps in a finished sort, unless the set is gone.
    pub(crate) fn apply_sort(&mut self, id: NodeId, output: SortOutput) {
        let now = self.time.map_or(0, |t| t.wall_ms);
        let applied = self.store.is_alive(id)
            && match self.store.kind_mut(id).as_particle_set_mut() {
                Some(set) => {
                    set.complete_sort(output, now);
                    self.sort_notes.push(SortNote {
                        node: id.idx,
                        kind: SortEventKind::Applied,
                        elements: set.len(),
                    });
                    true
                }
                None => false,
            };
        if !applied {
            debug!(node = ?id, "discarding sort result for a disposed set");
            self.sort_notes.push(SortNote {
                node: id.idx,
                kind: SortEventKind::Discarded,
                elements: 0,
            });
        }
    }

    /// Installs refreshed orbit samples, unless the orbit is gone.
    pub(crate) fn apply_orbit(&mut self, id: NodeId, samples: OrbitSamples) {
        if !self.store.is_alive(id) {
            debug!(node = ?id, "discarding orbit samples for a removed node");
            return;
        }
        if let Some(orbit) = self.store.kind_mut(id).as_orbit_mut() {
            orbit.complete(samples);
        }
    }

    // -- Internal helpers --

    pub(super) fn check_alive(&self, id: NodeId) -> Result<(), SceneError> {
        if self.store.is_alive(id) {
            Ok(())
        } else {
            Err(SceneError::StaleNode(id))
        }
    }

    fn lookup_parent(&self, name: &str) -> Option<NodeId> {
        self.index
            .get(name)
            .map(|e| e.node)
            .filter(|&n| self.store.is_alive(n))
    }

    fn resolve_parent(&self, id: NodeId, parent: Option<&str>) -> Result<NodeId, SceneError> {
        let Some(name) = parent else {
            return Ok(self.root);
        };
        self.lookup_parent(name)
            .filter(|&p| p != id)
            .ok_or_else(|| SceneError::ParentNotFound {
                node: self.store.name(id).to_owned(),
                parent: name.to_owned(),
            })
    }

    /// Fails if following declared parents inside the batch loops.
    fn check_cycles(
        &self,
        edges: impl Iterator<Item = (NodeId, NodeId)>,
    ) -> Result<(), SceneError> {
        let parent_of: HashMap<NodeId, NodeId> = edges.collect();
        for &start in parent_of.keys() {
            let mut cur = start;
            let mut steps = 0;
            while let Some(&p) = parent_of.get(&cur) {
                steps += 1;
                if p == start || steps > parent_of.len() {
                    return Err(SceneError::ParentCycle {
                        node: self.store.name(start).to_owned(),
                    });
                }
                cur = p;
            }
        }
        Ok(())
    }

    /// Indexes every name, the numeric id, and the catalog stars of `id`.
    ///
    /// Mappings left behind by removed nodes are taken over.
    fn index_node(&self, id: NodeId) {
        let live = |n: NodeId| self.store.is_alive(n);
        let kind = self.store.kind(id);
        let entry = IndexEntry {
            node: id,
            particle: None,
            focusable: kind.is_focusable(),
        };
        for name in self.store.names(id) {
            self.index.insert_live(name, entry, live);
        }
        let numeric = self.store.numeric_id(id);
        if numeric > 0 {
            self.index.insert_live(&numeric.to_string(), entry, live);
        }
        match kind {
            NodeKind::Star(star) => {
                if let Some(hip) = star.hip {
                    self.index.insert_star_live(hip, StarHandle::Node(id), live);
                }
            }
            NodeKind::ParticleSet(set) => {
                for (name, index) in set.names() {
                    self.index.insert_live(
                        name,
                        IndexEntry {
                            node: id,
                            particle: Some(index),
                            focusable: true,
                        },
                        live,
                    );
                }
                for (hip, index) in set.catalog() {
                    self.index
                        .insert_star_live(hip, StarHandle::Record { set: id, index }, live);
                }
            }
            _ => {}
        }
    }

    /// Resolves a freshly added node's position.
    fn resolve_now(&mut self, id: NodeId, time: &FrameTime) {
        let i = id.idx as usize;
        let store = &mut self.store;
        if let Some(resolver) = store.resolver[i].as_mut() {
            let outcome = resolver.resolve(time, true, &mut store.pos[i]);
            store.overflow[i] = outcome == ResolveOutcome::Overflow;
        }
    }

    /// Reports a freshly added particle set.
    fn announce(&mut self, id: NodeId) {
        if let Some(set) = self.store.kind(id).as_particle_set() {
            self.pending_events.push(SceneEvent::CatalogAdded {
                node: id,
                elements: set.len(),
                size_bytes: set.size_bytes(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::coords::StaticCoordinates;
    use crate::node::{BodyParams, StarParams};
    use crate::particles::{ParticleRecord, ParticleSet, SetKind};
    use crate::predict::predict;
    use crate::resolver::PositionResolver;
    use crate::time::SimTime;

    fn frame() -> FrameTime {
        FrameTime::start(SimTime::J2000, 0)
    }

    fn body(name: &str, parent: &str) -> NodeDesc {
        NodeDesc::new(name)
            .with_parent(parent)
            .with_kind(NodeKind::Body(BodyParams::default()))
    }

    fn star(name: &str, hip: u32) -> NodeDesc {
        NodeDesc::new(name).with_kind(NodeKind::Star(StarParams {
            hip: Some(hip),
            ..StarParams::default()
        }))
    }

    /// Every live node except the root has a parent, and is reachable from
    /// the root.
    fn assert_tree(graph: &SceneGraph) {
        let reachable = graph.store.subtree(graph.root);
        assert_eq!(reachable.len(), graph.store.node_count(), "all nodes reachable");
        for &n in &reachable[1..] {
            let p = graph.store.parent(n).unwrap();
            assert!(graph.store.children(p).any(|c| c == n), "child listed by parent");
        }
    }

    #[test]
    fn initialize_accepts_any_order() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let nodes = vec![
            body("Moon", "Earth"),
            body("Earth", "Sun").with_alias("Terra").with_id(399),
            body("Sun", ROOT_NAME),
        ];
        g.initialize(nodes, &frame(), false, false).unwrap();
        assert_tree(&g);

        let earth = g.find_by_name("  terra ").unwrap();
        assert_eq!(g.find_by_name("399"), Some(earth));
        let moon = g.find_by_name("moon").unwrap();
        assert_eq!(g.store.parent(moon), Some(earth));
        assert_eq!(g.store.children(g.root).count(), 1);
    }

    #[test]
    fn missing_parent_inserts_nothing() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let nodes = vec![body("Earth", ROOT_NAME), body("Moon", "Erth")];
        let err = g.initialize(nodes, &frame(), false, false).unwrap_err();
        assert!(
            matches!(&err, SceneError::ParentNotFound { node, parent } if node == "Moon" && parent == "Erth"),
            "unexpected error {err}"
        );
        assert_eq!(g.store.node_count(), 1);
        assert!(g.find_by_name("Earth").is_none());
        assert_tree(&g);
    }

    #[test]
    fn parent_cycles_are_rejected() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let nodes = vec![body("A", "B"), body("B", "A")];
        let err = g.initialize(nodes, &frame(), false, false).unwrap_err();
        assert!(matches!(err, SceneError::ParentCycle { .. }));
        assert_eq!(g.store.node_count(), 1);
    }

    #[test]
    fn octree_members_are_indexed_and_attached() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let wrapper = NodeDesc::new("Octree")
            .with_kind(NodeKind::OctreeWrapper)
            .with_wrapped(star("Vega", 91262))
            .with_wrapped(star("Deneb", 102098));
        g.initialize(vec![wrapper], &frame(), true, false).unwrap();
        assert!(g.has_octree());
        let octree = g.find_by_name("octree").unwrap();
        let vega = g.find_by_name("vega").unwrap();
        assert_eq!(g.store.parent(vega), Some(octree));
        assert_eq!(g.index.star(91262), Some(StarHandle::Node(vega)));
        assert_tree(&g);
    }

    #[test]
    fn remove_cleans_both_indices() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let mut nodes = vec![body("Sun", ROOT_NAME)];
        nodes.push(star("Sirius", 32349).with_parent("Sun"));
        g.initialize(nodes, &frame(), false, false).unwrap();
        let names_before = g.index.len();
        let sun = g.find_by_name("sun").unwrap();
        let sirius = g.find_by_name("sirius").unwrap();
        g.set_focus(Some(sirius)).unwrap();

        g.remove(sun, true).unwrap();
        assert!(!g.store.is_alive(sirius));
        assert_eq!(g.index.len(), names_before - 2);
        assert_eq!(g.index.star_count(), 0);
        assert_eq!(g.focus(), None);
        assert_eq!(g.pending_events, [SceneEvent::FocusCleared(sirius)]);
        assert_tree(&g);

        assert!(matches!(g.remove(sun, true), Err(SceneError::StaleNode(_))));
        assert!(matches!(g.remove(g.root, true), Err(SceneError::RootRemoval)));
    }

    #[test]
    fn remove_without_index_keeps_names_but_not_stars() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let id = g.insert(star("Altair", 97649), true).unwrap();
        g.remove(id, false).unwrap();
        assert!(g.index.contains("altair"));
        assert_eq!(g.find_by_name("altair"), None, "dead targets are not returned");
        assert_eq!(g.index.star(97649), None);
    }

    #[test]
    fn insert_resolves_parent_and_position() {
        let mut g = SceneGraph::new(SceneConfig::default());
        g.initialize(vec![body("Sun", ROOT_NAME)], &frame(), false, false)
            .unwrap();
        let desc = body("Earth", "sun").with_resolver(PositionResolver::from_provider(
            StaticCoordinates::new(DVec3::X),
        ));
        let earth = g.insert(desc, true).unwrap();
        assert_eq!(g.store.pos(earth), DVec3::X);
        assert!(g.index.contains("earth"));

        let err = g.insert(body("Mars", "Nowhere"), true).unwrap_err();
        assert!(matches!(err, SceneError::ParentNotFound { .. }));
    }

    #[test]
    fn particle_sets_are_announced_and_indexed() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let records = vec![
            ParticleRecord::new(DVec3::X, 1.0).with_hip(11767),
            ParticleRecord::new(DVec3::Y, 1.0),
        ];
        let set = ParticleSet::new(SetKind::Stars, records).with_name("Polaris", 0);
        let id = g
            .insert(
                NodeDesc::new("Hipparcos").with_kind(NodeKind::ParticleSet(Box::new(set))),
                true,
            )
            .unwrap();
        assert_eq!(g.index.star(11767), Some(StarHandle::Record { set: id, index: 0 }));
        let entry = g.index.get("polaris").unwrap();
        assert_eq!(entry.particle, Some(0));
        assert!(matches!(
            g.pending_events[..],
            [SceneEvent::CatalogAdded { elements: 2, .. }]
        ));

        g.pending_events.clear();
        assert!(g.set_particle_visible(id, 1, false).unwrap());
        assert!(!g.set_particle_visible(id, 1, false).unwrap());
        assert_eq!(g.pending_events, [SceneEvent::GpuMeshDisposed(id)]);
        assert!(matches!(
            g.set_particle_visible(id, 7, false),
            Err(SceneError::ParticleOutOfRange { index: 7, len: 2 })
        ));
        assert!(matches!(
            g.set_particle_visible(g.root, 0, false),
            Err(SceneError::NotAParticleSet(_))
        ));
    }

    #[test]
    fn focus_requires_a_focusable_node() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let group = g.insert(NodeDesc::new("Group"), true).unwrap();
        let planet = g.insert(body("Planet", "Group"), true).unwrap();
        assert!(matches!(g.set_focus(Some(group)), Err(SceneError::NotFocusable(_))));
        g.set_focus(Some(planet)).unwrap();
        assert_eq!(g.focus(), Some(planet));
        g.set_focus(None).unwrap();
        assert_eq!(g.focus(), None);
    }

    #[test]
    fn snapshots_predict_without_the_graph() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let sun = g
            .insert(body("Sun", ROOT_NAME).with_pos(DVec3::new(10.0, 0.0, 0.0)), true)
            .unwrap();
        let earth = g
            .insert(
                body("Earth", "Sun").with_resolver(PositionResolver::from_provider(
                    StaticCoordinates::new(DVec3::Y),
                )),
                true,
            )
            .unwrap();
        let snap = g.snapshot(earth).unwrap();
        g.remove(sun, true).unwrap();
        assert_eq!(snap.chain().len(), 3);
        assert_eq!(predict(&snap, SimTime::J2000), DVec3::new(10.0, 1.0, 0.0));
    }
}
