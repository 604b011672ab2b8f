// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame update.
//!
//! One call to [`SceneGraph::update`] runs these phases:
//!
//! 1. **Tasks**: run frame tasks posted by finished background jobs
//!    (sort swaps, orbit samples).
//! 2. **Traverse**: rebuild the traversal order if the topology changed, then
//!    visit every node parent-first. Each visit resolves the position,
//!    accumulates the camera-relative translation, computes distance, view
//!    angles, and faded opacity, and classifies the node into render groups.
//! 3. **Sort**: start background sorts for particle sets that are due and
//!    refreshes for orbits whose sample window ran out.
//! 4. **Finalize**: resolve constellation lines through the star index,
//!    drain the dirty channels, and report everything in [`FrameChanges`].

use core::f64::consts::FRAC_PI_2;

use glam::DVec3;
use tracing::{debug, trace};

use super::graph::SceneGraph;
use crate::camera::Camera;
use crate::dirty;
use crate::index::StarHandle;
use crate::lod::{LabelParams, LodBand, LodThresholds, classify, label_visible};
use crate::node::{ComponentTypes, INVALID, NodeId, NodeKind};
use crate::particles::SortParams;
use crate::render_list::{RenderGroup, RenderLists};
use crate::resolver::{PositionResolver, ResolveOutcome};
use crate::time::FrameTime;
use crate::trace::{
    FrameBeginEvent, FrameSummaryBuilder, PhaseBeginEvent, PhaseEndEvent, PhaseKind, SortEvent,
    SortEventKind, Tracer,
};

/// Notification for collaborators outside the scene graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    /// A particle set was added.
    CatalogAdded {
        /// The set node.
        node: NodeId,
        /// Number of records.
        elements: usize,
        /// Approximate memory held by the set.
        size_bytes: usize,
    },
    /// The GPU geometry of a particle set is out of date or gone.
    GpuMeshDisposed(NodeId),
    /// The focus was cleared because its node went away or lost its
    /// coordinates.
    FocusCleared(NodeId),
}

/// Changes produced by one update.
///
/// Node lists hold raw slot indices, like [`RenderLists`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameChanges {
    /// Nodes created since the last update.
    pub added: Vec<u32>,
    /// Slots freed since the last update.
    pub removed: Vec<u32>,
    /// Nodes whose own or inherited visibility flag flipped.
    pub visibility: Vec<u32>,
    /// Nodes whose coordinate provider started overflowing.
    pub overflowed: Vec<u32>,
    /// Nodes whose coordinates became valid again.
    pub recovered: Vec<u32>,
    /// Notifications, in the order they happened.
    pub events: Vec<SceneEvent>,
    /// Whether the traversal order was rebuilt.
    pub topology_changed: bool,
    /// Nodes visited by the traversal.
    pub nodes_visited: usize,
    /// Frame tasks run.
    pub tasks_run: usize,
    /// Background sorts started.
    pub sorts_scheduled: usize,
    /// Finished sorts swapped in.
    pub sorts_applied: usize,
    /// Finished sorts dropped because their set was disposed.
    pub sorts_discarded: usize,
    /// Orbit refreshes started.
    pub orbit_refreshes: usize,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.added.clear();
        self.removed.clear();
        self.visibility.clear();
        self.overflowed.clear();
        self.recovered.clear();
        self.events.clear();
        self.topology_changed = false;
        self.nodes_visited = 0;
        self.tasks_run = 0;
        self.sorts_scheduled = 0;
        self.sorts_applied = 0;
        self.sorts_discarded = 0;
        self.orbit_refreshes = 0;
    }
}

/// A sort lifecycle step recorded by a frame task.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SortNote {
    pub(crate) node: u32,
    pub(crate) kind: SortEventKind,
    pub(crate) elements: usize,
}

/// Per-frame values shared by every node visit.
#[derive(Clone, Copy, Debug)]
struct FrameContext {
    time: FrameTime,
    fade_ms: u64,
    fov: f64,
    origin: DVec3,
    focus: Option<u32>,
    enabled: ComponentTypes,
    labels_on: bool,
    proper_motions_on: bool,
    label_density: f64,
    body_thresholds: LodThresholds,
    star_thresholds: LodThresholds,
    body_label: LabelParams,
    star_label: LabelParams,
}

impl SceneGraph {
    /// Runs one frame and returns what changed.
    pub fn update(&mut self, time: &FrameTime, camera: &dyn Camera) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.update_into(time, camera, &mut changes, &mut Tracer::none());
        changes
    }

    /// Like [`update`](Self::update), but reuses `changes` and reports to
    /// `tracer`.
    pub fn update_into(
        &mut self,
        time: &FrameTime,
        camera: &dyn Camera,
        changes: &mut FrameChanges,
        tracer: &mut Tracer<'_>,
    ) {
        changes.clear();
        self.frame_index += 1;
        let frame_index = self.frame_index;
        let begin = FrameBeginEvent {
            frame_index,
            wall_ms: time.wall_ms,
            sim: time.sim,
            sim_changed: time.sim_changed(),
        };
        tracer.frame_begin(&begin);
        let mut summary = FrameSummaryBuilder::new(&begin);
        self.time = Some(*time);
        self.lists.clear();
        self.arena.reset();

        // Tasks.
        self.phase_begin(tracer, &mut summary, PhaseKind::Tasks);
        let tasks = self.tasks.take();
        changes.tasks_run = tasks.len();
        for task in tasks {
            task(self);
        }
        for note in self.sort_notes.drain(..) {
            match note.kind {
                SortEventKind::Applied => changes.sorts_applied += 1,
                SortEventKind::Discarded => changes.sorts_discarded += 1,
                SortEventKind::Scheduled => {}
            }
            tracer.sort(&SortEvent {
                frame_index,
                node: note.node,
                kind: note.kind,
                elements: note.elements,
            });
        }
        self.phase_end(tracer, &mut summary, PhaseKind::Tasks);

        // Traverse.
        self.phase_begin(tracer, &mut summary, PhaseKind::Traverse);
        let mut stack = core::mem::take(&mut self.arena.stack);
        changes.topology_changed = self.store.rebuild_traversal_order(&mut stack);
        self.arena.stack = stack;
        let cx = self.frame_context(time, camera);
        let order = core::mem::take(&mut self.store.traversal_order);
        for &idx in &order {
            self.visit(idx, &cx, camera);
        }
        changes.nodes_visited = order.len();
        self.store.traversal_order = order;
        self.phase_end(tracer, &mut summary, PhaseKind::Traverse);

        // Sort.
        self.phase_begin(tracer, &mut summary, PhaseKind::Sort);
        self.schedule_sorts(time, camera, changes, tracer);
        self.refresh_orbits(time, changes);
        self.phase_end(tracer, &mut summary, PhaseKind::Sort);

        // Finalize.
        self.phase_begin(tracer, &mut summary, PhaseKind::Finalize);
        self.resolve_constellations();
        let store = &mut self.store;
        let visibility: Vec<u32> = store
            .dirty
            .drain(dirty::VISIBILITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        changes.visibility = visibility
            .into_iter()
            .filter(|&idx| store.id_at(idx).is_some())
            .collect();
        for _ in store.dirty.drain(dirty::TOPOLOGY).deterministic().run() {}
        core::mem::swap(&mut store.pending_added, &mut changes.added);
        core::mem::swap(&mut store.pending_removed, &mut changes.removed);

        for &(idx, overflowed) in &self.arena.overflow_flips {
            debug!(node = idx, overflowed, "coordinate overflow state changed");
            if overflowed {
                changes.overflowed.push(idx);
            } else {
                changes.recovered.push(idx);
            }
        }
        if let Some(focus) = self.focus {
            if self.store.is_overflow(focus) {
                self.release_record_focus();
                self.focus = None;
                self.pending_events.push(SceneEvent::FocusCleared(focus));
            }
        }
        changes.events.append(&mut self.pending_events);

        #[cfg(feature = "trace-rich")]
        {
            use crate::trace::{OverflowChange, RenderCounts};
            tracer.render_counts(frame_index, &RenderCounts::from(&self.lists));
            if !self.arena.overflow_flips.is_empty() {
                let flips: Vec<OverflowChange> = self
                    .arena
                    .overflow_flips
                    .iter()
                    .map(|&(node, overflowed)| OverflowChange { node, overflowed })
                    .collect();
                tracer.overflow_changes(frame_index, &flips);
            }
        }
        self.phase_end(tracer, &mut summary, PhaseKind::Finalize);

        summary.set_counts(changes.nodes_visited, changes.tasks_run);
        tracer.frame_summary(&summary.finish());
    }

    fn frame_context(&self, time: &FrameTime, camera: &dyn Camera) -> FrameContext {
        let focus = self
            .focus
            .or_else(|| camera.focus())
            .filter(|&f| self.can_focus(f))
            .map(|f| f.idx);
        FrameContext {
            time: *time,
            fade_ms: self.config.fade_ms,
            fov: camera.fov_factor(),
            origin: camera.inverse_position(),
            focus,
            enabled: self.enabled,
            labels_on: self.enabled.contains(ComponentTypes::LABELS),
            proper_motions_on: self.enabled.contains(ComponentTypes::PROPER_MOTIONS),
            label_density: self.config.label_density,
            body_thresholds: self.config.body_thresholds,
            star_thresholds: self.config.star_thresholds,
            body_label: self.config.body_label,
            star_label: self.config.star_label,
        }
    }

    /// Updates one node. Its parent has already been visited this frame.
    fn visit(&mut self, idx: u32, cx: &FrameContext, camera: &dyn Camera) {
        let i = idx as usize;
        let store = &mut self.store;
        let parent = store.parent[i];
        let (base, inherited) = if parent == INVALID {
            (cx.origin, 1.0)
        } else {
            let p = parent as usize;
            (store.translation[p], store.opacity[p])
        };

        let on = cx.enabled.enables(store.components[i]);
        if on {
            if let Some(resolver) = store.resolver[i].as_mut() {
                let was = store.overflow[i];
                let now = match resolver.resolve(&cx.time, false, &mut store.pos[i]) {
                    ResolveOutcome::Skipped => was,
                    ResolveOutcome::Updated => false,
                    ResolveOutcome::Overflow => true,
                };
                if now != was {
                    store.overflow[i] = now;
                    self.arena.overflow_flips.push((idx, now));
                }
            }
        }

        let translation = base + store.pos[i];
        let dist = translation.length();
        let view_angle = if dist > 0.0 {
            (store.size[i] / dist).atan()
        } else {
            FRAC_PI_2
        };
        let apparent = view_angle / cx.fov;
        let fade = store.fade[i];
        let opacity = inherited * fade.factor(cx.time.wall_ms, cx.fade_ms);
        store.translation[i] = translation;
        store.dist[i] = dist;
        store.view_angle[i] = view_angle;
        store.view_angle_apparent[i] = apparent;
        store.opacity[i] = opacity;
        if on {
            if let Some(set) = store.kind[i].as_particle_set_mut() {
                let years = cx.time.years_since(set.epoch());
                set.update_views(translation, years, cx.fov);
            }
        }

        if !on || opacity <= 0.0 || !fade.should_render(cx.time.wall_ms, cx.fade_ms) {
            return;
        }

        let lists = &mut self.lists;
        let force_label = store.force_label[i];
        match &store.kind[i] {
            NodeKind::Body(params) => {
                if camera.is_visible(view_angle, translation, dist) {
                    collect_classified(
                        lists,
                        idx,
                        opacity,
                        apparent,
                        cx,
                        &params.thresholds.unwrap_or(cx.body_thresholds),
                        &params.label.unwrap_or(cx.body_label),
                        force_label,
                    );
                }
            }
            NodeKind::Star(params) => {
                if camera.is_visible(view_angle, translation, dist) {
                    let band = collect_classified(
                        lists,
                        idx,
                        opacity,
                        apparent,
                        cx,
                        &params.thresholds.unwrap_or(cx.star_thresholds),
                        &params.label.unwrap_or(cx.star_label),
                        force_label,
                    );
                    let moving = store.resolver[i]
                        .as_ref()
                        .and_then(PositionResolver::proper_motion)
                        .is_some_and(|pm| pm.velocity != DVec3::ZERO);
                    if cx.proper_motions_on && moving && band > LodBand::None {
                        lists.push(RenderGroup::Line, idx, opacity);
                    }
                }
            }
            NodeKind::ParticleSet(_) => {
                lists.push(RenderGroup::ParticleSet, idx, opacity);
                self.arena.sets.push(idx);
            }
            NodeKind::Orbit(_) => {
                lists.push(RenderGroup::Line, idx, opacity);
                self.arena.orbits.push(idx);
            }
            NodeKind::Constellation(_) => {
                lists.push(RenderGroup::Line, idx, opacity);
                self.arena.constellations.push(idx);
            }
            NodeKind::Generic | NodeKind::OctreeWrapper => {}
        }
    }

    /// Starts background sorts for drawn sets that are due.
    fn schedule_sorts(
        &mut self,
        time: &FrameTime,
        camera: &dyn Camera,
        changes: &mut FrameChanges,
        tracer: &mut Tracer<'_>,
    ) {
        let camera_pos = camera.position();
        let fov = camera.fov_factor();
        let sets = core::mem::take(&mut self.arena.sets);
        for &idx in &sets {
            let Some(id) = self.store.id_at(idx) else {
                continue;
            };
            let i = idx as usize;
            let origin = self.store.translation[i];
            let opacity = self.store.opacity[i];
            let Some(set) = self.store.kind[i].as_particle_set_mut() else {
                continue;
            };
            if !set.should_sort(time.wall_ms, camera_pos, opacity, &self.config.sort) {
                continue;
            }
            let params = SortParams {
                origin,
                years: time.years_since(set.epoch()),
                fov,
                brightness: self.config.star_brightness,
                camera: camera_pos,
            };
            let elements = set.len();
            let Some(job) = set.begin_sort(params) else {
                continue;
            };
            debug!(node = idx, elements, "scheduling background sort");
            changes.sorts_scheduled += 1;
            tracer.sort(&SortEvent {
                frame_index: self.frame_index,
                node: idx,
                kind: SortEventKind::Scheduled,
                elements,
            });
            let sender = self.tasks.sender();
            self.executor.spawn(Box::new(move || {
                let output = job.run();
                sender.post(move |graph: &mut SceneGraph| graph.apply_sort(id, output));
            }));
        }
        self.arena.sets = sets;
    }

    /// Starts refreshes for drawn orbits whose window no longer covers the
    /// current time.
    fn refresh_orbits(&mut self, time: &FrameTime, changes: &mut FrameChanges) {
        let orbits = core::mem::take(&mut self.arena.orbits);
        for &idx in &orbits {
            let Some(id) = self.store.id_at(idx) else {
                continue;
            };
            let Some(orbit) = self.store.kind[idx as usize].as_orbit_mut() else {
                continue;
            };
            if !orbit.needs_refresh(time.sim) {
                continue;
            }
            let Some(job) = orbit.begin_refresh(time.sim) else {
                continue;
            };
            changes.orbit_refreshes += 1;
            let sender = self.tasks.sender();
            self.executor.spawn(Box::new(move || {
                let samples = job.run();
                sender.post(move |graph: &mut SceneGraph| graph.apply_orbit(id, samples));
            }));
        }
        self.arena.orbits = orbits;
    }

    /// Rebuilds the segments of every drawn constellation from this frame's
    /// star translations.
    fn resolve_constellations(&mut self) {
        let constellations = core::mem::take(&mut self.arena.constellations);
        for &idx in &constellations {
            let i = idx as usize;
            let mut kind = core::mem::take(&mut self.store.kind[i]);
            if let NodeKind::Constellation(figure) = &mut kind {
                let missing = figure.resolve(|hip| self.star_translation(hip));
                if missing > 0 {
                    trace!(node = idx, missing, "constellation lines with unknown stars");
                }
            }
            self.store.kind[i] = kind;
        }
        self.arena.constellations = constellations;
    }

    /// Camera-relative position of a catalog star this frame.
    fn star_translation(&self, hip: u32) -> Option<DVec3> {
        match self.index.star(hip)? {
            StarHandle::Node(node) => self
                .store
                .is_alive(node)
                .then(|| self.store.translation(node)),
            StarHandle::Record { set, index } => {
                if !self.store.is_alive(set) {
                    return None;
                }
                let records = self.store.kind(set).as_particle_set()?;
                let offset = records.position_of(index, self.set_years(records))?;
                Some(self.store.translation(set) + offset)
            }
        }
    }

    fn now_us(&self) -> u64 {
        u64::try_from(self.clock.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    fn phase_begin(
        &self,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
        phase: PhaseKind,
    ) {
        let timestamp_us = self.now_us();
        summary.phase_begin(phase, timestamp_us);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase,
            timestamp_us,
        });
    }

    fn phase_end(&self, tracer: &mut Tracer<'_>, summary: &mut FrameSummaryBuilder, phase: PhaseKind) {
        let timestamp_us = self.now_us();
        summary.phase_end(phase, timestamp_us);
        tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase,
            timestamp_us,
        });
    }
}

/// Classifies a body or star and pushes its groups and label. Returns the
/// chosen band.
fn collect_classified(
    lists: &mut RenderLists,
    idx: u32,
    opacity: f64,
    apparent: f64,
    cx: &FrameContext,
    thresholds: &LodThresholds,
    label: &LabelParams,
    force_label: bool,
) -> LodBand {
    let c = classify(apparent, cx.fov, thresholds);
    for (group, factor) in c.groups() {
        lists.push(group, idx, opacity * factor);
    }
    let force = force_label || cx.focus == Some(idx);
    if label_visible(apparent, cx.fov, label, cx.label_density, cx.labels_on, force) {
        lists.push(RenderGroup::Label, idx, opacity);
    }
    c.band
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::camera::FixedCamera;
    use crate::config::{SceneConfig, SortConfig};
    use crate::constellation::Constellation;
    use crate::coords::{CoordinateProvider, KeplerianElements, StaticCoordinates};
    use crate::error::{SceneError, TimeOverflow};
    use crate::node::{BodyParams, NodeDesc, StarParams};
    use crate::orbit::OrbitState;
    use crate::particles::{ParticleRecord, ParticleSet, SetKind};
    use crate::resolver::ProperMotion;
    use crate::tasks::{InlineExecutor, ManualExecutor};
    use crate::time::SimTime;
    use crate::units::AU_TO_KM;

    const EARTH_DIAMETER_KM: f64 = 12_742.0;

    fn body(name: &str) -> NodeDesc {
        NodeDesc::new(name).with_kind(NodeKind::Body(BodyParams::default()))
    }

    fn fixed(pos: DVec3) -> PositionResolver {
        PositionResolver::from_provider(StaticCoordinates::new(pos))
    }

    fn start() -> FrameTime {
        FrameTime::start(SimTime::J2000, 0)
    }

    #[derive(Debug, Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl CoordinateProvider for Counting {
        fn equatorial_cartesian_at(&self, _time: SimTime) -> Result<DVec3, TimeOverflow> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(DVec3::new(0.0, 0.0, -10.0))
        }
    }

    #[test]
    fn earth_seen_from_the_sun() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let nodes = vec![
            body("Sun"),
            body("Earth")
                .with_parent("Sun")
                .with_size(EARTH_DIAMETER_KM)
                .with_resolver(fixed(DVec3::new(AU_TO_KM, 0.0, 0.0))),
        ];
        g.initialize(nodes, &start(), false, false).unwrap();
        let earth = g.find_by_name("earth").unwrap();
        let _ = g.update(&start(), &FixedCamera::new(DVec3::ZERO));

        let s = g.store();
        assert_eq!(s.translation(earth), DVec3::new(AU_TO_KM, 0.0, 0.0));
        assert!((s.dist(earth) - AU_TO_KM).abs() < 1e-3);
        let expected = (EARTH_DIAMETER_KM / AU_TO_KM).atan();
        assert!((s.view_angle(earth) - expected).abs() < 1e-15);
        assert!((s.view_angle_apparent(earth) - expected).abs() < 1e-15);
    }

    #[test]
    fn translation_is_parent_translation_plus_pos() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let nodes = vec![
            body("A").with_pos(DVec3::new(1.0, 2.0, 3.0)),
            body("B").with_parent("A").with_resolver(fixed(DVec3::X)),
            body("C").with_parent("B").with_pos(DVec3::Y),
            body("D").with_parent("A").with_pos(DVec3::Z),
        ];
        g.initialize(nodes, &start(), false, false).unwrap();
        let camera = FixedCamera::new(DVec3::new(5.0, 5.0, 5.0));
        let _ = g.update(&start(), &camera);

        let s = g.store();
        assert_eq!(s.translation(g.root()), camera.inverse_position());
        for &idx in s.traversal_order() {
            let id = s.id_at(idx).unwrap();
            if let Some(p) = s.parent(id) {
                assert_eq!(s.translation(id), s.translation(p) + s.pos(id));
            }
        }
    }

    #[test]
    fn unchanged_time_does_not_query_providers() {
        let provider = Arc::new(Counting::default());
        let mut g = SceneGraph::new(SceneConfig::default());
        let resolver = PositionResolver::new(provider.clone());
        g.insert(body("Voyager").with_resolver(resolver), true).unwrap();
        let camera = FixedCamera::new(DVec3::ZERO);

        let f0 = start();
        let _ = g.update(&f0, &camera);
        let f1 = f0.advance(f0.sim, 16);
        let _ = g.update(&f1, &camera);
        let _ = g.update(&f1.advance(f1.sim, 32), &camera);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);

        let _ = g.update(&f1.advance(f1.sim + 1.0, 48), &camera);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn fade_half_point_reaches_children() {
        let config = SceneConfig {
            fade_ms: 1000,
            ..SceneConfig::default()
        };
        let mut g = SceneGraph::new(config);
        let nodes = vec![
            body("Parent").with_pos(DVec3::new(0.0, 0.0, -10.0)).with_size(1.0),
            body("Child").with_parent("Parent").with_size(1.0),
        ];
        g.initialize(nodes, &start(), false, false).unwrap();
        let parent = g.find_by_name("parent").unwrap();
        let child = g.find_by_name("child").unwrap();
        let camera = FixedCamera::new(DVec3::ZERO);
        let _ = g.update(&start(), &camera);

        assert!(g.set_visible(parent, false, 1000).unwrap());
        let changes = g.update(&FrameTime::start(SimTime::J2000, 1500), &camera);
        assert!((g.store().opacity(parent) - 0.5).abs() < 1e-12);
        assert!((g.store().opacity(child) - 0.5).abs() < 1e-12);
        assert!(changes.visibility.contains(&parent.idx));
        assert!(changes.visibility.contains(&child.idx));
        assert!(g.render_lists().contains(RenderGroup::Model, child.idx));

        let changes = g.update(&FrameTime::start(SimTime::J2000, 2100), &camera);
        assert_eq!(g.store().opacity(child), 0.0);
        assert!(g.render_lists().is_empty());
        assert!(changes.visibility.is_empty());
    }

    #[test]
    fn disabled_components_skip_resolve_and_render() {
        let provider = Arc::new(Counting::default());
        let mut g = SceneGraph::new(SceneConfig::default());
        let desc = body("Mars")
            .with_size(1.0)
            .with_components(ComponentTypes::PLANETS)
            .with_resolver(PositionResolver::new(provider.clone()));
        let mars = g.insert(desc, true).unwrap();
        let camera = FixedCamera::new(DVec3::ZERO);

        g.set_component_enabled(ComponentTypes::PLANETS, false);
        let _ = g.update(&start(), &camera);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 0);
        assert!(g.render_lists().is_empty());

        g.set_component_enabled(ComponentTypes::PLANETS, true);
        let _ = g.update(&start(), &camera);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);
        assert!(g.render_lists().contains(RenderGroup::Model, mars.idx));
    }

    #[test]
    fn overlap_band_and_forced_labels() {
        let thresholds = LodThresholds::new(0.0, 1e-4, 1e-2, 2.0);
        let params = BodyParams {
            thresholds: Some(thresholds),
            label: None,
        };
        let mut g = SceneGraph::new(SceneConfig {
            label_density: 0.0,
            ..SceneConfig::default()
        });
        // Apparent angle 1e-2: the middle of the overlap band.
        let size = (1e-2_f64).tan() * 100.0;
        let id = g
            .insert(
                NodeDesc::new("Moon")
                    .with_kind(NodeKind::Body(params))
                    .with_pos(DVec3::new(0.0, 0.0, -100.0))
                    .with_size(size),
                true,
            )
            .unwrap();
        let camera = FixedCamera::new(DVec3::ZERO);
        let _ = g.update(&start(), &camera);
        let lists = g.render_lists();
        assert_eq!(lists.groups_of(id.idx), [RenderGroup::Billboard, RenderGroup::Model]);
        let b = lists.group(RenderGroup::Billboard)[0].opacity;
        let m = lists.group(RenderGroup::Model)[0].opacity;
        assert!((b + m - 1.0).abs() < 1e-9);

        g.set_focus(Some(id)).unwrap();
        let _ = g.update(&start(), &camera);
        assert!(g.render_lists().contains(RenderGroup::Label, id.idx), "focus forces its label");
    }

    #[test]
    fn million_element_sort_scheduling() {
        const N: u32 = 1_000_000;
        let executor = Arc::new(ManualExecutor::new());
        let config = SceneConfig {
            sort: SortConfig {
                update_interval_ms: 1000,
                camera_threshold: 10.0,
            },
            ..SceneConfig::default()
        };
        let mut g = SceneGraph::new(config).with_executor(executor.clone());
        let records = (0..N)
            .map(|i| ParticleRecord::new(DVec3::new(0.0, 0.0, -f64::from(N - i)), 1.0))
            .collect();
        let set = ParticleSet::new(SetKind::Stars, records);
        let id = g
            .insert(
                NodeDesc::new("Catalog").with_kind(NodeKind::ParticleSet(Box::new(set))),
                true,
            )
            .unwrap();
        let at = |ms: u64| FrameTime::start(SimTime::J2000, ms);
        let camera = FixedCamera::new(DVec3::ZERO);
        let set_of = |g: &SceneGraph| -> (bool, u32) {
            let set = g.store().kind(id).as_particle_set().unwrap();
            (set.is_updating(), set.active()[0])
        };

        let changes = g.update(&at(0), &camera);
        assert_eq!(changes.sorts_scheduled, 1);
        assert_eq!(executor.pending(), 1);
        assert!(matches!(changes.events[..], [SceneEvent::CatalogAdded { elements, .. }] if elements == N as usize));

        let changes = g.update(&at(16), &camera);
        assert_eq!(changes.sorts_scheduled, 0, "never two sorts in flight");
        assert_eq!(set_of(&g), (true, 0), "active buffer untouched while sorting");

        assert_eq!(executor.run_all(), 1);
        let changes = g.update(&at(32), &camera);
        assert_eq!(changes.sorts_applied, 1);
        assert_eq!(changes.sorts_scheduled, 0);
        assert_eq!(set_of(&g), (false, N - 1), "brightest record first");

        let moved = FixedCamera::new(DVec3::new(20.0, 0.0, 0.0));
        let changes = g.update(&at(500), &moved);
        assert_eq!(changes.sorts_scheduled, 0, "moved, but within the interval");
        let changes = g.update(&at(1032), &moved);
        assert_eq!(changes.sorts_scheduled, 1);
        assert_eq!(executor.pending(), 1);
    }

    #[test]
    fn repeated_sorts_with_a_still_camera_agree() {
        let executor = Arc::new(ManualExecutor::new());
        let mut g = SceneGraph::new(SceneConfig::default()).with_executor(executor.clone());
        let records: Vec<ParticleRecord> = (0..64_u32)
            .map(|i| {
                let x = f64::from((i * 37) % 64) - 32.0;
                let pos = DVec3::new(x, 1.0, -10.0 - f64::from(i % 5));
                ParticleRecord::new(pos, 1.0 + f64::from(i % 3))
            })
            .collect();
        let set = ParticleSet::new(SetKind::Stars, records);
        let id = g
            .insert(
                NodeDesc::new("Field").with_kind(NodeKind::ParticleSet(Box::new(set))),
                true,
            )
            .unwrap();
        let at = |ms: u64| FrameTime::start(SimTime::J2000, ms);
        let camera = FixedCamera::new(DVec3::ZERO);
        let active = |g: &SceneGraph| {
            g.store().kind(id).as_particle_set().unwrap().active().to_vec()
        };

        assert_eq!(g.update(&at(0), &camera).sorts_scheduled, 1);
        assert_eq!(executor.run_all(), 1);
        assert_eq!(g.update(&at(16), &camera).sorts_applied, 1);
        let first = active(&g);
        assert_ne!(first, (0..64).collect::<Vec<u32>>());

        let resort = 16 + 2 * g.config().sort.update_interval_ms + 1;
        let changes = g.update(&at(resort), &camera);
        assert_eq!(changes.sorts_scheduled, 1, "still cameras re-sort after two intervals");
        assert_eq!(executor.run_all(), 1);
        assert_eq!(g.update(&at(resort + 16), &camera).sorts_applied, 1);
        assert_eq!(active(&g), first);
        let set = g.store().kind(id).as_particle_set().unwrap();
        assert_eq!(set.sorts_completed(), 2);
    }

    #[test]
    fn set_members_take_the_focus() {
        let records = vec![
            ParticleRecord::new(DVec3::new(0.0, 0.0, -4.0), 2.0).with_hip(70890),
            ParticleRecord::new(DVec3::new(0.0, 0.0, -100.0), 1.0),
        ];
        let set = ParticleSet::new(SetKind::Stars, records).with_name("Proxima Centauri", 0);
        let mut g = SceneGraph::new(SceneConfig::default()).with_executor(Arc::new(InlineExecutor));
        let id = g
            .insert(
                NodeDesc::new("Neighbours").with_kind(NodeKind::ParticleSet(Box::new(set))),
                true,
            )
            .unwrap();
        let sol = g.insert(body("Sol"), true).unwrap();
        let record_focus =
            |g: &SceneGraph| g.store().kind(id).as_particle_set().unwrap().focus_index();

        assert!(matches!(g.focus_by_name("barnard"), Err(SceneError::NameNotFound(n)) if n == "barnard"));
        assert!(matches!(
            g.set_focus_particle(id, 2),
            Err(SceneError::ParticleOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(g.set_focus_particle(sol, 0), Err(SceneError::NotAParticleSet(_))));
        assert_eq!(g.focus_by_name("proxima centauri").unwrap(), id);
        assert_eq!(g.focus(), Some(id));
        assert_eq!(record_focus(&g), Some(0));
        assert_eq!(g.focus_record(), None, "computed by the next update");

        let camera = FixedCamera::new(DVec3::new(0.0, 0.0, 1.0));
        let f0 = start();
        let _ = g.update(&f0, &camera);
        let view = g.focus_record().unwrap();
        assert_eq!(view.index, 0);
        assert_eq!(view.translation, DVec3::new(0.0, 0.0, -5.0));
        assert!((view.dist - 5.0).abs() < 1e-12);
        assert!((view.view_angle - (2.0_f64 / 5.0).atan()).abs() < 1e-12);
        let fov = camera.fov_factor();
        assert!((view.view_angle_apparent - view.view_angle / fov).abs() < 1e-12);

        // The inline sort posted by the first frame lands in the second.
        let _ = g.update(&f0.advance(f0.sim, 16), &camera);
        let set = g.store().kind(id).as_particle_set().unwrap();
        assert_eq!(set.closest_index(), Some(0), "brightest from the camera");
        assert!((set.closest().unwrap().dist - 5.0).abs() < 1e-12);

        g.set_focus(Some(sol)).unwrap();
        assert_eq!(record_focus(&g), None, "moving the focus releases the member");
        assert_eq!(g.focus_record(), None);
    }

    #[test]
    fn overflowed_camera_focus_loses_its_label() {
        #[derive(Debug)]
        struct Bounded;

        impl CoordinateProvider for Bounded {
            fn equatorial_cartesian_at(&self, time: SimTime) -> Result<DVec3, TimeOverflow> {
                let end = SimTime::J2000 + 100.0;
                if time > end {
                    return Err(TimeOverflow {
                        requested: time,
                        start: SimTime::J2000,
                        end,
                    });
                }
                Ok(DVec3::new(0.0, 0.0, -10.0))
            }
        }

        let mut g = SceneGraph::new(SceneConfig::default());
        let craft = g
            .insert(body("Pioneer").with_resolver(PositionResolver::new(Arc::new(Bounded))), true)
            .unwrap();
        let camera = FixedCamera::new(DVec3::ZERO).with_focus(craft);
        let f0 = start();
        let _ = g.update(&f0, &camera);
        assert!(g.render_lists().contains(RenderGroup::Label, craft.idx), "camera focus forces its label");

        let f1 = f0.advance(SimTime::J2000 + 200.0, 16);
        assert_eq!(g.update(&f1, &camera).overflowed, [craft.idx]);
        let _ = g.update(&f1.advance(f1.sim, 32), &camera);
        assert!(g.store().is_overflow(craft));
        assert!(!g.render_lists().contains(RenderGroup::Label, craft.idx));
    }

    #[test]
    fn sorts_for_disposed_sets_are_dropped() {
        let executor = Arc::new(ManualExecutor::new());
        let mut g = SceneGraph::new(SceneConfig::default()).with_executor(executor.clone());
        let records = vec![ParticleRecord::new(DVec3::new(0.0, 0.0, -1.0), 1.0); 16];
        let set = ParticleSet::new(SetKind::Stars, records);
        let id = g
            .insert(
                NodeDesc::new("Cluster").with_kind(NodeKind::ParticleSet(Box::new(set))),
                true,
            )
            .unwrap();
        let camera = FixedCamera::new(DVec3::ZERO);
        assert_eq!(g.update(&start(), &camera).sorts_scheduled, 1);

        g.dispose_particle_set(id).unwrap();
        assert_eq!(executor.run_all(), 1);
        // Slot reuse must not let the stale result land on the new node.
        let other = g.insert(NodeDesc::new("Other"), true).unwrap();
        assert_eq!(other.idx, id.idx);

        let changes = g.update(&FrameTime::start(SimTime::J2000, 16), &camera);
        assert_eq!(changes.sorts_discarded, 1);
        assert_eq!(changes.sorts_applied, 0);
        assert!(changes.events.contains(&SceneEvent::GpuMeshDisposed(id)));
        assert!(g.find_by_name("cluster").is_none());
    }

    #[test]
    fn overflow_hides_from_focus_until_recovered() {
        let elements = KeplerianElements::circular(SimTime::J2000, 10.0, 5.0)
            .with_validity(SimTime::J2000, SimTime::J2000 + 100.0);
        let mut g = SceneGraph::new(SceneConfig::default());
        let craft = g
            .insert(
                body("Voyager").with_resolver(PositionResolver::from_provider(elements)),
                true,
            )
            .unwrap();
        let camera = FixedCamera::new(DVec3::ZERO);
        let f0 = start();
        let _ = g.update(&f0, &camera);
        g.set_focus(Some(craft)).unwrap();
        let before = g.store().pos(craft);

        let f1 = f0.advance(SimTime::J2000 + 200.0, 16);
        let changes = g.update(&f1, &camera);
        assert_eq!(changes.overflowed, [craft.idx]);
        assert_eq!(changes.events, [SceneEvent::FocusCleared(craft)]);
        assert_eq!(g.store().pos(craft), before, "position kept while overflowing");
        assert!(!g.can_focus(craft));

        let f2 = f1.advance(SimTime::J2000 + 50.0, 32);
        let changes = g.update(&f2, &camera);
        assert_eq!(changes.recovered, [craft.idx]);
        assert!(g.can_focus(craft));
    }

    #[test]
    fn orbits_refresh_in_the_background() {
        let elements = KeplerianElements::circular(SimTime::J2000, 30.0, 1000.0);
        let orbit = OrbitState::new(Arc::new(elements), 30.0, 32).unwrap();
        let mut g = SceneGraph::new(SceneConfig::default()).with_executor(Arc::new(InlineExecutor));
        let id = g
            .insert(NodeDesc::new("Orbit").with_kind(NodeKind::Orbit(Box::new(orbit))), true)
            .unwrap();
        let camera = FixedCamera::new(DVec3::ZERO);

        let f0 = start();
        assert_eq!(g.update(&f0, &camera).orbit_refreshes, 1);
        let changes = g.update(&f0.advance(f0.sim, 16), &camera);
        assert_eq!(changes.tasks_run, 1);
        assert_eq!(changes.orbit_refreshes, 0);
        let orbit = g.store().kind(id).as_orbit().unwrap();
        assert_eq!(orbit.samples().len(), 32);
        assert!(g.render_lists().contains(RenderGroup::Line, id.idx));

        let later = f0.advance(SimTime::J2000 + 20.0, 32);
        assert_eq!(g.update(&later, &camera).orbit_refreshes, 1);
    }

    #[test]
    fn constellations_follow_star_translations() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let star = |name: &str, hip: u32, pos: DVec3| {
            NodeDesc::new(name).with_pos(pos).with_kind(NodeKind::Star(StarParams {
                hip: Some(hip),
                ..StarParams::default()
            }))
        };
        let records = vec![ParticleRecord::new(DVec3::new(0.0, 5.0, -50.0), 1.0).with_hip(3)];
        let nodes = vec![
            star("Alpha", 1, DVec3::new(0.0, 0.0, -50.0)),
            star("Beta", 2, DVec3::new(10.0, 0.0, -50.0)),
            NodeDesc::new("Field").with_kind(NodeKind::ParticleSet(Box::new(ParticleSet::new(
                SetKind::Stars,
                records,
            )))),
            NodeDesc::new("Figure").with_kind(NodeKind::Constellation(Box::new(Constellation::new(
                [[1, 2], [2, 3], [3, 99]],
            )))),
        ];
        g.initialize(nodes, &start(), false, true).unwrap();
        let figure = g.find_by_name("figure").unwrap();
        let camera = FixedCamera::new(DVec3::new(1.0, 0.0, 0.0));
        let _ = g.update(&start(), &camera);

        let NodeKind::Constellation(c) = g.store().kind(figure) else {
            panic!("figure is a constellation");
        };
        assert_eq!(
            c.segments(),
            [
                [DVec3::new(-1.0, 0.0, -50.0), DVec3::new(9.0, 0.0, -50.0)],
                [DVec3::new(9.0, 0.0, -50.0), DVec3::new(-1.0, 5.0, -50.0)],
            ]
        );
    }

    #[test]
    fn moving_stars_get_a_proper_motion_line() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let resolver = fixed(DVec3::new(0.0, 0.0, -1.0))
            .with_proper_motion(ProperMotion::new(DVec3::X, SimTime::J2000));
        let id = g
            .insert(
                NodeDesc::new("Barnard")
                    .with_size(1.0)
                    .with_resolver(resolver)
                    .with_kind(NodeKind::Star(StarParams::default())),
                true,
            )
            .unwrap();
        let camera = FixedCamera::new(DVec3::ZERO);
        let _ = g.update(&start(), &camera);
        assert!(g.render_lists().contains(RenderGroup::Line, id.idx));

        g.set_component_enabled(ComponentTypes::PROPER_MOTIONS, false);
        let _ = g.update(&start(), &camera);
        assert!(!g.render_lists().contains(RenderGroup::Line, id.idx));
    }

    #[test]
    fn lifecycle_lists_are_reported_once() {
        let mut g = SceneGraph::new(SceneConfig::default());
        let camera = FixedCamera::new(DVec3::ZERO);
        let first = g.update(&start(), &camera);
        assert!(first.topology_changed);
        assert_eq!(first.added, [g.root().idx]);

        let id = g.insert(body("Ceres"), true).unwrap();
        let changes = g.update(&start(), &camera);
        assert_eq!(changes.added, [id.idx]);
        assert_eq!(
            g.store.dirty.drain(dirty::TOPOLOGY).deterministic().run().count(),
            0,
            "structural marks are drained by the update"
        );
        g.remove(id, true).unwrap();
        let changes = g.update(&start(), &camera);
        assert_eq!(changes.removed, [id.idx]);
        let changes = g.update(&start(), &camera);
        assert!(!changes.topology_changed);
        assert!(changes.added.is_empty() && changes.removed.is_empty());
    }
}
