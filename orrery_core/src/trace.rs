// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instrumentation hooks for the scene update.
//!
//! [`SceneGraph::update_into`](crate::scene::SceneGraph::update_into) reports
//! what it does to a [`TraceSink`]. Every sink method defaults to a no-op, so
//! a sink only overrides the events it cares about.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. Without the `trace`
//! feature its methods are empty and compile away; with it, each call is one
//! `Option` branch.
//!
//! [`FrameSummaryBuilder`] turns the phase events of one update into a
//! [`FrameSummary`].
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies.
//! - `trace-rich` (implies `trace`): adds [`RenderCounts`] and
//!   [`OverflowChange`] events.

use crate::time::SimTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which part of the update is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Running frame tasks posted by background jobs.
    Tasks,
    /// The top-down pass: resolve, fade, classify, collect.
    Traverse,
    /// Scheduling background sorts and orbit refreshes.
    Sort,
    /// Constellations, dirty-channel drains, and change reporting.
    Finalize,
}

/// What happened to a background sort.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortEventKind {
    /// A sort job was handed to the executor.
    Scheduled,
    /// A finished sort was swapped in.
    Applied,
    /// A finished sort arrived for a set that no longer exists.
    Discarded,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the start of every update.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Update counter.
    pub frame_index: u64,
    /// Wall-clock time of the frame, in milliseconds.
    pub wall_ms: u64,
    /// Simulation time of the frame.
    pub sim: SimTime,
    /// Whether simulation time moved since the previous frame.
    pub sim_changed: bool,
}

/// Marks the beginning of an update phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Update counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Microseconds since the graph was created.
    pub timestamp_us: u64,
}

/// Marks the end of an update phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Update counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Microseconds since the graph was created.
    pub timestamp_us: u64,
}

/// Emitted for background sort lifecycle steps.
#[derive(Clone, Copy, Debug)]
pub struct SortEvent {
    /// Update counter.
    pub frame_index: u64,
    /// Raw slot index of the set node.
    pub node: u32,
    /// What happened.
    pub kind: SortEventKind,
    /// Number of records in the set.
    pub elements: usize,
}

/// Per-update summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Update counter.
    pub frame_index: u64,
    /// Simulation time of the frame.
    pub sim: SimTime,
    /// Nodes visited by the traversal.
    pub nodes_visited: usize,
    /// Frame tasks run.
    pub tasks_run: usize,
    /// Task phase duration in microseconds (0 if not measured).
    pub tasks_us: u64,
    /// Traverse phase duration in microseconds (0 if not measured).
    pub traverse_us: u64,
    /// Sort phase duration in microseconds (0 if not measured).
    pub sort_us: u64,
    /// Finalize phase duration in microseconds (0 if not measured).
    pub finalize_us: u64,
}

/// Number of entries per render group after an update.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderCounts {
    /// Point entries.
    pub points: usize,
    /// Billboard entries.
    pub billboards: usize,
    /// Model entries.
    pub models: usize,
    /// Label entries.
    pub labels: usize,
    /// Line entries.
    pub lines: usize,
    /// Particle set entries.
    pub particle_sets: usize,
}

#[cfg(feature = "trace-rich")]
impl From<&crate::render_list::RenderLists> for RenderCounts {
    fn from(lists: &crate::render_list::RenderLists) -> Self {
        use crate::render_list::RenderGroup;
        Self {
            points: lists.group(RenderGroup::Point).len(),
            billboards: lists.group(RenderGroup::Billboard).len(),
            models: lists.group(RenderGroup::Model).len(),
            labels: lists.group(RenderGroup::Label).len(),
            lines: lists.group(RenderGroup::Line).len(),
            particle_sets: lists.group(RenderGroup::ParticleSet).len(),
        }
    }
}

/// A node entering or leaving the coordinate overflow state.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverflowChange {
    /// Raw slot index of the node.
    pub node: u32,
    /// `true` if the node entered overflow, `false` if it recovered.
    pub overflowed: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the scene update.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called at the start of an update.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of an update phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of an update phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called for background sort lifecycle steps.
    fn on_sort(&mut self, e: &SortEvent) {
        _ = e;
    }

    /// Called with the per-update summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with render group sizes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_render_counts(&mut self, frame_index: u64, counts: &RenderCounts) {
        _ = (frame_index, counts);
    }

    /// Called with overflow transitions (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_overflow_changes(&mut self, frame_index: u64, changes: &[OverflowChange]) {
        _ = (frame_index, changes);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns whether events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SortEvent`].
    #[inline]
    pub fn sort(&mut self, e: &SortEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_sort(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits render group sizes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn render_counts(&mut self, frame_index: u64, counts: &RenderCounts) {
        if let Some(s) = &mut self.sink {
            s.on_render_counts(frame_index, counts);
        }
    }

    /// Emits overflow transitions (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn overflow_changes(&mut self, frame_index: u64, changes: &[OverflowChange]) {
        if let Some(s) = &mut self.sink {
            s.on_overflow_changes(frame_index, changes);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps during an update and produces a
/// [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    begin: FrameBeginEvent,
    phase_starts: [Option<u64>; 4],
    phase_ends: [Option<u64>; 4],
    nodes_visited: usize,
    tasks_run: usize,
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the update described by `begin`.
    #[must_use]
    pub fn new(begin: &FrameBeginEvent) -> Self {
        Self {
            begin: *begin,
            phase_starts: [None; 4],
            phase_ends: [None; 4],
            nodes_visited: 0,
            tasks_run: 0,
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, timestamp_us: u64) {
        self.phase_starts[phase_index(phase)] = Some(timestamp_us);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, timestamp_us: u64) {
        self.phase_ends[phase_index(phase)] = Some(timestamp_us);
    }

    /// Records how much work the update did.
    pub fn set_counts(&mut self, nodes_visited: usize, tasks_run: usize) {
        self.nodes_visited = nodes_visited;
        self.tasks_run = tasks_run;
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.begin.frame_index,
            sim: self.begin.sim,
            nodes_visited: self.nodes_visited,
            tasks_run: self.tasks_run,
            tasks_us: self.phase_duration(PhaseKind::Tasks),
            traverse_us: self.phase_duration(PhaseKind::Traverse),
            sort_us: self.phase_duration(PhaseKind::Sort),
            finalize_us: self.phase_duration(PhaseKind::Finalize),
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase_index(phase);
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }
}

/// Maps a [`PhaseKind`] to an array index.
const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Tasks => 0,
        PhaseKind::Traverse => 1,
        PhaseKind::Sort => 2,
        PhaseKind::Finalize => 3,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> FrameBeginEvent {
        FrameBeginEvent {
            frame_index: 42,
            wall_ms: 1_000,
            sim: SimTime::J2000,
            sim_changed: true,
        }
    }

    #[test]
    fn noop_sink_accepts_everything() {
        let mut sink = NoopSink;
        sink.on_frame_begin(&sample_begin());
        sink.on_sort(&SortEvent {
            frame_index: 42,
            node: 1,
            kind: SortEventKind::Scheduled,
            elements: 10,
        });
        sink.on_frame_summary(&FrameSummaryBuilder::new(&sample_begin()).finish());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.frame_begin(&sample_begin());
    }

    #[test]
    fn summary_builder_computes_durations() {
        let mut builder = FrameSummaryBuilder::new(&sample_begin());
        builder.phase_begin(PhaseKind::Tasks, 1_000);
        builder.phase_end(PhaseKind::Tasks, 1_010);
        builder.phase_begin(PhaseKind::Traverse, 1_010);
        builder.phase_end(PhaseKind::Traverse, 1_400);
        builder.phase_begin(PhaseKind::Sort, 1_400);
        builder.phase_end(PhaseKind::Sort, 1_450);
        builder.phase_begin(PhaseKind::Finalize, 1_450);
        builder.phase_end(PhaseKind::Finalize, 1_460);
        builder.set_counts(12, 3);

        let summary = builder.finish();
        assert_eq!(summary.tasks_us, 10);
        assert_eq!(summary.traverse_us, 390);
        assert_eq!(summary.sort_us, 50);
        assert_eq!(summary.finalize_us, 10);
        assert_eq!(summary.nodes_visited, 12);
        assert_eq!(summary.tasks_run, 3);
        assert_eq!(summary.frame_index, 42);
    }

    #[test]
    fn summary_builder_missing_phases_are_zero() {
        let summary = FrameSummaryBuilder::new(&sample_begin()).finish();
        assert_eq!(summary.tasks_us, 0);
        assert_eq!(summary.traverse_us, 0);
        assert_eq!(summary.sort_us, 0);
        assert_eq!(summary.finalize_us, 0);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        struct RecordingSink {
            sorts: Vec<(u32, SortEventKind)>,
        }
        impl TraceSink for RecordingSink {
            fn on_sort(&mut self, e: &SortEvent) {
                self.sorts.push((e.node, e.kind));
            }
        }

        let mut sink = RecordingSink { sorts: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        assert!(tracer.is_active());
        tracer.sort(&SortEvent {
            frame_index: 1,
            node: 7,
            kind: SortEventKind::Applied,
            elements: 3,
        });
        drop(tracer);
        assert_eq!(sink.sorts, [(7, SortEventKind::Applied)]);
    }
}
