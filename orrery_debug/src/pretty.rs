// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use orrery_core::trace::{
    FrameBeginEvent, FrameSummary, OverflowChange, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    RenderCounts, SortEvent, SortEventKind, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub(crate) fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Tasks => "tasks",
        PhaseKind::Traverse => "traverse",
        PhaseKind::Sort => "sort",
        PhaseKind::Finalize => "finalize",
    }
}

pub(crate) fn sort_kind_name(kind: SortEventKind) -> &'static str {
    match kind {
        SortEventKind::Scheduled => "scheduled",
        SortEventKind::Applied => "applied",
        SortEventKind::Discarded => "discarded",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] frame={} wall={}ms jd={:.6} sim_changed={}",
            e.frame_index, e.wall_ms, e.sim.0, e.sim_changed,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {}µs",
            e.frame_index,
            phase_name(e.phase),
            e.timestamp_us,
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {}µs",
            e.frame_index,
            phase_name(e.phase),
            e.timestamp_us,
        );
    }

    fn on_sort(&mut self, e: &SortEvent) {
        let _ = writeln!(
            self.writer,
            "[sort] frame={} node={} {} elements={}",
            e.frame_index,
            e.node,
            sort_kind_name(e.kind),
            e.elements,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} nodes={} tasks={} tasks={}µs traverse={}µs \
             sort={}µs finalize={}µs",
            s.frame_index,
            s.nodes_visited,
            s.tasks_run,
            s.tasks_us,
            s.traverse_us,
            s.sort_us,
            s.finalize_us,
        );
    }

    fn on_render_counts(&mut self, frame_index: u64, c: &RenderCounts) {
        let _ = writeln!(
            self.writer,
            "[lists] frame={frame_index} points={} billboards={} models={} labels={} \
             lines={} sets={}",
            c.points, c.billboards, c.models, c.labels, c.lines, c.particle_sets,
        );
    }

    fn on_overflow_changes(&mut self, frame_index: u64, changes: &[OverflowChange]) {
        let entered = changes.iter().filter(|c| c.overflowed).count();
        let _ = writeln!(
            self.writer,
            "[overflow] frame={frame_index} entered={entered} recovered={}",
            changes.len() - entered,
        );
    }
}

#[cfg(test)]
mod tests {
    use orrery_core::time::SimTime;

    use super::*;

    #[test]
    fn pretty_print_frame_and_sort() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame_begin(&FrameBeginEvent {
            frame_index: 1,
            wall_ms: 16,
            sim: SimTime::J2000,
            sim_changed: true,
        });
        sink.on_sort(&SortEvent {
            frame_index: 1,
            node: 4,
            kind: SortEventKind::Scheduled,
            elements: 1_000_000,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[frame] frame=1"), "got: {output}");
        assert!(output.contains("jd=2451545.000000"), "got: {output}");
        assert!(output.contains("node=4 scheduled elements=1000000"), "got: {output}");
    }
}
