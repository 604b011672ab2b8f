// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event as a
//! [`RecordedEvent`], for export with [`chrome::export`](crate::chrome::export)
//! or for assertions in tests. Rich events store only their counts.

use orrery_core::trace::{
    FrameBeginEvent, FrameSummary, OverflowChange, PhaseBeginEvent, PhaseEndEvent, RenderCounts,
    SortEvent, TraceSink,
};

/// One recorded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// See [`TraceSink::on_frame_begin`].
    FrameBegin(FrameBeginEvent),
    /// See [`TraceSink::on_phase_begin`].
    PhaseBegin(PhaseBeginEvent),
    /// See [`TraceSink::on_phase_end`].
    PhaseEnd(PhaseEndEvent),
    /// See [`TraceSink::on_sort`].
    Sort(SortEvent),
    /// See [`TraceSink::on_frame_summary`].
    FrameSummary(FrameSummary),
    /// See [`TraceSink::on_render_counts`].
    RenderCounts {
        /// Update counter.
        frame_index: u64,
        /// Group sizes.
        counts: RenderCounts,
    },
    /// See [`TraceSink::on_overflow_changes`].
    OverflowCount {
        /// Update counter.
        frame_index: u64,
        /// Nodes that entered overflow.
        entered: usize,
        /// Nodes that recovered.
        recovered: usize,
    },
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns its events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Forgets all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.events.push(RecordedEvent::FrameBegin(*e));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.events.push(RecordedEvent::PhaseBegin(*e));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.events.push(RecordedEvent::PhaseEnd(*e));
    }

    fn on_sort(&mut self, e: &SortEvent) {
        self.events.push(RecordedEvent::Sort(*e));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.events.push(RecordedEvent::FrameSummary(*s));
    }

    fn on_render_counts(&mut self, frame_index: u64, counts: &RenderCounts) {
        self.events.push(RecordedEvent::RenderCounts {
            frame_index,
            counts: *counts,
        });
    }

    fn on_overflow_changes(&mut self, frame_index: u64, changes: &[OverflowChange]) {
        let entered = changes.iter().filter(|c| c.overflowed).count();
        self.events.push(RecordedEvent::OverflowCount {
            frame_index,
            entered,
            recovered: changes.len() - entered,
        });
    }
}
