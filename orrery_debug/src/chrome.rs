// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] turns events from a [`RecorderSink`](super::recorder::RecorderSink)
//! into [Chrome Trace Event Format][format] JSON.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::pretty::{phase_name, sort_kind_name};
use crate::recorder::RecordedEvent;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Phase events carry their own timestamps; instant events without one are
/// placed at the start of the most recent phase.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let mut out: Vec<Value> = Vec::with_capacity(events.len());
    let mut ts = 0_u64;

    for recorded in events {
        match recorded {
            RecordedEvent::FrameBegin(e) => {
                out.push(json!({
                    "ph": "i",
                    "name": "FrameBegin",
                    "cat": "Frame",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "wall_ms": e.wall_ms,
                        "jd": e.sim.0,
                        "sim_changed": e.sim_changed,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                ts = e.timestamp_us;
                out.push(json!({
                    "ph": "B",
                    "name": phase_name(e.phase),
                    "cat": "Update",
                    "ts": e.timestamp_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                ts = e.timestamp_us;
                out.push(json!({
                    "ph": "E",
                    "name": phase_name(e.phase),
                    "cat": "Update",
                    "ts": e.timestamp_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::Sort(e) => {
                out.push(json!({
                    "ph": "i",
                    "name": format!("Sort {}", sort_kind_name(e.kind)),
                    "cat": "Sort",
                    "ts": ts,
                    "pid": 0,
                    "tid": 1,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "node": e.node,
                        "elements": e.elements,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                out.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Summary",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": s.frame_index,
                        "jd": s.sim.0,
                        "nodes_visited": s.nodes_visited,
                        "tasks_run": s.tasks_run,
                        "tasks_us": s.tasks_us,
                        "traverse_us": s.traverse_us,
                        "sort_us": s.sort_us,
                        "finalize_us": s.finalize_us,
                    }
                }));
            }
            RecordedEvent::RenderCounts {
                frame_index,
                counts,
            } => {
                out.push(json!({
                    "ph": "C",
                    "name": "RenderLists",
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": frame_index,
                        "points": counts.points,
                        "billboards": counts.billboards,
                        "models": counts.models,
                        "labels": counts.labels,
                        "lines": counts.lines,
                        "particle_sets": counts.particle_sets,
                    }
                }));
            }
            RecordedEvent::OverflowCount {
                frame_index,
                entered,
                recovered,
            } => {
                out.push(json!({
                    "ph": "i",
                    "name": "Overflow",
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": frame_index,
                        "entered": entered,
                        "recovered": recovered,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &out)?;
    Ok(())
}
