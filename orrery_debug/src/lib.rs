// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logging, recording, pretty-printing, and Chrome trace export for orrery
//! diagnostics.
//!
//! This crate provides [`TraceSink`](orrery_core::trace::TraceSink)
//! implementations for development and post-mortem analysis, plus the
//! logging setup for binaries and tests:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: in-memory recording of typed events.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   events.
//! - [`logging::init_logging`]: installs a `tracing-subscriber` formatter
//!   filtered by `RUST_LOG`.

pub mod chrome;
pub mod logging;
pub mod pretty;
pub mod recorder;
