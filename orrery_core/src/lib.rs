// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph core for rendering a navigable model of the universe.
//!
//! `orrery_core` keeps a tree of astronomical objects, from planets to star
//! catalogs with millions of entries, and turns it into per-frame render
//! lists. Positions are in kilometers; simulation time is a Julian date.
//!
//! # Architecture
//!
//! ```text
//!   CoordinateProvider ──► PositionResolver ──┐
//!                                             ▼
//!   FrameTime + Camera ──► SceneGraph::update() ──► RenderLists
//!                                │                      │
//!                                │                      ▼
//!                                │                FrameChanges
//!                                ▼
//!                     ParticleSet::begin_sort() ──► Executor
//!                                                      │
//!                          TaskSender::post() ◄────────┘
//! ```
//!
//! **[`node`]**: struct-of-arrays node tree with generational handles.
//! Positions are set by the caller or by a resolver; camera-relative
//! translations, view angles, and opacities are computed by the update.
//!
//! **[`resolver`]** and **[`coords`]**: time-dependent positions. A resolver
//! asks its coordinate provider only when simulation time moved, and applies
//! proper motion.
//!
//! **[`visibility`]** and **[`lod`]**: fades and detail bands. A node is a
//! point, a billboard, a model, or a cross-fade between the last two,
//! depending on its apparent size.
//!
//! **[`particles`]**: large record sets, sorted back to front (or brightest
//! first) on a background thread with double-buffered permutations.
//!
//! **[`scene`]**: the [`SceneGraph`](scene::SceneGraph) with its name and
//! star [`index`], plus the update that ties everything together.
//!
//! **[`render_list`]**: what to draw this frame, grouped by primitive.
//!
//! **[`tasks`]**: executors for background jobs and the queue their results
//! come back through.
//!
//! **[`dirty`]**: dirty channels via `understory_dirty`.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) hooks for the update, with
//! a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): enables `Tracer` method bodies (one
//!   branch per call site).
//! - `trace-rich` (disabled by default, implies `trace`): adds render group
//!   counts and coordinate overflow events.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod camera;
pub mod config;
pub mod constellation;
pub mod coords;
pub mod dirty;
pub mod error;
pub mod index;
pub mod lod;
pub mod node;
pub mod orbit;
pub mod particles;
pub mod predict;
pub mod render_list;
pub mod resolver;
pub mod scene;
pub mod tasks;
pub mod time;
pub mod trace;
pub mod units;
pub mod visibility;
