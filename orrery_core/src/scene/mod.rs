// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene graph.
//!
//! [`SceneGraph`] owns the node tree ([`NodeStore`](crate::node::NodeStore)),
//! the name and star index, the frame task queue, and the render lists of
//! the last update.
//!
//! ```text
//!   initialize / insert / remove ──► NodeStore + NameIndex
//!                                         │
//!   FrameTime + Camera ──► update() ──────┤
//!                            │            ▼
//!                            │      RenderLists (per group)
//!                            ▼
//!                      FrameChanges ──► renderer, GPU caches
//!                            ▲
//!   background sorts ──► TaskSender ──► next update()
//! ```

mod arena;
mod graph;
mod query;
mod update;

pub use graph::{ROOT_NAME, SceneGraph};
pub use query::PickHit;
pub use update::{FrameChanges, SceneEvent};
