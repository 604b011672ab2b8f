// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Large particle and star sets with background-sorted draw order.
//!
//! A [`ParticleSet`] holds up to millions of [`ParticleRecord`]s that are
//! drawn as one batch. Correct blending needs them in a camera-dependent
//! order, and recomputing that order is too slow for the frame thread, so
//! the set keeps two permutation buffers:
//!
//! ```text
//!   frame thread                        worker
//!   ────────────                        ──────
//!   should_sort()?
//!   begin_sort() ── background ──────►  SortJob::run()
//!        │                               keys (par) + sort (par)
//!   renderer reads `active`                  │
//!        │          ◄── FrameTask ───────────┘
//!   complete_sort(): swap active ↔ background
//! ```
//!
//! While a job is in flight the set is *updating* and no other sort starts.
//! The completion runs as a frame task and checks that the set still exists,
//! so a set disposed mid-sort simply drops the result.

mod pick;
mod record;
mod set;
mod sort;

pub use pick::ParticleHit;
pub use record::ParticleRecord;
pub use set::{ParticleFilter, ParticleSet, RecordView, SetKind};
pub use sort::{SortBuffers, SortJob, SortOutput, SortParams};
