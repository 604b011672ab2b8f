// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The node store uses multi-channel dirty tracking (via [`understory_dirty`])
//! for the two kinds of change that are not recomputed unconditionally every
//! frame. Positions, distances, and view angles are *not* tracked here: they
//! depend on the camera and on simulation time, so the scene graph recomputes
//! them for every node on every update.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on topology mutations (insert,
//!   remove, attach, detach). It triggers a traversal-order rebuild at the
//!   start of the next update but does not propagate to descendants.
//!
//! - **Propagating**: [`VISIBILITY`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and has dependency edges
//!   from child to parent. Flipping a node's visible flag marks its whole
//!   subtree, since a hidden parent fades out every descendant through the
//!   inherited opacity.
//!
//! Callers never query dirty state directly. Each
//! [`SceneGraph::update`](crate::scene::SceneGraph::update) drains both
//! channels and surfaces the results in
//! [`FrameChanges`](crate::scene::FrameChanges).

use understory_dirty::Channel;

/// Visibility flag flipped; the subtree's inherited opacity is fading.
pub const VISIBILITY: Channel = Channel::new(0);

/// Tree topology changed; triggers a traversal order rebuild.
pub const TOPOLOGY: Channel = Channel::new(1);
