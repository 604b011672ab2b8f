// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene node data model.
//!
//! A *node* is an element of the universe tree. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is removed, plus names and a numeric catalog id.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//! - **Local properties** set by the caller or by its position resolver:
//!   `pos` (relative to the parent), orientation, size, the visibility flag,
//!   and category tags ([`ComponentTypes`]).
//! - **Computed properties** written by
//!   [`SceneGraph::update`](crate::scene::SceneGraph::update): the
//!   camera-relative `translation`, distance, view angles, and opacity.
//! - A payload ([`NodeKind`]) that selects what the node draws.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles
//! for cache-friendly traversal.

mod component;
mod desc;
mod id;
mod payload;
mod store;
mod traverse;

pub use component::ComponentTypes;
pub use desc::NodeDesc;
pub use id::{INVALID, NodeId, ROOT_ID};
pub use payload::{BodyParams, NodeKind, StarParams};
pub use store::NodeStore;
pub use traverse::Children;
