// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identity.

use core::fmt;

/// Sentinel value indicating "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// Numeric id the root node is registered under.
pub const ROOT_ID: i64 = -1;

/// A handle to a node in a [`NodeStore`](super::NodeStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is removed and the slot is reused. Background
/// jobs capture a `NodeId` and check it on completion, which is how results
/// for disposed datasets are dropped.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Returns the raw slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}
