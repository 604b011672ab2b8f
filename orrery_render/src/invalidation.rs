// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU mesh invalidation for particle sets.

use orrery_core::node::NodeId;
use orrery_core::scene::{FrameChanges, SceneEvent};

/// Which cached particle set meshes are out of date.
///
/// Invalidation is per set: changing one record's visibility rebuilds the
/// whole set's geometry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MeshInvalidation {
    /// Every cached mesh must be rebuilt.
    #[default]
    All,
    /// The meshes of these sets must be rebuilt.
    Sets(Vec<NodeId>),
    /// Nothing changed.
    None,
}

impl MeshInvalidation {
    /// Collects the sets invalidated by one update.
    #[must_use]
    pub fn from_changes(changes: &FrameChanges) -> Self {
        let mut sets: Vec<NodeId> = Vec::new();
        for event in &changes.events {
            if let SceneEvent::GpuMeshDisposed(node) = event {
                if !sets.contains(node) {
                    sets.push(*node);
                }
            }
        }
        if sets.is_empty() {
            Self::None
        } else {
            Self::Sets(sets)
        }
    }

    /// Returns `true` if no mesh needs rebuilding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns whether the mesh of `node` must be rebuilt.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        match self {
            Self::All => true,
            Self::Sets(sets) => sets.contains(&node),
            Self::None => false,
        }
    }

    /// Merges another invalidation into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&mut *self, other) {
            (Self::All, _) | (_, Self::None) => {}
            (_, Self::All) => *self = Self::All,
            (Self::None, _) => *self = other.clone(),
            (Self::Sets(a), Self::Sets(b)) => {
                for node in b {
                    if !a.contains(node) {
                        a.push(*node);
                    }
                }
            }
        }
    }
}
