// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend-managed particle set meshes.

use core::fmt;
use std::collections::HashMap;

use orrery_core::node::NodeId;

use crate::invalidation::MeshInvalidation;

/// An opaque handle to a backend-managed mesh (vertex buffer, etc.).
///
/// Mesh keys are assigned by backends and passed through without
/// interpretation by the core or render crates.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshKey(pub u64);

impl fmt::Debug for MeshKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MeshKey({})", self.0)
    }
}

/// Meshes uploaded for particle sets, keyed by set node.
///
/// Generational handles keep a reused slot from picking up the mesh of the
/// set that lived there before.
#[derive(Clone, Debug, Default)]
pub struct MeshCache {
    meshes: HashMap<NodeId, MeshKey>,
}

impl MeshCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The mesh of `node`, if one is cached.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<MeshKey> {
        self.meshes.get(&node).copied()
    }

    /// Caches `key` for `node`, returning the key it replaces.
    pub fn insert(&mut self, node: NodeId, key: MeshKey) -> Option<MeshKey> {
        self.meshes.insert(node, key)
    }

    /// Drops every mesh `invalidation` covers and returns their keys for the
    /// backend to release.
    pub fn invalidate(&mut self, invalidation: &MeshInvalidation) -> Vec<MeshKey> {
        match invalidation {
            MeshInvalidation::None => Vec::new(),
            MeshInvalidation::All => self.meshes.drain().map(|(_, key)| key).collect(),
            MeshInvalidation::Sets(sets) => sets
                .iter()
                .filter_map(|node| self.meshes.remove(node))
                .collect(),
        }
    }

    /// Number of cached meshes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
