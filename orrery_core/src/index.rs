// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Name and star-position indices.
//!
//! [`NameIndex`] maps normalized names (trimmed, lowercase) to nodes, and
//! catalog numbers to [`StarHandle`]s. The index is shared: cloning it yields
//! another handle to the same maps, so dataset loaders and UI search can hold
//! one while the frame thread mutates the tree. Every operation takes the
//! index lock for its whole duration.
//!
//! Conflicting names are resolved by keeping the first mapping; the second
//! writer is logged and stays reachable through its other names. Entries can
//! outlive their node (see [`SceneGraph::remove`](crate::scene::SceneGraph::remove)),
//! so the `*_live` operations take a liveness predicate: a dead target never
//! blocks a new mapping and never counts toward search results.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::node::NodeId;

/// Normalizes an index key.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// What a name resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    /// The node owning the name.
    pub node: NodeId,
    /// Record index when the name belongs to a member of a particle set.
    pub particle: Option<u32>,
    /// Whether the target can become the camera focus.
    pub focusable: bool,
}

/// Where a catalog star's position comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StarHandle {
    /// A single star node.
    Node(NodeId),
    /// A record inside a star set.
    Record {
        /// The set node.
        set: NodeId,
        /// Record index within the set.
        index: u32,
    },
}

impl StarHandle {
    /// The node the handle lives in.
    #[must_use]
    pub fn node(self) -> NodeId {
        match self {
            Self::Node(node) | Self::Record { set: node, .. } => node,
        }
    }
}

#[derive(Debug, Default)]
struct IndexMaps {
    names: HashMap<String, IndexEntry>,
    stars: HashMap<u32, StarHandle>,
}

/// Shared, lock-guarded name and star index.
#[derive(Clone, Debug, Default)]
pub struct NameIndex {
    inner: Arc<Mutex<IndexMaps>>,
}

impl NameIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `name` to `entry`. Returns `false` if the name was already taken
    /// by a different target; the existing mapping is kept.
    pub fn insert(&self, name: &str, entry: IndexEntry) -> bool {
        self.insert_live(name, entry, |_| true)
    }

    /// Like [`insert`](Self::insert), but an existing mapping whose node fails
    /// `is_live` is replaced instead of kept.
    pub fn insert_live(
        &self,
        name: &str,
        entry: IndexEntry,
        is_live: impl Fn(NodeId) -> bool,
    ) -> bool {
        let key = normalize(name);
        if key.is_empty() {
            return false;
        }
        let mut maps = self.inner.lock();
        match maps.names.get(&key) {
            Some(existing) if *existing == entry => true,
            Some(existing) if !is_live(existing.node) => {
                tracing::debug!(name = %key, stale = ?existing.node, "replacing stale name");
                maps.names.insert(key, entry);
                true
            }
            Some(existing) => {
                tracing::warn!(
                    name = %key,
                    existing = ?existing.node,
                    rejected = ?entry.node,
                    "name already indexed; keeping the first mapping"
                );
                false
            }
            None => {
                maps.names.insert(key, entry);
                true
            }
        }
    }

    /// Removes `name` if it maps to `node`. Returns whether it was removed.
    pub fn remove(&self, name: &str, node: NodeId) -> bool {
        let key = normalize(name);
        let mut maps = self.inner.lock();
        if maps.names.get(&key).is_some_and(|e| e.node == node) {
            maps.names.remove(&key);
            true
        } else {
            false
        }
    }

    /// Removes every name and star entry pointing at `node`. Returns the
    /// number of entries removed.
    pub fn remove_node(&self, node: NodeId) -> usize {
        let mut maps = self.inner.lock();
        let before = maps.names.len() + maps.stars.len();
        maps.names.retain(|_, e| e.node != node);
        maps.stars.retain(|_, h| h.node() != node);
        before - maps.names.len() - maps.stars.len()
    }

    /// Removes only the star entries pointing at `node`.
    pub fn remove_stars_of(&self, node: NodeId) -> usize {
        let mut maps = self.inner.lock();
        let before = maps.stars.len();
        maps.stars.retain(|_, h| h.node() != node);
        before - maps.stars.len()
    }

    /// Looks up a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<IndexEntry> {
        self.inner.lock().names.get(&normalize(name)).copied()
    }

    /// Returns whether a name is indexed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registers a catalog star. Returns `false` if the number is taken.
    pub fn insert_star(&self, hip: u32, handle: StarHandle) -> bool {
        self.insert_star_live(hip, handle, |_| true)
    }

    /// Like [`insert_star`](Self::insert_star), but a number held by a node
    /// failing `is_live` is taken over.
    pub fn insert_star_live(
        &self,
        hip: u32,
        handle: StarHandle,
        is_live: impl Fn(NodeId) -> bool,
    ) -> bool {
        let mut maps = self.inner.lock();
        match maps.stars.get(&hip) {
            Some(existing) if *existing == handle => true,
            Some(existing) if !is_live(existing.node()) => {
                maps.stars.insert(hip, handle);
                true
            }
            Some(existing) => {
                tracing::debug!(hip, existing = ?existing, "duplicate catalog number ignored");
                false
            }
            None => {
                maps.stars.insert(hip, handle);
                true
            }
        }
    }

    /// Looks up a catalog star.
    #[must_use]
    pub fn star(&self, hip: u32) -> Option<StarHandle> {
        self.inner.lock().stars.get(&hip).copied()
    }

    /// Number of indexed names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().names.len()
    }

    /// Returns `true` if no names are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().names.is_empty()
    }

    /// Number of indexed catalog stars.
    #[must_use]
    pub fn star_count(&self) -> usize {
        self.inner.lock().stars.len()
    }

    /// Drops every entry whose node fails `is_live`. Returns the number of
    /// entries removed.
    pub fn prune(&self, is_live: impl Fn(NodeId) -> bool) -> usize {
        let mut maps = self.inner.lock();
        let before = maps.names.len() + maps.stars.len();
        maps.names.retain(|_, e| is_live(e.node));
        maps.stars.retain(|_, h| is_live(h.node()));
        before - maps.names.len() - maps.stars.len()
    }

    /// Case-insensitive search over focusable names whose node passes
    /// `is_live`.
    ///
    /// Names starting with `query` come first, then names containing it.
    /// Each group is sorted, and at most `max_results` keys are returned.
    #[must_use]
    pub fn matching_focusable(
        &self,
        query: &str,
        max_results: usize,
        is_live: impl Fn(NodeId) -> bool,
    ) -> Vec<String> {
        let query = normalize(query);
        if query.is_empty() || max_results == 0 {
            return Vec::new();
        }
        let maps = self.inner.lock();
        let names = &maps.names;
        let is_live = &is_live;
        let focusable = move || {
            names
                .iter()
                .filter(move |(_, e)| e.focusable && is_live(e.node))
                .map(|(k, _)| k)
        };

        let mut prefix: Vec<&String> = focusable().filter(|k| k.starts_with(&query)).collect();
        prefix.sort_unstable();
        let mut out: Vec<String> = prefix.into_iter().take(max_results).cloned().collect();
        if out.len() < max_results {
            let mut substring: Vec<&String> = focusable()
                .filter(|k| !k.starts_with(&query) && k.contains(&query))
                .collect();
            substring.sort_unstable();
            let room = max_results - out.len();
            out.extend(substring.into_iter().take(room).cloned());
        }
        out
    }
}
