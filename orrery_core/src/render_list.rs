// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame render lists.
//!
//! [`RenderLists`] is the output of classification: one append-only list per
//! [`RenderGroup`], filled in traversal order during
//! [`SceneGraph::update`](crate::scene::SceneGraph::update) and cleared at the
//! start of the next update. Entries carry raw slot indices so backends can
//! read node state through the store's `*_at()` accessors.
//!
//! A node appears in at most one of Point, Billboard, and Model, except in
//! the billboard/model overlap band where it appears in both Billboard and
//! Model with complementary opacities.

/// A bucket the rendering backend draws as one batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderGroup {
    /// Single-pixel points.
    Point,
    /// Camera-facing quads.
    Billboard,
    /// Full 3D models.
    Model,
    /// Text labels.
    Label,
    /// Line strips: orbits, constellations, proper-motion vectors.
    Line,
    /// Large particle or star sets, drawn in their sorted order.
    ParticleSet,
}

impl RenderGroup {
    /// Every group, in draw order.
    pub const ALL: [Self; 6] = [
        Self::Point,
        Self::Billboard,
        Self::Model,
        Self::Label,
        Self::Line,
        Self::ParticleSet,
    ];

    const fn slot(self) -> usize {
        match self {
            Self::Point => 0,
            Self::Billboard => 1,
            Self::Model => 2,
            Self::Label => 3,
            Self::Line => 4,
            Self::ParticleSet => 5,
        }
    }
}

/// One node's contribution to a group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderEntry {
    /// Raw slot index of the node.
    pub node: u32,
    /// Final opacity for this representation.
    pub opacity: f64,
}

/// Render groups for one frame.
#[derive(Clone, Debug, Default)]
pub struct RenderLists {
    groups: [Vec<RenderEntry>; 6],
}

impl RenderLists {
    /// Creates empty lists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to `group`.
    pub fn push(&mut self, group: RenderGroup, node: u32, opacity: f64) {
        self.groups[group.slot()].push(RenderEntry { node, opacity });
    }

    /// Returns the entries of `group`.
    #[must_use]
    pub fn group(&self, group: RenderGroup) -> &[RenderEntry] {
        &self.groups[group.slot()]
    }

    /// Returns whether `node` is in `group`.
    #[must_use]
    pub fn contains(&self, group: RenderGroup, node: u32) -> bool {
        self.group(group).iter().any(|e| e.node == node)
    }

    /// Returns every group a node appears in, in draw order.
    #[must_use]
    pub fn groups_of(&self, node: u32) -> Vec<RenderGroup> {
        RenderGroup::ALL
            .into_iter()
            .filter(|g| self.contains(*g, node))
            .collect()
    }

    /// Iterates non-empty groups in draw order.
    pub fn iter(&self) -> impl Iterator<Item = (RenderGroup, &[RenderEntry])> + '_ {
        RenderGroup::ALL
            .into_iter()
            .map(|g| (g, self.group(g)))
            .filter(|(_, entries)| !entries.is_empty())
    }

    /// Total number of entries across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Returns `true` if every group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }

    /// Clears every group, keeping allocations.
    pub fn clear(&mut self) {
        for g in &mut self.groups {
            g.clear();
        }
    }
}
