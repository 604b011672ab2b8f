// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lookups and hit-testing.

use glam::DVec3;
use kurbo::Point;

use super::graph::SceneGraph;
use crate::camera::Camera;
use crate::index::StarHandle;
use crate::node::{NodeId, NodeKind};
use crate::particles::ParticleSet;
use crate::render_list::RenderGroup;

/// Result of [`SceneGraph::pick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    /// The node hit. For a particle set, the set node.
    pub node: NodeId,
    /// Record index when a member of a particle set was hit.
    pub particle: Option<u32>,
    /// Raw view angle of the hit object.
    pub angle: f64,
}

impl SceneGraph {
    /// Looks a node up by any of its names or its numeric id.
    ///
    /// Names that belong to particle set members resolve to the set.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.index
            .get(name)
            .map(|e| e.node)
            .filter(|&n| self.store.is_alive(n))
    }

    /// Focusable names matching `query`: prefix matches first, then
    /// substring matches, at most `max_results` in total.
    #[must_use]
    pub fn matching_focusable_nodes(&self, query: &str, max_results: usize) -> Vec<String> {
        self.index
            .matching_focusable(query, max_results, |n| self.store.is_alive(n))
    }

    /// Absolute position (relative to the root) of a named node or particle
    /// set member, from the last resolved parent-relative positions.
    #[must_use]
    pub fn get_absolute_position(&self, name: &str) -> Option<DVec3> {
        let entry = self.index.get(name)?;
        if !self.store.is_alive(entry.node) {
            return None;
        }
        let base = self.absolute_position(entry.node);
        match entry.particle {
            None => Some(base),
            Some(index) => Some(base + self.member_offset(entry.node, index)?),
        }
    }

    /// Absolute position of a catalog star.
    #[must_use]
    pub fn star_position(&self, hip: u32) -> Option<DVec3> {
        match self.index.star(hip)? {
            StarHandle::Node(node) => self
                .store
                .is_alive(node)
                .then(|| self.absolute_position(node)),
            StarHandle::Record { set, index } => {
                if !self.store.is_alive(set) {
                    return None;
                }
                Some(self.absolute_position(set) + self.member_offset(set, index)?)
            }
        }
    }

    /// Sum of parent-relative positions from the root down to `id`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn absolute_position(&self, id: NodeId) -> DVec3 {
        let mut pos = self.store.pos(id);
        let mut cur = self.store.parent(id);
        while let Some(p) = cur {
            pos += self.store.pos(p);
            cur = self.store.parent(p);
        }
        pos
    }

    /// Finds the object under the screen point `point`.
    ///
    /// Considers what the last update drew: bodies and stars whose projected
    /// center lies within `tolerance` pixels, and the visible members of
    /// drawn particle sets. Nodes whose coordinates overflowed are never hit.
    /// The object with the largest view angle wins; ties go to the lower
    /// slot, then the lower record index.
    #[must_use]
    pub fn pick(&self, camera: &dyn Camera, point: Point, tolerance: f64) -> Option<PickHit> {
        let mut best: Option<PickHit> = None;
        let mut consider = |hit: PickHit| {
            let better = best.is_none_or(|b| {
                hit.angle > b.angle
                    || (hit.angle == b.angle
                        && (hit.node.idx, hit.particle) < (b.node.idx, b.particle))
            });
            if better {
                best = Some(hit);
            }
        };

        for group in [RenderGroup::Point, RenderGroup::Billboard, RenderGroup::Model] {
            for entry in self.lists.group(group) {
                let Some(node) = self.store.id_at(entry.node) else {
                    continue;
                };
                if self.store.is_overflow(node) || !self.store.kind(node).is_focusable() {
                    continue;
                }
                let Some(screen) = camera.project(self.store.translation(node)) else {
                    continue;
                };
                if screen.distance(point) <= tolerance {
                    consider(PickHit {
                        node,
                        particle: None,
                        angle: self.store.view_angle(node),
                    });
                }
            }
        }

        for entry in self.lists.group(RenderGroup::ParticleSet) {
            let Some(node) = self.store.id_at(entry.node) else {
                continue;
            };
            if self.store.is_overflow(node) {
                continue;
            }
            let NodeKind::ParticleSet(set) = self.store.kind(node) else {
                continue;
            };
            let years = self.set_years(set);
            let origin = self.store.translation(node);
            if let Some(hit) = set.pick(camera, origin, years, point, tolerance) {
                consider(PickHit {
                    node,
                    particle: Some(hit.index),
                    angle: hit.angle,
                });
            }
        }
        best
    }

    /// Julian years between a set's epoch and the current frame.
    pub(super) fn set_years(&self, set: &ParticleSet) -> f64 {
        self.time.map_or(0.0, |t| t.years_since(set.epoch()))
    }

    fn member_offset(&self, set: NodeId, index: u32) -> Option<DVec3> {
        let set = self.store.kind(set).as_particle_set()?;
        set.position_of(index, self.set_years(set))
    }
}
