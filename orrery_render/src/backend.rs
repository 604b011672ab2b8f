// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for graphics integrations.
//!
//! A backend owns the graphics API. It provides:
//!
//! - **Mesh upload**: turns a particle set's records into GPU geometry and
//!   returns a [`MeshKey`] for it. The draw order is not part of the mesh;
//!   it changes with every applied sort and is read from
//!   [`ParticleSet::active`] when drawing.
//! - **Release**: frees a mesh that was invalidated.
//! - **Present**: draws a [`RenderPlan`].
//!
//! [`present_frame`] wires these together after each scene update.

use orrery_core::node::NodeId;
use orrery_core::particles::ParticleSet;
use orrery_core::scene::{FrameChanges, SceneGraph};
use tracing::debug;

use crate::invalidation::MeshInvalidation;
use crate::plan::RenderPlan;
use crate::resource::{MeshCache, MeshKey};

/// Draws render plans with a graphics API.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_frame(time: FrameTime) {
///     // Update: resolve positions, classify, schedule sorts
///     let changes = graph.update(&time, &camera);
///
///     // Present: refresh stale meshes and draw
///     present_frame(&graph, &changes, &mut plan, &mut meshes, &mut backend);
/// }
/// ```
pub trait Backend {
    /// Uploads the geometry of a particle set.
    fn upload_particles(&mut self, node: NodeId, set: &ParticleSet) -> MeshKey;

    /// Frees a mesh.
    fn release(&mut self, key: MeshKey);

    /// Draws one frame.
    fn present(&mut self, graph: &SceneGraph, plan: &RenderPlan, meshes: &MeshCache);
}

/// Releases invalidated meshes, rebuilds `plan`, uploads meshes for sets
/// that have none, and presents.
pub fn present_frame(
    graph: &SceneGraph,
    changes: &FrameChanges,
    plan: &mut RenderPlan,
    meshes: &mut MeshCache,
    backend: &mut dyn Backend,
) {
    for key in meshes.invalidate(&MeshInvalidation::from_changes(changes)) {
        backend.release(key);
    }
    plan.build(graph);
    for batch in &plan.particle_sets {
        if meshes.get(batch.node).is_some() {
            continue;
        }
        if let Some(set) = graph.store().kind(batch.node).as_particle_set() {
            let key = backend.upload_particles(batch.node, set);
            debug!(node = ?batch.node, ?key, records = set.len(), "particle mesh uploaded");
            meshes.insert(batch.node, key);
        }
    }
    backend.present(graph, plan, meshes);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::DVec3;
    use orrery_core::camera::FixedCamera;
    use orrery_core::config::SceneConfig;
    use orrery_core::node::{NodeDesc, NodeKind};
    use orrery_core::particles::{ParticleRecord, SetKind};
    use orrery_core::tasks::ManualExecutor;
    use orrery_core::time::{FrameTime, SimTime};

    use super::*;

    /// Records every call.
    #[derive(Debug, Default)]
    struct Recorder {
        next: u64,
        uploads: Vec<(NodeId, usize)>,
        released: Vec<MeshKey>,
        frames: usize,
        drawn_sets: usize,
    }

    impl Backend for Recorder {
        fn upload_particles(&mut self, node: NodeId, set: &ParticleSet) -> MeshKey {
            self.uploads.push((node, set.len()));
            self.next += 1;
            MeshKey(self.next)
        }

        fn release(&mut self, key: MeshKey) {
            self.released.push(key);
        }

        fn present(&mut self, _graph: &SceneGraph, plan: &RenderPlan, meshes: &MeshCache) {
            self.frames += 1;
            self.drawn_sets += plan
                .particle_sets
                .iter()
                .filter(|b| meshes.get(b.node).is_some())
                .count();
        }
    }

    #[test]
    fn meshes_upload_once_and_rebuild_on_invalidation() {
        let mut g = SceneGraph::new(SceneConfig::default()).with_executor(Arc::new(ManualExecutor::new()));
        let records = vec![ParticleRecord::new(DVec3::NEG_Z, 1.0); 5];
        let set = g
            .insert(
                NodeDesc::new("Cloud").with_kind(NodeKind::ParticleSet(Box::new(ParticleSet::new(
                    SetKind::Particles,
                    records,
                )))),
                true,
            )
            .unwrap();
        let camera = FixedCamera::new(DVec3::ZERO);
        let mut plan = RenderPlan::new();
        let mut meshes = MeshCache::new();
        let mut backend = Recorder::default();
        let mut frame = |g: &mut SceneGraph, ms: u64, backend: &mut Recorder| {
            let changes = g.update(&FrameTime::start(SimTime::J2000, ms), &camera);
            present_frame(g, &changes, &mut plan, &mut meshes, backend);
        };

        frame(&mut g, 0, &mut backend);
        frame(&mut g, 16, &mut backend);
        assert_eq!(backend.uploads, [(set, 5)]);
        assert_eq!(backend.drawn_sets, 2);

        g.set_particle_visible(set, 0, false).unwrap();
        frame(&mut g, 32, &mut backend);
        assert_eq!(backend.released, [MeshKey(1)]);
        assert_eq!(backend.uploads.len(), 2, "rebuilt after invalidation");

        g.dispose_particle_set(set).unwrap();
        frame(&mut g, 48, &mut backend);
        assert_eq!(backend.released, [MeshKey(1), MeshKey(2)]);
        assert_eq!(backend.frames, 4);
    }
}
