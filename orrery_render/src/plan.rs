// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: backend-ready draw data for one frame.

use core::ops::Range;

use glam::DVec3;
use orrery_core::config::SceneConfig;
use orrery_core::lod::LabelParams;
use orrery_core::node::{NodeId, NodeKind, NodeStore};
use orrery_core::render_list::RenderGroup;
use orrery_core::scene::SceneGraph;
use tracing::trace;

use crate::instance::{BillboardInstance, LineVertex, ModelInstance, PointInstance, narrow};

/// A model to draw. Backends look the mesh up by node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelItem {
    /// The body the model belongs to.
    pub node: NodeId,
    /// Placement and opacity.
    pub instance: ModelInstance,
}

/// A text label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelItem {
    /// The labeled node.
    pub node: NodeId,
    /// Display name.
    pub text: String,
    /// Camera-relative anchor.
    pub position: [f32; 3],
    /// World-space text size.
    pub size: f32,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

/// What a line item depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Drift of a star over the configured number of years.
    ProperMotion,
    /// A sampled trajectory, drawn as a strip.
    Orbit,
    /// Constellation figure, drawn as a list of segments.
    Constellation,
}

/// A run of vertices in [`RenderPlan::line_vertices`].
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    /// The node the line belongs to.
    pub node: NodeId,
    /// What the line depicts.
    pub kind: LineKind,
    /// Vertex range.
    pub vertices: Range<usize>,
}

impl LineItem {
    /// Returns `true` if consecutive vertices are connected; otherwise
    /// vertices pair up into separate segments.
    #[must_use]
    pub fn is_strip(&self) -> bool {
        self.kind == LineKind::Orbit
    }
}

/// A particle set to draw in its current sorted order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleBatch {
    /// The set node. Its GPU geometry is cached under this handle.
    pub node: NodeId,
    /// Camera-relative position of the set origin.
    pub origin: [f32; 3],
    /// Julian years since the set epoch, for proper motion in the shader.
    pub years: f32,
    /// Set opacity in `[0, 1]`.
    pub opacity: f32,
    /// Number of records in the draw order.
    pub count: usize,
}

/// Everything a backend draws for one frame, in group order.
///
/// Built from the scene graph's render lists after
/// [`SceneGraph::update`]. Reuse one plan across frames; [`build`](Self::build)
/// keeps the allocations.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Point instances.
    pub points: Vec<PointInstance>,
    /// Billboard instances.
    pub billboards: Vec<BillboardInstance>,
    /// Models.
    pub models: Vec<ModelItem>,
    /// Labels.
    pub labels: Vec<LabelItem>,
    /// Line runs.
    pub lines: Vec<LineItem>,
    /// Vertices referenced by [`lines`](Self::lines).
    pub line_vertices: Vec<LineVertex>,
    /// Particle sets.
    pub particle_sets: Vec<ParticleBatch>,
}

impl RenderPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.points.clear();
        self.billboards.clear();
        self.models.clear();
        self.labels.clear();
        self.lines.clear();
        self.line_vertices.clear();
        self.particle_sets.clear();
    }

    /// Returns `true` if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
            && self.billboards.is_empty()
            && self.models.is_empty()
            && self.labels.is_empty()
            && self.lines.is_empty()
            && self.particle_sets.is_empty()
    }

    /// Rebuilds the plan from the graph's latest render lists.
    pub fn build(&mut self, graph: &SceneGraph) {
        self.clear();
        let store = graph.store();
        let lists = graph.render_lists();
        let config = graph.config();

        for entry in lists.group(RenderGroup::Point) {
            let i = entry.node;
            self.points.push(PointInstance::new(
                store.translation_at(i),
                store.size_at(i),
                entry.opacity,
            ));
        }
        for entry in lists.group(RenderGroup::Billboard) {
            let i = entry.node;
            self.billboards.push(BillboardInstance::new(
                store.translation_at(i),
                store.size_at(i),
                entry.opacity,
            ));
        }
        for entry in lists.group(RenderGroup::Model) {
            let Some(node) = store.id_at(entry.node) else {
                continue;
            };
            let i = entry.node;
            self.models.push(ModelItem {
                node,
                instance: ModelInstance::new(
                    store.translation_at(i),
                    store.size_at(i),
                    store.orientation_at(i),
                    entry.opacity,
                ),
            });
        }
        for entry in lists.group(RenderGroup::Label) {
            let Some(node) = store.id_at(entry.node) else {
                continue;
            };
            let params = label_params(store.kind(node), config);
            self.labels.push(LabelItem {
                node,
                text: store.display_name(node).to_owned(),
                position: store.translation(node).as_vec3().to_array(),
                size: narrow(params.size_at(store.dist(node))),
                opacity: narrow(entry.opacity),
            });
        }
        for entry in lists.group(RenderGroup::Line) {
            let Some(node) = store.id_at(entry.node) else {
                continue;
            };
            self.push_line(store, config, node, entry.opacity);
        }
        for entry in lists.group(RenderGroup::ParticleSet) {
            let Some(node) = store.id_at(entry.node) else {
                continue;
            };
            let Some(set) = store.kind(node).as_particle_set() else {
                continue;
            };
            let years = graph.time().map_or(0.0, |t| t.years_since(set.epoch()));
            self.particle_sets.push(ParticleBatch {
                node,
                origin: store.translation(node).as_vec3().to_array(),
                years: narrow(years),
                opacity: narrow(entry.opacity),
                count: set.active().len(),
            });
        }

        trace!(
            points = self.points.len(),
            billboards = self.billboards.len(),
            models = self.models.len(),
            labels = self.labels.len(),
            lines = self.lines.len(),
            particle_sets = self.particle_sets.len(),
            "render plan built"
        );
    }

    fn push_line(&mut self, store: &NodeStore, config: &SceneConfig, node: NodeId, opacity: f64) {
        let start = self.line_vertices.len();
        let vertex = |p: DVec3| LineVertex::new(p, opacity);
        let kind = match store.kind(node) {
            NodeKind::Star(_) => {
                let Some(pm) = store.resolver(node).and_then(|r| r.proper_motion()) else {
                    return;
                };
                let from = store.translation(node);
                let to = from + pm.velocity * config.pm_line_factor;
                self.line_vertices.extend([vertex(from), vertex(to)]);
                LineKind::ProperMotion
            }
            NodeKind::Orbit(orbit) => {
                if orbit.samples().len() < 2 {
                    return;
                }
                let base = store
                    .parent(node)
                    .map_or(store.translation(node), |p| store.translation(p));
                self.line_vertices
                    .extend(orbit.samples().iter().map(|&s| vertex(base + s)));
                LineKind::Orbit
            }
            NodeKind::Constellation(figure) => {
                if figure.segments().is_empty() {
                    return;
                }
                self.line_vertices
                    .extend(figure.segments().iter().flatten().map(|&p| vertex(p)));
                LineKind::Constellation
            }
            _ => return,
        };
        self.lines.push(LineItem {
            node,
            kind,
            vertices: start..self.line_vertices.len(),
        });
    }
}

/// Label parameters of a node: its own, or the configured default.
fn label_params(kind: &NodeKind, config: &SceneConfig) -> LabelParams {
    match kind {
        NodeKind::Star(star) => star.label.unwrap_or(config.star_label),
        NodeKind::Body(body) => body.label.unwrap_or(config.body_label),
        _ => config.body_label,
    }
}
