// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plans and GPU mesh invalidation for orrery.
//!
//! This crate sits between [`orrery_core`]'s per-frame render lists and a
//! graphics backend. It defines:
//!
//! - [`RenderPlan`]: instance data for every render group of one frame
//! - [`PointInstance`], [`BillboardInstance`], [`ModelInstance`],
//!   [`LineVertex`]: `bytemuck`-castable GPU layouts
//! - [`MeshInvalidation`]: which particle set meshes are out of date
//! - [`MeshCache`] and [`MeshKey`]: backend-managed particle meshes
//! - [`Backend`] and [`present_frame`]: the contract a graphics backend
//!   implements, and the glue that drives it

#![cfg_attr(docsrs, feature(doc_cfg))]

mod backend;
mod instance;
mod invalidation;
mod plan;
mod resource;

pub use backend::{Backend, present_frame};
pub use instance::{BillboardInstance, LineVertex, ModelInstance, PointInstance};
pub use invalidation::MeshInvalidation;
pub use plan::{LabelItem, LineItem, LineKind, ModelItem, ParticleBatch, RenderPlan};
pub use resource::{MeshCache, MeshKey};
