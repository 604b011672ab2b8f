// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node payloads.
//!
//! Every node has the same core state in the [`NodeStore`](super::NodeStore).
//! What a node *draws* is selected by its [`NodeKind`]: the scene graph looks
//! at the tag during classification and dispatches to the matching collector.

use crate::constellation::Constellation;
use crate::lod::{LabelParams, LodThresholds};
use crate::orbit::OrbitState;
use crate::particles::ParticleSet;

/// Parameters of a model-backed body (planet, moon, spacecraft).
///
/// `None` fields fall back to the defaults in
/// [`SceneConfig`](crate::config::SceneConfig).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyParams {
    /// Level-of-detail thresholds.
    pub thresholds: Option<LodThresholds>,
    /// Label parameters.
    pub label: Option<LabelParams>,
}

/// Parameters of a single star.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StarParams {
    /// Catalog number, registered in the star-position index.
    pub hip: Option<u32>,
    /// Level-of-detail thresholds.
    pub thresholds: Option<LodThresholds>,
    /// Label parameters.
    pub label: Option<LabelParams>,
}

/// What a node is and what it draws.
#[derive(Debug, Default)]
pub enum NodeKind {
    /// Grouping node; draws nothing.
    #[default]
    Generic,
    /// Spatial partition wrapper. Its wrapped members are indexed when the
    /// graph is initialized and inserted as its children.
    OctreeWrapper,
    /// Model-backed body.
    Body(BodyParams),
    /// Point-like star.
    Star(StarParams),
    /// Large particle or star set with background-sorted draw order.
    ParticleSet(Box<ParticleSet>),
    /// Cached trajectory line.
    Orbit(Box<OrbitState>),
    /// Line figure between catalog stars.
    Constellation(Box<Constellation>),
}

impl NodeKind {
    /// Short name of the variant, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::OctreeWrapper => "octree",
            Self::Body(_) => "body",
            Self::Star(_) => "star",
            Self::ParticleSet(_) => "particle-set",
            Self::Orbit(_) => "orbit",
            Self::Constellation(_) => "constellation",
        }
    }

    /// Returns whether nodes of this kind can become the camera focus.
    #[must_use]
    pub fn is_focusable(&self) -> bool {
        matches!(self, Self::Body(_) | Self::Star(_) | Self::ParticleSet(_))
    }

    /// Catalog number of a single star.
    #[must_use]
    pub fn star_hip(&self) -> Option<u32> {
        match self {
            Self::Star(s) => s.hip,
            _ => None,
        }
    }

    /// Returns the particle set payload, if any.
    #[must_use]
    pub fn as_particle_set(&self) -> Option<&ParticleSet> {
        match self {
            Self::ParticleSet(set) => Some(set),
            _ => None,
        }
    }

    /// Returns the particle set payload mutably, if any.
    #[must_use]
    pub fn as_particle_set_mut(&mut self) -> Option<&mut ParticleSet> {
        match self {
            Self::ParticleSet(set) => Some(set),
            _ => None,
        }
    }

    /// Returns the orbit payload, if any.
    #[must_use]
    pub fn as_orbit(&self) -> Option<&OrbitState> {
        match self {
            Self::Orbit(orbit) => Some(orbit),
            _ => None,
        }
    }

    /// Returns the orbit payload mutably, if any.
    #[must_use]
    pub fn as_orbit_mut(&mut self) -> Option<&mut OrbitState> {
        match self {
            Self::Orbit(orbit) => Some(orbit),
            _ => None,
        }
    }

    /// Returns the constellation payload, if any.
    #[must_use]
    pub fn as_constellation(&self) -> Option<&Constellation> {
        match self {
            Self::Constellation(c) => Some(c),
            _ => None,
        }
    }
}
