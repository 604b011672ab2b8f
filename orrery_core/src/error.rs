// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! [`SceneError`] covers graph construction and mutation. Configuration bugs
//! such as a dangling parent name are reported here and are fatal to the
//! caller. [`ConfigError`] covers loading and validating [`SceneConfig`].
//! [`TimeOverflow`] is the recoverable signal a coordinate provider returns
//! when asked for a time outside its valid baseline.
//!
//! Stale [`NodeId`]s passed to [`NodeStore`] methods are programmer errors
//! and panic; the [`SceneGraph`] API reports them as
//! [`SceneError::StaleNode`] instead.
//!
//! [`SceneConfig`]: crate::config::SceneConfig
//! [`NodeStore`]: crate::node::NodeStore
//! [`SceneGraph`]: crate::scene::SceneGraph

use thiserror::Error;

use crate::node::NodeId;
use crate::time::SimTime;

/// Errors raised while building or mutating a scene graph.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A node declared a parent name that is not in the name index.
    #[error("parent `{parent}` of node `{node}` not found")]
    ParentNotFound {
        /// Canonical name of the orphaned node.
        node: String,
        /// The parent name that failed to resolve.
        parent: String,
    },
    /// Declared parents inside one batch form a loop.
    #[error("node `{node}` is its own ancestor")]
    ParentCycle {
        /// Canonical name of a node on the loop.
        node: String,
    },
    /// A coordinate transform name is not registered.
    #[error("unknown coordinate transform `{0}`")]
    UnknownTransform(String),
    /// The handle refers to a node that no longer exists.
    #[error("stale node handle {0:?}")]
    StaleNode(NodeId),
    /// The root node cannot be removed.
    #[error("the root node cannot be removed")]
    RootRemoval,
    /// The node is not a particle set.
    #[error("node {0:?} is not a particle set")]
    NotAParticleSet(NodeId),
    /// A particle index is outside the set.
    #[error("particle index {index} out of range for a set of {len}")]
    ParticleOutOfRange {
        /// The requested index.
        index: u32,
        /// Number of records in the set.
        len: usize,
    },
    /// No live node or record carries the name.
    #[error("no object named `{0}`")]
    NameNotFound(String),
    /// The node cannot currently be the camera focus.
    #[error("node {0:?} cannot be focused")]
    NotFocusable(NodeId),
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("failed to parse scene configuration")]
    Parse(#[from] serde_json::Error),
    /// Level-of-detail thresholds are not ordered.
    #[error("invalid level-of-detail thresholds for {kind}: {reason}")]
    Thresholds {
        /// Which node kind the thresholds belong to.
        kind: &'static str,
        /// What is wrong with them.
        reason: &'static str,
    },
    /// A value that must be strictly positive is not.
    #[error("`{field}` must be positive, got {value}")]
    NonPositive {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A value that must not be negative is.
    #[error("`{field}` must not be negative, got {value}")]
    Negative {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// An ephemeris table needs at least two samples with increasing times.
    #[error("ephemeris table needs at least two samples with strictly increasing times")]
    Ephemeris,
    /// An orbit polyline needs at least two samples.
    #[error("an orbit needs at least two samples, got {0}")]
    OrbitSamples(usize),
}

/// A coordinate provider was queried outside its valid time range.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("{requested:?} is outside the provider baseline [{start:?}, {end:?}]")]
pub struct TimeOverflow {
    /// The time that was requested.
    pub requested: SimTime,
    /// First valid time.
    pub start: SimTime,
    /// Last valid time.
    pub end: SimTime,
}
