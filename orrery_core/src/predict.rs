// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Predicting where a node will be.
//!
//! Camera tracking and scripted flights need a node's absolute position at a
//! time other than the current frame. [`NodeSnapshot`] captures the node's
//! ancestor chain once; [`predict`] then evaluates it at any time without
//! touching the live graph. A snapshot is not a node: it cannot be inserted
//! into a graph and never appears in the indices.

use glam::DVec3;

use crate::node::NodeId;
use crate::resolver::PositionResolver;
use crate::time::SimTime;

/// One ancestor (or the node itself) in a snapshot chain.
#[derive(Clone, Debug)]
pub struct ChainLink {
    /// Parent-relative position at capture time.
    pub pos: DVec3,
    /// Resolver to evaluate at the requested time, if the node has one.
    pub resolver: Option<PositionResolver>,
}

/// Immutable copy of everything needed to position one node.
#[derive(Clone, Debug)]
pub struct NodeSnapshot {
    node: NodeId,
    size: f64,
    chain: Vec<ChainLink>,
}

impl NodeSnapshot {
    /// Builds a snapshot from links ordered from the root down to the node.
    #[must_use]
    pub fn new(node: NodeId, size: f64, chain: Vec<ChainLink>) -> Self {
        Self { node, size, chain }
    }

    /// The node the snapshot was taken of.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Diameter at capture time.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Links from the root down to the node.
    #[must_use]
    pub fn chain(&self) -> &[ChainLink] {
        &self.chain
    }
}

/// Absolute position of the snapshot's node at `time`.
///
/// Each link contributes its resolved position, or its captured position if
/// it has no resolver or the resolver overflows at `time`.
#[must_use]
pub fn predict(snapshot: &NodeSnapshot, time: SimTime) -> DVec3 {
    snapshot
        .chain
        .iter()
        .map(|link| match &link.resolver {
            Some(r) => r.position_at(time).unwrap_or(link.pos),
            None => link.pos,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{KeplerianElements, StaticCoordinates};
    use crate::node::INVALID;

    fn id() -> NodeId {
        NodeId {
            idx: 3,
            generation: 0,
        }
    }

    #[test]
    fn sums_the_chain() {
        let snap = NodeSnapshot::new(
            id(),
            1.0,
            vec![
                ChainLink {
                    pos: DVec3::X,
                    resolver: None,
                },
                ChainLink {
                    pos: DVec3::ZERO,
                    resolver: Some(PositionResolver::from_provider(StaticCoordinates::new(
                        DVec3::Y,
                    ))),
                },
            ],
        );
        assert_eq!(predict(&snap, SimTime::J2000), DVec3::new(1.0, 1.0, 0.0));
        assert_ne!(snap.node().index(), INVALID);
    }

    #[test]
    fn follows_time_and_falls_back_on_overflow() {
        let elements = KeplerianElements::circular(SimTime::J2000, 4.0, 2.0)
            .with_validity(SimTime::J2000, SimTime::J2000 + 10.0);
        let snap = NodeSnapshot::new(
            id(),
            1.0,
            vec![ChainLink {
                pos: DVec3::new(7.0, 0.0, 0.0),
                resolver: Some(PositionResolver::from_provider(elements)),
            }],
        );
        let quarter = predict(&snap, SimTime::J2000 + 1.0);
        assert!((quarter - DVec3::new(0.0, 2.0, 0.0)).length() < 1e-9);
        assert_eq!(predict(&snap, SimTime::J2000 + 11.0), DVec3::new(7.0, 0.0, 0.0));
    }
}
