// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame scratch storage.

/// Buffers reused by every update.
///
/// Cleared at the start of each frame and never shrunk, so a steady-state
/// update does not allocate.
#[derive(Debug, Default)]
pub(crate) struct FrameArena {
    /// Explicit stack for traversal rebuilds.
    pub(crate) stack: Vec<u32>,
    /// Particle sets that contributed to this frame.
    pub(crate) sets: Vec<u32>,
    /// Orbit nodes that contributed to this frame.
    pub(crate) orbits: Vec<u32>,
    /// Constellation nodes that contributed to this frame.
    pub(crate) constellations: Vec<u32>,
    /// Nodes whose overflow state flipped, with the new state.
    pub(crate) overflow_flips: Vec<(u32, bool)>,
}

impl FrameArena {
    pub(crate) fn reset(&mut self) {
        self.stack.clear();
        self.sets.clear();
        self.orbits.clear();
        self.constellations.clear();
        self.overflow_flips.clear();
    }
}
