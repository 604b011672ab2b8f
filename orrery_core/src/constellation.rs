// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constellation figures.
//!
//! A constellation is a list of lines between catalog stars. Its geometry
//! depends on where those stars are this frame, so it is resolved after the
//! main traversal through the star-position index.

use glam::DVec3;

/// Lines between catalog stars.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Constellation {
    lines: Vec<[u32; 2]>,
    segments: Vec<[DVec3; 2]>,
}

impl Constellation {
    /// Creates a figure from pairs of catalog numbers.
    #[must_use]
    pub fn new(lines: impl IntoIterator<Item = [u32; 2]>) -> Self {
        Self {
            lines: lines.into_iter().collect(),
            segments: Vec::new(),
        }
    }

    /// Catalog number pairs.
    #[must_use]
    pub fn lines(&self) -> &[[u32; 2]] {
        &self.lines
    }

    /// Camera-relative segments resolved this frame.
    #[must_use]
    pub fn segments(&self) -> &[[DVec3; 2]] {
        &self.segments
    }

    /// Every catalog number the figure refers to.
    pub fn stars(&self) -> impl Iterator<Item = u32> + '_ {
        self.lines.iter().flatten().copied()
    }

    /// Rebuilds the segments, looking each star up with `position`.
    ///
    /// A line is dropped when either end is unknown. Returns the number of
    /// dropped lines.
    pub fn resolve(&mut self, mut position: impl FnMut(u32) -> Option<DVec3>) -> usize {
        self.segments.clear();
        let mut missing = 0;
        for &[a, b] in &self.lines {
            match (position(a), position(b)) {
                (Some(pa), Some(pb)) => self.segments.push([pa, pb]),
                _ => missing += 1,
            }
        }
        missing
    }
}
