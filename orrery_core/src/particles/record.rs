// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Particle records.

use glam::DVec3;

/// One element of a particle or star set.
///
/// Positions are relative to the set node and valid at the set's epoch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleRecord {
    /// Position at the set epoch.
    pub pos: DVec3,
    /// Drift per Julian year. Zero for static particles.
    pub proper_motion: DVec3,
    /// Diameter, or the brightness-derived pseudo-size for stars.
    pub size: f64,
    /// Apparent magnitude.
    pub magnitude: f32,
    /// Catalog number, registered in the star-position index.
    pub hip: Option<u32>,
}

impl ParticleRecord {
    /// A static record at `pos`.
    #[must_use]
    pub const fn new(pos: DVec3, size: f64) -> Self {
        Self {
            pos,
            proper_motion: DVec3::ZERO,
            size,
            magnitude: 0.0,
            hip: None,
        }
    }

    /// Sets the proper motion.
    #[must_use]
    pub const fn with_proper_motion(mut self, pm: DVec3) -> Self {
        self.proper_motion = pm;
        self
    }

    /// Sets the apparent magnitude.
    #[must_use]
    pub const fn with_magnitude(mut self, magnitude: f32) -> Self {
        self.magnitude = magnitude;
        self
    }

    /// Sets the catalog number.
    #[must_use]
    pub const fn with_hip(mut self, hip: u32) -> Self {
        self.hip = Some(hip);
        self
    }

    /// Position `years` Julian years after the set epoch.
    #[inline]
    #[must_use]
    pub fn position_at(&self, years: f64) -> DVec3 {
        self.pos + self.proper_motion * years
    }
}
