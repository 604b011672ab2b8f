// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulation time and per-frame time context.
//!
//! [`SimTime`] is a point on the simulation timeline expressed as a Julian
//! date. It is what coordinate providers are queried with.
//!
//! [`FrameTime`] bundles everything one [`SceneGraph::update`] call needs to
//! know about time: the simulation time, how far the simulation advanced since
//! the previous frame, and the wall-clock milliseconds that drive visibility
//! fades and sort scheduling. Fades run on wall-clock time so that pausing the
//! simulation does not freeze a node half-faded.
//!
//! [`SceneGraph::update`]: crate::scene::SceneGraph::update

use core::fmt;
use core::ops::{Add, Sub};

/// Julian date of the J2000.0 epoch.
pub const J2000_JD: f64 = 2_451_545.0;

/// Julian date of the Unix epoch (1970-01-01T00:00:00Z).
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Length of a Julian year in days.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Milliseconds in one day.
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// A point on the simulation timeline, as a Julian date.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct SimTime(pub f64);

impl SimTime {
    /// The J2000.0 epoch.
    pub const J2000: Self = Self(J2000_JD);

    /// Creates a time from a Julian date.
    #[inline]
    #[must_use]
    pub const fn from_julian_date(jd: f64) -> Self {
        Self(jd)
    }

    /// Creates a time from milliseconds since the Unix epoch.
    #[inline]
    #[must_use]
    pub fn from_unix_millis(ms: i64) -> Self {
        Self(UNIX_EPOCH_JD + ms as f64 / MS_PER_DAY)
    }

    /// Returns the Julian date.
    #[inline]
    #[must_use]
    pub const fn julian_date(self) -> f64 {
        self.0
    }

    /// Returns the number of days from `epoch` to `self` (negative if
    /// `self` is earlier).
    #[inline]
    #[must_use]
    pub fn days_since(self, epoch: Self) -> f64 {
        self.0 - epoch.0
    }

    /// Returns the number of Julian years from `epoch` to `self`.
    #[inline]
    #[must_use]
    pub fn years_since(self, epoch: Self) -> f64 {
        self.days_since(epoch) / DAYS_PER_YEAR
    }

    /// Returns this time shifted by `days`.
    #[inline]
    #[must_use]
    pub fn add_days(self, days: f64) -> Self {
        Self(self.0 + days)
    }
}

impl Add<f64> for SimTime {
    type Output = Self;

    /// Adds a number of days.
    #[inline]
    fn add(self, days: f64) -> Self {
        self.add_days(days)
    }
}

impl Sub for SimTime {
    type Output = f64;

    /// Difference in days.
    #[inline]
    fn sub(self, rhs: Self) -> f64 {
        self.days_since(rhs)
    }
}

impl fmt::Debug for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimTime(JD {:.6})", self.0)
    }
}

/// Time context for a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    /// Simulation time of this frame.
    pub sim: SimTime,
    /// Simulation days elapsed since the previous frame. Zero when the
    /// simulation is paused.
    pub sim_delta_days: f64,
    /// Monotonic wall-clock milliseconds.
    pub wall_ms: u64,
}

impl FrameTime {
    /// Creates a frame time with an explicit simulation delta.
    #[must_use]
    pub const fn new(sim: SimTime, sim_delta_days: f64, wall_ms: u64) -> Self {
        Self {
            sim,
            sim_delta_days,
            wall_ms,
        }
    }

    /// Creates the first frame of a run, with no simulation delta.
    #[must_use]
    pub const fn start(sim: SimTime, wall_ms: u64) -> Self {
        Self::new(sim, 0.0, wall_ms)
    }

    /// Returns the next frame, deriving the simulation delta from `self`.
    #[must_use]
    pub fn advance(self, sim: SimTime, wall_ms: u64) -> Self {
        Self::new(sim, sim - self.sim, wall_ms)
    }

    /// Returns whether the simulation time moved since the previous frame.
    #[inline]
    #[must_use]
    pub fn sim_changed(&self) -> bool {
        self.sim_delta_days != 0.0
    }

    /// Returns the Julian years elapsed from `epoch` to this frame.
    #[inline]
    #[must_use]
    pub fn years_since(&self, epoch: SimTime) -> f64 {
        self.sim.years_since(epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_epoch_maps_to_known_julian_date() {
        assert_eq!(SimTime::from_unix_millis(0).julian_date(), UNIX_EPOCH_JD);
        // 2000-01-01T12:00:00Z
        let j2000 = SimTime::from_unix_millis(946_728_000_000);
        assert!((j2000.julian_date() - J2000_JD).abs() < 1e-9);
    }

    #[test]
    fn years_since_uses_julian_years() {
        let t = SimTime::J2000.add_days(DAYS_PER_YEAR * 2.0);
        assert!((t.years_since(SimTime::J2000) - 2.0).abs() < 1e-12);
        assert!((SimTime::J2000.years_since(t) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn advance_computes_delta() {
        let f0 = FrameTime::start(SimTime::J2000, 0);
        assert!(!f0.sim_changed());
        let f1 = f0.advance(SimTime::J2000 + 0.5, 16);
        assert_eq!(f1.sim_delta_days, 0.5);
        assert_eq!(f1.wall_ms, 16);
        assert!(f1.sim_changed());
        let f2 = f1.advance(f1.sim, 32);
        assert!(!f2.sim_changed(), "paused simulation has zero delta");
    }
}
