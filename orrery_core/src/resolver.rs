// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node temporal position resolution.
//!
//! A [`PositionResolver`] wraps a shared [`CoordinateProvider`] and an
//! optional [`ProperMotion`]. Each frame, [`resolve`](PositionResolver::resolve)
//! decides whether the provider needs to be queried at all:
//!
//! - If the simulation time did not move since the previous frame and the
//!   caller does not `force`, nothing happens ([`ResolveOutcome::Skipped`]).
//!   Ephemerides are expensive, and distance and angle values downstream are
//!   recomputed every frame regardless.
//! - Otherwise the provider is queried. Proper motion, if present, is added
//!   on top of the reference-epoch position.
//! - If the provider reports [`TimeOverflow`], the node's position is left
//!   untouched and the resolver enters the overflow state until a later
//!   query succeeds.
//!
//! A resolver that has never produced a position always queries, so newly
//! inserted nodes are placed on their first frame.

use std::sync::Arc;

use glam::DVec3;

use crate::coords::{CoordinateProvider, Spherical};
use crate::error::TimeOverflow;
use crate::time::{FrameTime, SimTime};

/// Constant linear drift of a point-like body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProperMotion {
    /// Velocity in length units per Julian year.
    pub velocity: DVec3,
    /// Epoch at which the provider position is valid.
    pub epoch: SimTime,
}

impl ProperMotion {
    /// Creates a proper motion.
    #[must_use]
    pub const fn new(velocity: DVec3, epoch: SimTime) -> Self {
        Self { velocity, epoch }
    }

    /// Returns the displacement after `years` Julian years.
    #[inline]
    #[must_use]
    pub fn displacement(&self, years: f64) -> DVec3 {
        self.velocity * years
    }

    /// Returns the displacement accumulated between the epoch and `time`.
    #[inline]
    #[must_use]
    pub fn displacement_at(&self, time: SimTime) -> DVec3 {
        self.displacement(time.years_since(self.epoch))
    }
}

/// What a call to [`PositionResolver::resolve`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolveOutcome {
    /// Time did not change; the provider was not queried.
    Skipped,
    /// A new position was written.
    Updated,
    /// The provider could not produce a position for this time.
    Overflow,
}

/// Resolves a node's parent-relative position from simulation time.
#[derive(Clone, Debug)]
pub struct PositionResolver {
    provider: Arc<dyn CoordinateProvider>,
    proper_motion: Option<ProperMotion>,
    resolved: bool,
    overflow: bool,
    spherical: Spherical,
}

impl PositionResolver {
    /// Creates a resolver for `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn CoordinateProvider>) -> Self {
        Self {
            provider,
            proper_motion: None,
            resolved: false,
            overflow: false,
            spherical: Spherical::default(),
        }
    }

    /// Convenience for wrapping a concrete provider.
    #[must_use]
    pub fn from_provider(provider: impl CoordinateProvider + 'static) -> Self {
        Self::new(Arc::new(provider))
    }

    /// Returns a copy that adds `pm` to every resolved position.
    #[must_use]
    pub fn with_proper_motion(mut self, pm: ProperMotion) -> Self {
        self.proper_motion = Some(pm);
        self
    }

    /// Returns the shared provider.
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn CoordinateProvider> {
        &self.provider
    }

    /// Returns the proper motion, if any.
    #[must_use]
    pub fn proper_motion(&self) -> Option<&ProperMotion> {
        self.proper_motion.as_ref()
    }

    /// Returns whether the last query overflowed.
    #[must_use]
    pub fn is_overflow(&self) -> bool {
        self.overflow
    }

    /// Spherical coordinates of the last resolved position.
    #[must_use]
    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    /// Evaluates the position at `time` without touching any state.
    pub fn position_at(&self, time: SimTime) -> Result<DVec3, TimeOverflow> {
        let base = self.provider.equatorial_cartesian_at(time)?;
        Ok(match &self.proper_motion {
            Some(pm) => base + pm.displacement_at(time),
            None => base,
        })
    }

    /// Resolves the position for this frame into `pos`.
    ///
    /// Only `pos` and the resolver's own state are written.
    pub fn resolve(&mut self, time: &FrameTime, force: bool, pos: &mut DVec3) -> ResolveOutcome {
        if self.resolved && !force && !time.sim_changed() {
            return ResolveOutcome::Skipped;
        }
        match self.position_at(time.sim) {
            Ok(p) => {
                *pos = p;
                self.resolved = true;
                self.overflow = false;
                self.spherical = Spherical::from_cartesian(p);
                ResolveOutcome::Updated
            }
            Err(_) => {
                self.resolved = true;
                self.overflow = true;
                ResolveOutcome::Overflow
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::coords::{EphemerisTable, StaticCoordinates};
    use crate::time::DAYS_PER_YEAR;

    #[derive(Debug, Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl CoordinateProvider for CountingProvider {
        fn equatorial_cartesian_at(&self, time: SimTime) -> Result<DVec3, TimeOverflow> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(DVec3::new(time.days_since(SimTime::J2000), 0.0, 0.0))
        }
    }

    #[test]
    fn unchanged_time_skips_provider() {
        let provider = Arc::new(CountingProvider::default());
        let mut r = PositionResolver::new(provider.clone());
        let mut pos = DVec3::ZERO;
        let f0 = FrameTime::start(SimTime::J2000 + 3.0, 0);

        assert_eq!(r.resolve(&f0, false, &mut pos), ResolveOutcome::Updated);
        assert_eq!(pos, DVec3::new(3.0, 0.0, 0.0));

        let f1 = f0.advance(f0.sim, 16);
        assert_eq!(r.resolve(&f1, false, &mut pos), ResolveOutcome::Skipped);
        assert_eq!(r.resolve(&f1, false, &mut pos), ResolveOutcome::Skipped);
        assert_eq!(pos, DVec3::new(3.0, 0.0, 0.0));
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn force_always_queries() {
        let provider = Arc::new(CountingProvider::default());
        let mut r = PositionResolver::new(provider.clone());
        let mut pos = DVec3::ZERO;
        let f = FrameTime::start(SimTime::J2000, 0);
        for _ in 0..3 {
            assert_eq!(r.resolve(&f, true, &mut pos), ResolveOutcome::Updated);
        }
        assert_eq!(provider.calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn overflow_keeps_position_and_clears() {
        let table = EphemerisTable::new([
            (SimTime::J2000, DVec3::ZERO),
            (SimTime::J2000 + 10.0, DVec3::new(10.0, 0.0, 0.0)),
        ])
        .unwrap();
        let mut r = PositionResolver::from_provider(table);
        let mut pos = DVec3::ZERO;

        let f0 = FrameTime::start(SimTime::J2000 + 4.0, 0);
        assert_eq!(r.resolve(&f0, false, &mut pos), ResolveOutcome::Updated);
        assert_eq!(pos, DVec3::new(4.0, 0.0, 0.0));

        let f1 = f0.advance(SimTime::J2000 + 50.0, 16);
        assert_eq!(r.resolve(&f1, false, &mut pos), ResolveOutcome::Overflow);
        assert!(r.is_overflow());
        assert_eq!(pos, DVec3::new(4.0, 0.0, 0.0), "last known position kept");

        let f2 = f1.advance(SimTime::J2000 + 6.0, 32);
        assert_eq!(r.resolve(&f2, false, &mut pos), ResolveOutcome::Updated);
        assert!(!r.is_overflow());
        assert_eq!(pos, DVec3::new(6.0, 0.0, 0.0));
    }

    #[test]
    fn proper_motion_drifts_from_epoch() {
        let pm = ProperMotion::new(DVec3::new(0.0, 2.0, 0.0), SimTime::J2000);
        let mut r = PositionResolver::from_provider(StaticCoordinates::new(DVec3::X))
            .with_proper_motion(pm);
        let mut pos = DVec3::ZERO;
        let f = FrameTime::start(SimTime::J2000 + 10.0 * DAYS_PER_YEAR, 0);
        r.resolve(&f, false, &mut pos);
        assert!((pos - DVec3::new(1.0, 20.0, 0.0)).length() < 1e-9);
        assert!((r.spherical().dist - pos.length()).abs() < 1e-12);
    }
}
