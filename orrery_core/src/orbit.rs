// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cached orbit trajectories.
//!
//! An orbit node draws the path of a body as a polyline sampled from the
//! body's coordinate provider over one period centered on the current time.
//! Sampling happens off the frame thread. When simulation time leaves the
//! sampled window the graph schedules one [`OrbitJob`] and keeps drawing the
//! old samples until the new ones land.

use std::sync::Arc;

use glam::DVec3;

use crate::coords::CoordinateProvider;
use crate::error::ConfigError;
use crate::time::SimTime;

/// Trajectory cache of an orbit node.
#[derive(Clone, Debug)]
pub struct OrbitState {
    provider: Arc<dyn CoordinateProvider>,
    period_days: f64,
    sample_count: usize,
    samples: Vec<DVec3>,
    window: Option<(SimTime, SimTime)>,
    refreshing: bool,
    refreshes: u64,
}

impl OrbitState {
    /// Creates an empty cache that samples `provider` at `sample_count`
    /// points over `period_days`.
    pub fn new(
        provider: Arc<dyn CoordinateProvider>,
        period_days: f64,
        sample_count: usize,
    ) -> Result<Self, ConfigError> {
        if period_days.is_nan() || period_days <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "period_days",
                value: period_days,
            });
        }
        if sample_count < 2 {
            return Err(ConfigError::OrbitSamples(sample_count));
        }
        Ok(Self {
            provider,
            period_days,
            sample_count,
            samples: Vec::new(),
            window: None,
            refreshing: false,
            refreshes: 0,
        })
    }

    /// Samples in parent-relative coordinates.
    #[must_use]
    pub fn samples(&self) -> &[DVec3] {
        &self.samples
    }

    /// Time window covered by [`samples`](Self::samples).
    #[must_use]
    pub fn window(&self) -> Option<(SimTime, SimTime)> {
        self.window
    }

    /// Returns whether a refresh job is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Number of refreshes applied so far.
    #[must_use]
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    /// Returns whether `time` is outside the sampled window and no refresh
    /// is in flight.
    #[must_use]
    pub fn needs_refresh(&self, time: SimTime) -> bool {
        !self.refreshing
            && self
                .window
                .is_none_or(|(start, end)| time < start || time > end)
    }

    /// Starts a refresh centered on `time`. Returns `None` if one is already
    /// in flight.
    pub fn begin_refresh(&mut self, time: SimTime) -> Option<OrbitJob> {
        if self.refreshing {
            return None;
        }
        self.refreshing = true;
        let half = self.period_days / 2.0;
        Some(OrbitJob {
            provider: Arc::clone(&self.provider),
            start: time.add_days(-half),
            end: time.add_days(half),
            count: self.sample_count,
        })
    }

    /// Installs finished samples.
    pub fn complete(&mut self, samples: OrbitSamples) {
        self.samples = samples.points;
        self.window = Some((samples.start, samples.end));
        self.refreshing = false;
        self.refreshes += 1;
    }
}

/// A trajectory sampling ready to run off the frame thread.
#[derive(Clone, Debug)]
pub struct OrbitJob {
    provider: Arc<dyn CoordinateProvider>,
    start: SimTime,
    end: SimTime,
    count: usize,
}

/// The result of an [`OrbitJob`].
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitSamples {
    /// Sampled positions. Times the provider cannot resolve are left out.
    pub points: Vec<DVec3>,
    /// First sampled time.
    pub start: SimTime,
    /// Last sampled time.
    pub end: SimTime,
}

impl OrbitJob {
    /// Samples the provider evenly across the window, endpoints included.
    #[must_use]
    pub fn run(self) -> OrbitSamples {
        let span = self.end.days_since(self.start);
        let steps = (self.count - 1) as f64;
        let points = (0..self.count)
            .filter_map(|i| {
                let t = self.start.add_days(span * i as f64 / steps);
                self.provider.equatorial_cartesian_at(t).ok()
            })
            .collect();
        OrbitSamples {
            points,
            start: self.start,
            end: self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::KeplerianElements;

    fn circular() -> OrbitState {
        let elements = KeplerianElements::circular(SimTime::J2000, 100.0, 10.0);
        OrbitState::new(Arc::new(elements), 100.0, 65).unwrap()
    }

    #[test]
    fn empty_orbit_needs_refresh_once() {
        let mut orbit = circular();
        assert!(orbit.needs_refresh(SimTime::J2000));
        let job = orbit.begin_refresh(SimTime::J2000).unwrap();
        assert!(!orbit.needs_refresh(SimTime::J2000), "in flight");
        assert!(orbit.begin_refresh(SimTime::J2000).is_none());

        orbit.complete(job.run());
        assert_eq!(orbit.samples().len(), 65);
        assert!(!orbit.needs_refresh(SimTime::J2000 + 49.0));
        assert!(orbit.needs_refresh(SimTime::J2000 + 51.0));
        assert_eq!(orbit.refreshes(), 1);
    }

    #[test]
    fn samples_lie_on_the_orbit() {
        let mut orbit = circular();
        let job = orbit.begin_refresh(SimTime::J2000).unwrap();
        orbit.complete(job.run());
        for p in orbit.samples() {
            assert!((p.length() - 10.0).abs() < 1e-9, "radius {}", p.length());
        }
        let (start, end) = orbit.window().unwrap();
        assert!((end.days_since(start) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn overflowed_samples_are_skipped() {
        let elements = KeplerianElements::circular(SimTime::J2000, 100.0, 10.0)
            .with_validity(SimTime::J2000, SimTime::J2000 + 1000.0);
        let mut orbit = OrbitState::new(Arc::new(elements), 100.0, 11).unwrap();
        let samples = orbit.begin_refresh(SimTime::J2000).unwrap().run();
        // The first half of the window precedes the validity start.
        assert_eq!(samples.points.len(), 6);
    }

    #[test]
    fn degenerate_orbits_are_rejected() {
        let elements = Arc::new(KeplerianElements::circular(SimTime::J2000, 100.0, 10.0));
        assert!(matches!(
            OrbitState::new(elements.clone(), 0.0, 16),
            Err(ConfigError::NonPositive { field: "period_days", .. })
        ));
        assert!(matches!(
            OrbitState::new(elements.clone(), f64::NAN, 16),
            Err(ConfigError::NonPositive { .. })
        ));
        assert!(matches!(
            OrbitState::new(elements.clone(), 100.0, 1),
            Err(ConfigError::OrbitSamples(1))
        ));
        assert!(OrbitState::new(elements, 100.0, 2).is_ok());
    }
}
