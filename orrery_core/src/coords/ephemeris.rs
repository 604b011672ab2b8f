// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-sampled ephemerides.

use glam::DVec3;

use super::CoordinateProvider;
use crate::error::{ConfigError, TimeOverflow};
use crate::time::SimTime;

/// Positions sampled at increasing times, linearly interpolated between
/// samples.
///
/// Queries outside the first and last sample overflow.
#[derive(Clone, Debug, PartialEq)]
pub struct EphemerisTable {
    times: Vec<SimTime>,
    positions: Vec<DVec3>,
}

impl EphemerisTable {
    /// Builds a table from `(time, equatorial position)` samples.
    pub fn new(samples: impl IntoIterator<Item = (SimTime, DVec3)>) -> Result<Self, ConfigError> {
        let (times, positions): (Vec<_>, Vec<_>) = samples.into_iter().unzip();
        if times.len() < 2 || times.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(ConfigError::Ephemeris);
        }
        Ok(Self { times, positions })
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`; a table holds at least two samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    fn first(&self) -> SimTime {
        self.times[0]
    }

    fn last(&self) -> SimTime {
        self.times[self.times.len() - 1]
    }
}

impl CoordinateProvider for EphemerisTable {
    fn equatorial_cartesian_at(&self, time: SimTime) -> Result<DVec3, TimeOverflow> {
        let (start, end) = (self.first(), self.last());
        if time < start || time > end {
            return Err(TimeOverflow {
                requested: time,
                start,
                end,
            });
        }
        // Index of the first sample strictly after `time`, clamped so that
        // `time == end` interpolates within the last segment.
        let hi = self
            .times
            .partition_point(|t| *t <= time)
            .clamp(1, self.times.len() - 1);
        let lo = hi - 1;
        let span = self.times[hi] - self.times[lo];
        let s = (time - self.times[lo]) / span;
        Ok(self.positions[lo].lerp(self.positions[hi], s))
    }

    fn baseline(&self) -> Option<(SimTime, SimTime)> {
        Some((self.first(), self.last()))
    }
}
