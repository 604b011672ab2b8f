// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-body Keplerian orbits.

use core::f64::consts::TAU;

use glam::{DQuat, DVec3};

use super::CoordinateProvider;
use super::transform::{TransformFn, identity};
use crate::error::TimeOverflow;
use crate::time::SimTime;

/// Newton iterations are stopped once the correction falls below this.
const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITERATIONS: usize = 32;

/// Classical orbital elements of an elliptic orbit.
///
/// Angles are in degrees. Positions are produced in the element frame
/// (usually ecliptic) and then converted with the configured
/// [`TransformFn`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeplerianElements {
    /// Reference epoch of `mean_anomaly_deg`.
    pub epoch: SimTime,
    /// Orbital period in days.
    pub period_days: f64,
    /// Semi-major axis.
    pub semi_major_axis: f64,
    /// Eccentricity, in `[0, 1)`.
    pub eccentricity: f64,
    /// Inclination.
    pub inclination_deg: f64,
    /// Longitude of the ascending node.
    pub ascending_node_deg: f64,
    /// Argument of pericenter.
    pub arg_of_pericenter_deg: f64,
    /// Mean anomaly at `epoch`.
    pub mean_anomaly_deg: f64,
    /// Optional validity window; outside it the provider overflows.
    pub validity: Option<(SimTime, SimTime)>,
    /// Conversion from the element frame to equatorial.
    pub to_equatorial: TransformFn,
}

impl KeplerianElements {
    /// Creates a circular, uninclined orbit in the equatorial frame.
    #[must_use]
    pub fn circular(epoch: SimTime, period_days: f64, semi_major_axis: f64) -> Self {
        Self {
            epoch,
            period_days,
            semi_major_axis,
            eccentricity: 0.0,
            inclination_deg: 0.0,
            ascending_node_deg: 0.0,
            arg_of_pericenter_deg: 0.0,
            mean_anomaly_deg: 0.0,
            validity: None,
            to_equatorial: identity,
        }
    }

    /// Returns a copy with the given validity window.
    #[must_use]
    pub fn with_validity(mut self, start: SimTime, end: SimTime) -> Self {
        self.validity = Some((start, end));
        self
    }

    /// Returns a copy with the given frame conversion.
    #[must_use]
    pub fn with_transform(mut self, to_equatorial: TransformFn) -> Self {
        self.to_equatorial = to_equatorial;
        self
    }

    /// Mean anomaly at `time`, in radians within `[0, 2π)`.
    #[must_use]
    pub fn mean_anomaly_at(&self, time: SimTime) -> f64 {
        let n = TAU / self.period_days;
        (self.mean_anomaly_deg.to_radians() + n * time.days_since(self.epoch)).rem_euclid(TAU)
    }

    /// Position in the element frame at `time`, ignoring validity.
    #[must_use]
    pub fn position_in_frame(&self, time: SimTime) -> DVec3 {
        let e = self.eccentricity;
        let a = self.semi_major_axis;
        let big_e = solve_kepler(self.mean_anomaly_at(time), e);
        let in_plane = DVec3::new(
            a * (big_e.cos() - e),
            a * (1.0 - e * e).sqrt() * big_e.sin(),
            0.0,
        );
        let rotation = DQuat::from_rotation_z(self.ascending_node_deg.to_radians())
            * DQuat::from_rotation_x(self.inclination_deg.to_radians())
            * DQuat::from_rotation_z(self.arg_of_pericenter_deg.to_radians());
        rotation * in_plane
    }
}

impl CoordinateProvider for KeplerianElements {
    fn equatorial_cartesian_at(&self, time: SimTime) -> Result<DVec3, TimeOverflow> {
        if let Some((start, end)) = self.validity {
            if time < start || time > end {
                return Err(TimeOverflow {
                    requested: time,
                    start,
                    end,
                });
            }
        }
        Ok((self.to_equatorial)(self.position_in_frame(time)))
    }

    fn baseline(&self) -> Option<(SimTime, SimTime)> {
        self.validity
    }
}

/// Solves `M = E - e sin E` for the eccentric anomaly `E`.
fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let mut big_e = if e < 0.8 { mean_anomaly } else { core::f64::consts::PI };
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let delta = (big_e - e * big_e.sin() - mean_anomaly) / (1.0 - e * big_e.cos());
        big_e -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    big_e
}
