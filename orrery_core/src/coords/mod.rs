// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-dependent coordinate providers.
//!
//! A [`CoordinateProvider`] answers one question: where is this body,
//! relative to its parent and in equatorial cartesian coordinates, at a
//! given [`SimTime`]? Providers that only cover a limited baseline return
//! [`TimeOverflow`] outside it, which the
//! [`PositionResolver`](crate::resolver::PositionResolver) turns into the
//! per-node overflow state.
//!
//! Shipped providers:
//!
//! - [`StaticCoordinates`]: a fixed position.
//! - [`KeplerianElements`]: two-body orbital elements.
//! - [`EphemerisTable`]: linearly interpolated time samples.
//!
//! Named frame conversions live in [`TransformRegistry`].

mod ephemeris;
mod kepler;
mod transform;

use core::fmt;

use glam::DVec3;

pub use ephemeris::EphemerisTable;
pub use kepler::KeplerianElements;
pub use transform::{
    OBLIQUITY_J2000_RAD, TransformFn, TransformRegistry, ecliptic_to_equatorial,
    equatorial_to_ecliptic, equatorial_to_galactic, galactic_to_equatorial, identity,
};

use crate::error::TimeOverflow;
use crate::time::SimTime;

/// Source of a body's position as a function of simulation time.
///
/// Implementations must be cheap to share across threads: orbit refresh jobs
/// sample providers off the frame thread.
pub trait CoordinateProvider: fmt::Debug + Send + Sync {
    /// Returns the equatorial cartesian position relative to the parent at
    /// `time`, or [`TimeOverflow`] if `time` is outside the valid baseline.
    fn equatorial_cartesian_at(&self, time: SimTime) -> Result<DVec3, TimeOverflow>;

    /// Returns the valid time baseline, if the provider has one.
    fn baseline(&self) -> Option<(SimTime, SimTime)> {
        None
    }
}

/// A provider that always returns the same position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticCoordinates {
    /// Equatorial cartesian position.
    pub position: DVec3,
}

impl StaticCoordinates {
    /// Creates a provider for an equatorial position.
    #[must_use]
    pub const fn new(position: DVec3) -> Self {
        Self { position }
    }

    /// Creates a provider from a position in another frame, converting it
    /// once with `to_equatorial`.
    #[must_use]
    pub fn from_frame(position: DVec3, to_equatorial: TransformFn) -> Self {
        Self::new(to_equatorial(position))
    }
}

impl CoordinateProvider for StaticCoordinates {
    fn equatorial_cartesian_at(&self, _time: SimTime) -> Result<DVec3, TimeOverflow> {
        Ok(self.position)
    }
}

/// Spherical coordinates derived from a cartesian position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spherical {
    /// Longitude (right ascension in the equatorial frame), radians in
    /// `[0, 2π)`.
    pub lon: f64,
    /// Latitude (declination), radians in `[-π/2, π/2]`.
    pub lat: f64,
    /// Distance.
    pub dist: f64,
}

impl Spherical {
    /// Converts an equatorial cartesian vector.
    #[must_use]
    pub fn from_cartesian(v: DVec3) -> Self {
        let dist = v.length();
        if dist == 0.0 {
            return Self::default();
        }
        let lon = v.y.atan2(v.x).rem_euclid(core::f64::consts::TAU);
        let lat = (v.z / dist).clamp(-1.0, 1.0).asin();
        Self { lon, lat, dist }
    }
}
