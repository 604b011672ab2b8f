// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Length units.
//!
//! All scene positions are expressed in kilometers.

/// Kilometers in one astronomical unit.
pub const AU_TO_KM: f64 = 1.495_978_707e8;

/// Kilometers in one parsec.
pub const PC_TO_KM: f64 = 3.085_677_581_491_367e13;

/// Kilometers in one light year.
pub const LY_TO_KM: f64 = 9.460_730_472_580_8e12;

/// Converts astronomical units to kilometers.
#[inline]
#[must_use]
pub fn au(v: f64) -> f64 {
    v * AU_TO_KM
}

/// Converts parsecs to kilometers.
#[inline]
#[must_use]
pub fn pc(v: f64) -> f64 {
    v * PC_TO_KM
}
