// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named reference-frame conversions.

use std::collections::HashMap;
use std::fmt;

use glam::{DMat3, DQuat, DVec3};

use crate::error::SceneError;

/// A conversion between two reference frames.
pub type TransformFn = fn(DVec3) -> DVec3;

/// Mean obliquity of the ecliptic at J2000.0, in radians.
pub const OBLIQUITY_J2000_RAD: f64 = 0.409_092_804_222_328_7;

/// Galactic to equatorial (ICRS) rotation, J2000.
const GAL_TO_EQ: DMat3 = DMat3::from_cols(
    DVec3::new(-0.054_875_560_416_215_4, -0.873_437_090_234_885, -0.483_835_015_548_713_2),
    DVec3::new(0.494_109_427_875_583_7, -0.444_829_629_960_011_2, 0.746_982_244_497_218_9),
    DVec3::new(-0.867_666_149_019_004_7, -0.198_076_373_431_201_5, 0.455_983_776_175_066_9),
);

/// Returns `v` unchanged.
#[must_use]
pub fn identity(v: DVec3) -> DVec3 {
    v
}

/// Converts ecliptic (J2000) cartesian coordinates to equatorial.
#[must_use]
pub fn ecliptic_to_equatorial(v: DVec3) -> DVec3 {
    DQuat::from_rotation_x(OBLIQUITY_J2000_RAD) * v
}

/// Converts equatorial cartesian coordinates to ecliptic (J2000).
#[must_use]
pub fn equatorial_to_ecliptic(v: DVec3) -> DVec3 {
    DQuat::from_rotation_x(-OBLIQUITY_J2000_RAD) * v
}

/// Converts galactic cartesian coordinates to equatorial.
#[must_use]
pub fn galactic_to_equatorial(v: DVec3) -> DVec3 {
    GAL_TO_EQ * v
}

/// Converts equatorial cartesian coordinates to galactic.
#[must_use]
pub fn equatorial_to_galactic(v: DVec3) -> DVec3 {
    GAL_TO_EQ.transpose() * v
}

/// Table of frame conversions addressable by name.
///
/// Names are resolved once, when a dataset is configured. The returned
/// function pointer is what gets stored on providers, so nothing is looked up
/// per frame.
#[derive(Clone)]
pub struct TransformRegistry {
    table: HashMap<String, TransformFn>,
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TransformRegistry")
            .field("names", &names)
            .finish()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TransformRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in conversions.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut reg = Self::empty();
        reg.register("identity", identity);
        reg.register("eclipticToEquatorial", ecliptic_to_equatorial);
        reg.register("equatorialToEcliptic", equatorial_to_ecliptic);
        reg.register("galacticToEquatorial", galactic_to_equatorial);
        reg.register("equatorialToGalactic", equatorial_to_galactic);
        reg
    }

    /// Registers `f` under `name`, returning the conversion it replaced.
    pub fn register(&mut self, name: impl Into<String>, f: TransformFn) -> Option<TransformFn> {
        self.table.insert(name.into(), f)
    }

    /// Looks up a conversion by name.
    pub fn get(&self, name: &str) -> Result<TransformFn, SceneError> {
        self.table
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::UnknownTransform(name.to_owned()))
    }

    /// Returns the number of registered conversions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no conversions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn ecliptic_pole_points_to_ra_18h() {
        let pole = ecliptic_to_equatorial(DVec3::Z);
        assert!(pole.x.abs() < 1e-12);
        assert!(pole.y < 0.0, "ecliptic north pole lies at RA 18h");
        assert!((pole.z - OBLIQUITY_J2000_RAD.cos()).abs() < 1e-12);
    }

    #[test]
    fn galactic_center_declination() {
        let gc = galactic_to_equatorial(DVec3::X);
        let dec = gc.z.asin().to_degrees();
        assert!((dec + 28.936).abs() < 1e-2, "got {dec}");
    }

    #[test]
    fn conversions_round_trip() {
        let v = DVec3::new(0.3, -1.2, 4.5);
        assert!(close(equatorial_to_ecliptic(ecliptic_to_equatorial(v)), v));
        assert!(close(equatorial_to_galactic(galactic_to_equatorial(v)), v));
    }

    #[test]
    fn registry_lookup() {
        let mut reg = TransformRegistry::with_builtins();
        let f = reg.get("eclipticToEquatorial").unwrap();
        assert!(close(f(DVec3::Z), ecliptic_to_equatorial(DVec3::Z)));

        assert!(matches!(
            reg.get("precessToB1950"),
            Err(SceneError::UnknownTransform(name)) if name == "precessToB1950"
        ));

        fn flip(v: DVec3) -> DVec3 {
            -v
        }
        assert!(reg.register("flip", flip).is_none());
        assert_eq!(reg.get("flip").unwrap()(DVec3::X), -DVec3::X);
        assert_eq!(reg.len(), 6);
    }
}
