// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component-type categories used for global on/off toggles.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// A set of object categories.
///
/// Each node carries the categories it belongs to. The scene graph keeps a
/// set of *enabled* categories; a node is on only when every one of its
/// categories is enabled. A node with no categories is always on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ComponentTypes(u32);

impl ComponentTypes {
    /// No categories.
    pub const NONE: Self = Self(0);
    /// Stars.
    pub const STARS: Self = Self(1 << 0);
    /// Planets.
    pub const PLANETS: Self = Self(1 << 1);
    /// Moons.
    pub const MOONS: Self = Self(1 << 2);
    /// Artificial satellites and spacecraft.
    pub const SATELLITES: Self = Self(1 << 3);
    /// Orbit lines.
    pub const ORBITS: Self = Self(1 << 4);
    /// Text labels.
    pub const LABELS: Self = Self(1 << 5);
    /// Constellation figures.
    pub const CONSTELLATIONS: Self = Self(1 << 6);
    /// Galaxies.
    pub const GALAXIES: Self = Self(1 << 7);
    /// Star clusters.
    pub const CLUSTERS: Self = Self(1 << 8);
    /// Generic particle datasets.
    pub const PARTICLES: Self = Self(1 << 9);
    /// Proper-motion vectors.
    pub const PROPER_MOTIONS: Self = Self(1 << 10);
    /// Everything else.
    pub const OTHERS: Self = Self(1 << 11);

    /// Every defined category.
    pub const ALL: Self = Self((1 << 12) - 1);

    const NAMES: [(Self, &'static str); 12] = [
        (Self::STARS, "STARS"),
        (Self::PLANETS, "PLANETS"),
        (Self::MOONS, "MOONS"),
        (Self::SATELLITES, "SATELLITES"),
        (Self::ORBITS, "ORBITS"),
        (Self::LABELS, "LABELS"),
        (Self::CONSTELLATIONS, "CONSTELLATIONS"),
        (Self::GALAXIES, "GALAXIES"),
        (Self::CLUSTERS, "CLUSTERS"),
        (Self::PARTICLES, "PARTICLES"),
        (Self::PROPER_MOTIONS, "PROPER_MOTIONS"),
        (Self::OTHERS, "OTHERS"),
    ];

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if no category is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every category in `other` is also in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if `self` and `other` share a category.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns the union of both sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `self` without the categories in `other`.
    #[inline]
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Adds or removes `other`.
    pub fn set(&mut self, other: Self, on: bool) {
        *self = if on {
            self.union(other)
        } else {
            self.difference(other)
        };
    }

    /// Returns whether a node tagged with `node` is on under this set of
    /// enabled categories.
    #[inline]
    #[must_use]
    pub const fn enables(self, node: Self) -> bool {
        self.contains(node)
    }
}

impl BitOr for ComponentTypes {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for ComponentTypes {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for ComponentTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabling_requires_every_category() {
        let enabled = ComponentTypes::STARS | ComponentTypes::LABELS;
        assert!(enabled.enables(ComponentTypes::STARS));
        assert!(enabled.enables(ComponentTypes::NONE));
        assert!(!enabled.enables(ComponentTypes::STARS | ComponentTypes::ORBITS));
    }

    #[test]
    fn set_and_clear() {
        let mut ct = ComponentTypes::ALL;
        ct.set(ComponentTypes::ORBITS, false);
        assert!(!ct.contains(ComponentTypes::ORBITS));
        assert!(ct.contains(ComponentTypes::MOONS));
        ct.set(ComponentTypes::ORBITS, true);
        assert_eq!(ct, ComponentTypes::ALL);
    }

    #[test]
    fn debug_lists_names() {
        let s = format!("{:?}", ComponentTypes::MOONS | ComponentTypes::OTHERS);
        assert_eq!(s, "{MOONS, OTHERS}");
    }
}
