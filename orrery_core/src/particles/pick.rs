// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-space picking inside a set.

use glam::DVec3;
use kurbo::Point;
use rayon::prelude::*;

use super::set::ParticleSet;
use crate::camera::Camera;

/// A record hit by a pick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleHit {
    /// Record index.
    pub index: u32,
    /// Raw view angle of the record.
    pub angle: f64,
    /// Distance to the camera.
    pub dist: f64,
}

impl ParticleHit {
    /// Returns the better of two hits: the larger angle, then the lower index.
    #[must_use]
    pub fn best(self, other: Self) -> Self {
        match self.angle.total_cmp(&other.angle) {
            core::cmp::Ordering::Greater => self,
            core::cmp::Ordering::Less => other,
            core::cmp::Ordering::Equal if self.index <= other.index => self,
            core::cmp::Ordering::Equal => other,
        }
    }
}

impl ParticleSet {
    /// Finds the record under `point`.
    ///
    /// Only visible records that pass the filter and project within
    /// `tolerance` pixels are candidates. Among them the one that looks
    /// largest wins; ties go to the lowest index.
    #[must_use]
    pub fn pick(
        &self,
        camera: &dyn Camera,
        origin: DVec3,
        years: f64,
        point: Point,
        tolerance: f64,
    ) -> Option<ParticleHit> {
        let len = u32::try_from(self.len()).ok()?;
        (0..len)
            .into_par_iter()
            .filter(|&i| self.passes(i))
            .filter_map(|i| {
                let r = self.record(i)?;
                let rel = origin + r.position_at(years);
                let dist = rel.length();
                if dist <= 0.0 {
                    return None;
                }
                let screen = camera.project(rel)?;
                (screen.distance(point) <= tolerance).then(|| ParticleHit {
                    index: i,
                    angle: (r.size / dist).atan(),
                    dist,
                })
            })
            .reduce_with(ParticleHit::best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FixedCamera;
    use crate::particles::{ParticleRecord, SetKind};

    #[test]
    fn largest_angle_wins() {
        let cam = FixedCamera::new(DVec3::ZERO);
        let records = vec![
            ParticleRecord::new(DVec3::new(0.0, 0.0, -10.0), 1.0),
            ParticleRecord::new(DVec3::new(0.0, 0.0, -5.0), 1.0),
            ParticleRecord::new(DVec3::new(0.0, 0.0, 5.0), 100.0),
            ParticleRecord::new(DVec3::new(3.0, 0.0, -5.0), 50.0),
        ];
        let set = ParticleSet::new(SetKind::Particles, records);
        let center = Point::new(960.0, 540.0);
        let hit = set.pick(&cam, DVec3::ZERO, 0.0, center, 4.0).unwrap();
        assert_eq!(hit.index, 1, "behind-camera and off-target records ignored");
        assert!((hit.dist - 5.0).abs() < 1e-12);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let cam = FixedCamera::new(DVec3::ZERO);
        let records = vec![ParticleRecord::new(DVec3::new(0.0, 0.0, -5.0), 1.0); 64];
        let mut set = ParticleSet::new(SetKind::Stars, records);
        set.set_visible(0, false).unwrap();
        let hit = set
            .pick(&cam, DVec3::ZERO, 0.0, Point::new(960.0, 540.0), 1.0)
            .unwrap();
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn miss_returns_none() {
        let cam = FixedCamera::new(DVec3::ZERO);
        let set = ParticleSet::new(
            SetKind::Particles,
            vec![ParticleRecord::new(DVec3::new(0.0, 0.0, -5.0), 1.0)],
        );
        assert!(set
            .pick(&cam, DVec3::ZERO, 0.0, Point::new(10.0, 10.0), 2.0)
            .is_none());
    }
}
