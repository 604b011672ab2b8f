// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The camera contract consumed by the scene graph.
//!
//! The camera system itself (input, navigation, projection setup) lives
//! outside this crate. Updates and picking only need the narrow view exposed
//! by [`Camera`]. [`FixedCamera`] is a simple perspective implementation for
//! embedding and tests.

use glam::DVec3;
use kurbo::{Point, Size};

use crate::node::NodeId;

/// Reference field of view, in degrees, at which the field-of-view factor is 1.
pub const REFERENCE_FOV_DEG: f64 = 40.0;

/// Camera state read once per frame.
///
/// Positions passed in and out are *camera-relative* translations: the
/// camera sits at the origin of translation space.
pub trait Camera: Sync {
    /// Absolute camera position.
    fn position(&self) -> DVec3;

    /// Offset that moves absolute positions into translation space.
    fn inverse_position(&self) -> DVec3 {
        -self.position()
    }

    /// Field-of-view scale factor applied to view angles.
    fn fov_factor(&self) -> f64;

    /// The node the camera tracks, if any.
    fn focus(&self) -> Option<NodeId> {
        None
    }

    /// Unit view direction.
    fn direction(&self) -> DVec3;

    /// Culling test for a node with raw view angle `view_angle` at
    /// `translation`, `dist` away.
    fn is_visible(&self, view_angle: f64, translation: DVec3, dist: f64) -> bool;

    /// Projects a translation to screen coordinates. `None` if behind the
    /// camera.
    fn project(&self, translation: DVec3) -> Option<Point>;
}

/// A perspective camera with a fixed pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedCamera {
    /// Absolute position.
    pub position: DVec3,
    /// View direction (normalized on use).
    pub direction: DVec3,
    /// Up vector (normalized on use).
    pub up: DVec3,
    /// Vertical field of view, in degrees.
    pub fov_deg: f64,
    /// Viewport size in pixels.
    pub viewport: Size,
    /// Tracked node.
    pub focus: Option<NodeId>,
}

impl FixedCamera {
    /// A camera at `position` looking down `-Z` with the reference field of
    /// view and a 1920×1080 viewport.
    #[must_use]
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            direction: DVec3::NEG_Z,
            up: DVec3::Y,
            fov_deg: REFERENCE_FOV_DEG,
            viewport: Size::new(1920.0, 1080.0),
            focus: None,
        }
    }

    /// Returns the camera looking at `target` (absolute).
    #[must_use]
    pub fn looking_at(mut self, target: DVec3) -> Self {
        let dir = target - self.position;
        if dir.length_squared() > 0.0 {
            self.direction = dir.normalize();
            if self.direction.cross(self.up).length_squared() < 1e-12 {
                self.up = self.direction.any_orthonormal_vector();
            }
        }
        self
    }

    /// Returns the camera with vertical field of view `fov_deg`.
    #[must_use]
    pub fn with_fov(mut self, fov_deg: f64) -> Self {
        self.fov_deg = fov_deg;
        self
    }

    /// Returns the camera tracking `focus`.
    #[must_use]
    pub fn with_focus(mut self, focus: NodeId) -> Self {
        self.focus = Some(focus);
        self
    }

    fn aspect(&self) -> f64 {
        if self.viewport.height > 0.0 {
            self.viewport.width / self.viewport.height
        } else {
            1.0
        }
    }

    /// Orthonormal view basis: (right, up, forward).
    fn basis(&self) -> (DVec3, DVec3, DVec3) {
        let forward = self.direction.normalize_or(DVec3::NEG_Z);
        let right = forward.cross(self.up).normalize_or(DVec3::X);
        let up = right.cross(forward);
        (right, up, forward)
    }

    /// Half of the diagonal field of view, in radians.
    fn half_fov_diagonal(&self) -> f64 {
        let half = (self.fov_deg.to_radians() / 2.0).tan();
        (half * (1.0 + self.aspect() * self.aspect()).sqrt()).atan()
    }
}

impl Camera for FixedCamera {
    fn position(&self) -> DVec3 {
        self.position
    }

    fn fov_factor(&self) -> f64 {
        self.fov_deg / REFERENCE_FOV_DEG
    }

    fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    fn direction(&self) -> DVec3 {
        self.direction.normalize_or(DVec3::NEG_Z)
    }

    fn is_visible(&self, view_angle: f64, translation: DVec3, dist: f64) -> bool {
        if dist <= 0.0 {
            return true;
        }
        let cos = (self.direction().dot(translation) / dist).clamp(-1.0, 1.0);
        cos.acos() <= self.half_fov_diagonal() + view_angle
    }

    fn project(&self, translation: DVec3) -> Option<Point> {
        let (right, up, forward) = self.basis();
        let z = translation.dot(forward);
        if z <= 0.0 {
            return None;
        }
        let f = 1.0 / (self.fov_deg.to_radians() / 2.0).tan();
        let x_ndc = translation.dot(right) / z * f / self.aspect();
        let y_ndc = translation.dot(up) / z * f;
        Some(Point::new(
            (x_ndc + 1.0) / 2.0 * self.viewport.width,
            (1.0 - y_ndc) / 2.0 * self.viewport.height,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_projects_to_viewport_center() {
        let cam = FixedCamera::new(DVec3::ZERO);
        let p = cam.project(DVec3::new(0.0, 0.0, -10.0)).unwrap();
        assert!((p.x - 960.0).abs() < 1e-9);
        assert!((p.y - 540.0).abs() < 1e-9);
        assert!(cam.project(DVec3::new(0.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn up_is_screen_up() {
        let cam = FixedCamera::new(DVec3::ZERO);
        let p = cam.project(DVec3::new(0.0, 1.0, -10.0)).unwrap();
        assert!(p.y < 540.0);
        let p = cam.project(DVec3::new(1.0, 0.0, -10.0)).unwrap();
        assert!(p.x > 960.0);
    }

    #[test]
    fn culling_cone() {
        let cam = FixedCamera::new(DVec3::ZERO);
        assert!(cam.is_visible(0.0, DVec3::new(0.0, 0.0, -5.0), 5.0));
        assert!(!cam.is_visible(0.0, DVec3::new(0.0, 0.0, 5.0), 5.0));
        // A huge object behind the camera still overlaps the view.
        assert!(cam.is_visible(3.0, DVec3::new(0.0, 0.0, 5.0), 5.0));
    }

    #[test]
    fn fov_factor_is_relative_to_reference() {
        let cam = FixedCamera::new(DVec3::ZERO).with_fov(20.0);
        assert!((cam.fov_factor() - 0.5).abs() < 1e-12);
        let cam = FixedCamera::new(DVec3::ONE).looking_at(DVec3::ONE + DVec3::Y);
        assert!((cam.direction() - DVec3::Y).length() < 1e-12);
        assert!(cam.project(DVec3::Y).is_some());
    }
}
