// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU instance layouts.
//!
//! All positions are camera-relative, so single precision is enough once the
//! scene graph has subtracted the camera position in double precision. Every
//! type is `repr(C)` and padded to a multiple of 16 bytes for direct buffer
//! upload with [`bytemuck::cast_slice`].

use bytemuck::{Pod, Zeroable};
use glam::{DQuat, DVec3};

/// A point primitive.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    /// Camera-relative position.
    pub position: [f32; 3],
    /// Diameter.
    pub size: f32,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Padding for 16-byte alignment.
    pub _padding: [f32; 3],
}

/// A camera-facing quad.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BillboardInstance {
    /// Camera-relative position.
    pub position: [f32; 3],
    /// Diameter.
    pub size: f32,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Padding for 16-byte alignment.
    pub _padding: [f32; 3],
}

/// A full model.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ModelInstance {
    /// Camera-relative position.
    pub position: [f32; 3],
    /// Uniform scale (the node diameter).
    pub scale: f32,
    /// Orientation quaternion, `xyzw`.
    pub rotation: [f32; 4],
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Padding for 16-byte alignment.
    pub _padding: [f32; 3],
}

/// One vertex of a line list or strip.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    /// Camera-relative position.
    pub position: [f32; 3],
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

impl PointInstance {
    /// Creates a point.
    #[must_use]
    pub fn new(position: DVec3, size: f64, opacity: f64) -> Self {
        Self {
            position: position.as_vec3().to_array(),
            size: narrow(size),
            opacity: narrow(opacity),
            _padding: [0.0; 3],
        }
    }
}

impl BillboardInstance {
    /// Creates a billboard.
    #[must_use]
    pub fn new(position: DVec3, size: f64, opacity: f64) -> Self {
        Self {
            position: position.as_vec3().to_array(),
            size: narrow(size),
            opacity: narrow(opacity),
            _padding: [0.0; 3],
        }
    }
}

impl ModelInstance {
    /// Creates a model instance.
    #[must_use]
    pub fn new(position: DVec3, scale: f64, rotation: DQuat, opacity: f64) -> Self {
        Self {
            position: position.as_vec3().to_array(),
            scale: narrow(scale),
            rotation: rotation.as_quat().to_array(),
            opacity: narrow(opacity),
            _padding: [0.0; 3],
        }
    }
}

impl LineVertex {
    /// Creates a line vertex.
    #[must_use]
    pub fn new(position: DVec3, opacity: f64) -> Self {
        Self {
            position: position.as_vec3().to_array(),
            opacity: narrow(opacity),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "GPU attributes are single precision; inputs are camera-relative"
)]
#[inline]
pub(crate) fn narrow(x: f64) -> f32 {
    x as f32
}
