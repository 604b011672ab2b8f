// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node descriptors.

use glam::{DQuat, DVec3};

use super::component::ComponentTypes;
use super::payload::NodeKind;
use crate::resolver::PositionResolver;

/// Everything needed to create a node, before it is wired into a tree.
///
/// `parent` is a name, not a reference: it is looked up in the name index at
/// insertion time. `wrapped` is only meaningful for
/// [`NodeKind::OctreeWrapper`]; its members are indexed alongside the wrapper
/// and inserted as its children.
#[derive(Debug)]
pub struct NodeDesc {
    /// Names; the first is canonical.
    pub names: Vec<String>,
    /// Numeric id. Positive ids are also indexed as names.
    pub id: i64,
    /// Display name in the user's language.
    pub localized_name: Option<String>,
    /// Name of the parent node. `None` attaches to the root.
    pub parent: Option<String>,
    /// Payload.
    pub kind: NodeKind,
    /// Category tags.
    pub components: ComponentTypes,
    /// Position relative to the parent.
    pub pos: DVec3,
    /// Diameter.
    pub size: f64,
    /// Orientation.
    pub orientation: DQuat,
    /// Time-dependent position source. Nodes without one keep `pos`.
    pub resolver: Option<PositionResolver>,
    /// Initial user visibility.
    pub visible: bool,
    /// Show the label regardless of its threshold.
    pub force_label: bool,
    /// Members of an octree wrapper.
    pub wrapped: Vec<Self>,
}

impl NodeDesc {
    /// Creates a visible generic node called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            id: 0,
            localized_name: None,
            parent: None,
            kind: NodeKind::Generic,
            components: ComponentTypes::NONE,
            pos: DVec3::ZERO,
            size: 0.0,
            orientation: DQuat::IDENTITY,
            resolver: None,
            visible: true,
            force_label: false,
            wrapped: Vec::new(),
        }
    }

    /// Adds an alternative name.
    #[must_use]
    pub fn with_alias(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Sets the numeric id.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Sets the localized name.
    #[must_use]
    pub fn with_localized_name(mut self, name: impl Into<String>) -> Self {
        self.localized_name = Some(name.into());
        self
    }

    /// Sets the parent name.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the category tags.
    #[must_use]
    pub fn with_components(mut self, components: ComponentTypes) -> Self {
        self.components = components;
        self
    }

    /// Sets the parent-relative position.
    #[must_use]
    pub fn with_pos(mut self, pos: DVec3) -> Self {
        self.pos = pos;
        self
    }

    /// Sets the diameter.
    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Sets the orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: DQuat) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets the position resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: PositionResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the initial visibility.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Forces the label on.
    #[must_use]
    pub fn with_force_label(mut self, force: bool) -> Self {
        self.force_label = force;
        self
    }

    /// Adds a wrapped member to an octree wrapper.
    #[must_use]
    pub fn with_wrapped(mut self, member: Self) -> Self {
        self.wrapped.push(member);
        self
    }

    /// Canonical name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }
}
