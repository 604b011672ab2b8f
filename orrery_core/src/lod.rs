// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Apparent-angle level-of-detail classification.
//!
//! Every classifiable node type carries [`LodThresholds`]. Given the node's
//! apparent view angle `a` and the camera field-of-view factor `fov`, the
//! thresholds scale with `fov` and split the angle axis into bands:
//!
//! ```text
//!   a <  none·fov                    → nothing
//!   a <  point·fov                   → Point
//!   a <  quad·fov / overlap          → Billboard
//!   a <  quad·fov · overlap          → Billboard + Model (cross-fade)
//!   otherwise                        → Model
//! ```
//!
//! Every comparison is `a < threshold` for the lower band, so a node sitting
//! exactly on a boundary goes to the more detailed band. Inside the overlap
//! band the billboard fades out as the model fades in, with opacities
//! `1 - t` and `t` where `t` is linear across the band.
//!
//! Labels are decided separately from the band, by [`label_visible`].

use serde::{Deserialize, Serialize};

use crate::render_list::RenderGroup;
use crate::visibility::lint;

/// Apparent-angle thresholds (radians at unit field-of-view factor).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LodThresholds {
    /// Below this, the node is not drawn.
    pub none: f64,
    /// Below this, the node is drawn as a point.
    pub point: f64,
    /// Center of the billboard/model transition.
    pub quad: f64,
    /// Multiplicative half-width of the transition band; at least 1.
    pub overlap: f64,
}

impl LodThresholds {
    /// Creates thresholds.
    #[must_use]
    pub const fn new(none: f64, point: f64, quad: f64, overlap: f64) -> Self {
        Self {
            none,
            point,
            quad,
            overlap,
        }
    }

    /// Lower edge of the overlap band, at field-of-view factor `fov`.
    #[inline]
    #[must_use]
    pub fn quad_lo(&self, fov: f64) -> f64 {
        self.quad * fov / self.overlap
    }

    /// Upper edge of the overlap band, at field-of-view factor `fov`.
    #[inline]
    #[must_use]
    pub fn quad_hi(&self, fov: f64) -> f64 {
        self.quad * fov * self.overlap
    }

    /// Checks that the bands are ordered, returning a reason otherwise.
    pub fn check(&self) -> Result<(), &'static str> {
        if self.none.is_nan() || self.none < 0.0 {
            return Err("`none` must be non-negative");
        }
        if self.none > self.point {
            return Err("`none` must not exceed `point`");
        }
        if self.overlap < 1.0 {
            return Err("`overlap` must be at least 1");
        }
        if self.point > self.quad / self.overlap {
            return Err("`point` must not exceed the start of the overlap band");
        }
        Ok(())
    }
}

/// Text label parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelParams {
    /// Apparent angle above which the label shows, at unit label density.
    pub threshold: f64,
    /// World-space label size per unit of camera distance.
    pub factor: f64,
    /// Upper bound on the world-space label size.
    pub max_size: f64,
}

impl LabelParams {
    /// World-space label size at `dist`.
    #[must_use]
    pub fn size_at(&self, dist: f64) -> f64 {
        (dist * self.factor).min(self.max_size)
    }
}

/// Detail band chosen for a node, ordered from least to most detail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LodBand {
    /// Not drawn.
    None,
    /// Point primitive.
    Point,
    /// Camera-facing billboard.
    Billboard,
    /// Billboard and model cross-fading.
    Overlap,
    /// Full model.
    Model,
}

/// Result of classifying one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    /// Chosen band.
    pub band: LodBand,
    /// Billboard opacity multiplier (meaningful for `Billboard` and `Overlap`).
    pub billboard_opacity: f64,
    /// Model opacity multiplier (meaningful for `Overlap` and `Model`).
    pub model_opacity: f64,
}

impl Classification {
    /// Render groups and per-group opacity multipliers for the band.
    pub fn groups(&self) -> impl Iterator<Item = (RenderGroup, f64)> + '_ {
        let (a, b) = match self.band {
            LodBand::None => (None, None),
            LodBand::Point => (Some((RenderGroup::Point, 1.0)), None),
            LodBand::Billboard => (Some((RenderGroup::Billboard, self.billboard_opacity)), None),
            LodBand::Overlap => (
                Some((RenderGroup::Billboard, self.billboard_opacity)),
                Some((RenderGroup::Model, self.model_opacity)),
            ),
            LodBand::Model => (Some((RenderGroup::Model, self.model_opacity)), None),
        };
        a.into_iter().chain(b)
    }
}

/// Classifies an apparent angle against `th` at field-of-view factor `fov`.
#[must_use]
pub fn classify(apparent: f64, fov: f64, th: &LodThresholds) -> Classification {
    let band = |band, billboard_opacity, model_opacity| Classification {
        band,
        billboard_opacity,
        model_opacity,
    };
    if apparent < th.none * fov {
        return band(LodBand::None, 0.0, 0.0);
    }
    if apparent < th.point * fov {
        return band(LodBand::Point, 0.0, 0.0);
    }
    let (lo, hi) = (th.quad_lo(fov), th.quad_hi(fov));
    if apparent < lo {
        return band(LodBand::Billboard, 1.0, 0.0);
    }
    if apparent < hi {
        let t = lint(apparent, lo, hi, 0.0, 1.0);
        return band(LodBand::Overlap, 1.0 - t, t);
    }
    band(LodBand::Model, 0.0, 1.0)
}

/// Decides whether a node's label shows.
///
/// `force` bypasses the threshold and the global toggle; it is set for the
/// camera focus and for nodes with a forced label. The threshold is divided
/// by the fov factor, so a label tracks the raw view angle.
#[must_use]
pub fn label_visible(
    apparent: f64,
    fov: f64,
    label: &LabelParams,
    density: f64,
    labels_on: bool,
    force: bool,
) -> bool {
    force || (labels_on && density > 0.0 && apparent >= label.threshold / (density * fov))
}
