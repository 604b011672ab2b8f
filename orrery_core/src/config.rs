// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunable scene parameters.
//!
//! Every field has a default, so a configuration document only needs to name
//! what it changes:
//!
//! ```
//! use orrery_core::config::SceneConfig;
//!
//! let cfg = SceneConfig::from_json_str(r#"{ "fade_ms": 500, "sort": { "update_interval_ms": 250 } }"#)
//!     .unwrap();
//! assert_eq!(cfg.fade_ms, 500);
//! assert_eq!(cfg.sort.update_interval_ms, 250);
//! assert_eq!(cfg.label_density, 1.0);
//! ```

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::lod::{LabelParams, LodThresholds};
use crate::units::pc;

/// Scene-wide parameters read by the update pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Duration of a visibility fade, in wall-clock milliseconds.
    pub fade_ms: u64,
    /// Label density multiplier. Higher shows more labels; zero hides all
    /// labels that are not forced.
    pub label_density: f64,
    /// Brightness multiplier applied to star sort keys.
    pub star_brightness: f64,
    /// Years of drift drawn by a proper-motion line.
    pub pm_line_factor: f64,
    /// Background sort scheduling.
    pub sort: SortConfig,
    /// Thresholds for bodies that do not carry their own.
    pub body_thresholds: LodThresholds,
    /// Thresholds for stars that do not carry their own.
    pub star_thresholds: LodThresholds,
    /// Label parameters for bodies that do not carry their own.
    pub body_label: LabelParams,
    /// Label parameters for stars that do not carry their own.
    pub star_label: LabelParams,
}

/// When large sets are re-sorted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SortConfig {
    /// Minimum wall-clock time between sorts of one set, when the camera
    /// moves. A still camera re-sorts after twice this.
    pub update_interval_ms: u64,
    /// Camera displacement (km) that makes a set due after one interval.
    pub camera_threshold: f64,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 1500,
            camera_threshold: pc(100.0),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fade_ms: 2500,
            label_density: 1.0,
            star_brightness: 1.0,
            pm_line_factor: 1.0,
            sort: SortConfig::default(),
            body_thresholds: LodThresholds::new(0.0, 1e-5, 1e-3, 2.0),
            star_thresholds: LodThresholds::new(0.0, 1e-7, 1e-5, 1.5),
            body_label: LabelParams {
                threshold: 1e-4,
                factor: 1e-2,
                max_size: 1e7,
            },
            star_label: LabelParams {
                threshold: 5e-6,
                factor: 1e-3,
                max_size: 1e12,
            },
        }
    }
}

impl SceneConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses, and validates a JSON document.
    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks value ranges and threshold ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("label_density", self.label_density)?;
        positive("star_brightness", self.star_brightness)?;
        non_negative("pm_line_factor", self.pm_line_factor)?;
        positive("sort.camera_threshold", self.sort.camera_threshold)?;
        if self.sort.update_interval_ms == 0 {
            return Err(ConfigError::NonPositive {
                field: "sort.update_interval_ms",
                value: 0.0,
            });
        }
        for (kind, th) in [("bodies", &self.body_thresholds), ("stars", &self.star_thresholds)] {
            th.check()
                .map_err(|reason| ConfigError::Thresholds { kind, reason })?;
        }
        for (field, label) in [("body_label", &self.body_label), ("star_label", &self.star_label)] {
            non_negative(field, label.threshold)?;
            positive(field, label.max_size)?;
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    // NaN fails too.
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SceneConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(SceneConfig::from_json_str("{}").unwrap(), SceneConfig::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = SceneConfig::from_json_str(r#"{ "fade": 10 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unordered_thresholds_are_rejected() {
        let err = SceneConfig::from_json_str(
            r#"{ "star_thresholds": { "none": 1.0, "point": 0.1, "quad": 2.0, "overlap": 1.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Thresholds { kind: "stars", .. }));
    }

    #[test]
    fn ranges_are_checked() {
        let cfg = SceneConfig {
            star_brightness: 0.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive { field: "star_brightness", .. })
        ));
        let cfg = SceneConfig {
            label_density: -1.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Negative { field: "label_density", .. })
        ));
    }

    #[test]
    fn reads_from_reader() {
        let doc = br#"{ "sort": { "camera_threshold": 5.0 } }"#;
        let cfg = SceneConfig::from_reader(&doc[..]).unwrap();
        assert_eq!(cfg.sort.camera_threshold, 5.0);
        assert_eq!(cfg.sort.update_interval_ms, 1500);
    }
}
