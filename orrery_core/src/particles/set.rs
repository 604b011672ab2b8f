// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Particle and star sets.

use core::f64::consts::FRAC_PI_2;
use std::collections::HashMap;
use std::sync::Arc;

use glam::DVec3;

use super::record::ParticleRecord;
use super::sort::{SortBuffers, SortJob, SortOutput, SortParams};
use crate::config::SortConfig;
use crate::error::SceneError;
use crate::index::normalize;
use crate::time::SimTime;

/// Predicate selecting which records take part in sorting and picking.
pub type ParticleFilter = Arc<dyn Fn(&ParticleRecord) -> bool + Send + Sync>;

/// How a set orders its records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SetKind {
    /// Generic particles, sorted by camera distance.
    Particles,
    /// Stars, sorted by apparent brightness.
    Stars,
}

/// Camera-relative state of one record, refreshed by every update that
/// visits the set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordView {
    /// Record index.
    pub index: u32,
    /// Camera-relative position, proper motion applied.
    pub translation: DVec3,
    /// Distance from the camera to the record center.
    pub dist: f64,
    /// Raw view angle.
    pub view_angle: f64,
    /// View angle divided by the camera fov factor.
    pub view_angle_apparent: f64,
}

/// A flat, insertion-ordered collection of records drawn as one batch.
///
/// The draw order lives in two permutation buffers. `active` is what the
/// renderer reads. The background buffer and its keys are lent to a
/// [`SortJob`] while a sort is in flight and come back sorted; completion
/// swaps the two.
pub struct ParticleSet {
    kind: SetKind,
    records: Arc<[ParticleRecord]>,
    epoch: SimTime,
    visibility: Arc<Vec<u8>>,
    names: HashMap<String, u32>,
    filter: Option<ParticleFilter>,
    active: Vec<u32>,
    background: Option<SortBuffers>,
    updating: bool,
    last_sort_ms: Option<u64>,
    last_sort_camera: DVec3,
    sorts_completed: u64,
    focus_index: Option<u32>,
    focus: Option<RecordView>,
    closest_index: Option<u32>,
    closest: Option<RecordView>,
}

impl core::fmt::Debug for ParticleSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParticleSet")
            .field("kind", &self.kind)
            .field("len", &self.records.len())
            .field("epoch", &self.epoch)
            .field("names", &self.names.len())
            .field("filtered", &self.filter.is_some())
            .field("updating", &self.updating)
            .field("last_sort_ms", &self.last_sort_ms)
            .field("focus_index", &self.focus_index)
            .field("closest_index", &self.closest_index)
            .finish_non_exhaustive()
    }
}

impl ParticleSet {
    /// Creates a set. Every record starts visible and the draw order starts
    /// as insertion order.
    ///
    /// # Panics
    ///
    /// Panics if there are more than `u32::MAX` records.
    #[must_use]
    pub fn new(kind: SetKind, records: Vec<ParticleRecord>) -> Self {
        let n = records.len();
        assert!(u32::try_from(n).is_ok(), "particle set too large: {n}");
        let background = SortBuffers::identity(n);
        Self {
            kind,
            active: background.order.clone(),
            records: records.into(),
            epoch: SimTime::J2000,
            visibility: Arc::new(vec![1; n]),
            names: HashMap::new(),
            filter: None,
            background: Some(background),
            updating: false,
            last_sort_ms: None,
            last_sort_camera: DVec3::ZERO,
            sorts_completed: 0,
            focus_index: None,
            focus: None,
            closest_index: None,
            closest: None,
        }
    }

    /// Sets the epoch the record positions are valid at.
    #[must_use]
    pub fn with_epoch(mut self, epoch: SimTime) -> Self {
        self.epoch = epoch;
        self
    }

    /// Names record `index`. Out-of-range indices are ignored.
    #[must_use]
    pub fn with_name(mut self, name: &str, index: u32) -> Self {
        if (index as usize) < self.records.len() {
            self.names.insert(normalize(name), index);
        }
        self
    }

    /// Set kind.
    #[must_use]
    pub fn kind(&self) -> SetKind {
        self.kind
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the set has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in insertion order.
    #[must_use]
    pub fn records(&self) -> &[ParticleRecord] {
        &self.records
    }

    /// One record.
    #[must_use]
    pub fn record(&self, index: u32) -> Option<&ParticleRecord> {
        self.records.get(index as usize)
    }

    /// Epoch of the record positions.
    #[must_use]
    pub fn epoch(&self) -> SimTime {
        self.epoch
    }

    /// Record names and their indices, normalized.
    pub fn names(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.names.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Looks up a record by name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.names.get(&normalize(name)).copied()
    }

    /// First name of record `index`, if it has one.
    ///
    /// Scans the name table; meant for UI readouts, not per-record loops.
    #[must_use]
    pub fn name_of(&self, index: u32) -> Option<&str> {
        self.names
            .iter()
            .filter(|&(_, &i)| i == index)
            .map(|(k, _)| k.as_str())
            .min()
    }

    /// Catalog numbers and their record indices.
    pub fn catalog(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.records
            .iter()
            .zip(0_u32..)
            .filter_map(|(r, i)| r.hip.map(|hip| (hip, i)))
    }

    /// Current draw order.
    #[must_use]
    pub fn active(&self) -> &[u32] {
        &self.active
    }

    /// Returns whether a sort is in flight.
    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// Wall-clock time of the last applied sort.
    #[must_use]
    pub fn last_sort_ms(&self) -> Option<u64> {
        self.last_sort_ms
    }

    /// Number of sorts applied so far.
    #[must_use]
    pub fn sorts_completed(&self) -> u64 {
        self.sorts_completed
    }

    /// Position of record `index` relative to the set, `years` after the
    /// epoch.
    #[must_use]
    pub fn position_of(&self, index: u32, years: f64) -> Option<DVec3> {
        self.record(index).map(|r| r.position_at(years))
    }

    /// Approximate memory held by the set.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        let n = self.records.len();
        n * size_of::<ParticleRecord>()
            + n // visibility
            + n * size_of::<u32>() * 2
            + n * size_of::<f64>()
    }

    // -- Visibility and filtering --

    /// Per-record visibility flag.
    #[must_use]
    pub fn is_visible(&self, index: u32) -> bool {
        self.visibility.get(index as usize).is_some_and(|&v| v != 0)
    }

    /// Shows or hides one record. Returns whether the flag changed.
    ///
    /// A change invalidates the GPU geometry of the whole set.
    pub fn set_visible(&mut self, index: u32, visible: bool) -> Result<bool, SceneError> {
        let len = self.records.len();
        let flag = u8::from(visible);
        match self.visibility.get(index as usize) {
            None => Err(SceneError::ParticleOutOfRange { index, len }),
            Some(&v) if v == flag => Ok(false),
            Some(_) => {
                // Copy on write if a sort job still holds the old flags.
                Arc::make_mut(&mut self.visibility)[index as usize] = flag;
                Ok(true)
            }
        }
    }

    /// Replaces the record filter.
    pub fn set_filter(&mut self, filter: Option<ParticleFilter>) {
        self.filter = filter;
    }

    /// Returns whether record `index` is visible and passes the filter.
    #[must_use]
    pub fn passes(&self, index: u32) -> bool {
        self.is_visible(index)
            && self
                .record(index)
                .is_some_and(|r| self.filter.as_ref().is_none_or(|f| f(r)))
    }

    // -- Focus and proximity --

    /// Makes record `index` the focused member of the set. Its view is
    /// computed by the next update.
    pub fn set_focus_index(&mut self, index: u32) -> Result<(), SceneError> {
        let len = self.records.len();
        if index as usize >= len {
            return Err(SceneError::ParticleOutOfRange { index, len });
        }
        if self.focus_index != Some(index) {
            self.focus_index = Some(index);
            self.focus = None;
        }
        Ok(())
    }

    /// Forgets the focused member.
    pub fn clear_focus(&mut self) {
        self.focus_index = None;
        self.focus = None;
    }

    /// The focused member, if any.
    #[must_use]
    pub fn focus_index(&self) -> Option<u32> {
        self.focus_index
    }

    /// View of the focused member as of the last update.
    #[must_use]
    pub fn focus(&self) -> Option<RecordView> {
        self.focus
    }

    /// The first shown record of the current draw order: the nearest
    /// particle, or the star ranking brightest from the camera.
    #[must_use]
    pub fn closest_index(&self) -> Option<u32> {
        self.closest_index
    }

    /// View of the closest record as of the last update.
    #[must_use]
    pub fn closest(&self) -> Option<RecordView> {
        self.closest
    }

    /// Refreshes the focus and closest views for a set at camera-relative
    /// `origin`.
    pub(crate) fn update_views(&mut self, origin: DVec3, years: f64, fov: f64) {
        self.focus = self
            .focus_index
            .and_then(|i| self.view_of(i, origin, years, fov));
        self.closest = self
            .closest_index
            .and_then(|i| self.view_of(i, origin, years, fov));
    }

    fn view_of(&self, index: u32, origin: DVec3, years: f64, fov: f64) -> Option<RecordView> {
        let record = self.record(index)?;
        let translation = origin + record.position_at(years);
        let dist = translation.length();
        let view_angle = if dist > 0.0 {
            (record.size / dist).atan()
        } else {
            FRAC_PI_2
        };
        Some(RecordView {
            index,
            translation,
            dist,
            view_angle,
            view_angle_apparent: view_angle / fov,
        })
    }

    // -- Background sorting --

    /// Decides whether a new sort should start.
    ///
    /// Never while one is in flight or while the set is invisible. A set that
    /// was never sorted is eligible at once. Otherwise a sort is due after
    /// twice the update interval, or after one interval if the camera moved
    /// further than the threshold.
    #[must_use]
    pub fn should_sort(&self, now_ms: u64, camera: DVec3, opacity: f64, cfg: &SortConfig) -> bool {
        if self.updating || opacity <= 0.0 || self.is_empty() || self.background.is_none() {
            return false;
        }
        let Some(last) = self.last_sort_ms else {
            return true;
        };
        let elapsed = now_ms.saturating_sub(last);
        let moved = camera.distance(self.last_sort_camera);
        elapsed > 2 * cfg.update_interval_ms
            || (moved > cfg.camera_threshold && elapsed >= cfg.update_interval_ms)
    }

    /// Lends the background buffers to a new job and marks the set as
    /// updating. Returns `None` if a sort is already in flight.
    pub fn begin_sort(&mut self, params: SortParams) -> Option<SortJob> {
        if self.updating {
            return None;
        }
        let buffers = self.background.take()?;
        self.updating = true;
        Some(SortJob {
            kind: self.kind,
            records: Arc::clone(&self.records),
            visibility: Arc::clone(&self.visibility),
            filter: self.filter.clone(),
            params,
            buffers,
        })
    }

    /// Applies a finished sort: the sorted buffer becomes active, the
    /// previous active buffer becomes the background.
    pub fn complete_sort(&mut self, output: SortOutput, now_ms: u64) {
        let SortOutput { buffers, camera } = output;
        let SortBuffers { order, keys } = buffers;
        let closest = order
            .first()
            .copied()
            .filter(|&i| keys.get(i as usize).is_some_and(|k| k.is_finite()));
        if closest != self.closest_index {
            self.closest_index = closest;
            self.closest = None;
        }
        let previous = core::mem::replace(&mut self.active, order);
        self.background = Some(SortBuffers {
            order: previous,
            keys,
        });
        self.updating = false;
        self.last_sort_ms = Some(now_ms);
        self.last_sort_camera = camera;
        self.sorts_completed += 1;
    }
}
