// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Background sort jobs.
//!
//! A [`SortJob`] owns the set's background permutation and key array for the
//! duration of the sort, together with shared, read-only views of the records,
//! the visibility flags, and the filter. Nothing in the job aliases the
//! active permutation the renderer reads.

use std::sync::Arc;

use glam::DVec3;
use rayon::prelude::*;

use super::record::ParticleRecord;
use super::set::{ParticleFilter, SetKind};

/// Permutation and per-record sort keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SortBuffers {
    /// Record indices in draw order.
    pub order: Vec<u32>,
    /// Sort key of each record, indexed by record.
    pub keys: Vec<f64>,
}

impl SortBuffers {
    /// Identity permutation with zeroed keys for `n` records.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "record indices are u32 by construction of the set"
        )]
        let order = (0..n).map(|i| i as u32).collect();
        Self {
            order,
            keys: vec![0.0; n],
        }
    }
}

/// Camera-dependent inputs of a sort.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SortParams {
    /// Camera-relative position of the set node.
    pub origin: DVec3,
    /// Julian years since the set epoch, for proper motion.
    pub years: f64,
    /// Camera field-of-view factor.
    pub fov: f64,
    /// Global star brightness multiplier.
    pub brightness: f64,
    /// Absolute camera position, stamped on the set when the sort lands.
    pub camera: DVec3,
}

/// A sort ready to run off the frame thread.
pub struct SortJob {
    pub(crate) kind: SetKind,
    pub(crate) records: Arc<[ParticleRecord]>,
    pub(crate) visibility: Arc<Vec<u8>>,
    pub(crate) filter: Option<ParticleFilter>,
    pub(crate) params: SortParams,
    pub(crate) buffers: SortBuffers,
}

impl core::fmt::Debug for SortJob {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SortJob")
            .field("kind", &self.kind)
            .field("len", &self.records.len())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// The result of a finished [`SortJob`].
#[derive(Clone, Debug, PartialEq)]
pub struct SortOutput {
    /// Sorted permutation and the keys it was sorted by.
    pub buffers: SortBuffers,
    /// Camera position the keys were computed for.
    pub camera: DVec3,
}

impl SortJob {
    /// Computes keys and sorts the permutation.
    ///
    /// Records that are hidden or rejected by the filter get `+inf` and sort
    /// last. Ties are broken by record index, so identical inputs always
    /// produce the same permutation.
    #[must_use]
    pub fn run(self) -> SortOutput {
        let Self {
            kind,
            records,
            visibility,
            filter,
            params,
            mut buffers,
        } = self;

        let SortBuffers { order, keys } = &mut buffers;
        keys.par_iter_mut().enumerate().for_each(|(i, key)| {
            let r = &records[i];
            let shown = visibility[i] != 0 && filter.as_ref().is_none_or(|f| f(r));
            *key = if shown {
                sort_key(kind, r, &params)
            } else {
                f64::INFINITY
            };
        });

        let keys = &*keys;
        order.par_sort_unstable_by(|&a, &b| {
            keys[a as usize]
                .total_cmp(&keys[b as usize])
                .then(a.cmp(&b))
        });

        SortOutput {
            buffers,
            camera: params.camera,
        }
    }
}

/// Sort key of one visible record: squared camera distance for particles,
/// negated apparent brightness for stars (brightest first).
fn sort_key(kind: SetKind, r: &ParticleRecord, p: &SortParams) -> f64 {
    let rel = p.origin + r.position_at(p.years);
    match kind {
        SetKind::Particles => rel.length_squared(),
        SetKind::Stars => -(r.size / rel.length()) / p.fov * p.brightness,
    }
}
