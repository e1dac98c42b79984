// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Menu classification by label shape.
//!
//! The host gives the speed surface no semantic marker, and its containers
//! share class names with unrelated menus. A candidate is accepted when it
//! holds at least [`min_entries`](crate::config::SurfaceProfile::min_entries)
//! distinct speed-shaped labels and at least one of them denotes the
//! baseline: the literal baseline label or one of the profile's baseline
//! markers. Anything smaller is rejected, so near-miss menus are never
//! touched.

use alloc::vec::Vec;

use crate::config::SurfaceProfile;
use crate::entry::{self, Entry};
use crate::host::HostTree;

/// The label-shape summary of a candidate surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fingerprint {
    /// Entries found by the profile's entry selector.
    pub entries: usize,
    /// Distinct parsed rates among them.
    pub distinct: usize,
    /// Entries whose label is not a speed.
    pub unparseable: usize,
    /// Whether a baseline label or marker is present.
    pub has_baseline: bool,
}

impl Fingerprint {
    /// Computes the fingerprint of already-read entries.
    #[must_use]
    pub fn of<N>(entries: &[Entry<N>], profile: &SurfaceProfile) -> Self {
        let mut values: Vec<f64> = Vec::new();
        let mut fp = Self {
            entries: entries.len(),
            ..Self::default()
        };
        for e in entries {
            let Some(v) = e.value else {
                fp.unparseable += 1;
                continue;
            };
            if !values.contains(&v) {
                values.push(v);
            }
            if e.label == profile.baseline_label || profile.baseline_markers.contains(&v) {
                fp.has_baseline = true;
            }
        }
        fp.distinct = values.len();
        fp
    }

    /// Returns whether this fingerprint identifies a target surface.
    #[must_use]
    pub fn accepts(&self, profile: &SurfaceProfile) -> bool {
        self.distinct >= profile.min_entries && self.has_baseline
    }
}

/// Reads `node`'s entries and returns its fingerprint.
pub fn fingerprint<T: HostTree + ?Sized>(
    tree: &T,
    node: &T::Node,
    profile: &SurfaceProfile,
) -> Fingerprint {
    Fingerprint::of(&entry::entries(tree, node, profile), profile)
}

/// Returns whether `node` is a speed surface of the given variant.
pub fn is_target_surface<T: HostTree + ?Sized>(
    tree: &T,
    node: &T::Node,
    profile: &SurfaceProfile,
) -> bool {
    fingerprint(tree, node, profile).accepts(profile)
}
