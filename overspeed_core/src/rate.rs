// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The external playback rate.
//!
//! The rate belongs to the media collaborator, not to the engine. Every entry
//! activation writes it, and every surface reads it to decide what is
//! selected.

/// Read/write access to the active playback multiplier.
pub trait PlaybackRate {
    /// Returns the current rate.
    fn rate(&self) -> f64;

    /// Sets the rate on every media element the collaborator controls.
    fn set_rate(&mut self, rate: f64);
}

/// A plain in-memory rate, starting at 1×.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateCell(pub f64);

impl Default for RateCell {
    fn default() -> Self {
        Self(1.0)
    }
}

impl PlaybackRate for RateCell {
    fn rate(&self) -> f64 {
        self.0
    }

    fn set_rate(&mut self, rate: f64) {
        self.0 = rate;
    }
}
