// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for reconciliation passes.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! engine calls at each stage of a pass. All method bodies default to no-ops,
//! so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Diagnostics never influence reconciliation: a pass behaves the same with
//! or without a sink.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use crate::config::SurfaceKind;
use crate::error::Skip;
use crate::host::BindingKind;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What caused a pass to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// The first pass after startup.
    Startup,
    /// A batch of host mutations, coalesced to the next frame.
    Mutation,
    /// A polling interval elapsed.
    Poll,
}

impl Trigger {
    /// Returns a short, stable name for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Mutation => "mutation",
            Self::Poll => "poll",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a pass starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassBeginEvent {
    /// Monotonic pass counter.
    pub pass_index: u64,
    /// What caused the pass.
    pub trigger: Trigger,
}

/// Emitted for every candidate accepted by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceEvent {
    /// Pass this surface was found in.
    pub pass_index: u64,
    /// Which variant matched.
    pub kind: SurfaceKind,
    /// Entries the surface held before reconciliation.
    pub entries: usize,
    /// Whether this surface instance had not been seen before.
    pub first_seen: bool,
}

/// Emitted when the injector changed a surface's entry list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InjectEvent {
    /// Pass the change happened in.
    pub pass_index: u64,
    /// Which variant was changed.
    pub kind: SurfaceKind,
    /// Entries cloned in.
    pub injected: usize,
    /// Native or duplicate entries removed.
    pub removed: usize,
    /// Native entries that received a rate hook.
    pub bound_native: usize,
}

/// Emitted when a step was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkipEvent {
    /// Pass the skip happened in, or the last pass for activations.
    pub pass_index: u64,
    /// Surface variant involved, if any.
    pub kind: Option<SurfaceKind>,
    /// Why.
    pub reason: Skip,
}

/// Emitted when an activation wrote the playback rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateEvent {
    /// The new rate.
    pub rate: f64,
    /// Which behavior wrote it.
    pub source: BindingKind,
    /// Surfaces resynchronized afterwards.
    pub surfaces: usize,
    /// Whether a capped range control was forced to its maximum.
    pub slider_clamped: bool,
}

/// Per-pass totals, emitted when a pass ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Monotonic pass counter.
    pub pass_index: u64,
    /// Menu scopes located from the observation root.
    pub menus: usize,
    /// Candidate containers examined.
    pub candidates: usize,
    /// Candidates accepted as surfaces.
    pub surfaces: usize,
    /// Entries injected across all surfaces.
    pub injected: usize,
    /// Entries removed across all surfaces.
    pub removed: usize,
    /// Selection, readout and summary writes.
    pub sync_writes: usize,
    /// Skipped steps.
    pub skipped: usize,
}

impl PassSummary {
    /// Returns whether the pass changed the host's structure.
    #[must_use]
    pub fn changed_structure(&self) -> bool {
        self.injected > 0 || self.removed > 0
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives diagnostic events from the engine.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// A pass started.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// A surface was accepted.
    fn on_surface(&mut self, e: &SurfaceEvent) {
        _ = e;
    }

    /// A surface's entry list changed.
    fn on_inject(&mut self, e: &InjectEvent) {
        _ = e;
    }

    /// A step was skipped.
    fn on_skip(&mut self, e: &SkipEvent) {
        _ = e;
    }

    /// An activation wrote the playback rate.
    fn on_rate(&mut self, e: &RateEvent) {
        _ = e;
    }

    /// A pass ended.
    fn on_pass_summary(&mut self, s: &PassSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A sink that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Zero-overhead tracing handle threaded through the engine.
///
/// Without the `trace` feature every method is an empty inline function.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that forwards to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards everything.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Forwards [`TraceSink::on_pass_begin`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Forwards [`TraceSink::on_surface`].
    #[inline]
    pub fn surface(&mut self, e: &SurfaceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_surface(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Forwards [`TraceSink::on_inject`].
    #[inline]
    pub fn inject(&mut self, e: &InjectEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_inject(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Forwards [`TraceSink::on_skip`].
    #[inline]
    pub fn skip(&mut self, e: &SkipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_skip(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Forwards [`TraceSink::on_rate`].
    #[inline]
    pub fn rate(&mut self, e: &RateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_rate(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Forwards [`TraceSink::on_pass_summary`].
    #[inline]
    pub fn pass_summary(&mut self, s: &PassSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_pass_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> PassSummary {
        PassSummary {
            pass_index: 3,
            menus: 1,
            candidates: 2,
            surfaces: 1,
            injected: 4,
            removed: 1,
            sync_writes: 2,
            skipped: 0,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_pass_begin(&PassBeginEvent {
            pass_index: 0,
            trigger: Trigger::Startup,
        });
        sink.on_skip(&SkipEvent {
            pass_index: 0,
            kind: None,
            reason: Skip::LocatorMiss,
        });
        sink.on_pass_summary(&sample_summary());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.pass_begin(&PassBeginEvent {
            pass_index: 1,
            trigger: Trigger::Mutation,
        });
        tracer.pass_summary(&sample_summary());
    }

    #[test]
    fn summary_reports_structural_change() {
        assert!(sample_summary().changed_structure());
        assert!(!PassSummary::default().changed_structure());
    }

    #[test]
    fn trigger_names_are_stable() {
        assert_eq!(Trigger::Startup.as_str(), "startup");
        assert_eq!(Trigger::Mutation.as_str(), "mutation");
        assert_eq!(Trigger::Poll.as_str(), "poll");
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            passes: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_pass_summary(&mut self, s: &PassSummary) {
                self.passes.push(s.pass_index);
            }
        }

        let mut sink = RecordingSink { passes: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.pass_summary(&sample_summary());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.passes, &[3]);
    }
}
