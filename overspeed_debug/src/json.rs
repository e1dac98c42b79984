// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON-lines trace export.
//!
//! [`JsonLinesSink`] writes one JSON object per event, newline separated.
//! Every object carries an `"event"` name; the remaining keys mirror the
//! event's fields. Surface kinds, binding kinds, triggers and skip reasons
//! are written as their short names.

use std::io::Write;

use serde_json::{Value, json};

use overspeed_core::config::SurfaceKind;
use overspeed_core::trace::{
    InjectEvent, PassBeginEvent, PassSummary, RateEvent, SkipEvent, SurfaceEvent, TraceSink,
};

/// Writes trace events as JSON lines.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    lines: u64,
}

impl<W: Write> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Returns the number of lines written.
    #[must_use]
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Consumes the sink and returns its destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, value: &Value) {
        if serde_json::to_writer(&mut self.writer, value).is_ok()
            && self.writer.write_all(b"\n").is_ok()
        {
            self.lines += 1;
        }
    }
}

impl<W: Write> TraceSink for JsonLinesSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.emit(&json!({
            "event": "pass_begin",
            "pass": e.pass_index,
            "trigger": e.trigger.as_str(),
        }));
    }

    fn on_surface(&mut self, e: &SurfaceEvent) {
        self.emit(&json!({
            "event": "surface",
            "pass": e.pass_index,
            "kind": e.kind.as_str(),
            "entries": e.entries,
            "first_seen": e.first_seen,
        }));
    }

    fn on_inject(&mut self, e: &InjectEvent) {
        self.emit(&json!({
            "event": "inject",
            "pass": e.pass_index,
            "kind": e.kind.as_str(),
            "injected": e.injected,
            "removed": e.removed,
            "bound_native": e.bound_native,
        }));
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        self.emit(&json!({
            "event": "skip",
            "pass": e.pass_index,
            "kind": e.kind.map(SurfaceKind::as_str),
            "reason": e.reason.as_str(),
        }));
    }

    fn on_rate(&mut self, e: &RateEvent) {
        self.emit(&json!({
            "event": "rate",
            "rate": e.rate,
            "source": e.source.as_str(),
            "surfaces": e.surfaces,
            "slider_clamped": e.slider_clamped,
        }));
    }

    fn on_pass_summary(&mut self, s: &PassSummary) {
        self.emit(&json!({
            "event": "pass_summary",
            "pass": s.pass_index,
            "menus": s.menus,
            "candidates": s.candidates,
            "surfaces": s.surfaces,
            "injected": s.injected,
            "removed": s.removed,
            "sync_writes": s.sync_writes,
            "skipped": s.skipped,
        }));
    }
}
