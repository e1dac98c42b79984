// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use overspeed_core::config::SurfaceKind;
use overspeed_core::trace::{
    InjectEvent, PassBeginEvent, PassSummary, RateEvent, SkipEvent, SurfaceEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[pass] #{} trigger={}",
            e.pass_index,
            e.trigger.as_str(),
        );
    }

    fn on_surface(&mut self, e: &SurfaceEvent) {
        let seen = if e.first_seen { "new" } else { "known" };
        let _ = writeln!(
            self.writer,
            "[surface] #{} {} entries={} {seen}",
            e.pass_index,
            e.kind.as_str(),
            e.entries,
        );
    }

    fn on_inject(&mut self, e: &InjectEvent) {
        let _ = writeln!(
            self.writer,
            "[inject] #{} {} injected={} removed={} hooks={}",
            e.pass_index,
            e.kind.as_str(),
            e.injected,
            e.removed,
            e.bound_native,
        );
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        let kind = e.kind.map_or("-", SurfaceKind::as_str);
        let _ = writeln!(
            self.writer,
            "[skip] #{} {kind} {} ({})",
            e.pass_index,
            e.reason.as_str(),
            e.reason,
        );
    }

    fn on_rate(&mut self, e: &RateEvent) {
        let clamped = if e.slider_clamped { " slider=clamped" } else { "" };
        let _ = writeln!(
            self.writer,
            "[rate] {:.2}x via={} surfaces={}{clamped}",
            e.rate,
            e.source.as_str(),
            e.surfaces,
        );
    }

    fn on_pass_summary(&mut self, s: &PassSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] #{} menus={} candidates={} surfaces={} \
             injected={} removed={} writes={} skipped={}",
            s.pass_index,
            s.menus,
            s.candidates,
            s.surfaces,
            s.injected,
            s.removed,
            s.sync_writes,
            s.skipped,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overspeed_core::error::Skip;
    use overspeed_core::host::BindingKind;
    use overspeed_core::trace::Trigger;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_pass_begin() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_pass_begin(&PassBeginEvent {
            pass_index: 1,
            trigger: Trigger::Startup,
        });
        let output = output(sink);
        assert!(output.contains("[pass]"), "got: {output}");
        assert!(output.contains("trigger=startup"), "got: {output}");
    }

    #[test]
    fn pretty_print_skip_with_reason() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_skip(&SkipEvent {
            pass_index: 7,
            kind: Some(SurfaceKind::Chips),
            reason: Skip::TemplateMissing,
        });
        let output = output(sink);
        assert_eq!(
            output,
            "[skip] #7 chips template-missing (no entry to use as a template)\n"
        );
    }

    #[test]
    fn pretty_print_rate() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_rate(&RateEvent {
            rate: 4.0,
            source: BindingKind::Preset,
            surfaces: 1,
            slider_clamped: true,
        });
        let output = output(sink);
        assert!(output.starts_with("[rate] 4.00x via=preset"), "got: {output}");
        assert!(output.contains("slider=clamped"), "got: {output}");
    }
}
