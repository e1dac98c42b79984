// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console trace output.
//!
//! [`ConsoleSink`] implements [`TraceSink`] and logs one line per event with
//! `console.log`. Line formatting is kept in free functions so it can be
//! checked off the browser.

use alloc::format;
use alloc::string::String;

use overspeed_core::config::SurfaceKind;
use overspeed_core::trace::{
    InjectEvent, PassBeginEvent, PassSummary, RateEvent, SkipEvent, SurfaceEvent, TraceSink,
};
use wasm_bindgen::JsValue;

const PREFIX: &str = "[overspeed]";

/// Logs trace events to the browser console.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    /// Also log passes that changed nothing.
    pub verbose: bool,
}

impl ConsoleSink {
    /// Creates a sink that only logs passes with structural changes, skips
    /// and rate writes.
    #[must_use]
    pub const fn new() -> Self {
        Self { verbose: false }
    }

    /// Creates a sink that logs every event.
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

fn log(line: &str) {
    web_sys::console::log_1(&JsValue::from_str(line));
}

pub(crate) fn pass_begin_line(e: &PassBeginEvent) -> String {
    format!("{PREFIX} pass={} trigger={}", e.pass_index, e.trigger.as_str())
}

pub(crate) fn surface_line(e: &SurfaceEvent) -> String {
    let seen = if e.first_seen { " new" } else { "" };
    format!(
        "{PREFIX} pass={} surface={} entries={}{seen}",
        e.pass_index,
        e.kind.as_str(),
        e.entries,
    )
}

pub(crate) fn inject_line(e: &InjectEvent) -> String {
    format!(
        "{PREFIX} pass={} inject={} +{} -{} hooks={}",
        e.pass_index,
        e.kind.as_str(),
        e.injected,
        e.removed,
        e.bound_native,
    )
}

pub(crate) fn skip_line(e: &SkipEvent) -> String {
    let kind = e.kind.map_or("-", SurfaceKind::as_str);
    format!(
        "{PREFIX} pass={} skip surface={kind} reason={}",
        e.pass_index,
        e.reason.as_str(),
    )
}

pub(crate) fn rate_line(e: &RateEvent) -> String {
    let clamped = if e.slider_clamped { " clamped" } else { "" };
    format!(
        "{PREFIX} rate={:.2} via={} surfaces={}{clamped}",
        e.rate,
        e.source.as_str(),
        e.surfaces,
    )
}

pub(crate) fn summary_line(s: &PassSummary) -> String {
    format!(
        "{PREFIX} pass={} done menus={} candidates={} surfaces={} +{} -{} writes={} skipped={}",
        s.pass_index,
        s.menus,
        s.candidates,
        s.surfaces,
        s.injected,
        s.removed,
        s.sync_writes,
        s.skipped,
    )
}

impl TraceSink for ConsoleSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        if self.verbose {
            log(&pass_begin_line(e));
        }
    }

    fn on_surface(&mut self, e: &SurfaceEvent) {
        if self.verbose || e.first_seen {
            log(&surface_line(e));
        }
    }

    fn on_inject(&mut self, e: &InjectEvent) {
        log(&inject_line(e));
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        log(&skip_line(e));
    }

    fn on_rate(&mut self, e: &RateEvent) {
        log(&rate_line(e));
    }

    fn on_pass_summary(&mut self, s: &PassSummary) {
        if self.verbose || s.changed_structure() {
            log(&summary_line(s));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overspeed_core::error::Skip;
    use overspeed_core::host::BindingKind;
    use overspeed_core::trace::Trigger;

    #[test]
    fn pass_begin_names_trigger() {
        let line = pass_begin_line(&PassBeginEvent {
            pass_index: 4,
            trigger: Trigger::Mutation,
        });
        assert_eq!(line, "[overspeed] pass=4 trigger=mutation");
    }

    #[test]
    fn skip_without_surface_uses_dash() {
        let line = skip_line(&SkipEvent {
            pass_index: 2,
            kind: None,
            reason: Skip::LocatorMiss,
        });
        assert_eq!(line, "[overspeed] pass=2 skip surface=- reason=locator-miss");
    }

    #[test]
    fn rate_line_marks_clamp() {
        let line = rate_line(&RateEvent {
            rate: 3.5,
            source: BindingKind::Preset,
            surfaces: 2,
            slider_clamped: true,
        });
        assert_eq!(line, "[overspeed] rate=3.50 via=preset surfaces=2 clamped");
    }

    #[test]
    fn inject_and_surface_lines() {
        let inject = inject_line(&InjectEvent {
            pass_index: 1,
            kind: SurfaceKind::Chips,
            injected: 4,
            removed: 1,
            bound_native: 5,
        });
        assert_eq!(inject, "[overspeed] pass=1 inject=chips +4 -1 hooks=5");

        let surface = surface_line(&SurfaceEvent {
            pass_index: 1,
            kind: SurfaceKind::Menu,
            entries: 8,
            first_seen: true,
        });
        assert_eq!(surface, "[overspeed] pass=1 surface=menu entries=8 new");
    }

    #[test]
    fn summary_lists_totals() {
        let line = summary_line(&PassSummary {
            pass_index: 3,
            menus: 1,
            candidates: 2,
            surfaces: 1,
            injected: 4,
            removed: 0,
            sync_writes: 6,
            skipped: 0,
        });
        assert!(line.contains("pass=3 done"), "got: {line}");
        assert!(line.contains("+4 -0 writes=6"), "got: {line}");
    }
}
