// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State synchronization.
//!
//! [`sync_surface`] makes every indicator of one surface agree with the
//! external rate: the selection flag of each entry, the standalone readouts
//! and the summary row of the parent menu. Every write goes through the
//! `ensure_*` helpers so a synchronized surface produces no mutations.
//!
//! Selection compares parsed values, never formatted strings; the baseline
//! label parses to `1`, so it is selected exactly when the rate is `1`.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::config::{ReadoutFormat, SummaryRow, SurfaceProfile};
use crate::entry;
use crate::error::Skip;
use crate::host::{HostEvent, HostTree, ensure_attribute, ensure_text};
use crate::label;

/// What one [`sync_surface`] call changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries whose selection flag was rewritten.
    pub selection_writes: usize,
    /// Readouts whose text was rewritten.
    pub readout_writes: usize,
    /// Whether the parent menu's summary row was rewritten.
    pub summary_written: bool,
    /// Entries currently selected.
    pub selected: usize,
    /// Steps skipped because a collaborator node was missing.
    pub skipped: Vec<Skip>,
}

impl SyncReport {
    /// Returns the total number of writes.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.selection_writes + self.readout_writes + usize::from(self.summary_written)
    }
}

/// Synchronizes every indicator of `surface` with `rate`.
pub fn sync_surface<T: HostTree + ?Sized>(
    tree: &mut T,
    surface: &T::Node,
    profile: &SurfaceProfile,
    rate: f64,
) -> SyncReport {
    let mut report = SyncReport::default();

    for e in entry::entries(tree, surface, profile) {
        let selected = e.value == Some(rate);
        if selected {
            report.selected += 1;
        }
        if set_selected(tree, &e.activator, selected, profile) {
            report.selection_writes += 1;
        }
    }

    if profile.readouts.is_some() {
        match update_readouts(tree, surface, profile, rate) {
            Some(n) => report.readout_writes = n,
            None => report.skipped.push(Skip::MissingCollaboratorNode),
        }
    }

    if let Some(summary) = &profile.summary {
        match summary_content(tree, surface, summary) {
            Some(content) => {
                let text = label::format_summary(rate, profile.baseline_label);
                report.summary_written = ensure_text(tree, &content, &text);
            }
            None => report.skipped.push(Skip::MissingCollaboratorNode),
        }
    }

    report
}

/// Sets the selection indicator of `activator` when it differs.
fn set_selected<T: HostTree + ?Sized>(
    tree: &mut T,
    activator: &T::Node,
    selected: bool,
    profile: &SurfaceProfile,
) -> bool {
    let sel = profile.selection;
    ensure_attribute(tree, activator, sel.attribute, if selected { sel.on } else { sel.off })
}

/// Writes the formatted rate into the surface's standalone readouts.
///
/// Returns the number of readouts rewritten, or `None` when the profile
/// names readouts but none exist.
pub fn update_readouts<T: HostTree + ?Sized>(
    tree: &mut T,
    surface: &T::Node,
    profile: &SurfaceProfile,
    rate: f64,
) -> Option<usize> {
    let readouts = profile.readouts?;
    let scope = tree.closest(surface, readouts.scope)?;
    let text = match readouts.format {
        ReadoutFormat::TwoDecimals => label::format_readout(rate),
        ReadoutFormat::Compact => label::format_compact(rate),
    };
    let nodes: Vec<T::Node> = readouts
        .selectors
        .iter()
        .flat_map(|sel| tree.query_all(&scope, sel))
        .collect();
    if nodes.is_empty() {
        return None;
    }
    Some(
        nodes
            .iter()
            .filter(|node| ensure_text(tree, node, &text))
            .count(),
    )
}

fn summary_content<T: HostTree + ?Sized>(
    tree: &T,
    surface: &T::Node,
    summary: &SummaryRow,
) -> Option<T::Node> {
    let scope = tree.closest(surface, summary.scope)?;
    tree.query_all(&scope, summary.row)
        .into_iter()
        .find(|row| {
            tree.query(row, summary.title).is_some_and(|title| {
                let text: String = tree.text(&title);
                summary.titles.contains(&text.trim())
            })
        })
        .and_then(|row| tree.query(&row, summary.content))
}

/// Forces a capped range control to its maximum when `rate` exceeds it.
///
/// Writes the control's value, its accessible values and the fill property,
/// then dispatches bubbling `input` and `change` so host listeners observe
/// a native-looking change. Returns `Ok(true)` if the control was clamped.
///
/// # Errors
///
/// Returns [`Skip::MissingCollaboratorNode`] when the profile names a slider
/// that does not exist.
pub fn clamp_slider<T: HostTree + ?Sized>(
    tree: &mut T,
    surface: &T::Node,
    profile: &SurfaceProfile,
    rate: f64,
) -> Result<bool, Skip> {
    let Some(slider) = profile.slider else {
        return Ok(false);
    };
    let input = tree
        .closest(surface, slider.scope)
        .and_then(|scope| tree.query(&scope, slider.selector))
        .ok_or(Skip::MissingCollaboratorNode)?;

    let max = tree
        .attribute(&input, "max")
        .and_then(|m| m.trim().parse::<f64>().ok())
        .filter(|m| m.is_finite())
        .unwrap_or(slider.default_max);
    if rate <= max {
        return Ok(false);
    }

    let max_text = format!("{max}");
    tree.set_value(&input, &max_text);
    ensure_attribute(tree, &input, "aria-valuenow", &max_text);
    ensure_attribute(tree, &input, "aria-valuetext", &max_text);
    tree.set_style(&input, slider.fill_property, "100%");
    tree.dispatch(&input, HostEvent::Input);
    tree.dispatch(&input, HostEvent::Change);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::config::InjectOptions;
    use crate::host::mem::{MemNode, MemTree};
    use crate::inject;

    const DESIRED: &[f64] = &[2.5, 3.0, 3.5, 4.0];

    fn selected_labels(tree: &MemTree, surface: &MemNode, profile: &SurfaceProfile) -> Vec<String> {
        entry::entries(tree, surface, profile)
            .into_iter()
            .filter(|e| {
                tree.attribute(&e.activator, profile.selection.attribute).as_deref()
                    == Some(profile.selection.on)
            })
            .map(|e| e.label)
            .collect()
    }

    #[test]
    fn selects_exactly_the_matching_entry() {
        let mut tree = MemTree::new();
        let f = fixtures::chips_panel(&mut tree, fixtures::NATIVE_CHIPS);
        let profile = SurfaceProfile::chips();
        inject::reconcile(&mut tree, &f.chips, DESIRED, &InjectOptions::default(), &profile)
            .expect("ok");

        let report = sync_surface(&mut tree, &f.chips, &profile, 3.5);
        assert_eq!(report.selected, 1);
        assert_eq!(selected_labels(&tree, &f.chips, &profile), ["3.5"]);
        assert_eq!(tree.text(&f.display), "3.50x");
        assert_eq!(tree.text(&f.slider_text), "3.50x");
    }

    #[test]
    fn baseline_label_is_selected_at_one() {
        let mut tree = MemTree::new();
        let f = fixtures::speed_menu(&mut tree, fixtures::NATIVE_MENU);
        let profile = SurfaceProfile::menu();

        sync_surface(&mut tree, &f.menu, &profile, 1.0);
        assert_eq!(selected_labels(&tree, &f.menu, &profile), ["Normal"]);
        assert_eq!(tree.text(&f.settings.summary), "Normal");

        sync_surface(&mut tree, &f.menu, &profile, 1.25);
        assert_eq!(selected_labels(&tree, &f.menu, &profile), ["1.25"]);
        assert_eq!(tree.text(&f.settings.summary), "1.25");
    }

    #[test]
    fn rate_between_presets_selects_nothing() {
        let mut tree = MemTree::new();
        let f = fixtures::speed_menu(&mut tree, fixtures::NATIVE_MENU);
        let profile = SurfaceProfile::menu();
        let report = sync_surface(&mut tree, &f.menu, &profile, 1.1);
        assert_eq!(report.selected, 0);
        assert!(selected_labels(&tree, &f.menu, &profile).is_empty());
    }

    #[test]
    fn synchronized_surface_is_not_rewritten() {
        let mut tree = MemTree::new();
        let f = fixtures::chips_panel(&mut tree, fixtures::NATIVE_CHIPS);
        let profile = SurfaceProfile::chips();

        let first = sync_surface(&mut tree, &f.chips, &profile, 2.0);
        assert!(first.writes() > 0);
        let writes = tree.writes();
        let second = sync_surface(&mut tree, &f.chips, &profile, 2.0);
        assert_eq!(second.writes(), 0);
        assert_eq!(tree.writes(), writes);
    }

    #[test]
    fn summary_row_matches_integral_rate() {
        let mut tree = MemTree::new();
        let f = fixtures::speed_menu(&mut tree, fixtures::NATIVE_MENU);
        sync_surface(&mut tree, &f.menu, &SurfaceProfile::menu(), 3.0);
        assert_eq!(tree.text(&f.settings.summary), "3");
    }

    #[test]
    fn missing_readouts_are_skipped_not_fatal() {
        let mut tree = MemTree::new();
        let body = tree.body();
        let popup = tree.element(&body, "div.ytp-popup.ytp-settings-menu", &[]);
        let chips = tree.element(&popup, "div.ytp-variable-speed-panel-chips", &[]);
        fixtures::chip(&mut tree, &chips, "1.0");
        fixtures::chip(&mut tree, &chips, "2.0");
        let profile = SurfaceProfile::chips();

        let report = sync_surface(&mut tree, &chips, &profile, 2.0);
        assert_eq!(report.selected, 1);
        assert_eq!(
            report.skipped,
            [Skip::MissingCollaboratorNode, Skip::MissingCollaboratorNode]
        );
    }

    #[test]
    fn slider_is_clamped_above_its_max() {
        let mut tree = MemTree::new();
        let f = fixtures::chips_panel(&mut tree, fixtures::NATIVE_CHIPS);
        let profile = SurfaceProfile::chips();

        assert_eq!(clamp_slider(&mut tree, &f.chips, &profile, 1.5), Ok(false));
        assert!(tree.dispatched().is_empty());

        assert_eq!(clamp_slider(&mut tree, &f.chips, &profile, 3.5), Ok(true));
        assert_eq!(tree.value(&f.slider), Some("2"));
        assert_eq!(tree.attribute(&f.slider, "aria-valuenow").as_deref(), Some("2"));
        assert_eq!(tree.attribute(&f.slider, "aria-valuetext").as_deref(), Some("2"));
        assert_eq!(tree.style(&f.slider, "--yt-slider-shape-gradient-percent"), "100%");
        assert_eq!(
            tree.dispatched(),
            [(f.slider, HostEvent::Input), (f.slider, HostEvent::Change)]
        );
    }

    #[test]
    fn slider_without_max_uses_default() {
        let mut tree = MemTree::new();
        let f = fixtures::chips_panel(&mut tree, fixtures::NATIVE_CHIPS);
        tree.remove_attribute(&f.slider, "max");
        let profile = SurfaceProfile::chips();
        assert_eq!(clamp_slider(&mut tree, &f.chips, &profile, 2.0), Ok(false));
        assert_eq!(clamp_slider(&mut tree, &f.chips, &profile, 2.5), Ok(true));
    }

    #[test]
    fn menu_variant_has_no_slider() {
        let mut tree = MemTree::new();
        let f = fixtures::speed_menu(&mut tree, fixtures::NATIVE_MENU);
        assert_eq!(
            clamp_slider(&mut tree, &f.menu, &SurfaceProfile::menu(), 4.0),
            Ok(false)
        );
    }
}
