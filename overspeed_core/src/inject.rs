// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Preset injection.
//!
//! [`reconcile`] brings one surface's structure in line with the desired
//! presets. It is idempotent: a second call on an unchanged surface performs
//! no writes, clones nothing and binds nothing. That property, together with
//! the scheduler's coalescing, is what stops the engine from chasing its own
//! mutations forever.
//!
//! # Steps
//!
//! 1. Read the entries and pick a template (a visible, non-promotional
//!    entry) before anything is removed.
//! 2. Remove redundant native entries (promotional presets), injected
//!    entries whose label no longer matches their tag, duplicate injected
//!    entries, and, with
//!    [`remove_native_collisions`](InjectOptions::remove_native_collisions),
//!    native entries whose value is a desired preset.
//! 3. For each desired value in ascending order that no remaining entry
//!    represents, clone the template, relabel and tag it, strip decorations,
//!    bind its activation behavior and insert it before the first entry with
//!    a larger value.
//! 4. Attach rate-writing hooks to native entries (once per node).
//! 5. Expand fixed-height layout and attach the restoration hook (once).

use alloc::format;
use alloc::vec::Vec;

use crate::config::{InjectOptions, LayoutExpansion, SurfaceProfile};
use crate::entry::{self, Entry, INJECTED_ATTR, Origin};
use crate::error::Skip;
use crate::host::{BindingKind, HostTree, Marker, ensure_style};
use crate::label;

/// What one [`reconcile`] call changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InjectReport {
    /// Whether this was the first pass over this surface instance.
    pub first_pass: bool,
    /// Values injected this call, ascending.
    pub injected: Vec<f64>,
    /// Redundant native entries removed.
    pub removed_redundant: usize,
    /// Native entries removed because a desired preset replaces them.
    pub removed_collisions: usize,
    /// Duplicate injected entries removed.
    pub removed_duplicates: usize,
    /// Injected entries removed because the host rewrote their label.
    pub removed_stale: usize,
    /// Native entries that received a rate-writing hook.
    pub bound_native: usize,
    /// Entries whose label is not a speed.
    pub unparseable: usize,
    /// Steps skipped because a collaborator node was missing.
    pub skipped: Vec<Skip>,
}

impl InjectReport {
    /// Returns whether the call changed the surface's entry list.
    #[must_use]
    pub fn changed_structure(&self) -> bool {
        !self.injected.is_empty()
            || self.removed_redundant > 0
            || self.removed_collisions > 0
            || self.removed_duplicates > 0
            || self.removed_stale > 0
    }
}

/// Reconciles the entries of `surface` with `desired`.
///
/// # Errors
///
/// Returns [`Skip::TemplateMissing`] when the surface has no entry to clone
/// from; nothing is modified in that case.
pub fn reconcile<T: HostTree + ?Sized>(
    tree: &mut T,
    surface: &T::Node,
    desired: &[f64],
    options: &InjectOptions,
    profile: &SurfaceProfile,
) -> Result<InjectReport, Skip> {
    let mut desired: Vec<f64> = desired.iter().copied().filter(|v| label::in_range(*v)).collect();
    desired.sort_by(f64::total_cmp);
    desired.dedup();

    let mut list = entry::entries(tree, surface, profile);
    let template = pick_template(tree, &list, profile)
        .ok_or(Skip::TemplateMissing)?
        .clone();

    let mut report = InjectReport {
        first_pass: tree.mark(surface, Marker::Processed),
        ..InjectReport::default()
    };

    prune(tree, &mut list, &desired, options, profile, &mut report);
    report.unparseable = list.iter().filter(|e| e.value.is_none()).count();

    let fallback_parent = list
        .last()
        .and_then(|e| tree.parent(&e.node))
        .unwrap_or_else(|| surface.clone());

    for &value in &desired {
        if list.iter().any(|e| e.value == Some(value)) {
            continue;
        }
        let Some(node) = build_entry(tree, &template, value, profile) else {
            continue;
        };
        let at = list
            .iter()
            .position(|e| e.value.is_some_and(|v| v > value));
        let placed = match at {
            Some(i) => {
                let reference = &list[i].node;
                let parent = tree
                    .parent(reference)
                    .unwrap_or_else(|| fallback_parent.clone());
                tree.insert_before(&parent, &node, Some(reference))
            }
            None => tree.insert_before(&fallback_parent, &node, None),
        };
        if !placed {
            continue;
        }
        let injected = entry::read_entry(tree, node, profile);
        list.insert(at.unwrap_or(list.len()), injected);
        report.injected.push(value);
    }

    if options.bind_native {
        for e in list.iter().filter(|e| e.origin == Origin::Native && e.value.is_some()) {
            if tree.mark(&e.activator, Marker::Bound) {
                tree.bind(&e.activator, BindingKind::NativePreset);
                report.bound_native += 1;
            }
        }
    }

    if let Some(layout) = &profile.layout
        && !desired.is_empty()
    {
        expand_layout(tree, surface, layout, profile, &mut report);
    }

    Ok(report)
}

/// Prefers a visible native entry without promotional content, then any
/// visible entry, then the first entry.
fn pick_template<'a, T: HostTree + ?Sized>(
    tree: &T,
    list: &'a [Entry<T::Node>],
    profile: &SurfaceProfile,
) -> Option<&'a T::Node> {
    let visible = |e: &&Entry<T::Node>| {
        tree.attribute(&e.node, "aria-hidden").as_deref() != Some("true")
            && tree.style(&e.node, "display") != "none"
    };
    let plain = |e: &&Entry<T::Node>| !is_redundant(tree, &e.node, profile);
    list.iter()
        .filter(visible)
        .find(|e| plain(e) && e.origin == Origin::Native)
        .or_else(|| list.iter().filter(visible).find(plain))
        .or_else(|| list.first())
        .map(|e| &e.node)
}

fn is_redundant<T: HostTree + ?Sized>(tree: &T, node: &T::Node, profile: &SurfaceProfile) -> bool {
    profile
        .redundant
        .iter()
        .any(|sel| tree.query(node, sel).is_some())
}

/// Removes redundant natives, stale and duplicate injected entries and
/// native collisions from the host and from `list`.
///
/// An injected entry is stale when its label no longer parses to the value
/// it was tagged with; it is replaced by a fresh clone afterwards.
fn prune<T: HostTree + ?Sized>(
    tree: &mut T,
    list: &mut Vec<Entry<T::Node>>,
    desired: &[f64],
    options: &InjectOptions,
    profile: &SurfaceProfile,
    report: &mut InjectReport,
) {
    let mut seen_injected: Vec<f64> = Vec::new();
    let mut keep = Vec::with_capacity(list.len());
    for e in list.drain(..) {
        let tagged = tree
            .attribute(&e.node, INJECTED_ATTR)
            .and_then(|t| label::parse(&t));
        let remove = match (e.origin, e.value) {
            (Origin::Native, _) if is_redundant(tree, &e.node, profile) => {
                report.removed_redundant += 1;
                true
            }
            (Origin::Native, Some(v))
                if options.remove_native_collisions && desired.contains(&v) =>
            {
                report.removed_collisions += 1;
                true
            }
            (Origin::Injected, v) if v.is_none() || v != tagged => {
                report.removed_stale += 1;
                true
            }
            (Origin::Injected, Some(v)) if seen_injected.contains(&v) => {
                report.removed_duplicates += 1;
                true
            }
            (Origin::Injected, Some(v)) => {
                seen_injected.push(v);
                false
            }
            _ => false,
        };
        if remove {
            tree.remove(&e.node);
        } else {
            keep.push(e);
        }
    }
    *list = keep;
}

/// Clones `template` into a detached injected entry for `value`.
fn build_entry<T: HostTree + ?Sized>(
    tree: &mut T,
    template: &T::Node,
    value: f64,
    profile: &SurfaceProfile,
) -> Option<T::Node> {
    let node = tree.clone_deep(template)?;
    let text = label::format_preset(value);

    tree.set_attribute(&node, INJECTED_ATTR, &text);
    tree.set_attribute(&node, "aria-hidden", "false");
    tree.remove_attribute(&node, "id");
    tree.set_style(&node, "display", "");
    tree.set_style(&node, "order", &format!("{}", label::visual_order(value)));

    for sel in profile.decorations {
        for deco in tree.query_all(&node, sel) {
            tree.remove(&deco);
        }
    }

    let activator = entry::activator_of(tree, &node, profile);
    let label_node = match entry::label_node_of(tree, &activator, profile) {
        Some(l) => l,
        None => {
            let span = tree.create_element("span")?;
            tree.set_text(&activator, "");
            tree.insert_before(&activator, &span, None);
            span
        }
    };
    tree.set_text(&label_node, &text);
    tree.set_attribute(&activator, profile.selection.attribute, profile.selection.off);

    if tree.mark(&activator, Marker::Bound) {
        tree.bind(&activator, BindingKind::Preset);
    }
    Some(node)
}

/// Parses an inline pixel length the way `parseInt` would.
pub(crate) fn parse_px(value: &str) -> Option<u32> {
    let digits: &str = {
        let t = value.trim();
        let end = t.find(|c: char| !c.is_ascii_digit()).unwrap_or(t.len());
        &t[..end]
    };
    digits.parse().ok()
}

fn expand_layout<T: HostTree + ?Sized>(
    tree: &mut T,
    surface: &T::Node,
    layout: &LayoutExpansion,
    profile: &SurfaceProfile,
    report: &mut InjectReport,
) {
    for (property, value) in layout.container {
        ensure_style(tree, surface, property, value);
    }

    match tree.closest(surface, layout.panel) {
        Some(panel) => {
            for (property, value) in layout.panel_styles {
                ensure_style(tree, &panel, property, value);
            }
        }
        None => report.skipped.push(Skip::MissingCollaboratorNode),
    }

    for floor in layout.floors {
        let Some(node) = tree.closest(surface, floor.selector) else {
            continue;
        };
        // Only fixed heights need raising; an unset height already grows.
        if let Some(px) = parse_px(&tree.style(&node, "height"))
            && px < floor.min_px
        {
            tree.set_style(&node, "height", &format!("{}px", floor.min_px));
        }
    }

    let back = profile.navigation.and_then(|nav| {
        let panel = tree.closest(surface, nav.panel)?;
        tree.query(&panel, nav.back_button)
    });
    match back {
        Some(back) => {
            if tree.mark(&back, Marker::RestoreHook) {
                tree.bind(&back, BindingKind::RestoreLayout);
            }
        }
        None => report.skipped.push(Skip::MissingCollaboratorNode),
    }
}

/// Resets every height floor above `node` to its restore height.
///
/// Called when the user navigates from the expanded surface back to the
/// parent view.
pub fn restore_layout<T: HostTree + ?Sized>(
    tree: &mut T,
    node: &T::Node,
    profile: &SurfaceProfile,
) {
    let Some(layout) = &profile.layout else {
        return;
    };
    for floor in layout.floors {
        if let Some(target) = tree.closest(node, floor.selector) {
            ensure_style(tree, &target, "height", &format!("{}px", floor.restore_px));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::host::mem::{MemNode, MemTree};
    use alloc::string::String;

    const DESIRED: &[f64] = &[2.5, 3.0, 3.5, 4.0];

    fn labels(tree: &MemTree, surface: &MemNode, profile: &SurfaceProfile) -> Vec<String> {
        entry::entries(tree, surface, profile)
            .into_iter()
            .map(|e| e.label)
            .collect()
    }

    #[test]
    fn injects_after_native_menu_in_ascending_order() {
        let mut tree = MemTree::new();
        let f = fixtures::speed_menu(&mut tree, fixtures::NATIVE_MENU);
        let profile = SurfaceProfile::menu();

        let report = reconcile(&mut tree, &f.menu, DESIRED, &InjectOptions::default(), &profile)
            .expect("template available");
        assert!(report.first_pass);
        assert_eq!(report.injected, DESIRED);

        let list = entry::entries(&tree, &f.menu, &profile);
        assert_eq!(list.len(), 12);
        let got: Vec<_> = list.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            got,
            ["0.25", "0.5", "0.75", "Normal", "1.25", "1.5", "1.75", "2", "2.5", "3.0", "3.5", "4.0"]
        );
        for e in &list[8..] {
            assert!(e.is_injected());
            assert_eq!(tree.bindings(&e.activator), [BindingKind::Preset]);
            assert_eq!(
                tree.attribute(&e.node, INJECTED_ATTR).as_deref(),
                Some(e.label.as_str())
            );
        }
        // Each injected entry is bound to its own value.
        let values: Vec<_> = list[8..].iter().map(|e| e.value).collect();
        assert_eq!(values, [Some(2.5), Some(3.0), Some(3.5), Some(4.0)]);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut tree = MemTree::new();
        let f = fixtures::chips_panel(&mut tree, fixtures::NATIVE_CHIPS);
        let profile = SurfaceProfile::chips();
        let opts = InjectOptions::default();

        reconcile(&mut tree, &f.chips, DESIRED, &opts, &profile).expect("first");
        let after_first = labels(&tree, &f.chips, &profile);
        let writes = tree.writes();
        let version = tree.structure_version();

        let report = reconcile(&mut tree, &f.chips, DESIRED, &opts, &profile).expect("second");
        assert!(!report.first_pass);
        assert!(!report.changed_structure());
        assert_eq!(report.bound_native, 0);
        assert_eq!(labels(&tree, &f.chips, &profile), after_first);
        assert_eq!(tree.writes(), writes, "second pass must not write");
        assert_eq!(tree.structure_version(), version);

        for e in entry::entries(&tree, &f.chips, &profile) {
            assert_eq!(tree.bindings(&e.activator).len(), 1, "{} bound twice", e.label);
        }
    }

    #[test]
    fn native_collision_is_replaced_once() {
        let mut tree = MemTree::new();
        let f = fixtures::speed_menu(&mut tree, &["0.5", "Normal", "1.5", "2", "3"]);
        let profile = SurfaceProfile::menu();

        let report =
            reconcile(&mut tree, &f.menu, DESIRED, &InjectOptions::default(), &profile).expect("ok");
        assert_eq!(report.removed_collisions, 1);

        let threes: Vec<_> = entry::entries(&tree, &f.menu, &profile)
            .into_iter()
            .filter(|e| e.value == Some(3.0))
            .collect();
        assert_eq!(threes.len(), 1);
        assert!(threes[0].is_injected());
    }

    #[test]
    fn native_collision_is_kept_without_the_option() {
        let mut tree = MemTree::new();
        let f = fixtures::speed_menu(&mut tree, &["0.5", "Normal", "1.5", "2", "3"]);
        let profile = SurfaceProfile::menu();
        let opts = InjectOptions {
            remove_native_collisions: false,
            bind_native: true,
        };

        let report = reconcile(&mut tree, &f.menu, DESIRED, &opts, &profile).expect("ok");
        assert_eq!(report.injected, [2.5, 3.5, 4.0]);
        let threes: Vec<_> = entry::entries(&tree, &f.menu, &profile)
            .into_iter()
            .filter(|e| e.value == Some(3.0))
            .collect();
        assert_eq!(threes.len(), 1);
        assert!(!threes[0].is_injected());
    }

    #[test]
    fn missing_entry_is_reinserted_in_order() {
        let mut tree = MemTree::new();
        let f = fixtures::speed_menu(&mut tree, fixtures::NATIVE_MENU);
        let profile = SurfaceProfile::menu();
        let opts = InjectOptions::default();
        reconcile(&mut tree, &f.menu, DESIRED, &opts, &profile).expect("first");

        // The host drops the injected 3.0 entry.
        let three = entry::entries(&tree, &f.menu, &profile)
            .into_iter()
            .find(|e| e.value == Some(3.0))
            .expect("injected");
        tree.remove(&three.node);

        let report = reconcile(&mut tree, &f.menu, &[4.0, 3.0, 3.5, 2.5], &opts, &profile)
            .expect("second");
        assert_eq!(report.injected, [3.0]);
        let got = labels(&tree, &f.menu, &profile);
        assert_eq!(&got[8..], ["2.5", "3.0", "3.5", "4.0"]);
    }

    #[test]
    fn promotional_chip_is_removed_and_stripped_from_clones() {
        let mut tree = MemTree::new();
        let f = fixtures::chips_panel(&mut tree, fixtures::NATIVE_CHIPS);
        fixtures::premium_chip(&mut tree, &f.chips);
        let profile = SurfaceProfile::chips();

        let report =
            reconcile(&mut tree, &f.chips, DESIRED, &InjectOptions::default(), &profile).expect("ok");
        assert_eq!(report.removed_redundant, 1);
        assert_eq!(
            labels(&tree, &f.chips, &profile),
            ["1.0", "1.25", "1.5", "2.0", "2.5", "3.0", "3.5", "4.0"]
        );
        assert!(
            tree.query(&f.chips, ".ytp-variable-speed-panel-premium-upsell-icon")
                .is_none()
        );
        // Only the native 1.0 chip keeps its sub-label.
        assert_eq!(
            tree.query_all(&f.chips, ".ytp-variable-speed-panel-preset-button-label-text")
                .len(),
            1
        );
    }

    #[test]
    fn clones_are_visible_and_ordered() {
        let mut tree = MemTree::new();
        let f = fixtures::chips_panel(&mut tree, fixtures::NATIVE_CHIPS);
        let first = tree
            .query(&f.chips, ".ytp-variable-speed-panel-preset-button-wrapper")
            .expect("chip");
        tree.set_attribute(&first, "aria-hidden", "true");
        tree.set_style(&first, "display", "none");
        let profile = SurfaceProfile::chips();

        reconcile(&mut tree, &f.chips, DESIRED, &InjectOptions::default(), &profile).expect("ok");
        for e in entry::entries(&tree, &f.chips, &profile).iter().filter(|e| e.is_injected()) {
            assert_eq!(tree.attribute(&e.node, "aria-hidden").as_deref(), Some("false"));
            assert_eq!(tree.style(&e.node, "display"), "");
            let expected = format!("{}", label::visual_order(e.value.expect("parsed")));
            assert_eq!(tree.style(&e.node, "order"), expected);
            assert_eq!(tree.attribute(&e.activator, "aria-pressed").as_deref(), Some("false"));
        }
    }

    #[test]
    fn native_entries_get_one_rate_hook() {
        let mut tree = MemTree::new();
        let f = fixtures::chips_panel(&mut tree, fixtures::NATIVE_CHIPS);
        let profile = SurfaceProfile::chips();
        let report =
            reconcile(&mut tree, &f.chips, DESIRED, &InjectOptions::default(), &profile).expect("ok");
        assert_eq!(report.bound_native, 4);
        for e in entry::entries(&tree, &f.chips, &profile).iter().filter(|e| !e.is_injected()) {
            assert_eq!(tree.bindings(&e.activator), [BindingKind::NativePreset]);
        }
    }

    #[test]
    fn empty_surface_reports_missing_template() {
        let mut tree = MemTree::new();
        let f = fixtures::chips_panel(&mut tree, &[]);
        let writes = tree.writes();
        let err = reconcile(
            &mut tree,
            &f.chips,
            DESIRED,
            &InjectOptions::default(),
            &SurfaceProfile::chips(),
        )
        .expect_err("nothing to clone");
        assert_eq!(err, Skip::TemplateMissing);
        assert_eq!(tree.writes(), writes);
        assert!(!tree.is_marked(&f.chips, Marker::Processed));
    }

    #[test]
    fn duplicate_injected_entries_are_collapsed() {
        let mut tree = MemTree::new();
        let f = fixtures::speed_menu(&mut tree, fixtures::NATIVE_MENU);
        let profile = SurfaceProfile::menu();
        let opts = InjectOptions::default();
        reconcile(&mut tree, &f.menu, DESIRED, &opts, &profile).expect("first");

        // The host re-renders by cloning one of our entries.
        let injected = entry::entries(&tree, &f.menu, &profile)
            .into_iter()
            .find(|e| e.is_injected())
            .expect("injected");
        let copy = tree.clone_deep(&injected.node).expect("alive");
        tree.insert_before(&f.menu, &copy, None);

        let report = reconcile(&mut tree, &f.menu, DESIRED, &opts, &profile).expect("second");
        assert_eq!(report.removed_duplicates, 1);
        assert_eq!(entry::entries(&tree, &f.menu, &profile).len(), 12);
    }

    #[test]
    fn relabeled_injected_entries_are_replaced_once() {
        let mut tree = MemTree::new();
        let f = fixtures::speed_menu(&mut tree, fixtures::NATIVE_MENU);
        let profile = SurfaceProfile::menu();
        let opts = InjectOptions::default();
        let desired = [2.5, 3.0];
        reconcile(&mut tree, &f.menu, &desired, &opts, &profile).expect("first");

        // The host blanks one label and rewrites another.
        for (old, new) in [("3.0", ""), ("2.5", "5")] {
            let e = entry::entries(&tree, &f.menu, &profile)
                .into_iter()
                .find(|e| e.label == old)
                .expect("injected entry");
            let label_node = entry::label_node_of(&tree, &e.activator, &profile).expect("label");
            tree.set_text(&label_node, new);
        }

        let report = reconcile(&mut tree, &f.menu, &desired, &opts, &profile).expect("second");
        assert_eq!(report.removed_stale, 2);
        assert_eq!(report.injected, desired);

        let third = reconcile(&mut tree, &f.menu, &desired, &opts, &profile).expect("third");
        assert!(!third.changed_structure(), "settled after the replacement");

        let injected: Vec<_> = entry::entries(&tree, &f.menu, &profile)
            .into_iter()
            .filter(|e| e.is_injected())
            .map(|e| (e.label, e.value))
            .collect();
        assert_eq!(
            injected,
            [(String::from("2.5"), Some(2.5)), (String::from("3.0"), Some(3.0))]
        );
        let tagged_three = tree.query_all(&f.menu, r#"[data-overspeed="3.0"]"#).len();
        assert_eq!(tagged_three, 1, "exactly one entry carries the 3.0 tag");
    }

    #[test]
    fn layout_expands_and_hook_attaches_once() {
        let mut tree = MemTree::new();
        let f = fixtures::chips_panel(&mut tree, fixtures::NATIVE_CHIPS);
        let profile = SurfaceProfile::chips();
        let opts = InjectOptions::default();

        reconcile(&mut tree, &f.chips, DESIRED, &opts, &profile).expect("first");
        assert_eq!(tree.style(&f.chips, "flex-wrap"), "wrap");
        assert_eq!(tree.style(&f.content, "min-height"), "230px");
        assert_eq!(tree.style(&f.settings.popup, "height"), "320px");
        assert_eq!(tree.style(&f.settings.panel, "height"), "320px");
        assert_eq!(tree.bindings(&f.settings.back), [BindingKind::RestoreLayout]);

        reconcile(&mut tree, &f.chips, DESIRED, &opts, &profile).expect("second");
        assert_eq!(tree.bindings(&f.settings.back), [BindingKind::RestoreLayout]);

        restore_layout(&mut tree, &f.settings.back, &profile);
        assert_eq!(tree.style(&f.settings.popup, "height"), "250px");
        assert_eq!(tree.style(&f.settings.panel, "height"), "250px");
    }

    #[test]
    fn unset_heights_are_left_alone() {
        let mut tree = MemTree::new();
        let f = fixtures::chips_panel(&mut tree, fixtures::NATIVE_CHIPS);
        tree.set_style(&f.settings.popup, "height", "");
        tree.set_style(&f.settings.panel, "height", "400px");
        reconcile(
            &mut tree,
            &f.chips,
            DESIRED,
            &InjectOptions::default(),
            &SurfaceProfile::chips(),
        )
        .expect("ok");
        assert_eq!(tree.style(&f.settings.popup, "height"), "");
        assert_eq!(tree.style(&f.settings.panel, "height"), "400px");
    }

    #[test]
    fn parse_px_reads_leading_digits() {
        assert_eq!(parse_px("250px"), Some(250));
        assert_eq!(parse_px(" 320 "), Some(320));
        assert_eq!(parse_px(""), None);
        assert_eq!(parse_px("auto"), None);
    }
}
