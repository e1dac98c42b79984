// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host markup shared by the unit tests.

use crate::host::HostTree as _;
use crate::host::mem::{MemNode, MemTree};

/// The native simple-menu presets.
pub(crate) const NATIVE_MENU: &[&str] = &[
    "0.25", "0.5", "0.75", "Normal", "1.25", "1.5", "1.75", "2",
];

/// The native preset chips; [`premium_chip`] adds the promotional 3.0 chip.
pub(crate) const NATIVE_CHIPS: &[&str] = &["1.0", "1.25", "1.5", "2.0"];

pub(crate) struct Settings {
    pub(crate) popup: MemNode,
    pub(crate) panel: MemNode,
    pub(crate) back: MemNode,
    pub(crate) summary: MemNode,
}

pub(crate) struct ChipsFixture {
    pub(crate) settings: Settings,
    pub(crate) content: MemNode,
    pub(crate) display: MemNode,
    pub(crate) slider_text: MemNode,
    pub(crate) slider: MemNode,
    pub(crate) chips: MemNode,
}

pub(crate) struct MenuFixture {
    pub(crate) settings: Settings,
    pub(crate) menu: MemNode,
}

/// Builds the settings popup with a main panel (holding the speed summary
/// row) and an empty sub-panel with a back button.
fn settings(tree: &mut MemTree, parent: &MemNode) -> Settings {
    let popup = tree.element(parent, "div.ytp-popup.ytp-settings-menu", &[]);
    tree.set_style(&popup, "height", "250px");

    let main = tree.element(&popup, "div.ytp-panel", &[]);
    let main_menu = tree.element(&main, "div.ytp-panel-menu", &[]);
    let quality = tree.element(&main_menu, "div.ytp-menuitem", &[]);
    tree.text_element(&quality, "div.ytp-menuitem-label", "Quality");
    tree.text_element(&quality, "div.ytp-menuitem-content", "Auto");
    let speed = tree.element(&main_menu, "div.ytp-menuitem", &[]);
    tree.text_element(&speed, "div.ytp-menuitem-label", "Playback speed");
    let summary = tree.text_element(&speed, "div.ytp-menuitem-content", "Normal");

    let panel = tree.element(&popup, "div.ytp-panel", &[]);
    tree.set_style(&panel, "height", "250px");
    let header = tree.element(&panel, "div.ytp-panel-header", &[]);
    let back = tree.element(&header, "button.ytp-panel-back-button", &[]);

    Settings {
        popup,
        panel,
        back,
        summary,
    }
}

/// Appends one native chip.
pub(crate) fn chip(tree: &mut MemTree, chips: &MemNode, label: &str) -> MemNode {
    let wrapper = tree.element(
        chips,
        "div.ytp-variable-speed-panel-preset-button-wrapper",
        &[("aria-hidden", "false")],
    );
    let button = tree.element(
        &wrapper,
        "button.ytp-variable-speed-panel-preset-button",
        &[("aria-pressed", "false")],
    );
    tree.text_element(&button, "span", label);
    if label == "1.0" {
        tree.text_element(
            &wrapper,
            "div.ytp-variable-speed-panel-preset-button-label-text",
            "Normal",
        );
    }
    wrapper
}

/// Appends the promotional chip the host shows for a paid 3× preset.
pub(crate) fn premium_chip(tree: &mut MemTree, chips: &MemNode) -> MemNode {
    let wrapper = chip(tree, chips, "3.0");
    let button = tree
        .query(&wrapper, "button")
        .expect("chip has a button");
    tree.element(
        &button,
        "div.ytp-variable-speed-panel-premium-upsell-icon",
        &[],
    );
    wrapper
}

/// Builds the variable speed panel with native chips under `body`.
pub(crate) fn chips_panel(tree: &mut MemTree, labels: &[&str]) -> ChipsFixture {
    let body = tree.body();
    chips_panel_in(tree, &body, labels)
}

/// Builds the variable speed panel under `parent`.
pub(crate) fn chips_panel_in(
    tree: &mut MemTree,
    parent: &MemNode,
    labels: &[&str],
) -> ChipsFixture {
    let settings = settings(tree, parent);
    let content = tree.element(&settings.panel, "div.ytp-variable-speed-panel-content", &[]);
    let display_box = tree.element(&content, "div.ytp-variable-speed-panel-display", &[]);
    let display = tree.text_element(&display_box, "span", "1.00x");
    let slider_text = tree.text_element(&content, "div.ytp-speedslider-text", "1.00x");
    let slider = tree.element(
        &content,
        "input.ytp-input-slider",
        &[("type", "range"), ("min", "0.25"), ("max", "2"), ("step", "0.05")],
    );
    let chips = tree.element(&content, "div.ytp-variable-speed-panel-chips", &[]);
    for label in labels {
        chip(tree, &chips, label);
    }
    ChipsFixture {
        settings,
        content,
        display,
        slider_text,
        slider,
        chips,
    }
}

/// Builds the classic speed submenu under `body`.
pub(crate) fn speed_menu(tree: &mut MemTree, labels: &[&str]) -> MenuFixture {
    let body = tree.body();
    let settings = settings(tree, &body);
    let menu = tree.element(&settings.panel, "div.ytp-panel-menu", &[("role", "menu")]);
    for label in labels {
        let checked = if *label == "Normal" { "true" } else { "false" };
        let item = tree.element(
            &menu,
            "div.ytp-menuitem",
            &[("role", "menuitemradio"), ("aria-checked", checked)],
        );
        tree.text_element(&item, "div.ytp-menuitem-label", label);
    }
    MenuFixture { settings, menu }
}
