// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine and surface configuration.
//!
//! The host exposes no semantic marker for "this is the speed menu", so every
//! host-specific string the engine relies on lives here rather than in the
//! components. A [`SurfaceProfile`] describes one surface variant; an
//! [`EngineConfig`] bundles the desired presets with the profiles to look
//! for. The `const fn` presets track the current host markup; adjust a copy
//! when the host's UI drifts.

use alloc::vec;
use alloc::vec::Vec;

use crate::label::BASELINE_LABEL;
use crate::schedule::SchedulerStrategy;

/// Which family of host UI a profile targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// A row of preset chips next to a continuous slider.
    Chips,
    /// A plain list of radio menu items.
    Menu,
}

impl SurfaceKind {
    /// Returns the short name used in trace output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chips => "chips",
            Self::Menu => "menu",
        }
    }
}

/// How an entry shows that it is the current selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Attribute written on the entry's activator.
    pub attribute: &'static str,
    /// Value meaning "selected".
    pub on: &'static str,
    /// Value meaning "not selected".
    pub off: &'static str,
}

/// Text format for standalone numeric readouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadoutFormat {
    /// Two decimals and a trailing `x`: `"3.50x"`.
    TwoDecimals,
    /// The preset label and a trailing `x`: `"3.0x"`.
    Compact,
}

/// Standalone readouts showing the current rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Readouts {
    /// Ancestor of the surface that contains the readouts.
    pub scope: &'static str,
    /// Readout elements inside `scope`.
    pub selectors: &'static [&'static str],
    /// How the rate is rendered.
    pub format: ReadoutFormat,
}

/// A row in an outer menu level that summarizes the current rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SummaryRow {
    /// Ancestor of the surface holding the whole menu.
    pub scope: &'static str,
    /// Row elements inside `scope`.
    pub row: &'static str,
    /// Title element inside a row.
    pub title: &'static str,
    /// Titles identifying the speed row.
    pub titles: &'static [&'static str],
    /// Element inside the row showing the current value.
    pub content: &'static str,
}

/// A continuous range control that cannot represent rates above its max.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slider {
    /// Ancestor of the surface containing the slider.
    pub scope: &'static str,
    /// The range input inside `scope`.
    pub selector: &'static str,
    /// Maximum assumed when the `max` attribute is missing or unparseable.
    pub default_max: f64,
    /// Custom property the host uses to paint the filled track.
    pub fill_property: &'static str,
}

/// Minimum height enforced on an ancestor while presets are expanded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeightFloor {
    /// Ancestor of the surface to adjust.
    pub selector: &'static str,
    /// Raised to this height when an inline height below it is set.
    pub min_px: u32,
    /// Height restored when the user navigates back to the parent view.
    pub restore_px: u32,
}

/// Layout changes that make room for the injected entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutExpansion {
    /// Inline styles applied to the surface container.
    pub container: &'static [(&'static str, &'static str)],
    /// Ancestor panel that grows with the container.
    pub panel: &'static str,
    /// Inline styles applied to `panel`.
    pub panel_styles: &'static [(&'static str, &'static str)],
    /// Fixed-height ancestors to raise and later restore.
    pub floors: &'static [HeightFloor],
}

/// How the surface connects to its parent view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Navigation {
    /// Ancestor panel of the surface.
    pub panel: &'static str,
    /// Control inside `panel` that returns to the parent view.
    pub back_button: &'static str,
}

/// Describes one variant of the speed-selection surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceProfile {
    /// Which family of host UI this is.
    pub kind: SurfaceKind,
    /// Menus to search, located from the observation root.
    pub menu: &'static str,
    /// Candidate surface containers, located inside each menu.
    pub container: &'static str,
    /// Entries inside a container.
    pub entry: &'static str,
    /// Clickable element inside an entry; the entry itself when `None`.
    pub activator: Option<&'static str>,
    /// Label element inside the activator; the activator's text when `None`
    /// or missing.
    pub label: Option<&'static str>,
    /// Minimum number of distinct parseable labels for a match.
    pub min_entries: usize,
    /// Literal label that denotes the 1× rate.
    pub baseline_label: &'static str,
    /// Rates whose presence also counts as a baseline marker.
    pub baseline_markers: &'static [f64],
    /// Selection indicator written by the synchronizer.
    pub selection: Selection,
    /// Sub-elements stripped from cloned entries.
    pub decorations: &'static [&'static str],
    /// Native entries containing one of these are removed outright.
    pub redundant: &'static [&'static str],
    /// Standalone readouts, if the variant has them.
    pub readouts: Option<Readouts>,
    /// Summary row in the parent menu, if any.
    pub summary: Option<SummaryRow>,
    /// Range control capped below the injected presets, if any.
    pub slider: Option<Slider>,
    /// Layout expansion for fixed-height containers, if needed.
    pub layout: Option<LayoutExpansion>,
    /// Parent-view navigation, if the surface is a sub-view.
    pub navigation: Option<Navigation>,
    /// Whether selecting an entry returns to the parent view.
    pub return_to_parent: bool,
}

const SPEED_ROW: SummaryRow = SummaryRow {
    scope: ".ytp-settings-menu",
    row: ".ytp-menuitem",
    title: ".ytp-menuitem-label",
    titles: &["Playback speed"],
    content: ".ytp-menuitem-content",
};

const PANEL_NAVIGATION: Navigation = Navigation {
    panel: ".ytp-panel",
    back_button: ".ytp-panel-back-button",
};

impl SurfaceProfile {
    /// The preset-chip panel shown next to the variable speed slider.
    #[must_use]
    pub const fn chips() -> Self {
        Self {
            kind: SurfaceKind::Chips,
            menu: ".ytp-settings-menu",
            container: ".ytp-variable-speed-panel-chips",
            entry: ".ytp-variable-speed-panel-preset-button-wrapper",
            activator: Some("button"),
            label: Some("span"),
            min_entries: 2,
            baseline_label: BASELINE_LABEL,
            baseline_markers: &[1.0, 2.0],
            selection: Selection {
                attribute: "aria-pressed",
                on: "true",
                off: "false",
            },
            decorations: &[
                ".ytp-variable-speed-panel-premium-upsell-icon",
                ".ytp-variable-speed-panel-preset-button-label-text",
            ],
            redundant: &[".ytp-variable-speed-panel-premium-upsell-icon"],
            readouts: Some(Readouts {
                scope: ".ytp-variable-speed-panel-content",
                selectors: &[
                    ".ytp-variable-speed-panel-display span",
                    ".ytp-speedslider-text",
                ],
                format: ReadoutFormat::TwoDecimals,
            }),
            summary: Some(SPEED_ROW),
            slider: Some(Slider {
                scope: ".ytp-variable-speed-panel-content",
                selector: ".ytp-input-slider",
                default_max: 2.0,
                fill_property: "--yt-slider-shape-gradient-percent",
            }),
            layout: Some(LayoutExpansion {
                container: &[
                    ("flex-wrap", "wrap"),
                    ("height", "auto"),
                    ("justify-content", "flex-start"),
                    ("gap", "8px"),
                    ("padding-bottom", "16px"),
                ],
                panel: ".ytp-variable-speed-panel-content",
                panel_styles: &[("height", "auto"), ("min-height", "230px")],
                floors: &[
                    HeightFloor {
                        selector: ".ytp-popup",
                        min_px: 320,
                        restore_px: 250,
                    },
                    HeightFloor {
                        selector: ".ytp-panel",
                        min_px: 320,
                        restore_px: 250,
                    },
                ],
            }),
            navigation: Some(PANEL_NAVIGATION),
            return_to_parent: false,
        }
    }

    /// The classic radio-item speed submenu.
    #[must_use]
    pub const fn menu() -> Self {
        Self {
            kind: SurfaceKind::Menu,
            menu: ".ytp-settings-menu",
            container: ".ytp-panel-menu",
            entry: ".ytp-menuitem",
            activator: None,
            label: Some(".ytp-menuitem-label"),
            min_entries: 5,
            baseline_label: BASELINE_LABEL,
            baseline_markers: &[2.0],
            selection: Selection {
                attribute: "aria-checked",
                on: "true",
                off: "false",
            },
            decorations: &[],
            redundant: &[],
            readouts: None,
            summary: Some(SPEED_ROW),
            slider: None,
            layout: None,
            navigation: Some(PANEL_NAVIGATION),
            return_to_parent: true,
        }
    }
}

/// Options for the preset injector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InjectOptions {
    /// Remove native entries whose value is one of the desired presets, so
    /// exactly one injected entry represents it.
    pub remove_native_collisions: bool,
    /// Attach a rate-writing hook to native entries as well.
    pub bind_native: bool,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            remove_native_collisions: true,
            bind_native: true,
        }
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Preset values to add. Normalized by the engine: out-of-range values
    /// dropped, sorted ascending, duplicates removed.
    pub desired: Vec<f64>,
    /// Injector options.
    pub options: InjectOptions,
    /// Surface variants to look for, in processing order.
    pub profiles: Vec<SurfaceProfile>,
    /// How passes are triggered.
    pub strategy: SchedulerStrategy,
}

impl EngineConfig {
    /// The default setup: 2.5×, 3×, 3.5× and 4× on both surface variants.
    #[must_use]
    pub fn youtube() -> Self {
        Self {
            desired: vec![2.5, 3.0, 3.5, 4.0],
            options: InjectOptions::default(),
            profiles: vec![SurfaceProfile::chips(), SurfaceProfile::menu()],
            strategy: SchedulerStrategy::NextFrame,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::youtube()
    }
}
