// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reconciliation engine.
//!
//! [`Engine`] runs one full pass (locate, classify, inject, synchronize) over
//! every surface reachable from the host's observation root, and handles the
//! activation behaviors the injector bound. Surfaces are located fresh on
//! every call; the engine keeps no node handles between calls.
//!
//! Failures are contained per surface: a surface that cannot be reconciled
//! is reported through the [`Tracer`] and the pass moves on.

use alloc::vec::Vec;

use crate::classify::Fingerprint;
use crate::config::{EngineConfig, SurfaceKind, SurfaceProfile};
use crate::entry::{self, INJECTED_ATTR};
use crate::error::Skip;
use crate::host::{BindingKind, HostEvent, HostTree, Marker};
use crate::inject;
use crate::label;
use crate::locate;
use crate::rate::PlaybackRate;
use crate::sync;
use crate::trace::{
    InjectEvent, PassBeginEvent, PassSummary, RateEvent, SkipEvent, SurfaceEvent, Tracer, Trigger,
};

/// A located and accepted surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface<N> {
    /// The surface container.
    pub node: N,
    /// Index of the matching profile in [`EngineConfig::profiles`].
    pub profile: usize,
    /// The classifier's view of the surface when it was located.
    pub fingerprint: Fingerprint,
}

/// What one activation did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Activation {
    /// The rate written, if the activation was a preset.
    pub rate: Option<f64>,
    /// Surfaces resynchronized.
    pub surfaces: usize,
    /// Whether a capped range control was forced to its maximum.
    pub slider_clamped: bool,
    /// Whether the parent-view control was clicked.
    pub returned_to_parent: bool,
}

/// Reconciles host surfaces with a configured set of presets.
#[derive(Clone, Debug)]
pub struct Engine {
    config: EngineConfig,
    pass_index: u64,
}

impl Engine {
    /// Creates an engine, normalizing the desired values: values outside
    /// `(0, 8]` are dropped, the rest sorted ascending without duplicates.
    #[must_use]
    pub fn new(mut config: EngineConfig) -> Self {
        config.desired.retain(|v| label::in_range(*v));
        config.desired.sort_by(f64::total_cmp);
        config.desired.dedup();
        Self {
            config,
            pass_index: 0,
        }
    }

    /// Returns the normalized configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the number of passes run so far.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.pass_index
    }

    /// Returns the profile a located surface matched.
    #[must_use]
    pub fn profile<N>(&self, surface: &Surface<N>) -> &SurfaceProfile {
        &self.config.profiles[surface.profile]
    }

    /// Locates and classifies every surface reachable from the root.
    ///
    /// Read-only. Surfaces come in profile order, then discovery order; a
    /// container is attributed to the first profile that accepts it.
    pub fn surfaces<T: HostTree + ?Sized>(&self, tree: &T) -> Vec<Surface<T::Node>> {
        self.locate(tree).2
    }

    /// Returns `(menus, candidates, surfaces)`.
    fn locate<T: HostTree + ?Sized>(&self, tree: &T) -> (usize, usize, Vec<Surface<T::Node>>) {
        let Some(root) = tree.root() else {
            return (0, 0, Vec::new());
        };
        let mut menus_seen: Vec<T::Node> = Vec::new();
        let mut candidates: Vec<T::Node> = Vec::new();
        let mut surfaces: Vec<Surface<T::Node>> = Vec::new();

        for (index, profile) in self.config.profiles.iter().enumerate() {
            let menus = locate::locate_deep(tree, &root, profile.menu);
            for menu in &menus {
                if !menus_seen.contains(menu) {
                    menus_seen.push(menu.clone());
                }
            }
            for node in locate::locate_all(tree, &menus, profile.container) {
                if !candidates.contains(&node) {
                    candidates.push(node.clone());
                }
                if surfaces.iter().any(|s| s.node == node) {
                    continue;
                }
                let fingerprint = Fingerprint::of(&entry::entries(tree, &node, profile), profile);
                if fingerprint.accepts(profile) {
                    surfaces.push(Surface {
                        node,
                        profile: index,
                        fingerprint,
                    });
                }
            }
        }
        (menus_seen.len(), candidates.len(), surfaces)
    }

    /// Runs one reconciliation pass.
    pub fn reconcile_pass<T: HostTree + ?Sized, R: PlaybackRate + ?Sized>(
        &mut self,
        tree: &mut T,
        rate: &R,
        trigger: Trigger,
        tracer: &mut Tracer<'_>,
    ) -> PassSummary {
        self.pass_index += 1;
        let pass_index = self.pass_index;
        tracer.pass_begin(&PassBeginEvent {
            pass_index,
            trigger,
        });

        let (menus, candidates, surfaces) = self.locate(tree);
        let mut summary = PassSummary {
            pass_index,
            menus,
            candidates,
            surfaces: surfaces.len(),
            ..PassSummary::default()
        };
        if menus == 0 {
            record_skip(tracer, &mut summary, None, Skip::LocatorMiss);
        }

        let current = rate.rate();
        for surface in &surfaces {
            let profile = &self.config.profiles[surface.profile];
            let kind = Some(profile.kind);
            tracer.surface(&SurfaceEvent {
                pass_index,
                kind: profile.kind,
                entries: surface.fingerprint.entries,
                first_seen: !tree.is_marked(&surface.node, Marker::Processed),
            });

            match inject::reconcile(
                tree,
                &surface.node,
                &self.config.desired,
                &self.config.options,
                profile,
            ) {
                Ok(report) => {
                    let removed = report.removed_redundant
                        + report.removed_collisions
                        + report.removed_duplicates
                        + report.removed_stale;
                    summary.injected += report.injected.len();
                    summary.removed += removed;
                    if report.changed_structure() || report.bound_native > 0 {
                        tracer.inject(&InjectEvent {
                            pass_index,
                            kind: profile.kind,
                            injected: report.injected.len(),
                            removed,
                            bound_native: report.bound_native,
                        });
                    }
                    for reason in report.skipped {
                        record_skip(tracer, &mut summary, kind, reason);
                    }
                }
                Err(reason) => record_skip(tracer, &mut summary, kind, reason),
            }

            let synced = sync::sync_surface(tree, &surface.node, profile, current);
            summary.sync_writes += synced.writes();
            for reason in synced.skipped {
                record_skip(tracer, &mut summary, kind, reason);
            }
        }

        tracer.pass_summary(&summary);
        summary
    }

    /// Synchronizes every located surface with `rate`, returning how many
    /// surfaces were visited.
    pub fn sync_all<T: HostTree + ?Sized>(&self, tree: &mut T, rate: f64) -> usize {
        let surfaces = self.surfaces(tree);
        for surface in &surfaces {
            sync::sync_surface(tree, &surface.node, self.profile(surface), rate);
        }
        surfaces.len()
    }

    /// Handles an activation the host routed back for `node`.
    ///
    /// `kind` is the behavior bound to `node` by the injector. Preset kinds
    /// write the entry's value to `rate` and resynchronize every surface;
    /// [`BindingKind::RestoreLayout`] resets expanded layout bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Skip::MissingCollaboratorNode`] when `node` is no longer
    /// inside a known surface, and [`Skip::UnparseableLabel`] when its label
    /// is not a speed.
    pub fn activate<T: HostTree + ?Sized, R: PlaybackRate + ?Sized>(
        &mut self,
        tree: &mut T,
        rate: &mut R,
        node: &T::Node,
        kind: BindingKind,
        tracer: &mut Tracer<'_>,
    ) -> Result<Activation, Skip> {
        if kind == BindingKind::RestoreLayout {
            for profile in self.config.profiles.iter().filter(|p| p.layout.is_some()) {
                inject::restore_layout(tree, node, profile);
            }
            return Ok(Activation::default());
        }

        let (surface_node, profile_index, value) = self.resolve(tree, node)?;
        let profile = &self.config.profiles[profile_index];

        rate.set_rate(value);

        let mut synced = 0;
        let mut seen_self = false;
        for surface in self.surfaces(tree) {
            seen_self |= surface.node == surface_node;
            sync::sync_surface(tree, &surface.node, self.profile(&surface), value);
            synced += 1;
        }
        if !seen_self {
            sync::sync_surface(tree, &surface_node, profile, value);
            synced += 1;
        }

        let slider_clamped = match sync::clamp_slider(tree, &surface_node, profile, value) {
            Ok(clamped) => clamped,
            Err(reason) => {
                tracer.skip(&SkipEvent {
                    pass_index: self.pass_index,
                    kind: Some(profile.kind),
                    reason,
                });
                false
            }
        };
        // Host listeners on the range control may have pulled the rate back
        // to the control's cap.
        if rate.rate() != value {
            rate.set_rate(value);
        }

        let mut returned_to_parent = false;
        if kind == BindingKind::Preset && profile.return_to_parent {
            let back = profile.navigation.and_then(|nav| {
                let panel = tree.closest(&surface_node, nav.panel)?;
                tree.query(&panel, nav.back_button)
            });
            if let Some(back) = back {
                tree.dispatch(&back, HostEvent::Click);
                returned_to_parent = true;
            }
        }

        tracer.rate(&RateEvent {
            rate: value,
            source: kind,
            surfaces: synced,
            slider_clamped,
        });
        Ok(Activation {
            rate: Some(value),
            surfaces: synced,
            slider_clamped,
            returned_to_parent,
        })
    }

    /// Finds the surface, profile and value of an activated entry.
    fn resolve<T: HostTree + ?Sized>(
        &self,
        tree: &T,
        node: &T::Node,
    ) -> Result<(T::Node, usize, f64), Skip> {
        for (index, profile) in self.config.profiles.iter().enumerate() {
            let Some(entry_node) = tree.closest(node, profile.entry) else {
                continue;
            };
            let Some(surface) = tree.closest(&entry_node, profile.container) else {
                continue;
            };
            let tagged = tree
                .attribute(&entry_node, INJECTED_ATTR)
                .and_then(|t| label::parse(&t));
            let read = entry::read_entry(tree, entry_node, profile);
            return read
                .value
                .or(tagged)
                .map(|v| (surface, index, v))
                .ok_or(Skip::UnparseableLabel);
        }
        Err(Skip::MissingCollaboratorNode)
    }
}

fn record_skip(
    tracer: &mut Tracer<'_>,
    summary: &mut PassSummary,
    kind: Option<SurfaceKind>,
    reason: Skip,
) {
    summary.skipped += 1;
    tracer.skip(&SkipEvent {
        pass_index: summary.pass_index,
        kind,
        reason,
    });
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
