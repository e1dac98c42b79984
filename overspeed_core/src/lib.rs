// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Idempotent reconciliation of a host player's playback-speed menu.
//!
//! `overspeed_core` adds extra speed presets to a speed-selection surface that
//! lives inside a document it does not own, and keeps the injected and native
//! controls consistent with the active playback rate while the host keeps
//! re-rendering its menus. It is `no_std` compatible (with `alloc`) and talks
//! to the host only through the [`HostTree`](host::HostTree) and
//! [`PlaybackRate`](rate::PlaybackRate) traits.
//!
//! # Architecture
//!
//! One reconciliation pass runs the components leaf-first:
//!
//! ```text
//!   host mutation ──► ChangeScheduler::notify() ──► (next frame)
//!                                                       │
//!                 ┌─────────────────────────────────────┘
//!                 ▼
//!   locate::locate_deep() ──► classify::is_target_surface()
//!                                          │
//!                 ┌────────────────────────┘
//!                 ▼
//!   inject::reconcile() ──► sync::sync_surface() ──► idle until next mutation
//! ```
//!
//! **[`host`]** — The host contract and [`MemTree`](host::mem::MemTree), an
//! in-memory host with generational node handles.
//!
//! **[`label`]** — The label grammar shared by every component.
//!
//! **[`locate`]** — Deep Surface Locator: worklist traversal through
//! encapsulated sub-trees.
//!
//! **[`classify`]** — Menu Classifier: label-shape fingerprinting.
//!
//! **[`inject`]** — Preset Injector: idempotent structural reconciliation.
//!
//! **[`sync`]** — State Synchronizer: selection flags, readouts, summary rows.
//!
//! **[`schedule`]** — Change Scheduler: coalesces mutation bursts into one pass.
//!
//! **[`engine`]** — Ties the components together and handles activations.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types, with
//! a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod classify;
pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod host;
pub mod inject;
pub mod label;
pub mod locate;
pub mod rate;
pub mod schedule;
pub mod sync;
pub mod trace;

#[cfg(test)]
mod fixtures;
