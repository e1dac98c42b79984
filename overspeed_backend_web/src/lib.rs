// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for overspeed.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomTree`]: the live document as a [`HostTree`]
//! - [`FrameTrigger`]: one-shot `requestAnimationFrame` callback
//! - [`PollLoop`]: `setInterval` fallback when mutations cannot be observed
//! - [`MutationWatch`]: `MutationObserver` over `childList` + `subtree`
//! - [`MediaRate`]: playback rate of the page's `video` elements
//! - [`ConsoleSink`]: trace events to `console.log`

#![no_std]

extern crate alloc;

mod console;
mod dom;
mod media;
mod observer;
mod poll;
mod raf;

pub use console::ConsoleSink;
pub use dom::{ActivationHandler, DomTree};
pub use media::MediaRate;
pub use observer::MutationWatch;
pub use overspeed_core::host::HostTree;
pub use poll::PollLoop;
pub use raf::FrameTrigger;
