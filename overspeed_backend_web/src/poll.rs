// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-interval polling, for hosts whose structural mutations cannot be
//! observed.

use alloc::boxed::Box;
use core::cell::Cell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setInterval")]
    fn set_interval(callback: &JsValue, delay_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearInterval")]
    fn clear_interval(id: i32);
}

/// Calls a callback every `interval_ms` milliseconds until stopped or
/// dropped.
pub struct PollLoop {
    closure: Closure<dyn FnMut()>,
    interval_ms: u32,
    interval_id: Cell<Option<i32>>,
}

impl PollLoop {
    /// Creates a loop that is **not yet running**.
    pub fn new(interval_ms: u32, callback: impl FnMut() + 'static) -> Self {
        Self {
            closure: Closure::wrap(Box::new(callback) as Box<dyn FnMut()>),
            interval_ms,
            interval_id: Cell::new(None),
        }
    }

    /// Starts polling. If already running, this is a no-op.
    pub fn start(&self) {
        if self.interval_id.get().is_some() {
            return;
        }
        let delay = i32::try_from(self.interval_ms).unwrap_or(i32::MAX);
        let id = set_interval(self.closure.as_ref().unchecked_ref(), delay);
        self.interval_id.set(Some(id));
    }

    /// Stops polling. Can be restarted with [`start`](Self::start).
    pub fn stop(&self) {
        if let Some(id) = self.interval_id.take() {
            clear_interval(id);
        }
    }

    /// Returns `true` if the loop is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.interval_id.get().is_some()
    }

    /// Returns the polling interval.
    #[must_use]
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

impl core::fmt::Debug for PollLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PollLoop")
            .field("interval_ms", &self.interval_ms)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
