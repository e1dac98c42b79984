// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot `requestAnimationFrame` trigger.
//!
//! [`FrameTrigger`] defers a callback to the next animation frame. Unlike a
//! render loop it does not re-register itself: each [`request`] schedules at
//! most one callback, and requests made while one is pending are folded into
//! it. The callback may request the next frame itself.
//!
//! [`request`]: FrameTrigger::request

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

// Direct global bindings instead of `web_sys::Window` methods, so a frame
// request does not need to fetch the Window object.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// Runs a callback on the next animation frame, once per request.
pub struct FrameTrigger {
    inner: Rc<FrameInner>,
}

type FrameClosure = Closure<dyn FnMut(f64)>;

struct FrameInner {
    /// The JS closure registered with `requestAnimationFrame`. Created once
    /// and reused for every request.
    closure: RefCell<Option<FrameClosure>>,

    /// The user callback.
    callback: RefCell<Box<dyn FnMut()>>,

    /// Whether a frame has been requested and not yet fired.
    pending: Cell<bool>,

    /// The ID of the pending request, used by [`cancel_animation_frame`].
    raf_id: Cell<i32>,

    /// Frames fired so far.
    fired: Cell<u64>,
}

impl FrameTrigger {
    /// Creates a trigger with no frame pending.
    pub fn new(callback: impl FnMut() + 'static) -> Self {
        let inner = Rc::new(FrameInner {
            closure: RefCell::new(None),
            callback: RefCell::new(Box::new(callback)),
            pending: Cell::new(false),
            raf_id: Cell::new(0),
            fired: Cell::new(0),
        });

        let weak = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move |_timestamp_ms: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.pending.replace(false) {
                return;
            }
            inner.fired.set(inner.fired.get() + 1);
            inner.callback.borrow_mut()();
        }) as Box<dyn FnMut(f64)>);
        *inner.closure.borrow_mut() = Some(closure);

        Self { inner }
    }

    /// Requests the callback on the next frame.
    ///
    /// Returns `false` if a frame was already pending.
    pub fn request(&self) -> bool {
        if self.inner.pending.get() {
            return false;
        }
        let Some(ref closure) = *self.inner.closure.borrow() else {
            return false;
        };
        let id = request_animation_frame(closure.as_ref().unchecked_ref());
        self.inner.raf_id.set(id);
        self.inner.pending.set(true);
        true
    }

    /// Cancels a pending frame, if any.
    pub fn cancel(&self) {
        if self.inner.pending.replace(false) {
            cancel_animation_frame(self.inner.raf_id.get());
        }
    }

    /// Returns `true` if a frame is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get()
    }

    /// Returns the number of frames that have fired.
    #[must_use]
    pub fn fired(&self) -> u64 {
        self.inner.fired.get()
    }
}

impl Drop for FrameTrigger {
    fn drop(&mut self) {
        self.cancel();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for FrameTrigger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameTrigger")
            .field("pending", &self.inner.pending.get())
            .field("fired", &self.inner.fired.get())
            .finish()
    }
}
