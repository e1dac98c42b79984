// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural mutation feed.
//!
//! [`MutationWatch`] observes `childList` changes anywhere under a root and
//! calls back once per delivered batch. Attribute and text changes are not
//! observed: the engine's own selection and readout writes would otherwise
//! feed straight back into the scheduler.
//!
//! Changes inside a shadow root are not reported to observers of its host's
//! tree, so each shadow root must be added with [`MutationWatch::watch`].

use alloc::boxed::Box;

use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{MutationObserver, MutationObserverInit, Node};

type MutationClosure = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// A connected `MutationObserver`. Disconnects on drop.
pub struct MutationWatch {
    observer: MutationObserver,
    // Kept alive for as long as the observer may call it.
    _closure: MutationClosure,
}

impl MutationWatch {
    /// Starts observing structural changes under `root`.
    ///
    /// # Errors
    ///
    /// Returns the browser's exception if the observer cannot be created or
    /// attached.
    pub fn observe(root: &Node, mut on_change: impl FnMut(u32) + 'static) -> Result<Self, JsValue> {
        let closure: MutationClosure = Closure::wrap(Box::new(
            move |records: js_sys::Array, _observer: MutationObserver| {
                on_change(records.length());
            },
        )
            as Box<dyn FnMut(js_sys::Array, MutationObserver)>);
        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())?;

        let watch = Self {
            observer,
            _closure: closure,
        };
        watch.watch(root)?;
        Ok(watch)
    }

    /// Adds `root` to the observed trees. Batches from every watched tree
    /// reach the same callback.
    ///
    /// # Errors
    ///
    /// Returns the browser's exception if the observer cannot be attached.
    pub fn watch(&self, root: &Node) -> Result<(), JsValue> {
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        self.observer.observe_with_options(root, &init)
    }

    /// Stops observing. Pending records are discarded.
    pub fn disconnect(&self) {
        self.observer.disconnect();
    }
}

impl Drop for MutationWatch {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl core::fmt::Debug for MutationWatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MutationWatch").finish_non_exhaustive()
    }
}
