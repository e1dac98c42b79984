// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content-script entry point.
//!
//! Loaded into the host page with no arguments. [`main`] wires the engine to
//! the live document and then runs for the lifetime of the page:
//!
//! - host mutations are coalesced by a [`ChangeScheduler`] into one pass on
//!   the next animation frame; shadow roots found by a pass are observed
//!   from then on,
//! - with the poll strategy, or when the document has no body to observe, a
//!   pass runs on a fixed interval instead,
//! - activations of bound entries are routed back to [`Engine::activate`].
//!
//! Build with: `wasm-pack build --target no-modules overspeed_content`
//!
//! Enable the `console-trace` feature to log passes to the browser console.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

#[cfg(feature = "console-trace")]
use overspeed_backend_web::ConsoleSink;
use overspeed_backend_web::{
    ActivationHandler, DomTree, FrameTrigger, MediaRate, MutationWatch, PollLoop,
};
use overspeed_core::config::EngineConfig;
use overspeed_core::engine::Engine;
use overspeed_core::host::{BindingKind, HostTree as _};
use overspeed_core::locate;
use overspeed_core::schedule::{ChangeScheduler, SchedulerStrategy};
use overspeed_core::trace::{SkipEvent, Tracer, Trigger};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Node};

/// Entry point for the content script.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("overspeed: no document"))?;

    let runtime = Runtime::new(document, EngineConfig::youtube());
    runtime.start();
    // The page owns the runtime from here on; every callback holds a weak
    // reference to it.
    core::mem::forget(runtime);

    Ok(())
}

/// What feeds change notifications into the runtime.
enum Feed {
    Mutations { watch: MutationWatch },
    Poll { _poll: PollLoop },
}

struct Runtime {
    engine: RefCell<Engine>,
    tree: RefCell<DomTree>,
    media: RefCell<MediaRate>,
    scheduler: RefCell<ChangeScheduler>,
    frame: FrameTrigger,
    feed: RefCell<Option<Feed>>,
    /// Activations waiting for the current pass or activation to return.
    pending: RefCell<VecDeque<(Node, BindingKind)>>,
    busy: Cell<bool>,
}

impl Runtime {
    fn new(document: Document, config: EngineConfig) -> Rc<Self> {
        let strategy = config.strategy;
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let on_activate: ActivationHandler = {
                let weak = weak.clone();
                Rc::new(move |node: Node, kind: BindingKind| {
                    if let Some(rt) = weak.upgrade() {
                        rt.on_activation(node, kind);
                    }
                })
            };
            let frame = {
                let weak = weak.clone();
                FrameTrigger::new(move || {
                    if let Some(rt) = weak.upgrade() {
                        rt.run_pass(Trigger::Mutation);
                    }
                })
            };
            Self {
                engine: RefCell::new(Engine::new(config)),
                tree: RefCell::new(DomTree::new(document.clone(), on_activate)),
                media: RefCell::new(MediaRate::new(document)),
                scheduler: RefCell::new(ChangeScheduler::new(strategy)),
                frame,
                feed: RefCell::new(None),
                pending: RefCell::new(VecDeque::new()),
                busy: Cell::new(false),
            }
        })
    }

    /// Connects the change feed and runs the first pass.
    fn start(self: &Rc<Self>) {
        let strategy = self.scheduler.borrow().strategy();
        let feed = match strategy {
            SchedulerStrategy::NextFrame => self
                .watch_mutations()
                .unwrap_or_else(|| self.poll(SchedulerStrategy::DEFAULT_POLL_MS)),
            SchedulerStrategy::Poll { interval_ms } => self.poll(interval_ms),
        };
        *self.feed.borrow_mut() = Some(feed);
        self.run_pass(Trigger::Startup);
    }

    fn watch_mutations(self: &Rc<Self>) -> Option<Feed> {
        let body = self.tree.borrow().document().body()?;
        let weak = Rc::downgrade(self);
        MutationWatch::observe(&body, move |_records| {
            if let Some(rt) = weak.upgrade() {
                rt.on_mutation();
            }
        })
        .ok()
        .map(|watch| Feed::Mutations { watch })
    }

    fn poll(self: &Rc<Self>, interval_ms: u32) -> Feed {
        let weak = Rc::downgrade(self);
        let poll = PollLoop::new(interval_ms, move || {
            if let Some(rt) = weak.upgrade() {
                rt.run_pass(Trigger::Poll);
            }
        });
        poll.start();
        Feed::Poll { _poll: poll }
    }

    fn on_mutation(&self) {
        if self.scheduler.borrow_mut().notify() {
            self.frame.request();
        }
    }

    fn run_pass(&self, trigger: Trigger) {
        if self.busy.get() {
            self.frame.request();
            return;
        }
        if !self.scheduler.borrow_mut().begin() {
            return;
        }

        self.busy.set(true);
        {
            let mut engine = self.engine.borrow_mut();
            let mut tree = self.tree.borrow_mut();
            let media = self.media.borrow();
            with_tracer(|tracer| {
                let _ = engine.reconcile_pass(&mut *tree, &*media, trigger, tracer);
            });
            self.watch_shadow_roots(&mut tree);
        }
        self.busy.set(false);

        let again = self.scheduler.borrow_mut().finish();
        self.drain_activations();
        if again {
            self.frame.request();
        }
    }

    /// Extends the mutation feed to shadow roots it has not seen yet.
    fn watch_shadow_roots(&self, tree: &mut DomTree) {
        let feed = self.feed.borrow();
        let Some(Feed::Mutations { watch }) = feed.as_ref() else {
            return;
        };
        let Some(root) = tree.root() else {
            return;
        };
        for shadow in locate::claim_shadow_roots(tree, &root) {
            let _ = watch.watch(&shadow);
        }
    }

    fn on_activation(&self, node: Node, kind: BindingKind) {
        self.pending.borrow_mut().push_back((node, kind));
        if !self.busy.get() {
            self.drain_activations();
        }
    }

    /// Handles queued activations, including any that the handled ones
    /// trigger synchronously.
    fn drain_activations(&self) {
        if self.busy.replace(true) {
            return;
        }
        loop {
            let Some((node, kind)) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            let mut engine = self.engine.borrow_mut();
            let mut tree = self.tree.borrow_mut();
            let mut media = self.media.borrow_mut();
            with_tracer(|tracer| {
                if let Err(reason) = engine.activate(&mut *tree, &mut *media, &node, kind, tracer)
                {
                    tracer.skip(&SkipEvent {
                        pass_index: engine.passes(),
                        kind: None,
                        reason,
                    });
                }
            });
        }
        self.busy.set(false);
    }
}

#[cfg(feature = "console-trace")]
fn with_tracer<R>(f: impl FnOnce(&mut Tracer<'_>) -> R) -> R {
    let mut sink = ConsoleSink::new();
    let mut tracer = Tracer::new(&mut sink);
    f(&mut tracer)
}

#[cfg(not(feature = "console-trace"))]
fn with_tracer<R>(f: impl FnOnce(&mut Tracer<'_>) -> R) -> R {
    f(&mut Tracer::none())
}
