// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The live DOM as a [`HostTree`].
//!
//! [`DomTree`] maps the host contract onto `web_sys` calls. Writes are best
//! effort: a failed DOM call leaves the node unchanged and the next pass
//! tries again.
//!
//! Markers live in one `WeakSet` per [`Marker`], so they never keep a
//! discarded node alive. Bindings share one listener closure per
//! [`BindingKind`]; the browser ignores a second registration of the same
//! listener on the same node, which makes [`bind`](HostTree::bind)
//! idempotent even without the `Bound` marker.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use js_sys::{Object, WeakSet};
use overspeed_core::host::{BindingKind, HostEvent, HostTree, Marker};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{
    Document, DocumentFragment, Element, Event, EventInit, HtmlElement, HtmlInputElement, Node,
};

type ListenerClosure = Closure<dyn FnMut(Event)>;

/// Receives activations of bound nodes.
pub type ActivationHandler = Rc<dyn Fn(Node, BindingKind)>;

/// One shared click listener per binding kind.
struct Listeners {
    preset: ListenerClosure,
    native_preset: ListenerClosure,
    restore_layout: ListenerClosure,
}

impl Listeners {
    fn new(handler: &ActivationHandler) -> Self {
        Self {
            preset: listener(handler, BindingKind::Preset),
            native_preset: listener(handler, BindingKind::NativePreset),
            restore_layout: listener(handler, BindingKind::RestoreLayout),
        }
    }

    fn get(&self, kind: BindingKind) -> &ListenerClosure {
        match kind {
            BindingKind::Preset => &self.preset,
            BindingKind::NativePreset => &self.native_preset,
            BindingKind::RestoreLayout => &self.restore_layout,
        }
    }
}

fn listener(handler: &ActivationHandler, kind: BindingKind) -> ListenerClosure {
    let handler = Rc::clone(handler);
    Closure::wrap(Box::new(move |event: Event| {
        let Some(node) = event
            .current_target()
            .and_then(|t| t.dyn_into::<Node>().ok())
        else {
            return;
        };
        handler(node, kind);
    }) as Box<dyn FnMut(Event)>)
}

/// Index of a marker's `WeakSet`.
pub(crate) const fn marker_slot(marker: Marker) -> usize {
    match marker {
        Marker::Processed => 0,
        Marker::Bound => 1,
        Marker::RestoreHook => 2,
        Marker::Observed => 3,
    }
}

/// A [`HostTree`] over a live document.
pub struct DomTree {
    document: Document,
    markers: [WeakSet; 4],
    listeners: Listeners,
}

impl core::fmt::Debug for DomTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomTree")
            .field("document", &"Document")
            .finish_non_exhaustive()
    }
}

impl DomTree {
    /// Creates a host over `document`. Activations of bound nodes are passed
    /// to `on_activate`.
    #[must_use]
    pub fn new(document: Document, on_activate: ActivationHandler) -> Self {
        Self {
            document,
            markers: core::array::from_fn(|_| WeakSet::new()),
            listeners: Listeners::new(&on_activate),
        }
    }

    /// Returns the underlying document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn weak_set(&self, marker: Marker) -> &WeakSet {
        &self.markers[marker_slot(marker)]
    }
}

fn as_element(node: &Node) -> Option<&Element> {
    node.dyn_ref::<Element>()
}

fn as_html(node: &Node) -> Option<&HtmlElement> {
    node.dyn_ref::<HtmlElement>()
}

impl HostTree for DomTree {
    type Node = Node;

    fn root(&self) -> Option<Node> {
        self.document.body().map(Into::into)
    }

    fn query_all(&self, scope: &Node, selector: &str) -> Vec<Node> {
        let list = if let Some(el) = as_element(scope) {
            el.query_selector_all(selector)
        } else if let Some(fragment) = scope.dyn_ref::<DocumentFragment>() {
            fragment.query_selector_all(selector)
        } else if let Some(doc) = scope.dyn_ref::<Document>() {
            doc.query_selector_all(selector)
        } else {
            return Vec::new();
        };
        let Ok(list) = list else {
            return Vec::new();
        };
        (0..list.length()).filter_map(|i| list.get(i)).collect()
    }

    fn shadow_root(&self, node: &Node) -> Option<Node> {
        as_element(node)?.shadow_root().map(Into::into)
    }

    fn closest(&self, node: &Node, selector: &str) -> Option<Node> {
        as_element(node)?
            .closest(selector)
            .ok()
            .flatten()
            .map(Into::into)
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn text(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&mut self, node: &Node, text: &str) {
        node.set_text_content(Some(text));
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        as_element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) {
        if let Some(el) = as_element(node) {
            let _ = el.set_attribute(name, value);
        }
    }

    fn remove_attribute(&mut self, node: &Node, name: &str) {
        if let Some(el) = as_element(node) {
            let _ = el.remove_attribute(name);
        }
    }

    fn style(&self, node: &Node, property: &str) -> String {
        as_html(node)
            .and_then(|el| el.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style(&mut self, node: &Node, property: &str, value: &str) {
        let Some(el) = as_html(node) else {
            return;
        };
        let style = el.style();
        if value.is_empty() {
            let _ = style.remove_property(property);
        } else {
            let _ = style.set_property(property, value);
        }
    }

    fn set_value(&mut self, node: &Node, value: &str) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn create_element(&mut self, tag: &str) -> Option<Node> {
        self.document.create_element(tag).ok().map(Into::into)
    }

    fn clone_deep(&mut self, node: &Node) -> Option<Node> {
        node.clone_node_with_deep(true).ok()
    }

    fn insert_before(&mut self, parent: &Node, child: &Node, reference: Option<&Node>) -> bool {
        parent.insert_before(child, reference).is_ok()
    }

    fn remove(&mut self, node: &Node) {
        if let Some(parent) = node.parent_node() {
            let _ = parent.remove_child(node);
        }
    }

    fn mark(&mut self, node: &Node, marker: Marker) -> bool {
        let set = self.weak_set(marker);
        let key = node.unchecked_ref::<Object>();
        if set.has(key) {
            return false;
        }
        set.add(key);
        true
    }

    fn is_marked(&self, node: &Node, marker: Marker) -> bool {
        self.weak_set(marker).has(node.unchecked_ref::<Object>())
    }

    fn bind(&mut self, node: &Node, kind: BindingKind) {
        let closure = self.listeners.get(kind);
        let _ = node.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    }

    fn dispatch(&mut self, node: &Node, event: HostEvent) {
        match event {
            HostEvent::Click => {
                if let Some(el) = as_html(node) {
                    el.click();
                }
            }
            HostEvent::Input | HostEvent::Change => {
                let init = EventInit::new();
                init.set_bubbles(true);
                if let Ok(e) = Event::new_with_event_init_dict(event.as_str(), &init) {
                    let _ = node.dispatch_event(&e);
                }
            }
        }
    }
}
