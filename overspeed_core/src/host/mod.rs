// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for documents the engine does not own.
//!
//! The engine never creates a surface; it locates surfaces the host built,
//! reads their label text and attributes, and writes a small set of
//! host-recognized changes back. Everything it needs from the host goes
//! through [`HostTree`], so the same reconciliation code runs against the live
//! DOM (see `overspeed_backend_web`) and against [`mem::MemTree`] in tests.
//!
//! # Identity
//!
//! `HostTree::Node` equality is node identity. Nodes are re-located on every
//! pass; the only state kept across passes is the marker association
//! ([`HostTree::mark`]), which the host must store without extending the
//! node's lifetime.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;

pub mod mem;
mod selector;

/// Attach-once markers stored weakly on host nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// The surface has been through at least one injection pass.
    Processed,
    /// An activation behavior has been attached to the node.
    Bound,
    /// A layout restoration hook has been attached to the node.
    RestoreHook,
    /// A change feed has been attached to the encapsulated sub-tree.
    Observed,
}

impl Marker {
    /// All markers, in bit order.
    pub const ALL: [Self; 4] = [
        Self::Processed,
        Self::Bound,
        Self::RestoreHook,
        Self::Observed,
    ];

    /// Returns the bit used by hosts that pack markers into a flag set.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Processed => 1 << 0,
            Self::Bound => 1 << 1,
            Self::RestoreHook => 1 << 2,
            Self::Observed => 1 << 3,
        }
    }
}

/// Which activation behavior the host should route back to the engine.
///
/// The host keeps only the kind; everything else (value, surface, layout
/// targets) is re-derived from the node when the activation fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// An injected preset entry.
    Preset,
    /// A native preset entry whose value must also reach the playback rate.
    NativePreset,
    /// A parent-view navigation control that restores expanded layout.
    RestoreLayout,
}

impl BindingKind {
    /// Returns the short name used in trace output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preset => "preset",
            Self::NativePreset => "native",
            Self::RestoreLayout => "restore-layout",
        }
    }
}

/// Notifications the engine dispatches so host listeners see native-looking
/// changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// A bubbling `input` event.
    Input,
    /// A bubbling `change` event.
    Change,
    /// A synthetic click.
    Click,
}

impl HostEvent {
    /// Returns the DOM event type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Change => "change",
            Self::Click => "click",
        }
    }
}

/// A document the engine reconciles but does not own.
///
/// Selectors are CSS-style; the engine only uses compound selectors (tag,
/// `.class`, `[attr]`, `[attr="value"]`) joined by the descendant combinator.
/// Write operations are best effort: a host that cannot apply one simply
/// leaves the node unchanged.
pub trait HostTree {
    /// A handle to a host node. Equality is identity.
    type Node: Clone + PartialEq + Debug;

    /// Returns the node the engine observes and searches from.
    fn root(&self) -> Option<Self::Node>;

    /// Returns every descendant of `scope` matching `selector`, in document
    /// order. Does not descend into encapsulated sub-trees.
    fn query_all(&self, scope: &Self::Node, selector: &str) -> Vec<Self::Node>;

    /// Returns the first descendant of `scope` matching `selector`.
    fn query(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node> {
        self.query_all(scope, selector).into_iter().next()
    }

    /// Returns the encapsulated sub-tree attached to `node`, if any.
    fn shadow_root(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Returns `node` itself or its nearest ancestor matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// Returns the parent of `node`.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Returns the concatenated text content of `node` and its descendants.
    fn text(&self, node: &Self::Node) -> String;

    /// Replaces all children of `node` with a single text run.
    fn set_text(&mut self, node: &Self::Node, text: &str);

    /// Returns the value of attribute `name`.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Sets attribute `name` to `value`.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Removes attribute `name`.
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    /// Returns the inline style property, or an empty string when unset.
    fn style(&self, node: &Self::Node, property: &str) -> String;

    /// Sets an inline style property. An empty `value` removes it.
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);

    /// Sets the live value of a form control.
    fn set_value(&mut self, node: &Self::Node, value: &str);

    /// Creates a detached element.
    fn create_element(&mut self, tag: &str) -> Option<Self::Node>;

    /// Returns a detached deep copy of `node`.
    ///
    /// The copy carries attributes, styles and text, but no encapsulated
    /// sub-trees, markers or bindings.
    fn clone_deep(&mut self, node: &Self::Node) -> Option<Self::Node>;

    /// Inserts `child` under `parent` before `reference`, or last when
    /// `reference` is `None`. Returns `false` if the host refused.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> bool;

    /// Detaches `node` from its parent.
    fn remove(&mut self, node: &Self::Node);

    /// Attaches `marker` to `node`. Returns `true` if it was not attached yet.
    fn mark(&mut self, node: &Self::Node, marker: Marker) -> bool;

    /// Returns whether `marker` is attached to `node`.
    fn is_marked(&self, node: &Self::Node, marker: Marker) -> bool;

    /// Attaches an activation behavior of the given kind to `node`.
    fn bind(&mut self, node: &Self::Node, kind: BindingKind);

    /// Dispatches a host event on `node`.
    fn dispatch(&mut self, node: &Self::Node, event: HostEvent);
}

/// Sets an inline style property only when it differs from `value`.
///
/// Returns `true` if a write happened.
pub fn ensure_style<T: HostTree + ?Sized>(
    tree: &mut T,
    node: &T::Node,
    property: &str,
    value: &str,
) -> bool {
    if tree.style(node, property) == value {
        return false;
    }
    tree.set_style(node, property, value);
    true
}

/// Sets an attribute only when it differs from `value`.
///
/// Returns `true` if a write happened.
pub fn ensure_attribute<T: HostTree + ?Sized>(
    tree: &mut T,
    node: &T::Node,
    name: &str,
    value: &str,
) -> bool {
    if tree.attribute(node, name).as_deref() == Some(value) {
        return false;
    }
    tree.set_attribute(node, name, value);
    true
}

/// Replaces the text of `node` only when it differs from `text`.
///
/// Returns `true` if a write happened.
pub fn ensure_text<T: HostTree + ?Sized>(tree: &mut T, node: &T::Node, text: &str) -> bool {
    if tree.text(node) == text {
        return false;
    }
    tree.set_text(node, text);
    true
}

#[cfg(test)]
mod tests {
    use super::mem::MemTree;
    use super::*;

    #[test]
    fn marker_bits_are_distinct() {
        let mut seen = 0_u8;
        for m in Marker::ALL {
            assert_eq!(seen & m.bit(), 0, "{m:?} overlaps another marker");
            seen |= m.bit();
        }
    }

    #[test]
    fn binding_kinds_have_distinct_names() {
        let names = [
            BindingKind::Preset.as_str(),
            BindingKind::NativePreset.as_str(),
            BindingKind::RestoreLayout.as_str(),
        ];
        assert_eq!(names, ["preset", "native", "restore-layout"]);
    }

    #[test]
    fn ensure_helpers_skip_redundant_writes() {
        let mut tree = MemTree::new();
        let root = tree.body();
        let el = tree.element(&root, "div", &[]);

        assert!(ensure_style(&mut tree, &el, "height", "320px"));
        assert!(!ensure_style(&mut tree, &el, "height", "320px"));
        assert!(ensure_attribute(&mut tree, &el, "aria-checked", "true"));
        assert!(!ensure_attribute(&mut tree, &el, "aria-checked", "true"));
        assert!(ensure_text(&mut tree, &el, "Normal"));
        assert!(!ensure_text(&mut tree, &el, "Normal"));
        assert_eq!(tree.writes(), 3);
    }
}
