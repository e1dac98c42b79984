// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory host tree.
//!
//! [`MemTree`] is a small element tree with encapsulated sub-trees, inline
//! styles, textContent semantics and the selector subset the engine uses. It
//! backs every test in this crate and can run reconciliation headless.
//!
//! Nodes are addressed by [`MemNode`] handles carrying a slot index and a
//! generation counter. [`MemTree::destroy`] plays the part of the host
//! discarding a subtree: the slots are recycled, stale handles stop resolving,
//! and markers stored on the slot disappear with it.
//!
//! [`HostTree::remove`] only detaches, since a removed node may be inserted
//! again. Detached subtrees keep their slots until
//! [`MemTree::collect_detached`] frees them, which long headless runs should
//! call between passes.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use super::selector::{Compound, Selector};
use super::{BindingKind, HostEvent, HostTree, Marker};

/// Tag name given to encapsulated sub-tree roots.
const SHADOW_TAG: &str = "#shadow-root";

/// A handle to a node in a [`MemTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemNode {
    idx: u32,
    generation: u32,
}

impl MemNode {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for MemNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemNode({}@gen{})", self.idx, self.generation)
    }
}

#[derive(Clone, Debug, Default)]
struct NodeData {
    tag: String,
    attrs: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    /// Text run rendered before the children.
    text: String,
    value: Option<String>,
    parent: Option<u32>,
    children: Vec<u32>,
    shadow: Option<u32>,
    markers: u8,
    bindings: Vec<BindingKind>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    fn is_fragment(&self) -> bool {
        self.tag == SHADOW_TAG
    }

    fn matches(&self, compound: &Compound) -> bool {
        if self.is_fragment() {
            return false;
        }
        if compound.tag.as_ref().is_some_and(|t| *t != self.tag) {
            return false;
        }
        if !compound.classes.iter().all(|c| self.has_class(c)) {
            return false;
        }
        compound.attrs.iter().all(|cond| match self.attr(&cond.name) {
            None => false,
            Some(actual) => cond.value.as_deref().is_none_or(|want| want == actual),
        })
    }
}

/// An in-memory [`HostTree`].
///
/// The tree starts with a single `body` element, which is also the
/// [`root`](HostTree::root). Build fixtures with [`element`](Self::element),
/// [`text_element`](Self::text_element) and
/// [`attach_shadow`](Self::attach_shadow).
#[derive(Debug)]
pub struct MemTree {
    slots: Vec<Option<NodeData>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    body: u32,
    dispatched: Vec<(MemNode, HostEvent)>,
    writes: usize,
    structure_version: u64,
}

impl Default for MemTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemTree {
    /// Creates a tree holding an empty `body`.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            body: 0,
            dispatched: Vec::new(),
            writes: 0,
            structure_version: 0,
        };
        tree.body = tree.alloc(NodeData::new("body"));
        tree
    }

    /// Returns the `body` element.
    #[must_use]
    pub fn body(&self) -> MemNode {
        self.handle(self.body)
    }

    // -- Fixture building --

    /// Appends a new element under `parent` and returns it.
    ///
    /// `tag_classes` is a tag optionally followed by `.class` segments, e.g.
    /// `"div.ytp-menuitem.ytp-menuitem-selected"`.
    pub fn element(
        &mut self,
        parent: &MemNode,
        tag_classes: &str,
        attrs: &[(&str, &str)],
    ) -> MemNode {
        let mut segments = tag_classes.split('.');
        let tag = segments.next().filter(|t| !t.is_empty()).unwrap_or("div");
        let mut data = NodeData::new(tag);
        let classes: Vec<&str> = segments.filter(|c| !c.is_empty()).collect();
        if !classes.is_empty() {
            data.attrs.push(("class".into(), classes.join(" ")));
        }
        for &(name, value) in attrs {
            data.attrs.push((name.into(), value.into()));
        }
        let idx = self.alloc(data);
        self.link(parent.idx, idx, None);
        self.handle(idx)
    }

    /// Appends a new element with a text run under `parent`.
    pub fn text_element(&mut self, parent: &MemNode, tag_classes: &str, text: &str) -> MemNode {
        let node = self.element(parent, tag_classes, &[]);
        if let Some(data) = self.get_mut(&node) {
            data.text = text.into();
        }
        node
    }

    /// Attaches an encapsulated sub-tree root to `host` and returns it.
    ///
    /// # Panics
    ///
    /// Panics if `host` is stale or already has a sub-tree.
    pub fn attach_shadow(&mut self, host: &MemNode) -> MemNode {
        assert!(self.is_alive(*host), "stale host handle");
        let idx = self.alloc(NodeData::new(SHADOW_TAG));
        let data = self.slots[host.idx as usize]
            .as_mut()
            .expect("host checked alive");
        assert!(data.shadow.is_none(), "host already has a shadow root");
        data.shadow = Some(idx);
        self.handle(idx)
    }

    /// Frees `node`, its descendants and any sub-trees attached to them.
    ///
    /// Models the host discarding a subtree: handles become stale and any
    /// markers stored on the freed slots are gone.
    pub fn destroy(&mut self, node: &MemNode) {
        if !self.is_alive(*node) {
            return;
        }
        self.unlink(node.idx);
        let mut stack = alloc::vec![node.idx];
        while let Some(idx) = stack.pop() {
            if let Some(data) = self.slots[idx as usize].take() {
                stack.extend(data.children);
                stack.extend(data.shadow);
                self.generation[idx as usize] += 1;
                self.free_list.push(idx);
            }
        }
        self.structure_version += 1;
    }

    /// Frees every slot not reachable from `body` through children or
    /// encapsulated sub-trees, and returns how many were freed.
    ///
    /// Handles to detached nodes become stale. Do not call this while a
    /// detached node is still meant to be inserted.
    pub fn collect_detached(&mut self) -> usize {
        let mut reachable = alloc::vec![false; self.slots.len()];
        let mut stack = alloc::vec![self.body];
        while let Some(idx) = stack.pop() {
            if core::mem::replace(&mut reachable[idx as usize], true) {
                continue;
            }
            let data = self.data(idx);
            stack.extend(data.children.iter().copied());
            stack.extend(data.shadow);
        }

        let mut freed = 0;
        for (idx, live) in (0_u32..).zip(reachable) {
            if !live && self.slots[idx as usize].take().is_some() {
                self.generation[idx as usize] += 1;
                self.free_list.push(idx);
                freed += 1;
            }
        }
        freed
    }

    // -- Inspection --

    /// Returns whether `node` still refers to a live slot.
    #[must_use]
    pub fn is_alive(&self, node: MemNode) -> bool {
        self.generation
            .get(node.idx as usize)
            .is_some_and(|g| *g == node.generation)
            && self.slots[node.idx as usize].is_some()
    }

    /// Returns the element children of `node`.
    #[must_use]
    pub fn children(&self, node: &MemNode) -> Vec<MemNode> {
        self.get(node)
            .map(|d| d.children.iter().map(|&c| self.handle(c)).collect())
            .unwrap_or_default()
    }

    /// Returns the activation behaviors attached to `node`, in bind order.
    #[must_use]
    pub fn bindings(&self, node: &MemNode) -> &[BindingKind] {
        self.get(node).map_or(&[], |d| d.bindings.as_slice())
    }

    /// Returns the live form-control value of `node`.
    #[must_use]
    pub fn value(&self, node: &MemNode) -> Option<&str> {
        self.get(node).and_then(|d| d.value.as_deref())
    }

    /// Returns every event dispatched so far.
    #[must_use]
    pub fn dispatched(&self) -> &[(MemNode, HostEvent)] {
        &self.dispatched
    }

    /// Drains the dispatched-event log.
    pub fn take_dispatched(&mut self) -> Vec<(MemNode, HostEvent)> {
        core::mem::take(&mut self.dispatched)
    }

    /// Returns the number of writes applied through [`HostTree`] methods.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Returns a counter bumped by every insertion or removal, the equivalent
    /// of a `childList` mutation record.
    #[must_use]
    pub fn structure_version(&self) -> u64 {
        self.structure_version
    }

    // -- Internals --

    fn alloc(&mut self, data: NodeData) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(data);
            idx
        } else {
            let idx = u32::try_from(self.slots.len()).expect("node count fits in u32");
            self.slots.push(Some(data));
            self.generation.push(0);
            idx
        }
    }

    fn handle(&self, idx: u32) -> MemNode {
        MemNode {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    fn get(&self, node: &MemNode) -> Option<&NodeData> {
        if !self.is_alive(*node) {
            return None;
        }
        self.slots[node.idx as usize].as_ref()
    }

    fn get_mut(&mut self, node: &MemNode) -> Option<&mut NodeData> {
        if !self.is_alive(*node) {
            return None;
        }
        self.slots[node.idx as usize].as_mut()
    }

    fn data(&self, idx: u32) -> &NodeData {
        self.slots[idx as usize]
            .as_ref()
            .expect("linked nodes are alive")
    }

    fn unlink(&mut self, idx: u32) {
        let Some(parent) = self.slots[idx as usize].as_mut().and_then(|d| d.parent.take()) else {
            return;
        };
        if let Some(p) = self.slots[parent as usize].as_mut() {
            p.children.retain(|&c| c != idx);
        }
        self.structure_version += 1;
    }

    fn link(&mut self, parent: u32, child: u32, before: Option<u32>) {
        self.unlink(child);
        let p = self.slots[parent as usize]
            .as_mut()
            .expect("parent checked alive");
        let at = before
            .and_then(|b| p.children.iter().position(|&c| c == b))
            .unwrap_or(p.children.len());
        p.children.insert(at, child);
        if let Some(c) = self.slots[child as usize].as_mut() {
            c.parent = Some(parent);
        }
        self.structure_version += 1;
    }

    fn is_ancestor_or_self(&self, ancestor: u32, mut idx: u32) -> bool {
        loop {
            if idx == ancestor {
                return true;
            }
            match self.data(idx).parent {
                Some(p) => idx = p,
                None => return false,
            }
        }
    }

    fn matches(&self, idx: u32, selector: &Selector) -> bool {
        let data = self.data(idx);
        if !data.matches(selector.subject()) {
            return false;
        }
        let mut cursor = data.parent;
        'compounds: for compound in selector.ancestors() {
            while let Some(p) = cursor {
                let pd = self.data(p);
                cursor = pd.parent;
                if pd.matches(compound) {
                    continue 'compounds;
                }
            }
            return false;
        }
        true
    }

    fn collect_text(&self, idx: u32, out: &mut String) {
        let data = self.data(idx);
        out.push_str(&data.text);
        for &c in &data.children {
            self.collect_text(c, out);
        }
    }

    fn clone_subtree(&mut self, idx: u32) -> u32 {
        let src = self.data(idx);
        let copy = NodeData {
            tag: src.tag.clone(),
            attrs: src.attrs.clone(),
            styles: src.styles.clone(),
            text: src.text.clone(),
            value: src.value.clone(),
            ..NodeData::default()
        };
        let children = src.children.clone();
        let new_idx = self.alloc(copy);
        for c in children {
            let cc = self.clone_subtree(c);
            if let Some(d) = self.slots[cc as usize].as_mut() {
                d.parent = Some(new_idx);
            }
            if let Some(d) = self.slots[new_idx as usize].as_mut() {
                d.children.push(cc);
            }
        }
        new_idx
    }
}

impl HostTree for MemTree {
    type Node = MemNode;

    fn root(&self) -> Option<MemNode> {
        Some(self.body())
    }

    fn query_all(&self, scope: &MemNode, selector: &str) -> Vec<MemNode> {
        let mut out = Vec::new();
        let (Some(scope_data), Some(selector)) = (self.get(scope), Selector::parse(selector))
        else {
            return out;
        };
        let mut stack: Vec<u32> = scope_data.children.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            if self.matches(idx, &selector) {
                out.push(self.handle(idx));
            }
            stack.extend(self.data(idx).children.iter().rev());
        }
        out
    }

    fn shadow_root(&self, node: &MemNode) -> Option<MemNode> {
        self.get(node)?.shadow.map(|s| self.handle(s))
    }

    fn closest(&self, node: &MemNode, selector: &str) -> Option<MemNode> {
        self.get(node)?;
        let selector = Selector::parse(selector)?;
        let mut cursor = Some(node.idx);
        while let Some(idx) = cursor {
            if self.matches(idx, &selector) {
                return Some(self.handle(idx));
            }
            cursor = self.data(idx).parent;
        }
        None
    }

    fn parent(&self, node: &MemNode) -> Option<MemNode> {
        self.get(node)?.parent.map(|p| self.handle(p))
    }

    fn text(&self, node: &MemNode) -> String {
        let mut out = String::new();
        if self.get(node).is_some() {
            self.collect_text(node.idx, &mut out);
        }
        out
    }

    fn set_text(&mut self, node: &MemNode, text: &str) {
        let Some(data) = self.get_mut(node) else {
            return;
        };
        data.text = text.into();
        let children = core::mem::take(&mut data.children);
        for c in children {
            if let Some(cd) = self.slots[c as usize].as_mut() {
                cd.parent = None;
            }
        }
        self.writes += 1;
        self.structure_version += 1;
    }

    fn attribute(&self, node: &MemNode, name: &str) -> Option<String> {
        self.get(node)?.attr(name).map(ToString::to_string)
    }

    fn set_attribute(&mut self, node: &MemNode, name: &str, value: &str) {
        let Some(data) = self.get_mut(node) else {
            return;
        };
        match data.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.into(),
            None => data.attrs.push((name.into(), value.into())),
        }
        self.writes += 1;
    }

    fn remove_attribute(&mut self, node: &MemNode, name: &str) {
        let Some(data) = self.get_mut(node) else {
            return;
        };
        data.attrs.retain(|(n, _)| n != name);
        self.writes += 1;
    }

    fn style(&self, node: &MemNode, property: &str) -> String {
        self.get(node)
            .and_then(|d| d.styles.iter().find(|(p, _)| p == property))
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }

    fn set_style(&mut self, node: &MemNode, property: &str, value: &str) {
        let Some(data) = self.get_mut(node) else {
            return;
        };
        data.styles.retain(|(p, _)| p != property);
        if !value.is_empty() {
            data.styles.push((property.into(), value.into()));
        }
        self.writes += 1;
    }

    fn set_value(&mut self, node: &MemNode, value: &str) {
        let Some(data) = self.get_mut(node) else {
            return;
        };
        data.value = Some(value.into());
        self.writes += 1;
    }

    fn create_element(&mut self, tag: &str) -> Option<MemNode> {
        let idx = self.alloc(NodeData::new(tag));
        Some(self.handle(idx))
    }

    fn clone_deep(&mut self, node: &MemNode) -> Option<MemNode> {
        self.get(node)?;
        let idx = self.clone_subtree(node.idx);
        Some(self.handle(idx))
    }

    fn insert_before(
        &mut self,
        parent: &MemNode,
        child: &MemNode,
        reference: Option<&MemNode>,
    ) -> bool {
        if self.get(parent).is_none() {
            return false;
        }
        if !self.is_alive(*child) || self.is_ancestor_or_self(child.idx, parent.idx) {
            return false;
        }
        if let Some(r) = reference {
            if self.parent(r).as_ref() != Some(parent) || r == child {
                return false;
            }
        }
        self.link(parent.idx, child.idx, reference.map(|r| r.idx));
        self.writes += 1;
        true
    }

    fn remove(&mut self, node: &MemNode) {
        if self.parent(node).is_none() {
            return;
        }
        self.unlink(node.idx);
        self.writes += 1;
    }

    fn mark(&mut self, node: &MemNode, marker: Marker) -> bool {
        let Some(data) = self.get_mut(node) else {
            return false;
        };
        let fresh = data.markers & marker.bit() == 0;
        data.markers |= marker.bit();
        fresh
    }

    fn is_marked(&self, node: &MemNode, marker: Marker) -> bool {
        self.get(node)
            .is_some_and(|d| d.markers & marker.bit() != 0)
    }

    fn bind(&mut self, node: &MemNode, kind: BindingKind) {
        if let Some(data) = self.get_mut(node) {
            data.bindings.push(kind);
        }
    }

    fn dispatch(&mut self, node: &MemNode, event: HostEvent) {
        if self.is_alive(*node) {
            self.dispatched.push((*node, event));
        }
    }
}
