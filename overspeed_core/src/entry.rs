// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entries: the selectable items of a surface.

use alloc::string::String;
use alloc::vec::Vec;

use crate::config::SurfaceProfile;
use crate::host::HostTree;
use crate::label;

/// Attribute that tags an entry as injected. Its value is the preset label.
pub const INJECTED_ATTR: &str = "data-overspeed";

/// Who created an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Rendered by the host.
    Native,
    /// Cloned in by the injector.
    Injected,
}

/// One entry of a surface, read fresh from the host.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<N> {
    /// The entry element (what gets cloned and removed).
    pub node: N,
    /// The clickable element inside the entry.
    pub activator: N,
    /// Trimmed label text.
    pub label: String,
    /// Parsed rate, `None` when the label is not a speed.
    pub value: Option<f64>,
    /// Who created the entry.
    pub origin: Origin,
}

impl<N> Entry<N> {
    /// Returns whether the entry was created by the injector.
    #[must_use]
    pub fn is_injected(&self) -> bool {
        self.origin == Origin::Injected
    }
}

/// Returns the activator of `entry` under `profile`.
pub fn activator_of<T: HostTree + ?Sized>(
    tree: &T,
    entry: &T::Node,
    profile: &SurfaceProfile,
) -> T::Node {
    profile
        .activator
        .and_then(|sel| tree.query(entry, sel))
        .unwrap_or_else(|| entry.clone())
}

/// Returns the label element of `activator`, if the profile names one and it
/// exists.
pub fn label_node_of<T: HostTree + ?Sized>(
    tree: &T,
    activator: &T::Node,
    profile: &SurfaceProfile,
) -> Option<T::Node> {
    profile.label.and_then(|sel| tree.query(activator, sel))
}

/// Reads one entry.
pub fn read_entry<T: HostTree + ?Sized>(
    tree: &T,
    node: T::Node,
    profile: &SurfaceProfile,
) -> Entry<T::Node> {
    let activator = activator_of(tree, &node, profile);
    let mut text = label_node_of(tree, &activator, profile)
        .map(|l| tree.text(&l))
        .unwrap_or_default();
    if text.trim().is_empty() {
        text = tree.text(&activator);
    }
    let label = String::from(text.trim());
    let value = label::parse_with_baseline(&label, profile.baseline_label);
    let origin = if tree.attribute(&node, INJECTED_ATTR).is_some() {
        Origin::Injected
    } else {
        Origin::Native
    };
    Entry {
        node,
        activator,
        label,
        value,
        origin,
    }
}

/// Reads every entry of `surface`, in document order.
pub fn entries<T: HostTree + ?Sized>(
    tree: &T,
    surface: &T::Node,
    profile: &SurfaceProfile,
) -> Vec<Entry<T::Node>> {
    tree.query_all(surface, profile.entry)
        .into_iter()
        .map(|node| read_entry(tree, node, profile))
        .collect()
}
