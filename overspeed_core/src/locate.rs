// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deep surface location.
//!
//! Host menus may sit inside any number of encapsulated sub-trees, which a
//! plain query never enters. [`locate_deep`] walks them with an explicit
//! worklist (host trees can be deep) and a visited list keyed by sub-tree
//! identity (the same sub-tree can be reachable more than once). It is
//! side-effect free and returns an empty list when nothing matches.
//!
//! [`claim_shadow_roots`] walks the same sub-trees and marks each one
//! [`Marker::Observed`], so a change feed that cannot see into them can
//! attach to every sub-tree exactly once.

use alloc::vec;
use alloc::vec::Vec;

use crate::host::{HostTree, Marker};

/// Returns every node matching `selector` under `root`, including matches
/// inside nested encapsulated sub-trees, in discovery order without
/// duplicates.
pub fn locate_deep<T: HostTree + ?Sized>(tree: &T, root: &T::Node, selector: &str) -> Vec<T::Node> {
    let mut out = Vec::new();
    let mut visited: Vec<T::Node> = Vec::new();
    let mut worklist = vec![root.clone()];

    if let Some(shadow) = tree.shadow_root(root) {
        visited.push(shadow.clone());
        worklist.push(shadow);
    }

    while let Some(scope) = worklist.pop() {
        for found in tree.query_all(&scope, selector) {
            push_unique(&mut out, found);
        }

        let mut nested = Vec::new();
        for el in tree.query_all(&scope, "*") {
            if let Some(shadow) = tree.shadow_root(&el)
                && !visited.contains(&shadow)
            {
                visited.push(shadow.clone());
                nested.push(shadow);
            }
        }
        // Reversed so the worklist pops sub-trees in document order.
        worklist.extend(nested.into_iter().rev());
    }
    out
}

/// Runs [`locate_deep`] for each root and merges the results, keeping the
/// first occurrence of every node.
pub fn locate_all<T: HostTree + ?Sized>(
    tree: &T,
    roots: &[T::Node],
    selector: &str,
) -> Vec<T::Node> {
    let mut out = Vec::new();
    for root in roots {
        for found in locate_deep(tree, root, selector) {
            push_unique(&mut out, found);
        }
    }
    out
}

/// Returns the encapsulated sub-trees under `root` (nested ones included)
/// that were not claimed before, marking each one [`Marker::Observed`].
pub fn claim_shadow_roots<T: HostTree + ?Sized>(tree: &mut T, root: &T::Node) -> Vec<T::Node> {
    let mut visited: Vec<T::Node> = Vec::new();
    let mut worklist = vec![root.clone()];
    if let Some(shadow) = tree.shadow_root(root) {
        visited.push(shadow.clone());
        worklist.push(shadow);
    }
    while let Some(scope) = worklist.pop() {
        for el in tree.query_all(&scope, "*") {
            if let Some(shadow) = tree.shadow_root(&el)
                && !visited.contains(&shadow)
            {
                visited.push(shadow.clone());
                worklist.push(shadow);
            }
        }
    }
    visited
        .into_iter()
        .filter(|shadow| tree.mark(shadow, Marker::Observed))
        .collect()
}

fn push_unique<N: PartialEq>(out: &mut Vec<N>, node: N) {
    if !out.contains(&node) {
        out.push(node);
    }
}
