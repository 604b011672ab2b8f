// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

/// An iterator over the direct children of a node, in insertion order.
///
/// Created by [`NodeStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a NodeStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a NodeStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(NodeId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}

/// Appends the pre-order traversal of the subtree at `root` to `out`.
///
/// `stack` is scratch space; it is cleared on entry and left empty.
pub(crate) fn collect_preorder(
    store: &NodeStore,
    root: u32,
    stack: &mut Vec<u32>,
    out: &mut Vec<u32>,
) {
    stack.clear();
    stack.push(root);
    while let Some(idx) = stack.pop() {
        out.push(idx);
        // Push children last-to-first so the first child is visited next.
        let mut child = store.last_child(idx);
        while child != INVALID {
            stack.push(child);
            child = store.prev_sibling[child as usize];
        }
    }
}
