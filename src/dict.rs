// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Sweep dictionary: the active edges crossing the sweep line, kept as a
// sorted circular doubly-linked list on a node pool.
//
// Keys are region handles; the ordering is supplied by the caller on every
// call because it depends on the current sweep position. Insertion walks
// backward from a hint and lands after the last node that is <= the new key,
// so equal keys stay in arrival order. Node 0 is the head sentinel and holds
// the INVALID key; searches and walks stop there, so every operation is
// bounded by the number of live nodes.

use crate::alloc::{AllocError, Pool, SharedAllocator};
use crate::mesh::INVALID;

pub(crate) type NodeIdx = u32;

pub(crate) const DICT_HEAD: NodeIdx = 0;

#[derive(Clone, Copy, Debug)]
struct DictNode {
    key: u32,
    next: NodeIdx,
    prev: NodeIdx,
}

pub(crate) struct Dict {
    nodes: Pool<DictNode>,
}

impl Dict {
    pub fn new(bucket: usize, alloc: SharedAllocator) -> Result<Self, AllocError> {
        let mut nodes = Pool::new(bucket, alloc);
        let head = nodes.alloc(DictNode {
            key: INVALID,
            next: DICT_HEAD,
            prev: DICT_HEAD,
        })?;
        debug_assert_eq!(head, DICT_HEAD);
        Ok(Dict { nodes })
    }

    /// Insert `key` in order, searching from the back of the list.
    pub fn insert(
        &mut self,
        key: u32,
        leq: impl FnMut(u32, u32) -> bool,
    ) -> Result<NodeIdx, AllocError> {
        self.insert_before(DICT_HEAD, key, leq)
    }

    /// Insert `key` somewhere before `node`, walking backward to the last
    /// node whose key is <= `key`.
    pub fn insert_before(
        &mut self,
        mut node: NodeIdx,
        key: u32,
        mut leq: impl FnMut(u32, u32) -> bool,
    ) -> Result<NodeIdx, AllocError> {
        loop {
            node = self.nodes[node].prev;
            let node_key = self.nodes[node].key;
            if node_key == INVALID || leq(node_key, key) {
                break;
            }
        }

        let next = self.nodes[node].next;
        let new_node = self.nodes.alloc(DictNode { key, next, prev: node })?;
        self.nodes[node].next = new_node;
        self.nodes[next].prev = new_node;
        Ok(new_node)
    }

    pub fn delete(&mut self, node: NodeIdx) {
        let DictNode { next, prev, .. } = self.nodes[node];
        self.nodes[next].prev = prev;
        self.nodes[prev].next = next;
        self.nodes[node].key = INVALID;
        self.nodes.free(node);
    }

    /// First node, from the front, whose key the probe is <= to; the head
    /// when there is none. `probe_leq(k)` answers "probe <= k".
    pub fn search(&self, mut probe_leq: impl FnMut(u32) -> bool) -> NodeIdx {
        let mut node = DICT_HEAD;
        loop {
            node = self.nodes[node].next;
            let node_key = self.nodes[node].key;
            if node_key == INVALID || probe_leq(node_key) {
                return node;
            }
        }
    }

    /// Key stored at `node`; INVALID for the head.
    #[inline]
    pub fn key(&self, node: NodeIdx) -> u32 {
        self.nodes[node].key
    }

    #[inline]
    pub fn min(&self) -> NodeIdx {
        self.nodes[DICT_HEAD].next
    }

    #[inline]
    #[cfg(test)]
    pub fn max(&self) -> NodeIdx {
        self.nodes[DICT_HEAD].prev
    }

    #[inline]
    pub fn succ(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node].next
    }

    #[inline]
    pub fn pred(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node].prev
    }

    /// Live entries, head excluded.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }
}
