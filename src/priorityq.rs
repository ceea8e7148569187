// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Event queue for the sweep: an indexed binary min-heap of vertices.
//
// Entries carry a copy of their vertex position plus an insertion sequence
// number, so ordering never consults the mesh and is total even for
// coincident vertices: (s, t, sequence). Handles stay valid until the entry
// is extracted or deleted and are then recycled.
//
// The initial vertices are bulk-inserted and heapified once by `build`;
// intersection vertices discovered later are sifted in as they arrive.

use crate::alloc::{AllocError, SharedAllocator, TrackedVec};
use crate::geom::Pos;
use crate::mesh::{VertIdx, INVALID};

pub(crate) type Handle = u32;

#[derive(Clone, Copy, Debug)]
struct Entry {
    vert: VertIdx,
    key: Pos,
    seq: u64,
    /// Position in `heap`, INVALID once the handle is free.
    slot: u32,
}

impl Entry {
    #[inline]
    fn precedes(&self, other: &Entry) -> bool {
        let (a, b) = (self.key, other.key);
        a.s < b.s || (a.s == b.s && (a.t < b.t || (a.t == b.t && self.seq < other.seq)))
    }
}

pub(crate) struct EventQueue {
    heap: TrackedVec<Handle>,
    entries: TrackedVec<Entry>,
    free_handles: TrackedVec<Handle>,
    next_seq: u64,
    built: bool,
}

impl EventQueue {
    pub fn new(alloc: &SharedAllocator) -> Self {
        EventQueue {
            heap: TrackedVec::new(alloc.clone()),
            entries: TrackedVec::new(alloc.clone()),
            free_handles: TrackedVec::new(alloc.clone()),
            next_seq: 0,
            built: false,
        }
    }

    /// Pre-size for `count` entries.
    pub fn reserve(&mut self, count: usize) -> Result<(), AllocError> {
        self.heap.reserve(count)?;
        self.entries.reserve(count)?;
        self.free_handles.reserve(count)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn insert(&mut self, vert: VertIdx, key: Pos) -> Result<Handle, AllocError> {
        let seq = self.next_seq;
        self.next_seq += 1;
        let slot = self.heap.len() as u32;
        let entry = Entry { vert, key, seq, slot };
        let handle = match self.free_handles.pop() {
            Some(h) => {
                self.entries[h as usize] = entry;
                h
            }
            None => {
                // Keep room to recycle every handle ever issued.
                self.free_handles.reserve(self.entries.len() + 1)?;
                self.entries.push(entry)?;
                (self.entries.len() - 1) as Handle
            }
        };
        if let Err(err) = self.heap.push(handle) {
            self.entries[handle as usize].slot = INVALID;
            let _ = self.free_handles.push(handle);
            return Err(err);
        }
        if self.built {
            self.float_up(slot as usize);
        }
        Ok(handle)
    }

    /// Establish heap order over everything inserted so far.
    pub fn build(&mut self) {
        for i in (0..self.heap.len() / 2).rev() {
            self.float_down(i);
        }
        self.built = true;
    }

    pub fn minimum(&mut self) -> Option<VertIdx> {
        if !self.built {
            self.build();
        }
        self.heap.first().map(|&h| self.entries[h as usize].vert)
    }

    pub fn extract_min(&mut self) -> Option<VertIdx> {
        if !self.built {
            self.build();
        }
        let &top = self.heap.first()?;
        let vert = self.entries[top as usize].vert;
        self.remove_slot(0);
        Some(vert)
    }

    /// Remove a pending entry. Stale or unknown handles are ignored.
    pub fn delete(&mut self, handle: Handle) {
        let Some(entry) = self.entries.get(handle as usize) else {
            return;
        };
        if entry.slot == INVALID {
            return;
        }
        let slot = entry.slot as usize;
        if !self.built {
            self.build();
        }
        self.remove_slot(slot);
    }

    fn remove_slot(&mut self, slot: usize) {
        let handle = self.heap[slot];
        let Some(last) = self.heap.pop() else {
            return;
        };
        if slot < self.heap.len() {
            self.heap[slot] = last;
            self.entries[last as usize].slot = slot as u32;
            self.float_down(slot);
            self.float_up(self.entries[last as usize].slot as usize);
        }
        self.entries[handle as usize].slot = INVALID;
        // The free list holds room for every entry, so this never allocates.
        let _ = self.free_handles.push(handle);
    }

    fn precedes(&self, a: Handle, b: Handle) -> bool {
        self.entries[a as usize].precedes(&self.entries[b as usize])
    }

    fn place(&mut self, slot: usize, handle: Handle) {
        self.heap[slot] = handle;
        self.entries[handle as usize].slot = slot as u32;
    }

    fn float_down(&mut self, mut curr: usize) {
        let h = self.heap[curr];
        let len = self.heap.len();
        loop {
            let mut child = 2 * curr + 1;
            if child >= len {
                break;
            }
            if child + 1 < len && self.precedes(self.heap[child + 1], self.heap[child]) {
                child += 1;
            }
            let hc = self.heap[child];
            if !self.precedes(hc, h) {
                break;
            }
            self.place(curr, hc);
            curr = child;
        }
        self.place(curr, h);
    }

    fn float_up(&mut self, mut curr: usize) {
        let h = self.heap[curr];
        while curr > 0 {
            let parent = (curr - 1) / 2;
            let hp = self.heap[parent];
            if !self.precedes(h, hp) {
                break;
            }
            self.place(curr, hp);
            curr = parent;
        }
        self.place(curr, h);
    }
}
