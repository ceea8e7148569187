// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Allocator plug-in and the bucketed pools built on top of it.
//
// Mesh records, dictionary nodes and sweep regions live in `Pool<T>` arenas
// addressed by `u32` handles. Pools grow one bucket at a time and report every
// growth to the configured `Allocator`, which may refuse it. Freed slots go on
// a free list and are reused before the pool grows again.

use std::mem::size_of;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The allocator refused (or the system could not satisfy) a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("allocation of {requested} bytes was refused")]
pub struct AllocError {
    pub requested: usize,
}

/// Memory accounting hooks consulted before any internal buffer grows.
///
/// Implementations carry their own context (budgets, counters, arenas) in
/// `self`. A shared allocator must be thread-safe; the tessellator itself
/// never synchronizes.
pub trait Allocator: Send + Sync {
    /// A fresh block of `size` bytes is about to be reserved.
    fn allocate(&self, size: usize) -> Result<(), AllocError>;

    /// An existing block is about to grow (or shrink) from `old_size` to `new_size` bytes.
    fn reallocate(&self, old_size: usize, new_size: usize) -> Result<(), AllocError>;

    /// A block of `size` bytes was released.
    fn free(&self, size: usize);
}

/// Default allocator: defers to the global heap and never refuses.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl Allocator for HeapAllocator {
    fn allocate(&self, _size: usize) -> Result<(), AllocError> {
        Ok(())
    }

    fn reallocate(&self, _old_size: usize, _new_size: usize) -> Result<(), AllocError> {
        Ok(())
    }

    fn free(&self, _size: usize) {}
}

/// Allocator enforcing a byte budget. Useful for bounding memory per instance
/// and for exercising out-of-memory paths.
#[derive(Debug)]
pub struct BudgetAllocator {
    limit: usize,
    in_use: AtomicUsize,
    peak: AtomicUsize,
}

impl BudgetAllocator {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            in_use: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    fn charge(&self, size: usize) -> Result<(), AllocError> {
        let limit = self.limit;
        let after = self
            .in_use
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                used.checked_add(size).filter(|&total| total <= limit)
            })
            .map_err(|_| AllocError { requested: size })?
            + size;
        self.peak.fetch_max(after, Ordering::Relaxed);
        Ok(())
    }

    fn release(&self, size: usize) {
        let _ = self
            .in_use
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                Some(used.saturating_sub(size))
            });
    }
}

impl Allocator for BudgetAllocator {
    fn allocate(&self, size: usize) -> Result<(), AllocError> {
        self.charge(size)
    }

    fn reallocate(&self, old_size: usize, new_size: usize) -> Result<(), AllocError> {
        if new_size >= old_size {
            self.charge(new_size - old_size)
        } else {
            self.release(old_size - new_size);
            Ok(())
        }
    }

    fn free(&self, size: usize) {
        self.release(size);
    }
}

pub type SharedAllocator = Arc<dyn Allocator>;

/// Growth hints for the internal pools. A zero entry selects the default.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AllocConfig {
    pub mesh_edge_bucket_size: usize,
    pub mesh_vertex_bucket_size: usize,
    pub mesh_face_bucket_size: usize,
    pub dict_node_bucket_size: usize,
    pub region_bucket_size: usize,
    /// Slack reserved in the event queue for intersection vertices.
    pub extra_vertices: usize,
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self {
            mesh_edge_bucket_size: 512,
            mesh_vertex_bucket_size: 512,
            mesh_face_bucket_size: 256,
            dict_node_bucket_size: 512,
            region_bucket_size: 256,
            extra_vertices: 0,
        }
    }
}

impl AllocConfig {
    pub(crate) fn normalized(self) -> Self {
        let d = Self::default();
        let pick = |v: usize, fallback: usize| if v == 0 { fallback } else { v };
        Self {
            mesh_edge_bucket_size: pick(self.mesh_edge_bucket_size, d.mesh_edge_bucket_size),
            mesh_vertex_bucket_size: pick(self.mesh_vertex_bucket_size, d.mesh_vertex_bucket_size),
            mesh_face_bucket_size: pick(self.mesh_face_bucket_size, d.mesh_face_bucket_size),
            dict_node_bucket_size: pick(self.dict_node_bucket_size, d.dict_node_bucket_size),
            region_bucket_size: pick(self.region_bucket_size, d.region_bucket_size),
            extra_vertices: self.extra_vertices,
        }
    }

    /// Event queue slack: never fewer than 8 spare slots.
    pub(crate) fn queue_slack(&self) -> usize {
        self.extra_vertices.max(8)
    }
}

// The system refused memory the allocator had already granted; undo the charge.
fn rollback(alloc: &dyn Allocator, old_bytes: usize, new_bytes: usize) {
    if old_bytes == 0 {
        alloc.free(new_bytes);
    } else {
        let _ = alloc.reallocate(new_bytes, old_bytes);
    }
}

/// Arena of `T` addressed by `u32` handles, grown in buckets.
pub(crate) struct Pool<T> {
    items: Vec<T>,
    free_list: Vec<u32>,
    reserved: usize,
    bucket: usize,
    live: usize,
    alloc: SharedAllocator,
}

impl<T> Pool<T> {
    pub fn new(bucket: usize, alloc: SharedAllocator) -> Self {
        Self {
            items: Vec::new(),
            free_list: Vec::new(),
            reserved: 0,
            bucket: bucket.max(1),
            live: 0,
            alloc,
        }
    }

    /// Store `value`, reusing a freed slot when one exists.
    pub fn alloc(&mut self, value: T) -> Result<u32, AllocError> {
        if let Some(idx) = self.free_list.pop() {
            self.items[idx as usize] = value;
            self.live += 1;
            return Ok(idx);
        }
        if self.items.len() == self.reserved {
            self.grow()?;
        }
        let idx = self.items.len() as u32;
        self.items.push(value);
        self.live += 1;
        Ok(idx)
    }

    /// Return a slot to the free list. The value stays in place until reused.
    pub fn free(&mut self, idx: u32) {
        self.free_list.push(idx);
        self.live = self.live.saturating_sub(1);
    }

    /// Number of live (allocated, not freed) slots.
    pub fn len(&self) -> usize {
        self.live
    }

    fn grow(&mut self) -> Result<(), AllocError> {
        let item = size_of::<T>().max(1);
        let old_bytes = self.reserved * item;
        let new_bytes = (self.reserved + self.bucket) * item;
        if self.reserved == 0 {
            self.alloc.allocate(new_bytes)?;
        } else {
            self.alloc.reallocate(old_bytes, new_bytes)?;
        }
        if self.items.try_reserve_exact(self.bucket).is_err() {
            rollback(self.alloc.as_ref(), old_bytes, new_bytes);
            return Err(AllocError { requested: new_bytes });
        }
        self.reserved += self.bucket;
        Ok(())
    }
}

impl<T> Index<u32> for Pool<T> {
    type Output = T;

    #[inline]
    fn index(&self, idx: u32) -> &T {
        &self.items[idx as usize]
    }
}

impl<T> IndexMut<u32> for Pool<T> {
    #[inline]
    fn index_mut(&mut self, idx: u32) -> &mut T {
        &mut self.items[idx as usize]
    }
}

impl<T> Drop for Pool<T> {
    fn drop(&mut self) {
        if self.reserved > 0 {
            self.alloc.free(self.reserved * size_of::<T>().max(1));
        }
    }
}

/// Growable buffer whose capacity is accounted against an allocator.
pub(crate) struct TrackedVec<T> {
    items: Vec<T>,
    reserved: usize,
    alloc: SharedAllocator,
}

impl<T> TrackedVec<T> {
    pub fn new(alloc: SharedAllocator) -> Self {
        Self {
            items: Vec::new(),
            reserved: 0,
            alloc,
        }
    }

    /// Make room for at least `additional` more items.
    pub fn reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        let needed = self.items.len() + additional;
        if needed <= self.reserved {
            return Ok(());
        }
        let target = needed.max(self.reserved * 2);
        let item = size_of::<T>().max(1);
        if self.reserved == 0 {
            self.alloc.allocate(target * item)?;
        } else {
            self.alloc.reallocate(self.reserved * item, target * item)?;
        }
        if self.items.try_reserve_exact(target - self.items.len()).is_err() {
            rollback(self.alloc.as_ref(), self.reserved * item, target * item);
            return Err(AllocError { requested: target * item });
        }
        self.reserved = target;
        Ok(())
    }

    pub fn push(&mut self, value: T) -> Result<(), AllocError> {
        self.reserve(1)?;
        self.items.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Drop the contents and hand the accounted capacity back.
    pub fn release(&mut self) {
        self.items = Vec::new();
        if self.reserved > 0 {
            self.alloc.free(self.reserved * size_of::<T>().max(1));
            self.reserved = 0;
        }
    }
}

impl<T> Deref for TrackedVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> DerefMut for TrackedVec<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.items
    }
}

impl<T> Drop for TrackedVec<T> {
    fn drop(&mut self) {
        self.release();
    }
}
