// polytess: sweep-line polygon tessellation over a half-edge mesh
// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

pub mod alloc;
pub mod error;
pub mod geom;
pub mod tess;
pub mod winding;

pub(crate) mod dict;
pub(crate) mod mesh;
pub(crate) mod monotone;
pub(crate) mod priorityq;
pub(crate) mod sweep;

pub use alloc::{AllocConfig, AllocError, Allocator, BudgetAllocator, HeapAllocator, SharedAllocator};
pub use error::{TessError, TessStatus};
pub use tess::{ElementType, TessOption, Tessellator, TESS_UNDEF};
pub use winding::WindingRule;
