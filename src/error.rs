// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Status codes and the error type carried through the pipeline.

use thiserror::Error;

use crate::alloc::AllocError;

/// Outcome of the most recent operation on a [`Tessellator`](crate::Tessellator).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TessStatus {
    Ok,
    OutOfMemory,
    InvalidInput,
}

/// Reasons a tessellation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TessError {
    /// A submitted coordinate is NaN, infinite, or outside the supported range.
    #[error("vertex {index} has an unsupported value in component {component}")]
    InvalidCoordinate { index: usize, component: usize },

    /// The caller-supplied projection normal has a NaN or infinite component.
    #[error("projection normal is not finite")]
    InvalidNormal,

    /// The contour buffer does not match the requested stride or count.
    #[error("contour layout is inconsistent: {0}")]
    BadLayout(&'static str),

    /// The sweep could not keep a consistent edge order (numerically pathological input).
    #[error("sweep lost a consistent edge order: {0}")]
    InconsistentSweep(&'static str),

    #[error(transparent)]
    Alloc(#[from] AllocError),
}

impl TessError {
    pub fn status(&self) -> TessStatus {
        match self {
            TessError::Alloc(_) => TessStatus::OutOfMemory,
            _ => TessStatus::InvalidInput,
        }
    }
}

pub(crate) type TessResult<T> = Result<T, TessError>;
