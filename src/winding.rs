// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Winding rules and the face classification helpers built on them.
//
// The sweep carries a running winding number on each active region and
// stamps it onto the face the region closes. This module decides which
// winding numbers count as interior and rewrites edge windings when only
// the boundary between interior and exterior is wanted.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alloc::AllocError;
use crate::mesh::{sym, Mesh, E_HEAD};

/// Which winding numbers are considered inside the shape.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindingRule {
    /// Odd winding numbers (even-odd fill).
    #[default]
    Odd,
    NonZero,
    Positive,
    Negative,
    /// |winding| >= 2.
    AbsGeqTwo,
}

impl WindingRule {
    pub fn contains(self, winding: i32) -> bool {
        match self {
            WindingRule::Odd => winding & 1 != 0,
            WindingRule::NonZero => winding != 0,
            WindingRule::Positive => winding > 0,
            WindingRule::Negative => winding < 0,
            WindingRule::AbsGeqTwo => winding >= 2 || winding <= -2,
        }
    }
}

/// Reset every edge winding to `value` or `-value` so that interior faces end
/// up on the positive side. Edges not separating interior from exterior are
/// zeroed, or deleted when `keep_only_boundary` is set.
pub(crate) fn set_winding_number(
    mesh: &mut Mesh,
    value: i32,
    keep_only_boundary: bool,
) -> Result<(), AllocError> {
    let mut e = mesh.edges[E_HEAD].next;
    while e != E_HEAD {
        let e_next = mesh.edges[e].next;
        let inside_left = mesh.faces[mesh.lface(e)].inside;
        let inside_right = mesh.faces[mesh.rface(e)].inside;
        if inside_right != inside_left {
            let w = if inside_left { value } else { -value };
            mesh.edges[e].winding = w;
            mesh.edges[sym(e)].winding = -w;
        } else if keep_only_boundary {
            mesh.delete_edge(e)?;
        } else {
            mesh.edges[e].winding = 0;
            mesh.edges[sym(e)].winding = 0;
        }
        e = e_next;
    }
    Ok(())
}
