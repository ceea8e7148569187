// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Triangulation of the interior faces left by the sweep.
//
// Every interior face produced by the sweep is monotone in s, so it can be
// triangulated in linear time by walking its upper and lower chains from
// right to left. Faces can afterwards be re-merged into convex polygons of
// bounded size.

use crate::alloc::AllocError;
use crate::error::{TessError, TessResult};
use crate::geom::{edge_sign, vert_ccw};
use crate::mesh::{sym, FaceIdx, Mesh, E_HEAD, F_HEAD, INVALID};

/// Triangulate one monotone face by adding diagonals.
///
/// The face is walked from its rightmost vertex; `up` follows the upper
/// chain and `lo` the lower one. Whichever chain has the rightmost pending
/// vertex emits triangles as long as they are convex; the last fan closes at
/// the leftmost vertex. Walks are bounded by the face size.
pub(crate) fn tessellate_mono_region(mesh: &mut Mesh, face: FaceIdx) -> TessResult<()> {
    let n = mesh.count_face_verts(face);
    if n < 3 {
        return Ok(());
    }
    let mut budget = 4 * n + 8;
    let mut step = || {
        budget = budget.checked_sub(1).ok_or(TessError::InconsistentSweep(
            "monotone region walk did not terminate",
        ))?;
        Ok::<(), TessError>(())
    };

    // Find the half-edge whose origin is the rightmost vertex of the upper
    // chain. The face is CCW, so the upper chain runs right to left.
    let mut up = mesh.faces[face].an_edge;
    while mesh.dst_pos(up).leq(mesh.org_pos(up)) {
        step()?;
        up = mesh.lprev(up);
    }
    while mesh.org_pos(up).leq(mesh.dst_pos(up)) {
        step()?;
        up = mesh.lnext(up);
    }
    let mut lo = mesh.lprev(up);

    while mesh.lnext(up) != lo {
        step()?;
        if mesh.dst_pos(up).leq(mesh.org_pos(lo)) {
            // up.dst is to the left: emit CCW triangles from lo.org.
            while mesh.lnext(lo) != up {
                let next = mesh.lnext(lo);
                if !mesh.edge_goes_left(next)
                    && edge_sign(mesh.org_pos(lo), mesh.dst_pos(lo), mesh.dst_pos(next)) > 0.0
                {
                    break;
                }
                step()?;
                lo = sym(mesh.connect(next, lo)?);
            }
            lo = mesh.lprev(lo);
        } else {
            // lo.org is to the left: emit CCW triangles from up.dst.
            while mesh.lnext(lo) != up {
                let prev = mesh.lprev(up);
                if !mesh.edge_goes_right(prev)
                    && edge_sign(mesh.dst_pos(up), mesh.org_pos(up), mesh.org_pos(prev)) < 0.0
                {
                    break;
                }
                step()?;
                up = sym(mesh.connect(up, prev)?);
            }
            up = mesh.lnext(up);
        }
    }

    // The rest is a fan around the leftmost vertex.
    if mesh.lnext(lo) == up {
        return Err(TessError::InconsistentSweep("monotone region collapsed"));
    }
    while mesh.lnext(mesh.lnext(lo)) != up {
        step()?;
        let next = mesh.lnext(lo);
        lo = sym(mesh.connect(next, lo)?);
    }
    Ok(())
}

/// Triangulate every interior face. New faces created along the way are
/// linked ahead of the face being split, so they are not revisited.
pub(crate) fn tessellate_interior(mesh: &mut Mesh) -> TessResult<()> {
    let mut f = mesh.faces[F_HEAD].next;
    while f != F_HEAD {
        let next = mesh.faces[f].next;
        if mesh.faces[f].inside {
            tessellate_mono_region(mesh, f)?;
        }
        f = next;
    }
    Ok(())
}

/// Delete interior edges whose removal leaves a convex face of at most
/// `max_verts` vertices.
pub(crate) fn merge_convex_faces(mesh: &mut Mesh, max_verts: usize) -> Result<(), AllocError> {
    let is_inside = |mesh: &Mesh, f: FaceIdx| f != INVALID && mesh.faces[f].inside;

    let mut e = mesh.edges[E_HEAD].next;
    while e != E_HEAD {
        let mut e_next = mesh.edges[e].next;
        let e_sym = sym(e);
        let (left, right) = (mesh.lface(e), mesh.lface(e_sym));
        if !is_inside(mesh, left) || !is_inside(mesh, right) {
            e = e_next;
            continue;
        }
        if mesh.count_face_verts(left) + mesh.count_face_verts(right) - 2 > max_verts {
            e = e_next;
            continue;
        }

        // Both corners at either end of e must stay convex.
        let va = mesh.org_pos(mesh.lprev(e));
        let vb = mesh.org_pos(e);
        let vc = mesh.dst_pos(mesh.lnext(e_sym));
        let vd = mesh.org_pos(mesh.lprev(e_sym));
        let ve = mesh.org_pos(e_sym);
        let vf = mesh.dst_pos(mesh.lnext(e));
        if vert_ccw(va, vb, vc) && vert_ccw(vd, ve, vf) {
            if e == e_next || e == sym(e_next) {
                e_next = mesh.edges[e_next].next;
            }
            mesh.delete_edge(e)?;
        }
        e = e_next;
    }
    Ok(())
}
