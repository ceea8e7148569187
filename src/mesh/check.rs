// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Structural validation of the half-edge mesh.

use thiserror::Error;

use super::{sym, EdgeIdx, FaceIdx, Mesh, VertIdx, E_HEAD, F_HEAD, INVALID, V_HEAD};

/// First broken invariant found by [`Mesh::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MeshDefect {
    #[error("face {0} is not linked to its neighbours in the face list")]
    FaceList(FaceIdx),
    #[error("vertex {0} is not linked to its neighbours in the vertex list")]
    VertexList(VertIdx),
    #[error("edge {0} is not linked to its neighbours in the edge list")]
    EdgeList(EdgeIdx),
    #[error("edge {0} breaks the lnext/onext duality")]
    Ring(EdgeIdx),
    #[error("edge {0} does not point back at the face walking it")]
    FaceLoop(EdgeIdx),
    #[error("edge {0} does not point back at the vertex it leaves")]
    VertexRing(EdgeIdx),
    #[error("edge {0} has no endpoint")]
    Dangling(EdgeIdx),
    #[error("a face or vertex walk did not close")]
    Unbounded,
}

impl Mesh {
    /// Verify the mesh invariants: every list is a consistent circular list,
    /// every face loop and vertex ring closes and points back at its owner,
    /// and `lnext`/`onext` agree (`e.lnext.onext.sym == e`).
    pub fn check(&self) -> Result<(), MeshDefect> {
        let limit = self.edges.len() + 2;

        let mut f_prev = F_HEAD;
        loop {
            let f = self.faces[f_prev].next;
            if self.faces[f].prev != f_prev {
                return Err(MeshDefect::FaceList(f));
            }
            if f == F_HEAD {
                break;
            }
            let start = self.faces[f].an_edge;
            let mut e = start;
            let mut steps = 0;
            loop {
                self.check_duality(e)?;
                if self.lface(e) != f {
                    return Err(MeshDefect::FaceLoop(e));
                }
                e = self.lnext(e);
                steps += 1;
                if e == start {
                    break;
                }
                if steps > limit {
                    return Err(MeshDefect::Unbounded);
                }
            }
            f_prev = f;
        }

        let mut v_prev = V_HEAD;
        loop {
            let v = self.verts[v_prev].next;
            if self.verts[v].prev != v_prev {
                return Err(MeshDefect::VertexList(v));
            }
            if v == V_HEAD {
                break;
            }
            let start = self.verts[v].an_edge;
            let mut e = start;
            let mut steps = 0;
            loop {
                self.check_duality(e)?;
                if self.org(e) != v {
                    return Err(MeshDefect::VertexRing(e));
                }
                e = self.onext(e);
                steps += 1;
                if e == start {
                    break;
                }
                if steps > limit {
                    return Err(MeshDefect::Unbounded);
                }
            }
            v_prev = v;
        }

        let mut e_prev = E_HEAD;
        loop {
            let e = self.edges[e_prev].next;
            if self.edges[sym(e)].next != sym(e_prev) {
                return Err(MeshDefect::EdgeList(e));
            }
            if e == E_HEAD {
                break;
            }
            if self.org(e) == INVALID || self.dst(e) == INVALID {
                return Err(MeshDefect::Dangling(e));
            }
            self.check_duality(e)?;
            e_prev = e;
        }
        Ok(())
    }

    fn check_duality(&self, e: EdgeIdx) -> Result<(), MeshDefect> {
        if sym(self.onext(self.lnext(e))) != e || self.lnext(sym(self.onext(e))) != e {
            return Err(MeshDefect::Ring(e));
        }
        Ok(())
    }
}
