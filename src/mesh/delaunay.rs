// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Constrained Delaunay refinement by edge flipping.

use std::f32::consts::PI;

use tracing::trace;

use super::{sym, EdgeIdx, Mesh};
use crate::alloc::{AllocError, SharedAllocator, TrackedVec};
use crate::geom::angle;

// Slack on the opposite-angle test; keeps cocircular quads from flipping back and forth.
const ANGLE_SLACK: f32 = 0.01;

impl Mesh {
    /// An interior edge is locally Delaunay when the two angles facing it sum
    /// to at most a half turn.
    pub fn edge_is_locally_delaunay(&self, e: EdgeIdx) -> bool {
        let facing = |e: EdgeIdx| {
            let next = self.lnext(e);
            angle(
                self.org_pos(next),
                self.org_pos(self.lnext(next)),
                self.org_pos(e),
            )
        };
        facing(e) + facing(sym(e)) < PI + ANGLE_SLACK
    }

    /// Replace the diagonal `edge` of the quad formed by its two triangles
    /// with the opposite diagonal. Both faces must be triangles.
    pub fn flip_edge(&mut self, edge: EdgeIdx) {
        let a0 = edge;
        let a1 = self.lnext(a0);
        let a2 = self.lnext(a1);
        let b0 = sym(edge);
        let b1 = self.lnext(b0);
        let b2 = self.lnext(b1);

        let a_org = self.org(a0);
        let a_opp = self.org(a2);
        let b_org = self.org(b0);
        let b_opp = self.org(b2);

        let fa = self.lface(a0);
        let fb = self.lface(b0);

        debug_assert!(self.edge_is_internal(edge));
        debug_assert!(self.lnext(a2) == a0 && self.lnext(b2) == b0);

        self.edges[a0].org = b_opp;
        self.edges[a0].onext = sym(b1);
        self.edges[b0].org = a_opp;
        self.edges[b0].onext = sym(a1);
        self.edges[a2].onext = b0;
        self.edges[b2].onext = a0;
        self.edges[b1].onext = sym(a2);
        self.edges[a1].onext = sym(b2);

        self.edges[a0].lnext = a2;
        self.edges[a2].lnext = b1;
        self.edges[b1].lnext = a0;

        self.edges[b0].lnext = b2;
        self.edges[b2].lnext = a1;
        self.edges[a1].lnext = b0;

        self.edges[a1].lface = fb;
        self.edges[b1].lface = fa;

        self.faces[fa].an_edge = a0;
        self.faces[fb].an_edge = b0;

        if self.verts[a_org].an_edge == a0 {
            self.verts[a_org].an_edge = b1;
        }
        if self.verts[b_org].an_edge == b0 {
            self.verts[b_org].an_edge = a1;
        }
    }

    /// Flip interior edges until every one is locally Delaunay, or until the
    /// iteration cap (square of the interior face count) is reached.
    pub fn refine_delaunay(&mut self, alloc: &SharedAllocator) -> Result<(), AllocError> {
        let mut stack: TrackedVec<EdgeIdx> = TrackedVec::new(alloc.clone());
        let mut faces = 0usize;

        let inside: Vec<_> = self.face_ids().filter(|&f| self.faces[f].inside).collect();
        for f in inside {
            let start = self.faces[f].an_edge;
            let mut e = start;
            loop {
                let internal = self.edge_is_internal(e);
                self.edges[e].mark = internal;
                if internal && !self.edges[sym(e)].mark {
                    stack.push(e)?;
                }
                e = self.lnext(e);
                if e == start {
                    break;
                }
            }
            faces += 1;
        }

        let max_iter = faces * faces;
        let mut iter = 0;
        let mut flips = 0;
        while iter < max_iter {
            let Some(e) = stack.pop() else { break };
            self.edges[e].mark = false;
            self.edges[sym(e)].mark = false;
            if !self.edge_is_locally_delaunay(e) {
                self.flip_edge(e);
                flips += 1;
                let around = [self.lnext(e), self.lprev(e), self.lnext(sym(e)), self.lprev(sym(e))];
                for nb in around {
                    if !self.edges[nb].mark && self.edge_is_internal(nb) {
                        self.edges[nb].mark = true;
                        self.edges[sym(nb)].mark = true;
                        stack.push(nb)?;
                    }
                }
            }
            iter += 1;
        }
        trace!(faces, flips, iter, "delaunay refinement finished");
        Ok(())
    }
}
