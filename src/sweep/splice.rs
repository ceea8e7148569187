// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Consistency checks between neighbouring active edges.
//
// After every change to the dictionary the affected regions are marked dirty.
// `walk_dirty_regions` revisits them and, for each pair of adjacent edges,
// either splices an endpoint that lies on the other edge or splits both edges
// at their intersection, queueing the new vertex as a future event.

use tracing::trace;

use super::{ActiveRegion, RegionIdx, Sweep};
use crate::error::{TessError, TessResult};
use crate::geom::{edge_intersect, edge_sign, intersection_weights, Pos};
use crate::mesh::{sym, VertIdx, INVALID};

impl Sweep<'_> {
    /// Check the upper and lower edge of the region below `reg_up` near
    /// their right endpoints. If one origin lies on the other edge (or both
    /// origins coincide), splice it in. Returns true when the mesh changed.
    pub(super) fn check_for_right_splice(&mut self, reg_up: RegionIdx) -> TessResult<bool> {
        let reg_lo = self.region_below(reg_up)?;
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let org_up = self.mesh.org_pos(e_up);
        let org_lo = self.mesh.org_pos(e_lo);

        if org_up.leq(org_lo) {
            if edge_sign(self.mesh.dst_pos(e_lo), org_up, org_lo) > 0.0 {
                return Ok(false);
            }
            if org_up != org_lo {
                // e_up.org is on or below e_lo: split e_lo there.
                self.mesh.split_edge(sym(e_lo))?;
                let lo_oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, lo_oprev)?;
                self.regions[reg_up].dirty = true;
                self.regions[reg_lo].dirty = true;
            } else if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                // Same position, distinct vertices: merge, dropping e_up.org.
                let v = self.mesh.org(e_up);
                self.dequeue(v);
                let lo_oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(lo_oprev, e_up)?;
            }
        } else {
            if edge_sign(self.mesh.dst_pos(e_up), org_lo, org_up) < 0.0 {
                return Ok(false);
            }
            // e_lo.org is on or above e_up: split e_up there.
            let above = self.region_above(reg_up)?;
            self.regions[above].dirty = true;
            self.regions[reg_up].dirty = true;
            self.mesh.split_edge(sym(e_up))?;
            let lo_oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(lo_oprev, e_up)?;
        }
        Ok(true)
    }

    /// Same as `check_for_right_splice`, but for the left endpoints. The two
    /// destinations must be distinct vertices.
    pub(super) fn check_for_left_splice(&mut self, reg_up: RegionIdx) -> TessResult<bool> {
        let reg_lo = self.region_below(reg_up)?;
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let dst_up = self.mesh.dst_pos(e_up);
        let dst_lo = self.mesh.dst_pos(e_lo);
        if dst_up == dst_lo {
            return Err(TessError::InconsistentSweep("active edges end at one position"));
        }

        let ActiveRegion { winding_number, inside, .. } = self.regions[reg_up];
        if dst_up.leq(dst_lo) {
            if edge_sign(dst_up, dst_lo, self.mesh.org_pos(e_up)) < 0.0 {
                return Ok(false);
            }
            // e_lo.dst is above e_up: splice it into e_up.
            let above = self.region_above(reg_up)?;
            self.regions[above].dirty = true;
            self.regions[reg_up].dirty = true;
            let e = self.mesh.split_edge(e_up)?;
            self.mesh.splice(sym(e_lo), e)?;
            let f = self.mesh.lface(e);
            self.mesh.faces[f].inside = inside;
            self.mesh.faces[f].winding = winding_number;
        } else {
            if edge_sign(dst_lo, dst_up, self.mesh.org_pos(e_lo)) > 0.0 {
                return Ok(false);
            }
            // e_up.dst is below e_lo: splice it into e_lo.
            self.regions[reg_up].dirty = true;
            self.regions[reg_lo].dirty = true;
            let e = self.mesh.split_edge(e_lo)?;
            let up_lnext = self.mesh.lnext(e_up);
            self.mesh.splice(up_lnext, sym(e_lo))?;
            let f = self.mesh.rface(e);
            self.mesh.faces[f].inside = inside;
            self.mesh.faces[f].winding = winding_number;
        }
        Ok(true)
    }

    /// Check the upper and lower edges of the region below `reg_up` for an
    /// intersection. A crossing ahead of the sweep becomes a new queued
    /// vertex; one at the event is spliced in immediately. Returns true when
    /// the regions around the event were rebuilt and the caller must stop
    /// using its handles.
    pub(super) fn check_for_intersect(&mut self, reg_up: RegionIdx) -> TessResult<bool> {
        let reg_lo = self.region_below(reg_up)?;
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let (org_up, dst_up) = (self.mesh.org(e_up), self.mesh.dst(e_up));
        let (org_lo, dst_lo) = (self.mesh.org(e_lo), self.mesh.dst(e_lo));
        let (p_org_up, p_dst_up) = (self.mesh.pos(org_up), self.mesh.pos(dst_up));
        let (p_org_lo, p_dst_lo) = (self.mesh.pos(org_lo), self.mesh.pos(dst_lo));
        let event = self.event;
        let ev = self.mesh.pos(event);

        if org_up == org_lo {
            // Right endpoints are the same vertex: nothing can cross.
            return Ok(false);
        }
        let t_min_up = p_org_up.t.min(p_dst_up.t);
        let t_max_lo = p_org_lo.t.max(p_dst_lo.t);
        if t_min_up > t_max_lo {
            // The t ranges do not overlap.
            return Ok(false);
        }
        if p_org_up.leq(p_org_lo) {
            if edge_sign(p_dst_lo, p_org_up, p_org_lo) > 0.0 {
                return Ok(false);
            }
        } else if edge_sign(p_dst_up, p_org_lo, p_org_up) < 0.0 {
            return Ok(false);
        }

        let mut isect = edge_intersect(p_dst_up, p_org_up, p_dst_lo, p_org_lo);
        if !isect.is_finite() {
            return Err(TessError::InconsistentSweep("edge intersection is not finite"));
        }

        // Keep the crossing inside the region the sweep can still reach:
        // not behind the event, not beyond the leftmost right endpoint.
        if isect.leq(ev) {
            isect = ev;
        }
        let org_min = if p_org_up.leq(p_org_lo) { p_org_up } else { p_org_lo };
        if org_min.leq(isect) {
            isect = org_min;
        }

        if isect == p_org_up || isect == p_org_lo {
            // Easy case: the crossing is a right endpoint.
            self.check_for_right_splice(reg_up)?;
            return Ok(false);
        }

        if (p_dst_up != ev && edge_sign(p_dst_up, ev, isect) >= 0.0)
            || (p_dst_lo != ev && edge_sign(p_dst_lo, ev, isect) <= 0.0)
        {
            // Rounding put the crossing on the wrong side of the event, so
            // one of the edges passes through or very near the event.
            if dst_lo == event {
                // Splice dst_lo into e_up and rebuild the regions around it.
                self.mesh.split_edge(sym(e_up))?;
                self.mesh.splice(sym(e_lo), e_up)?;
                let reg_up = self.top_left_region(reg_up)?;
                let below = self.region_below(reg_up)?;
                let e_top = self.e_up(below);
                self.finish_left_regions(below, Some(reg_lo))?;
                let first = self.mesh.oprev(e_top);
                self.add_right_edges(reg_up, first, e_top, Some(e_top), true)?;
                return Ok(true);
            }
            if dst_up == event {
                // Splice dst_up into e_lo and rebuild the regions around it.
                self.mesh.split_edge(sym(e_lo))?;
                let (a, b) = (self.mesh.lnext(e_up), self.mesh.oprev(e_lo));
                self.mesh.splice(a, b)?;
                let reg_lo = reg_up;
                let reg_up = self.top_right_region(reg_up)?;
                let below = self.region_below(reg_up)?;
                let e = self.mesh.rprev(self.e_up(below));
                let new_up = self.mesh.oprev(e_lo);
                let old_up = self.e_up(reg_lo);
                self.mesh.edges[old_up].region = INVALID;
                self.regions[reg_lo].e_up = new_up;
                self.mesh.edges[new_up].region = reg_lo;
                let e_lo = self.finish_left_regions(reg_lo, None)?;
                let (first, last) = (self.mesh.onext(e_lo), self.mesh.rprev(e_up));
                self.add_right_edges(reg_up, first, last, Some(e), true)?;
                return Ok(true);
            }

            // Split whichever edge passes on the wrong side of the event and
            // move the new vertex onto the event; the caller splices it.
            if edge_sign(p_dst_up, ev, isect) >= 0.0 {
                let above = self.region_above(reg_up)?;
                self.regions[above].dirty = true;
                self.regions[reg_up].dirty = true;
                self.mesh.split_edge(sym(e_up))?;
                let v = self.mesh.org(e_up);
                self.place_at_event(v);
            }
            if edge_sign(p_dst_lo, ev, isect) <= 0.0 {
                self.regions[reg_up].dirty = true;
                self.regions[reg_lo].dirty = true;
                self.mesh.split_edge(sym(e_lo))?;
                let v = self.mesh.org(e_lo);
                self.place_at_event(v);
            }
            return Ok(false);
        }

        // General case: split both edges, join them at a new vertex and queue
        // it. The crossing is strictly to the right of the event.
        self.mesh.split_edge(sym(e_up))?;
        self.mesh.split_edge(sym(e_lo))?;
        let lo_oprev = self.mesh.oprev(e_lo);
        self.mesh.splice(lo_oprev, e_up)?;
        let v = self.mesh.org(e_up);
        self.mesh.verts[v].pos = isect;
        let handle = self.queue.insert(v, isect)?;
        self.mesh.verts[v].pq_handle = handle;
        self.blend_coords(v, isect, [(org_up, dst_up), (org_lo, dst_lo)]);
        trace!(s = isect.s, t = isect.t, "edges cross");

        let above = self.region_above(reg_up)?;
        self.regions[above].dirty = true;
        self.regions[reg_up].dirty = true;
        self.regions[reg_lo].dirty = true;
        Ok(false)
    }

    /// Revisit dirty regions around the event until every adjacent pair of
    /// active edges is consistent.
    pub(super) fn walk_dirty_regions(&mut self, reg_up: RegionIdx) -> TessResult<()> {
        let mut reg_up = reg_up;
        let mut reg_lo = self.region_below(reg_up)?;

        loop {
            // Find the lowest dirty region (we walk from the bottom up).
            while self.regions[reg_lo].dirty {
                reg_up = reg_lo;
                reg_lo = self.region_below(reg_lo)?;
            }
            if !self.regions[reg_up].dirty {
                reg_lo = reg_up;
                reg_up = self.dict.key(self.dict.succ(self.regions[reg_up].node_up));
                if reg_up == INVALID || !self.regions[reg_up].dirty {
                    // Nothing dirty remains.
                    return Ok(());
                }
            }
            self.regions[reg_up].dirty = false;
            let mut e_up = self.e_up(reg_up);
            let mut e_lo = self.e_up(reg_lo);

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo) && self.check_for_left_splice(reg_up)? {
                // A temporary edge that was just split is no longer needed.
                if self.regions[reg_lo].fix_upper_edge {
                    self.delete_region(reg_lo);
                    self.mesh.delete_edge(e_lo)?;
                    reg_lo = self.region_below(reg_up)?;
                    e_lo = self.e_up(reg_lo);
                } else if self.regions[reg_up].fix_upper_edge {
                    self.delete_region(reg_up);
                    self.mesh.delete_edge(e_up)?;
                    reg_up = self.region_above(reg_lo)?;
                    e_up = self.e_up(reg_up);
                }
            }

            if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                let dsts_differ = self.mesh.dst(e_up) != self.mesh.dst(e_lo);
                let touches_event =
                    self.mesh.dst(e_up) == self.event || self.mesh.dst(e_lo) == self.event;
                if dsts_differ
                    && !self.regions[reg_up].fix_upper_edge
                    && !self.regions[reg_lo].fix_upper_edge
                    && touches_event
                {
                    // Only edges meeting at the event can have a new crossing
                    // left of their right endpoints.
                    if self.check_for_intersect(reg_up)? {
                        return Ok(());
                    }
                } else {
                    // Even with no crossing, an endpoint may lie on the other edge.
                    self.check_for_right_splice(reg_up)?;
                }
            }

            if self.mesh.org(e_up) == self.mesh.org(e_lo) && self.mesh.dst(e_up) == self.mesh.dst(e_lo)
            {
                // Two edges with the same endpoints: merge them.
                self.mesh.add_winding(e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete_edge(e_up)?;
                reg_up = self.region_above(reg_lo)?;
            }
        }
    }

    /// Take a still-queued vertex out of the event queue.
    fn dequeue(&mut self, v: VertIdx) {
        let handle = self.mesh.verts[v].pq_handle;
        if handle != INVALID {
            self.queue.delete(handle);
            self.mesh.verts[v].pq_handle = INVALID;
        }
    }

    /// Move a vertex created by a split onto the current event; it inherits
    /// the event's coordinates until the two are spliced together.
    fn place_at_event(&mut self, v: VertIdx) {
        let event = self.mesh.verts[self.event];
        let vert = &mut self.mesh.verts[v];
        vert.pos = event.pos;
        vert.coords = event.coords;
    }

    /// Coordinates of an intersection vertex: a blend of the four endpoints,
    /// weighted by distance along each edge.
    fn blend_coords(&mut self, v: VertIdx, isect: Pos, edges: [(VertIdx, VertIdx); 2]) {
        let mut coords = [0.0; 3];
        for (org, dst) in edges {
            let (o, d) = (self.mesh.verts[org], self.mesh.verts[dst]);
            let (w_org, w_dst) = intersection_weights(isect, o.pos, d.pos);
            for (i, c) in coords.iter_mut().enumerate() {
                *c += w_org * o.coords[i] + w_dst * d.coords[i];
            }
        }
        self.mesh.verts[v].coords = coords;
    }
}
