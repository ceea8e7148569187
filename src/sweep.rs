// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Sweep-line construction of the planar subdivision.
//
// Vertices are processed in (s, t) order. The dictionary holds one active
// region per edge crossing the sweep line, ordered bottom to top; each region
// is the area between its upper edge `e_up` and the upper edge of the region
// below. Active edges are directed right to left (origin ahead of the sweep).
//
// When a region closes, its winding number and interior flag are stamped on
// the mesh face it bounds. Temporary "fixable" edges join right vertices to
// the mesh so that every face stays connected; they are replaced as soon as a
// real edge reaches the same region.
//
// The splice and intersection checks that keep neighbouring active edges
// consistent live in `splice.rs`.

mod splice;

use tracing::{debug, trace};

use crate::alloc::{AllocConfig, Pool, SharedAllocator};
use crate::dict::{Dict, NodeIdx};
use crate::error::{TessError, TessResult};
use crate::geom::{edge_eval, edge_sign, Pos, Real};
use crate::mesh::{sym, EdgeIdx, Mesh, VertIdx, E_HEAD, F_HEAD, INVALID, V_HEAD};
use crate::priorityq::EventQueue;
use crate::winding::WindingRule;

pub(crate) type RegionIdx = u32;

/// The area between two adjacent active edges.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ActiveRegion {
    /// Upper edge, directed right to left.
    pub e_up: EdgeIdx,
    pub node_up: NodeIdx,
    pub winding_number: i32,
    pub inside: bool,
    /// Bounding edge at t = +/- infinity.
    pub sentinel: bool,
    /// Upper or lower edge changed; neighbours need re-checking.
    pub dirty: bool,
    /// `e_up` is a temporary edge to be replaced by the next real one.
    pub fix_upper_edge: bool,
}

impl ActiveRegion {
    fn new(e_up: EdgeIdx) -> Self {
        ActiveRegion {
            e_up,
            node_up: INVALID,
            winding_number: 0,
            inside: false,
            sentinel: false,
            dirty: false,
            fix_upper_edge: false,
        }
    }
}

/// Run the sweep over every contour in `mesh`: split crossing edges, merge
/// coincident vertices and classify each resulting face under `rule`.
pub(crate) fn compute_interior(
    mesh: &mut Mesh,
    rule: WindingRule,
    alloc: &SharedAllocator,
    config: &AllocConfig,
) -> TessResult<()> {
    let bounds = bounding_box(mesh);
    let mut sweep = Sweep {
        dict: Dict::new(config.dict_node_bucket_size, alloc.clone())?,
        regions: Pool::new(config.region_bucket_size, alloc.clone()),
        queue: EventQueue::new(alloc),
        event: INVALID,
        rule,
        mesh,
    };

    sweep.remove_degenerate_edges()?;
    sweep.init_queue(config)?;
    sweep.init_edge_dict(bounds)?;

    let mut events = 0usize;
    while let Some(v) = sweep.queue.extract_min() {
        sweep.mesh.verts[v].pq_handle = INVALID;
        // Coincident vertices are merged before the event is handled.
        while let Some(next) = sweep.queue.minimum() {
            if sweep.mesh.pos(next) != sweep.mesh.pos(v) {
                break;
            }
            sweep.queue.extract_min();
            sweep.mesh.verts[next].pq_handle = INVALID;
            let (a, b) = (sweep.mesh.verts[v].an_edge, sweep.mesh.verts[next].an_edge);
            sweep.mesh.splice(a, b)?;
        }
        sweep.sweep_event(v)?;
        events += 1;
    }

    sweep.done_edge_dict()?;
    sweep.remove_degenerate_faces()?;
    if let Err(defect) = sweep.mesh.check() {
        debug!(%defect, "mesh left inconsistent by the sweep");
        return Err(TessError::InconsistentSweep("mesh invariants broken"));
    }
    debug!(events, "sweep finished");
    Ok(())
}

fn bounding_box(mesh: &Mesh) -> (Pos, Pos) {
    let mut verts = mesh.vertex_ids();
    let Some(first) = verts.next() else {
        return (Pos::default(), Pos::default());
    };
    let p = mesh.pos(first);
    let (mut min, mut max) = (p, p);
    for v in verts {
        let p = mesh.pos(v);
        min.s = min.s.min(p.s);
        min.t = min.t.min(p.t);
        max.s = max.s.max(p.s);
        max.t = max.t.max(p.t);
    }
    (min, max)
}

/// Order two active edges at the current event: is `e1` at or below `e2`?
///
/// Edges ending at the event are compared by slope; otherwise by where they
/// cross the sweep line.
fn edge_leq(mesh: &Mesh, event: VertIdx, e1: EdgeIdx, e2: EdgeIdx) -> bool {
    let ev = mesh.pos(event);
    let (org1, dst1) = (mesh.org_pos(e1), mesh.dst_pos(e1));
    let (org2, dst2) = (mesh.org_pos(e2), mesh.dst_pos(e2));

    if mesh.dst(e1) == event {
        if mesh.dst(e2) == event {
            // Both start at the event and head right: compare slopes.
            if org1.leq(org2) {
                return edge_sign(dst2, org1, org2) <= 0.0;
            }
            return edge_sign(dst1, org2, org1) >= 0.0;
        }
        return edge_sign(dst2, ev, org2) <= 0.0;
    }
    if mesh.dst(e2) == event {
        return edge_sign(dst1, ev, org1) >= 0.0;
    }

    edge_eval(dst1, ev, org1) >= edge_eval(dst2, ev, org2)
}

struct Sweep<'m> {
    mesh: &'m mut Mesh,
    dict: Dict,
    regions: Pool<ActiveRegion>,
    queue: EventQueue,
    /// Vertex currently being swept.
    event: VertIdx,
    rule: WindingRule,
}

impl Sweep<'_> {
    // ───────────────────────────── regions ─────────────────────────────

    fn region_below(&self, reg: RegionIdx) -> TessResult<RegionIdx> {
        let below = self.dict.key(self.dict.pred(self.regions[reg].node_up));
        if below == INVALID {
            return Err(TessError::InconsistentSweep("no active region below"));
        }
        Ok(below)
    }

    fn region_above(&self, reg: RegionIdx) -> TessResult<RegionIdx> {
        let above = self.dict.key(self.dict.succ(self.regions[reg].node_up));
        if above == INVALID {
            return Err(TessError::InconsistentSweep("no active region above"));
        }
        Ok(above)
    }

    /// Region of the active edge `e`, which must currently be in the dictionary.
    fn region_of(&self, e: EdgeIdx) -> TessResult<RegionIdx> {
        let reg = self.mesh.edges[e].region;
        if reg == INVALID {
            return Err(TessError::InconsistentSweep("edge has no active region"));
        }
        Ok(reg)
    }

    fn e_up(&self, reg: RegionIdx) -> EdgeIdx {
        self.regions[reg].e_up
    }

    /// New region under `reg_above` whose upper edge is `e_new_up`.
    fn add_region_below(
        &mut self,
        reg_above: RegionIdx,
        e_new_up: EdgeIdx,
    ) -> TessResult<RegionIdx> {
        let reg = self.regions.alloc(ActiveRegion::new(e_new_up))?;
        let hint = self.regions[reg_above].node_up;
        let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
        let node = self.dict.insert_before(hint, reg, |a, b| {
            edge_leq(mesh, event, regions[a].e_up, regions[b].e_up)
        })?;
        self.regions[reg].node_up = node;
        self.mesh.edges[e_new_up].region = reg;
        Ok(reg)
    }

    fn delete_region(&mut self, reg: RegionIdx) {
        let ActiveRegion { e_up, node_up, .. } = self.regions[reg];
        self.mesh.edges[e_up].region = INVALID;
        self.dict.delete(node_up);
        self.regions.free(reg);
    }

    /// Replace a temporary upper edge with a real one.
    fn fix_upper_edge(&mut self, reg: RegionIdx, new_edge: EdgeIdx) -> TessResult<()> {
        debug_assert!(self.regions[reg].fix_upper_edge);
        let old = self.e_up(reg);
        self.mesh.delete_edge(old)?;
        let r = &mut self.regions[reg];
        r.fix_upper_edge = false;
        r.e_up = new_edge;
        self.mesh.edges[new_edge].region = reg;
        Ok(())
    }

    fn compute_winding(&mut self, reg: RegionIdx) -> TessResult<()> {
        let above = self.region_above(reg)?;
        let winding =
            self.regions[above].winding_number + self.mesh.edges[self.e_up(reg)].winding;
        let r = &mut self.regions[reg];
        r.winding_number = winding;
        r.inside = self.rule.contains(winding);
        Ok(())
    }

    /// The region is about to leave the dictionary: record its winding on the
    /// face to its left.
    fn finish_region(&mut self, reg: RegionIdx) {
        let ActiveRegion { e_up, winding_number, inside, .. } = self.regions[reg];
        let f = self.mesh.lface(e_up);
        let face = &mut self.mesh.faces[f];
        face.inside = inside;
        face.winding = winding_number;
        face.an_edge = e_up;
        self.delete_region(reg);
    }

    /// Topmost region whose upper edge shares `reg`'s origin. A temporary
    /// upper edge there is replaced by a proper connection first.
    fn top_left_region(&mut self, reg: RegionIdx) -> TessResult<RegionIdx> {
        let org = self.mesh.org(self.e_up(reg));
        let mut reg = reg;
        loop {
            reg = self.region_above(reg)?;
            if self.mesh.org(self.e_up(reg)) != org {
                break;
            }
        }

        if self.regions[reg].fix_upper_edge {
            let below = self.region_below(reg)?;
            let (a, b) = (sym(self.e_up(below)), self.mesh.lnext(self.e_up(reg)));
            let e = self.mesh.connect(a, b)?;
            self.fix_upper_edge(reg, e)?;
            reg = self.region_above(reg)?;
        }
        Ok(reg)
    }

    fn top_right_region(&self, reg: RegionIdx) -> TessResult<RegionIdx> {
        let dst = self.mesh.dst(self.e_up(reg));
        let mut reg = reg;
        loop {
            reg = self.region_above(reg)?;
            if self.mesh.dst(self.e_up(reg)) != dst {
                return Ok(reg);
            }
        }
    }

    // ───────────────────────── left and right edges ─────────────────────────

    /// Close every region from `reg_first` down to (not including) `reg_last`,
    /// or until a region with a different origin is reached. The edges are
    /// relinked around the event so they are in dictionary order. Returns the
    /// lowest left-going edge.
    fn finish_left_regions(
        &mut self,
        reg_first: RegionIdx,
        reg_last: Option<RegionIdx>,
    ) -> TessResult<EdgeIdx> {
        let mut reg_prev = reg_first;
        let mut e_prev = self.e_up(reg_first);
        while Some(reg_prev) != reg_last {
            self.regions[reg_prev].fix_upper_edge = false;
            let reg = self.region_below(reg_prev)?;
            let mut e = self.e_up(reg);
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self.regions[reg].fix_upper_edge {
                    // Reached a region with a different origin.
                    self.finish_region(reg_prev);
                    break;
                }
                // Temporary edge below: replace it with a connection to e_prev.
                let a = self.mesh.lprev(e_prev);
                e = self.mesh.connect(a, sym(e))?;
                self.fix_upper_edge(reg, e)?;
            }

            if self.mesh.onext(e_prev) != e {
                let e_oprev = self.mesh.oprev(e);
                self.mesh.splice(e_oprev, e)?;
                self.mesh.splice(e_prev, e)?;
            }
            self.finish_region(reg_prev);
            e_prev = self.e_up(reg);
            reg_prev = reg;
        }
        Ok(e_prev)
    }

    /// Add regions below `reg_up` for the right-going edges `e_first` up to
    /// (not including) `e_last`, fix the edge order around the event, compute
    /// the new windings and check for splices with the edges below.
    fn add_right_edges(
        &mut self,
        reg_up: RegionIdx,
        e_first: EdgeIdx,
        e_last: EdgeIdx,
        e_top_left: Option<EdgeIdx>,
        clean_up: bool,
    ) -> TessResult<()> {
        let mut e = e_first;
        loop {
            if !self.mesh.org_pos(e).leq(self.mesh.dst_pos(e)) {
                return Err(TessError::InconsistentSweep("right-going edge points left"));
            }
            self.add_region_below(reg_up, sym(e))?;
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        let e_top_left = match e_top_left {
            Some(e) => e,
            None => {
                let below = self.region_below(reg_up)?;
                self.mesh.rprev(self.e_up(below))
            }
        };

        let mut reg_prev = reg_up;
        let mut e_prev = e_top_left;
        let mut first_time = true;
        loop {
            let reg = self.region_below(reg_prev)?;
            let e = sym(self.e_up(reg));
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break;
            }

            if self.mesh.onext(e) != e_prev {
                // Unlink e and relink it just after e_prev.
                let e_oprev = self.mesh.oprev(e);
                self.mesh.splice(e_oprev, e)?;
                let prev_oprev = self.mesh.oprev(e_prev);
                self.mesh.splice(prev_oprev, e)?;
            }

            let winding = self.regions[reg_prev].winding_number - self.mesh.edges[e].winding;
            let r = &mut self.regions[reg];
            r.winding_number = winding;
            r.inside = self.rule.contains(winding);

            // Check for two outgoing edges with the same slope.
            self.regions[reg_prev].dirty = true;
            if !first_time && self.check_for_right_splice(reg_prev)? {
                self.mesh.add_winding(e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete_edge(e_prev)?;
            }
            first_time = false;
            reg_prev = reg;
            e_prev = e;
        }
        self.regions[reg_prev].dirty = true;

        if clean_up {
            self.walk_dirty_regions(reg_prev)?;
        }
        Ok(())
    }

    /// The event has no right-going edges. Connect it to the mesh with a
    /// temporary edge so the face to its right stays connected.
    fn connect_right_vertex(
        &mut self,
        reg_up: RegionIdx,
        e_bottom_left: EdgeIdx,
    ) -> TessResult<()> {
        let mut reg_up = reg_up;
        let mut e_bottom_left = e_bottom_left;
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.region_below(reg_up)?;
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
            self.check_for_intersect(reg_up)?;
        }

        // The intersection check may have split an edge at the event itself.
        let ev = self.mesh.pos(self.event);
        if self.mesh.org_pos(e_up) == ev {
            let a = self.mesh.oprev(e_top_left);
            self.mesh.splice(a, e_up)?;
            reg_up = self.top_left_region(reg_up)?;
            let below = self.region_below(reg_up)?;
            e_top_left = self.e_up(below);
            self.finish_left_regions(below, Some(reg_lo))?;
            degenerate = true;
        }
        if self.mesh.org_pos(e_lo) == ev {
            let b = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, b)?;
            e_bottom_left = self.finish_left_regions(reg_lo, None)?;
            degenerate = true;
        }
        if degenerate {
            let first = self.mesh.onext(e_bottom_left);
            return self.add_right_edges(reg_up, first, e_top_left, Some(e_top_left), true);
        }

        // Connect to the closer of the two right endpoints. Cleanup is
        // deferred until the new edge is marked temporary.
        let target = if self.mesh.org_pos(e_lo).leq(self.mesh.org_pos(e_up)) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let a = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect(a, target)?;
        let e_new_onext = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, e_new_onext, Some(e_new_onext), false)?;
        let reg = self.region_of(sym(e_new))?;
        self.regions[reg].fix_upper_edge = true;
        self.walk_dirty_regions(reg_up)
    }

    /// The event lies on the active edge `reg_up.e_up`, or on one of its
    /// endpoints.
    fn connect_left_degenerate(&mut self, reg_up: RegionIdx, v_event: VertIdx) -> TessResult<()> {
        let e = self.e_up(reg_up);
        let ev = self.mesh.pos(v_event);

        if self.mesh.org_pos(e) == ev {
            // Same position as an unprocessed vertex: merge and let that
            // vertex's event handle the rest.
            let an = self.mesh.verts[v_event].an_edge;
            self.mesh.splice(e, an)?;
            return Ok(());
        }

        if self.mesh.dst_pos(e) != ev {
            // The event is in the interior of e: split e there.
            self.mesh.split_edge(sym(e))?;
            if self.regions[reg_up].fix_upper_edge {
                // The part of the temporary edge right of the event is unused.
                let unused = self.mesh.onext(e);
                self.mesh.delete_edge(unused)?;
                self.regions[reg_up].fix_upper_edge = false;
            }
            let an = self.mesh.verts[v_event].an_edge;
            self.mesh.splice(an, e)?;
            return self.sweep_event(v_event);
        }

        // The event coincides with e.dst, which was processed already. Splice
        // in the extra right-going edges.
        let reg_up = self.top_right_region(reg_up)?;
        let reg = self.region_below(reg_up)?;
        let mut e_top_right = sym(self.e_up(reg));
        let e_last = self.mesh.onext(e_top_right);
        let mut e_top_left = Some(e_last);
        if self.regions[reg].fix_upper_edge {
            // The temporary edge there is no longer needed.
            self.delete_region(reg);
            self.mesh.delete_edge(e_top_right)?;
            e_top_right = self.mesh.oprev(e_last);
        }
        let an = self.mesh.verts[v_event].an_edge;
        self.mesh.splice(an, e_top_right)?;
        if !self.mesh.edge_goes_left(e_last) {
            e_top_left = None;
        }
        let first = self.mesh.onext(e_top_right);
        self.add_right_edges(reg_up, first, e_last, e_top_left, true)
    }

    /// The event has no left-going edges. Find the region containing it and
    /// connect it to the mesh if that region is interior.
    fn connect_left_vertex(&mut self, v_event: VertIdx) -> TessResult<()> {
        let an = self.mesh.verts[v_event].an_edge;
        let probe = sym(an);
        let node = {
            let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
            self.dict
                .search(|key| edge_leq(mesh, event, probe, regions[key].e_up))
        };
        let reg_up = self.dict.key(node);
        if reg_up == INVALID {
            return Err(TessError::InconsistentSweep("vertex lies above every active edge"));
        }
        let reg_lo = self.dict.key(self.dict.pred(node));
        if reg_lo == INVALID {
            // Nothing below: the vertex cannot be connected.
            return Ok(());
        }
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);

        if edge_sign(self.mesh.dst_pos(e_up), self.mesh.pos(v_event), self.mesh.org_pos(e_up))
            == 0.0
        {
            return self.connect_left_degenerate(reg_up, v_event);
        }

        // Connect to whichever edge reaches farther left.
        let reg = if self.mesh.dst_pos(e_lo).leq(self.mesh.dst_pos(e_up)) {
            reg_up
        } else {
            reg_lo
        };

        if self.regions[reg_up].inside || self.regions[reg].fix_upper_edge {
            let e_new = if reg == reg_up {
                let b = self.mesh.lnext(e_up);
                self.mesh.connect(probe, b)?
            } else {
                let a = self.mesh.dnext(e_lo);
                sym(self.mesh.connect(a, an)?)
            };
            if self.regions[reg].fix_upper_edge {
                self.fix_upper_edge(reg, e_new)?;
            } else {
                let r = self.add_region_below(reg_up, e_new)?;
                self.compute_winding(r)?;
            }
            self.sweep_event(v_event)
        } else {
            // Exterior region: only the right-going edges need adding.
            self.add_right_edges(reg_up, an, an, None, true)
        }
    }

    /// Handle one vertex taken from the queue.
    fn sweep_event(&mut self, v_event: VertIdx) -> TessResult<()> {
        self.event = v_event;
        trace!(s = self.mesh.pos(v_event).s, t = self.mesh.pos(v_event).t, "sweep event");

        // Look for an edge that is already in the dictionary.
        let an = self.mesh.verts[v_event].an_edge;
        let mut e = an;
        while self.mesh.edges[e].region == INVALID {
            e = self.mesh.onext(e);
            if e == an {
                return self.connect_left_vertex(v_event);
            }
        }

        // Close the regions of the left-going edges.
        let reg_up = self.top_left_region(self.mesh.edges[e].region)?;
        let reg = self.region_below(reg_up)?;
        let e_top_left = self.e_up(reg);
        let e_bottom_left = self.finish_left_regions(reg, None)?;

        if self.mesh.onext(e_bottom_left) == e_top_left {
            self.connect_right_vertex(reg_up, e_bottom_left)
        } else {
            let first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, first, e_top_left, Some(e_top_left), true)
        }
    }

    // ─────────────────────────── setup and teardown ───────────────────────────

    /// Drop zero-length edges and contours of fewer than three edges.
    fn remove_degenerate_edges(&mut self) -> TessResult<()> {
        let mesh = &mut *self.mesh;
        let mut e = mesh.edges[E_HEAD].next;
        while e != E_HEAD {
            let mut e_next = mesh.edges[e].next;
            let mut e_lnext = mesh.lnext(e);

            if mesh.org_pos(e) == mesh.dst_pos(e) && mesh.lnext(e_lnext) != e {
                // Zero-length edge in a contour of three or more edges.
                mesh.splice(e_lnext, e)?;
                mesh.delete_edge(e)?;
                e = e_lnext;
                e_lnext = mesh.lnext(e);
            }
            if mesh.lnext(e_lnext) == e {
                // Contour of one or two edges.
                if e_lnext != e {
                    if e_lnext == e_next || e_lnext == sym(e_next) {
                        e_next = mesh.edges[e_next].next;
                    }
                    mesh.delete_edge(e_lnext)?;
                }
                if e == e_next || e == sym(e_next) {
                    e_next = mesh.edges[e_next].next;
                }
                mesh.delete_edge(e)?;
            }
            e = e_next;
        }
        Ok(())
    }

    fn init_queue(&mut self, config: &AllocConfig) -> TessResult<()> {
        let count = self.mesh.vertex_ids().count();
        self.queue.reserve(count + config.queue_slack())?;
        let mut v = self.mesh.verts[V_HEAD].next;
        while v != V_HEAD {
            let handle = self.queue.insert(v, self.mesh.pos(v))?;
            self.mesh.verts[v].pq_handle = handle;
            v = self.mesh.verts[v].next;
        }
        self.queue.build();
        Ok(())
    }

    /// Two horizontal edges well outside the input bound the sweep from
    /// below and above, so every region has a neighbour on both sides.
    fn init_edge_dict(&mut self, (min, max): (Pos, Pos)) -> TessResult<()> {
        let w = (max.s - min.s) + 0.01;
        let h = (max.t - min.t) + 0.01;
        let (smin, smax) = (min.s - w, max.s + w);
        let (tmin, tmax) = (min.t - h, max.t + h);
        self.add_sentinel(smin, smax, tmin)?;
        self.add_sentinel(smin, smax, tmax)
    }

    fn add_sentinel(&mut self, smin: Real, smax: Real, t: Real) -> TessResult<()> {
        let e = self.mesh.make_edge()?;
        let (org, dst) = (self.mesh.org(e), self.mesh.dst(e));
        self.mesh.verts[org].pos = Pos::new(smax, t);
        self.mesh.verts[dst].pos = Pos::new(smin, t);
        self.event = dst;

        let reg = self.regions.alloc(ActiveRegion {
            sentinel: true,
            ..ActiveRegion::new(e)
        })?;
        let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
        let node = self
            .dict
            .insert(reg, |a, b| edge_leq(mesh, event, regions[a].e_up, regions[b].e_up))?;
        self.regions[reg].node_up = node;
        Ok(())
    }

    /// Empty the dictionary once the queue is drained. Only the sentinels
    /// and temporary edges may remain.
    fn done_edge_dict(&mut self) -> TessResult<()> {
        loop {
            let reg = self.dict.key(self.dict.min());
            if reg == INVALID {
                return Ok(());
            }
            let r = self.regions[reg];
            if !r.sentinel && !r.fix_upper_edge {
                return Err(TessError::InconsistentSweep("unfinished region after sweep"));
            }
            self.delete_region(reg);
        }
    }

    /// Remove faces bounded by just two edges, folding their winding into the
    /// surviving edge.
    fn remove_degenerate_faces(&mut self) -> TessResult<()> {
        let mesh = &mut *self.mesh;
        let mut f = mesh.faces[F_HEAD].next;
        while f != F_HEAD {
            let f_next = mesh.faces[f].next;
            let e = mesh.faces[f].an_edge;
            if mesh.lnext(mesh.lnext(e)) == e {
                let keep = mesh.onext(e);
                mesh.add_winding(keep, e);
                mesh.delete_edge(e)?;
            }
            f = f_next;
        }
        Ok(())
    }
}
