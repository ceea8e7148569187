// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Half-edge mesh (Guibas/Stolfi style) stored in bucketed arenas.
//
// Layout:
//   - Handles are u32 indices; INVALID (u32::MAX) plays the role of null.
//   - Half-edges come in pairs stored together: sym(e) = e ^ 1. The even
//     half is linked into the global edge list; the odd half's `next` holds
//     the mirror of the previous pair's even half.
//   - Sentinel heads: vertex 0, face 0 and edge pair 0 anchor the global
//     circular lists and are never handed out.
//   - Freed records return to their pool and may be reused by later edits.

mod check;
mod delaunay;

use std::ops::{Index, IndexMut};

use crate::alloc::{AllocConfig, AllocError, Pool, SharedAllocator};
use crate::geom::{Pos, Real};

pub const INVALID: u32 = u32::MAX;

pub type VertIdx = u32;
pub type FaceIdx = u32;
pub type EdgeIdx = u32;

pub const V_HEAD: VertIdx = 0;
pub const F_HEAD: FaceIdx = 0;
pub const E_HEAD: EdgeIdx = 0;

/// The other half of `e`'s pair.
#[inline(always)]
pub fn sym(e: EdgeIdx) -> EdgeIdx {
    e ^ 1
}

#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub next: VertIdx,
    pub prev: VertIdx,
    /// Any half-edge whose origin is this vertex.
    pub an_edge: EdgeIdx,
    /// Caller coordinates (projected into `pos` before the sweep).
    pub coords: [Real; 3],
    pub pos: Pos,
    /// Event queue handle while the vertex waits to be swept.
    pub pq_handle: u32,
    /// Output index assigned during extraction.
    pub n: u32,
    /// Source index: insertion order among submitted vertices, INVALID for
    /// vertices created at intersections.
    pub idx: u32,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            next: INVALID,
            prev: INVALID,
            an_edge: INVALID,
            coords: [0.0; 3],
            pos: Pos::default(),
            pq_handle: INVALID,
            n: INVALID,
            idx: INVALID,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Face {
    pub next: FaceIdx,
    pub prev: FaceIdx,
    pub an_edge: EdgeIdx,
    pub n: u32,
    /// Winding number of the region this face was carved from.
    pub winding: i32,
    pub inside: bool,
}

impl Default for Face {
    fn default() -> Self {
        Self {
            next: INVALID,
            prev: INVALID,
            an_edge: INVALID,
            n: INVALID,
            winding: 0,
            inside: false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HalfEdge {
    /// Global edge list link (see module notes).
    pub next: EdgeIdx,
    /// Next edge counter-clockwise around the origin.
    pub onext: EdgeIdx,
    /// Next edge counter-clockwise around the left face.
    pub lnext: EdgeIdx,
    pub org: VertIdx,
    pub lface: FaceIdx,
    /// Sweep region whose upper edge this is, INVALID outside the dictionary.
    pub region: u32,
    /// Change in winding number when crossing from the right face to the left.
    pub winding: i32,
    /// Scratch flag for Delaunay refinement.
    pub mark: bool,
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self {
            next: INVALID,
            onext: INVALID,
            lnext: INVALID,
            org: INVALID,
            lface: INVALID,
            region: INVALID,
            winding: 0,
            mark: false,
        }
    }
}

/// Half-edge storage: one pool slot per mirrored pair.
pub(crate) struct HalfEdges {
    pairs: Pool<[HalfEdge; 2]>,
}

impl HalfEdges {
    fn alloc_pair(&mut self) -> Result<EdgeIdx, AllocError> {
        let pair = self.pairs.alloc([HalfEdge::default(); 2])?;
        Ok(pair << 1)
    }

    fn free_pair(&mut self, e: EdgeIdx) {
        self.pairs.free(e >> 1);
    }

    /// Number of live half-edges, sentinel pair included.
    pub fn len(&self) -> usize {
        self.pairs.len() * 2
    }
}

impl Index<EdgeIdx> for HalfEdges {
    type Output = HalfEdge;

    #[inline]
    fn index(&self, e: EdgeIdx) -> &HalfEdge {
        &self.pairs[e >> 1][(e & 1) as usize]
    }
}

impl IndexMut<EdgeIdx> for HalfEdges {
    #[inline]
    fn index_mut(&mut self, e: EdgeIdx) -> &mut HalfEdge {
        &mut self.pairs[e >> 1][(e & 1) as usize]
    }
}

pub(crate) struct Mesh {
    pub(crate) verts: Pool<Vertex>,
    pub(crate) faces: Pool<Face>,
    pub(crate) edges: HalfEdges,
}

impl Mesh {
    pub fn new(alloc: &SharedAllocator, config: &AllocConfig) -> Result<Self, AllocError> {
        let mut mesh = Mesh {
            verts: Pool::new(config.mesh_vertex_bucket_size, alloc.clone()),
            faces: Pool::new(config.mesh_face_bucket_size, alloc.clone()),
            edges: HalfEdges {
                pairs: Pool::new(config.mesh_edge_bucket_size, alloc.clone()),
            },
        };
        let v_head = mesh.verts.alloc(Vertex {
            next: V_HEAD,
            prev: V_HEAD,
            ..Vertex::default()
        })?;
        let f_head = mesh.faces.alloc(Face {
            next: F_HEAD,
            prev: F_HEAD,
            ..Face::default()
        })?;
        let e_head = mesh.edges.alloc_pair()?;
        debug_assert!(v_head == V_HEAD && f_head == F_HEAD && e_head == E_HEAD);
        mesh.edges[E_HEAD].next = E_HEAD;
        mesh.edges[sym(E_HEAD)].next = sym(E_HEAD);
        Ok(mesh)
    }

    // ───────────────────────────── navigation ─────────────────────────────

    #[inline]
    pub fn org(&self, e: EdgeIdx) -> VertIdx {
        self.edges[e].org
    }

    #[inline]
    pub fn dst(&self, e: EdgeIdx) -> VertIdx {
        self.edges[sym(e)].org
    }

    #[inline]
    pub fn lface(&self, e: EdgeIdx) -> FaceIdx {
        self.edges[e].lface
    }

    #[inline]
    pub fn rface(&self, e: EdgeIdx) -> FaceIdx {
        self.edges[sym(e)].lface
    }

    #[inline]
    pub fn onext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e].onext
    }

    #[inline]
    pub fn lnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e].lnext
    }

    #[inline]
    pub fn oprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[sym(e)].lnext
    }

    #[inline]
    pub fn lprev(&self, e: EdgeIdx) -> EdgeIdx {
        sym(self.edges[e].onext)
    }

    #[inline]
    pub fn rprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[sym(e)].onext
    }

    #[inline]
    pub fn dnext(&self, e: EdgeIdx) -> EdgeIdx {
        sym(self.rprev(e))
    }

    #[inline]
    pub fn pos(&self, v: VertIdx) -> Pos {
        self.verts[v].pos
    }

    #[inline]
    pub fn org_pos(&self, e: EdgeIdx) -> Pos {
        self.verts[self.org(e)].pos
    }

    #[inline]
    pub fn dst_pos(&self, e: EdgeIdx) -> Pos {
        self.verts[self.dst(e)].pos
    }

    pub fn edge_goes_left(&self, e: EdgeIdx) -> bool {
        self.dst_pos(e).leq(self.org_pos(e))
    }

    pub fn edge_goes_right(&self, e: EdgeIdx) -> bool {
        self.org_pos(e).leq(self.dst_pos(e))
    }

    /// The face on the right of `e` exists and is interior.
    pub fn edge_is_internal(&self, e: EdgeIdx) -> bool {
        let rf = self.rface(e);
        rf != INVALID && self.faces[rf].inside
    }

    /// Adds the winding of `src` (and its mirror) onto `dst`.
    pub fn add_winding(&mut self, dst: EdgeIdx, src: EdgeIdx) {
        let (w, w_sym) = (self.edges[src].winding, self.edges[sym(src)].winding);
        self.edges[dst].winding += w;
        self.edges[sym(dst)].winding += w_sym;
    }

    /// Live vertices in list order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertIdx> + '_ {
        std::iter::successors(Some(self.verts[V_HEAD].next), move |&v| {
            Some(self.verts[v].next)
        })
        .take_while(|&v| v != V_HEAD)
    }

    /// Live faces in list order.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceIdx> + '_ {
        std::iter::successors(Some(self.faces[F_HEAD].next), move |&f| {
            Some(self.faces[f].next)
        })
        .take_while(|&f| f != F_HEAD)
    }

    /// Even half of every live edge pair, in list order.
    #[cfg(test)]
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeIdx> + '_ {
        std::iter::successors(Some(self.edges[E_HEAD].next), move |&e| {
            Some(self.edges[e].next)
        })
        .take_while(|&e| e != E_HEAD)
    }

    /// Half-edges around the left face of `start`, starting with `start`.
    pub fn face_loop(&self, start: EdgeIdx) -> impl Iterator<Item = EdgeIdx> + '_ {
        let mut e = start;
        let mut done = false;
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            let cur = e;
            e = self.edges[e].lnext;
            done = e == start;
            Some(cur)
        })
    }

    pub fn count_face_verts(&self, f: FaceIdx) -> usize {
        self.face_loop(self.faces[f].an_edge).count()
    }

    // ────────────────────────── record management ──────────────────────────

    fn make_edge_pair(&mut self, e_next: EdgeIdx) -> Result<EdgeIdx, AllocError> {
        let e = self.edges.alloc_pair()?;
        let e_sym = sym(e);
        let e_next = e_next & !1;

        // Insert before e_next; the prev link lives in the mirror's `next`.
        let e_prev = self.edges[sym(e_next)].next;
        self.edges[e_sym].next = e_prev;
        self.edges[sym(e_prev)].next = e;
        self.edges[e].next = e_next;
        self.edges[sym(e_next)].next = e_sym;

        self.edges[e].onext = e;
        self.edges[e].lnext = e_sym;
        self.edges[e_sym].onext = e_sym;
        self.edges[e_sym].lnext = e;
        Ok(e)
    }

    fn new_vertex(&mut self) -> Result<VertIdx, AllocError> {
        self.verts.alloc(Vertex::default())
    }

    fn new_face(&mut self) -> Result<FaceIdx, AllocError> {
        self.faces.alloc(Face::default())
    }

    /// Link `v_new` before `v_next` and make it the origin of `e_orig`'s ring.
    fn make_vertex(&mut self, v_new: VertIdx, e_orig: EdgeIdx, v_next: VertIdx) {
        let v_prev = self.verts[v_next].prev;
        {
            let v = &mut self.verts[v_new];
            v.prev = v_prev;
            v.next = v_next;
            v.an_edge = e_orig;
        }
        self.verts[v_prev].next = v_new;
        self.verts[v_next].prev = v_new;

        let mut e = e_orig;
        loop {
            self.edges[e].org = v_new;
            e = self.edges[e].onext;
            if e == e_orig {
                break;
            }
        }
    }

    /// Link `f_new` before `f_next` and make it the left face of `e_orig`'s loop.
    /// The new face inherits classification from `f_next`, which is the face
    /// being split in the common case.
    fn make_face(&mut self, f_new: FaceIdx, e_orig: EdgeIdx, f_next: FaceIdx) {
        let f_prev = self.faces[f_next].prev;
        let (inside, winding) = (self.faces[f_next].inside, self.faces[f_next].winding);
        {
            let f = &mut self.faces[f_new];
            f.prev = f_prev;
            f.next = f_next;
            f.an_edge = e_orig;
            f.n = INVALID;
            f.inside = inside;
            f.winding = winding;
        }
        self.faces[f_prev].next = f_new;
        self.faces[f_next].prev = f_new;

        let mut e = e_orig;
        loop {
            self.edges[e].lface = f_new;
            e = self.edges[e].lnext;
            if e == e_orig {
                break;
            }
        }
    }

    fn kill_edge(&mut self, e_del: EdgeIdx) {
        let e_del = e_del & !1;
        let e_next = self.edges[e_del].next;
        let e_prev = self.edges[sym(e_del)].next;
        self.edges[sym(e_next)].next = e_prev;
        self.edges[sym(e_prev)].next = e_next;
        self.edges.free_pair(e_del);
    }

    /// Remove `v_del`, re-pointing its edge ring at `new_org` (may be INVALID).
    pub(crate) fn kill_vertex(&mut self, v_del: VertIdx, new_org: VertIdx) {
        let e_start = self.verts[v_del].an_edge;
        let mut e = e_start;
        loop {
            self.edges[e].org = new_org;
            e = self.edges[e].onext;
            if e == e_start {
                break;
            }
        }
        let (v_prev, v_next) = (self.verts[v_del].prev, self.verts[v_del].next);
        self.verts[v_next].prev = v_prev;
        self.verts[v_prev].next = v_next;
        self.verts.free(v_del);
    }

    /// Remove `f_del`, re-pointing its edge loop at `new_lface` (may be INVALID).
    pub(crate) fn kill_face(&mut self, f_del: FaceIdx, new_lface: FaceIdx) {
        let e_start = self.faces[f_del].an_edge;
        let mut e = e_start;
        loop {
            self.edges[e].lface = new_lface;
            e = self.edges[e].lnext;
            if e == e_start {
                break;
            }
        }
        let (f_prev, f_next) = (self.faces[f_del].prev, self.faces[f_del].next);
        self.faces[f_next].prev = f_prev;
        self.faces[f_prev].next = f_next;
        self.faces.free(f_del);
    }

    /// Exchange the origin rings of `a` and `b` (the primitive splice).
    fn splice_rings(&mut self, a: EdgeIdx, b: EdgeIdx) {
        let a_onext = self.edges[a].onext;
        let b_onext = self.edges[b].onext;
        self.edges[sym(a_onext)].lnext = b;
        self.edges[sym(b_onext)].lnext = a;
        self.edges[a].onext = b_onext;
        self.edges[b].onext = a_onext;
    }

    // ───────────────────────────── operations ─────────────────────────────

    /// New edge with two fresh endpoints and one fresh face on both sides.
    pub fn make_edge(&mut self) -> Result<EdgeIdx, AllocError> {
        let v1 = self.new_vertex()?;
        let v2 = self.new_vertex()?;
        let f = self.new_face()?;
        let e = self.make_edge_pair(E_HEAD)?;
        self.make_vertex(v1, e, V_HEAD);
        self.make_vertex(v2, sym(e), V_HEAD);
        self.make_face(f, e, F_HEAD);
        Ok(e)
    }

    /// Join or split the origin rings of `e_org` and `e_dst`.
    ///
    /// Two distinct origins are merged (keeping `e_org`'s); a shared origin is
    /// split in two. Faces are joined or split the same way.
    pub fn splice(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) -> Result<(), AllocError> {
        if e_org == e_dst {
            return Ok(());
        }
        let mut joining_vertices = false;
        let mut joining_loops = false;

        if self.org(e_dst) != self.org(e_org) {
            joining_vertices = true;
            self.kill_vertex(self.org(e_dst), self.org(e_org));
        }
        if self.lface(e_dst) != self.lface(e_org) {
            joining_loops = true;
            self.kill_face(self.lface(e_dst), self.lface(e_org));
        }

        self.splice_rings(e_dst, e_org);

        if !joining_vertices {
            let v = self.new_vertex()?;
            self.make_vertex(v, e_dst, self.org(e_org));
            let org = self.org(e_org);
            self.verts[org].an_edge = e_org;
        }
        if !joining_loops {
            let f = self.new_face()?;
            self.make_face(f, e_dst, self.lface(e_org));
            let lf = self.lface(e_org);
            self.faces[lf].an_edge = e_org;
        }
        Ok(())
    }

    /// Remove `e_del`, joining the faces it separated or splitting off the
    /// loop it held together. Isolated endpoints are removed too.
    pub fn delete_edge(&mut self, e_del: EdgeIdx) -> Result<(), AllocError> {
        let e_del_sym = sym(e_del);
        let mut joining_loops = false;

        if self.lface(e_del) != self.rface(e_del) {
            joining_loops = true;
            self.kill_face(self.lface(e_del), self.rface(e_del));
        }

        if self.onext(e_del) == e_del {
            self.kill_vertex(self.org(e_del), INVALID);
        } else {
            let rf = self.rface(e_del);
            self.faces[rf].an_edge = self.oprev(e_del);
            let org = self.org(e_del);
            self.verts[org].an_edge = self.onext(e_del);

            self.splice_rings(e_del, self.oprev(e_del));
            if !joining_loops {
                let f = self.new_face()?;
                self.make_face(f, e_del, self.lface(e_del));
            }
        }

        // e_del's origin is now detached; do the same for its destination.
        if self.onext(e_del_sym) == e_del_sym {
            self.kill_vertex(self.org(e_del_sym), INVALID);
            self.kill_face(self.lface(e_del_sym), INVALID);
        } else {
            let lf = self.lface(e_del);
            self.faces[lf].an_edge = self.oprev(e_del_sym);
            let org = self.org(e_del_sym);
            self.verts[org].an_edge = self.onext(e_del_sym);
            self.splice_rings(e_del_sym, self.oprev(e_del_sym));
        }

        self.kill_edge(e_del);
        Ok(())
    }

    /// New edge `e_new` with `e_new.org == e_org.dst` and a fresh destination,
    /// placed so that `e_new` follows `e_org` around the left face.
    pub fn add_edge_vertex(&mut self, e_org: EdgeIdx) -> Result<EdgeIdx, AllocError> {
        let e_new = self.make_edge_pair(e_org)?;
        let e_new_sym = sym(e_new);

        self.splice_rings(e_new, self.lnext(e_org));

        self.edges[e_new].org = self.dst(e_org);
        let v = self.new_vertex()?;
        self.make_vertex(v, e_new_sym, self.org(e_new));

        let lf = self.lface(e_org);
        self.edges[e_new].lface = lf;
        self.edges[e_new_sym].lface = lf;
        Ok(e_new)
    }

    /// Split `e_org` at a new vertex: `e_org` keeps its origin and ends at the
    /// new vertex; the returned edge runs from the new vertex to the old
    /// destination. Winding is copied onto the new half.
    pub fn split_edge(&mut self, e_org: EdgeIdx) -> Result<EdgeIdx, AllocError> {
        let temp = self.add_edge_vertex(e_org)?;
        let e_new = sym(temp);

        let e_org_sym = sym(e_org);
        self.splice_rings(e_org_sym, self.oprev(e_org_sym));
        self.splice_rings(e_org_sym, e_new);

        let new_org = self.org(e_new);
        self.edges[e_org_sym].org = new_org;
        let dst = self.dst(e_new);
        self.verts[dst].an_edge = sym(e_new);
        let rf = self.rface(e_org);
        self.edges[sym(e_new)].lface = rf;
        self.edges[e_new].winding = self.edges[e_org].winding;
        self.edges[sym(e_new)].winding = self.edges[e_org_sym].winding;
        Ok(e_new)
    }

    /// New edge from `e_org.dst` to `e_dst.org`. When both lie on one face
    /// loop, the loop is split and the new face lies on the new edge's left.
    pub fn connect(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) -> Result<EdgeIdx, AllocError> {
        let e_new = self.make_edge_pair(e_org)?;
        let e_new_sym = sym(e_new);
        let mut joining_loops = false;

        if self.lface(e_dst) != self.lface(e_org) {
            joining_loops = true;
            self.kill_face(self.lface(e_dst), self.lface(e_org));
        }

        self.splice_rings(e_new, self.lnext(e_org));
        self.splice_rings(e_new_sym, e_dst);

        self.edges[e_new].org = self.dst(e_org);
        self.edges[e_new_sym].org = self.org(e_dst);
        let lf = self.lface(e_org);
        self.edges[e_new].lface = lf;
        self.edges[e_new_sym].lface = lf;
        self.faces[lf].an_edge = e_new_sym;

        if !joining_loops {
            let f = self.new_face()?;
            self.make_face(f, e_new, lf);
        }
        Ok(e_new)
    }

    /// Destroy face `f_zap`; edges left with no face on either side go too,
    /// along with any vertex they leave isolated.
    pub fn zap_face(&mut self, f_zap: FaceIdx) {
        let e_start = self.faces[f_zap].an_edge;
        let mut e_next = self.lnext(e_start);
        loop {
            let e = e_next;
            e_next = self.lnext(e);

            self.edges[e].lface = INVALID;
            if self.rface(e) == INVALID {
                if self.onext(e) == e {
                    self.kill_vertex(self.org(e), INVALID);
                } else {
                    let org = self.org(e);
                    self.verts[org].an_edge = self.onext(e);
                    self.splice_rings(e, self.oprev(e));
                }
                let e_sym = sym(e);
                if self.onext(e_sym) == e_sym {
                    self.kill_vertex(self.org(e_sym), INVALID);
                } else {
                    let org = self.org(e_sym);
                    self.verts[org].an_edge = self.onext(e_sym);
                    self.splice_rings(e_sym, self.oprev(e_sym));
                }
                self.kill_edge(e);
            }
            if e == e_start {
                break;
            }
        }

        let (f_prev, f_next) = (self.faces[f_zap].prev, self.faces[f_zap].next);
        self.faces[f_next].prev = f_prev;
        self.faces[f_prev].next = f_next;
        self.faces.free(f_zap);
    }

    /// Zap every face not marked inside.
    pub fn discard_exterior(&mut self) {
        let mut f = self.faces[F_HEAD].next;
        while f != F_HEAD {
            let f_next = self.faces[f].next;
            if !self.faces[f].inside {
                self.zap_face(f);
            }
            f = f_next;
        }
    }
}
