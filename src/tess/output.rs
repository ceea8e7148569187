// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Extraction of output buffers from the finished mesh.

use super::{ElementType, TESS_UNDEF};
use crate::geom::Real;
use crate::mesh::{FaceIdx, Mesh, VertIdx};

/// Flat output buffers of one tessellation.
#[derive(Clone, Debug, Default)]
pub(crate) struct Output {
    pub vertices: Vec<Real>,
    pub vertex_indices: Vec<u32>,
    pub elements: Vec<u32>,
    pub vertex_count: usize,
    pub element_count: usize,
}

/// Number every vertex used by an interior face and every interior face, in
/// mesh order. Returns the vertex and face counts.
fn number_interior(mesh: &mut Mesh) -> (u32, u32) {
    let verts: Vec<VertIdx> = mesh.vertex_ids().collect();
    for v in verts {
        mesh.verts[v].n = TESS_UNDEF;
    }

    let mut vert_count = 0u32;
    let mut face_count = 0u32;
    let faces: Vec<FaceIdx> = mesh.face_ids().collect();
    for f in faces {
        mesh.faces[f].n = TESS_UNDEF;
        if !mesh.faces[f].inside {
            continue;
        }
        let loop_edges: Vec<_> = mesh.face_loop(mesh.faces[f].an_edge).collect();
        for e in loop_edges {
            let org = mesh.org(e);
            if mesh.verts[org].n == TESS_UNDEF {
                mesh.verts[org].n = vert_count;
                vert_count += 1;
            }
        }
        mesh.faces[f].n = face_count;
        face_count += 1;
    }
    (vert_count, face_count)
}

fn push_coords(out: &mut Vec<Real>, coords: &[Real; 3], vertex_size: usize) {
    out.extend_from_slice(&coords[..vertex_size]);
}

/// Polygons of at most `poly_size` vertices, padded with `TESS_UNDEF`. For
/// connected polygons each element is followed by the index of the polygon
/// across each of its edges.
pub(crate) fn polymesh(
    mesh: &mut Mesh,
    element_type: ElementType,
    poly_size: usize,
    vertex_size: usize,
) -> Output {
    let (vert_count, face_count) = number_interior(mesh);

    let mut out = Output {
        vertex_count: vert_count as usize,
        element_count: face_count as usize,
        ..Output::default()
    };
    out.vertices = vec![0.0; out.vertex_count * vertex_size];
    out.vertex_indices = vec![TESS_UNDEF; out.vertex_count];
    for v in mesh.vertex_ids() {
        let vert = &mesh.verts[v];
        if vert.n != TESS_UNDEF {
            let base = vert.n as usize * vertex_size;
            out.vertices[base..base + vertex_size].copy_from_slice(&vert.coords[..vertex_size]);
            out.vertex_indices[vert.n as usize] = vert.idx;
        }
    }

    let connected = element_type == ElementType::ConnectedPolygons;
    let stride = if connected { 2 * poly_size } else { poly_size };
    out.elements.reserve(out.element_count * stride);
    for f in mesh.face_ids() {
        if !mesh.faces[f].inside {
            continue;
        }
        let start = out.elements.len();
        let an = mesh.faces[f].an_edge;
        out.elements.extend(mesh.face_loop(an).map(|e| mesh.verts[mesh.org(e)].n));
        out.elements.resize(start + poly_size, TESS_UNDEF);

        if connected {
            out.elements.extend(mesh.face_loop(an).map(|e| {
                let rf = mesh.rface(e);
                if mesh.faces[rf].inside {
                    mesh.faces[rf].n
                } else {
                    TESS_UNDEF
                }
            }));
            out.elements.resize(start + stride, TESS_UNDEF);
        }
    }
    out
}

/// One `(first vertex, vertex count)` pair per interior face loop; vertices
/// are emitted per contour in loop order.
pub(crate) fn contours(mesh: &Mesh, vertex_size: usize) -> Output {
    let mut out = Output::default();
    for f in mesh.face_ids() {
        if !mesh.faces[f].inside {
            continue;
        }
        let start = out.vertex_count;
        for e in mesh.face_loop(mesh.faces[f].an_edge) {
            let vert = &mesh.verts[mesh.org(e)];
            push_coords(&mut out.vertices, &vert.coords, vertex_size);
            out.vertex_indices.push(vert.idx);
            out.vertex_count += 1;
        }
        out.elements.push(start as u32);
        out.elements.push((out.vertex_count - start) as u32);
        out.element_count += 1;
    }
    out
}
