// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Projection of submitted 3-D coordinates onto the sweep plane.
//
// The plane is the coordinate plane perpendicular to the normal's longest
// axis. Without a caller normal one is estimated from the vertex extents,
// and the t axis is flipped if needed so the contours enclose positive area.

use crate::geom::{Pos, Real};
use crate::mesh::{Mesh, VertIdx};

type Vec3 = [f64; 3];

fn long_axis(v: &[Real; 3]) -> usize {
    let mut i = 0;
    if v[1].abs() > v[0].abs() {
        i = 1;
    }
    if v[2].abs() > v[i].abs() {
        i = 2;
    }
    i
}

fn short_axis(v: &Vec3) -> usize {
    let mut i = 0;
    if v[1].abs() < v[0].abs() {
        i = 1;
    }
    if v[2].abs() < v[i].abs() {
        i = 2;
    }
    i
}

fn coords64(mesh: &Mesh, v: VertIdx) -> Vec3 {
    mesh.verts[v].coords.map(f64::from)
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Estimate a plane normal: take the two vertices farthest apart along the
/// widest axis, then the vertex giving the largest triangle with them.
pub(crate) fn compute_normal(mesh: &Mesh) -> [Real; 3] {
    let mut verts = mesh.vertex_ids();
    let Some(first) = verts.next() else {
        return [0.0, 0.0, 1.0];
    };
    let c = coords64(mesh, first);
    let (mut min_val, mut max_val) = (c, c);
    let (mut min_vert, mut max_vert) = ([first; 3], [first; 3]);
    for v in verts {
        let c = coords64(mesh, v);
        for i in 0..3 {
            if c[i] < min_val[i] {
                min_val[i] = c[i];
                min_vert[i] = v;
            }
            if c[i] > max_val[i] {
                max_val[i] = c[i];
                max_vert[i] = v;
            }
        }
    }

    let mut i = 0;
    if max_val[1] - min_val[1] > max_val[0] - min_val[0] {
        i = 1;
    }
    if max_val[2] - min_val[2] > max_val[i] - min_val[i] {
        i = 2;
    }
    if min_val[i] >= max_val[i] {
        // All vertices coincide.
        return [0.0, 0.0, 1.0];
    }

    let v2 = coords64(mesh, max_vert[i]);
    let d1 = sub(coords64(mesh, min_vert[i]), v2);
    let mut best = [0.0; 3];
    let mut best_len2 = 0.0;
    for v in mesh.vertex_ids() {
        let n = cross(d1, sub(coords64(mesh, v), v2));
        let len2 = n[0] * n[0] + n[1] * n[1] + n[2] * n[2];
        if len2 > best_len2 {
            best_len2 = len2;
            best = n;
        }
    }

    if best_len2 <= 0.0 {
        // All points lie on one line; any normal perpendicular to it will do.
        let mut norm = [0.0; 3];
        norm[short_axis(&d1)] = 1.0;
        return norm;
    }
    best.map(|x| x as Real)
}

/// Flip t if the contours wind clockwise in the projected plane.
fn check_orientation(mesh: &mut Mesh) {
    let mut area = 0.0f64;
    for f in mesh.face_ids() {
        let an = mesh.faces[f].an_edge;
        if mesh.edges[an].winding <= 0 {
            continue;
        }
        for e in mesh.face_loop(an) {
            let (o, d) = (mesh.org_pos(e), mesh.dst_pos(e));
            area += (f64::from(o.s) - f64::from(d.s)) * (f64::from(o.t) + f64::from(d.t));
        }
    }
    if area < 0.0 {
        let ids: Vec<VertIdx> = mesh.vertex_ids().collect();
        for v in ids {
            mesh.verts[v].pos.t = -mesh.verts[v].pos.t;
        }
    }
}

/// Assign every vertex its sweep-plane position.
pub(crate) fn project(mesh: &mut Mesh, normal: Option<[Real; 3]>) {
    let given = normal.filter(|n| n.iter().any(|&c| c != 0.0));
    let norm = given.unwrap_or_else(|| compute_normal(mesh));

    let i = long_axis(&norm);
    let s_axis = (i + 1) % 3;
    let t_axis = (i + 2) % 3;
    let t_sign: Real = if norm[i] > 0.0 { 1.0 } else { -1.0 };

    let ids: Vec<VertIdx> = mesh.vertex_ids().collect();
    for v in ids {
        let c = mesh.verts[v].coords;
        mesh.verts[v].pos = Pos::new(c[s_axis], t_sign * c[t_axis]);
    }
    if given.is_none() {
        check_orientation(mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tests::new_mesh;
    use crate::mesh::sym;

    /// Closed contour from 3-D points, the way contours are submitted.
    fn contour3(mesh: &mut Mesh, pts: &[[Real; 3]]) {
        let mut e = crate::mesh::INVALID;
        for p in pts {
            if e == crate::mesh::INVALID {
                e = mesh.make_edge().unwrap();
                mesh.splice(e, sym(e)).unwrap();
            } else {
                mesh.split_edge(e).unwrap();
                e = mesh.lnext(e);
            }
            let v = mesh.org(e);
            mesh.verts[v].coords = *p;
            mesh.edges[e].winding = 1;
            mesh.edges[sym(e)].winding = -1;
        }
    }

    #[test]
    fn long_axis_picks_largest_magnitude() {
        assert_eq!(long_axis(&[0.0, 0.0, 1.0]), 2);
        assert_eq!(long_axis(&[-5.0, 1.0, 1.0]), 0);
        assert_eq!(long_axis(&[0.1, -0.7, 0.5]), 1);
    }

    #[test]
    fn normal_of_xy_square_is_along_z() {
        let mut mesh = new_mesh();
        contour3(
            &mut mesh,
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        );
        let n = compute_normal(&mesh);
        assert_eq!(n[0], 0.0);
        assert_eq!(n[1], 0.0);
        assert_ne!(n[2], 0.0);
    }

    #[test]
    fn clockwise_input_is_flipped_to_positive_area() {
        let mut mesh = new_mesh();
        contour3(
            &mut mesh,
            &[[0.0, 0.0, 0.0], [0.0, 2.0, 0.0], [2.0, 2.0, 0.0], [2.0, 0.0, 0.0]],
        );
        project(&mut mesh, None);
        let mut area = 0.0;
        let e = mesh.verts[mesh.vertex_ids().next().unwrap()].an_edge;
        let e = if mesh.edges[e].winding > 0 { e } else { sym(e) };
        for e in mesh.face_loop(e) {
            let (a, b) = (mesh.org_pos(e), mesh.dst_pos(e));
            area += a.s * b.t - b.s * a.t;
        }
        assert!(area > 0.0, "area {area}");
    }

    #[test]
    fn caller_normal_selects_the_plane() {
        let mut mesh = new_mesh();
        contour3(
            &mut mesh,
            &[[0.0, 3.0, 1.0], [0.0, 4.0, 1.0], [0.0, 4.0, 2.0]],
        );
        project(&mut mesh, Some([1.0, 0.0, 0.0]));
        // Normal along x: s is y and t is z.
        for v in mesh.vertex_ids() {
            let [_, y, z] = mesh.verts[v].coords;
            assert_eq!(mesh.verts[v].pos, Pos::new(y, z));
        }
        let mut projected: Vec<(Real, Real)> = mesh
            .vertex_ids()
            .map(|v| (mesh.verts[v].pos.s, mesh.verts[v].pos.t))
            .collect();
        projected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(projected, vec![(3.0, 1.0), (4.0, 1.0), (4.0, 2.0)]);
    }
}
