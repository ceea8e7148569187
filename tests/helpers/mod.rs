// Copyright 2025 Lars Brubaker
// Shared test utilities for polytess integration tests.

#![allow(dead_code)]

use polytess::{ElementType, Tessellator, WindingRule, TESS_UNDEF};

/// Axis-aligned square as a flat CCW contour.
pub fn square(x: f32, y: f32, size: f32) -> Vec<f32> {
    vec![x, y, x + size, y, x + size, y + size, x, y + size]
}

/// Same square, clockwise.
pub fn square_cw(x: f32, y: f32, size: f32) -> Vec<f32> {
    vec![x, y, x, y + size, x + size, y + size, x + size, y]
}

/// Outline of a five-pointed star: simple, concave, clockwise.
pub fn star() -> Vec<f32> {
    vec![
        350.0, 75.0, 379.0, 161.0, 469.0, 161.0, 397.0, 215.0, 423.0, 301.0, 350.0, 250.0, 277.0,
        301.0, 303.0, 215.0, 231.0, 161.0, 321.0, 161.0,
    ]
}

/// Pentagram traced through its points only (every second vertex), so its
/// edges cross each other.
pub fn pentagram() -> Vec<f32> {
    vec![
        350.0, 75.0, 423.0, 301.0, 231.0, 161.0, 469.0, 161.0, 277.0, 301.0,
    ]
}

/// Signed area of a triangle given 3 vertices (2D).
pub fn triangle_area(x0: f32, y0: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    0.5 * ((x1 - x0) * (y2 - y0) - (x2 - x0) * (y1 - y0))
}

fn triangle_areas(tess: &Tessellator) -> impl Iterator<Item = f32> + '_ {
    let verts = tess.vertices();
    tess.elements().chunks(3).filter(|tri| tri.len() == 3).map(move |tri| {
        let p = |i: u32| (verts[i as usize * 2], verts[i as usize * 2 + 1]);
        let ((x0, y0), (x1, y1), (x2, y2)) = (p(tri[0]), p(tri[1]), p(tri[2]));
        triangle_area(x0, y0, x1, y1, x2, y2)
    })
}

/// Total absolute area of the output triangles.
/// Assumes element type Polygons with poly_size 3 and vertex_size 2.
pub fn total_tessellation_area(tess: &Tessellator) -> f32 {
    triangle_areas(tess).map(f32::abs).sum()
}

/// Total signed area of the output triangles.
pub fn total_tessellation_signed_area(tess: &Tessellator) -> f32 {
    triangle_areas(tess).sum()
}

/// Area of arbitrary polygons (any poly_size, vertex_size 2), skipping
/// `TESS_UNDEF` padding.
pub fn total_polygon_area(tess: &Tessellator, poly_size: usize) -> f32 {
    let verts = tess.vertices();
    let mut total = 0.0;
    for poly in tess.elements().chunks(poly_size) {
        let mut flat = Vec::new();
        for &i in poly.iter().take_while(|&&i| i != TESS_UNDEF) {
            flat.push(verts[i as usize * 2]);
            flat.push(verts[i as usize * 2 + 1]);
        }
        total += polygon_signed_area(&flat).abs();
    }
    total
}

/// Verify that all tessellation output is valid: indices in range, vertices finite.
pub fn verify_valid_output(tess: &Tessellator) {
    let vert_count = tess.vertex_count();

    for (i, &v) in tess.vertices().iter().enumerate() {
        assert!(v.is_finite(), "vertex component [{}] = {} is not finite", i, v);
    }

    for (i, &idx) in tess.elements().iter().enumerate() {
        if idx == TESS_UNDEF {
            continue;
        }
        assert!(
            (idx as usize) < vert_count,
            "element[{}] = {} out of range (vertex_count={})",
            i,
            idx,
            vert_count
        );
    }
}

/// Verify no degenerate (zero-area) triangles in output.
pub fn verify_no_degenerate_triangles(tess: &Tessellator, epsilon: f32) {
    for (i, area) in triangle_areas(tess).enumerate() {
        assert!(area.abs() > epsilon, "triangle {} is degenerate (area={})", i, area);
    }
}

/// Tessellate contours with the given winding rule as triangles (poly_size 3, 2D).
pub fn tessellate_contours(contours: &[Vec<f32>], winding_rule: WindingRule) -> Tessellator {
    let mut tess = Tessellator::new();
    for contour in contours {
        tess.add_contour(2, contour);
    }
    let ok = tess.tessellate(winding_rule, ElementType::Polygons, 3, 2, None);
    assert!(ok, "tessellation failed for winding rule {:?}: {:?}", winding_rule, tess.error());
    tess
}

/// Signed area of a simple polygon given as flat [x0,y0,x1,y1,...].
pub fn polygon_signed_area(verts: &[f32]) -> f32 {
    let n = verts.len() / 2;
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0f32;
    for i in 0..n {
        let j = (i + 1) % n;
        area += verts[i * 2] * verts[j * 2 + 1];
        area -= verts[j * 2] * verts[i * 2 + 1];
    }
    area * 0.5
}
