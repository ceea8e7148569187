// Copyright 2025 Lars Brubaker
// Tests for poly_size > 3 (quad output, hex output, etc.).

mod helpers;

use std::f32::consts::PI;

use approx::assert_relative_eq;
use polytess::{ElementType, Tessellator, WindingRule, TESS_UNDEF};

fn tessellate_with_poly_size(vertices: &[f32], poly_size: usize) -> Tessellator {
    let mut tess = Tessellator::new();
    tess.add_contour(2, vertices);
    let ok = tess.tessellate(WindingRule::Positive, ElementType::Polygons, poly_size, 2, None);
    assert!(ok, "tessellation failed with poly_size={}", poly_size);
    tess
}

fn regular_polygon(n: usize, radius: f32) -> Vec<f32> {
    (0..n)
        .flat_map(|i| {
            let angle = 2.0 * PI * i as f32 / n as f32 - PI / 2.0;
            [radius * angle.cos(), radius * angle.sin()]
        })
        .collect()
}

/// Every polygon of the result is convex. The star is wound clockwise, so
/// only consistency of the turn direction is checked.
fn assert_convex_polygons(tess: &Tessellator, poly_size: usize) {
    let verts = tess.vertices();
    for (n, poly) in tess.elements().chunks(poly_size).enumerate() {
        let pts: Vec<(f32, f32)> = poly
            .iter()
            .take_while(|&&i| i != TESS_UNDEF)
            .map(|&i| (verts[i as usize * 2], verts[i as usize * 2 + 1]))
            .collect();
        assert!(pts.len() >= 3, "polygon {} has {} vertices", n, pts.len());
        let turns: Vec<f32> = (0..pts.len())
            .map(|k| {
                let (a, b, c) = (pts[k], pts[(k + 1) % pts.len()], pts[(k + 2) % pts.len()]);
                (b.0 - a.0) * (c.1 - b.1) - (b.1 - a.1) * (c.0 - b.0)
            })
            .collect();
        let left = turns.iter().all(|&t| t >= -1e-3);
        let right = turns.iter().all(|&t| t <= 1e-3);
        assert!(left || right, "polygon {} is not convex: {:?}", n, turns);
    }
}

#[test]
fn poly_size_3_triangle() {
    let tess = tessellate_with_poly_size(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0], 3);
    assert_eq!(tess.element_count(), 1);
}

#[test]
fn poly_size_4_quad_is_one_element() {
    let tess = tessellate_with_poly_size(&helpers::square(0.0, 0.0, 1.0), 4);
    assert_eq!(tess.element_count(), 1);
    let elems = tess.elements();
    assert_eq!(elems.len(), 4);
    assert!(elems.iter().all(|&i| i != TESS_UNDEF && (i as usize) < tess.vertex_count()));
}

#[test]
fn poly_size_4_pentagon_splits_in_two() {
    let tess = tessellate_with_poly_size(&regular_polygon(5, 1.0), 4);
    assert_eq!(tess.element_count(), 2);
    helpers::verify_valid_output(&tess);
    // A quad and a padded triangle.
    let padding = tess.elements().iter().filter(|&&i| i == TESS_UNDEF).count();
    assert_eq!(padding, 1);
}

#[test]
fn poly_size_6_hexagon_is_one_element() {
    let tess = tessellate_with_poly_size(&regular_polygon(6, 10.0), 6);
    assert_eq!(tess.element_count(), 1);
    assert_eq!(tess.elements().len(), 6);
    helpers::verify_valid_output(&tess);
}

#[test]
fn triangles_are_padded_with_undef() {
    let tess = tessellate_with_poly_size(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0], 5);
    assert_eq!(tess.element_count(), 1);
    assert_eq!(&tess.elements()[3..], &[TESS_UNDEF, TESS_UNDEF]);
}

#[test]
fn merged_star_polygons_stay_convex() {
    for poly_size in [4, 6, 8] {
        let tess = tessellate_with_poly_size(&helpers::star(), poly_size);
        assert!(tess.element_count() > 0);
        helpers::verify_valid_output(&tess);
        assert_convex_polygons(&tess, poly_size);
    }
}

#[test]
fn merging_reduces_the_element_count() {
    let star = helpers::star();
    let tris = tessellate_with_poly_size(&star, 3).element_count();
    let quads = tessellate_with_poly_size(&star, 4).element_count();
    assert_eq!(tris, 8);
    assert!(quads < tris, "{} >= {}", quads, tris);
}

#[test]
fn poly_size_3_and_4_same_area() {
    for shape in [helpers::square(0.0, 0.0, 10.0), helpers::star(), regular_polygon(9, 4.0)] {
        let area3 = helpers::total_polygon_area(&tessellate_with_poly_size(&shape, 3), 3);
        let area4 = helpers::total_polygon_area(&tessellate_with_poly_size(&shape, 4), 4);
        assert_relative_eq!(area3, area4, max_relative = 1e-4);
        assert_relative_eq!(area3, helpers::polygon_signed_area(&shape).abs(), max_relative = 1e-4);
    }
}

#[test]
fn poly_size_16_quad() {
    let tess = tessellate_with_poly_size(&helpers::square(0.0, 0.0, 1.0), 16);
    assert_eq!(tess.element_count(), 1);
    assert_eq!(tess.elements().len(), 16);
    helpers::verify_valid_output(&tess);
}
