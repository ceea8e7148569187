// Copyright 2025 Lars Brubaker
// Tests verifying output correctness: area preservation, valid indices, no degenerates.

mod helpers;

use std::f32::consts::PI;

use approx::assert_relative_eq;
use polytess::{ElementType, TessOption, Tessellator, WindingRule, TESS_UNDEF};

fn tessellate_simple(vertices: &[f32]) -> Tessellator {
    let mut tess = Tessellator::new();
    tess.add_contour(2, vertices);
    let ok = tess.tessellate(WindingRule::Positive, ElementType::Polygons, 3, 2, None);
    assert!(ok, "tessellation failed: {:?}", tess.error());
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

// --- Area preservation ---

#[test]
fn area_unit_square() {
    let tess = tessellate_simple(&helpers::square(0.0, 0.0, 1.0));
    assert_relative_eq!(helpers::total_tessellation_area(&tess), 1.0, epsilon = 1e-5);
}

#[test]
fn area_unit_triangle() {
    let tess = tessellate_simple(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    assert_relative_eq!(helpers::total_tessellation_area(&tess), 0.5, epsilon = 1e-5);
}

#[test]
fn area_rectangle_2x3() {
    let tess = tessellate_simple(&[0.0, 0.0, 2.0, 0.0, 2.0, 3.0, 0.0, 3.0]);
    assert_relative_eq!(helpers::total_tessellation_area(&tess), 6.0, epsilon = 1e-5);
}

#[test]
fn area_regular_hexagon() {
    let tess = tessellate_simple(&regular_polygon(6, 1.0));
    assert_eq!(tess.element_count(), 4);
    // Circumradius 1: 3 * sqrt(3) / 2.
    let expected = 3.0 * 3.0f32.sqrt() / 2.0;
    assert_relative_eq!(helpers::total_tessellation_area(&tess), expected, epsilon = 1e-4);
}

#[test]
fn area_of_many_sided_polygon() {
    let poly = regular_polygon(64, 50.0);
    let tess = tessellate_simple(&poly);
    assert_eq!(tess.element_count(), 62);
    assert_relative_eq!(
        helpers::total_tessellation_area(&tess),
        helpers::polygon_signed_area(&poly).abs(),
        max_relative = 1e-4
    );
}

#[test]
fn area_of_concave_comb() {
    // Comb with five teeth pointing up.
    let comb = [
        0.0, 0.0, 9.0, 0.0, 9.0, 3.0, 8.0, 3.0, 8.0, 1.0, 7.0, 1.0, 7.0, 3.0, 6.0, 3.0, 6.0, 1.0,
        5.0, 1.0, 5.0, 3.0, 4.0, 3.0, 4.0, 1.0, 3.0, 1.0, 3.0, 3.0, 2.0, 3.0, 2.0, 1.0, 1.0, 1.0,
        1.0, 3.0, 0.0, 3.0,
    ];
    let tess = tessellate_simple(&comb);
    helpers::verify_valid_output(&tess);
    // Vertices - 2 triangles for a simple polygon.
    assert_eq!(tess.element_count(), comb.len() / 2 - 2);
    assert_relative_eq!(
        helpers::total_tessellation_area(&tess),
        helpers::polygon_signed_area(&comb).abs(),
        epsilon = 1e-4
    );
}

#[test]
fn triangles_are_counter_clockwise() {
    let mut tess = Tessellator::new();
    tess.set_option(TessOption::ReverseContours, false);
    tess.add_contour(2, &helpers::square(0.0, 0.0, 3.0));
    tess.set_option(TessOption::ReverseContours, true);
    tess.add_contour(2, &helpers::square(1.0, 1.0, 1.0));
    assert!(tess.tessellate(WindingRule::Positive, ElementType::Polygons, 3, 2, None));
    assert_relative_eq!(helpers::total_tessellation_signed_area(&tess), 8.0, epsilon = 1e-4);
    assert_relative_eq!(helpers::total_tessellation_area(&tess), 8.0, epsilon = 1e-4);
}

#[test]
fn area_two_separate_triangles() {
    let mut tess = Tessellator::new();
    tess.add_contour(2, &[0.0, 0.0, 1.0, 0.0, 0.5, 1.0]);
    tess.add_contour(2, &[5.0, 5.0, 6.0, 5.0, 5.5, 6.0]);
    assert!(tess.tessellate(WindingRule::Positive, ElementType::Polygons, 3, 2, None));
    assert_eq!(tess.element_count(), 2);
    assert_relative_eq!(helpers::total_tessellation_area(&tess), 1.0, epsilon = 1e-5);
    helpers::verify_valid_output(&tess);
}

// --- Valid indices ---

#[test]
fn valid_indices_star() {
    for rule in [WindingRule::Odd, WindingRule::NonZero, WindingRule::Positive] {
        let tess = helpers::tessellate_contours(&[helpers::star()], rule);
        helpers::verify_valid_output(&tess);
        assert_eq!(tess.element_count(), 8);
    }
}

#[test]
fn no_degenerate_triangles_pentagon() {
    let tess = tessellate_simple(&regular_polygon(5, 100.0));
    assert_eq!(tess.element_count(), 3);
    helpers::verify_no_degenerate_triangles(&tess, 1e-3);
}

// --- Vertex bounds and indices ---

#[test]
fn output_vertices_within_input_bounds() {
    let tess = tessellate_simple(&[10.0, 20.0, 50.0, 20.0, 50.0, 80.0, 10.0, 80.0]);
    for v in tess.vertices().chunks(2) {
        assert!((10.0..=50.0).contains(&v[0]), "x={} out of bounds", v[0]);
        assert!((20.0..=80.0).contains(&v[1]), "y={} out of bounds", v[1]);
    }
}

#[test]
fn crossing_vertices_lie_on_both_edges() {
    // Bow tie: the crossing at (1, 1) is a new vertex.
    let mut tess = Tessellator::new();
    tess.add_contour(2, &[0.0, 0.0, 2.0, 2.0, 2.0, 0.0, 0.0, 2.0]);
    assert!(tess.tessellate(WindingRule::NonZero, ElementType::Polygons, 3, 2, None));
    assert_eq!(tess.element_count(), 2);
    assert_eq!(tess.vertex_count(), 5);

    let created: Vec<usize> = tess
        .vertex_indices()
        .iter()
        .enumerate()
        .filter(|(_, &idx)| idx == TESS_UNDEF)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(created.len(), 1);
    let v = &tess.vertices()[created[0] * 2..created[0] * 2 + 2];
    assert_relative_eq!(v[0], 1.0, epsilon = 1e-5);
    assert_relative_eq!(v[1], 1.0, epsilon = 1e-5);
}

#[test]
fn vertex_indices_refer_to_submission_order() {
    let input = [10.0, 20.0, 50.0, 20.0, 50.0, 80.0, 10.0, 80.0];
    let tess = tessellate_simple(&input);
    assert_eq!(tess.vertex_indices().len(), tess.vertex_count());
    for (i, &idx) in tess.vertex_indices().iter().enumerate() {
        let src = idx as usize;
        assert!(src < 4);
        assert_eq!(&tess.vertices()[i * 2..i * 2 + 2], &input[src * 2..src * 2 + 2]);
    }
}

#[test]
fn vertex_indices_continue_across_contours() {
    let mut tess = Tessellator::new();
    tess.add_contour(2, &[0.0, 0.0, 1.0, 0.0, 0.5, 1.0]);
    tess.add_contour(2, &[5.0, 5.0, 6.0, 5.0, 5.5, 6.0]);
    assert!(tess.tessellate(WindingRule::Positive, ElementType::Polygons, 3, 2, None));
    let mut indices = tess.vertex_indices().to_vec();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn element_count_matches_elements_length() {
    let tess = tessellate_simple(&helpers::square(0.0, 0.0, 3.0));
    assert_eq!(tess.elements().len(), tess.element_count() * 3);
}

#[test]
fn results_are_replaced_by_the_next_call() {
    let mut tess = Tessellator::new();
    tess.add_contour(2, &helpers::square(0.0, 0.0, 3.0));
    assert!(tess.tessellate(WindingRule::Positive, ElementType::Polygons, 3, 2, None));
    assert_eq!(tess.element_count(), 2);

    tess.add_contour(2, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    assert!(tess.tessellate(WindingRule::Positive, ElementType::Polygons, 3, 2, None));
    assert_eq!(tess.element_count(), 1);
    assert_eq!(tess.vertex_count(), 3);
}
