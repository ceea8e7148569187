// Copyright 2025 Lars Brubaker
// Seeded random contours checked point by point against a reference winding number.

mod helpers;

use polytess::{ElementType, Tessellator, WindingRule};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RULES: [WindingRule; 5] = [
    WindingRule::Odd,
    WindingRule::NonZero,
    WindingRule::Positive,
    WindingRule::Negative,
    WindingRule::AbsGeqTwo,
];

fn is_inside(rule: WindingRule, winding: i32) -> bool {
    match rule {
        WindingRule::Odd => winding % 2 != 0,
        WindingRule::NonZero => winding != 0,
        WindingRule::Positive => winding > 0,
        WindingRule::Negative => winding < 0,
        WindingRule::AbsGeqTwo => winding.abs() >= 2,
    }
}

type Point = (f64, f64);

fn points(contour: &[f32]) -> Vec<Point> {
    contour
        .chunks(2)
        .map(|p| (p[0] as f64, p[1] as f64))
        .collect()
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let u = if len2 > 0.0 {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + u * dx - p.0, a.1 + u * dy - p.1);
    (cx * cx + cy * cy).sqrt()
}

fn ring_edges(ring: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    (0..ring.len()).map(move |i| (ring[i], ring[(i + 1) % ring.len()]))
}

/// Counter-clockwise winding of the input contours around `p`.
fn winding_number(contours: &[Vec<Point>], p: Point) -> i32 {
    let mut w = 0;
    for ring in contours {
        for (a, b) in ring_edges(ring) {
            if a.1 <= p.1 && b.1 > p.1 && cross(a, b, p) > 0.0 {
                w += 1;
            } else if a.1 > p.1 && b.1 <= p.1 && cross(a, b, p) < 0.0 {
                w -= 1;
            }
        }
    }
    w
}

fn output_triangles(tess: &Tessellator) -> Vec<[Point; 3]> {
    let verts = tess.vertices();
    let p = |i: u32| (verts[i as usize * 2] as f64, verts[i as usize * 2 + 1] as f64);
    tess.elements()
        .chunks(3)
        .map(|t| [p(t[0]), p(t[1]), p(t[2])])
        .collect()
}

fn strictly_inside(tri: &[Point; 3], p: Point) -> bool {
    let d = [
        cross(tri[0], tri[1], p),
        cross(tri[1], tri[2], p),
        cross(tri[2], tri[0], p),
    ];
    d.iter().all(|&x| x > 0.0) || d.iter().all(|&x| x < 0.0)
}

/// Every sample point clear of all edges is covered by exactly one output
/// triangle when the rule says it is inside, and by none otherwise.
fn check_membership(contours: &[Vec<f32>], rule: WindingRule, min: f64, max: f64) {
    let tess = {
        let mut tess = Tessellator::new();
        for contour in contours {
            tess.add_contour(2, contour);
        }
        let ok = tess.tessellate(rule, ElementType::Polygons, 3, 2, Some([0.0, 0.0, 1.0]));
        assert!(ok, "{:?} failed on {:?}: {:?}", rule, contours, tess.error());
        tess
    };
    helpers::verify_valid_output(&tess);

    let rings: Vec<Vec<Point>> = contours.iter().map(|c| points(c)).collect();
    let tris = output_triangles(&tess);
    let margin = (max - min) * 1e-3;
    let steps = 16;
    for i in 0..steps {
        for j in 0..steps {
            let p = (
                min + (max - min) * (i as f64 + 0.3137) / steps as f64,
                min + (max - min) * (j as f64 + 0.7291) / steps as f64,
            );
            let near_input = rings
                .iter()
                .flat_map(|r| ring_edges(r))
                .any(|(a, b)| segment_distance(p, a, b) < margin);
            let near_output = tris.iter().any(|t| {
                (0..3).any(|k| segment_distance(p, t[k], t[(k + 1) % 3]) < margin)
            });
            if near_input || near_output {
                continue;
            }
            let expected = is_inside(rule, winding_number(&rings, p));
            let covered = tris.iter().filter(|t| strictly_inside(t, p)).count();
            assert_eq!(
                covered,
                usize::from(expected),
                "{:?} at {:?} on {:?}",
                rule,
                p,
                contours
            );
        }
    }
}

fn random_contour(rng: &mut StdRng, size: i32) -> Vec<f32> {
    let n = rng.random_range(3..=8);
    (0..n)
        .flat_map(|_| {
            [
                rng.random_range(0..=size) as f32,
                rng.random_range(0..=size) as f32,
            ]
        })
        .collect()
}

#[test]
fn grid_snapped_contours_match_reference_winding() {
    let mut rng = StdRng::seed_from_u64(0x7e55);
    for _ in 0..300 {
        let count = rng.random_range(1..=3);
        let contours: Vec<Vec<f32>> = (0..count).map(|_| random_contour(&mut rng, 10)).collect();
        for rule in RULES {
            check_membership(&contours, rule, 0.0, 10.0);
        }
    }
}

#[test]
fn near_collinear_contours_match_reference_winding() {
    let mut rng = StdRng::seed_from_u64(0xc011);
    for _ in 0..200 {
        // A contour hugging a line, crossed by a grid-snapped one.
        let n = rng.random_range(3..=7);
        let sliver: Vec<f32> = (0..n)
            .flat_map(|_| {
                let x: f32 = rng.random_range(0.0..10.0);
                [x, 0.5 * x + 2.0 + rng.random_range(-1e-3f32..1e-3)]
            })
            .collect();
        let contours = vec![sliver, random_contour(&mut rng, 10)];
        for rule in RULES {
            check_membership(&contours, rule, 0.0, 10.0);
        }
    }
}

#[test]
fn extreme_magnitudes_give_finite_output() {
    let mut rng = StdRng::seed_from_u64(0xb16);
    for _ in 0..200 {
        let scale = 2f32.powi(rng.random_range(-60..=60));
        let contours: Vec<Vec<f32>> = (0..rng.random_range(1..=3))
            .map(|_| {
                (0..rng.random_range(3..=8) * 2)
                    .map(|_| rng.random_range(-1.0f32..1.0) * scale)
                    .collect()
            })
            .collect();
        for rule in RULES {
            let mut tess = Tessellator::new();
            for contour in &contours {
                tess.add_contour(2, contour);
            }
            if tess.tessellate(rule, ElementType::Polygons, 3, 2, None) {
                helpers::verify_valid_output(&tess);
            } else {
                assert!(tess.error().is_some());
            }
        }
    }
}
