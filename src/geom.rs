// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Geometric predicates on sweep-plane positions.
//
// Every difference, product and sum that feeds a comparison is clamped to the
// finite range, so operands anywhere in the f32 range produce signs (never
// NaN) as long as the inputs themselves are not NaN. Weighted interpolation
// switches to a blended form when the direct span would overflow.

pub type Real = f32;

/// Largest coordinate magnitude accepted from callers (2^60).
///
/// Sentinel edges extend the bounding box by its own size on each side, so the
/// sweep works with magnitudes up to about 2^62; degree-two expressions of such
/// values still fit in an f32.
pub const MAX_COORD: Real = 1_152_921_504_606_846_976.0;

/// A position on the sweep plane: `s` is the sweep axis, `t` the orthogonal one.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Pos {
    pub s: Real,
    pub t: Real,
}

impl Pos {
    #[inline]
    pub const fn new(s: Real, t: Real) -> Self {
        Pos { s, t }
    }

    /// Lexicographic order: `s` first, then `t`.
    #[inline]
    pub fn leq(self, other: Pos) -> bool {
        self.s < other.s || (self.s == other.s && self.t <= other.t)
    }

    /// Lexicographic order with the axes transposed.
    #[inline]
    pub fn trans_leq(self, other: Pos) -> bool {
        self.t < other.t || (self.t == other.t && self.s <= other.s)
    }

    #[inline]
    pub fn l1_dist(self, other: Pos) -> Real {
        bounded(diff(self.s, other.s).abs() + diff(self.t, other.t).abs())
    }

    pub fn is_finite(self) -> bool {
        self.s.is_finite() && self.t.is_finite()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    CounterClockwise,
    Clockwise,
    Collinear,
}

/// True for values the sweep can order: finite and within `MAX_COORD`.
#[inline]
pub fn is_valid_coord(x: Real) -> bool {
    x.is_finite() && x.abs() <= MAX_COORD
}

#[inline]
fn bounded(x: Real) -> Real {
    x.clamp(-Real::MAX, Real::MAX)
}

#[inline]
fn diff(a: Real, b: Real) -> Real {
    bounded(a - b)
}

/// `a / (a + b)` for non-negative `a`, `b` without overflowing the sum.
#[inline]
fn fraction(a: Real, b: Real) -> Real {
    let total = a + b;
    if total.is_finite() {
        a / total
    } else {
        (a * 0.5) / (a * 0.5 + b * 0.5)
    }
}

/// Given `u <= v <= w`, the signed distance from edge `uw` to `v` measured
/// along `t` at `v.s`. Zero when `uw` is vertical.
pub fn edge_eval(u: Pos, v: Pos, w: Pos) -> Real {
    let gap_l = diff(v.s, u.s);
    let gap_r = diff(w.s, v.s);
    if gap_l + gap_r > 0.0 {
        if gap_l < gap_r {
            bounded(diff(v.t, u.t) + diff(u.t, w.t) * fraction(gap_l, gap_r))
        } else {
            bounded(diff(v.t, w.t) + diff(w.t, u.t) * fraction(gap_r, gap_l))
        }
    } else {
        0.0
    }
}

/// Same sign as [`edge_eval`]. Evaluated with the same quotient form, which
/// stays accurate when `s` coordinates are nearly zero.
#[inline]
pub fn edge_sign(u: Pos, v: Pos, w: Pos) -> Real {
    edge_eval(u, v, w)
}

/// [`edge_eval`] with `s` and `t` exchanged; requires `u`, `v`, `w` in `trans_leq` order.
pub fn trans_eval(u: Pos, v: Pos, w: Pos) -> Real {
    let gap_l = diff(v.t, u.t);
    let gap_r = diff(w.t, v.t);
    if gap_l + gap_r > 0.0 {
        if gap_l < gap_r {
            bounded(diff(v.s, u.s) + diff(u.s, w.s) * fraction(gap_l, gap_r))
        } else {
            bounded(diff(v.s, w.s) + diff(w.s, u.s) * fraction(gap_r, gap_l))
        }
    } else {
        0.0
    }
}

/// Same sign as [`trans_eval`], computed without the division.
pub fn trans_sign(u: Pos, v: Pos, w: Pos) -> Real {
    let gap_l = diff(v.t, u.t);
    let gap_r = diff(w.t, v.t);
    if gap_l + gap_r > 0.0 {
        bounded(bounded(diff(v.s, w.s) * gap_l) + bounded(diff(v.s, u.s) * gap_r))
    } else {
        0.0
    }
}

/// Orientation of the triangle `(u, v, w)`, evaluated in double precision.
pub fn orientation(u: Pos, v: Pos, w: Pos) -> Orientation {
    let (us, ut) = (u.s as f64, u.t as f64);
    let det = (v.s as f64 - us) * (w.t as f64 - ut) - (v.t as f64 - ut) * (w.s as f64 - us);
    if det > 0.0 {
        Orientation::CounterClockwise
    } else if det < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// True when `(u, v, w)` turns left or is collinear.
#[inline]
pub fn vert_ccw(u: Pos, v: Pos, w: Pos) -> bool {
    orientation(u, v, w) != Orientation::Clockwise
}

/// Angle at `apex` between the rays towards `a` and `b`, in radians.
pub fn angle(a: Pos, apex: Pos, b: Pos) -> Real {
    let (ax, ay) = (a.s as f64 - apex.s as f64, a.t as f64 - apex.t as f64);
    let (bx, by) = (b.s as f64 - apex.s as f64, b.t as f64 - apex.t as f64);
    let den = (ax * ax + ay * ay).sqrt() * (bx * bx + by * by).sqrt();
    let mut cos = ax * bx + ay * by;
    if den > 0.0 {
        cos /= den;
    }
    cos.clamp(-1.0, 1.0).acos() as Real
}

/// Weighted position between `x` and `y`: `(b*x + a*y) / (a + b)`.
///
/// Negative weights count as zero; two zero weights give the midpoint. The
/// result always lies between `x` and `y`, even when `y - x` overflows.
pub fn interpolate(a: Real, x: Real, b: Real, y: Real) -> Real {
    let a = a.max(0.0);
    let b = b.max(0.0);
    if a <= b {
        if b == 0.0 {
            x / 2.0 + y / 2.0
        } else {
            toward(x, y, fraction(a, b))
        }
    } else {
        toward(y, x, fraction(b, a))
    }
}

#[inline]
fn toward(from: Real, to: Real, f: Real) -> Real {
    let span = to - from;
    if span.is_finite() {
        from + span * f
    } else {
        bounded(from * (1.0 - f) + to * f)
    }
}

/// Intersection of edges `(o1, d1)` and `(o2, d2)`, assumed to cross.
///
/// The result lies inside the bounding rectangle of the overlap, so it can be
/// ordered against the sweep even when rounding misplaces it slightly.
pub fn edge_intersect(o1: Pos, d1: Pos, o2: Pos, d2: Pos) -> Pos {
    Pos::new(
        intersect_axis(o1, d1, o2, d2, Pos::leq, edge_eval, edge_sign, |p| p.s),
        intersect_axis(o1, d1, o2, d2, Pos::trans_leq, trans_eval, trans_sign, |p| p.t),
    )
}

// One coordinate of the intersection. `leq`, `eval` and `sign` select the
// sweep order (s-major or t-major) and `coord` the coordinate being solved.
#[allow(clippy::too_many_arguments)]
fn intersect_axis(
    mut a: Pos,
    mut b: Pos,
    mut c: Pos,
    mut d: Pos,
    leq: fn(Pos, Pos) -> bool,
    eval: fn(Pos, Pos, Pos) -> Real,
    sign: fn(Pos, Pos, Pos) -> Real,
    coord: fn(Pos) -> Real,
) -> Real {
    if !leq(a, b) {
        std::mem::swap(&mut a, &mut b);
    }
    if !leq(c, d) {
        std::mem::swap(&mut c, &mut d);
    }
    if !leq(a, c) {
        std::mem::swap(&mut a, &mut c);
        std::mem::swap(&mut b, &mut d);
    }

    if !leq(c, b) {
        // No overlap along this axis; pick the midpoint of the gap.
        return coord(c) / 2.0 + coord(b) / 2.0;
    }
    if leq(b, d) {
        // Interpolate between c and b.
        let (mut z1, mut z2) = (eval(a, c, b), eval(c, b, d));
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, coord(c), z2, coord(b))
    } else {
        // Interpolate between c and d.
        let (mut z1, mut z2) = (sign(a, c, b), -sign(a, d, b));
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, coord(c), z2, coord(d))
    }
}

/// Weights of `org` and `dst` for an intersection vertex on edge `org..dst`.
///
/// Each pair of weights sums to one half, so the two edges through an
/// intersection contribute equally to its blended coordinates.
pub fn intersection_weights(isect: Pos, org: Pos, dst: Pos) -> (Real, Real) {
    let t1 = org.l1_dist(isect);
    let t2 = dst.l1_dist(isect);
    let total = t1 + t2;
    if total > 0.0 && total.is_finite() {
        (0.5 * t2 / total, 0.5 * t1 / total)
    } else {
        (0.25, 0.25)
    }
}
