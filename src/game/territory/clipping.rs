//! Half-plane polygon clipping for territory boundaries.
//!
//! Polygons are convex, counter-clockwise, and never repeat the first vertex.
//! All arithmetic is fixed-point and every loop walks vertices in storage
//! order, so two peers clipping the same input get the same vertices.

use crate::game::fixed_math::{FixedNum, FixedVec2};
use smallvec::SmallVec;

pub type Polygon = SmallVec<[FixedVec2; 8]>;

/// The full map square, counter-clockwise from the origin.
pub fn map_rectangle(size: FixedNum) -> Polygon {
    let mut poly = Polygon::new();
    poly.push(FixedVec2::new(FixedNum::ZERO, FixedNum::ZERO));
    poly.push(FixedVec2::new(size, FixedNum::ZERO));
    poly.push(FixedVec2::new(size, size));
    poly.push(FixedVec2::new(FixedNum::ZERO, size));
    poly
}

/// Signed offset of `p` from the bisector of `keep`/`other`.
///
/// Non-positive on `keep`'s side. Not normalised; only the sign and the ratio
/// between two vertices matter.
#[inline]
fn side(p: FixedVec2, mid: FixedVec2, normal: FixedVec2) -> FixedNum {
    (p - mid).dot(normal)
}

/// Clip `poly` to the half-plane of points at least as close to `keep` as to `other`.
///
/// Sutherland–Hodgman against the perpendicular bisector: each edge `s -> e`
/// emits the crossing point when it changes side and `e` when `e` is inside.
/// Points on the bisector count as inside. The result may be empty.
pub fn clip_to_bisector(poly: &[FixedVec2], keep: FixedVec2, other: FixedVec2) -> Polygon {
    let mut out = Polygon::new();
    let Some(&last) = poly.last() else {
        return out;
    };

    let two = FixedNum::from_num(2);
    let mid = FixedVec2::new((keep.x + other.x) / two, (keep.y + other.y) / two);
    let normal = other - keep;

    let mut s = last;
    let mut ds = side(s, mid, normal);
    for &e in poly {
        let de = side(e, mid, normal);
        let s_in = ds <= FixedNum::ZERO;
        let e_in = de <= FixedNum::ZERO;

        if e_in {
            if !s_in {
                out.push(crossing(s, e, ds, de));
            }
            out.push(e);
        } else if s_in {
            out.push(crossing(s, e, ds, de));
        }

        s = e;
        ds = de;
    }

    dedup_ring(&mut out);
    out
}

/// Point where segment `s -> e` crosses the line, given both signed offsets.
#[inline]
fn crossing(s: FixedVec2, e: FixedVec2, ds: FixedNum, de: FixedNum) -> FixedVec2 {
    let t = ds / (ds - de);
    s + (e - s) * t
}

/// Drop consecutive duplicates produced when the bisector passes through a vertex.
fn dedup_ring(poly: &mut Polygon) {
    poly.dedup();
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
}

/// Twice the signed area. Positive for counter-clockwise rings.
pub fn doubled_area(poly: &[FixedVec2]) -> FixedNum {
    let Some(&last) = poly.last() else {
        return FixedNum::ZERO;
    };
    let mut prev = last;
    let mut sum = FixedNum::ZERO;
    for &p in poly {
        sum += prev.cross(p);
        prev = p;
    }
    sum
}

/// Whether `p` lies inside or on a convex counter-clockwise ring.
pub fn convex_contains(poly: &[FixedVec2], p: FixedVec2) -> bool {
    let Some(&last) = poly.last() else {
        return false;
    };
    let mut prev = last;
    for &v in poly {
        if (v - prev).cross(p - prev) < FixedNum::ZERO {
            return false;
        }
        prev = v;
    }
    true
}
