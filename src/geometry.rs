//! Point and segment primitives shared by every generation stage

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A position on the map
///
/// Coordinates are compared by exact equality when deduplicating edges, so
/// values produced by the tessellation are snapped before they reach here.
pub type Point = DVec2;

/// Cross-product tolerance below which two edges count as parallel
const PARALLEL_EPSILON: f64 = 0.01;

/// A straight segment between two points
///
/// Edges are undirected: an edge compares equal to its reverse.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub from: Point,
    pub to: Point,
}

impl Edge {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    /// Direction vector from `from` to `to`
    #[inline]
    pub fn delta(&self) -> DVec2 {
        self.to - self.from
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.delta().length()
    }

    /// Direction angle in radians (`atan2(dy, dx)`)
    #[inline]
    pub fn angle(&self) -> f64 {
        let d = self.delta();
        d.y.atan2(d.x)
    }

    /// Point at parametric position `t` (0 = from, 1 = to)
    #[inline]
    pub fn lerp(&self, t: f64) -> Point {
        self.from + self.delta() * t
    }

    /// Whether both edges run in the same (or opposite) direction
    pub fn is_parallel(&self, other: &Edge) -> bool {
        self.delta().perp_dot(other.delta()).abs() < PARALLEL_EPSILON
    }

    /// Whether `p` is one of the endpoints
    #[inline]
    pub fn has_endpoint(&self, p: Point) -> bool {
        self.from == p || self.to == p
    }

    /// Closest point on the segment to `p`
    pub fn closest_point(&self, p: Point) -> Point {
        closest_point_on_segment(p, self.from, self.to)
    }

    /// Squared distance from `p` to the segment
    pub fn distance_squared_to(&self, p: Point) -> f64 {
        p.distance_squared(self.closest_point(p))
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.from == other.from && self.to == other.to)
            || (self.from == other.to && self.to == other.from)
    }
}

/// Project `p` onto the segment `a`-`b`, clamped to the segment
///
/// A zero-length segment collapses to its single point.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let d = b - a;
    let len_sq = d.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(d) / len_sq).clamp(0.0, 1.0);
    a + d * t
}

/// Squared distance from `p` to the segment `a`-`b`
#[inline]
pub fn point_segment_distance_squared(p: Point, a: Point, b: Point) -> f64 {
    p.distance_squared(closest_point_on_segment(p, a, b))
}

/// Twice the signed area of a polygon (positive for counter-clockwise in y-up space)
pub fn signed_area2(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum()
}

/// Reorder a polygon so it winds clockwise on a y-down canvas
///
/// Uses the shoelace sum `Σ (x2 - x1)(y2 + y1)`; a positive sum means the
/// ring runs the other way and gets reversed.
pub fn ensure_clockwise(mut points: Vec<Point>) -> Vec<Point> {
    let n = points.len();
    let sum: f64 = (0..n)
        .map(|i| {
            let p1 = points[i];
            let p2 = points[(i + 1) % n];
            (p2.x - p1.x) * (p2.y + p1.y)
        })
        .sum();
    if sum > 0.0 {
        points.reverse();
    }
    points
}

/// Convex hull of a point set (Andrew's monotone chain)
///
/// Returns the hull without collinear points, in the same winding as
/// [`ensure_clockwise`] produces. Fewer than three distinct points are
/// returned as-is after deduplication.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: Point, a: Point, b: Point| (a - o).perp_dot(b - o);

    let mut lower: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    ensure_clockwise(lower)
}
