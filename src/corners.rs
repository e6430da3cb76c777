//! Rounded corners at road junctions
//!
//! For every pair of angularly adjacent roads leaving a junction, a wedge is
//! computed: the triangle (junction, tangent, tangent) is filled with road
//! color, then a circle is erased from it, leaving a rounded outer joint.
//! This module only produces the geometry; painting happens elsewhere.

use std::collections::{HashMap, HashSet};
use std::f64::consts::{FRAC_PI_4, PI, TAU};

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Edge, Point};

/// Angular separations within this of 0 or π are treated as degenerate
const ANGLE_EPSILON: f64 = 1e-3;

/// Circle erased from the filled wedge triangle
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraseCircle {
    pub center: Point,
    pub radius: f64,
}

/// Fill geometry for one rounded junction corner
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerWedge {
    /// The junction point
    pub vertex: Point,
    /// Points on both roads, equidistant from the junction
    pub tangent_points: [Point; 2],
    pub erase_circle: EraseCircle,
    /// Half of the angle between the two roads, in `(0, π/2)`
    pub half_angle: f64,
}

type PointKey = (u64, u64);

fn key(p: Point) -> PointKey {
    // `+ 0.0` folds -0.0 into 0.0 so both hash alike
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

fn pair_key(a: Point, b: Point) -> (PointKey, PointKey) {
    let (ka, kb) = (key(a), key(b));
    if ka <= kb {
        (ka, kb)
    } else {
        (kb, ka)
    }
}

/// Junction points in first-seen order with their distinct neighbors
fn junctions(roads: &[Edge]) -> Vec<(Point, Vec<Point>)> {
    let mut index: HashMap<PointKey, usize> = HashMap::new();
    let mut out: Vec<(Point, Vec<Point>)> = Vec::new();

    let mut link = |from: Point, to: Point| {
        let slot = *index.entry(key(from)).or_insert_with(|| {
            out.push((from, Vec::new()));
            out.len() - 1
        });
        let neighbors = &mut out[slot].1;
        if !neighbors.contains(&to) {
            neighbors.push(to);
        }
    };

    for edge in roads {
        if edge.from == edge.to {
            continue;
        }
        link(edge.from, edge.to);
        link(edge.to, edge.from);
    }

    out
}

/// Compute corner wedges for every junction where two or more roads meet
///
/// Per junction, neighbors are ordered by polar angle and each cyclically
/// adjacent pair is considered once. A pair is skipped when its two far
/// endpoints are joined by a road, when the roads are (anti)parallel, or when
/// a third road leaves the junction inside the pair's angle.
///
/// The rounding radius is `corner_radius`, reduced by `narrow_corner_factor`
/// for angles under 45 degrees. Tangent points and the erase circle center
/// sit at `(radius + road_width / 2) / sin(half_angle)` from the junction.
pub fn compute_corner_wedges(
    roads: &[Edge],
    road_width: f64,
    corner_radius: f64,
    narrow_corner_factor: f64,
) -> Vec<CornerWedge> {
    let joined: HashSet<(PointKey, PointKey)> =
        roads.iter().map(|e| pair_key(e.from, e.to)).collect();

    let mut wedges = Vec::new();

    for (vertex, neighbors) in junctions(roads) {
        if neighbors.len() < 2 {
            continue;
        }

        let mut spokes: Vec<(f64, Point)> = neighbors
            .iter()
            .map(|&n| {
                let d = n - vertex;
                (d.y.atan2(d.x), n)
            })
            .collect();
        spokes.sort_by(|a, b| a.0.total_cmp(&b.0));

        let k = spokes.len();
        let mut processed: HashSet<(usize, usize)> = HashSet::new();

        for i in 0..k {
            let j = (i + 1) % k;
            if !processed.insert((i.min(j), i.max(j))) {
                continue;
            }

            let (angle_a, a) = spokes[i];
            let (angle_b, b) = spokes[j];
            if joined.contains(&pair_key(a, b)) {
                continue;
            }

            // Work on the smaller of the two arcs between the spokes
            let diff = (angle_b - angle_a).rem_euclid(TAU);
            let (start, separation) = if diff <= PI {
                (angle_a, diff)
            } else {
                (angle_b, TAU - diff)
            };
            if separation < ANGLE_EPSILON || (separation - PI).abs() < ANGLE_EPSILON {
                continue;
            }

            let occupied = spokes.iter().enumerate().any(|(m, &(angle, _))| {
                if m == i || m == j {
                    return false;
                }
                let offset = (angle - start).rem_euclid(TAU);
                offset > 0.0 && offset < separation
            });
            if occupied {
                continue;
            }

            let half_angle = separation / 2.0;
            let radius = if separation < FRAC_PI_4 {
                corner_radius * narrow_corner_factor
            } else {
                corner_radius
            };

            let sin_half = half_angle.sin();
            let distance = radius / sin_half + (road_width / 2.0) / sin_half;
            let bisector = start + half_angle;

            wedges.push(CornerWedge {
                vertex,
                tangent_points: [
                    vertex + DVec2::from_angle(start) * distance,
                    vertex + DVec2::from_angle(start + separation) * distance,
                ],
                erase_circle: EraseCircle {
                    center: vertex + DVec2::from_angle(bisector) * distance,
                    radius,
                },
                half_angle,
            });
        }
    }

    log::debug!("[Corners] {} wedges from {} roads", wedges.len(), roads.len());
    wedges
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn e(a: Point, b: Point) -> Edge {
        Edge::new(a, b)
    }

    #[test]
    fn test_right_angle_junction() {
        let o = p(100.0, 100.0);
        let roads = vec![e(o, p(200.0, 100.0)), e(o, p(100.0, 200.0))];
        let wedges = compute_corner_wedges(&roads, 10.0, 5.0, 0.5);

        assert_eq!(wedges.len(), 1);
        let w = wedges[0];
        assert_eq!(w.vertex, o);
        assert!((w.half_angle - FRAC_PI_2 / 2.0).abs() < 1e-12);
        assert_eq!(w.erase_circle.radius, 5.0);

        let expected = 10.0 / (FRAC_PI_2 / 2.0).sin();
        let d0 = w.tangent_points[0].distance(o);
        let d1 = w.tangent_points[1].distance(o);
        assert!((d0 - expected).abs() < 1e-9);
        assert!((d1 - expected).abs() < 1e-9);
        assert!((w.erase_circle.center.distance(o) - expected).abs() < 1e-9);
        // Tangent points lie on the two roads
        assert!((w.tangent_points[0].y - 100.0).abs() < 1e-9);
        assert!((w.tangent_points[1].x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_straight_through_is_skipped() {
        let o = p(100.0, 100.0);
        let roads = vec![e(p(0.0, 100.0), o), e(o, p(200.0, 100.0))];
        assert!(compute_corner_wedges(&roads, 10.0, 5.0, 0.5).is_empty());
    }

    #[test]
    fn test_triangle_pairs_are_skipped() {
        let (a, b, c) = (p(0.0, 0.0), p(100.0, 0.0), p(0.0, 100.0));
        let roads = vec![e(a, b), e(b, c), e(c, a)];
        assert!(compute_corner_wedges(&roads, 10.0, 5.0, 0.5).is_empty());
    }

    #[test]
    fn test_t_junction_rounds_both_sides() {
        let o = p(100.0, 100.0);
        let roads = vec![
            e(o, p(0.0, 100.0)),
            e(o, p(200.0, 100.0)),
            e(o, p(100.0, 200.0)),
        ];
        let wedges = compute_corner_wedges(&roads, 10.0, 5.0, 0.5);
        // Two quarter turns; the half turn above the bar has no stem in it
        // but is straight, so it is dropped
        assert_eq!(wedges.len(), 2);
        for w in &wedges {
            assert!((w.half_angle - FRAC_PI_2 / 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reflex_pair_with_inner_edge_is_skipped() {
        let o = p(100.0, 100.0);
        // Three spokes within a 90 degree fan: the wrap-around pair spans the
        // reflex side, whose smaller arc holds the middle spoke
        let roads = vec![
            e(o, p(200.0, 100.0)),
            e(o, p(200.0, 150.0)),
            e(o, p(100.0, 200.0)),
        ];
        let wedges = compute_corner_wedges(&roads, 10.0, 5.0, 0.5);
        assert_eq!(wedges.len(), 2);
    }

    #[test]
    fn test_narrow_angle_uses_smaller_radius() {
        let o = p(100.0, 100.0);
        let roads = vec![e(o, p(200.0, 100.0)), e(o, p(200.0, 130.0))];
        let wedges = compute_corner_wedges(&roads, 10.0, 6.0, 0.5);
        assert_eq!(wedges.len(), 1);
        assert_eq!(wedges[0].erase_circle.radius, 3.0);
    }

    #[test]
    fn test_wedges_are_well_formed() {
        let roads = vec![
            e(p(300.0, 300.0), p(420.0, 310.0)),
            e(p(300.0, 300.0), p(250.0, 420.0)),
            e(p(300.0, 300.0), p(180.0, 260.0)),
            e(p(300.0, 300.0), p(330.0, 150.0)),
            e(p(420.0, 310.0), p(500.0, 420.0)),
            e(p(420.0, 310.0), p(510.0, 250.0)),
        ];
        let wedges = compute_corner_wedges(&roads, 8.0, 5.0, 0.5);
        assert!(!wedges.is_empty());
        for w in &wedges {
            assert!(w.half_angle > 0.0 && w.half_angle < FRAC_PI_2);
            let d0 = w.tangent_points[0].distance(w.vertex);
            let d1 = w.tangent_points[1].distance(w.vertex);
            assert!((d0 - d1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_dead_ends_produce_nothing() {
        let roads = vec![e(p(0.0, 0.0), p(10.0, 10.0))];
        assert!(compute_corner_wedges(&roads, 10.0, 5.0, 0.5).is_empty());
        assert!(compute_corner_wedges(&[], 10.0, 5.0, 0.5).is_empty());
    }
}
