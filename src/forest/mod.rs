//! Forest fringe generation
//!
//! Starting from a dense lattice of candidate points, the forest is grown in
//! two passes (hole filling, then a ring of border probes), trimmed
//! away from roads and buildings, and finally each surviving point is
//! classified into a tile variant by its four cardinal neighbors.

mod tiles;

pub use tiles::{classify, is_map_corner, ForestTile, Neighbors, TileKind};

use std::collections::HashSet;
use std::time::Instant;

use glam::DVec2;

use crate::buildings::BuildingSite;
use crate::config::TownConfig;
use crate::geometry::{Edge, Point};

#[cfg(feature = "spatial-index")]
use crate::spatial::SiteIndex;

/// Lattice coordinates are compared after rounding to this many units
const KEY_SCALE: f64 = 1e3;

const EPSILON: f64 = 1e-6;

type LatticeKey = (i64, i64);

fn lattice_key(p: Point) -> LatticeKey {
    ((p.x * KEY_SCALE).round() as i64, (p.y * KEY_SCALE).round() as i64)
}

fn snap(p: Point) -> Point {
    (p * KEY_SCALE).round() / KEY_SCALE
}

fn in_bounds(p: Point, bound_size: f64) -> bool {
    p.x >= -EPSILON && p.x <= bound_size + EPSILON && p.y >= -EPSILON && p.y <= bound_size + EPSILON
}

fn eight_directions(step: f64) -> [DVec2; 8] {
    [
        DVec2::new(-step, -step),
        DVec2::new(0.0, -step),
        DVec2::new(step, -step),
        DVec2::new(-step, 0.0),
        DVec2::new(step, 0.0),
        DVec2::new(-step, step),
        DVec2::new(0.0, step),
        DVec2::new(step, step),
    ]
}

/// Up, right, down, left
fn four_directions(step: f64) -> [DVec2; 4] {
    [
        DVec2::new(0.0, -step),
        DVec2::new(step, 0.0),
        DVec2::new(0.0, step),
        DVec2::new(-step, 0.0),
    ]
}

/// Set of lattice points that remembers insertion order
#[derive(Debug, Clone, Default)]
pub struct LatticeSet {
    points: Vec<Point>,
    keys: HashSet<LatticeKey>,
}

impl LatticeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: &[Point]) -> Self {
        let mut set = Self::new();
        for &p in points {
            set.insert(p);
        }
        set
    }

    /// Add `p`, returning `false` if it was already present
    pub fn insert(&mut self, p: Point) -> bool {
        let p = snap(p);
        if self.keys.insert(lattice_key(p)) {
            self.points.push(p);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.keys.contains(&lattice_key(p))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

/// Single hole-filling pass
///
/// For every seed point, each absent in-bounds 8-neighbor is added when at
/// least 4 of its own 8 neighbors are present. Additions made earlier in the
/// pass count toward later checks; the pass is not repeated.
pub fn fill_holes(set: &mut LatticeSet, seeds: &[Point], step: f64, bound_size: f64) {
    let directions = eight_directions(step);
    for &seed in seeds {
        for d in directions {
            let candidate = snap(seed + d);
            if !in_bounds(candidate, bound_size) || set.contains(candidate) {
                continue;
            }
            let present = directions
                .iter()
                .filter(|&&dd| set.contains(candidate + dd))
                .count();
            if present >= 4 {
                set.insert(candidate);
            }
        }
    }
}

/// Grow the set by one ring of probes
///
/// Every point present before this call probes `2 * step` away in the four
/// cardinal directions; absent in-bounds cells are added. Cells added here
/// do not probe in turn, so the set at most grows by the probe ring.
pub fn extend_borders(set: &mut LatticeSet, step: f64, bound_size: f64) {
    let snapshot: Vec<Point> = set.points().to_vec();

    for p in snapshot {
        for d in four_directions(2.0 * step) {
            let probe = snap(p + d);
            if in_bounds(probe, bound_size) {
                set.insert(probe);
            }
        }
    }
}

/// Drop points too close to a road centerline or a building site
///
/// Distances are compared squared and strictly: a point exactly at the
/// clearance distance survives.
pub fn clear_around(
    points: &[Point],
    roads: &[Edge],
    buildings: &[BuildingSite],
    road_clearance: f64,
    building_clearance: f64,
) -> Vec<Point> {
    let road_sq = road_clearance * road_clearance;
    let building_sq = building_clearance * building_clearance;

    let away_from_roads = points
        .iter()
        .copied()
        .filter(|&p| !roads.iter().any(|r| r.distance_squared_to(p) < road_sq))
        .collect();
    drop_near_buildings(away_from_roads, buildings, building_sq)
}

#[cfg(feature = "spatial-index")]
fn drop_near_buildings(points: Vec<Point>, buildings: &[BuildingSite], dist_sq: f64) -> Vec<Point> {
    match SiteIndex::new(buildings) {
        Some(index) => points
            .into_iter()
            .filter(|&p| !index.any_within(p, dist_sq))
            .collect(),
        None => points,
    }
}

#[cfg(not(feature = "spatial-index"))]
fn drop_near_buildings(points: Vec<Point>, buildings: &[BuildingSite], dist_sq: f64) -> Vec<Point> {
    points
        .into_iter()
        .filter(|&p| !buildings.iter().any(|b| b.position.distance_squared(p) < dist_sq))
        .collect()
}

/// Classify each point by which of its cardinal neighbors at `step` are
/// also in `points`
pub fn classify_points(points: &[Point], step: f64, bound_size: f64) -> Vec<ForestTile> {
    let set = LatticeSet::from_points(points);
    points
        .iter()
        .map(|&p| {
            let neighbors = Neighbors {
                top: set.contains(p + DVec2::new(0.0, -step)),
                right: set.contains(p + DVec2::new(step, 0.0)),
                bottom: set.contains(p + DVec2::new(0.0, step)),
                left: set.contains(p + DVec2::new(-step, 0.0)),
            };
            classify(p, neighbors, bound_size)
        })
        .collect()
}

/// Generate classified forest tiles from a dense lattice
///
/// Runs hole filling, border extension, road and building clearance, then
/// classification. Clearances come from
/// [`TownConfig::forest_road_clearance`] and
/// [`TownConfig::forest_building_clearance`]. The tile cap is left to the
/// caller. An empty lattice yields no tiles.
pub fn generate_forest(
    dense_points: &[Point],
    roads: &[Edge],
    buildings: &[BuildingSite],
    config: &TownConfig,
) -> Vec<ForestTile> {
    if dense_points.is_empty() {
        return Vec::new();
    }

    let start = Instant::now();
    let step = config.forest_step;
    let bound = config.bound_size;

    let mut set = LatticeSet::from_points(dense_points);
    fill_holes(&mut set, dense_points, step, bound);
    let filled = set.len();
    extend_borders(&mut set, step, bound);
    let extended = set.len();

    let survivors = clear_around(
        set.points(),
        roads,
        buildings,
        config.forest_road_clearance(),
        config.forest_building_clearance(),
    );
    let tiles = classify_points(&survivors, step, bound);

    log::debug!(
        "[Forest] {} seeds -> {} filled -> {} extended -> {} tiles in {:.2?}",
        dense_points.len(),
        filled,
        extended,
        tiles.len(),
        start.elapsed()
    );
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn block(x0: f64, y0: f64, step: f64) -> Vec<Point> {
        let mut points = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                points.push(p(x0 + i as f64 * step, y0 + j as f64 * step));
            }
        }
        points
    }

    #[test]
    fn test_block_classification() {
        let points = block(100.0, 100.0, 20.0);
        let tiles = classify_points(&points, 20.0, 600.0);
        let kind_at = |x: f64, y: f64| {
            tiles
                .iter()
                .find(|t| t.position == p(x, y))
                .map(|t| t.tile)
        };

        assert_eq!(kind_at(120.0, 120.0), Some(TileKind::Center));
        for (x, y) in [(120.0, 100.0), (140.0, 120.0), (120.0, 140.0), (100.0, 120.0)] {
            assert_eq!(kind_at(x, y), Some(TileKind::Side));
        }
        for (x, y) in [(100.0, 100.0), (140.0, 100.0), (100.0, 140.0), (140.0, 140.0)] {
            assert_eq!(kind_at(x, y), Some(TileKind::Corner));
        }
    }

    #[test]
    fn test_fill_holes_closes_single_gap() {
        let mut ring = block(100.0, 100.0, 20.0);
        ring.retain(|&q| q != p(120.0, 120.0));
        let mut set = LatticeSet::from_points(&ring);
        fill_holes(&mut set, &ring, 20.0, 600.0);
        assert!(set.contains(p(120.0, 120.0)));
        assert_eq!(set.len(), 9);
    }

    #[test]
    fn test_fill_holes_needs_four_neighbors() {
        // (120, 100) sees only three of these
        let seeds = vec![p(100.0, 100.0), p(140.0, 100.0), p(120.0, 120.0)];
        let mut set = LatticeSet::from_points(&seeds);
        fill_holes(&mut set, &seeds, 20.0, 600.0);
        assert!(!set.contains(p(120.0, 100.0)));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_extend_borders_adds_probe_ring() {
        let mut set = LatticeSet::from_points(&[p(300.0, 300.0)]);
        extend_borders(&mut set, 20.0, 600.0);

        for q in [p(300.0, 260.0), p(340.0, 300.0), p(300.0, 340.0), p(260.0, 300.0)] {
            assert!(set.contains(q));
        }
        // Gaps between the seed and its probes stay open, nothing walks outward
        assert!(!set.contains(p(300.0, 280.0)));
        assert!(!set.contains(p(300.0, 220.0)));
        assert!(!set.contains(p(300.0, 20.0)));
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_extend_borders_growth_is_bounded() {
        // A 10x10 block only gains the probes that land outside it
        let dense: Vec<Point> = (0..10)
            .flat_map(|i| (0..10).map(move |j| p(200.0 + i as f64 * 20.0, 200.0 + j as f64 * 20.0)))
            .collect();
        let mut set = LatticeSet::from_points(&dense);
        extend_borders(&mut set, 20.0, 600.0);

        // Two rows of ten on each side, diagonal corners stay empty
        assert_eq!(set.len(), 100 + 4 * 2 * 10);
        assert!(!set.contains(p(140.0, 140.0)));
    }

    #[test]
    fn test_extend_borders_stays_in_bounds() {
        let mut set = LatticeSet::from_points(&[p(20.0, 20.0)]);
        extend_borders(&mut set, 20.0, 600.0);
        assert!(!set.contains(p(-20.0, 20.0)));
        assert!(set.points().iter().all(|q| in_bounds(*q, 600.0)));
    }

    #[test]
    fn test_clearance_from_roads_and_buildings() {
        let points: Vec<Point> = (0..30).map(|i| p(i as f64 * 20.0, 300.0)).collect();
        let roads = vec![Edge::new(p(0.0, 290.0), p(200.0, 290.0))];
        let buildings = vec![BuildingSite {
            position: p(400.0, 300.0),
            angle: 0.0,
            sprite_index: 0,
        }];

        let kept = clear_around(&points, &roads, &buildings, 30.0, 40.0);
        assert!(kept.iter().all(|q| q.x > 200.0));
        assert!(!kept.contains(&p(380.0, 300.0)));
        // Exactly at the building clearance survives
        assert!(kept.contains(&p(440.0, 300.0)));
        assert!(kept.contains(&p(500.0, 300.0)));
    }

    #[test]
    fn test_generated_forest_respects_clearance_and_neighbors() {
        let config = TownConfig::default();
        let dense: Vec<Point> = (0..6)
            .flat_map(|i| (0..6).map(move |j| p(360.0 + i as f64 * 20.0, 360.0 + j as f64 * 20.0)))
            .collect();
        let roads = vec![Edge::new(p(0.0, 200.0), p(600.0, 200.0))];
        let buildings = vec![BuildingSite {
            position: p(100.0, 500.0),
            angle: 0.0,
            sprite_index: 2,
        }];

        let tiles = generate_forest(&dense, &roads, &buildings, &config);
        assert!(!tiles.is_empty());

        let road_sq = config.forest_road_clearance().powi(2);
        let building_sq = config.forest_building_clearance().powi(2);
        let positions: Vec<Point> = tiles.iter().map(|t| t.position).collect();
        let reclassified = classify_points(&positions, config.forest_step, config.bound_size);

        for (tile, again) in tiles.iter().zip(&reclassified) {
            assert!(roads[0].distance_squared_to(tile.position) >= road_sq);
            assert!(buildings[0].position.distance_squared(tile.position) >= building_sq);
            assert_eq!(tile, again);
        }
    }

    #[test]
    fn test_empty_lattice_has_no_forest() {
        let config = TownConfig::default();
        assert!(generate_forest(&[], &[], &[], &config).is_empty());
    }
}
