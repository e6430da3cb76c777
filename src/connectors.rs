//! Connector paths from building sites to the nearest road

use crate::buildings::BuildingSite;
use crate::geometry::{Edge, Point};

/// Closest point on any road edge to `p`
///
/// Returns the edge index, the projected point and its squared distance.
/// Ties keep the first edge in iteration order. `None` for an empty slice.
pub fn nearest_road_point(roads: &[Edge], p: Point) -> Option<(usize, Point, f64)> {
    let mut best: Option<(usize, Point, f64)> = None;
    for (index, edge) in roads.iter().enumerate() {
        let projected = edge.closest_point(p);
        let dist_sq = p.distance_squared(projected);
        if best.map_or(true, |(_, _, d)| dist_sq < d) {
            best = Some((index, projected, dist_sq));
        }
    }
    best
}

/// One connector per building, from the site to its nearest road point
///
/// An empty road slice yields no connectors.
pub fn route_connectors(roads: &[Edge], buildings: &[BuildingSite]) -> Vec<Edge> {
    buildings
        .iter()
        .filter_map(|site| {
            nearest_road_point(roads, site.position)
                .map(|(_, target, _)| Edge::new(site.position, target))
        })
        .collect()
}
