//! Road network construction from Voronoi cell boundaries
//!
//! Every cell boundary segment is a road candidate. Candidates that retrace
//! the map frame are dropped, near-duplicate stubs along the frame are
//! merged away, and the survivors are deduplicated.

use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::voronoi::{SpadeVoronoi, Tessellation};
use crate::config::TownConfig;
use crate::geometry::{Edge, Point};

/// Deduplicated, filtered road edges for one (seed set, map size) pair
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadNetwork {
    edges: Vec<Edge>,
    bound_size: f64,
}

/// Stroke widths used to paint one road edge
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadStroke {
    /// Darker outline stroke drawn first
    pub outline: f64,
    /// Road surface stroke drawn on top
    pub fill: f64,
}

impl RoadNetwork {
    /// Wrap already-filtered edges
    pub fn new(edges: Vec<Edge>, bound_size: f64) -> Self {
        Self { edges, bound_size }
    }

    /// An empty network over a map of the given size
    pub fn empty(bound_size: f64) -> Self {
        Self::new(Vec::new(), bound_size)
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[inline]
    pub fn bound_size(&self) -> f64 {
        self.bound_size
    }

    /// Edges with neither endpoint on the map frame
    pub fn interior_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges
            .iter()
            .filter(move |e| !is_border_edge(e, self.bound_size))
    }

    /// Edges with at least one endpoint on the map frame
    pub fn border_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges
            .iter()
            .filter(move |e| is_border_edge(e, self.bound_size))
    }

    /// Stroke widths per edge, scaled by edge length
    ///
    /// Longer roads are drawn wider: the fill width grows linearly from
    /// `road_width * 0.3` for the shortest edge to `road_width` for the longest.
    pub fn stroke_widths(&self, road_width: f64) -> Vec<RoadStroke> {
        let lengths: Vec<f64> = self.edges.iter().map(Edge::length).collect();
        let min = lengths.iter().copied().fold(f64::INFINITY, f64::min);
        let max = lengths.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = if max - min > 0.0 { max - min } else { 1.0 };

        lengths
            .iter()
            .map(|len| {
                let norm = (len - min) / span;
                let fill = road_width * 10.0 * (0.03 + norm * 0.07);
                RoadStroke {
                    outline: fill + 4.0,
                    fill,
                }
            })
            .collect()
    }

    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

/// Whether `p` lies on one of the four frame lines
#[inline]
pub fn is_on_border(p: Point, bound_size: f64) -> bool {
    p.x == 0.0 || p.x == bound_size || p.y == 0.0 || p.y == bound_size
}

/// Whether either endpoint lies on the frame
pub fn is_border_edge(edge: &Edge, bound_size: f64) -> bool {
    is_on_border(edge.from, bound_size) || is_on_border(edge.to, bound_size)
}

/// Whether the edge runs along a single frame line
pub fn is_full_border_edge(edge: &Edge, bound_size: f64) -> bool {
    let (from, to) = (edge.from, edge.to);
    if from.x == to.x && (from.x == 0.0 || from.x == bound_size) {
        return true;
    }
    from.y == to.y && (from.y == 0.0 || from.y == bound_size)
}

/// Whether any endpoint of `a` is within `min_dist` of any endpoint of `b`
pub fn edges_too_close(a: &Edge, b: &Edge, min_dist: f64) -> bool {
    let min_dist_sq = min_dist * min_dist;
    [
        a.from.distance_squared(b.from),
        a.from.distance_squared(b.to),
        a.to.distance_squared(b.from),
        a.to.distance_squared(b.to),
    ]
    .iter()
    .any(|&d| d < min_dist_sq)
}

/// Drop frame-retracing edges and near-duplicate stubs along the frame
///
/// Interior edges always pass. A border edge is kept only if no previously
/// kept border edge is parallel to it or has an endpoint within
/// `merge_distance` of one of its endpoints.
pub fn filter_border_edges(edges: &[Edge], bound_size: f64, merge_distance: f64) -> Vec<Edge> {
    let mut kept: Vec<Edge> = Vec::new();

    for edge in edges {
        if !is_border_edge(edge, bound_size) {
            kept.push(*edge);
            continue;
        }
        if is_full_border_edge(edge, bound_size) {
            continue;
        }

        let clashes = kept.iter().any(|k| {
            is_border_edge(k, bound_size)
                && (k.is_parallel(edge) || edges_too_close(k, edge, merge_distance))
        });
        if !clashes {
            kept.push(*edge);
        }
    }

    kept
}

/// Collapse edges equal under undirected comparison, keeping first occurrences
pub fn remove_duplicates(edges: &[Edge]) -> Vec<Edge> {
    let mut unique: Vec<Edge> = Vec::with_capacity(edges.len());
    for edge in edges {
        if !unique.contains(edge) {
            unique.push(*edge);
        }
    }
    unique
}

/// Join parallel edges that share an endpoint into single longer edges
///
/// Greedy: each unused edge absorbs parallel neighbors until none is left,
/// so the result depends on input order.
pub fn merge_collinear_edges(edges: &[Edge]) -> Vec<Edge> {
    let mut merged = Vec::new();
    let mut used = vec![false; edges.len()];

    for i in 0..edges.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut current = edges[i];

        loop {
            let mut absorbed = false;
            for (j, candidate) in edges.iter().enumerate() {
                if used[j] || !current.is_parallel(candidate) {
                    continue;
                }
                let joined = if current.from == candidate.from {
                    Some(Edge::new(current.to, candidate.to))
                } else if current.from == candidate.to {
                    Some(Edge::new(current.to, candidate.from))
                } else if current.to == candidate.from {
                    Some(Edge::new(current.from, candidate.to))
                } else if current.to == candidate.to {
                    Some(Edge::new(current.from, candidate.from))
                } else {
                    None
                };

                if let Some(joined) = joined {
                    current = joined;
                    used[j] = true;
                    absorbed = true;
                    break;
                }
            }
            if !absorbed {
                break;
            }
        }

        merged.push(current);
    }

    merged
}

/// Consecutive-vertex segments of every available cell polygon, unfiltered
///
/// Segments with an endpoint at `x == 0` or a non-finite `x` are treated as
/// tessellation artifacts and skipped.
pub fn cell_edges<T: Tessellation + ?Sized>(tessellation: &T) -> Vec<Edge> {
    let valid = |p: Point| p.x != 0.0 && p.x.is_finite();
    let mut edges = Vec::new();

    for index in 0..tessellation.len() {
        let Some(polygon) = tessellation.cell_polygon(index) else {
            log::trace!("no cell polygon for seed {}", index);
            continue;
        };

        let n = polygon.len();
        for j in 0..n {
            let from = polygon[j];
            let to = polygon[(j + 1) % n];
            if valid(from) && valid(to) {
                edges.push(Edge::new(from, to));
            }
        }
    }

    edges
}

/// Build the road network from an already-constructed tessellation
pub fn build_road_network_with<T: Tessellation + ?Sized>(
    tessellation: &T,
    config: &TownConfig,
) -> RoadNetwork {
    let raw = cell_edges(tessellation);
    let filtered = filter_border_edges(&raw, config.bound_size, config.border_merge_distance);
    let edges = remove_duplicates(&filtered);

    log::debug!(
        "[Roads] {} cell segments -> {} filtered -> {} unique",
        raw.len(),
        filtered.len(),
        edges.len()
    );

    RoadNetwork::new(edges, config.bound_size)
}

/// Build the road network for a set of seed points
///
/// Returns `None` for an empty seed set or one larger than
/// `config.max_seed_points`; no tessellation is attempted in either case.
///
/// # Example
///
/// ```rust
/// use voronoi_town::*;
///
/// let config = TownConfig::default();
/// let seeds = vec![Point::new(150.0, 300.0), Point::new(450.0, 300.0)];
/// let roads = build_road_network(&seeds, &config).unwrap();
/// assert_eq!(roads.len(), 1);
/// ```
pub fn build_road_network(points: &[Point], config: &TownConfig) -> Option<RoadNetwork> {
    if points.is_empty() {
        return None;
    }
    if points.len() > config.max_seed_points {
        log::warn!(
            "[Roads] refusing {} seed points (max {})",
            points.len(),
            config.max_seed_points
        );
        return None;
    }

    let start = Instant::now();
    let voronoi = SpadeVoronoi::new(points, config.bound_size);
    let network = build_road_network_with(&voronoi, config);
    log::debug!(
        "[Roads] {} seeds -> {} edges in {:.2?}",
        points.len(),
        network.len(),
        start.elapsed()
    );

    Some(network)
}
