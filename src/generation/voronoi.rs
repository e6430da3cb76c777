//! Voronoi cells clipped to the map square
//!
//! The road builder only needs one capability from a planar partition: the
//! polygon of each seed's cell. [`Tessellation`] names that capability;
//! [`SpadeVoronoi`] implements it on top of spade's Delaunay triangulation by
//! intersecting the map square with the half-planes of each Delaunay neighbor.

use spade::handles::FixedVertexHandle;
use spade::{DelaunayTriangulation, Point2, Triangulation as _};
use std::collections::HashSet;

use crate::geometry::Point;

/// Cell vertices are snapped to this grid so that a Voronoi vertex shared by
/// neighboring cells compares equal in both of them
const SNAP: f64 = 1e6;

/// A planar partition of a seed set inside a bounding square
pub trait Tessellation {
    /// Number of seed points the partition was built from
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordered boundary vertices of the cell around seed `index`
    ///
    /// Returns `None` when the cell is unavailable (duplicate seed, seed the
    /// triangulation rejected, or a cell clipped away entirely).
    fn cell_polygon(&self, index: usize) -> Option<Vec<Point>>;
}

/// Voronoi partition backed by `spade`
pub struct SpadeVoronoi {
    triangulation: DelaunayTriangulation<Point2<f64>>,
    /// Triangulation vertex per seed; `None` for rejected or repeated seeds
    handles: Vec<Option<FixedVertexHandle>>,
    bound_size: f64,
}

impl SpadeVoronoi {
    /// Triangulate `points` and prepare cells clipped to `[0, bound_size]²`
    pub fn new(points: &[Point], bound_size: f64) -> Self {
        let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
        let mut seen = HashSet::new();

        let handles = points
            .iter()
            .map(|p| {
                let handle = triangulation.insert(Point2::new(p.x, p.y)).ok()?;
                // spade hands back the existing vertex for a repeated position
                seen.insert(handle).then_some(handle)
            })
            .collect();

        Self {
            triangulation,
            handles,
            bound_size,
        }
    }

    fn bounding_square(&self) -> Vec<Point> {
        let s = self.bound_size;
        vec![
            Point::new(0.0, 0.0),
            Point::new(s, 0.0),
            Point::new(s, s),
            Point::new(0.0, s),
        ]
    }
}

impl Tessellation for SpadeVoronoi {
    fn len(&self) -> usize {
        self.handles.len()
    }

    fn cell_polygon(&self, index: usize) -> Option<Vec<Point>> {
        let handle = (*self.handles.get(index)?)?;
        let vertex = self.triangulation.vertex(handle);
        let site = Point::new(vertex.position().x, vertex.position().y);

        let mut polygon = self.bounding_square();
        for edge in vertex.out_edges() {
            let neighbor = edge.to().position();
            polygon = clip_to_half_plane(&polygon, site, Point::new(neighbor.x, neighbor.y));
            if polygon.is_empty() {
                break;
            }
        }

        let mut snapped: Vec<Point> = Vec::with_capacity(polygon.len());
        for p in polygon.into_iter().map(snap) {
            if snapped.last() != Some(&p) {
                snapped.push(p);
            }
        }
        while snapped.len() > 1 && snapped.first() == snapped.last() {
            snapped.pop();
        }

        if snapped.len() < 3 {
            log::trace!("voronoi cell {} degenerate after clipping", index);
            return None;
        }
        Some(snapped)
    }
}

/// Keep the part of a convex polygon closer to `site` than to `other`
///
/// Sutherland-Hodgman against the perpendicular bisector of `site`-`other`.
fn clip_to_half_plane(polygon: &[Point], site: Point, other: Point) -> Vec<Point> {
    let normal = other - site;
    let mid = (site + other) * 0.5;
    let side = |p: Point| (p - mid).dot(normal);

    let n = polygon.len();
    let mut out = Vec::with_capacity(n + 1);
    for i in 0..n {
        let current = polygon[i];
        let next = polygon[(i + 1) % n];
        let (sc, sn) = (side(current), side(next));

        if sc <= 0.0 {
            out.push(current);
        }
        if (sc < 0.0 && sn > 0.0) || (sc > 0.0 && sn < 0.0) {
            let t = sc / (sc - sn);
            out.push(current + (next - current) * t);
        }
    }
    out
}

fn snap(p: Point) -> Point {
    // `+ 0.0` folds -0.0 into 0.0
    Point::new((p.x * SNAP).round() / SNAP + 0.0, (p.y * SNAP).round() / SNAP + 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_seeds_split_square() {
        let points = vec![Point::new(150.0, 300.0), Point::new(450.0, 300.0)];
        let voronoi = SpadeVoronoi::new(&points, 600.0);

        let left = voronoi.cell_polygon(0).unwrap();
        let right = voronoi.cell_polygon(1).unwrap();
        assert_eq!(left.len(), 4);
        assert_eq!(right.len(), 4);
        assert!(left.iter().all(|p| p.x <= 300.0));
        assert!(right.iter().all(|p| p.x >= 300.0));
        assert!(left.contains(&Point::new(300.0, 0.0)));
        assert!(right.contains(&Point::new(300.0, 600.0)));
    }

    #[test]
    fn test_single_seed_owns_square() {
        let voronoi = SpadeVoronoi::new(&[Point::new(100.0, 100.0)], 600.0);
        let cell = voronoi.cell_polygon(0).unwrap();
        assert_eq!(cell.len(), 4);
        assert!(cell.contains(&Point::new(600.0, 600.0)));
    }

    #[test]
    fn test_duplicate_and_out_of_range_cells() {
        let points = vec![Point::new(100.0, 100.0), Point::new(100.0, 100.0)];
        let voronoi = SpadeVoronoi::new(&points, 600.0);
        assert!(voronoi.cell_polygon(0).is_some());
        assert!(voronoi.cell_polygon(1).is_none());
        assert!(voronoi.cell_polygon(2).is_none());
        assert_eq!(voronoi.len(), 2);
    }

    #[test]
    fn test_shared_vertices_match_between_cells() {
        let points = vec![
            Point::new(170.0, 130.0),
            Point::new(420.0, 210.0),
            Point::new(260.0, 440.0),
            Point::new(500.0, 480.0),
            Point::new(90.0, 350.0),
        ];
        let voronoi = SpadeVoronoi::new(&points, 600.0);
        let cells: Vec<Vec<Point>> = (0..points.len())
            .filter_map(|i| voronoi.cell_polygon(i))
            .collect();
        assert_eq!(cells.len(), points.len());

        // Every interior vertex is a Voronoi vertex shared by at least three cells
        for cell in &cells {
            for v in cell {
                let on_frame = v.x == 0.0 || v.y == 0.0 || v.x == 600.0 || v.y == 600.0;
                if on_frame {
                    continue;
                }
                let owners = cells.iter().filter(|c| c.contains(v)).count();
                assert!(owners >= 3, "vertex {:?} shared by {} cells", v, owners);
            }
        }
    }

    #[test]
    fn test_clip_keeps_site_side() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let clipped = clip_to_half_plane(&square, Point::new(2.0, 5.0), Point::new(8.0, 5.0));
        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|p| p.x <= 5.0));
    }
}
