//! Nearest-site lookups over building positions
//!
//! This module is only available with the `spatial-index` feature.

use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

use crate::buildings::BuildingSite;
use crate::geometry::Point;

/// KD-tree over building site positions
///
/// The forest clearance filter asks one question per lattice point: how far
/// is the closest building? With a few hundred sites and a few thousand
/// lattice points the tree beats a linear scan comfortably.
#[derive(Clone)]
pub struct SiteIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
}

impl SiteIndex {
    /// Build the index from building sites
    ///
    /// Returns `None` when there are no sites to index.
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_town::*;
    ///
    /// let sites = vec![
    ///     BuildingSite { position: Point::new(10.0, 10.0), angle: 0.0, sprite_index: 0 },
    ///     BuildingSite { position: Point::new(90.0, 90.0), angle: 0.0, sprite_index: 1 },
    /// ];
    ///
    /// let index = SiteIndex::new(&sites).unwrap();
    /// let (nearest, dist_sq) = index.nearest(Point::new(80.0, 85.0));
    /// assert_eq!(nearest, 1);
    /// assert_eq!(dist_sq, 125.0);
    /// ```
    pub fn new(sites: &[BuildingSite]) -> Option<Self> {
        if sites.is_empty() {
            return None;
        }

        let points: Vec<[f64; 2]> = sites
            .iter()
            .map(|s| [s.position.x, s.position.y])
            .collect();

        Some(Self {
            tree: ImmutableKdTree::new_from_slice(&points),
        })
    }

    /// Index of the nearest site and its squared distance to `position`
    pub fn nearest(&self, position: Point) -> (usize, f64) {
        let result = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
        (result.item, result.distance)
    }

    /// Whether any site lies strictly closer than `sqrt(dist_sq)` to `position`
    pub fn any_within(&self, position: Point, dist_sq: f64) -> bool {
        self.nearest(position).1 < dist_sq
    }
}
