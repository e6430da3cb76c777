//! Forest tile variants chosen from 4-neighbor adjacency

use std::f64::consts::{FRAC_PI_2, PI};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

const THREE_HALVES_PI: f64 = 3.0 * FRAC_PI_2;

/// Sprite variant of a forest tile
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// No cardinal neighbor
    Lone,
    /// Exactly one cardinal neighbor
    End,
    /// Three cardinal neighbors
    Side,
    /// Two opposite neighbors
    Sides,
    /// Two adjacent neighbors
    Corner,
    /// Fully surrounded, or an adjacent pair on a map corner
    Center,
}

/// Presence of the four cardinal lattice neighbors
///
/// `top` is the neighbor at `y - step` (y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Neighbors {
    pub fn count(&self) -> usize {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .filter(|&&present| present)
            .count()
    }

    fn is_opposite_pair(&self) -> bool {
        (self.top && self.bottom) || (self.left && self.right)
    }
}

/// A classified forest point
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestTile {
    pub position: Point,
    pub tile: TileKind,
    /// Sprite rotation in radians, absent for `Lone` and `Center`
    pub angle: Option<f64>,
}

fn end_angle(n: Neighbors) -> Option<f64> {
    if n.left {
        Some(0.0)
    } else if n.top {
        Some(FRAC_PI_2)
    } else if n.right {
        Some(PI)
    } else if n.bottom {
        Some(THREE_HALVES_PI)
    } else {
        None
    }
}

// First matching rule wins; the one-sided rules take precedence.
fn side_angle(n: Neighbors) -> Option<f64> {
    if n.left && !n.right {
        Some(0.0)
    } else if n.top && !n.bottom {
        Some(FRAC_PI_2)
    } else if n.right && !n.left {
        Some(PI)
    } else if n.bottom && !n.top {
        Some(THREE_HALVES_PI)
    } else if n.left && n.right {
        Some(0.0)
    } else if n.top && n.bottom {
        Some(FRAC_PI_2)
    } else {
        None
    }
}

fn corner_angle(n: Neighbors) -> Option<f64> {
    if n.left && n.top {
        Some(0.0)
    } else if n.top && n.right {
        Some(FRAC_PI_2)
    } else if n.right && n.bottom {
        Some(PI)
    } else if n.bottom && n.left {
        Some(THREE_HALVES_PI)
    } else {
        None
    }
}

/// Whether `p` sits exactly on one of the four corners of the map square
pub fn is_map_corner(p: Point, bound_size: f64) -> bool {
    let on_edge = |c: f64| c == 0.0 || c == bound_size;
    on_edge(p.x) && on_edge(p.y)
}

/// Pick the tile variant and rotation for a point with the given neighbors
pub fn classify(position: Point, neighbors: Neighbors, bound_size: f64) -> ForestTile {
    let (tile, angle) = match neighbors.count() {
        0 => (TileKind::Lone, None),
        1 => (TileKind::End, end_angle(neighbors)),
        2 if neighbors.is_opposite_pair() => (TileKind::Sides, side_angle(neighbors)),
        2 if is_map_corner(position, bound_size) => (TileKind::Center, None),
        2 => (TileKind::Corner, corner_angle(neighbors)),
        3 => (TileKind::Side, side_angle(neighbors)),
        _ => (TileKind::Center, None),
    };

    ForestTile {
        position,
        tile,
        angle,
    }
}
