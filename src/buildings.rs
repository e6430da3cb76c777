//! Building site placement along interior roads
//!
//! Each interior road edge is sampled at a fixed linear density. Every
//! sampling point yields two candidates, one on each side of the road, which
//! must keep clear of all roads and of previously accepted sites.

use glam::DVec2;
use rand::Rng;
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::TownConfig;
use crate::generation::RoadNetwork;
use crate::geometry::{convex_hull, ensure_clockwise, Edge, Point};

/// A placed building
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingSite {
    /// Center of the building sprite
    pub position: Point,
    /// Direction angle (radians) of the road edge the site was sampled from
    pub angle: f64,
    /// Sprite variant in `[0, sprite_count)`
    pub sprite_index: usize,
}

impl BuildingSite {
    /// Corners of the `width` x `height` sprite rectangle rotated by `angle`,
    /// in clockwise order
    pub fn footprint(&self, width: f64, height: f64) -> Vec<Point> {
        let rotation = DVec2::from_angle(self.angle);
        let (hw, hh) = (width / 2.0, height / 2.0);
        let corners = [
            DVec2::new(-hw, -hh),
            DVec2::new(hw, -hh),
            DVec2::new(hw, hh),
            DVec2::new(-hw, hh),
        ]
        .iter()
        .map(|&c| self.position + rotation.rotate(c))
        .collect();
        ensure_clockwise(corners)
    }

    /// Outline of the shadow cast by the footprint
    ///
    /// The footprint is swept `length` units along the direction
    /// `sun_angle`; the result is the convex hull of both rectangles.
    pub fn shadow_outline(&self, width: f64, height: f64, sun_angle: f64, length: f64) -> Vec<Point> {
        let footprint = self.footprint(width, height);
        let offset = DVec2::from_angle(sun_angle) * length;
        let swept: Vec<Point> = footprint
            .iter()
            .copied()
            .chain(footprint.iter().map(|&p| p + offset))
            .collect();
        convex_hull(&swept)
    }
}

/// A candidate site before acceptance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub position: Point,
    pub angle: f64,
}

/// Raw candidates for one road edge, before any clearance or spacing check
///
/// `count = floor(length · density)` sampling points at `t = i / count` for
/// `i` in `0..=count`, each jittered by up to `building_jitter` per axis, and
/// each producing a candidate on both sides of the edge. A zero count yields
/// no candidates.
pub fn edge_candidates<R: Rng + ?Sized>(
    edge: &Edge,
    config: &TownConfig,
    rng: &mut R,
) -> Vec<Candidate> {
    let count = (edge.length() * config.building_density).floor() as usize;
    if count == 0 {
        return Vec::new();
    }

    let angle = edge.angle();
    let normal = DVec2::new(angle.sin(), -angle.cos()) * config.building_offset();
    let jitter = config.building_jitter;

    let mut candidates = Vec::with_capacity(2 * (count + 1));
    for i in 0..=count {
        let base = edge.lerp(i as f64 / count as f64);
        let dx = rng.gen_range(-jitter..=jitter);
        let dy = rng.gen_range(-jitter..=jitter);
        let jittered = base + DVec2::new(dx, dy);

        candidates.push(Candidate {
            position: jittered + normal,
            angle,
        });
        candidates.push(Candidate {
            position: jittered - normal,
            angle,
        });
    }
    candidates
}

/// Place building sites along the interior edges of `roads`
///
/// A candidate is rejected when it lies closer than
/// [`TownConfig::building_road_clearance`] to any road edge (including the
/// one that produced it) or closer than [`TownConfig::building_spacing`] to
/// an accepted site. Accepted sites get a uniformly random sprite index.
/// Only jitter and sprite selection draw from `rng`.
pub fn place_buildings<R: Rng + ?Sized>(
    roads: &RoadNetwork,
    config: &TownConfig,
    rng: &mut R,
) -> Vec<BuildingSite> {
    let start = Instant::now();
    let clearance = config.building_road_clearance().max(0.0);
    let clearance_sq = clearance * clearance;
    let spacing_sq = config.building_spacing().powi(2);
    let sprite_count = config.sprite_count.max(1);

    let too_close_to_road = |p: Point| {
        roads
            .edges()
            .iter()
            .any(|e| e.distance_squared_to(p) < clearance_sq)
    };

    let mut sites: Vec<BuildingSite> = Vec::new();
    let mut considered = 0usize;

    for edge in roads.interior_edges() {
        for candidate in edge_candidates(edge, config, rng) {
            considered += 1;
            if too_close_to_road(candidate.position) {
                continue;
            }
            if sites
                .iter()
                .any(|s| s.position.distance_squared(candidate.position) < spacing_sq)
            {
                continue;
            }
            sites.push(BuildingSite {
                position: candidate.position,
                angle: candidate.angle,
                sprite_index: rng.gen_range(0..sprite_count),
            });
        }
    }

    log::debug!(
        "[Buildings] accepted {} of {} candidates in {:.2?}",
        sites.len(),
        considered,
        start.elapsed()
    );
    sites
}
