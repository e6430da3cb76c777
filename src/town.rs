//! TownLayout: every generation stage run in order

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::buildings::{place_buildings, BuildingSite};
use crate::config::TownConfig;
use crate::connectors::route_connectors;
use crate::corners::{compute_corner_wedges, CornerWedge};
use crate::error::{Result, TownError};
use crate::forest::{generate_forest, ForestTile};
use crate::generation::{build_road_network, sample_lattice, RoadNetwork, SeedField};
use crate::geometry::{Edge, Point};

/// A complete generated town
///
/// Each stage consumes the outputs of the previous ones and nothing is
/// mutated after construction. A change of seeds or configuration means
/// generating a new layout.
///
/// # Example
///
/// ```
/// use voronoi_town::*;
///
/// let config = TownConfigBuilder::new().seed(7).build().unwrap();
/// let layout = TownLayout::from_noise(&config, &NoiseSeedField::new(7)).unwrap();
///
/// println!(
///     "{} roads, {} buildings, {} corners",
///     layout.roads().len(),
///     layout.buildings().len(),
///     layout.corners().len()
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TownLayout {
    config: TownConfig,
    roads: RoadNetwork,
    buildings: Vec<BuildingSite>,
    connectors: Vec<Edge>,
    corners: Vec<CornerWedge>,
    /// Forest failure does not invalidate the other stages
    forest: Result<Vec<ForestTile>>,
}

impl TownLayout {
    /// Generate a layout from road seeds and a forest lattice
    ///
    /// Randomness is drawn from a `ChaCha8Rng` seeded with `config.seed`, so
    /// the same inputs always produce the same layout.
    ///
    /// # Errors
    ///
    /// [`TownError::InputTooLarge`] when `seeds` holds more than
    /// `config.max_seed_points` points. Forest over-generation is not an
    /// error here; it is reported through [`TownLayout::forest`].
    pub fn generate(config: &TownConfig, seeds: &[Point], forest_lattice: &[Point]) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::generate_with_rng(config, seeds, forest_lattice, &mut rng)
    }

    /// Like [`TownLayout::generate`] with a caller-supplied random source
    pub fn generate_with_rng<R: Rng + ?Sized>(
        config: &TownConfig,
        seeds: &[Point],
        forest_lattice: &[Point],
        rng: &mut R,
    ) -> Result<Self> {
        if seeds.len() > config.max_seed_points {
            log::warn!(
                "[Town] {} seed points exceed the limit of {}",
                seeds.len(),
                config.max_seed_points
            );
            return Err(TownError::InputTooLarge {
                count: seeds.len(),
                max: config.max_seed_points,
            });
        }

        let start = Instant::now();

        let kept = prefilter_seeds(seeds, config);
        let roads = build_road_network(&kept, config)
            .unwrap_or_else(|| RoadNetwork::empty(config.bound_size));

        let buildings = place_buildings(&roads, config, rng);
        let connectors = route_connectors(roads.edges(), &buildings);

        let corners = if config.rounds_corners() {
            compute_corner_wedges(
                roads.edges(),
                config.road_width,
                config.corner_radius,
                config.narrow_corner_factor,
            )
        } else {
            Vec::new()
        };

        let tiles = generate_forest(forest_lattice, roads.edges(), &buildings, config);
        let forest = if tiles.len() > config.max_forest_tiles {
            log::warn!(
                "[Town] forest produced {} tiles (max {}), dropping it",
                tiles.len(),
                config.max_forest_tiles
            );
            Err(TownError::OverGeneration {
                tiles: tiles.len(),
                max: config.max_forest_tiles,
            })
        } else {
            Ok(tiles)
        };

        log::debug!(
            "[Town] {}/{} seeds kept, {} roads, {} buildings, {} corners in {:.2?}",
            kept.len(),
            seeds.len(),
            roads.len(),
            buildings.len(),
            corners.len(),
            start.elapsed()
        );

        Ok(Self {
            config: *config,
            roads,
            buildings,
            connectors,
            corners,
            forest,
        })
    }

    /// Sample road seeds and the forest lattice from `field`, then generate
    ///
    /// Road seeds are lattice points at `road_step` whose value at
    /// `noise_scale` exceeds `road_threshold`. Forest points use
    /// `forest_step`, `forest_noise_scale` and `forest_threshold`.
    pub fn from_noise<F: SeedField + ?Sized>(config: &TownConfig, field: &F) -> Result<Self> {
        let seeds = sample_lattice(
            field,
            config.bound_size,
            config.road_step,
            config.noise_scale,
            config.road_threshold,
        );
        let forest = sample_lattice(
            field,
            config.bound_size,
            config.forest_step,
            config.forest_noise_scale,
            config.forest_threshold,
        );
        Self::generate(config, &seeds.above, &forest.above)
    }

    pub fn config(&self) -> &TownConfig {
        &self.config
    }

    pub fn roads(&self) -> &RoadNetwork {
        &self.roads
    }

    pub fn buildings(&self) -> &[BuildingSite] {
        &self.buildings
    }

    /// One connector per building, in building order
    pub fn connectors(&self) -> &[Edge] {
        &self.connectors
    }

    /// Empty when corner rounding is disabled
    pub fn corners(&self) -> &[CornerWedge] {
        &self.corners
    }

    /// Forest tiles, or the over-generation error
    pub fn forest(&self) -> std::result::Result<&[ForestTile], &TownError> {
        self.forest.as_deref()
    }
}

/// Drop seeds within `edge_margin` of the frame
///
/// A seed survives only when both coordinates lie strictly inside
/// `(edge_margin, bound_size - edge_margin)`.
pub fn prefilter_seeds(seeds: &[Point], config: &TownConfig) -> Vec<Point> {
    let low = config.edge_margin;
    let high = config.bound_size - config.edge_margin;
    seeds
        .iter()
        .copied()
        .filter(|p| p.x > low && p.x < high && p.y > low && p.y < high)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TownConfigBuilder;
    use crate::generation::NoiseSeedField;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_prefilter_drops_frame_seeds() {
        let config = TownConfig::default();
        let seeds = vec![p(70.0, 300.0), p(71.0, 300.0), p(300.0, 530.0), p(300.0, 529.0)];
        assert_eq!(prefilter_seeds(&seeds, &config), vec![p(71.0, 300.0), p(300.0, 529.0)]);
    }

    #[test]
    fn test_oversized_input_is_rejected() {
        let config = TownConfig::default();
        let seeds: Vec<Point> = (0..501).map(|i| p(100.0 + (i % 20) as f64, 100.0 + (i / 20) as f64)).collect();
        let err = TownLayout::generate(&config, &seeds, &[]).unwrap_err();
        assert_eq!(err, TownError::InputTooLarge { count: 501, max: 500 });
    }

    #[test]
    fn test_empty_input_gives_empty_layout() {
        let config = TownConfig::default();
        let layout = TownLayout::generate(&config, &[], &[]).unwrap();
        assert!(layout.roads().is_empty());
        assert!(layout.buildings().is_empty());
        assert!(layout.connectors().is_empty());
        assert!(layout.corners().is_empty());
        assert_eq!(layout.forest().unwrap().len(), 0);
    }

    #[test]
    fn test_two_seeds_make_one_road_and_no_buildings() {
        let config = TownConfig::default();
        let layout = TownLayout::generate(&config, &[p(150.0, 300.0), p(450.0, 300.0)], &[]).unwrap();
        assert_eq!(layout.roads().len(), 1);
        assert_eq!(layout.roads().interior_edges().count(), 0);
        assert!(layout.buildings().is_empty());
    }

    #[test]
    fn test_connectors_match_buildings() {
        let config = TownConfigBuilder::new().seed(11).build().unwrap();
        let seeds = vec![
            p(150.0, 150.0),
            p(450.0, 160.0),
            p(300.0, 300.0),
            p(140.0, 440.0),
            p(460.0, 450.0),
        ];
        let layout = TownLayout::generate(&config, &seeds, &[]).unwrap();
        assert!(layout.roads().interior_edges().count() > 0);
        assert_eq!(layout.connectors().len(), layout.buildings().len());
        for (connector, site) in layout.connectors().iter().zip(layout.buildings()) {
            assert_eq!(connector.from, site.position);
        }
        assert!(!layout.corners().is_empty());
    }

    #[test]
    fn test_small_radius_disables_corners() {
        let config = TownConfigBuilder::new().corner_radius(2.0).build().unwrap();
        let seeds = vec![p(150.0, 150.0), p(450.0, 160.0), p(300.0, 300.0), p(140.0, 440.0)];
        let layout = TownLayout::generate(&config, &seeds, &[]).unwrap();
        assert!(!layout.roads().is_empty());
        assert!(layout.corners().is_empty());
    }

    #[test]
    fn test_forest_overgeneration_keeps_other_stages() {
        let config = TownConfigBuilder::new().max_forest_tiles(3).build().unwrap();
        let seeds = vec![p(150.0, 300.0), p(450.0, 300.0)];
        let lattice: Vec<Point> = (0..5).map(|i| p(60.0 + i as f64 * 20.0, 100.0)).collect();

        let layout = TownLayout::generate(&config, &seeds, &lattice).unwrap();
        assert_eq!(layout.roads().len(), 1);
        match layout.forest() {
            Err(TownError::OverGeneration { max, .. }) => assert_eq!(*max, 3),
            other => panic!("expected over-generation, got {:?}", other),
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = TownConfigBuilder::new().seed(2024).build().unwrap();
        let field = NoiseSeedField::new(5);
        let a = TownLayout::from_noise(&config, &field).unwrap();
        let b = TownLayout::from_noise(&config, &field).unwrap();
        assert_eq!(a.roads(), b.roads());
        assert_eq!(a.buildings(), b.buildings());
        assert_eq!(a.corners(), b.corners());
        assert!(a.forest().is_ok());
        assert_eq!(a.forest().unwrap(), b.forest().unwrap());
    }

    fn assert_forest_clear(layout: &TownLayout) {
        let config = layout.config();
        let road_sq = config.forest_road_clearance().powi(2);
        let building_sq = config.forest_building_clearance().powi(2);
        for tile in layout.forest().unwrap() {
            for road in layout.roads().edges() {
                assert!(road.distance_squared_to(tile.position) >= road_sq);
            }
            for site in layout.buildings() {
                assert!(site.position.distance_squared(tile.position) >= building_sq);
            }
        }
    }

    #[test]
    fn test_forest_grows_beside_a_road() {
        let config = TownConfig::default();
        let seeds = vec![p(150.0, 300.0), p(450.0, 300.0)];
        let lattice: Vec<Point> = (0..3)
            .flat_map(|i| (0..3).map(move |j| p(60.0 + i as f64 * 20.0, 100.0 + j as f64 * 20.0)))
            .collect();

        let layout = TownLayout::generate(&config, &seeds, &lattice).unwrap();
        let tiles = layout.forest().unwrap();

        // The block plus two probe rows on each side
        assert_eq!(tiles.len(), 9 + 4 * 2 * 3);
        let center = tiles.iter().find(|t| t.position == p(80.0, 120.0)).unwrap();
        assert_eq!(center.tile, crate::forest::TileKind::Center);
        assert_forest_clear(&layout);
    }

    #[test]
    fn test_default_noise_forest_fits_tile_cap() {
        let mut total = 0;
        for seed in 0..8u64 {
            let config = TownConfigBuilder::new().seed(seed).build().unwrap();
            let layout = TownLayout::from_noise(&config, &NoiseSeedField::new(seed as u32)).unwrap();
            let tiles = layout.forest().unwrap();
            assert!(tiles.len() <= config.max_forest_tiles);
            assert_forest_clear(&layout);
            total += tiles.len();
        }
        assert!(total > 0);
    }
}
