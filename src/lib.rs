//! Procedural town layouts from Voronoi road networks
//!
//! Seed points scattered over a square map are partitioned into Voronoi
//! cells whose boundaries become roads. Buildings are sampled along the
//! roads, each gets a connector path to its nearest road, junctions get
//! rounded corner geometry, and a forest fringe fills the space left over.
//! Everything produced here is geometry; painting it is up to the caller.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_town::*;
//!
//! let config = TownConfigBuilder::new()
//!     .seed(42)
//!     .bound_size(600.0).unwrap()
//!     .road_step(60.0).unwrap()
//!     .build().unwrap();
//!
//! let layout = TownLayout::from_noise(&config, &NoiseSeedField::new(42)).unwrap();
//! println!("Generated {} roads", layout.roads().len());
//!
//! match layout.forest() {
//!     Ok(tiles) => println!("{} forest tiles", tiles.len()),
//!     Err(err) => eprintln!("{}", err),
//! }
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): KD-tree lookups for the forest clearance filter
//! - `serde`: Serialization support for configuration and generated geometry

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod generation;
pub mod buildings;
pub mod connectors;
pub mod corners;
pub mod forest;
pub mod town;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{TownError, Result};
pub use config::{TownConfig, TownConfigBuilder, MAX_SEED_POINTS, MIN_CORNER_RADIUS};
pub use geometry::{Edge, Point};
pub use generation::{
    build_road_network, build_road_network_with, sample_lattice, LatticeSample,
    NoiseSeedField, RoadNetwork, RoadStroke, SeedField, SpadeVoronoi, Tessellation,
};
pub use buildings::{place_buildings, BuildingSite};
pub use connectors::{nearest_road_point, route_connectors};
pub use corners::{compute_corner_wedges, CornerWedge, EraseCircle};
pub use forest::{generate_forest, ForestTile, TileKind};
pub use town::TownLayout;

#[cfg(feature = "spatial-index")]
pub use spatial::SiteIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
