//! Town Configuration and Builder
//!
//! Every tunable used by the generation stages lives here and is passed
//! explicitly into each stage. Nothing reads ambient state.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TownError};

/// Hard cap on seed points accepted by the road network builder
pub const MAX_SEED_POINTS: usize = 500;

/// Corner radii at or below this value disable corner rounding
pub const MIN_CORNER_RADIUS: f64 = 2.0;

/// Configuration for town layout generation
///
/// All distances are in map units (canvas pixels when rendered). Most
/// numeric defaults were calibrated by eye against a 600x600 map and are
/// meant to be tuned, not treated as fixed law.
///
/// # Example
///
/// ```rust
/// use voronoi_town::*;
///
/// let config = TownConfigBuilder::new()
///     .seed(42)
///     .bound_size(800.0)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.bound_size, 800.0);
/// assert_eq!(config.building_min_distance(), 25.0);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TownConfig {
    /// Random seed for jitter and sprite selection
    pub seed: u64,

    /// Side length of the square map `[0, bound_size] x [0, bound_size]`
    pub bound_size: f64,

    /// Step of the lattice the road seeds are sampled from
    pub road_step: f64,

    /// Seeds closer than this to the frame are dropped before tessellation
    pub edge_margin: f64,

    /// Coordinate scale applied before sampling the noise field
    pub noise_scale: f64,

    /// Noise values above this threshold become road seeds
    pub road_threshold: f64,

    /// Road stroke width
    pub road_width: f64,

    /// Radius of rounded road corners (`<= 2.0` disables rounding)
    pub corner_radius: f64,

    /// Radius multiplier used for junction angles narrower than 45 degrees
    pub narrow_corner_factor: f64,

    /// Border-touching edges with endpoints closer than this are merged away
    pub border_merge_distance: f64,

    /// Maximum number of seed points accepted
    pub max_seed_points: usize,

    /// Building sites per unit of interior road length
    pub building_density: f64,

    /// Scale applied to building sprites
    pub sprite_scale: f64,

    /// Number of building sprite variants
    pub sprite_count: usize,

    /// `min_distance = round(sprite_scale * building_clearance_factor)`
    pub building_clearance_factor: f64,

    /// Offset from the road is `min_distance + building_offset_margin`
    pub building_offset_margin: f64,

    /// Road clearance is `min_distance - building_road_slack`
    pub building_road_slack: f64,

    /// Site spacing is `min_distance ^ building_spacing_exponent`
    pub building_spacing_exponent: f64,

    /// Uniform jitter applied to each coordinate of a sampling point
    pub building_jitter: f64,

    /// Step of the forest lattice
    pub forest_step: f64,

    /// Noise values above this threshold become forest lattice points
    pub forest_threshold: f64,

    /// Coordinate scale applied before sampling the forest lattice
    ///
    /// One lattice step should cover well under one noise feature, otherwise
    /// the lattice samples uncorrelated values and hole filling spreads it
    /// across the whole map.
    pub forest_noise_scale: f64,

    /// Base distance kept clear of roads and buildings
    pub forest_clearance: f64,

    /// Extra distance kept clear around each building
    pub forest_building_margin: f64,

    /// More forest tiles than this is reported as a generation failure
    pub max_forest_tiles: usize,
}

impl TownConfig {
    /// Minimum distance between a building site and its road
    #[inline]
    pub fn building_min_distance(&self) -> f64 {
        (self.sprite_scale * self.building_clearance_factor).round()
    }

    /// Perpendicular offset of building candidates from the road centerline
    #[inline]
    pub fn building_offset(&self) -> f64 {
        (self.sprite_scale * self.building_clearance_factor + self.building_offset_margin).round()
    }

    /// Minimum point-to-segment distance between a site and any road
    #[inline]
    pub fn building_road_clearance(&self) -> f64 {
        self.building_min_distance() - self.building_road_slack
    }

    /// Minimum distance between two accepted building sites
    #[inline]
    pub fn building_spacing(&self) -> f64 {
        self.building_min_distance().powf(self.building_spacing_exponent)
    }

    /// Forest points closer than this to a road centerline are removed
    #[inline]
    pub fn forest_road_clearance(&self) -> f64 {
        self.forest_clearance + self.road_width
    }

    /// Forest points closer than this to a building site are removed
    #[inline]
    pub fn forest_building_clearance(&self) -> f64 {
        self.forest_clearance * self.sprite_scale + self.forest_building_margin
    }

    /// Whether junctions get rounded corner wedges
    #[inline]
    pub fn rounds_corners(&self) -> bool {
        self.corner_radius > MIN_CORNER_RADIUS
    }
}

impl Default for TownConfig {
    fn default() -> Self {
        TownConfigBuilder::new().seed(0).into_config()
    }
}

/// Builder for creating TownConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_town::*;
///
/// let config = TownConfigBuilder::new()
///     .seed(7)
///     .road_step(40.0)
///     .unwrap()
///     .building_density(0.05)
///     .unwrap()
///     .corner_radius(0.0)
///     .build()
///     .unwrap();
///
/// assert!(!config.rounds_corners());
/// assert_eq!(config.edge_margin, 50.0);
/// ```
#[derive(Debug, Clone)]
pub struct TownConfigBuilder {
    seed: Option<u64>,
    bound_size: f64,
    road_step: f64,
    edge_margin: Option<f64>,
    noise_scale: f64,
    road_threshold: f64,
    road_width: f64,
    corner_radius: f64,
    narrow_corner_factor: f64,
    border_merge_distance: f64,
    max_seed_points: usize,
    building_density: f64,
    sprite_scale: f64,
    sprite_count: usize,
    building_clearance_factor: f64,
    building_offset_margin: f64,
    building_road_slack: f64,
    building_spacing_exponent: f64,
    building_jitter: f64,
    forest_step: f64,
    forest_threshold: f64,
    forest_noise_scale: f64,
    forest_clearance: f64,
    forest_building_margin: f64,
    max_forest_tiles: usize,
}

impl TownConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - bound_size: 600, road_step: 60, edge_margin: road_step + 10
    /// - road_width: 10, corner_radius: 5
    /// - building_density: 0.1, sprite_scale: 0.5, sprite_count: 8
    /// - forest_step: 20, forest_clearance: 20, max_forest_tiles: 300
    /// - forest_noise_scale: 0.01, forest_threshold: 0.5
    pub fn new() -> Self {
        Self {
            seed: None,
            bound_size: 600.0,
            road_step: 60.0,
            edge_margin: None,
            noise_scale: 0.1,
            road_threshold: 0.0,
            road_width: 10.0,
            corner_radius: 5.0,
            narrow_corner_factor: 0.5,
            border_merge_distance: 50.0,
            max_seed_points: MAX_SEED_POINTS,
            building_density: 0.1,
            sprite_scale: 0.5,
            sprite_count: 8,
            building_clearance_factor: 50.0,
            building_offset_margin: 5.0,
            building_road_slack: 5.0,
            building_spacing_exponent: 1.1,
            building_jitter: 3.0,
            forest_step: 20.0,
            forest_threshold: 0.5,
            forest_noise_scale: 0.01,
            forest_clearance: 20.0,
            forest_building_margin: 30.0,
            max_forest_tiles: 300,
        }
    }

    /// Set the random seed used for jitter and sprite selection
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the map side length
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if size <= 0.0
    pub fn bound_size(mut self, size: f64) -> Result<Self> {
        self.bound_size = positive("bound_size", size)?;
        Ok(self)
    }

    /// Set the seed lattice step
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if step <= 0.0
    pub fn road_step(mut self, step: f64) -> Result<Self> {
        self.road_step = positive("road_step", step)?;
        Ok(self)
    }

    /// Override the seed pre-filter margin (defaults to `road_step + 10`)
    pub fn edge_margin(mut self, margin: f64) -> Self {
        self.edge_margin = Some(margin);
        self
    }

    pub fn noise_scale(mut self, scale: f64) -> Self {
        self.noise_scale = scale;
        self
    }

    pub fn road_threshold(mut self, threshold: f64) -> Self {
        self.road_threshold = threshold;
        self
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if width is negative
    pub fn road_width(mut self, width: f64) -> Result<Self> {
        self.road_width = non_negative("road_width", width)?;
        Ok(self)
    }

    /// Set the corner radius; values at or below 2.0 disable rounding
    pub fn corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` unless 0.0 < factor <= 1.0
    pub fn narrow_corner_factor(mut self, factor: f64) -> Result<Self> {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(TownError::InvalidConfig(format!(
                "narrow_corner_factor must be in (0, 1] (got {})",
                factor
            )));
        }
        self.narrow_corner_factor = factor;
        Ok(self)
    }

    pub fn border_merge_distance(mut self, distance: f64) -> Result<Self> {
        self.border_merge_distance = non_negative("border_merge_distance", distance)?;
        Ok(self)
    }

    /// Lower the seed point cap
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if max exceeds the hard cap of 500
    pub fn max_seed_points(mut self, max: usize) -> Result<Self> {
        if max > MAX_SEED_POINTS {
            return Err(TownError::InvalidConfig(format!(
                "max_seed_points must be <= {} (got {})",
                MAX_SEED_POINTS, max
            )));
        }
        self.max_seed_points = max;
        Ok(self)
    }

    /// Set building sites per unit of road length
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if density is negative
    pub fn building_density(mut self, density: f64) -> Result<Self> {
        self.building_density = non_negative("building_density", density)?;
        Ok(self)
    }

    pub fn sprite_scale(mut self, scale: f64) -> Result<Self> {
        self.sprite_scale = positive("sprite_scale", scale)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if count is 0
    pub fn sprite_count(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(TownError::InvalidConfig(
                "sprite_count must be at least 1".to_string(),
            ));
        }
        self.sprite_count = count;
        Ok(self)
    }

    pub fn building_clearance_factor(mut self, factor: f64) -> Result<Self> {
        self.building_clearance_factor = positive("building_clearance_factor", factor)?;
        Ok(self)
    }

    pub fn building_offset_margin(mut self, margin: f64) -> Self {
        self.building_offset_margin = margin;
        self
    }

    pub fn building_road_slack(mut self, slack: f64) -> Self {
        self.building_road_slack = slack;
        self
    }

    pub fn building_spacing_exponent(mut self, exponent: f64) -> Result<Self> {
        self.building_spacing_exponent = positive("building_spacing_exponent", exponent)?;
        Ok(self)
    }

    pub fn building_jitter(mut self, jitter: f64) -> Result<Self> {
        self.building_jitter = non_negative("building_jitter", jitter)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if step <= 0.0
    pub fn forest_step(mut self, step: f64) -> Result<Self> {
        self.forest_step = positive("forest_step", step)?;
        Ok(self)
    }

    pub fn forest_threshold(mut self, threshold: f64) -> Self {
        self.forest_threshold = threshold;
        self
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if scale <= 0.0
    pub fn forest_noise_scale(mut self, scale: f64) -> Result<Self> {
        self.forest_noise_scale = positive("forest_noise_scale", scale)?;
        Ok(self)
    }

    pub fn forest_clearance(mut self, clearance: f64) -> Result<Self> {
        self.forest_clearance = non_negative("forest_clearance", clearance)?;
        Ok(self)
    }

    pub fn forest_building_margin(mut self, margin: f64) -> Self {
        self.forest_building_margin = margin;
        self
    }

    pub fn max_forest_tiles(mut self, max: usize) -> Self {
        self.max_forest_tiles = max;
        self
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either lattice step does not fit inside
    /// the map
    pub fn build(self) -> Result<TownConfig> {
        for (name, step) in [("road_step", self.road_step), ("forest_step", self.forest_step)] {
            if step >= self.bound_size {
                return Err(TownError::InvalidConfig(format!(
                    "{} ({}) must be smaller than bound_size ({})",
                    name, step, self.bound_size
                )));
            }
        }
        Ok(self.into_config())
    }

    fn into_config(self) -> TownConfig {
        let seed = self.seed.unwrap_or_else(|| rand::random());
        TownConfig {
            seed,
            bound_size: self.bound_size,
            road_step: self.road_step,
            edge_margin: self.edge_margin.unwrap_or(self.road_step + 10.0),
            noise_scale: self.noise_scale,
            road_threshold: self.road_threshold,
            road_width: self.road_width,
            corner_radius: self.corner_radius,
            narrow_corner_factor: self.narrow_corner_factor,
            border_merge_distance: self.border_merge_distance,
            max_seed_points: self.max_seed_points,
            building_density: self.building_density,
            sprite_scale: self.sprite_scale,
            sprite_count: self.sprite_count,
            building_clearance_factor: self.building_clearance_factor,
            building_offset_margin: self.building_offset_margin,
            building_road_slack: self.building_road_slack,
            building_spacing_exponent: self.building_spacing_exponent,
            building_jitter: self.building_jitter,
            forest_step: self.forest_step,
            forest_threshold: self.forest_threshold,
            forest_noise_scale: self.forest_noise_scale,
            forest_clearance: self.forest_clearance,
            forest_building_margin: self.forest_building_margin,
            max_forest_tiles: self.max_forest_tiles,
        }
    }
}

impl Default for TownConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn positive(name: &str, value: f64) -> Result<f64> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(TownError::InvalidConfig(format!(
            "{} must be positive (got {})",
            name, value
        )));
    }
    Ok(value)
}

fn non_negative(name: &str, value: f64) -> Result<f64> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(TownError::InvalidConfig(format!(
            "{} must be >= 0 (got {})",
            name, value
        )));
    }
    Ok(value)
}
