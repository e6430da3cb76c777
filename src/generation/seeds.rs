//! Seed lattices sampled from a 2D noise field
//!
//! Road seeds and forest lattice points both come from thresholding a
//! coherent noise field on a regular grid.

use noise::{NoiseFn, Simplex};

use crate::geometry::Point;

/// A scalar field over the map plane
pub trait SeedField {
    /// Sample the field at (already scaled) coordinates
    fn sample(&self, x: f64, y: f64) -> f64;
}

impl<F> SeedField for F
where
    F: Fn(f64, f64) -> f64,
{
    fn sample(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

/// Default field: 2D simplex noise in `[-1, 1]`
pub struct NoiseSeedField {
    noise: Simplex,
}

impl NoiseSeedField {
    pub fn new(seed: u32) -> Self {
        Self {
            noise: Simplex::new(seed),
        }
    }
}

impl SeedField for NoiseSeedField {
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.noise.get([x, y])
    }
}

/// Lattice points split by a threshold
#[derive(Debug, Clone, Default)]
pub struct LatticeSample {
    /// Points whose field value exceeds the threshold
    pub above: Vec<Point>,
    /// All remaining lattice points
    pub below: Vec<Point>,
}

/// Walk the lattice `{0, step, 2·step, …} < bound_size` on both axes and
/// split it by `field(x·scale, y·scale) > threshold`
///
/// Points come out column by column (x outer, y inner).
pub fn sample_lattice<F: SeedField + ?Sized>(
    field: &F,
    bound_size: f64,
    step: f64,
    scale: f64,
    threshold: f64,
) -> LatticeSample {
    let mut sample = LatticeSample::default();
    if !(step > 0.0) || !(bound_size > 0.0) {
        return sample;
    }

    let count = (bound_size / step).ceil() as usize;
    let coords: Vec<f64> = (0..count)
        .map(|i| i as f64 * step)
        .filter(|&c| c < bound_size)
        .collect();

    for &x in &coords {
        for &y in &coords {
            let p = Point::new(x, y);
            if field.sample(x * scale, y * scale) > threshold {
                sample.above.push(p);
            } else {
                sample.below.push(p);
            }
        }
    }

    sample
}
