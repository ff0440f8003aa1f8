use std::collections::BTreeMap;

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::config::preset::Preset;
use crate::world::cell::TerrainType;
use crate::world::grid::Grid;
use crate::world::noise_field::{NoiseField, NoiseParams};

/// Upper bound of a drawn generation seed.
pub const MAX_DRAWN_SEED: u32 = 10_000;
/// Heights above this are mountains, and take snow.
pub const MOUNTAIN_HEIGHT: f64 = 0.6;
/// Lower bound of the plains/forest band.
pub const LOWLAND_HEIGHT: f64 = 0.3;
/// Per-call water loss for cells above the water table.
pub const WATER_DECAY: f64 = 0.01;
/// Water level cap right after the water table is applied.
pub const GENERATION_WATER_CAP: f64 = 0.2;

const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum GenerationError {
    #[error("terrain mixing needs at least one preset")]
    NoPresets,
    #[error("terrain mixing has {presets} presets but {weights} weights")]
    WeightCountMismatch { presets: usize, weights: usize },
    #[error("terrain mixing weights must be non-negative and sum to 1, got {weights:?} (sum {sum})")]
    InvalidWeights { weights: Vec<f64>, sum: f64 },
}

/// Builds and shapes the height field of a grid from one base preset.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    noise: NoiseParams,
    water_level: f64,
}

impl TerrainGenerator {
    pub fn new(noise: NoiseParams, water_level: f64) -> Self {
        Self { noise, water_level }
    }

    pub fn from_preset(preset: &Preset) -> Self {
        Self::new(preset.noise_params(), preset.water_level)
    }

    pub fn water_level(&self) -> f64 {
        self.water_level
    }

    /// Create one cell per axial coordinate within `radius`. Each cell's
    /// starting terrain type is the type of a uniformly drawn region preset.
    pub fn initialize_grid(radius: u32, region_presets: &[Preset], rng: &mut impl Rng) -> Grid {
        Grid::hexagon(radius, |_| {
            region_presets
                .choose(&mut *rng)
                .map(|p| p.terrain_type)
                .unwrap_or(TerrainType::Default)
        })
    }

    /// Fill heights from noise and reclassify every cell by height.
    ///
    /// Without a seed one is drawn from `rng`. Returns the seed used.
    /// Classification runs on raw noise values, before normalization, and
    /// replaces whatever terrain types the grid held.
    pub fn generate(&self, grid: &mut Grid, seed: Option<u32>, rng: &mut impl Rng) -> u32 {
        let seed = seed.unwrap_or_else(|| rng.gen_range(0..MAX_DRAWN_SEED));
        let field = NoiseField::new(seed, self.noise);

        for cell in grid.iter_mut() {
            cell.height = field.sample_axial(cell.coord.q, cell.coord.r);
            cell.terrain_type = self.classify(cell.height, rng);
        }

        debug!(seed, cells = grid.len(), "Generated height field");
        seed
    }

    fn classify(&self, height: f64, rng: &mut impl Rng) -> TerrainType {
        if height < self.water_level {
            TerrainType::Ocean
        } else if height > MOUNTAIN_HEIGHT {
            TerrainType::Mountains
        } else if height > LOWLAND_HEIGHT {
            if rng.gen_bool(0.5) {
                TerrainType::Plains
            } else {
                TerrainType::Forest
            }
        } else if rng.gen_bool(0.3) {
            TerrainType::Desert
        } else {
            TerrainType::Plains
        }
    }

    /// Rescale heights linearly onto [0, 1]. A flat grid is left unchanged.
    pub fn normalize(grid: &mut Grid) {
        let Some((min, max)) = height_range(grid) else {
            return;
        };
        if max <= min {
            return;
        }
        let span = max - min;
        for cell in grid.iter_mut() {
            cell.height = (cell.height - min) / span;
        }
    }

    /// Lay down the baseline water table. Cells below the configured level
    /// are filled up to it, others dry out by `WATER_DECAY`; every cell ends
    /// at or below `GENERATION_WATER_CAP`.
    pub fn apply_water(&self, grid: &mut Grid) {
        for cell in grid.iter_mut() {
            if cell.height < self.water_level {
                cell.water_level = cell.water_level.max(self.water_level);
            } else {
                cell.water_level = (cell.water_level - WATER_DECAY).max(0.0);
            }
            cell.water_level = cell.water_level.min(GENERATION_WATER_CAP);
        }
    }

    /// Give every cell the terrain type of one of `configs`, drawn per cell
    /// with probability `weights[i]` (uniform when `None`).
    ///
    /// This is a categorical reassignment; heights are not blended. Weights
    /// must sum to 1 and are never renormalized.
    pub fn mix_terrains(
        grid: &mut Grid,
        configs: &[Preset],
        weights: Option<&[f64]>,
        rng: &mut impl Rng,
    ) -> Result<(), GenerationError> {
        if configs.is_empty() {
            return Err(GenerationError::NoPresets);
        }
        let weights: Vec<f64> = match weights {
            Some(w) => w.to_vec(),
            None => vec![1.0 / configs.len() as f64; configs.len()],
        };
        if weights.len() != configs.len() {
            return Err(GenerationError::WeightCountMismatch {
                presets: configs.len(),
                weights: weights.len(),
            });
        }
        let sum: f64 = weights.iter().sum();
        let all_valid = weights.iter().all(|w| w.is_finite() && *w >= 0.0);
        if !all_valid || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(GenerationError::InvalidWeights { weights, sum });
        }

        let dist = WeightedIndex::new(&weights)
            .map_err(|_| GenerationError::InvalidWeights { weights: weights.clone(), sum })?;
        for cell in grid.iter_mut() {
            cell.terrain_type = configs[dist.sample(rng)].terrain_type;
        }
        Ok(())
    }

    /// Jitter every height by `U(-intensity, intensity)`, clamped to [0, 1].
    pub fn add_random_variation(grid: &mut Grid, intensity: f64, rng: &mut impl Rng) {
        if intensity <= 0.0 {
            return;
        }
        for cell in grid.iter_mut() {
            let delta = rng.gen_range(-intensity..=intensity);
            cell.height = (cell.height + delta).clamp(0.0, 1.0);
        }
    }
}

/// Smallest and largest height in the grid, `None` when empty.
pub fn height_range(grid: &Grid) -> Option<(f64, f64)> {
    grid.iter().map(|c| c.height).fold(None, |acc, h| match acc {
        None => Some((h, h)),
        Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
    })
}

/// Cell count per terrain type, in `TerrainType` order.
pub fn terrain_counts(grid: &Grid) -> BTreeMap<TerrainType, u32> {
    let mut counts = BTreeMap::new();
    for cell in grid.iter() {
        *counts.entry(cell.terrain_type).or_insert(0) += 1;
    }
    counts
}

/// Print a summary of the grid.
pub fn print_grid_summary(grid: &Grid, seed: u64) {
    println!("=== Terrain Summary ===");
    println!("Cells: {} (radius {})", grid.len(), grid.radius());
    println!("Seed: {}", seed);

    if let Some((lo, hi)) = height_range(grid) {
        println!("Height: {:.3} .. {:.3}", lo, hi);
    }

    let total = grid.len().max(1) as f32;
    println!("\nTerrain:");
    for (terrain, count) in terrain_counts(grid) {
        let pct = count as f32 / total * 100.0;
        println!("  {:<12} {:>6} ({:.1}%)", terrain.name(), count, pct);
    }

    let n = grid.len().max(1) as f64;
    let water: f64 = grid.iter().map(|c| c.water_level).sum();
    let vegetation: f64 = grid.iter().map(|c| c.vegetation).sum();
    println!("\nMean water level: {:.3}", water / n);
    println!("Mean vegetation:  {:.3}", vegetation / n);
}
