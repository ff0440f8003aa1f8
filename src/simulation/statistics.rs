use std::collections::BTreeMap;

use serde::Serialize;

use crate::world::{Grid, TerrainType};

/// Per-day aggregate metrics for logging and degenerate state detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStatistics {
    pub day: u64,
    pub terrain_distribution: BTreeMap<TerrainType, u32>,
    pub avg_height: f64,
    pub avg_water_level: f64,
    pub avg_vegetation: f64,
    pub avg_temperature: f64,
    pub diversity_index: f64,
}

/// Compute statistics from `(terrain, height, water, vegetation, temperature)`
/// rows, so recorded snapshots and live grids share one path.
pub fn compute_statistics(
    day: u64,
    cells: impl IntoIterator<Item = (TerrainType, f64, f64, f64, f64)>,
) -> DayStatistics {
    let mut distribution: BTreeMap<TerrainType, u32> = BTreeMap::new();
    let mut total_height = 0.0_f64;
    let mut total_water = 0.0_f64;
    let mut total_vegetation = 0.0_f64;
    let mut total_temperature = 0.0_f64;
    let mut count = 0_u32;

    for (terrain, height, water, vegetation, temperature) in cells {
        *distribution.entry(terrain).or_insert(0) += 1;
        total_height += height;
        total_water += water;
        total_vegetation += vegetation;
        total_temperature += temperature;
        count += 1;
    }

    if count == 0 {
        return DayStatistics {
            day,
            terrain_distribution: BTreeMap::new(),
            avg_height: 0.0,
            avg_water_level: 0.0,
            avg_vegetation: 0.0,
            avg_temperature: 0.0,
            diversity_index: 0.0,
        };
    }

    let total = count as f64;
    let diversity = shannon_diversity(&distribution, count);
    DayStatistics {
        day,
        terrain_distribution: distribution,
        avg_height: total_height / total,
        avg_water_level: total_water / total,
        avg_vegetation: total_vegetation / total,
        avg_temperature: total_temperature / total,
        diversity_index: diversity,
    }
}

/// Statistics for a live grid.
pub fn grid_statistics(grid: &Grid, day: u64) -> DayStatistics {
    compute_statistics(
        day,
        grid.iter().map(|c| {
            (
                c.terrain_type,
                c.height,
                c.water_level,
                c.vegetation,
                c.temperature,
            )
        }),
    )
}

/// Shannon diversity index normalized to [0, 1].
/// 0 = every cell the same terrain, 1 = all present terrains equally common.
fn shannon_diversity(distribution: &BTreeMap<TerrainType, u32>, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let total_f = total as f64;
    let mut entropy = 0.0_f64;
    let mut non_zero_types = 0_u32;

    for &count in distribution.values() {
        if count > 0 {
            non_zero_types += 1;
            let p = count as f64 / total_f;
            entropy -= p * p.ln();
        }
    }

    if non_zero_types <= 1 {
        return 0.0;
    }

    // Normalize by ln of the number of terrains present
    entropy / (non_zero_types as f64).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Axial, Cell};

    fn make_test_grid(terrains: &[TerrainType]) -> Grid {
        let cells = terrains
            .iter()
            .enumerate()
            .map(|(i, &t)| Cell::new_default(Axial::new(i as i32, 0), t))
            .collect();
        Grid::from_cells(cells)
    }

    #[test]
    fn compute_statistics_basic_averages() {
        let mut grid = make_test_grid(&[TerrainType::Plains; 3]);
        for (i, cell) in grid.iter_mut().enumerate() {
            cell.height = 0.2 * (i + 1) as f64;
            cell.water_level = 0.1 * (i + 1) as f64;
            cell.vegetation = 0.3;
        }

        let stats = grid_statistics(&grid, 7);

        assert_eq!(stats.day, 7);
        assert!((stats.avg_height - 0.4).abs() < 1e-9);
        assert!((stats.avg_water_level - 0.2).abs() < 1e-9);
        assert!((stats.avg_vegetation - 0.3).abs() < 1e-9);
        assert!((stats.avg_temperature - 25.0).abs() < 1e-9);
    }

    #[test]
    fn compute_statistics_terrain_distribution() {
        let grid = make_test_grid(&[
            TerrainType::Plains,
            TerrainType::Plains,
            TerrainType::Desert,
            TerrainType::Ocean,
        ]);

        let stats = grid_statistics(&grid, 0);

        assert_eq!(stats.terrain_distribution[&TerrainType::Plains], 2);
        assert_eq!(stats.terrain_distribution[&TerrainType::Desert], 1);
        assert_eq!(stats.terrain_distribution[&TerrainType::Ocean], 1);
        assert!(!stats.terrain_distribution.contains_key(&TerrainType::Forest));
    }

    #[test]
    fn diversity_index_single_terrain_is_zero() {
        let grid = make_test_grid(&[TerrainType::Forest; 10]);
        let stats = grid_statistics(&grid, 0);
        assert_eq!(stats.diversity_index, 0.0);
    }

    #[test]
    fn diversity_index_even_mix_is_one() {
        let grid = make_test_grid(&[
            TerrainType::Plains,
            TerrainType::Desert,
            TerrainType::Ocean,
            TerrainType::Arctic,
        ]);
        let stats = grid_statistics(&grid, 0);
        // 4 equal types: entropy = ln(4), normalized = 1.0
        assert!((stats.diversity_index - 1.0).abs() < 1e-9);
    }

    #[test]
    fn diversity_index_skewed_mix_between_bounds() {
        let mut terrains = vec![TerrainType::Ocean; 9];
        terrains.push(TerrainType::Mountains);
        let stats = grid_statistics(&make_test_grid(&terrains), 0);
        assert!(stats.diversity_index > 0.0 && stats.diversity_index < 1.0);
    }

    #[test]
    fn empty_input_returns_zeroed_stats() {
        let stats = compute_statistics(3, std::iter::empty());
        assert_eq!(stats.day, 3);
        assert_eq!(stats.diversity_index, 0.0);
        assert_eq!(stats.avg_height, 0.0);
        assert!(stats.terrain_distribution.is_empty());
    }
}
