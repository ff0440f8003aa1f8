use crate::config::preset::Preset;
use crate::world::generation::MOUNTAIN_HEIGHT;
use crate::world::{Grid, Season, TerrainType};

/// Spring → summer → autumn → winter, repeating every `days_per_season`
/// days. Starts in spring and never terminates.
#[derive(Debug, Clone)]
pub struct SeasonManager {
    days_per_season: u32,
    current_day: u64,
    season: Season,
}

impl SeasonManager {
    /// # Panics
    /// Panics if `days_per_season` is 0.
    pub fn new(days_per_season: u32) -> Self {
        assert!(days_per_season > 0, "days_per_season must be at least 1");
        Self {
            days_per_season,
            current_day: 0,
            season: Season::Spring,
        }
    }

    pub fn current_season(&self) -> Season {
        self.season
    }

    pub fn current_day(&self) -> u64 {
        self.current_day
    }

    pub fn days_per_season(&self) -> u32 {
        self.days_per_season
    }

    /// Count one elapsed day and roll the season over on its boundary.
    pub fn advance_day(&mut self) {
        self.current_day += 1;
        if self.current_day % self.days_per_season as u64 == 0 {
            self.season = self.season.next();
        }
    }

    /// Apply the current season's multipliers from `preset`.
    ///
    /// Vegetation is scaled, desert vegetation further drains by the
    /// desertification rate, and high ground gathers snow melt. A season
    /// without a table, or a missing multiplier, leaves that effect off.
    pub fn apply_seasonal_effects(&self, grid: &mut Grid, preset: &Preset) {
        let Some(effects) = preset.seasonal_effects.for_season(self.season) else {
            return;
        };
        let desertification_rate = preset.interaction_factors.desertification_rate;
        let snow_accumulation = preset.weather_impact.snow_accumulation;

        for cell in grid.iter_mut() {
            if let Some(m) = effects.vegetation_growth_multiplier {
                cell.vegetation *= m;
            }
            if let Some(m) = effects.desertification_rate_multiplier {
                if cell.terrain_type == TerrainType::Desert {
                    cell.vegetation = (cell.vegetation - desertification_rate * m).max(0.0);
                }
            }
            if let Some(m) = effects.snow_accumulation_multiplier {
                if cell.height > MOUNTAIN_HEIGHT {
                    cell.water_level += snow_accumulation * m;
                }
            }
            cell.vegetation = cell.vegetation.clamp(0.0, 1.0);
            cell.water_level = cell.water_level.clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::preset::{SeasonModifiers, SeasonalEffects};
    use crate::world::{Axial, Cell};

    fn preset_with(effects: SeasonalEffects) -> Preset {
        let mut preset = Preset::default();
        preset.interaction_factors.desertification_rate = 0.1;
        preset.weather_impact.snow_accumulation = 0.2;
        preset.seasonal_effects = effects;
        preset
    }

    fn sample_grid() -> Grid {
        let mut desert = Cell::new_default(Axial::new(0, 0), TerrainType::Desert);
        desert.vegetation = 0.5;
        desert.height = 0.2;
        let mut forest = Cell::new_default(Axial::new(1, 0), TerrainType::Forest);
        forest.vegetation = 0.9;
        forest.height = 0.4;
        let mut peak = Cell::new_default(Axial::new(0, 1), TerrainType::Mountains);
        peak.vegetation = 0.2;
        peak.height = 0.9;
        peak.water_level = 0.95;
        Grid::from_cells(vec![desert, forest, peak])
    }

    fn veg(grid: &Grid, q: i32, r: i32) -> f64 {
        grid.get(Axial::new(q, r)).unwrap().vegetation
    }

    #[test]
    fn starts_in_spring() {
        let seasons = SeasonManager::new(90);
        assert_eq!(seasons.current_season(), Season::Spring);
        assert_eq!(seasons.current_day(), 0);
    }

    #[test]
    fn season_advances_at_interval() {
        let mut seasons = SeasonManager::new(10);
        for _ in 0..9 {
            seasons.advance_day();
        }
        assert_eq!(seasons.current_season(), Season::Spring);
        seasons.advance_day();
        assert_eq!(seasons.current_season(), Season::Summer);
        assert_eq!(seasons.current_day(), 10);
    }

    #[test]
    fn season_full_cycle() {
        let days_per_season = 5;
        let mut seasons = SeasonManager::new(days_per_season);
        let mut seen = Vec::new();
        for _ in 0..4 {
            for _ in 0..days_per_season {
                seasons.advance_day();
            }
            seen.push(seasons.current_season());
        }
        assert_eq!(
            seen,
            vec![Season::Summer, Season::Autumn, Season::Winter, Season::Spring]
        );
        assert_eq!(seasons.current_day(), 20);
    }

    #[test]
    fn one_day_seasons_change_every_day() {
        let mut seasons = SeasonManager::new(1);
        seasons.advance_day();
        assert_eq!(seasons.current_season(), Season::Summer);
        seasons.advance_day();
        assert_eq!(seasons.current_season(), Season::Autumn);
    }

    #[test]
    #[should_panic(expected = "days_per_season")]
    fn zero_length_season_panics() {
        SeasonManager::new(0);
    }

    #[test]
    fn vegetation_multiplier_scales_and_clamps() {
        let preset = preset_with(SeasonalEffects {
            spring: Some(SeasonModifiers {
                vegetation_growth_multiplier: Some(1.2),
                ..Default::default()
            }),
            ..Default::default()
        });
        let mut grid = sample_grid();
        SeasonManager::new(90).apply_seasonal_effects(&mut grid, &preset);
        assert!((veg(&grid, 0, 0) - 0.6).abs() < 1e-12);
        assert_eq!(veg(&grid, 1, 0), 1.0);
        assert!((veg(&grid, 0, 1) - 0.24).abs() < 1e-12);
    }

    #[test]
    fn desertification_multiplier_only_hits_deserts() {
        let preset = preset_with(SeasonalEffects {
            spring: Some(SeasonModifiers {
                desertification_rate_multiplier: Some(2.0),
                ..Default::default()
            }),
            ..Default::default()
        });
        let mut grid = sample_grid();
        SeasonManager::new(90).apply_seasonal_effects(&mut grid, &preset);
        assert!((veg(&grid, 0, 0) - 0.3).abs() < 1e-12);
        assert_eq!(veg(&grid, 1, 0), 0.9);

        // Repeated application floors at zero.
        for _ in 0..5 {
            SeasonManager::new(90).apply_seasonal_effects(&mut grid, &preset);
        }
        assert_eq!(veg(&grid, 0, 0), 0.0);
    }

    #[test]
    fn snow_multiplier_only_hits_high_ground_and_caps() {
        let preset = preset_with(SeasonalEffects {
            winter: Some(SeasonModifiers {
                snow_accumulation_multiplier: Some(1.5),
                ..Default::default()
            }),
            ..Default::default()
        });
        let mut seasons = SeasonManager::new(1);
        for _ in 0..3 {
            seasons.advance_day();
        }
        assert_eq!(seasons.current_season(), Season::Winter);

        let mut grid = sample_grid();
        seasons.apply_seasonal_effects(&mut grid, &preset);
        assert_eq!(grid.get(Axial::new(0, 1)).unwrap().water_level, 1.0);
        assert_eq!(grid.get(Axial::new(0, 0)).unwrap().water_level, 0.0);
        assert_eq!(grid.get(Axial::new(1, 0)).unwrap().water_level, 0.0);
    }

    #[test]
    fn season_without_table_is_noop() {
        let preset = preset_with(SeasonalEffects {
            winter: Some(SeasonModifiers {
                vegetation_growth_multiplier: Some(0.0),
                ..Default::default()
            }),
            ..Default::default()
        });
        let mut grid = sample_grid();
        let before = grid.clone();
        SeasonManager::new(90).apply_seasonal_effects(&mut grid, &preset);
        assert_eq!(grid, before);
    }
}
