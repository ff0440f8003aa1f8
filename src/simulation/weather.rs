use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::preset::WeatherImpact;
use crate::simulation::SimulationError;
use crate::world::generation::MOUNTAIN_HEIGHT;
use crate::world::Grid;

/// Rain only soaks in above this intensity.
pub const RAIN_THRESHOLD: f64 = 0.2;
/// Snow only settles on high ground above this intensity.
pub const SNOW_THRESHOLD: f64 = 0.2;
pub const WIND_EVAPORATION: f64 = 0.01;
pub const DROUGHT_RETENTION: f64 = 0.9;
pub const DROUGHT_PROBABILITY: f64 = 0.1;

/// One day's weather, shared by every cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub rain_intensity: f64,
    pub snow_intensity: f64,
    pub wind_speed: f64,
    pub drought: bool,
}

impl WeatherSample {
    /// Draw a fresh sample: rain `U(0, 0.5)`, snow `U(0, 0.3)`,
    /// wind `U(0, 0.3)`, drought with probability 0.1.
    pub fn draw(rng: &mut impl Rng) -> Self {
        Self {
            rain_intensity: rng.gen_range(0.0..0.5),
            snow_intensity: rng.gen_range(0.0..0.3),
            wind_speed: rng.gen_range(0.0..0.3),
            drought: rng.gen_bool(DROUGHT_PROBABILITY),
        }
    }
}

/// Daily weather and its effect on water levels.
#[derive(Debug, Clone)]
pub struct WeatherSystem {
    impact: WeatherImpact,
    current: Option<WeatherSample>,
}

impl WeatherSystem {
    pub fn new(impact: WeatherImpact) -> Self {
        Self {
            impact,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&WeatherSample> {
        self.current.as_ref()
    }

    pub fn generate_weather(&mut self, rng: &mut impl Rng) -> WeatherSample {
        let sample = WeatherSample::draw(rng);
        self.current = Some(sample);
        sample
    }

    /// Apply the stored sample to every cell's water level.
    ///
    /// Fails if no weather has been generated yet.
    pub fn apply_weather_effects(&self, grid: &mut Grid) -> Result<(), SimulationError> {
        let weather = self.current.ok_or(SimulationError::WeatherNotGenerated)?;

        for cell in grid.iter_mut() {
            if !weather.drought && weather.rain_intensity > RAIN_THRESHOLD {
                cell.water_level += weather.rain_intensity * self.impact.rain_absorption;
            }
            if cell.height > MOUNTAIN_HEIGHT && weather.snow_intensity > SNOW_THRESHOLD {
                cell.water_level += weather.snow_intensity * self.impact.snow_accumulation;
            }
            cell.water_level -= weather.wind_speed * WIND_EVAPORATION;
            if weather.drought {
                cell.water_level *= DROUGHT_RETENTION;
            }
            cell.water_level = cell.water_level.clamp(0.0, 1.0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Axial, Cell, TerrainType};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn impact() -> WeatherImpact {
        WeatherImpact {
            rain_absorption: 0.1,
            snow_accumulation: 0.05,
        }
    }

    fn two_cell_grid() -> Grid {
        let mut low = Cell::new_default(Axial::new(0, 0), TerrainType::Plains);
        low.height = 0.3;
        low.water_level = 0.5;
        let mut high = Cell::new_default(Axial::new(1, 0), TerrainType::Mountains);
        high.height = 0.8;
        high.water_level = 0.5;
        Grid::from_cells(vec![low, high])
    }

    fn system_with(sample: WeatherSample) -> WeatherSystem {
        let mut system = WeatherSystem::new(impact());
        system.current = Some(sample);
        system
    }

    #[test]
    fn apply_before_generate_is_state_error() {
        let system = WeatherSystem::new(impact());
        let mut grid = two_cell_grid();
        let err = system.apply_weather_effects(&mut grid).unwrap_err();
        assert!(matches!(err, SimulationError::WeatherNotGenerated));
        assert!(grid.iter().all(|c| c.water_level == 0.5));
    }

    #[test]
    fn generated_samples_within_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut system = WeatherSystem::new(impact());
        let mut droughts = 0;
        for _ in 0..10_000 {
            let w = system.generate_weather(&mut rng);
            assert!((0.0..0.5).contains(&w.rain_intensity));
            assert!((0.0..0.3).contains(&w.snow_intensity));
            assert!((0.0..0.3).contains(&w.wind_speed));
            if w.drought {
                droughts += 1;
            }
            assert_eq!(system.current(), Some(&w));
        }
        let rate = droughts as f64 / 10_000.0;
        assert!((rate - 0.1).abs() < 0.02, "drought rate {}", rate);
    }

    #[test]
    fn heavy_rain_and_snow() {
        let system = system_with(WeatherSample {
            rain_intensity: 0.4,
            snow_intensity: 0.25,
            wind_speed: 0.1,
            drought: false,
        });
        let mut grid = two_cell_grid();
        system.apply_weather_effects(&mut grid).unwrap();
        let low = grid.get(Axial::new(0, 0)).unwrap().water_level;
        let high = grid.get(Axial::new(1, 0)).unwrap().water_level;
        assert!((low - (0.5 + 0.04 - 0.001)).abs() < 1e-12, "low {}", low);
        assert!((high - (0.5 + 0.04 + 0.0125 - 0.001)).abs() < 1e-12, "high {}", high);
    }

    #[test]
    fn light_rain_only_evaporates() {
        let system = system_with(WeatherSample {
            rain_intensity: 0.2,
            snow_intensity: 0.1,
            wind_speed: 0.2,
            drought: false,
        });
        let mut grid = two_cell_grid();
        system.apply_weather_effects(&mut grid).unwrap();
        for cell in grid.iter() {
            assert!((cell.water_level - 0.498).abs() < 1e-12);
        }
    }

    #[test]
    fn drought_blocks_rain_and_dries() {
        let system = system_with(WeatherSample {
            rain_intensity: 0.45,
            snow_intensity: 0.0,
            wind_speed: 0.0,
            drought: true,
        });
        let mut grid = two_cell_grid();
        system.apply_weather_effects(&mut grid).unwrap();
        for cell in grid.iter() {
            assert!((cell.water_level - 0.45).abs() < 1e-12);
        }
    }

    #[test]
    fn water_clamped_to_unit_interval() {
        let system = system_with(WeatherSample {
            rain_intensity: 0.49,
            snow_intensity: 0.29,
            wind_speed: 0.29,
            drought: false,
        });
        let mut grid = two_cell_grid();
        grid.get_mut(Axial::new(1, 0)).unwrap().water_level = 0.999;
        grid.get_mut(Axial::new(0, 0)).unwrap().water_level = 0.0;
        let mut heavy = WeatherSystem::new(WeatherImpact {
            rain_absorption: 1.0,
            snow_accumulation: 1.0,
        });
        heavy.current = system.current;
        heavy.apply_weather_effects(&mut grid).unwrap();
        assert_eq!(grid.get(Axial::new(1, 0)).unwrap().water_level, 1.0);

        let dry = system_with(WeatherSample {
            rain_intensity: 0.0,
            snow_intensity: 0.0,
            wind_speed: 0.29,
            drought: false,
        });
        let mut grid = two_cell_grid();
        grid.iter_mut().for_each(|c| c.water_level = 0.001);
        dry.apply_weather_effects(&mut grid).unwrap();
        assert!(grid.iter().all(|c| c.water_level == 0.0));
    }
}
