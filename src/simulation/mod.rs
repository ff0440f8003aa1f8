pub mod events;
pub mod interactions;
pub mod season;
pub mod statistics;
pub mod weather;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Preset, PresetLibrary, SimulationConfig};
use crate::persistence::{SimulationHistory, Snapshot};
use crate::simulation::events::{EventEngine, EventKind};
use crate::simulation::interactions::InteractionsEngine;
use crate::simulation::season::SeasonManager;
use crate::simulation::statistics::{grid_statistics, DayStatistics};
use crate::simulation::weather::{WeatherSample, WeatherSystem};
use crate::world::{GenerationError, Grid, Season, TerrainGenerator};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("weather effects applied before any weather was generated")]
    WeatherNotGenerated,
    #[error("terrain generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("invalid simulation config:\n{0}")]
    InvalidConfig(String),
}

/// What happened on one simulated day.
#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub day: u64,
    pub season: Season,
    pub weather: WeatherSample,
    pub event: Option<EventKind>,
    pub statistics: DayStatistics,
}

/// Owns the grid and runs the daily pipeline over it.
///
/// Every random draw, including the generation seed, comes from one
/// `ChaCha8Rng` seeded at construction, so the run seed alone reproduces a
/// run.
#[derive(Debug)]
pub struct Simulation {
    preset: Preset,
    grid: Grid,
    weather: WeatherSystem,
    seasons: SeasonManager,
    interactions: InteractionsEngine,
    events: EventEngine,
    rng: ChaCha8Rng,
    seed: u64,
    generation_seed: u32,
    history: SimulationHistory,
}

impl Simulation {
    /// Build the initial grid and every phase from `config`.
    ///
    /// Unknown preset names fall back to `default` with a warning. A seed
    /// of 0 draws a fresh one.
    pub fn new(config: &SimulationConfig, presets: &PresetLibrary) -> Result<Self, SimulationError> {
        config.validate().map_err(SimulationError::InvalidConfig)?;

        let seed = if config.seed == 0 {
            rand::random::<u64>().max(1)
        } else {
            config.seed
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let preset = presets.resolve(&config.preset).clone();
        let regions: Vec<Preset> = config
            .region_presets
            .iter()
            .map(|name| presets.resolve(name).clone())
            .collect();
        if regions.is_empty() {
            warn!("No region presets configured, cells start as default terrain");
        }

        let generator = TerrainGenerator::from_preset(&preset);
        let mut grid = TerrainGenerator::initialize_grid(preset.grid_radius(), &regions, &mut rng);
        let generation_seed = generator.generate(&mut grid, None, &mut rng);
        TerrainGenerator::normalize(&mut grid);
        generator.apply_water(&mut grid);

        if let Some(blend) = &config.blend {
            let blend_presets: Vec<Preset> = blend
                .presets
                .iter()
                .map(|name| presets.resolve(name).clone())
                .collect();
            TerrainGenerator::mix_terrains(
                &mut grid,
                &blend_presets,
                blend.weights.as_deref(),
                &mut rng,
            )?;
            debug!(presets = ?blend.presets, "Blended terrain types");
        }

        TerrainGenerator::add_random_variation(&mut grid, config.random_variation, &mut rng);

        info!(
            seed,
            generation_seed,
            preset = %preset.name,
            radius = grid.radius(),
            cells = grid.len(),
            "Simulation initialized"
        );

        Ok(Self {
            weather: WeatherSystem::new(preset.weather_impact.clone()),
            seasons: SeasonManager::new(config.days_per_season),
            interactions: InteractionsEngine::new(preset.interaction_factors.clone()),
            events: EventEngine::new(),
            preset,
            grid,
            rng,
            seed,
            generation_seed,
            history: SimulationHistory::new(),
        })
    }

    /// Run one day: weather, seasonal effects, interactions, then at most
    /// one event. The resulting state is recorded before the day counter
    /// advances, so the first snapshot is day 0.
    pub fn update_day(&mut self) -> Result<DayReport, SimulationError> {
        let day = self.seasons.current_day();
        let season = self.seasons.current_season();

        let weather = self.weather.generate_weather(&mut self.rng);
        self.weather.apply_weather_effects(&mut self.grid)?;
        self.seasons.apply_seasonal_effects(&mut self.grid, &self.preset);
        self.interactions.apply_interactions(&mut self.grid);

        let event = self.events.trigger_event(&mut self.rng);
        if let Some(kind) = event {
            info!(day, event = %kind, "Event triggered");
            self.events.apply_event(kind, &mut self.grid, &mut self.rng);
        }

        self.history
            .push(Snapshot::capture(day, weather, event, &self.grid));

        let statistics = grid_statistics(&self.grid, day);
        debug!(
            day,
            season = ?season,
            rain = weather.rain_intensity,
            drought = weather.drought,
            avg_water = statistics.avg_water_level,
            avg_vegetation = statistics.avg_vegetation,
            diversity = statistics.diversity_index,
            "Day complete"
        );

        self.seasons.advance_day();

        Ok(DayReport {
            day,
            season,
            weather,
            event,
            statistics,
        })
    }

    /// Run exactly `days` days.
    pub fn run(&mut self, days: u32) -> Result<Vec<DayReport>, SimulationError> {
        info!(days, start_day = self.current_day(), "Starting simulation");
        let mut reports = Vec::with_capacity(days as usize);
        for _ in 0..days {
            reports.push(self.update_day()?);
        }
        let events = reports.iter().filter(|r| r.event.is_some()).count();
        info!(
            days,
            events,
            snapshots = self.history.len(),
            season = ?self.current_season(),
            "Simulation finished"
        );
        Ok(reports)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn history(&self) -> &SimulationHistory {
        &self.history
    }

    pub fn into_history(self) -> SimulationHistory {
        self.history
    }

    /// Run seed actually used, even when the config asked for a random one.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generation_seed(&self) -> u32 {
        self.generation_seed
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    pub fn current_season(&self) -> Season {
        self.seasons.current_season()
    }

    pub fn current_day(&self) -> u64 {
        self.seasons.current_day()
    }
}
