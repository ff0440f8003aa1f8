use std::fmt;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::world::{Grid, TerrainType};

/// Stochastic disasters and boons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Earthquake,
    Flood,
    Wildfire,
    RapidGrowth,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Earthquake => "earthquake",
            EventKind::Flood => "flood",
            EventKind::Wildfire => "wildfire",
            EventKind::RapidGrowth => "rapid_growth",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcomes in draw order; `None` is a quiet day.
pub const EVENT_OUTCOMES: [Option<EventKind>; 5] = [
    Some(EventKind::Earthquake),
    Some(EventKind::Flood),
    Some(EventKind::Wildfire),
    Some(EventKind::RapidGrowth),
    None,
];
pub const EVENT_WEIGHTS: [f64; 5] = [0.1, 0.05, 0.1, 0.05, 0.7];

const WILDFIRE_VEGETATION_THRESHOLD: f64 = 0.2;
const RAPID_GROWTH_WATER_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct EventEngine {
    distribution: WeightedIndex<f64>,
}

impl Default for EventEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EventEngine {
    pub fn new() -> Self {
        // WeightedIndex normalizes the weights itself.
        let distribution =
            WeightedIndex::new(EVENT_WEIGHTS).expect("event weights are positive and finite");
        Self { distribution }
    }

    /// Draw today's event, if any. Touches only the RNG.
    pub fn trigger_event(&self, rng: &mut impl Rng) -> Option<EventKind> {
        EVENT_OUTCOMES[self.distribution.sample(rng)]
    }

    /// Apply `kind` to every eligible cell, one uniform draw per cell.
    pub fn apply_event(&self, kind: EventKind, grid: &mut Grid, rng: &mut impl Rng) {
        match kind {
            EventKind::Earthquake => {
                for cell in grid.iter_mut() {
                    cell.height = (cell.height - rng.gen_range(0.0..0.05)).max(0.0);
                }
            }
            EventKind::Flood => {
                for cell in grid.iter_mut() {
                    cell.water_level = (cell.water_level + rng.gen_range(0.1..0.3)).min(1.0);
                }
            }
            EventKind::Wildfire => {
                for cell in grid.iter_mut() {
                    if cell.vegetation > WILDFIRE_VEGETATION_THRESHOLD {
                        cell.vegetation = (cell.vegetation - rng.gen_range(0.1..0.3)).max(0.0);
                    }
                }
            }
            EventKind::RapidGrowth => {
                for cell in grid.iter_mut() {
                    if cell.water_level > RAPID_GROWTH_WATER_THRESHOLD
                        && cell.terrain_type != TerrainType::Desert
                    {
                        cell.vegetation = (cell.vegetation + rng.gen_range(0.2..0.5)).min(1.0);
                    }
                }
            }
        }
    }
}
