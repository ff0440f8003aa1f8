use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::ConfigError;
use crate::world::cell::{Season, TerrainType};
use crate::world::noise_field::{NoiseParams, MAX_OCTAVES};

pub const BUILTIN_PRESETS: &str = include_str!("../../presets.toml");
pub const DEFAULT_PRESET: &str = "default";

/// Rates used by the daily interaction pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionFactors {
    pub erosion_rate: f64,
    pub vegetation_growth: f64,
    pub desertification_rate: f64,
}

impl Default for InteractionFactors {
    fn default() -> Self {
        Self {
            erosion_rate: 0.001,
            vegetation_growth: 0.01,
            desertification_rate: 0.005,
        }
    }
}

/// How strongly precipitation feeds cell water levels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherImpact {
    pub rain_absorption: f64,
    pub snow_accumulation: f64,
}

impl Default for WeatherImpact {
    fn default() -> Self {
        Self {
            rain_absorption: 0.1,
            snow_accumulation: 0.05,
        }
    }
}

/// Multipliers for one season. Absent keys leave that effect off.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeasonModifiers {
    pub vegetation_growth_multiplier: Option<f64>,
    pub desertification_rate_multiplier: Option<f64>,
    pub snow_accumulation_multiplier: Option<f64>,
}

impl SeasonModifiers {
    fn multipliers(&self) -> [(&'static str, Option<f64>); 3] {
        [
            ("vegetation_growth_multiplier", self.vegetation_growth_multiplier),
            (
                "desertification_rate_multiplier",
                self.desertification_rate_multiplier,
            ),
            ("snow_accumulation_multiplier", self.snow_accumulation_multiplier),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeasonalEffects {
    pub spring: Option<SeasonModifiers>,
    pub summer: Option<SeasonModifiers>,
    pub autumn: Option<SeasonModifiers>,
    pub winter: Option<SeasonModifiers>,
}

impl SeasonalEffects {
    pub fn for_season(&self, season: Season) -> Option<&SeasonModifiers> {
        match season {
            Season::Spring => self.spring.as_ref(),
            Season::Summer => self.summer.as_ref(),
            Season::Autumn => self.autumn.as_ref(),
            Season::Winter => self.winter.as_ref(),
        }
    }
}

/// One named terrain preset. Unknown keys are rejected at load time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Preset {
    #[serde(skip)]
    pub name: String,
    pub grid_width: u32,
    pub grid_height: u32,
    pub scale: f64,
    pub octaves: usize,
    pub persistence: f64,
    pub lacunarity: f64,
    pub water_level: f64,
    pub terrain_type: TerrainType,
    pub interaction_factors: InteractionFactors,
    pub weather_impact: WeatherImpact,
    pub seasonal_effects: SeasonalEffects,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            name: DEFAULT_PRESET.to_string(),
            grid_width: 100,
            grid_height: 100,
            scale: 20.0,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            water_level: 0.4,
            terrain_type: TerrainType::Default,
            interaction_factors: InteractionFactors::default(),
            weather_impact: WeatherImpact::default(),
            seasonal_effects: SeasonalEffects::default(),
        }
    }
}

impl Preset {
    /// Radius of the hexagonal grid built from this preset.
    pub fn grid_radius(&self) -> u32 {
        self.grid_width / 2
    }

    pub fn noise_params(&self) -> NoiseParams {
        NoiseParams {
            scale: self.scale,
            octaves: self.octaves,
            persistence: self.persistence,
            lacunarity: self.lacunarity,
        }
    }

    /// Check parameter ranges, reporting every problem at once.
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.grid_width == 0 || self.grid_width > 2000 {
            errors.push(format!(
                "grid_width must be 1-2000, got {}. Example: grid_width = 40",
                self.grid_width
            ));
        }
        if self.grid_height == 0 {
            errors.push(format!(
                "grid_height must be > 0, got {}. Example: grid_height = 40",
                self.grid_height
            ));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            errors.push(format!(
                "scale must be > 0.0, got {}. Example: scale = 20.0",
                self.scale
            ));
        }
        if !(1..=MAX_OCTAVES).contains(&self.octaves) {
            errors.push(format!(
                "octaves must be 1-{}, got {}. Example: octaves = 6",
                MAX_OCTAVES, self.octaves
            ));
        }
        if !(self.persistence > 0.0 && self.persistence <= 1.0) {
            errors.push(format!(
                "persistence must be in (0.0, 1.0], got {}. Example: persistence = 0.5",
                self.persistence
            ));
        }
        if !(self.lacunarity.is_finite() && self.lacunarity >= 1.0) {
            errors.push(format!(
                "lacunarity must be >= 1.0, got {}. Example: lacunarity = 2.0",
                self.lacunarity
            ));
        }
        if !(0.0..=1.0).contains(&self.water_level) {
            errors.push(format!(
                "water_level must be in [0.0, 1.0], got {}. Example: water_level = 0.4",
                self.water_level
            ));
        }

        let rates = [
            ("interaction_factors.erosion_rate", self.interaction_factors.erosion_rate),
            (
                "interaction_factors.vegetation_growth",
                self.interaction_factors.vegetation_growth,
            ),
            (
                "interaction_factors.desertification_rate",
                self.interaction_factors.desertification_rate,
            ),
            ("weather_impact.rain_absorption", self.weather_impact.rain_absorption),
            (
                "weather_impact.snow_accumulation",
                self.weather_impact.snow_accumulation,
            ),
        ];
        for (key, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!("{} must be in [0.0, 1.0], got {}", key, value));
            }
        }

        for season in [Season::Spring, Season::Summer, Season::Autumn, Season::Winter] {
            let Some(modifiers) = self.seasonal_effects.for_season(season) else {
                continue;
            };
            for (key, value) in modifiers.multipliers() {
                if let Some(v) = value {
                    if !(v.is_finite() && v >= 0.0) {
                        errors.push(format!(
                            "seasonal_effects.{:?}.{} must be >= 0.0, got {}",
                            season, key, v
                        ));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}

/// Named presets loaded from a TOML file or the built-in table.
///
/// Always contains a `default` preset, which `resolve` falls back to.
#[derive(Debug, Clone)]
pub struct PresetLibrary {
    by_name: BTreeMap<String, Preset>,
    source: Option<PathBuf>,
}

impl PresetLibrary {
    /// The presets compiled into the binary.
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_PRESETS, Path::new("<builtin presets>"))
            .expect("builtin presets should parse and validate")
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut library = Self::from_toml_str(&content, path)?;
        library.source = Some(path.to_path_buf());
        Ok(library)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, Preset> =
            toml::from_str(content).map_err(|source| ConfigError::Parse {
                path: source_path.to_path_buf(),
                source,
            })?;

        let mut errors = Vec::new();
        let mut by_name = BTreeMap::new();
        for (name, mut preset) in raw {
            if let Err(e) = preset.validate() {
                errors.push(format!("preset '{}':\n{}", name, e));
            }
            preset.name = name.clone();
            by_name.insert(name, preset);
        }
        if !by_name.contains_key(DEFAULT_PRESET) {
            errors.push(format!(
                "a [{}] preset is required as the fallback",
                DEFAULT_PRESET
            ));
        }

        if !errors.is_empty() {
            return Err(ConfigError::Invalid {
                path: source_path.to_path_buf(),
                message: errors.join("\n"),
            });
        }

        Ok(Self {
            by_name,
            source: None,
        })
    }

    /// Load presets from `path`, falling back to the built-in table when the
    /// path is absent or the file cannot be used.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match Self::from_file(path) {
            Ok(library) => {
                info!(path = %path.display(), presets = library.len(), "Loaded preset file");
                library
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Preset file unusable, using built-in presets"
                );
                Self::builtin()
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.by_name.get(name)
    }

    /// Look up a preset by name, falling back to `default` with a warning.
    pub fn resolve(&self, name: &str) -> &Preset {
        match self.by_name.get(name) {
            Some(preset) => preset,
            None => {
                warn!(
                    preset = name,
                    fallback = DEFAULT_PRESET,
                    "Preset not found, loading default configuration"
                );
                &self.by_name[DEFAULT_PRESET]
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(|k| k.as_str())
    }

    pub fn presets(&self) -> impl Iterator<Item = &Preset> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// File the library was read from, `None` for the built-in table.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
