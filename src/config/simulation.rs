use serde::Deserialize;
use std::path::Path;

use crate::config::ConfigError;
use crate::persistence::HistoryFormat;

/// Terrain mixing applied after generation: each cell takes the terrain
/// type of one of `presets`, drawn with the matching weight.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlendConfig {
    pub presets: Vec<String>,
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_days_per_season")]
    pub days_per_season: u32,
    /// 0 draws a random seed; the seed actually used is logged and recorded.
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_region_presets")]
    pub region_presets: Vec<String>,
    #[serde(default)]
    pub random_variation: f64,
    #[serde(default)]
    pub blend: Option<BlendConfig>,
    #[serde(default = "default_history_directory")]
    pub history_directory: String,
    #[serde(default)]
    pub history_format: HistoryFormat,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_preset() -> String {
    "default".to_string()
}
fn default_days() -> u32 {
    100
}
fn default_days_per_season() -> u32 {
    90
}
fn default_region_presets() -> Vec<String> {
    ["desert", "forest", "mountains", "plains", "arctic"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_history_directory() -> String {
    "output".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            days: default_days(),
            days_per_season: default_days_per_season(),
            seed: 0,
            region_presets: default_region_presets(),
            random_variation: 0.0,
            blend: None,
            history_directory: default_history_directory(),
            history_format: HistoryFormat::default(),
            log_level: default_log_level(),
        }
    }
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let config: SimulationConfig =
            toml::from_str(content).map_err(|source| ConfigError::Parse {
                path: source_path.to_path_buf(),
                source,
            })?;
        config.validate().map_err(|message| ConfigError::Invalid {
            path: source_path.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.days_per_season == 0 {
            errors.push(format!(
                "days_per_season must be > 0, got {}. Example: days_per_season = 90",
                self.days_per_season
            ));
        }

        if !(0.0..=1.0).contains(&self.random_variation) {
            errors.push(format!(
                "random_variation must be in [0.0, 1.0], got {}. Example: random_variation = 0.1",
                self.random_variation
            ));
        }

        if let Some(blend) = &self.blend {
            if blend.presets.is_empty() {
                errors.push(
                    "blend.presets must name at least one preset. Example: presets = [\"desert\", \"forest\"]"
                        .to_string(),
                );
            }
            if let Some(weights) = &blend.weights {
                if weights.len() != blend.presets.len() {
                    errors.push(format!(
                        "blend.weights has {} entries but blend.presets has {}",
                        weights.len(),
                        blend.presets.len()
                    ));
                }
            }
        }

        if self.history_directory.trim().is_empty() {
            errors.push("history_directory must not be empty. Example: history_directory = \"output\"".to_string());
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}
