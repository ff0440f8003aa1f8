pub mod preset;
pub mod simulation;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use preset::{Preset, PresetLibrary};
pub use simulation::SimulationConfig;

/// Problems reading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid TOML in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },
}
