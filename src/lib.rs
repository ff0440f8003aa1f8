//! Hexagonal terrain generation and a daily weather, season, interaction and
//! event simulation over the generated grid.

pub mod cli;
pub mod config;
pub mod persistence;
pub mod simulation;
pub mod world;
