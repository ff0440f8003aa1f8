pub mod cell;
pub mod generation;
pub mod grid;
pub mod noise_field;
pub mod render;

pub use cell::{Axial, Cell, Season, TerrainType};
pub use generation::{GenerationError, TerrainGenerator};
pub use grid::Grid;
pub use noise_field::{NoiseField, NoiseParams};
