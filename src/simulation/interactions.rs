use crate::config::preset::InteractionFactors;
use crate::world::{Grid, TerrainType};

/// Cells wetter than this feed vegetation to their neighbors.
pub const SPREAD_WATER_THRESHOLD: f64 = 0.3;
/// Cells drier than this lose vegetation and may turn to desert.
pub const DESERTIFICATION_WATER_THRESHOLD: f64 = 0.1;

/// Erosion, vegetation spread and desertification between cells.
#[derive(Debug, Clone)]
pub struct InteractionsEngine {
    factors: InteractionFactors,
}

impl InteractionsEngine {
    pub fn new(factors: InteractionFactors) -> Self {
        Self { factors }
    }

    pub fn factors(&self) -> &InteractionFactors {
        &self.factors
    }

    /// Wet land loses height and water at the erosion rate. Ocean does not
    /// erode.
    pub fn simulate_erosion(&self, grid: &mut Grid) {
        let rate = self.factors.erosion_rate;
        for cell in grid.iter_mut() {
            if cell.terrain_type != TerrainType::Ocean && cell.water_level > 0.0 {
                cell.height = (cell.height - rate).max(0.0);
                cell.water_level = (cell.water_level - rate).max(0.0);
            }
        }
    }

    /// Wet, non-desert cells push vegetation into their neighbors.
    ///
    /// Cells are visited in ascending `(q, r)` order and neighbors are
    /// updated in place. Every source adds the same `growth` and source
    /// eligibility reads only water and terrain, so a cell with `k` wet
    /// neighbors ends the pass at `min(1.0, v + k * growth)`. Desert
    /// neighbors and neighbors already at 1.0 are skipped.
    pub fn spread_vegetation(&self, grid: &mut Grid) {
        let growth = self.factors.vegetation_growth;
        for slot in 0..grid.len() {
            let source = grid.cell_at(slot);
            if source.water_level <= SPREAD_WATER_THRESHOLD
                || source.terrain_type == TerrainType::Desert
            {
                continue;
            }
            for i in 0..grid.neighbor_slots(slot).len() {
                let n = grid.neighbor_slots(slot)[i];
                let neighbor = grid.cell_at_mut(n);
                if neighbor.vegetation < 1.0 && neighbor.terrain_type != TerrainType::Desert {
                    neighbor.vegetation = (neighbor.vegetation + growth).min(1.0);
                }
            }
        }
    }

    /// Dry land loses vegetation; land whose vegetation reaches zero becomes
    /// desert for good. Nothing here turns desert back.
    pub fn simulate_desertification(&self, grid: &mut Grid) {
        let rate = self.factors.desertification_rate;
        for cell in grid.iter_mut() {
            if cell.terrain_type != TerrainType::Ocean
                && cell.water_level < DESERTIFICATION_WATER_THRESHOLD
            {
                cell.vegetation = (cell.vegetation - rate).max(0.0);
                if cell.vegetation == 0.0 {
                    cell.terrain_type = TerrainType::Desert;
                }
            }
        }
    }

    /// Erosion, then spread, then desertification.
    pub fn apply_interactions(&self, grid: &mut Grid) {
        self.simulate_erosion(grid);
        self.spread_vegetation(grid);
        self.simulate_desertification(grid);
    }
}
