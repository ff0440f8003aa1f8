use std::collections::HashMap;

use crate::world::cell::{Axial, Cell, TerrainType};

/// Axial neighbor offsets. The order is fixed so neighbor lists are stable.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 6] = [
    (1, 0),  // East
    (-1, 0), // West
    (0, 1),  // Southeast
    (0, -1), // Northwest
    (1, -1), // Northeast
    (-1, 1), // Southwest
];

/// The hexagonal cell store shared by every simulation phase.
///
/// Cells live in one dense vector sorted by `(q, r)`. That order is the
/// iteration order of every pass over the grid, including the
/// order-sensitive vegetation spread, and of snapshot export. Neighbor slots
/// are computed once at construction; the grid is never resized.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    radius: u32,
    cells: Vec<Cell>,
    index: HashMap<Axial, usize>,
    neighbors: Vec<Vec<usize>>,
}

impl Grid {
    /// Build a hexagonal region of the given radius: every `(q, r)` with
    /// `|q|, |r|, |q + r| <= radius`.
    ///
    /// `terrain_for` picks the initial classification of each cell.
    pub fn hexagon(radius: u32, mut terrain_for: impl FnMut(Axial) -> TerrainType) -> Self {
        let r_max = radius as i32;
        let mut cells = Vec::with_capacity(hex_cell_count(radius));
        for q in -r_max..=r_max {
            for r in -r_max..=r_max {
                if (q + r).abs() <= r_max {
                    let coord = Axial::new(q, r);
                    cells.push(Cell::new_default(coord, terrain_for(coord)));
                }
            }
        }
        Self::from_sorted(radius, cells)
    }

    /// Build a grid from arbitrary cells. Cells are re-sorted by `(q, r)`;
    /// later duplicates of a coordinate are dropped.
    pub fn from_cells(mut cells: Vec<Cell>) -> Self {
        cells.sort_by_key(|c| c.coord);
        cells.dedup_by_key(|c| c.coord);
        let radius = cells
            .iter()
            .map(|c| c.coord.distance_from_origin().unsigned_abs())
            .max()
            .unwrap_or(0);
        Self::from_sorted(radius, cells)
    }

    fn from_sorted(radius: u32, cells: Vec<Cell>) -> Self {
        let index: HashMap<Axial, usize> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| (c.coord, i))
            .collect();

        let neighbors = cells
            .iter()
            .map(|c| {
                NEIGHBOR_OFFSETS
                    .iter()
                    .filter_map(|&(dq, dr)| index.get(&c.coord.offset(dq, dr)).copied())
                    .collect()
            })
            .collect();

        Self {
            radius,
            cells,
            index,
            neighbors,
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: Axial) -> bool {
        self.index.contains_key(&coord)
    }

    /// Whether `coord` lies inside the hexagon of this grid's radius.
    pub fn within_radius(&self, coord: Axial) -> bool {
        coord.distance_from_origin() <= self.radius as i32
    }

    pub fn get(&self, coord: Axial) -> Option<&Cell> {
        self.index.get(&coord).map(|&i| &self.cells[i])
    }

    pub fn get_mut(&mut self, coord: Axial) -> Option<&mut Cell> {
        match self.index.get(&coord) {
            Some(&i) => Some(&mut self.cells[i]),
            None => None,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Cell> {
        self.cells.iter_mut()
    }

    /// Coordinates of the neighbors of `coord` that exist in this grid.
    /// Empty when `coord` itself is not in the grid.
    pub fn neighbors(&self, coord: Axial) -> Vec<Axial> {
        match self.index.get(&coord) {
            Some(&i) => self.neighbors[i]
                .iter()
                .map(|&n| self.cells[n].coord)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Neighbor slots of the cell at `slot`, in `NEIGHBOR_OFFSETS` order.
    pub(crate) fn neighbor_slots(&self, slot: usize) -> &[usize] {
        &self.neighbors[slot]
    }

    pub(crate) fn cell_at(&self, slot: usize) -> &Cell {
        &self.cells[slot]
    }

    pub(crate) fn cell_at_mut(&mut self, slot: usize) -> &mut Cell {
        &mut self.cells[slot]
    }
}

/// Number of cells in a hexagon of the given radius: `3r(r+1) + 1`.
pub fn hex_cell_count(radius: u32) -> usize {
    let r = radius as usize;
    3 * r * (r + 1) + 1
}
