//! Read-only text views of a grid for terminals and external plotting.

use crate::world::cell::{Axial, TerrainType};
use crate::world::grid::Grid;

pub fn terrain_glyph(terrain: TerrainType) -> char {
    match terrain {
        TerrainType::Ocean => '~',
        TerrainType::Desert => ':',
        TerrainType::Plains => ',',
        TerrainType::Forest => 'T',
        TerrainType::Mountains => '^',
        TerrainType::Arctic => '*',
        TerrainType::Default => '.',
    }
}

/// Rectangular heightmap: row `i` is `r = i - R`, column `j` is `q = j - R`.
/// Positions outside the hexagon hold 0.0.
pub fn heightmap(grid: &Grid) -> Vec<Vec<f64>> {
    let radius = grid.radius() as i32;
    let side = (2 * radius + 1) as usize;
    let mut map = vec![vec![0.0; side]; side];
    for cell in grid.iter() {
        let row = (cell.coord.r + radius) as usize;
        let col = (cell.coord.q + radius) as usize;
        if row < side && col < side {
            map[row][col] = cell.height;
        }
    }
    map
}

/// Hex-staggered glyph map, one line per `r`, cells missing from the grid
/// left blank.
pub fn terrain_map(grid: &Grid) -> String {
    let radius = grid.radius() as i32;
    let mut out = String::new();
    for r in -radius..=radius {
        let mut line = " ".repeat(r.unsigned_abs() as usize);
        let q_min = (-radius).max(-radius - r);
        let q_max = radius.min(radius - r);
        for q in q_min..=q_max {
            let glyph = grid
                .get(Axial::new(q, r))
                .map(|c| terrain_glyph(c.terrain_type))
                .unwrap_or(' ');
            line.push(glyph);
            line.push(' ');
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn print_legend() {
    let legend: Vec<String> = TerrainType::all()
        .iter()
        .map(|&t| format!("{} {}", terrain_glyph(t), t.name()))
        .collect();
    println!("Legend: {}", legend.join("  "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::cell::Cell;

    #[test]
    fn heightmap_is_square_and_places_cells() {
        let mut grid = Grid::hexagon(2, |_| TerrainType::Plains);
        grid.get_mut(Axial::new(1, -2)).unwrap().height = 0.75;
        grid.get_mut(Axial::new(0, 0)).unwrap().height = 0.5;
        let map = heightmap(&grid);
        assert_eq!(map.len(), 5);
        assert!(map.iter().all(|row| row.len() == 5));
        assert_eq!(map[0][3], 0.75);
        assert_eq!(map[2][2], 0.5);
        // (-2, -2) lies outside the hexagon
        assert_eq!(map[0][0], 0.0);
    }

    #[test]
    fn terrain_map_draws_hexagon() {
        let grid = Grid::hexagon(1, |c| {
            if c == Axial::new(0, 0) {
                TerrainType::Mountains
            } else {
                TerrainType::Ocean
            }
        });
        let map = terrain_map(&grid);
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines, vec![" ~ ~", "~ ^ ~", " ~ ~"]);
    }

    #[test]
    fn terrain_map_leaves_gaps_for_missing_cells() {
        let grid = Grid::from_cells(vec![
            Cell::new_default(Axial::new(0, 0), TerrainType::Forest),
            Cell::new_default(Axial::new(1, 0), TerrainType::Desert),
        ]);
        let map = terrain_map(&grid);
        let middle = map.lines().nth(1).unwrap();
        assert_eq!(middle, "  T :");
    }

    #[test]
    fn every_terrain_has_distinct_glyph() {
        let mut glyphs: Vec<char> = TerrainType::all().iter().map(|&t| terrain_glyph(t)).collect();
        glyphs.sort();
        glyphs.dedup();
        assert_eq!(glyphs.len(), TerrainType::all().len());
    }
}
