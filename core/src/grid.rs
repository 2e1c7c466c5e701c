//! Tile grid and the read-only occupancy queries used by every system.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::CellCoord;

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Solid cell that blocks actors and projectiles.
    Wall,
    /// Walkable cell.
    Floor,
}

/// Dense row-major grid of tiles. Each tile spans one world unit.
///
/// Queries outside the grid are answered as solid so that collision never
/// reads undefined cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid with every cell set to `tile`.
    #[must_use]
    pub fn filled(width: u32, height: u32, tile: Tile) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            tiles: vec![tile; capacity],
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Returns the tile stored at the cell, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index).copied())
    }

    /// Overwrites the tile at the cell. Cells outside the grid are ignored.
    pub fn set(&mut self, cell: CellCoord, tile: Tile) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = tile;
            }
        }
    }

    /// Reports whether the cell is walkable floor.
    #[must_use]
    pub fn is_floor(&self, cell: CellCoord) -> bool {
        self.tile(cell) == Some(Tile::Floor)
    }

    /// Reports whether the signed cell position is solid. Out of bounds is solid.
    #[must_use]
    pub fn is_solid(&self, column: i64, row: i64) -> bool {
        match self.cell_at(column, row) {
            Some(cell) => !self.is_floor(cell),
            None => true,
        }
    }

    /// Reports whether the tile containing the continuous point is solid.
    #[must_use]
    pub fn is_solid_at(&self, point: Vec2) -> bool {
        if !point.is_finite() {
            return true;
        }
        self.is_solid(point.x.floor() as i64, point.y.floor() as i64)
    }

    /// Converts a signed position into a cell when it lies inside the grid.
    #[must_use]
    pub fn cell_at(&self, column: i64, row: i64) -> Option<CellCoord> {
        if column < 0 || row < 0 || column >= i64::from(self.width) || row >= i64::from(self.height)
        {
            return None;
        }
        Some(CellCoord::new(column as u32, row as u32))
    }

    /// Cardinal neighbours inside the grid, ordered north, west, east, south.
    pub fn cardinal_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        let column = i64::from(cell.column());
        let row = i64::from(cell.row());
        [(0_i64, -1_i64), (-1, 0), (1, 0), (0, 1)]
            .into_iter()
            .filter_map(move |(dc, dr)| self.cell_at(column + dc, row + dr))
    }

    /// Counts solid cardinal neighbours, treating the outside as solid.
    #[must_use]
    pub fn solid_neighbor_count(&self, cell: CellCoord) -> usize {
        let column = i64::from(cell.column());
        let row = i64::from(cell.row());
        [(0_i64, -1_i64), (-1, 0), (1, 0), (0, 1)]
            .into_iter()
            .filter(|(dc, dr)| self.is_solid(column + dc, row + dr))
            .count()
    }

    /// Counts walkable cardinal neighbours.
    #[must_use]
    pub fn open_neighbor_count(&self, cell: CellCoord) -> usize {
        4 - self.solid_neighbor_count(cell)
    }

    /// Iterates every floor cell in row-major order.
    pub fn floor_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let width = self.width.max(1);
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| **tile == Tile::Floor)
            .map(move |(index, _)| {
                let index = index as u32;
                CellCoord::new(index % width, index / width)
            })
    }

    /// Number of floor cells.
    #[must_use]
    pub fn floor_count(&self) -> usize {
        self.tiles.iter().filter(|tile| **tile == Tile::Floor).count()
    }

    /// Counts the floor cells reachable from `start` through cardinal steps.
    #[must_use]
    pub fn reachable_count(&self, start: CellCoord) -> usize {
        if !self.is_floor(start) {
            return 0;
        }

        let mut visited = vec![false; self.tiles.len()];
        let mut queue = VecDeque::new();
        let mut count = 0;
        if let Some(index) = self.index(start) {
            visited[index] = true;
            queue.push_back(start);
        }

        while let Some(cell) = queue.pop_front() {
            count += 1;
            for neighbor in self.cardinal_neighbors(cell) {
                if !self.is_floor(neighbor) {
                    continue;
                }
                let Some(index) = self.index(neighbor) else {
                    continue;
                };
                if visited[index] {
                    continue;
                }
                visited[index] = true;
                queue.push_back(neighbor);
            }
        }

        count
    }

    /// Rows of the grid from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        let width = usize::try_from(self.width).unwrap_or(0).max(1);
        self.tiles.chunks(width)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(width: u32, height: u32) -> Grid {
        let mut grid = Grid::filled(width, height, Tile::Wall);
        for row in 1..height - 1 {
            for column in 1..width - 1 {
                grid.set(CellCoord::new(column, row), Tile::Floor);
            }
        }
        grid
    }

    #[test]
    fn out_of_bounds_queries_are_solid() {
        let grid = Grid::filled(3, 3, Tile::Floor);
        assert!(grid.is_solid(-1, 0));
        assert!(grid.is_solid(0, 3));
        assert!(!grid.is_solid(2, 2));
        assert!(grid.is_solid_at(Vec2::new(-0.1, 1.0)));
        assert!(grid.is_solid_at(Vec2::new(f32::NAN, 1.0)));
    }

    #[test]
    fn neighbor_counts_treat_border_as_solid() {
        let grid = room(5, 5);
        assert_eq!(grid.solid_neighbor_count(CellCoord::new(1, 1)), 2);
        assert_eq!(grid.open_neighbor_count(CellCoord::new(2, 2)), 4);
        let corner = Grid::filled(1, 1, Tile::Floor);
        assert_eq!(corner.solid_neighbor_count(CellCoord::new(0, 0)), 4);
    }

    #[test]
    fn reachable_count_stops_at_walls() {
        let mut grid = room(7, 3);
        grid.set(CellCoord::new(3, 1), Tile::Wall);
        assert_eq!(grid.floor_count(), 4);
        assert_eq!(grid.reachable_count(CellCoord::new(1, 1)), 2);
        assert_eq!(grid.reachable_count(CellCoord::new(0, 0)), 0);
    }

    #[test]
    fn floor_cells_iterate_in_row_major_order() {
        let grid = room(4, 4);
        let cells: Vec<_> = grid.floor_cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(1, 1),
                CellCoord::new(2, 1),
                CellCoord::new(1, 2),
                CellCoord::new(2, 2),
            ]
        );
    }
}
