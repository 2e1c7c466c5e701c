#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic maze generation: a recursive-backtracking spanning tree
//! followed by a braiding pass that opens dead ends into loops.
//!
//! Carvable cells sit on odd coordinates two apart, so every corridor is
//! separated from its neighbours by a wall cell and the outer ring always
//! stays solid. Even dimensions leave the last interior row or column as wall.

use dread_maze_core::{CellCoord, DeterministicRng, Grid, Tile, DEFAULT_BRAID_PROBABILITY};

/// Lattice steps between carvable cells, ordered north, west, east, south.
const CARVE_STEPS: [(i64, i64); 4] = [(0, -2), (-2, 0), (2, 0), (0, 2)];

/// Smallest dimension that still holds one interior carvable cell.
const MIN_CARVABLE_DIMENSION: u32 = 3;

/// Generated level layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    /// Tile grid of the level.
    pub grid: Grid,
    /// Cell the actor starts on; every floor cell is reachable from it.
    pub start: CellCoord,
}

/// Maze generator configured with the braiding probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MazeGenerator {
    braid_probability: f32,
}

impl Default for MazeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_BRAID_PROBABILITY)
    }
}

impl MazeGenerator {
    /// Creates a generator that opens each dead end with the provided probability.
    #[must_use]
    pub fn new(braid_probability: f32) -> Self {
        let braid_probability = if braid_probability.is_nan() {
            DEFAULT_BRAID_PROBABILITY
        } else {
            braid_probability.clamp(0.0, 1.0)
        };
        Self { braid_probability }
    }

    /// Probability that the braiding pass opens a dead end.
    #[must_use]
    pub const fn braid_probability(&self) -> f32 {
        self.braid_probability
    }

    /// Generates a maze from a seed. Identical inputs always yield identical mazes.
    #[must_use]
    pub fn generate(&self, seed: u64, width: u32, height: u32) -> Maze {
        let mut rng = DeterministicRng::new(seed);
        self.generate_with(&mut rng, width, height)
    }

    /// Generates a maze drawing from an existing random stream.
    pub fn generate_with(&self, rng: &mut DeterministicRng, width: u32, height: u32) -> Maze {
        let Some(mut grid) = carve_spanning_tree(rng, width, height) else {
            tracing::debug!(width, height, "grid too small to carve, using an open room");
            return Maze {
                grid: Grid::filled(width, height, Tile::Floor),
                start: CellCoord::new(0, 0),
            };
        };

        let dead_ends_before = dead_end_count(&grid);
        let opened = braid(&mut grid, rng, self.braid_probability);
        tracing::debug!(
            width,
            height,
            floor = grid.floor_count(),
            dead_ends_before,
            opened,
            "maze generated"
        );

        Maze {
            grid,
            start: CellCoord::new(1, 1),
        }
    }
}

/// Generates a grid with the default braiding probability.
#[must_use]
pub fn generate(seed: u64, width: u32, height: u32) -> Grid {
    MazeGenerator::default().generate(seed, width, height).grid
}

/// Carves a spanning tree over the odd lattice starting at `(1, 1)`.
///
/// Returns `None` when either dimension is too small to hold an interior cell.
pub fn carve_spanning_tree(rng: &mut DeterministicRng, width: u32, height: u32) -> Option<Grid> {
    if width < MIN_CARVABLE_DIMENSION || height < MIN_CARVABLE_DIMENSION {
        return None;
    }

    let mut grid = Grid::filled(width, height, Tile::Wall);
    let start = CellCoord::new(1, 1);
    grid.set(start, Tile::Floor);
    let mut stack = vec![start];

    while let Some(&cell) = stack.last() {
        let mut steps = CARVE_STEPS;
        rng.shuffle(&mut steps);

        let column = i64::from(cell.column());
        let row = i64::from(cell.row());
        let next = steps.iter().find_map(|&(dc, dr)| {
            let target = interior_cell(&grid, column + dc, row + dr)?;
            if grid.is_floor(target) {
                return None;
            }
            let between = grid.cell_at(column + dc / 2, row + dr / 2)?;
            Some((target, between))
        });

        match next {
            Some((target, between)) => {
                grid.set(between, Tile::Floor);
                grid.set(target, Tile::Floor);
                stack.push(target);
            }
            None => {
                let _ = stack.pop();
            }
        }
    }

    Some(grid)
}

/// Opens one interior wall next to each dead end with the provided probability.
///
/// Only walls become floor, so connectivity is preserved. Returns the number
/// of walls opened.
pub fn braid(grid: &mut Grid, rng: &mut DeterministicRng, probability: f32) -> usize {
    let dead_ends: Vec<CellCoord> = grid
        .floor_cells()
        .filter(|cell| grid.solid_neighbor_count(*cell) == 3)
        .collect();

    let mut opened = 0;
    for cell in dead_ends {
        // An earlier opening may already have turned this cell into a passage.
        if grid.solid_neighbor_count(cell) != 3 {
            continue;
        }
        if !rng.chance(probability) {
            continue;
        }

        let candidates = interior_walls_around(grid, cell);
        if let Some(&wall) = rng.pick(&candidates) {
            grid.set(wall, Tile::Floor);
            opened += 1;
        }
    }

    opened
}

/// Counts floor cells with exactly one open neighbour.
#[must_use]
pub fn dead_end_count(grid: &Grid) -> usize {
    grid.floor_cells()
        .filter(|cell| grid.solid_neighbor_count(*cell) == 3)
        .count()
}

fn interior_walls_around(grid: &Grid, cell: CellCoord) -> Vec<CellCoord> {
    grid.cardinal_neighbors(cell)
        .filter(|neighbor| !grid.is_floor(*neighbor) && is_interior(grid, *neighbor))
        .collect()
}

fn interior_cell(grid: &Grid, column: i64, row: i64) -> Option<CellCoord> {
    let cell = grid.cell_at(column, row)?;
    is_interior(grid, cell).then_some(cell)
}

fn is_interior(grid: &Grid, cell: CellCoord) -> bool {
    cell.column() >= 1
        && cell.row() >= 1
        && cell.column() + 1 < grid.width()
        && cell.row() + 1 < grid.height()
}
