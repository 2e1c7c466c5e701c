use dread_maze_core::{CellCoord, DeterministicRng, DifficultyTier, Grid, PickupKind, Tile};
use dread_maze_system_maze_generation::MazeGenerator;
use dread_maze_system_spawning::{populate, Placement, PopulationPlan};
use proptest::prelude::*;

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
fn population_respects_minimum_distances() {
    let maze = MazeGenerator::default().generate(42, 41, 31);
    let plan = PopulationPlan::for_level(DifficultyTier::Normal, 1, 0.0);
    let mut rng = DeterministicRng::new(7);

    let population = populate(&maze.grid, maze.start, &plan, &mut rng);

    assert!(population.exit.manhattan_distance(maze.start) >= 28);
    assert_eq!(population.key_count(), 4);
    let keys: Vec<CellCoord> = population
        .pickups
        .iter()
        .filter(|pickup| pickup.kind == PickupKind::Key)
        .map(|pickup| pickup.cell)
        .collect();
    for (index, cell) in keys.iter().enumerate() {
        assert!(cell.manhattan_distance(maze.start) >= 10 + 2 * index as u32);
        assert!(maze.grid.is_floor(*cell));
    }
    for (index, enemy) in population.enemies.iter().enumerate() {
        let cell = CellCoord::containing(enemy.body.position).expect("inside grid");
        assert!(cell.manhattan_distance(maze.start) >= 16 + 2 * index as u32);
    }
}

#[test]
fn identical_seeds_populate_identically() {
    let maze = MazeGenerator::default().generate(3, 31, 31);
    let plan = PopulationPlan::for_level(DifficultyTier::Hard, 2, 1.5);
    let first = populate(&maze.grid, maze.start, &plan, &mut DeterministicRng::new(9));
    let second = populate(&maze.grid, maze.start, &plan, &mut DeterministicRng::new(9));
    assert_eq!(first, second);
    assert!(first
        .enemies
        .iter()
        .enumerate()
        .all(|(index, enemy)| enemy.spitter == (index % 3 == 2)));
}

#[test]
fn scan_finds_the_only_valid_cell() {
    let mut grid = Grid::filled(60, 60, Tile::Wall);
    let start = CellCoord::new(1, 1);
    let target = CellCoord::new(58, 58);
    grid.set(start, Tile::Floor);
    grid.set(target, Tile::Floor);
    let mut placement = Placement::new(&grid, start);
    let mut rng = DeterministicRng::new(1);

    assert_eq!(placement.place(&mut rng, 100), Some(target));
    assert_eq!(placement.place(&mut rng, 0), None);
}

#[test]
fn cramped_levels_reduce_counts_instead_of_failing() {
    let grid = room(6, 6);
    let start = CellCoord::new(1, 1);
    let plan = PopulationPlan::for_level(DifficultyTier::Normal, 1, 0.0);
    let mut rng = DeterministicRng::new(5);

    let population = populate(&grid, start, &plan, &mut rng);

    assert_eq!(population.exit, CellCoord::new(4, 4));
    assert_eq!(population.key_count(), 0);
    assert!(population.enemies.is_empty());
    assert!(population.npcs.len() <= 4);
}

proptest! {
    #[test]
    fn placements_never_overlap(seed in any::<u64>(), escalation in 0.0_f32..12.0) {
        let maze = MazeGenerator::default().generate(seed, 25, 25);
        let plan = PopulationPlan::for_level(DifficultyTier::Hard, 1, escalation);
        let population = populate(&maze.grid, maze.start, &plan, &mut DeterministicRng::new(seed));

        let mut cells: Vec<CellCoord> = population.pickups.iter().map(|pickup| pickup.cell).collect();
        cells.extend(population.npcs.iter().filter_map(|npc| CellCoord::containing(npc.position)));
        cells.extend(population.enemies.iter().filter_map(|enemy| CellCoord::containing(enemy.body.position)));
        cells.push(population.exit);
        let total = cells.len();
        cells.sort();
        cells.dedup();
        prop_assert_eq!(cells.len(), total);
        prop_assert!(!cells.contains(&maze.start));
    }
}
