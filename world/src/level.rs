//! Construction of a single level from the run seed.

use dread_maze_core::{
    derive_seed, level_seed, CellCoord, DeterministicRng, Enemy, Grid, Npc, Pickup, Projectile,
    RunConfig, Tile, RNG_STREAM_MAZE, RNG_STREAM_PLACEMENT, RNG_STREAM_SIMULATION,
};
use dread_maze_system_director::Director;
use dread_maze_system_maze_generation::MazeGenerator;
use dread_maze_system_spawning::{populate, PopulationPlan};

/// Grid and entities of the active level.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Level {
    pub(crate) number: u32,
    pub(crate) grid: Grid,
    pub(crate) start: CellCoord,
    pub(crate) exit: CellCoord,
    pub(crate) exit_unlocked: bool,
    pub(crate) keys_required: u32,
    pub(crate) keys_collected: u32,
    pub(crate) pickups: Vec<Pickup>,
    pub(crate) npcs: Vec<Npc>,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) elapsed: f32,
}

impl Level {
    /// Placeholder shown before a run starts.
    pub(crate) fn empty() -> Self {
        Self {
            number: 0,
            grid: Grid::filled(0, 0, Tile::Wall),
            start: CellCoord::new(0, 0),
            exit: CellCoord::new(0, 0),
            exit_unlocked: false,
            keys_required: 0,
            keys_collected: 0,
            pickups: Vec::new(),
            npcs: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            elapsed: 0.0,
        }
    }

    /// Generates and populates level `number`, returning it together with the
    /// simulation stream that drives its ticks.
    pub(crate) fn build(
        config: &RunConfig,
        run_seed: u64,
        number: u32,
        escalation: f32,
        director: &Director,
    ) -> (Self, DeterministicRng) {
        let base = level_seed(run_seed, number);
        let maze = MazeGenerator::new(config.braid_probability).generate(
            derive_seed(base, RNG_STREAM_MAZE),
            config.grid_width,
            config.grid_height,
        );

        let plan = PopulationPlan::for_level(config.difficulty, number, escalation);
        let mut placement_rng = DeterministicRng::new(derive_seed(base, RNG_STREAM_PLACEMENT));
        let population = populate(&maze.grid, maze.start, &plan, &mut placement_rng);

        let keys_required = population.key_count();
        let mut rng = DeterministicRng::new(derive_seed(base, RNG_STREAM_SIMULATION));
        let mut enemies = population.enemies;
        for enemy in &mut enemies {
            director.arm(enemy, &mut rng);
        }

        let level = Self {
            number,
            grid: maze.grid,
            start: maze.start,
            exit: population.exit,
            exit_unlocked: keys_required == 0,
            keys_required,
            keys_collected: 0,
            pickups: population.pickups,
            npcs: population.npcs,
            enemies,
            projectiles: Vec::new(),
            elapsed: 0.0,
        };
        (level, rng)
    }
}
