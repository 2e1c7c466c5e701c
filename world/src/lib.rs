#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative run state for Dread Maze.
//!
//! The world owns the active level, the actor and every random stream. It is
//! mutated only through [`apply`], which reports what happened as events, and
//! read through the [`query`] module.

mod level;
mod run;

use std::time::Duration;

use dread_maze_core::{
    cell_center, Actor, Command, DeterministicRng, Escalation, Event, Modifiers, RunConfig,
    RunPhase, WELCOME_BANNER,
};
use dread_maze_system_director::Director;
use dread_maze_system_encounter::Encounter;
use dread_maze_system_resources::derive_modifiers;
use glam::Vec2;

use crate::level::Level;

/// Represents the authoritative Dread Maze world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: RunConfig,
    seed: u64,
    phase: RunPhase,
    level: Level,
    actor: Option<Actor>,
    escalation: Escalation,
    modifiers: Modifiers,
    director: Director,
    encounter: Encounter,
    rng: DeterministicRng,
    elapsed: Duration,
    tick_index: u64,
}

impl World {
    /// Creates an idle world that waits for a run to start.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            config: RunConfig::default(),
            seed: 0,
            phase: RunPhase::Idle,
            level: Level::empty(),
            actor: None,
            escalation: Escalation::default(),
            modifiers: Modifiers::default(),
            director: Director::default(),
            encounter: Encounter::new(),
            rng: DeterministicRng::new(0),
            elapsed: Duration::ZERO,
            tick_index: 0,
        }
    }

    fn start(&mut self, config: RunConfig, seed: u64, out_events: &mut Vec<Event>) {
        self.config = config.sanitized();
        self.seed = seed;
        self.phase = RunPhase::Running;
        self.actor = None;
        self.escalation = Escalation::default();
        self.modifiers = Modifiers::default();
        self.elapsed = Duration::ZERO;
        self.tick_index = 0;
        tracing::info!(
            seed,
            archetype = %self.config.archetype,
            difficulty = %self.config.difficulty,
            width = self.config.grid_width,
            height = self.config.grid_height,
            levels = self.config.levels,
            "run started"
        );
        begin_level(self, 1, out_events);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartRun { config, seed } => world.start(config, seed, out_events),
        Command::ResetRun => {
            if world.phase == RunPhase::Idle {
                tracing::debug!("reset ignored, no run was started");
                return;
            }
            let (config, seed) = (world.config, world.seed);
            world.start(config, seed, out_events);
        }
        Command::Tick { intent } => {
            if world.phase == RunPhase::Running {
                run::tick(world, &intent, out_events);
            }
        }
    }
}

/// Generates level `number` and places the actor on its start cell.
///
/// Vitals, status effects and escalation carry over between levels.
fn begin_level(world: &mut World, number: u32, out_events: &mut Vec<Event>) {
    let (level, rng) = Level::build(
        &world.config,
        world.seed,
        number,
        world.escalation.value(),
        &world.director,
    );
    world.level = level;
    world.rng = rng;
    world.encounter = Encounter::new();

    let start = cell_center(world.level.start);
    let archetype = world.config.archetype;
    let actor = world
        .actor
        .get_or_insert_with(|| Actor::new(archetype, start));
    actor.body.position = start;
    actor.body.velocity = Vec2::ZERO;
    actor.attack_cooldown = 0.0;
    world.modifiers = derive_modifiers(&actor.effects, &actor.vitals);

    tracing::info!(
        level = number,
        start = ?world.level.start,
        exit = ?world.level.exit,
        keys = world.level.keys_required,
        enemies = world.level.enemies.len(),
        escalation = world.escalation.value(),
        "level started"
    );
    out_events.push(Event::LevelStarted {
        level: number,
        start: world.level.start,
        keys_required: world.level.keys_required,
    });
    if world.level.exit_unlocked {
        out_events.push(Event::ExitUnlocked {
            exit: world.level.exit,
        });
    }
}

/// Advances to the next level or wins the run once the last one is cleared.
fn complete_level(world: &mut World, out_events: &mut Vec<Event>) {
    let cleared = world.level.number;
    if cleared >= world.config.levels {
        world.phase = RunPhase::Won;
        tracing::info!(levels = cleared, elapsed = ?world.elapsed, "run won");
        out_events.push(Event::Won { levels: cleared });
        return;
    }

    let next = cleared + 1;
    out_events.push(Event::LevelAdvanced { level: next });
    begin_level(world, next, out_events);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use dread_maze_core::{
        cell_center, ActorSnapshot, EnemySnapshot, Grid, Modifiers, NpcSnapshot, PickupSnapshot,
        ProjectileSnapshot, RunConfig, RunPhase, RunSnapshot,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Lifecycle phase of the run.
    #[must_use]
    pub fn phase(world: &World) -> RunPhase {
        world.phase
    }

    /// One-based number of the active level; zero before a run starts.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level.number
    }

    /// Tile grid of the active level.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.level.grid
    }

    /// Current escalation value.
    #[must_use]
    pub fn escalation(world: &World) -> f32 {
        world.escalation.value()
    }

    /// Modifiers that the next tick will consume.
    #[must_use]
    pub fn modifiers(world: &World) -> Modifiers {
        world.modifiers
    }

    /// Sanitized configuration of the current run.
    #[must_use]
    pub fn config(world: &World) -> RunConfig {
        world.config
    }

    /// Simulated time spent in the current run.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of ticks processed since the run started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures everything an adapter needs to present the current tick.
    #[must_use]
    pub fn snapshot(world: &World) -> RunSnapshot<'_> {
        let level = &world.level;
        let actor = world.actor.as_ref().map(|actor| ActorSnapshot {
            archetype: actor.archetype,
            position: actor.body.position,
            facing: actor.facing,
            health_percent: actor.vitals.health.fraction() * 100.0,
            oxygen_percent: actor.vitals.oxygen.fraction() * 100.0,
            sanity_percent: actor.vitals.sanity.fraction() * 100.0,
            effects: actor.effects.iter().copied().collect(),
            suffocation: actor.suffocation,
        });

        let compass_bearing = world
            .actor
            .as_ref()
            .filter(|_| world.modifiers.compass)
            .map(|actor| {
                let toward = cell_center(level.exit) - actor.body.position;
                toward.y.atan2(toward.x)
            });

        RunSnapshot {
            phase: world.phase,
            level: level.number,
            elapsed: world.elapsed,
            grid: &level.grid,
            actor,
            enemies: level
                .enemies
                .iter()
                .filter(|enemy| enemy.is_alive())
                .map(|enemy| EnemySnapshot {
                    id: enemy.id,
                    position: enemy.body.position,
                    mode: enemy.mode,
                    health: enemy.health,
                    spitter: enemy.spitter,
                })
                .collect(),
            pickups: level
                .pickups
                .iter()
                .filter(|pickup| !pickup.taken)
                .map(|pickup| PickupSnapshot {
                    id: pickup.id,
                    cell: pickup.cell,
                    kind: pickup.kind,
                })
                .collect(),
            npcs: level
                .npcs
                .iter()
                .map(|npc| NpcSnapshot {
                    id: npc.id,
                    position: npc.position,
                    used: npc.used,
                })
                .collect(),
            projectiles: level
                .projectiles
                .iter()
                .map(|projectile| ProjectileSnapshot {
                    id: projectile.id,
                    position: projectile.position,
                    side: projectile.side,
                })
                .collect(),
            exit: level.exit,
            exit_unlocked: level.exit_unlocked,
            keys_collected: level.keys_collected,
            keys_required: level.keys_required,
            escalation: world.escalation.value(),
            fog_radius: world.modifiers.fog_radius,
            compass_bearing,
        }
    }
}
