#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a seeded Dread Maze run headlessly.

mod autopilot;
mod config;
mod map;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dread_maze_core::{Archetype, Command, DifficultyTier, Event, RunConfig, RunPhase};
use dread_maze_world::{self as world, query, World};
use tracing_subscriber::EnvFilter;

use crate::autopilot::Autopilot;

/// Fixed simulation step driven by the CLI.
const FIXED_STEP: Duration = Duration::from_micros(16_667);

/// Player archetype selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RoleArg {
    Thief,
    Killer,
    Butcher,
}

impl From<RoleArg> for Archetype {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Thief => Self::Thief,
            RoleArg::Killer => Self::Killer,
            RoleArg::Butcher => Self::Butcher,
        }
    }
}

/// Difficulty tier selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TierArg {
    Easy,
    Normal,
    Hard,
}

impl From<TierArg> for DifficultyTier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Easy => Self::Easy,
            TierArg::Normal => Self::Normal,
            TierArg::Hard => Self::Hard,
        }
    }
}

/// Plays a deterministic Dread Maze run with an autopilot and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "dread-maze", version)]
struct Cli {
    /// TOML file with a `[run]` table; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed from which the whole run is derived.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Player archetype.
    #[arg(long, value_enum)]
    role: Option<RoleArg>,
    /// Grid columns.
    #[arg(long)]
    width: Option<u32>,
    /// Grid rows.
    #[arg(long)]
    height: Option<u32>,
    /// Difficulty tier.
    #[arg(long, value_enum)]
    tier: Option<TierArg>,
    /// Levels to escape before the run is won.
    #[arg(long)]
    levels: Option<u32>,
    /// Maximum number of fixed 1/60 s steps to simulate.
    #[arg(long, default_value_t = 36_000)]
    ticks: u64,
    /// Seed of the autopilot; defaults to the run seed.
    #[arg(long)]
    input_seed: Option<u64>,
    /// Print the maze at the start of every level and at the end of the run.
    #[arg(long)]
    print_map: bool,
}

impl Cli {
    fn run_config(&self, base: RunConfig) -> RunConfig {
        let mut config = base;
        if let Some(role) = self.role {
            config.archetype = role.into();
        }
        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(tier) = self.tier {
            config.difficulty = tier.into();
        }
        if let Some(levels) = self.levels {
            config.levels = levels;
        }
        config
    }
}

/// Totals gathered from the event stream of a run.
#[derive(Clone, Debug, Default, PartialEq)]
struct Summary {
    ticks: u64,
    keys: u32,
    kills: u32,
    pickups: u32,
    consultations: u32,
    hallucinations: u32,
    damage_taken: f32,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::KeyCollected { .. } => self.keys += 1,
            Event::EnemyKilled { .. } => self.kills += 1,
            Event::PickupTaken { .. } => self.pickups += 1,
            Event::NpcConsulted { .. } => self.consultations += 1,
            Event::HallucinationTriggered { .. } => self.hallucinations += 1,
            Event::PlayerDamaged { amount, .. } => self.damage_taken += amount,
            _ => {}
        }
    }
}

/// Entry point for the Dread Maze command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let base = match &cli.config {
        Some(path) => config::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => RunConfig::default(),
    };
    let config = cli.run_config(base);

    let mut world = World::new();
    println!("{}", query::welcome_banner(&world));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartRun {
            config,
            seed: cli.seed,
        },
        &mut events,
    );

    let mut pilot = Autopilot::new(cli.input_seed.unwrap_or(cli.seed), FIXED_STEP);
    let mut summary = Summary::default();
    report(&world, &events, &mut summary, cli.print_map);

    while summary.ticks < cli.ticks && query::phase(&world) == RunPhase::Running {
        let intent = pilot.next(&query::snapshot(&world));
        events.clear();
        world::apply(&mut world, Command::Tick { intent }, &mut events);
        summary.ticks += 1;
        report(&world, &events, &mut summary, cli.print_map);
    }

    if cli.print_map {
        print!("{}", map::render(&query::snapshot(&world)));
    }
    print_summary(&world, &summary);
    Ok(())
}

fn report(world: &World, events: &[Event], summary: &mut Summary, print_map: bool) {
    for event in events {
        summary.record(event);
        match event {
            Event::TimeAdvanced { .. } => {}
            Event::LevelStarted { .. } => {
                tracing::info!(?event, "event");
                if print_map {
                    print!("{}", map::render(&query::snapshot(world)));
                }
            }
            _ => tracing::debug!(?event, "event"),
        }
    }
}

fn print_summary(world: &World, summary: &Summary) {
    let snapshot = query::snapshot(world);
    let outcome = match snapshot.phase {
        RunPhase::Won => "escaped".to_owned(),
        RunPhase::Lost(reason) => format!("lost ({reason})"),
        RunPhase::Running => "still running".to_owned(),
        RunPhase::Idle => "not started".to_owned(),
    };

    println!("outcome:        {outcome}");
    println!("level:          {}", snapshot.level);
    println!("ticks:          {}", summary.ticks);
    println!("elapsed:        {:.2}s", snapshot.elapsed.as_secs_f32());
    println!("keys:           {}", summary.keys);
    println!("kills:          {}", summary.kills);
    println!("pickups:        {}", summary.pickups);
    println!("npcs consulted: {}", summary.consultations);
    println!("hallucinations: {}", summary.hallucinations);
    println!("damage taken:   {:.1}", summary.damage_taken);
    println!("escalation:     {:.2}", snapshot.escalation);
    if let Some(actor) = snapshot.actor {
        println!(
            "vitals:         health {:.0}% oxygen {:.0}% sanity {:.0}%",
            actor.health_percent, actor.oxygen_percent, actor.sanity_percent
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dread_maze_core::{DamageSource, EnemyId, PickupId, PickupKind};

    #[test]
    fn flags_override_the_base_config() {
        let cli = Cli::parse_from([
            "dread-maze",
            "--role",
            "butcher",
            "--tier",
            "hard",
            "--width",
            "31",
            "--levels",
            "2",
        ]);
        let base = RunConfig {
            grid_height: 17,
            ..RunConfig::default()
        };
        let config = cli.run_config(base);

        assert_eq!(config.archetype, Archetype::Butcher);
        assert_eq!(config.difficulty, DifficultyTier::Hard);
        assert_eq!(config.grid_width, 31);
        assert_eq!(config.grid_height, 17);
        assert_eq!(config.levels, 2);
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let cli = Cli::parse_from(["dread-maze"]);
        assert_eq!(cli.seed, 1);
        assert_eq!(cli.ticks, 36_000);
        assert!(cli.input_seed.is_none());
        assert!(!cli.print_map);
        assert_eq!(cli.run_config(RunConfig::default()), RunConfig::default());
    }

    #[test]
    fn summary_counts_relevant_events() {
        let mut summary = Summary::default();
        let events = [
            Event::KeyCollected {
                pickup: PickupId::new(0),
                remaining: 2,
            },
            Event::PickupTaken {
                pickup: PickupId::new(1),
                kind: PickupKind::OxygenTank { amount: 40.0 },
            },
            Event::EnemyKilled {
                enemy: EnemyId::new(3),
            },
            Event::PlayerDamaged {
                amount: 7.5,
                source: DamageSource::Bite {
                    enemy: EnemyId::new(3),
                },
            },
            Event::TimeAdvanced { dt: FIXED_STEP },
        ];
        for event in &events {
            summary.record(event);
        }

        assert_eq!(summary.keys, 1);
        assert_eq!(summary.pickups, 1);
        assert_eq!(summary.kills, 1);
        assert!((summary.damage_taken - 7.5).abs() < 1e-6);
    }
}
