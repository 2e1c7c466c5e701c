use std::time::Duration;

use dread_maze_core::{
    CellCoord, Command, DifficultyTier, Event, InputIntent, LossReason, RunConfig, RunPhase,
    WELCOME_BANNER,
};
use dread_maze_world::{self as world, query, World};
use glam::Vec2;

const STEP: Duration = Duration::from_millis(100);

fn small_room(levels: u32) -> RunConfig {
    RunConfig {
        grid_width: 2,
        grid_height: 2,
        difficulty: DifficultyTier::Hard,
        levels,
        ..RunConfig::default()
    }
}

fn start(world: &mut World, config: RunConfig, seed: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::StartRun { config, seed }, &mut events);
    events
}

fn tick(world: &mut World, intent: InputIntent) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { intent }, &mut events);
    events
}

fn walk_diagonally() -> InputIntent {
    InputIntent {
        move_vector: Vec2::ONE,
        ..InputIntent::idle(STEP)
    }
}

#[test]
fn idle_world_ignores_ticks() {
    let mut world = World::new();
    assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    assert_eq!(query::phase(&world), RunPhase::Idle);

    assert!(tick(&mut world, InputIntent::idle(STEP)).is_empty());

    let mut events = Vec::new();
    world::apply(&mut world, Command::ResetRun, &mut events);
    assert!(events.is_empty());
    assert_eq!(query::phase(&world), RunPhase::Idle);
}

#[test]
fn small_room_starts_with_an_open_exit() {
    let mut world = World::new();
    let events = start(&mut world, small_room(1), 42);

    assert_eq!(
        events,
        vec![
            Event::LevelStarted {
                level: 1,
                start: CellCoord::new(0, 0),
                keys_required: 0,
            },
            Event::ExitUnlocked {
                exit: CellCoord::new(1, 1),
            },
        ]
    );
    let snapshot = query::snapshot(&world);
    assert!(snapshot.enemies.is_empty());
    assert!(snapshot.pickups.is_empty());
    assert!(snapshot.exit_unlocked);
}

#[test]
fn standing_still_ends_in_suffocation() {
    let mut world = World::new();
    let _ = start(&mut world, small_room(1), 42);

    let mut losses = Vec::new();
    for _ in 0..3000 {
        for event in tick(&mut world, InputIntent::idle(STEP)) {
            if let Event::Lost { reason } = event {
                losses.push(reason);
            }
        }
    }

    assert_eq!(losses, vec![LossReason::Suffocation]);
    assert_eq!(query::phase(&world), RunPhase::Lost(LossReason::Suffocation));
    assert!(tick(&mut world, InputIntent::idle(STEP)).is_empty());
}

#[test]
fn reaching_the_exit_advances_then_wins() {
    let mut world = World::new();
    let _ = start(&mut world, small_room(2), 7);

    let mut milestones = Vec::new();
    for _ in 0..400 {
        if query::phase(&world).is_over() {
            break;
        }
        for event in tick(&mut world, walk_diagonally()) {
            match event {
                Event::LevelAdvanced { .. } | Event::Won { .. } | Event::LevelStarted { .. } => {
                    milestones.push(event)
                }
                _ => {}
            }
        }
    }

    assert_eq!(
        milestones,
        vec![
            Event::LevelAdvanced { level: 2 },
            Event::LevelStarted {
                level: 2,
                start: CellCoord::new(0, 0),
                keys_required: 0,
            },
            Event::Won { levels: 2 },
        ]
    );
    assert_eq!(query::phase(&world), RunPhase::Won);
    assert!(tick(&mut world, walk_diagonally()).is_empty());
}

#[test]
fn vitals_carry_over_between_levels() {
    let mut world = World::new();
    let _ = start(&mut world, small_room(2), 3);

    let mut oxygen_before = None;
    for _ in 0..400 {
        let before = query::snapshot(&world)
            .actor
            .map(|actor| actor.oxygen_percent);
        let events = tick(&mut world, walk_diagonally());
        if events
            .iter()
            .any(|event| matches!(event, Event::LevelAdvanced { .. }))
        {
            oxygen_before = before;
            break;
        }
    }

    let before = oxygen_before.expect("level advanced");
    let after = query::snapshot(&world)
        .actor
        .map(|actor| actor.oxygen_percent)
        .expect("actor present");
    assert!(before < 100.0);
    assert!((after - before).abs() < 1e-4);
    assert_eq!(query::level(&world), 2);
}

#[test]
fn reset_rebuilds_the_same_run() {
    let mut world = World::new();
    let config = RunConfig {
        grid_width: 21,
        grid_height: 15,
        ..RunConfig::default()
    };
    let first = start(&mut world, config, 99);
    let grid = query::grid(&world).clone();
    for _ in 0..20 {
        let _ = tick(&mut world, walk_diagonally());
    }

    let mut second = Vec::new();
    world::apply(&mut world, Command::ResetRun, &mut second);

    assert_eq!(first, second);
    assert_eq!(query::grid(&world), &grid);
    assert_eq!(query::elapsed(&world), Duration::ZERO);
    assert_eq!(query::escalation(&world), 0.0);
}

#[test]
fn out_of_range_config_is_sanitized() {
    let mut world = World::new();
    let config = RunConfig {
        grid_width: 0,
        grid_height: 10_000,
        levels: 0,
        braid_probability: f32::NAN,
        ..RunConfig::default()
    };
    let _ = start(&mut world, config, 1);

    let sanitized = query::config(&world);
    assert!(sanitized.grid_width >= 1);
    assert!(sanitized.grid_height <= 255);
    assert!(sanitized.levels >= 1);
    assert!(sanitized.braid_probability.is_finite());
    assert_eq!(query::phase(&world), RunPhase::Running);
}
