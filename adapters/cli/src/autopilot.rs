use std::time::Duration;

use dread_maze_core::{
    cell_center, DeterministicRng, EnemyMode, InputIntent, PickupKind, RunSnapshot,
};
use glam::Vec2;

/// Enemies closer than this are attacked.
const ENGAGE_RANGE: f32 = 4.0;
/// Chasing enemies closer than this make the autopilot sprint away.
const FLEE_RANGE: f32 = 2.5;
/// NPCs closer than this are consulted.
const CONSULT_RANGE: f32 = 1.0;
/// Pickups farther than this are ignored in favour of wandering.
const SEEK_RANGE: f32 = 8.0;
/// Ticks a wander heading is held before a new one is rolled.
const WANDER_HOLD: (usize, usize) = (45, 120);

/// Seeded input source that plays a run without a human.
///
/// Heads for the unlocked exit when it is close, otherwise for nearby keys
/// and supplies. Attacks whatever comes close and wanders when idle.
#[derive(Clone, Debug)]
pub(crate) struct Autopilot {
    rng: DeterministicRng,
    heading: f32,
    hold: usize,
    dt: Duration,
}

impl Autopilot {
    pub(crate) fn new(seed: u64, dt: Duration) -> Self {
        Self {
            rng: DeterministicRng::new(seed),
            heading: 0.0,
            hold: 0,
            dt,
        }
    }

    /// Chooses the intent for the next tick from the current snapshot.
    pub(crate) fn next(&mut self, snapshot: &RunSnapshot<'_>) -> InputIntent {
        let Some(actor) = snapshot.actor.as_ref() else {
            return InputIntent::idle(self.dt);
        };
        let position = actor.position;

        let threat = snapshot
            .enemies
            .iter()
            .map(|enemy| (enemy.position.distance(position), enemy))
            .min_by(|(a, _), (b, _)| a.total_cmp(b));

        let mut intent = InputIntent::idle(self.dt);
        if let Some((distance, enemy)) = threat {
            if distance <= ENGAGE_RANGE {
                let toward = enemy.position - position;
                intent.aim = Some(toward.y.atan2(toward.x));
                intent.attack_requested = true;
            }
            intent.sprinting = distance <= FLEE_RANGE && enemy.mode == EnemyMode::Chase;
        }

        intent.interact_requested = snapshot
            .npcs
            .iter()
            .any(|npc| !npc.used && npc.position.distance(position) <= CONSULT_RANGE);

        intent.move_vector = match goal(snapshot, position) {
            Some(goal) => (goal - position).normalize_or_zero(),
            None => self.wander(),
        };
        intent
    }

    fn wander(&mut self) -> Vec2 {
        if self.hold == 0 {
            self.heading = self.rng.range(-std::f32::consts::PI, std::f32::consts::PI);
            let (min, max) = WANDER_HOLD;
            self.hold = min + self.rng.below(max - min);
        }
        self.hold -= 1;
        Vec2::from_angle(self.heading)
    }
}

/// Closest worthwhile target: the unlocked exit, else a nearby key or supply.
fn goal(snapshot: &RunSnapshot<'_>, position: Vec2) -> Option<Vec2> {
    if snapshot.exit_unlocked {
        let exit = cell_center(snapshot.exit);
        if exit.distance(position) <= SEEK_RANGE {
            return Some(exit);
        }
    }

    snapshot
        .pickups
        .iter()
        .filter(|pickup| !matches!(pickup.kind, PickupKind::Clue { corrupted: true }))
        .map(|pickup| cell_center(pickup.cell))
        .map(|center| (center.distance(position), center))
        .filter(|(distance, _)| *distance <= SEEK_RANGE)
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, center)| center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dread_maze_core::{Command, DifficultyTier, RunConfig};
    use dread_maze_world::{self as world, query, World};

    fn running_world(seed: u64) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::StartRun {
                config: RunConfig {
                    grid_width: 21,
                    grid_height: 15,
                    difficulty: DifficultyTier::Easy,
                    ..RunConfig::default()
                },
                seed,
            },
            &mut events,
        );
        world
    }

    fn drive(seed: u64, ticks: usize) -> Vec<InputIntent> {
        let mut world = running_world(seed);
        let mut pilot = Autopilot::new(seed, Duration::from_micros(16_667));
        let mut intents = Vec::new();
        for _ in 0..ticks {
            let intent = pilot.next(&query::snapshot(&world));
            intents.push(intent);
            let mut events = Vec::new();
            world::apply(&mut world, Command::Tick { intent }, &mut events);
        }
        intents
    }

    #[test]
    fn identical_seeds_steer_identically() {
        assert_eq!(drive(17, 240), drive(17, 240));
    }

    #[test]
    fn intents_carry_the_fixed_step() {
        for intent in drive(3, 30) {
            assert_eq!(intent.dt, Duration::from_micros(16_667));
            assert!(intent.move_vector.length() <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn idle_world_yields_idle_intent() {
        let world = World::new();
        let mut pilot = Autopilot::new(1, Duration::from_millis(10));
        let intent = pilot.next(&query::snapshot(&world));
        assert_eq!(intent, InputIntent::idle(Duration::from_millis(10)));
    }
}
