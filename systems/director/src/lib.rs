#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behaviour state machine.
//!
//! Enemies roam until they hear the player, chase the position heard at their
//! last think, and freeze briefly when damaged. Intent is only re-evaluated
//! when the per-enemy think countdown expires, which spaces out decisions and
//! gives enemies a believable reaction lag. Steering is a plain vector toward
//! the target; sliding collision over the braided maze handles the rest.

use std::f32::consts::TAU;

use dread_maze_core::{DeterministicRng, Enemy, EnemyId, EnemyMode};
use glam::Vec2;

/// Hearing radius while the player walks, in tiles.
pub const WALK_HEARING_RADIUS: f32 = 5.6;
/// Hearing radius while the player sprints, in tiles.
pub const SPRINT_HEARING_RADIUS: f32 = 7.2;
/// Seconds an enemy stays frozen after taking damage.
pub const STAGGER_DURATION: f32 = 0.25;
/// Seconds between spits of a spitter enemy.
pub const SPIT_INTERVAL: f32 = 2.4;
/// Closest distance at which a spitter still spits.
pub const SPIT_MIN_DISTANCE: f32 = 2.0;

/// Tuning of the behaviour state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectorConfig {
    /// Hearing radius while the player walks.
    pub walk_hearing: f32,
    /// Hearing radius while the player sprints.
    pub sprint_hearing: f32,
    /// Factor on the hearing radius beyond which a chase is abandoned.
    pub chase_hysteresis: f32,
    /// Shortest think interval in seconds.
    pub think_min: f32,
    /// Longest think interval in seconds.
    pub think_max: f32,
    /// Distance below which a chasing enemy slows and wobbles.
    pub close_quarters: f32,
    /// Speed factor applied in close quarters.
    pub close_speed_factor: f32,
    /// Lateral wobble amplitude in close quarters.
    pub wobble_amplitude: f32,
    /// Wobble angular rate in radians per second.
    pub wobble_rate: f32,
    /// Speed factor applied while roaming.
    pub roam_speed_factor: f32,
    /// Shortest wander distance.
    pub wander_min: f32,
    /// Longest wander distance.
    pub wander_max: f32,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            walk_hearing: WALK_HEARING_RADIUS,
            sprint_hearing: SPRINT_HEARING_RADIUS,
            chase_hysteresis: 1.25,
            think_min: 0.25,
            think_max: 0.55,
            close_quarters: 1.25,
            close_speed_factor: 0.55,
            wobble_amplitude: 0.22,
            wobble_rate: 3.6,
            roam_speed_factor: 0.45,
            wander_min: 1.5,
            wander_max: 3.5,
        }
    }
}

/// What an enemy knows about the player during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perception {
    /// Player position.
    pub player: Vec2,
    /// Whether the player sprints.
    pub sprinting: bool,
    /// Multiplier on the hearing radius derived from status effects.
    pub hearing_multiplier: f32,
    /// Multiplier on enemy speed derived from effects and level scaling.
    pub speed_multiplier: f32,
    /// Seconds since the level started; drives the wobble phase.
    pub elapsed: f32,
}

/// Mode transition reported by the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeChange {
    /// Enemy that changed mode.
    pub enemy: EnemyId,
    /// Mode before the change.
    pub from: EnemyMode,
    /// Mode after the change.
    pub to: EnemyMode,
}

/// Movement and actions requested for one enemy in one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    /// Displacement to hand to the motion resolver.
    pub displacement: Vec2,
    /// Unit direction of a spit fired this tick.
    pub spit: Option<Vec2>,
    /// Mode transition that happened this tick.
    pub mode_change: Option<ModeChange>,
}

/// Behaviour state machine shared by every enemy of a level.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Director {
    config: DirectorConfig,
}

impl Director {
    /// Creates a director with the provided tuning.
    #[must_use]
    pub const fn new(config: DirectorConfig) -> Self {
        Self { config }
    }

    /// Tuning in use.
    #[must_use]
    pub const fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Hearing radius for the provided perception.
    #[must_use]
    pub fn hearing_radius(&self, perception: &Perception) -> f32 {
        let base = if perception.sprinting {
            self.config.sprint_hearing
        } else {
            self.config.walk_hearing
        };
        base * finite_non_negative(perception.hearing_multiplier)
    }

    /// Prepares a freshly placed enemy: staggers first thinks across the
    /// level and randomizes the wobble phase.
    pub fn arm(&self, enemy: &mut Enemy, rng: &mut DeterministicRng) {
        enemy.think_remaining = rng.range(0.0, self.config.think_max);
        enemy.think_interval = self.config.think_max;
        enemy.wobble_phase = rng.range(0.0, TAU);
        enemy.spit_cooldown = SPIT_INTERVAL;
    }

    /// Advances one enemy by `dt` and returns the steering it requests.
    pub fn steer(
        &self,
        enemy: &mut Enemy,
        perception: &Perception,
        dt: f32,
        rng: &mut DeterministicRng,
    ) -> Steering {
        let mut steering = Steering::default();
        enemy.bite_cooldown = (enemy.bite_cooldown - dt).max(0.0);
        enemy.spit_cooldown = (enemy.spit_cooldown - dt).max(0.0);

        if enemy.mode == EnemyMode::Staggered {
            enemy.stagger_remaining -= dt;
            if enemy.stagger_remaining > 0.0 {
                enemy.body.velocity = Vec2::ZERO;
                return steering;
            }
            steering.mode_change = Some(self.recover(enemy, rng));
        } else {
            enemy.think_remaining -= dt;
            if enemy.think_remaining <= 0.0 {
                steering.mode_change = self.think(enemy, perception, rng);
            }
        }

        steering.displacement = self.displacement(enemy, perception, dt);

        if enemy.spitter && enemy.mode == EnemyMode::Chase && enemy.spit_cooldown <= 0.0 {
            let offset = perception.player - enemy.body.position;
            let distance = offset.length();
            if distance >= SPIT_MIN_DISTANCE && distance <= self.hearing_radius(perception) {
                steering.spit = Some(offset / distance);
                enemy.spit_cooldown = SPIT_INTERVAL;
            }
        }

        steering
    }

    /// Forces the enemy into `Staggered`, remembering its prior intent.
    ///
    /// A stagger that lands on an already staggered enemy only refreshes the
    /// countdown. Damage overrides the think cadence, so entering and leaving
    /// `Staggered` are not spaced by the think interval. The think countdown is
    /// frozen meanwhile and recovery re-arms it, so the next think-driven
    /// change comes at least one full interval after recovery.
    pub fn stagger(&self, enemy: &mut Enemy) -> Option<ModeChange> {
        enemy.stagger_remaining = enemy.stagger_remaining.max(STAGGER_DURATION);
        enemy.body.velocity = Vec2::ZERO;
        if enemy.mode == EnemyMode::Staggered {
            return None;
        }

        let from = enemy.mode;
        enemy.intent = from;
        enemy.mode = EnemyMode::Staggered;
        tracing::trace!(enemy = enemy.id.get(), ?from, "enemy staggered");
        Some(ModeChange {
            enemy: enemy.id,
            from,
            to: EnemyMode::Staggered,
        })
    }

    fn recover(&self, enemy: &mut Enemy, rng: &mut DeterministicRng) -> ModeChange {
        enemy.stagger_remaining = 0.0;
        enemy.mode = enemy.intent;
        self.rearm(enemy, rng);
        tracing::trace!(enemy = enemy.id.get(), to = ?enemy.mode, "enemy recovered");
        ModeChange {
            enemy: enemy.id,
            from: EnemyMode::Staggered,
            to: enemy.mode,
        }
    }

    fn think(
        &self,
        enemy: &mut Enemy,
        perception: &Perception,
        rng: &mut DeterministicRng,
    ) -> Option<ModeChange> {
        let hearing = self.hearing_radius(perception);
        let distance = enemy.body.position.distance(perception.player);
        let hears = match enemy.mode {
            EnemyMode::Chase => distance <= hearing * self.config.chase_hysteresis,
            EnemyMode::Roam | EnemyMode::Staggered => distance < hearing,
        };

        let next = if hears {
            enemy.target = Some(perception.player);
            EnemyMode::Chase
        } else {
            let angle = rng.range(0.0, TAU);
            let reach = rng.range(self.config.wander_min, self.config.wander_max);
            enemy.target = Some(enemy.body.position + Vec2::from_angle(angle) * reach);
            EnemyMode::Roam
        };
        self.rearm(enemy, rng);

        if next == enemy.mode {
            return None;
        }
        let from = enemy.mode;
        enemy.mode = next;
        enemy.intent = next;
        tracing::trace!(enemy = enemy.id.get(), ?from, to = ?next, distance, "enemy mode changed");
        Some(ModeChange {
            enemy: enemy.id,
            from,
            to: next,
        })
    }

    fn rearm(&self, enemy: &mut Enemy, rng: &mut DeterministicRng) {
        enemy.think_interval = rng.range(self.config.think_min, self.config.think_max);
        enemy.think_remaining = enemy.think_interval;
    }

    fn displacement(&self, enemy: &Enemy, perception: &Perception, dt: f32) -> Vec2 {
        let Some(target) = enemy.target else {
            return Vec2::ZERO;
        };
        let offset = target - enemy.body.position;
        if offset.length_squared() < 1e-4 {
            return Vec2::ZERO;
        }
        let toward = offset.normalize_or_zero();
        let speed = enemy.speed * finite_non_negative(perception.speed_multiplier);

        let (direction, factor) = match enemy.mode {
            EnemyMode::Chase => {
                let distance = enemy.body.position.distance(perception.player);
                if distance < self.config.close_quarters {
                    let sway = (enemy.wobble_phase + perception.elapsed * self.config.wobble_rate)
                        .sin()
                        * self.config.wobble_amplitude;
                    let lateral = toward.perp() * sway;
                    (
                        (toward + lateral).normalize_or_zero(),
                        self.config.close_speed_factor,
                    )
                } else {
                    (toward, 1.0)
                }
            }
            EnemyMode::Roam => (toward, self.config.roam_speed_factor),
            EnemyMode::Staggered => (Vec2::ZERO, 0.0),
        };

        let step = direction * speed * factor * dt;
        if step.length_squared() > offset.length_squared() && enemy.mode == EnemyMode::Roam {
            offset
        } else {
            step
        }
    }
}

fn finite_non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy_at(position: Vec2) -> Enemy {
        let mut enemy = Enemy::new(EnemyId::new(0), position, 50.0, 2.3, 10.0);
        enemy.think_remaining = 0.0;
        enemy
    }

    fn perception(player: Vec2, sprinting: bool) -> Perception {
        Perception {
            player,
            sprinting,
            hearing_multiplier: 1.0,
            speed_multiplier: 1.0,
            elapsed: 0.0,
        }
    }

    #[test]
    fn enemy_within_walking_hearing_starts_chasing() {
        let director = Director::default();
        let mut rng = DeterministicRng::new(1);
        let mut enemy = enemy_at(Vec2::new(1.5, 1.5));
        let player = Vec2::new(5.5, 1.5);

        let walking = perception(player, false);
        let steering = director.steer(&mut enemy, &walking, 1.0 / 60.0, &mut rng);

        assert_eq!(enemy.mode, EnemyMode::Chase);
        assert_eq!(enemy.target, Some(player));
        assert_eq!(
            steering.mode_change.map(|change| change.to),
            Some(EnemyMode::Chase)
        );
        assert!(steering.displacement.x > 0.0);
    }

    #[test]
    fn sprinting_extends_the_hearing_radius() {
        let director = Director::default();
        let mut rng = DeterministicRng::new(2);
        let player = Vec2::new(8.0, 1.5);

        let mut walking = enemy_at(Vec2::new(1.5, 1.5));
        let _ = director.steer(&mut walking, &perception(player, false), 0.01, &mut rng);
        assert_eq!(walking.mode, EnemyMode::Roam);

        let mut sprinting = enemy_at(Vec2::new(1.5, 1.5));
        let _ = director.steer(&mut sprinting, &perception(player, true), 0.01, &mut rng);
        assert_eq!(sprinting.mode, EnemyMode::Chase);
    }

    #[test]
    fn chase_persists_inside_the_hysteresis_band() {
        let director = Director::default();
        let mut rng = DeterministicRng::new(3);
        let mut enemy = enemy_at(Vec2::new(0.0, 0.0));
        enemy.mode = EnemyMode::Chase;
        enemy.intent = EnemyMode::Chase;

        let near = perception(Vec2::new(6.5, 0.0), false);
        let _ = director.steer(&mut enemy, &near, 0.01, &mut rng);
        assert_eq!(enemy.mode, EnemyMode::Chase);

        enemy.think_remaining = 0.0;
        let far = Vec2::new(enemy.body.position.x + 7.5, 0.0);
        let _ = director.steer(&mut enemy, &perception(far, false), 0.01, &mut rng);
        assert_eq!(enemy.mode, EnemyMode::Roam);
    }

    #[test]
    fn intent_waits_for_the_think_countdown() {
        let director = Director::default();
        let mut rng = DeterministicRng::new(4);
        let mut enemy = enemy_at(Vec2::new(0.0, 0.0));
        enemy.think_remaining = 0.3;

        let heard = perception(Vec2::new(2.0, 0.0), false);
        let steering = director.steer(&mut enemy, &heard, 0.1, &mut rng);

        assert_eq!(enemy.mode, EnemyMode::Roam);
        assert!(steering.mode_change.is_none());
        assert!((enemy.think_remaining - 0.2).abs() < 1e-6);
    }

    #[test]
    fn stagger_freezes_then_resumes_prior_intent() {
        let director = Director::default();
        let mut rng = DeterministicRng::new(5);
        let mut enemy = enemy_at(Vec2::new(0.0, 0.0));
        let player = Vec2::new(3.0, 0.0);
        let _ = director.steer(&mut enemy, &perception(player, false), 0.01, &mut rng);
        assert_eq!(enemy.mode, EnemyMode::Chase);
        let think_before = enemy.think_remaining;

        let change = director.stagger(&mut enemy);
        assert_eq!(
            change,
            Some(ModeChange {
                enemy: EnemyId::new(0),
                from: EnemyMode::Chase,
                to: EnemyMode::Staggered,
            })
        );
        assert!(director.stagger(&mut enemy).is_none());

        let frozen = director.steer(&mut enemy, &perception(player, false), 0.1, &mut rng);
        assert_eq!(frozen.displacement, Vec2::ZERO);
        assert_eq!(enemy.mode, EnemyMode::Staggered);
        assert!((enemy.think_remaining - think_before).abs() < f32::EPSILON);

        let resumed = director.steer(&mut enemy, &perception(player, false), 0.2, &mut rng);
        assert_eq!(enemy.mode, EnemyMode::Chase);
        assert_eq!(
            resumed.mode_change.map(|change| change.to),
            Some(EnemyMode::Chase)
        );
        assert!(enemy.think_remaining >= 0.25);
    }

    #[test]
    fn close_quarters_slow_the_approach() {
        let director = Director::default();
        let mut rng = DeterministicRng::new(6);
        let dt = 0.1;

        let mut far = enemy_at(Vec2::new(0.0, 0.0));
        let far_step = director
            .steer(&mut far, &perception(Vec2::new(3.0, 0.0), false), dt, &mut rng)
            .displacement;

        let mut near = enemy_at(Vec2::new(0.0, 0.0));
        let near_step = director
            .steer(&mut near, &perception(Vec2::new(1.0, 0.0), false), dt, &mut rng)
            .displacement;

        assert!((far_step.length() - 2.3 * dt).abs() < 1e-5);
        assert!((near_step.length() - 2.3 * 0.55 * dt).abs() < 1e-5);
    }

    #[test]
    fn calm_multiplier_shrinks_hearing() {
        let director = Director::default();
        let mut calm = perception(Vec2::ZERO, false);
        calm.hearing_multiplier = 0.8;
        assert!((director.hearing_radius(&calm) - 5.6 * 0.8).abs() < 1e-5);
    }
}
