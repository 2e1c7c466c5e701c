#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat resolution: melee arcs, projectiles, contact bites, kills and the
//! hallucinations that escalation breeds.
//!
//! Every kill costs the actor sanity and raises escalation, which in turn
//! feeds spawn density, clue corruption and hallucination frequency.

use std::f32::consts::{PI, TAU};

use dread_maze_core::{
    Actor, AttackProfile, DamageSource, DeterministicRng, Enemy, EnemyId, EnemyMode, Escalation,
    Event, Grid, HallucinationKind, MeleeProfile, Projectile, ProjectileId, RangedProfile, Side,
    StatusEffect, StatusEffectKind,
};
use glam::Vec2;

/// Contact distance below which an enemy bites.
pub const BITE_REACH: f32 = 0.85;
/// Seconds between bites of the same enemy.
pub const BITE_COOLDOWN: f32 = 0.65;
/// Duration of the grief applied by a bite.
pub const BITE_GRIEF_DURATION: f32 = 6.0;
/// Lifetime of projectiles fired by the actor.
pub const PLAYER_PROJECTILE_LIFETIME: f32 = 0.85;
/// Lifetime of spit projectiles.
pub const SPIT_LIFETIME: f32 = 1.6;
/// Speed of spit projectiles.
pub const SPIT_SPEED: f32 = 6.0;
/// Spit damage as a fraction of the bite damage.
pub const SPIT_DAMAGE_FACTOR: f32 = 0.6;
/// Collision radius of spit projectiles.
pub const SPIT_RADIUS: f32 = 0.2;
/// Escalation added by every kill.
pub const KILL_ESCALATION: f32 = 0.6;
/// Sanity removed by every kill.
pub const KILL_SANITY_PENALTY: f32 = 5.0;
/// Duration of the grief applied by a kill.
pub const KILL_GRIEF_DURATION: f32 = 8.0;
/// Escalation added per second of survival.
pub const ESCALATION_PER_SECOND: f32 = 0.005;
/// Longest distance a projectile travels between hit tests, in tiles.
pub const PROJECTILE_SUB_STEP: f32 = 0.25;
/// Upper bound on hit tests per projectile and call.
const MAX_PROJECTILE_SUB_STEPS: usize = 64;

/// Stateful part of combat resolution: projectile identifier allocation.
#[derive(Debug, Default)]
pub struct Encounter {
    next_projectile: u32,
}

impl Encounter {
    /// Creates an encounter resolver with a fresh identifier sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Performs the actor's attack if the cooldown allows it.
    ///
    /// Melee damages every living enemy in the arc at once; ranged attacks
    /// spawn a projectile. Returns the enemies damaged this call.
    pub fn attack(
        &mut self,
        actor: &mut Actor,
        enemies: &mut [Enemy],
        projectiles: &mut Vec<Projectile>,
        damage_multiplier: f32,
        rng: &mut DeterministicRng,
        out_events: &mut Vec<Event>,
    ) -> Vec<EnemyId> {
        if actor.attack_cooldown > 0.0 {
            return Vec::new();
        }

        match actor.archetype.stats().attack {
            AttackProfile::Melee(profile) => {
                actor.attack_cooldown = profile.cooldown;
                cleave(actor, enemies, &profile, damage_multiplier, out_events)
            }
            AttackProfile::Ranged(profile) => {
                actor.attack_cooldown = profile.cooldown;
                self.fire(actor, &profile, damage_multiplier, rng, projectiles, out_events);
                Vec::new()
            }
        }
    }

    /// Spawns a spit projectile from an enemy along `direction`.
    pub fn spit(
        &mut self,
        enemy: &Enemy,
        direction: Vec2,
        projectiles: &mut Vec<Projectile>,
        out_events: &mut Vec<Event>,
    ) {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return;
        }
        let id = self.allocate();
        projectiles.push(Projectile {
            id,
            position: enemy.body.position + direction * enemy.body.radius,
            velocity: direction * SPIT_SPEED,
            remaining: SPIT_LIFETIME,
            side: Side::Enemy,
            damage: enemy.damage * SPIT_DAMAGE_FACTOR,
            radius: SPIT_RADIUS,
        });
        out_events.push(Event::ProjectileFired {
            projectile: id,
            side: Side::Enemy,
        });
    }

    fn fire(
        &mut self,
        actor: &Actor,
        profile: &RangedProfile,
        damage_multiplier: f32,
        rng: &mut DeterministicRng,
        projectiles: &mut Vec<Projectile>,
        out_events: &mut Vec<Event>,
    ) {
        let spread = if profile.spread > 0.0 {
            rng.range(-profile.spread, profile.spread)
        } else {
            0.0
        };
        let direction = Vec2::from_angle(actor.facing + spread);
        let id = self.allocate();
        projectiles.push(Projectile {
            id,
            position: actor.body.position + direction * profile.muzzle_offset,
            velocity: direction * profile.speed,
            remaining: PLAYER_PROJECTILE_LIFETIME,
            side: Side::Player,
            damage: profile.damage * damage_multiplier,
            radius: profile.radius,
        });
        out_events.push(Event::ProjectileFired {
            projectile: id,
            side: Side::Player,
        });
    }

    fn allocate(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile);
        self.next_projectile = self.next_projectile.wrapping_add(1);
        id
    }
}

fn cleave(
    actor: &Actor,
    enemies: &mut [Enemy],
    profile: &MeleeProfile,
    damage_multiplier: f32,
    out_events: &mut Vec<Event>,
) -> Vec<EnemyId> {
    let damage = profile.damage * damage_multiplier;
    let targets = melee_targets(
        actor.body.position,
        actor.facing,
        enemies,
        profile.range,
        profile.half_angle,
    );
    let mut damaged = Vec::with_capacity(targets.len());
    for index in targets {
        if let Some(enemy) = enemies.get_mut(index) {
            damage_enemy(enemy, damage, out_events);
            damaged.push(enemy.id);
        }
    }
    damaged
}

/// Absolute difference between two angles, wrapped into `[0, pi]`.
#[must_use]
pub fn angle_difference(a: f32, b: f32) -> f32 {
    let difference = (a - b).rem_euclid(TAU);
    if difference > PI {
        TAU - difference
    } else {
        difference
    }
}

/// Reports whether `target` lies inside a cleave arc.
#[must_use]
pub fn in_cleave(origin: Vec2, facing: f32, target: Vec2, range: f32, half_angle: f32) -> bool {
    let offset = target - origin;
    let distance = offset.length();
    if distance > range {
        return false;
    }
    if distance <= f32::EPSILON {
        return true;
    }
    angle_difference(facing, offset.y.atan2(offset.x)) <= half_angle
}

/// Indices of living enemies inside the cleave arc, in slice order.
#[must_use]
pub fn melee_targets(
    origin: Vec2,
    facing: f32,
    enemies: &[Enemy],
    range: f32,
    half_angle: f32,
) -> Vec<usize> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| enemy.is_alive())
        .filter(|(_, enemy)| in_cleave(origin, facing, enemy.body.position, range, half_angle))
        .map(|(index, _)| index)
        .collect()
}

/// Integrates projectiles and resolves their hits.
///
/// A projectile first ages by `dt` and is dropped once its lifetime is spent.
/// Survivors travel in sub-steps of at most [`PROJECTILE_SUB_STEP`] tiles and
/// are removed on wall contact or on their first hit. Returns the enemies
/// damaged this call.
pub fn step_projectiles(
    grid: &Grid,
    projectiles: &mut Vec<Projectile>,
    actor: &mut Actor,
    enemies: &mut [Enemy],
    dt: f32,
    out_events: &mut Vec<Event>,
) -> Vec<EnemyId> {
    let mut damaged = Vec::new();
    projectiles.retain_mut(|projectile| {
        projectile.remaining -= dt;
        if projectile.remaining <= 0.0 {
            return false;
        }

        let travel = projectile.velocity * dt;
        let steps = ((travel.length() / PROJECTILE_SUB_STEP).ceil() as usize)
            .clamp(1, MAX_PROJECTILE_SUB_STEPS);
        let step = travel / steps as f32;
        for _ in 0..steps {
            projectile.position += step;
            if grid.is_solid_at(projectile.position) {
                return false;
            }
            if strike(projectile, actor, enemies, &mut damaged, out_events) {
                return false;
            }
        }
        true
    });
    damaged
}

/// Applies the projectile to the first body it overlaps, reporting a hit.
fn strike(
    projectile: &Projectile,
    actor: &mut Actor,
    enemies: &mut [Enemy],
    damaged: &mut Vec<EnemyId>,
    out_events: &mut Vec<Event>,
) -> bool {
    match projectile.side {
        Side::Player => {
            let hit = enemies.iter_mut().find(|enemy| {
                enemy.is_alive()
                    && enemy.body.position.distance(projectile.position)
                        < enemy.body.radius + projectile.radius
            });
            let Some(enemy) = hit else {
                return false;
            };
            damage_enemy(enemy, projectile.damage, out_events);
            damaged.push(enemy.id);
            true
        }
        Side::Enemy => {
            if actor.body.position.distance(projectile.position)
                >= actor.body.radius + projectile.radius
            {
                return false;
            }
            actor.vitals.health.drain(projectile.damage);
            out_events.push(Event::PlayerDamaged {
                amount: projectile.damage,
                source: DamageSource::Spit {
                    projectile: projectile.id,
                },
            });
            true
        }
    }
}

/// Applies contact bites from every ready, unstaggered enemy within reach.
pub fn resolve_bites(actor: &mut Actor, enemies: &mut [Enemy], out_events: &mut Vec<Event>) {
    for enemy in enemies.iter_mut() {
        if !enemy.is_alive() || enemy.mode == EnemyMode::Staggered || enemy.bite_cooldown > 0.0 {
            continue;
        }
        if enemy.body.position.distance(actor.body.position) >= BITE_REACH {
            continue;
        }

        enemy.bite_cooldown = BITE_COOLDOWN;
        actor.vitals.health.drain(enemy.damage);
        out_events.push(Event::PlayerDamaged {
            amount: enemy.damage,
            source: DamageSource::Bite { enemy: enemy.id },
        });
        let grief = StatusEffect::new(StatusEffectKind::Grief, BITE_GRIEF_DURATION, 0.0);
        actor.effects.apply(grief);
        out_events.push(Event::EffectApplied { effect: grief });
    }
}

/// Removes dead enemies and charges the actor for each kill.
///
/// Each kill emits `EnemyKilled`, raises escalation, costs sanity, applies
/// grief and may trigger a hallucination. Returns the number of kills.
pub fn resolve_kills(
    enemies: &mut Vec<Enemy>,
    actor: &mut Actor,
    escalation: &mut Escalation,
    rng: &mut DeterministicRng,
    out_events: &mut Vec<Event>,
) -> usize {
    let before = enemies.len();
    enemies.retain(|enemy| {
        if enemy.is_alive() {
            return true;
        }

        out_events.push(Event::EnemyKilled { enemy: enemy.id });
        escalation.raise(KILL_ESCALATION);
        actor.vitals.sanity.drain(KILL_SANITY_PENALTY);
        let grief = StatusEffect::new(StatusEffectKind::Grief, KILL_GRIEF_DURATION, 0.0);
        actor.effects.apply(grief);
        out_events.push(Event::EffectApplied { effect: grief });
        tracing::debug!(
            enemy = enemy.id.get(),
            escalation = escalation.value(),
            "enemy killed"
        );

        if rng.chance(kill_hallucination_chance(escalation.value())) {
            out_events.push(Event::HallucinationTriggered {
                kind: roll_hallucination(rng),
            });
        }
        false
    });
    before - enemies.len()
}

/// Raises escalation for time survived and rolls an ambient hallucination.
pub fn escalate_over_time(
    escalation: &mut Escalation,
    dt: f32,
    rng: &mut DeterministicRng,
    out_events: &mut Vec<Event>,
) {
    escalation.raise(ESCALATION_PER_SECOND * dt);
    if rng.chance(ambient_hallucination_chance(escalation.value(), dt)) {
        out_events.push(Event::HallucinationTriggered {
            kind: roll_hallucination(rng),
        });
    }
}

/// Probability that a kill triggers a hallucination.
#[must_use]
pub fn kill_hallucination_chance(escalation: f32) -> f32 {
    (0.25 + 0.15 * escalation).clamp(0.0, 0.9)
}

/// Probability of an ambient hallucination during a tick of length `dt`.
#[must_use]
pub fn ambient_hallucination_chance(escalation: f32, dt: f32) -> f32 {
    (0.01 * escalation * dt).max(0.0)
}

fn roll_hallucination(rng: &mut DeterministicRng) -> HallucinationKind {
    rng.pick(&HallucinationKind::ALL)
        .copied()
        .unwrap_or(HallucinationKind::Whisper)
}

fn damage_enemy(enemy: &mut Enemy, amount: f32, out_events: &mut Vec<Event>) {
    enemy.health -= amount;
    out_events.push(Event::EnemyDamaged {
        enemy: enemy.id,
        amount,
    });
}
