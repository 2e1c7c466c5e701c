//! Fixed-step tick of a running level.
//!
//! Phase order inside a tick: movement, encounters, pickups and exit,
//! resource decay, then escalation feedback. Modifiers derived at the end of
//! a tick and escalation raised during it are only consumed by the next one.
//! An actor slain by an encounter loses before the exit is considered.

use std::time::Duration;

use dread_maze_core::{
    Actor, CellCoord, DeterministicRng, DifficultyTier, EnemyId, Escalation, Event, InputIntent,
    LossReason, Modifiers, PickupKind, RunPhase, SPRINT_MULTIPLIER,
};
use dread_maze_system_director::{Director, Perception};
use dread_maze_system_encounter::{
    escalate_over_time, resolve_bites, resolve_kills, step_projectiles, Encounter,
};
use dread_maze_system_motion::move_body_with_push_out;
use dread_maze_system_resources::{
    apply_gift, decay, derive_modifiers, read_clue, restore_oxygen, DecayContext,
};
use glam::Vec2;

use crate::level::Level;
use crate::World;

/// Reach within which the actor can consult an NPC.
pub(crate) const NPC_INTERACT_RANGE: f32 = 1.05;
/// Longest step a single tick simulates; longer intents are truncated.
pub(crate) const MAX_TICK: Duration = Duration::from_millis(250);

/// How a tick ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// The level keeps running.
    Continue,
    /// The actor stepped onto the unlocked exit.
    ExitReached,
    /// The run was lost.
    Lost(LossReason),
}

pub(crate) fn tick(world: &mut World, intent: &InputIntent, out_events: &mut Vec<Event>) {
    let dt = intent.dt.min(MAX_TICK);
    out_events.push(Event::TimeAdvanced { dt });
    world.elapsed = world.elapsed.saturating_add(dt);
    world.tick_index = world.tick_index.saturating_add(1);

    let outcome = {
        let Some(actor) = world.actor.as_mut() else {
            return;
        };
        let mut step = Step {
            actor,
            level: &mut world.level,
            escalation: &mut world.escalation,
            modifiers: &mut world.modifiers,
            director: &world.director,
            encounter: &mut world.encounter,
            rng: &mut world.rng,
            tier: world.config.difficulty,
        };
        step.run(intent, seconds(dt), out_events)
    };

    match outcome {
        TickOutcome::Continue => {}
        TickOutcome::ExitReached => crate::complete_level(world, out_events),
        TickOutcome::Lost(reason) => {
            world.phase = RunPhase::Lost(reason);
            tracing::info!(
                level = world.level.number,
                %reason,
                elapsed = ?world.elapsed,
                "run lost"
            );
            out_events.push(Event::Lost { reason });
        }
    }
}

struct Step<'a> {
    actor: &'a mut Actor,
    level: &'a mut Level,
    escalation: &'a mut Escalation,
    modifiers: &'a mut Modifiers,
    director: &'a Director,
    encounter: &'a mut Encounter,
    rng: &'a mut DeterministicRng,
    tier: DifficultyTier,
}

impl Step<'_> {
    fn run(
        &mut self,
        intent: &InputIntent,
        dt: f32,
        out_events: &mut Vec<Event>,
    ) -> TickOutcome {
        self.level.elapsed += dt;
        let escalation = self.escalation.value();

        let sprinting = self.move_actor(intent, dt);
        self.move_enemies(sprinting, dt, out_events);
        self.resolve_encounters(intent, dt, out_events);
        if self.actor.vitals.health.is_empty() {
            return TickOutcome::Lost(LossReason::Slain);
        }

        if self.collect_pickups(out_events) {
            return TickOutcome::ExitReached;
        }
        if intent.interact_requested {
            self.consult_npc(out_events);
        }

        let report = decay(
            self.actor,
            &DecayContext {
                dt,
                sprinting,
                tier: self.tier,
                escalation,
                level: self.level.number,
                sanity_drift: self.modifiers.sanity_drift,
            },
        );
        if report.suffocated {
            return TickOutcome::Lost(LossReason::Suffocation);
        }
        if report.health_depleted {
            return TickOutcome::Lost(LossReason::Slain);
        }

        escalate_over_time(self.escalation, dt, self.rng, out_events);
        *self.modifiers = derive_modifiers(&self.actor.effects, &self.actor.vitals);
        TickOutcome::Continue
    }

    /// Moves the actor and returns whether it is sprinting this tick.
    fn move_actor(&mut self, intent: &InputIntent, dt: f32) -> bool {
        let actor = &mut *self.actor;
        actor.attack_cooldown = (actor.attack_cooldown - dt).max(0.0);

        let direction = if intent.move_vector.is_finite() {
            intent.move_vector.clamp_length_max(1.0)
        } else {
            Vec2::ZERO
        };
        let moving = direction != Vec2::ZERO;
        let sprinting = intent.sprinting && moving;

        if let Some(aim) = intent.aim.filter(|aim| aim.is_finite()) {
            actor.facing = aim;
        } else if moving {
            actor.facing = direction.y.atan2(direction.x);
        }

        let sprint = if sprinting { SPRINT_MULTIPLIER } else { 1.0 };
        let speed = actor.archetype.stats().speed * sprint * self.modifiers.player_speed;
        actor.body.velocity = direction * speed;
        let displacement = actor.body.velocity * dt;
        let _ = move_body_with_push_out(
            &self.level.grid,
            &mut actor.body,
            displacement.x,
            displacement.y,
        );
        sprinting
    }

    fn move_enemies(&mut self, sprinting: bool, dt: f32, out_events: &mut Vec<Event>) {
        let perception = Perception {
            player: self.actor.body.position,
            sprinting,
            hearing_multiplier: self.modifiers.hearing,
            speed_multiplier: self.modifiers.enemy_speed,
            elapsed: self.level.elapsed,
        };

        let mut spits = Vec::new();
        for (index, enemy) in self.level.enemies.iter_mut().enumerate() {
            let steering = self.director.steer(enemy, &perception, dt, self.rng);
            if let Some(change) = steering.mode_change {
                out_events.push(Event::EnemyModeChanged {
                    enemy: change.enemy,
                    from: change.from,
                    to: change.to,
                });
            }
            if dt > 0.0 {
                enemy.body.velocity = steering.displacement / dt;
            }
            let _ = move_body_with_push_out(
                &self.level.grid,
                &mut enemy.body,
                steering.displacement.x,
                steering.displacement.y,
            );
            if let Some(direction) = steering.spit {
                spits.push((index, direction));
            }
        }

        for (index, direction) in spits {
            if let Some(enemy) = self.level.enemies.get(index) {
                self.encounter
                    .spit(enemy, direction, &mut self.level.projectiles, out_events);
            }
        }
    }

    fn resolve_encounters(&mut self, intent: &InputIntent, dt: f32, out_events: &mut Vec<Event>) {
        let mut damaged: Vec<EnemyId> = Vec::new();
        if intent.attack_requested {
            damaged.extend(self.encounter.attack(
                self.actor,
                &mut self.level.enemies,
                &mut self.level.projectiles,
                self.modifiers.damage,
                self.rng,
                out_events,
            ));
        }
        damaged.extend(step_projectiles(
            &self.level.grid,
            &mut self.level.projectiles,
            self.actor,
            &mut self.level.enemies,
            dt,
            out_events,
        ));

        for id in damaged {
            let Some(enemy) = self
                .level
                .enemies
                .iter_mut()
                .find(|enemy| enemy.id == id && enemy.is_alive())
            else {
                continue;
            };
            if let Some(change) = self.director.stagger(enemy) {
                out_events.push(Event::EnemyModeChanged {
                    enemy: change.enemy,
                    from: change.from,
                    to: change.to,
                });
            }
        }

        let _ = resolve_kills(
            &mut self.level.enemies,
            self.actor,
            self.escalation,
            self.rng,
            out_events,
        );
        resolve_bites(self.actor, &mut self.level.enemies, out_events);
    }

    /// Collects pickups under the actor and reports whether the exit was reached.
    fn collect_pickups(&mut self, out_events: &mut Vec<Event>) -> bool {
        let Some(cell) = CellCoord::containing(self.actor.body.position) else {
            return false;
        };

        let level = &mut *self.level;
        for pickup in level.pickups.iter_mut() {
            if pickup.taken || pickup.cell != cell {
                continue;
            }
            pickup.taken = true;
            match pickup.kind {
                PickupKind::Key => {
                    level.keys_collected += 1;
                    let remaining = level.keys_required.saturating_sub(level.keys_collected);
                    out_events.push(Event::KeyCollected {
                        pickup: pickup.id,
                        remaining,
                    });
                    if remaining == 0 && !level.exit_unlocked {
                        level.exit_unlocked = true;
                        tracing::debug!(level = level.number, exit = ?level.exit, "exit unlocked");
                        out_events.push(Event::ExitUnlocked { exit: level.exit });
                    }
                }
                PickupKind::OxygenTank { amount } => {
                    let _ = restore_oxygen(self.actor, amount);
                    out_events.push(Event::PickupTaken {
                        pickup: pickup.id,
                        kind: pickup.kind,
                    });
                }
                PickupKind::Clue { corrupted } => {
                    let effect = read_clue(self.actor, corrupted);
                    out_events.push(Event::PickupTaken {
                        pickup: pickup.id,
                        kind: pickup.kind,
                    });
                    out_events.push(Event::ClueRead {
                        pickup: pickup.id,
                        corrupted,
                    });
                    out_events.push(Event::EffectApplied { effect });
                }
            }
        }
        level.pickups.retain(|pickup| !pickup.taken);

        level.exit_unlocked && cell == level.exit
    }

    fn consult_npc(&mut self, out_events: &mut Vec<Event>) {
        let position = self.actor.body.position;
        let nearest = self
            .level
            .npcs
            .iter_mut()
            .filter(|npc| !npc.used)
            .map(|npc| (npc.position.distance(position), npc))
            .filter(|(distance, _)| *distance <= NPC_INTERACT_RANGE)
            .min_by(|(a, _), (b, _)| a.total_cmp(b));
        let Some((_, npc)) = nearest else {
            return;
        };

        npc.used = true;
        let outcome = apply_gift(self.actor, npc.gift);
        self.escalation.relieve(outcome.escalation_relief);
        out_events.push(Event::NpcConsulted {
            npc: npc.id,
            gift: npc.gift,
        });
        if let Some(effect) = outcome.effect {
            out_events.push(Event::EffectApplied { effect });
        }
    }
}

fn seconds(dt: Duration) -> f32 {
    let dt = dt.as_secs_f32();
    if dt.is_finite() {
        dt
    } else {
        0.0
    }
}
