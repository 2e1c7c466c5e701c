#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resource decay, timed status effects and the modifiers derived from them.
//!
//! Effects are stored as `{kind, remaining, magnitude}` records. One decay
//! pass ticks them uniformly and one pure derivation turns the active set
//! into [`Modifiers`] that the rest of the simulation consumes on the next
//! tick.

use dread_maze_core::{
    Actor, DifficultyTier, Modifiers, NpcGift, StatusEffect, StatusEffectKind, StatusEffects,
    Vitals, FOG_BASE_RADIUS,
};

/// Extra oxygen drained per second while sprinting.
pub const SPRINT_OXYGEN_DRAIN: f32 = 0.85;
/// Fractional drain increase per point of escalation.
pub const ESCALATION_DRAIN_FACTOR: f32 = 0.03;
/// Drain added per level after the first.
pub const LEVEL_DRAIN_STEP: f32 = 0.05;
/// Health lost per second without oxygen.
pub const SUFFOCATION_HEALTH_DRAIN: f32 = 2.0;
/// Sanity lost per second without oxygen.
pub const SUFFOCATION_SANITY_DRAIN: f32 = 14.0;
/// Seconds without oxygen tolerated before the run is lost.
pub const SUFFOCATION_GRACE: f32 = 6.0;
/// Player speed factor while suffocating.
pub const SUFFOCATION_SPEED_FACTOR: f32 = 0.75;
/// Sanity regained per second while oxygen remains.
pub const SANITY_REGEN: f32 = 3.0;

/// Oxygen restored by the oxygen gift.
pub const GIFT_OXYGEN: f32 = 55.0;
/// Sanity cost of the grief gift.
pub const GIFT_GRIEF_SANITY_COST: f32 = 10.0;
/// Escalation relieved by the calm gift.
pub const GIFT_CALM_RELIEF: f32 = 0.5;
/// Sanity cost of a corrupted clue.
pub const CORRUPTED_CLUE_SANITY_COST: f32 = 8.0;

/// Inputs to one decay pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecayContext {
    /// Seconds covered by the pass.
    pub dt: f32,
    /// Whether the player sprints.
    pub sprinting: bool,
    /// Difficulty tier of the run.
    pub tier: DifficultyTier,
    /// Current escalation value.
    pub escalation: f32,
    /// One-based level number.
    pub level: u32,
    /// Sanity change per second from the modifiers in force this tick.
    pub sanity_drift: f32,
}

/// Outcome of one decay pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecayReport {
    /// Whether the suffocation grace period has been exceeded.
    pub suffocated: bool,
    /// Whether health reached zero.
    pub health_depleted: bool,
    /// Effects that expired during the pass.
    pub expired: Vec<StatusEffectKind>,
}

/// Oxygen drained per second for the provided context.
#[must_use]
pub fn oxygen_drain_rate(context: &DecayContext) -> f32 {
    let level_bonus = LEVEL_DRAIN_STEP * context.level.saturating_sub(1) as f32;
    let sprint = if context.sprinting {
        SPRINT_OXYGEN_DRAIN
    } else {
        0.0
    };
    let escalation = context.escalation.max(0.0);
    (context.tier.oxygen_drain() + level_bonus + sprint)
        * (1.0 + ESCALATION_DRAIN_FACTOR * escalation)
}

/// Drains oxygen, applies suffocation or regeneration, applies the sanity
/// drift carried by the context and ticks every effect countdown.
pub fn decay(actor: &mut Actor, context: &DecayContext) -> DecayReport {
    let dt = if context.dt.is_finite() {
        context.dt.max(0.0)
    } else {
        0.0
    };
    let drift = if context.sanity_drift.is_finite() {
        context.sanity_drift
    } else {
        0.0
    };
    let vitals = &mut actor.vitals;

    vitals.oxygen.drain(oxygen_drain_rate(context) * dt);
    if vitals.oxygen.is_empty() {
        vitals.health.drain(SUFFOCATION_HEALTH_DRAIN * dt);
        vitals.sanity.drain(SUFFOCATION_SANITY_DRAIN * dt);
        actor.suffocation += dt;
    } else {
        vitals.sanity.restore(SANITY_REGEN * dt);
        actor.suffocation = 0.0;
    }

    if drift >= 0.0 {
        vitals.sanity.restore(drift * dt);
    } else {
        vitals.sanity.drain(-drift * dt);
    }

    let expired = actor.effects.tick(dt);

    DecayReport {
        suffocated: actor.suffocation > SUFFOCATION_GRACE,
        health_depleted: vitals.health.is_empty(),
        expired,
    }
}

/// Derives gameplay multipliers from the active effects and vitals.
#[must_use]
pub fn derive_modifiers(effects: &StatusEffects, vitals: &Vitals) -> Modifiers {
    let mut modifiers = Modifiers::default();
    let mut fog = FOG_BASE_RADIUS;

    for effect in effects.iter() {
        let magnitude = effect.magnitude;
        match effect.kind {
            StatusEffectKind::Reveal => fog *= 1.0 + magnitude,
            StatusEffectKind::Poison => {
                fog *= 0.85;
                modifiers.player_speed *= (1.0 - 0.1 * magnitude).max(0.0);
                modifiers.sanity_drift -= 1.2 * magnitude;
            }
            StatusEffectKind::Grief => {
                modifiers.damage *= 1.0 + magnitude;
                modifiers.sanity_drift -= 2.5;
            }
            StatusEffectKind::Calm => {
                modifiers.enemy_speed *= (1.0 - 0.2 * magnitude).max(0.0);
                modifiers.hearing *= (1.0 - 0.2 * magnitude).max(0.0);
                modifiers.sanity_drift += 1.5 * magnitude;
            }
            StatusEffectKind::Compass => modifiers.compass = true,
        }
    }

    if vitals.oxygen.is_empty() {
        modifiers.player_speed *= SUFFOCATION_SPEED_FACTOR;
    }
    modifiers.fog_radius = fog * (0.6 + 0.4 * vitals.sanity.fraction());
    modifiers
}

/// Result of accepting an NPC gift.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GiftOutcome {
    /// Effect applied to the actor.
    pub effect: Option<StatusEffect>,
    /// Oxygen restored.
    pub oxygen_restored: f32,
    /// Sanity removed.
    pub sanity_lost: f32,
    /// Escalation the caller must relieve.
    pub escalation_relief: f32,
}

/// Applies an NPC gift to the actor.
pub fn apply_gift(actor: &mut Actor, gift: NpcGift) -> GiftOutcome {
    let mut outcome = GiftOutcome::default();
    match gift {
        NpcGift::Reveal => {
            outcome.effect = Some(StatusEffect::new(StatusEffectKind::Reveal, 10.0, 0.8));
        }
        NpcGift::Oxygen => outcome.oxygen_restored = GIFT_OXYGEN,
        NpcGift::Poison => {
            outcome.effect = Some(StatusEffect::new(StatusEffectKind::Poison, 9.0, 1.0));
        }
        NpcGift::Grief => {
            outcome.effect = Some(StatusEffect::new(StatusEffectKind::Grief, 10.0, 0.35));
            outcome.sanity_lost = GIFT_GRIEF_SANITY_COST;
        }
        NpcGift::Calm => {
            outcome.effect = Some(StatusEffect::new(StatusEffectKind::Calm, 8.0, 1.0));
            outcome.escalation_relief = GIFT_CALM_RELIEF;
        }
    }

    actor.vitals.oxygen.restore(outcome.oxygen_restored);
    actor.vitals.sanity.drain(outcome.sanity_lost);
    if let Some(effect) = outcome.effect {
        actor.effects.apply(effect);
    }
    outcome
}

/// Reads a clue, returning the effect it applied.
///
/// Truthful clues expose the exit bearing; corrupted ones cost sanity and
/// poison the reader.
pub fn read_clue(actor: &mut Actor, corrupted: bool) -> StatusEffect {
    let effect = if corrupted {
        actor.vitals.sanity.drain(CORRUPTED_CLUE_SANITY_COST);
        StatusEffect::new(StatusEffectKind::Poison, 4.0, 0.5)
    } else {
        StatusEffect::new(StatusEffectKind::Compass, 12.0, 1.0)
    };
    actor.effects.apply(effect);
    effect
}

/// Restores oxygen from a tank, returning the amount actually gained.
pub fn restore_oxygen(actor: &mut Actor, amount: f32) -> f32 {
    let before = actor.vitals.oxygen.value();
    actor.vitals.oxygen.restore(amount);
    actor.vitals.oxygen.value() - before
}
