//! Timed status effects and the gameplay multipliers derived from them.

use serde::{Deserialize, Serialize};

/// Visible radius around the actor before any modifier, in tiles.
pub const FOG_BASE_RADIUS: f32 = 4.5;

/// Named status effects the actor can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusEffectKind {
    /// Widens the visible radius.
    Reveal,
    /// Narrows vision, slows the actor and erodes sanity.
    Poison,
    /// Erodes sanity while boosting outgoing damage by its magnitude.
    Grief,
    /// Slows and deafens enemies while soothing sanity.
    Calm,
    /// Exposes the bearing toward the exit.
    Compass,
}

/// Single active effect with its remaining duration in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Kind of effect.
    pub kind: StatusEffectKind,
    /// Seconds until the effect expires.
    pub remaining: f32,
    /// Strength of the effect; meaning depends on the kind.
    pub magnitude: f32,
}

impl StatusEffect {
    /// Creates a new effect record.
    #[must_use]
    pub const fn new(kind: StatusEffectKind, remaining: f32, magnitude: f32) -> Self {
        Self {
            kind,
            remaining,
            magnitude,
        }
    }
}

/// Tagged collection of active effects, at most one record per kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusEffects {
    active: Vec<StatusEffect>,
}

impl StatusEffects {
    /// Applies an effect. An existing record of the same kind keeps the larger
    /// remaining duration and the larger magnitude.
    pub fn apply(&mut self, effect: StatusEffect) {
        if !(effect.remaining > 0.0) || !effect.magnitude.is_finite() {
            return;
        }

        match self.active.iter_mut().find(|active| active.kind == effect.kind) {
            Some(active) => {
                active.remaining = active.remaining.max(effect.remaining);
                active.magnitude = active.magnitude.max(effect.magnitude);
            }
            None => self.active.push(effect),
        }
    }

    /// Decrements every countdown by `dt` and removes expired records,
    /// returning the kinds that expired.
    pub fn tick(&mut self, dt: f32) -> Vec<StatusEffectKind> {
        let mut expired = Vec::new();
        self.active.retain_mut(|effect| {
            effect.remaining -= dt;
            if effect.remaining > 0.0 {
                true
            } else {
                expired.push(effect.kind);
                false
            }
        });
        expired
    }

    /// Returns the active record of the provided kind.
    #[must_use]
    pub fn get(&self, kind: StatusEffectKind) -> Option<&StatusEffect> {
        self.active.iter().find(|effect| effect.kind == kind)
    }

    /// Reports whether an effect of the provided kind is active.
    #[must_use]
    pub fn is_active(&self, kind: StatusEffectKind) -> bool {
        self.get(kind).is_some()
    }

    /// Iterates active effects in application order.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.active.iter()
    }

    /// Number of active effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Reports whether no effect is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Gameplay multipliers derived once per tick and consumed on the next one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Modifiers {
    /// Visible radius around the actor in tiles.
    pub fog_radius: f32,
    /// Multiplier on the actor's movement speed.
    pub player_speed: f32,
    /// Multiplier on enemy movement speed.
    pub enemy_speed: f32,
    /// Multiplier on damage dealt by the actor.
    pub damage: f32,
    /// Multiplier on enemy hearing radius.
    pub hearing: f32,
    /// Sanity change per second contributed by effects.
    pub sanity_drift: f32,
    /// Whether the exit bearing is exposed.
    pub compass: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            fog_radius: FOG_BASE_RADIUS,
            player_speed: 1.0,
            enemy_speed: 1.0,
            damage: 1.0,
            hearing: 1.0,
            sanity_drift: 0.0,
            compass: false,
        }
    }
}
