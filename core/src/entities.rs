//! Entity records owned by the simulation context and handed to systems.

use glam::Vec2;

use crate::{
    Archetype, CellCoord, EnemyId, EnemyMode, NpcGift, NpcId, PickupId, PickupKind, ProjectileId,
    Side, StatusEffects, Vitals,
};

/// Collision radius of the player actor in tiles.
pub const ACTOR_RADIUS: f32 = 0.30;
/// Collision radius of enemies in tiles.
pub const ENEMY_RADIUS: f32 = 0.32;
/// Facing assigned to a freshly placed actor (pointing down the grid).
pub const INITIAL_FACING: f32 = std::f32::consts::FRAC_PI_2;

/// Circular collision body with continuous position in tile units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Centre of the circle.
    pub position: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Velocity in tiles per second, used for presentation and damping.
    pub velocity: Vec2,
}

impl Body {
    /// Creates a body at rest.
    #[must_use]
    pub const fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            radius,
            velocity: Vec2::ZERO,
        }
    }
}

/// The player actor. Persists across levels.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    /// Collision body.
    pub body: Body,
    /// Facing angle in radians, measured from the +x axis toward +y.
    pub facing: f32,
    /// Archetype selected for the run.
    pub archetype: Archetype,
    /// Health, oxygen and sanity pools.
    pub vitals: Vitals,
    /// Active timed effects.
    pub effects: StatusEffects,
    /// Seconds until the next attack is allowed.
    pub attack_cooldown: f32,
    /// Seconds spent without oxygen.
    pub suffocation: f32,
}

impl Actor {
    /// Creates an actor of the provided archetype standing at `position`.
    #[must_use]
    pub fn new(archetype: Archetype, position: Vec2) -> Self {
        Self {
            body: Body::new(position, ACTOR_RADIUS),
            facing: INITIAL_FACING,
            archetype,
            vitals: Vitals::new(archetype.stats().max_health),
            effects: StatusEffects::default(),
            attack_cooldown: 0.0,
            suffocation: 0.0,
        }
    }
}

/// Pursuing enemy and its behaviour state.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Identifier allocated by the world.
    pub id: EnemyId,
    /// Collision body.
    pub body: Body,
    /// Remaining hit points.
    pub health: f32,
    /// Current behaviour mode.
    pub mode: EnemyMode,
    /// Intent resumed once a stagger expires; never `Staggered`.
    pub intent: EnemyMode,
    /// Seconds until the next think.
    pub think_remaining: f32,
    /// Interval armed at the last think.
    pub think_interval: f32,
    /// Seconds of stagger left.
    pub stagger_remaining: f32,
    /// Chase or wander destination chosen at the last think.
    pub target: Option<Vec2>,
    /// Walking speed in tiles per second.
    pub speed: f32,
    /// Damage dealt per bite.
    pub damage: f32,
    /// Seconds until the next bite is allowed.
    pub bite_cooldown: f32,
    /// Phase offset of the close-quarters wobble.
    pub wobble_phase: f32,
    /// Whether the enemy spits projectiles while chasing.
    pub spitter: bool,
    /// Seconds until the next spit is allowed.
    pub spit_cooldown: f32,
}

impl Enemy {
    /// Creates a roaming enemy at `position`.
    #[must_use]
    pub fn new(id: EnemyId, position: Vec2, health: f32, speed: f32, damage: f32) -> Self {
        Self {
            id,
            body: Body::new(position, ENEMY_RADIUS),
            health,
            mode: EnemyMode::Roam,
            intent: EnemyMode::Roam,
            think_remaining: 0.0,
            think_interval: 0.0,
            stagger_remaining: 0.0,
            target: None,
            speed,
            damage,
            bite_cooldown: 0.0,
            wobble_phase: 0.0,
            spitter: false,
            spit_cooldown: 0.0,
        }
    }

    /// Reports whether the enemy still has hit points.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Projectile travelling through the maze.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    /// Identifier allocated when fired.
    pub id: ProjectileId,
    /// Centre of the projectile.
    pub position: Vec2,
    /// Velocity in tiles per second.
    pub velocity: Vec2,
    /// Seconds before the projectile fizzles.
    pub remaining: f32,
    /// Side that fired the projectile.
    pub side: Side,
    /// Damage applied on hit.
    pub damage: f32,
    /// Collision radius.
    pub radius: f32,
}

/// Collectible resting on a floor cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pickup {
    /// Identifier allocated by the world.
    pub id: PickupId,
    /// Cell the pickup rests on.
    pub cell: CellCoord,
    /// Payload delivered when taken.
    pub kind: PickupKind,
    /// One-shot flag set when the pickup is collected.
    pub taken: bool,
}

/// Stationary NPC that grants a gift on interaction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Npc {
    /// Identifier allocated by the world.
    pub id: NpcId,
    /// Centre of the NPC.
    pub position: Vec2,
    /// Gift granted on interaction.
    pub gift: NpcGift,
    /// One-shot flag set after the NPC has been consulted.
    pub used: bool,
}

/// Persistent dread scalar. Only rises, except through explicit relief.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Escalation(f32);

impl Escalation {
    /// Current escalation value.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.0
    }

    /// Raises escalation by a non-negative amount.
    pub fn raise(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.0 += amount;
        }
    }

    /// Lowers escalation through a perk, saturating at zero.
    pub fn relieve(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.0 = (self.0 - amount).max(0.0);
        }
    }
}

/// Centre of a cell in continuous tile coordinates.
#[must_use]
pub fn cell_center(cell: CellCoord) -> Vec2 {
    Vec2::new(cell.column() as f32 + 0.5, cell.row() as f32 + 0.5)
}
