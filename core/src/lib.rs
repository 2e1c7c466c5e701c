#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dread Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! carrying a per-tick [`InputIntent`], the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what happened. Systems operate on the entity records defined here and
//! never own mutable state of their own beyond what the world hands them.

use std::fmt;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod effects;
mod entities;
mod grid;
mod rng;
mod vitals;

pub use effects::{Modifiers, StatusEffect, StatusEffectKind, StatusEffects, FOG_BASE_RADIUS};
pub use entities::{
    cell_center, Actor, Body, Enemy, Escalation, Npc, Pickup, Projectile, ACTOR_RADIUS,
    ENEMY_RADIUS, INITIAL_FACING,
};
pub use grid::{Grid, Tile};
pub use rng::{
    derive_seed, level_seed, DeterministicRng, RNG_STREAM_MAZE, RNG_STREAM_PLACEMENT,
    RNG_STREAM_SIMULATION,
};
pub use vitals::{Pool, Vitals, OXYGEN_MAX, SANITY_MAX, SANITY_START};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Dread Maze.";

/// Multiplier applied to the walking speed while sprinting.
pub const SPRINT_MULTIPLIER: f32 = 1.2;

/// Smallest accepted grid dimension.
pub const MIN_GRID_DIMENSION: u32 = 1;
/// Largest accepted grid dimension.
pub const MAX_GRID_DIMENSION: u32 = 255;
/// Largest accepted number of levels in a run.
pub const MAX_LEVELS: u32 = 99;
/// Default probability that the braiding pass opens a dead end.
pub const DEFAULT_BRAID_PROBABILITY: f32 = 0.65;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards any current context and starts a run from level one.
    StartRun {
        /// Configuration chosen by the adapter.
        config: RunConfig,
        /// Seed from which every random stream of the run is derived.
        seed: u64,
    },
    /// Advances the simulation by one fixed step.
    Tick {
        /// Input snapshot sampled by the adapter for this step.
        intent: InputIntent,
    },
    /// Rebuilds the run from the configuration and seed of the last start.
    ResetRun,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a freshly generated level is ready.
    LevelStarted {
        /// One-based level number.
        level: u32,
        /// Cell the actor was placed on.
        start: CellCoord,
        /// Number of keys that unlock the exit.
        keys_required: u32,
    },
    /// Confirms that the actor picked up a key.
    KeyCollected {
        /// Pickup that held the key.
        pickup: PickupId,
        /// Keys still missing before the exit unlocks.
        remaining: u32,
    },
    /// Announces that every key was collected and the exit opened.
    ExitUnlocked {
        /// Cell of the exit.
        exit: CellCoord,
    },
    /// Confirms that the actor collected a non-key pickup.
    PickupTaken {
        /// Identifier of the collected pickup.
        pickup: PickupId,
        /// Payload of the pickup.
        kind: PickupKind,
    },
    /// Reports the outcome of reading a clue.
    ClueRead {
        /// Identifier of the clue pickup.
        pickup: PickupId,
        /// Whether the clue was corrupted.
        corrupted: bool,
    },
    /// Confirms that an NPC granted its gift.
    NpcConsulted {
        /// Identifier of the NPC.
        npc: NpcId,
        /// Gift granted to the actor.
        gift: NpcGift,
    },
    /// Announces that a status effect was applied to the actor.
    EffectApplied {
        /// Effect record as applied.
        effect: StatusEffect,
    },
    /// Reports damage dealt to an enemy.
    EnemyDamaged {
        /// Identifier of the damaged enemy.
        enemy: EnemyId,
        /// Hit points removed.
        amount: f32,
    },
    /// Confirms that an enemy died and was removed.
    EnemyKilled {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
    },
    /// Reports that an enemy switched behaviour mode.
    EnemyModeChanged {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Mode before the change.
        from: EnemyMode,
        /// Mode after the change.
        to: EnemyMode,
    },
    /// Reports damage dealt to the actor.
    PlayerDamaged {
        /// Hit points removed.
        amount: f32,
        /// Origin of the damage.
        source: DamageSource,
    },
    /// Confirms that a projectile entered the maze.
    ProjectileFired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Side that fired it.
        side: Side,
    },
    /// Requests that presentation layers render a hallucination.
    HallucinationTriggered {
        /// Flavour of hallucination.
        kind: HallucinationKind,
    },
    /// Announces that the actor escaped a level and the next one began.
    LevelAdvanced {
        /// Level number that is now active.
        level: u32,
    },
    /// Announces that the actor escaped the final level.
    Won {
        /// Number of levels cleared.
        levels: u32,
    },
    /// Announces that the run ended in defeat.
    Lost {
        /// Cause of the defeat.
        reason: LossReason,
    },
}

/// Per-tick input snapshot built by the adapter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputIntent {
    /// Desired movement direction; lengths above one are normalized.
    pub move_vector: Vec2,
    /// Facing angle requested by the adapter; when absent the actor faces its
    /// movement direction.
    pub aim: Option<f32>,
    /// Whether the sprint modifier is held.
    pub sprinting: bool,
    /// Whether the actor attempts an attack this tick.
    pub attack_requested: bool,
    /// Whether the actor attempts to interact with a nearby NPC.
    pub interact_requested: bool,
    /// Simulated time covered by the tick.
    pub dt: Duration,
}

impl InputIntent {
    /// Creates an idle intent covering `dt`.
    #[must_use]
    pub fn idle(dt: Duration) -> Self {
        Self {
            dt,
            ..Self::default()
        }
    }
}

/// Configuration record selected before a run starts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Archetype of the player actor.
    pub archetype: Archetype,
    /// Number of grid columns.
    pub grid_width: u32,
    /// Number of grid rows.
    pub grid_height: u32,
    /// Difficulty tier of the run.
    pub difficulty: DifficultyTier,
    /// Number of levels that must be escaped to win.
    pub levels: u32,
    /// Probability that the braiding pass opens a dead end.
    pub braid_probability: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            archetype: Archetype::Thief,
            grid_width: 41,
            grid_height: 31,
            difficulty: DifficultyTier::Normal,
            levels: 3,
            braid_probability: DEFAULT_BRAID_PROBABILITY,
        }
    }
}

impl RunConfig {
    /// Returns a copy with every field forced into its accepted range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let mut sanitized = self;
        sanitized.grid_width = self
            .grid_width
            .clamp(MIN_GRID_DIMENSION, MAX_GRID_DIMENSION);
        sanitized.grid_height = self
            .grid_height
            .clamp(MIN_GRID_DIMENSION, MAX_GRID_DIMENSION);
        sanitized.levels = self.levels.clamp(1, MAX_LEVELS);
        sanitized.braid_probability = if self.braid_probability.is_nan() {
            DEFAULT_BRAID_PROBABILITY
        } else {
            self.braid_probability.clamp(0.0, 1.0)
        };

        if sanitized != self {
            tracing::warn!(requested = ?self, accepted = ?sanitized, "run configuration adjusted");
        }
        sanitized
    }
}

/// Player archetype; selects a row of the stat table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    /// Fast ranged attacker with a rapid, weak shot.
    Thief,
    /// Ranged attacker with heavier, slightly inaccurate shots.
    Killer,
    /// Slow melee bruiser with a wide cleave.
    Butcher,
}

/// Melee cleave parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeleeProfile {
    /// Reach of the cleave in tiles.
    pub range: f32,
    /// Half of the cleave arc in radians.
    pub half_angle: f32,
    /// Damage applied to every target in the arc.
    pub damage: f32,
    /// Seconds between swings.
    pub cooldown: f32,
}

/// Ranged shot parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangedProfile {
    /// Projectile speed in tiles per second.
    pub speed: f32,
    /// Damage applied on hit.
    pub damage: f32,
    /// Seconds between shots.
    pub cooldown: f32,
    /// Projectile collision radius.
    pub radius: f32,
    /// Maximum random deviation of the shot angle in radians.
    pub spread: f32,
    /// Distance ahead of the actor centre at which projectiles appear.
    pub muzzle_offset: f32,
}

/// Attack performed by an archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttackProfile {
    /// Arc attack damaging every enemy in range at once.
    Melee(MeleeProfile),
    /// Projectile attack.
    Ranged(RangedProfile),
}

/// Row of the archetype stat table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArchetypeStats {
    /// Maximum hit points.
    pub max_health: f32,
    /// Walking speed in tiles per second.
    pub speed: f32,
    /// Attack performed on request.
    pub attack: AttackProfile,
}

const THIEF_STATS: ArchetypeStats = ArchetypeStats {
    max_health: 96.0,
    speed: 3.25,
    attack: AttackProfile::Ranged(RangedProfile {
        speed: 11.0,
        damage: 12.0,
        cooldown: 0.16,
        radius: 0.3,
        spread: 0.0,
        muzzle_offset: 0.4,
    }),
};

const KILLER_STATS: ArchetypeStats = ArchetypeStats {
    max_health: 110.0,
    speed: 3.05,
    attack: AttackProfile::Ranged(RangedProfile {
        speed: 13.0,
        damage: 16.0,
        cooldown: 0.22,
        radius: 0.28,
        spread: 0.03,
        muzzle_offset: 0.4,
    }),
};

const BUTCHER_STATS: ArchetypeStats = ArchetypeStats {
    max_health: 125.0,
    speed: 2.90,
    attack: AttackProfile::Melee(MeleeProfile {
        range: 1.5,
        half_angle: 0.80,
        damage: 30.0,
        cooldown: 0.48,
    }),
};

impl Archetype {
    /// Looks up the stat row for the archetype.
    #[must_use]
    pub const fn stats(self) -> ArchetypeStats {
        match self {
            Self::Thief => THIEF_STATS,
            Self::Killer => KILLER_STATS,
            Self::Butcher => BUTCHER_STATS,
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Thief => "thief",
            Self::Killer => "killer",
            Self::Butcher => "butcher",
        };
        f.write_str(label)
    }
}

/// Difficulty tier; selects drain rates, population sizes and distances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifficultyTier {
    /// Gentle drain and sparse enemies.
    Easy,
    /// Baseline tuning.
    Normal,
    /// Fast drain, dense enemies and spitters.
    Hard,
}

impl DifficultyTier {
    /// Zero-based position of the tier.
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Easy => 0,
            Self::Normal => 1,
            Self::Hard => 2,
        }
    }

    /// Base oxygen drain per second.
    #[must_use]
    pub const fn oxygen_drain(self) -> f32 {
        match self {
            Self::Easy => 1.05,
            Self::Normal => 1.20,
            Self::Hard => 1.35,
        }
    }

    /// Keys required to unlock the exit.
    #[must_use]
    pub const fn key_count(self) -> u32 {
        match self {
            Self::Easy => 3,
            Self::Normal => 4,
            Self::Hard => 5,
        }
    }

    /// NPCs placed per level.
    #[must_use]
    pub const fn npc_count(self) -> u32 {
        match self {
            Self::Easy => 3,
            Self::Normal => 4,
            Self::Hard => 5,
        }
    }

    /// Oxygen tanks placed per level.
    #[must_use]
    pub const fn tank_count(self) -> u32 {
        match self {
            Self::Easy => 5,
            Self::Normal => 6,
            Self::Hard => 7,
        }
    }

    /// Clues placed per level.
    #[must_use]
    pub const fn clue_count(self) -> u32 {
        match self {
            Self::Hard => 5,
            Self::Easy | Self::Normal => 4,
        }
    }

    /// Enemies placed per level before escalation extras.
    #[must_use]
    pub const fn enemy_count(self) -> u32 {
        match self {
            Self::Easy => 3,
            Self::Normal => 5,
            Self::Hard => 7,
        }
    }

    /// Damage dealt by a single enemy bite.
    #[must_use]
    pub const fn enemy_damage(self) -> f32 {
        match self {
            Self::Easy => 8.0,
            Self::Normal => 10.0,
            Self::Hard => 12.0,
        }
    }

    /// Minimum Manhattan distance between the start and the exit.
    #[must_use]
    pub const fn exit_distance(self) -> u32 {
        match self {
            Self::Easy => 22,
            Self::Normal => 28,
            Self::Hard => 34,
        }
    }

    /// Flat bonus added to enemy walking speed.
    #[must_use]
    pub const fn enemy_speed_bonus(self) -> f32 {
        match self {
            Self::Hard => 0.25,
            Self::Easy | Self::Normal => 0.0,
        }
    }

    /// Reports whether every third enemy spits projectiles.
    #[must_use]
    pub const fn has_spitters(self) -> bool {
        matches!(self, Self::Hard)
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        };
        f.write_str(label)
    }
}

/// Behaviour mode of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnemyMode {
    /// Wandering between nearby targets.
    Roam,
    /// Pursuing the last heard player position.
    Chase,
    /// Frozen after taking damage.
    Staggered,
}

/// Side that owns a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Fired by the actor; damages enemies.
    Player,
    /// Spat by an enemy; damages the actor.
    Enemy,
}

/// Payload carried by a pickup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PickupKind {
    /// One of the keys that unlock the exit.
    Key,
    /// Restores oxygen when collected.
    OxygenTank {
        /// Oxygen restored.
        amount: f32,
    },
    /// Reveals the exit bearing unless corrupted.
    Clue {
        /// Whether the clue lies; rolled at placement.
        corrupted: bool,
    },
}

/// Gift granted by an NPC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NpcGift {
    /// Widens vision for a while.
    Reveal,
    /// Refills part of the oxygen pool.
    Oxygen,
    /// A poisoned gift.
    Poison,
    /// Boosts damage at the cost of sanity.
    Grief,
    /// Soothes sanity and dulls the enemies.
    Calm,
}

impl NpcGift {
    /// Every gift in placement rotation order.
    pub const ALL: [Self; 5] = [
        Self::Reveal,
        Self::Oxygen,
        Self::Poison,
        Self::Grief,
        Self::Calm,
    ];
}

/// Flavour of a hallucination event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HallucinationKind {
    /// A face flashes across the screen.
    FaceFlash,
    /// A whisper plays near the actor.
    Whisper,
    /// Footsteps that belong to no enemy.
    PhantomFootsteps,
}

impl HallucinationKind {
    /// Every hallucination flavour.
    pub const ALL: [Self; 3] = [Self::FaceFlash, Self::Whisper, Self::PhantomFootsteps];
}

/// Origin of damage dealt to the actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageSource {
    /// Contact bite from an enemy.
    Bite {
        /// Enemy that bit.
        enemy: EnemyId,
    },
    /// Spit projectile.
    Spit {
        /// Projectile that hit.
        projectile: ProjectileId,
    },
}

/// Cause of a lost run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LossReason {
    /// Oxygen stayed empty past the grace period.
    Suffocation,
    /// Health reached zero.
    Slain,
}

impl fmt::Display for LossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suffocation => f.write_str("suffocation"),
            Self::Slain => f.write_str("slain"),
        }
    }
}

/// Lifecycle phase of the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// No run has been started.
    Idle,
    /// Ticks advance the simulation.
    Running,
    /// The final exit was reached.
    Won,
    /// The run ended in defeat.
    Lost(LossReason),
}

impl RunPhase {
    /// Reports whether the run reached a terminal phase.
    #[must_use]
    pub const fn is_over(self) -> bool {
        matches!(self, Self::Won | Self::Lost(_))
    }
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

identifier!(
    /// Unique identifier assigned to an enemy within a level.
    EnemyId
);
identifier!(
    /// Unique identifier assigned to a projectile within a level.
    ProjectileId
);
identifier!(
    /// Unique identifier assigned to a pickup within a level.
    PickupId
);
identifier!(
    /// Unique identifier assigned to an NPC within a level.
    NpcId
);

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell containing the continuous point, if it lies at non-negative coordinates.
    #[must_use]
    pub fn containing(point: Vec2) -> Option<Self> {
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        Some(Self::new(point.x.floor() as u32, point.y.floor() as u32))
    }
}

/// Read-only view of the actor captured for presentation.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Archetype of the actor.
    pub archetype: Archetype,
    /// Centre of the actor.
    pub position: Vec2,
    /// Facing angle in radians.
    pub facing: f32,
    /// Health as a percentage of the maximum.
    pub health_percent: f32,
    /// Oxygen as a percentage of the maximum.
    pub oxygen_percent: f32,
    /// Sanity as a percentage of the maximum.
    pub sanity_percent: f32,
    /// Active status effects.
    pub effects: Vec<StatusEffect>,
    /// Seconds spent without oxygen.
    pub suffocation: f32,
}

/// Read-only view of a single enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Centre of the enemy.
    pub position: Vec2,
    /// Behaviour mode.
    pub mode: EnemyMode,
    /// Remaining hit points.
    pub health: f32,
    /// Whether the enemy spits.
    pub spitter: bool,
}

/// Read-only view of an untaken pickup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickupSnapshot {
    /// Identifier of the pickup.
    pub id: PickupId,
    /// Cell the pickup rests on.
    pub cell: CellCoord,
    /// Payload of the pickup.
    pub kind: PickupKind,
}

/// Read-only view of an NPC.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NpcSnapshot {
    /// Identifier of the NPC.
    pub id: NpcId,
    /// Centre of the NPC.
    pub position: Vec2,
    /// Whether the gift was already granted.
    pub used: bool,
}

/// Read-only view of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Centre of the projectile.
    pub position: Vec2,
    /// Side that fired it.
    pub side: Side,
}

/// Per-tick state snapshot exposed to adapters.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSnapshot<'a> {
    /// Lifecycle phase.
    pub phase: RunPhase,
    /// One-based level number; zero before a run starts.
    pub level: u32,
    /// Simulated time spent in the current run.
    pub elapsed: Duration,
    /// Tile grid of the current level.
    pub grid: &'a Grid,
    /// Actor view, absent before a run starts.
    pub actor: Option<ActorSnapshot>,
    /// Living enemies in creation order.
    pub enemies: Vec<EnemySnapshot>,
    /// Untaken pickups in creation order.
    pub pickups: Vec<PickupSnapshot>,
    /// NPCs in creation order.
    pub npcs: Vec<NpcSnapshot>,
    /// Projectiles in flight.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Cell of the exit.
    pub exit: CellCoord,
    /// Whether the exit accepts the actor.
    pub exit_unlocked: bool,
    /// Keys collected on this level.
    pub keys_collected: u32,
    /// Keys required on this level.
    pub keys_required: u32,
    /// Current escalation value.
    pub escalation: f32,
    /// Visible radius around the actor in tiles.
    pub fog_radius: f32,
    /// Angle from the actor toward the exit while Compass is active.
    pub compass_bearing: Option<f32>,
}
