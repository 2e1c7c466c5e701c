#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic level population: the exit, keys, oxygen tanks, clues, NPCs
//! and enemies, each placed at a minimum Manhattan distance from the start.
//!
//! Placement draws bounded random candidates and falls back to a row-major
//! scan, so every call terminates. When no cell qualifies the requested count
//! is reduced instead of failing the level.

use std::collections::BTreeSet;

use dread_maze_core::{
    cell_center, CellCoord, DeterministicRng, DifficultyTier, Enemy, EnemyId, Grid, Npc, NpcGift,
    NpcId, Pickup, PickupId, PickupKind,
};

/// Random candidates drawn before falling back to the exhaustive scan.
pub const PLACEMENT_ATTEMPTS: usize = 2000;
/// Largest number of extra enemies granted by escalation.
pub const MAX_ESCALATION_EXTRAS: u32 = 4;
/// Enemy speed factor added per level after the first.
pub const LEVEL_SPEED_STEP: f32 = 0.05;

/// Counts and scalars for populating one level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopulationPlan {
    /// Difficulty tier of the run.
    pub tier: DifficultyTier,
    /// Keys to place.
    pub keys: u32,
    /// NPCs to place.
    pub npcs: u32,
    /// Oxygen tanks to place.
    pub tanks: u32,
    /// Clues to place.
    pub clues: u32,
    /// Enemies to place, including escalation extras.
    pub enemies: u32,
    /// Probability that a clue is corrupted.
    pub clue_corruption: f32,
    /// Multiplier on enemy walking speed.
    pub enemy_speed_factor: f32,
}

impl PopulationPlan {
    /// Builds the plan for a one-based level at the provided escalation.
    #[must_use]
    pub fn for_level(tier: DifficultyTier, level: u32, escalation: f32) -> Self {
        let escalation = if escalation.is_finite() {
            escalation.max(0.0)
        } else {
            0.0
        };
        let extras = ((escalation / 2.0).floor() as u32).min(MAX_ESCALATION_EXTRAS);
        Self {
            tier,
            keys: tier.key_count(),
            npcs: tier.npc_count(),
            tanks: tier.tank_count(),
            clues: tier.clue_count(),
            enemies: tier.enemy_count() + extras,
            clue_corruption: clue_corruption_probability(escalation),
            enemy_speed_factor: 1.0 + LEVEL_SPEED_STEP * level.saturating_sub(1) as f32,
        }
    }
}

/// Probability that a freshly placed clue lies.
#[must_use]
pub fn clue_corruption_probability(escalation: f32) -> f32 {
    (0.1 + 0.05 * escalation).clamp(0.0, 0.8)
}

/// Entities placed on a level.
#[derive(Clone, Debug, PartialEq)]
pub struct Population {
    /// Exit cell.
    pub exit: CellCoord,
    /// Keys, tanks and clues in placement order.
    pub pickups: Vec<Pickup>,
    /// NPCs in placement order.
    pub npcs: Vec<Npc>,
    /// Enemies in placement order.
    pub enemies: Vec<Enemy>,
}

impl Population {
    /// Number of keys that were actually placed.
    #[must_use]
    pub fn key_count(&self) -> u32 {
        self.pickups
            .iter()
            .filter(|pickup| pickup.kind == PickupKind::Key)
            .count() as u32
    }
}

/// Tracks occupied cells while placing entities on a grid.
#[derive(Clone, Debug)]
pub struct Placement<'a> {
    grid: &'a Grid,
    start: CellCoord,
    taken: BTreeSet<CellCoord>,
}

impl<'a> Placement<'a> {
    /// Starts a placement pass over `grid` with the actor standing on `start`.
    #[must_use]
    pub fn new(grid: &'a Grid, start: CellCoord) -> Self {
        Self {
            grid,
            start,
            taken: BTreeSet::new(),
        }
    }

    /// Reports whether the cell can hold a new entity at the provided distance.
    #[must_use]
    pub fn is_valid(&self, cell: CellCoord, min_distance: u32) -> bool {
        self.grid.is_floor(cell)
            && cell != self.start
            && !self.taken.contains(&cell)
            && cell.manhattan_distance(self.start) >= min_distance
    }

    /// Places an entity at least `min_distance` from the start.
    ///
    /// Draws up to [`PLACEMENT_ATTEMPTS`] random cells, then scans row-major
    /// for the first valid one. Returns `None` when no cell qualifies.
    pub fn place(&mut self, rng: &mut DeterministicRng, min_distance: u32) -> Option<CellCoord> {
        let width = self.grid.width();
        let height = self.grid.height();
        for _ in 0..PLACEMENT_ATTEMPTS {
            let cell = CellCoord::new(rng.below_u32(width), rng.below_u32(height));
            if self.is_valid(cell, min_distance) {
                self.reserve(cell);
                return Some(cell);
            }
        }

        let cell = self
            .grid
            .floor_cells()
            .find(|cell| self.is_valid(*cell, min_distance))?;
        self.reserve(cell);
        Some(cell)
    }

    /// Free floor cell farthest from the start; ties keep the first in row-major order.
    #[must_use]
    pub fn farthest(&self) -> Option<CellCoord> {
        let mut best: Option<(u32, CellCoord)> = None;
        for cell in self.grid.floor_cells() {
            if !self.is_valid(cell, 0) {
                continue;
            }
            let distance = cell.manhattan_distance(self.start);
            if best.map_or(true, |(farthest, _)| distance > farthest) {
                best = Some((distance, cell));
            }
        }
        best.map(|(_, cell)| cell)
    }

    /// Marks the cell as occupied.
    pub fn reserve(&mut self, cell: CellCoord) {
        let _ = self.taken.insert(cell);
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn taken_count(&self) -> usize {
        self.taken.len()
    }
}

/// Populates a level according to `plan`.
///
/// Draw order is fixed: exit, keys, NPCs, tanks, clues, enemies.
pub fn populate(
    grid: &Grid,
    start: CellCoord,
    plan: &PopulationPlan,
    rng: &mut DeterministicRng,
) -> Population {
    let mut placement = Placement::new(grid, start);
    let tier = plan.tier;

    let exit = match placement.place(rng, tier.exit_distance()) {
        Some(cell) => cell,
        None => {
            let fallback = placement.farthest().unwrap_or(start);
            placement.reserve(fallback);
            tracing::debug!(?fallback, "exit distance unreachable, using farthest cell");
            fallback
        }
    };

    let mut pickups = Vec::new();
    let mut next_pickup = 0_u32;
    let mut push_pickup = |cell: CellCoord, kind: PickupKind| {
        pickups.push(Pickup {
            id: PickupId::new(next_pickup),
            cell,
            kind,
            taken: false,
        });
        next_pickup += 1;
    };

    let keys = place_series(&mut placement, rng, plan.keys, |index| 10 + 2 * index);
    for cell in &keys {
        push_pickup(*cell, PickupKind::Key);
    }

    let npc_cells = place_series(&mut placement, rng, plan.npcs, |index| 8 + index);
    let rotation = rng.below(NpcGift::ALL.len());
    let npcs: Vec<Npc> = npc_cells
        .iter()
        .enumerate()
        .map(|(index, cell)| Npc {
            id: NpcId::new(index as u32),
            position: cell_center(*cell),
            gift: NpcGift::ALL[(rotation + index) % NpcGift::ALL.len()],
            used: false,
        })
        .collect();

    let tanks = place_series(&mut placement, rng, plan.tanks, |index| 6 + index);
    for cell in &tanks {
        push_pickup(*cell, PickupKind::OxygenTank {
            amount: 40.0 + rng.range(0.0, 25.0),
        });
    }

    let clues = place_series(&mut placement, rng, plan.clues, |index| 7 + index);
    for cell in &clues {
        push_pickup(*cell, PickupKind::Clue {
            corrupted: rng.chance(plan.clue_corruption),
        });
    }

    let enemy_cells = place_series(&mut placement, rng, plan.enemies, |index| 16 + 2 * index);
    let enemies = enemy_cells
        .iter()
        .enumerate()
        .map(|(index, cell)| spawn_enemy(index, *cell, plan, rng))
        .collect();

    Population {
        exit,
        pickups,
        npcs,
        enemies,
    }
}

fn place_series(
    placement: &mut Placement<'_>,
    rng: &mut DeterministicRng,
    count: u32,
    min_distance: impl Fn(u32) -> u32,
) -> Vec<CellCoord> {
    let cells: Vec<CellCoord> = (0..count)
        .filter_map(|index| placement.place(rng, min_distance(index)))
        .collect();
    if cells.len() < count as usize {
        tracing::debug!(
            requested = count,
            placed = cells.len(),
            "placement count reduced"
        );
    }
    cells
}

fn spawn_enemy(
    index: usize,
    cell: CellCoord,
    plan: &PopulationPlan,
    rng: &mut DeterministicRng,
) -> Enemy {
    let tier = plan.tier;
    let health = 45.0 + 10.0 * tier.index() as f32 + rng.range(0.0, 10.0);
    let speed =
        (2.30 + rng.range(0.0, 0.35) + tier.enemy_speed_bonus()) * plan.enemy_speed_factor;
    let mut enemy = Enemy::new(
        EnemyId::new(index as u32),
        cell_center(cell),
        health,
        speed,
        tier.enemy_damage(),
    );
    enemy.spitter = tier.has_spitters() && index % 3 == 2;
    enemy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_adds_capped_extra_enemies() {
        let calm = PopulationPlan::for_level(DifficultyTier::Normal, 1, 0.0);
        let tense = PopulationPlan::for_level(DifficultyTier::Normal, 1, 5.0);
        let frantic = PopulationPlan::for_level(DifficultyTier::Normal, 1, 40.0);
        assert_eq!(calm.enemies, 5);
        assert_eq!(tense.enemies, 7);
        assert_eq!(frantic.enemies, 5 + MAX_ESCALATION_EXTRAS);
    }

    #[test]
    fn later_levels_speed_up_enemies() {
        let plan = PopulationPlan::for_level(DifficultyTier::Easy, 3, 0.0);
        assert!((plan.enemy_speed_factor - 1.1).abs() < 1e-6);
    }

    #[test]
    fn clue_corruption_is_clamped() {
        assert!((clue_corruption_probability(0.0) - 0.1).abs() < 1e-6);
        assert!((clue_corruption_probability(100.0) - 0.8).abs() < 1e-6);
    }
}
