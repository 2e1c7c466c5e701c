//! Clamped resource pools carried by the player actor.

use serde::{Deserialize, Serialize};

/// Maximum oxygen held by the actor.
pub const OXYGEN_MAX: f32 = 100.0;
/// Maximum sanity held by the actor.
pub const SANITY_MAX: f32 = 120.0;
/// Sanity at the start of a run.
pub const SANITY_START: f32 = 100.0;

/// Resource value clamped to `[0, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    value: f32,
    max: f32,
}

impl Pool {
    /// Creates a pool filled to its maximum.
    #[must_use]
    pub fn full(max: f32) -> Self {
        let max = sanitize(max);
        Self { value: max, max }
    }

    /// Creates a pool holding `value`, clamped into range.
    #[must_use]
    pub fn new(value: f32, max: f32) -> Self {
        let max = sanitize(max);
        Self {
            value: sanitize(value).min(max),
            max,
        }
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Upper bound of the pool.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Current value as a fraction of the maximum in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.value / self.max).clamp(0.0, 1.0)
    }

    /// Reports whether the pool has run dry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value <= 0.0
    }

    /// Adds `amount`, saturating at the maximum.
    pub fn restore(&mut self, amount: f32) {
        self.set(self.value + sanitize(amount));
    }

    /// Removes `amount`, saturating at zero.
    pub fn drain(&mut self, amount: f32) {
        self.set(self.value - sanitize(amount));
    }

    /// Overwrites the value, clamped into range.
    pub fn set(&mut self, value: f32) {
        if value.is_nan() {
            return;
        }
        self.value = value.clamp(0.0, self.max);
    }
}

/// Resource pools of the player actor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    /// Hit points; reaching zero loses the run.
    pub health: Pool,
    /// Breathable air; drains continuously.
    pub oxygen: Pool,
    /// Mental state; scales the visible radius.
    pub sanity: Pool,
}

impl Vitals {
    /// Creates full vitals for an actor with the provided maximum health.
    #[must_use]
    pub fn new(max_health: f32) -> Self {
        Self {
            health: Pool::full(max_health),
            oxygen: Pool::full(OXYGEN_MAX),
            sanity: Pool::new(SANITY_START, SANITY_MAX),
        }
    }

    /// Reports whether every pool lies within `[0, max]`.
    #[must_use]
    pub fn within_bounds(&self) -> bool {
        [self.health, self.oxygen, self.sanity]
            .iter()
            .all(|pool| pool.value() >= 0.0 && pool.value() <= pool.max())
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pools_clamp_at_both_ends() {
        let mut pool = Pool::new(50.0, 100.0);
        pool.restore(80.0);
        assert!((pool.value() - 100.0).abs() < f32::EPSILON);
        pool.drain(250.0);
        assert!(pool.is_empty());
        pool.drain(f32::INFINITY);
        assert!(pool.value() >= 0.0);
    }

    #[test]
    fn negative_amounts_are_ignored() {
        let mut pool = Pool::full(10.0);
        pool.drain(-5.0);
        assert!((pool.value() - 10.0).abs() < f32::EPSILON);
        pool.restore(f32::NAN);
        assert!((pool.fraction() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn fresh_vitals_start_within_bounds() {
        let vitals = Vitals::new(96.0);
        assert!(vitals.within_bounds());
        assert!((vitals.sanity.value() - SANITY_START).abs() < f32::EPSILON);
    }
}
