//! Companion parameter store: energy, mood, and bond with silent clamping.

use serde::{Deserialize, Serialize};

/// Upper bound for energy and mood.
pub const PARAM_MAX: i32 = 100;

/// Lower bound for every parameter.
pub const PARAM_MIN: i32 = 0;

/// Parameters a freshly created companion starts with.
pub const INITIAL_PARAMS: CompanionParams = CompanionParams {
    energy: PARAM_MAX,
    mood: PARAM_MAX,
    bond: PARAM_MIN,
};

/// The mutable stats of a companion.
///
/// Fields are public for reading and construction from a database row;
/// mutation must go through the `adjust_*` methods so the bounds hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionParams {
    pub energy: i32,
    pub mood: i32,
    pub bond: i32,
}

/// A set of deltas applied together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ParamEffect {
    pub energy: i32,
    pub mood: i32,
    pub bond: i32,
}

fn clamp_add(value: i32, delta: i64, max: i64) -> i32 {
    i64::from(value)
        .saturating_add(delta)
        .clamp(i64::from(PARAM_MIN), max) as i32
}

impl CompanionParams {
    pub fn adjust_energy(&mut self, delta: i64) {
        self.energy = clamp_add(self.energy, delta, i64::from(PARAM_MAX));
    }

    pub fn adjust_mood(&mut self, delta: i64) {
        self.mood = clamp_add(self.mood, delta, i64::from(PARAM_MAX));
    }

    /// Bond has no upper bound beyond what the column can hold.
    pub fn adjust_bond(&mut self, delta: i64) {
        self.bond = clamp_add(self.bond, delta, i64::from(i32::MAX));
    }

    /// Apply every delta of `effect`, clamping each independently.
    pub fn apply(&mut self, effect: ParamEffect) {
        self.adjust_energy(i64::from(effect.energy));
        self.adjust_mood(i64::from(effect.mood));
        self.adjust_bond(i64::from(effect.bond));
    }

    /// Return a copy with `effect` applied.
    pub fn with_effect(mut self, effect: ParamEffect) -> Self {
        self.apply(effect);
        self
    }
}
