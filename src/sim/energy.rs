//! Player stamina economy

use serde::{Deserialize, Serialize};

/// Energy scalar in `[0, max]`. Hitting zero ends the run, but that call is
/// made by the session, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    value: f32,
    max: f32,
    drain_rate: f32,
    sprint_drain_rate: f32,
    /// Total energy actually gained from pickups this run
    collected: f32,
}

impl Energy {
    pub fn new(max: f32, drain_rate: f32, sprint_drain_rate: f32) -> Self {
        let max = max.max(0.0);
        Self {
            value: max,
            max,
            drain_rate: drain_rate.max(0.0),
            sprint_drain_rate: sprint_drain_rate.max(0.0),
            collected: 0.0,
        }
    }

    pub fn from_tuning(tuning: &crate::Tuning) -> Self {
        Self::new(tuning.energy_max, tuning.drain_rate, tuning.sprint_drain_rate)
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn collected(&self) -> f32 {
        self.collected
    }

    /// Drain for `dt` seconds. Returns the new energy.
    pub fn tick(&mut self, dt: f32, sprinting: bool) -> f32 {
        let rate = if sprinting {
            self.sprint_drain_rate
        } else {
            self.drain_rate
        };
        self.set(self.value - rate * dt.max(0.0));
        self.value
    }

    /// Add energy from a pickup, capped at max. Returns the new energy.
    pub fn collect(&mut self, amount: f32) -> f32 {
        let before = self.value;
        self.set(self.value + amount);
        self.collected += (self.value - before).max(0.0);
        self.value
    }

    /// Overwrite the current energy (clamped)
    pub fn set(&mut self, value: f32) {
        self.value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, self.max)
        };
    }

    pub fn is_depleted(&self) -> bool {
        self.value <= 0.0
    }

    /// Fraction of max remaining, for HUD bars
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.value / self.max
        } else {
            0.0
        }
    }

    /// Refill and forget collection totals
    pub fn reset(&mut self) {
        self.value = self.max;
        self.collected = 0.0;
    }
}
