//! World time and distance

use serde::{Deserialize, Serialize};

use crate::config::DistanceBasis;
use crate::consts::MAX_FRAME_DT;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldClock {
    /// Seconds since the run started
    pub elapsed: f32,
    /// Ticks since the run started
    pub ticks: u64,
}

impl WorldClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick. Returns the delta actually applied: negative or
    /// NaN deltas count as zero and long stalls are capped at `MAX_FRAME_DT`.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.elapsed += dt;
        self.ticks += 1;
        dt
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Meters traveled under the given basis
    pub fn distance(&self, basis: DistanceBasis, player_x: f32, tuning: &Tuning) -> f32 {
        match basis {
            DistanceBasis::PositionBased => (player_x * tuning.meters_per_unit).max(0.0),
            DistanceBasis::TimeBased => self.elapsed * tuning.time_distance_rate,
        }
    }

    /// Difficulty level for a distance: one level per `level_length` meters, starting at 1
    pub fn level_for_distance(distance: f32, tuning: &Tuning) -> u32 {
        if tuning.level_length <= 0.0 {
            return 1;
        }
        (distance.max(0.0) / tuning.level_length).floor() as u32 + 1
    }
}
