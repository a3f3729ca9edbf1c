//! Data-driven game balance
//!
//! Every number the simulation depends on. Units are world units (the
//! pixels of a 1000-wide view, y pointing down), seconds and energy points.
//! Missing fields in a loaded tuning file fall back to these defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player physics ===
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Upward speed applied on jump
    pub jump_impulse: f32,
    /// Terminal fall speed
    pub max_fall_speed: f32,
    pub run_speed: f32,
    pub sprint_speed: f32,
    /// Fraction of the current speed used when running backwards
    pub reverse_factor: f32,
    /// Below this much energy the player slows down
    pub low_energy_threshold: f32,
    pub low_energy_factor: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub slide_height: f32,
    pub spawn_x: f32,
    pub spawn_y: f32,
    /// Player top edge below this line gets caught by the safety net
    pub fall_reset_y: f32,
    /// Top edge the safety net puts the player back at
    pub reset_y: f32,

    // === Energy ===
    pub energy_max: f32,
    /// Energy lost per second while running normally
    pub drain_rate: f32,
    /// Energy lost per second while sprinting
    pub sprint_drain_rate: f32,
    pub pickup_energy: f32,

    // === World ===
    pub ground_y: f32,
    pub ground_tile_width: f32,
    pub ground_depth: f32,
    pub initial_sector_x: f32,
    pub initial_sector_width: f32,
    pub sector_width_min: f32,
    pub sector_width_max: f32,
    /// Smallest sector the generator will ever produce
    pub min_sector_width: f32,
    /// Content must exist this far ahead of the player
    pub lookahead: f32,
    /// Entities this far behind the player are culled
    pub cull_distance: f32,
    pub first_stride: f32,
    pub stride_min: f32,
    pub stride_max: f32,

    // === Distance & difficulty ===
    pub meters_per_unit: f32,
    /// Meters credited per second under time-based distance
    pub time_distance_rate: f32,
    /// Meters per difficulty level
    pub level_length: f32,

    // === Pursuit hazard ===
    pub pursuit_start_x: f32,
    pub pursuit_width: f32,
    pub pursuit_top: f32,
    pub pursuit_height: f32,
    pub pursuit_base_speed: f32,
    pub pursuit_speed_per_level: f32,
    /// The laser is never allowed further than this behind the player
    pub pursuit_max_gap: f32,

    // === Spawn categories (cumulative thresholds on a uniform [0, 1) roll) ===
    pub static_threshold: f32,
    pub oscillating_threshold: f32,
    pub patrolling_threshold: f32,
    pub platform_threshold: f32,

    // === Per-kind geometry ===
    pub car_width: f32,
    pub car_height: f32,
    pub drone_size: f32,
    /// Bottom edge of a drone at rest
    pub drone_bottom: f32,
    /// Vertical travel of a drone (negative is up)
    pub drone_amplitude: f32,
    pub drone_period: f32,
    pub spike_size: f32,
    pub spike_patrol: f32,
    pub spike_period: f32,
    pub platform_top: f32,
    pub platform_height: f32,
    pub platform_width_min: f32,
    pub platform_width_max: f32,
    /// Chance an elevated platform carries a pickup
    pub platform_pickup_chance: f32,
    pub pickup_width: f32,
    pub pickup_height: f32,
    /// Bottom edge of a ground-level pickup
    pub pickup_bottom: f32,
    /// Gap between a platform's top and the bottom of the pickup above it
    pub platform_pickup_clearance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 1600.0,
            jump_impulse: 600.0,
            max_fall_speed: 1000.0,
            run_speed: 350.0,
            sprint_speed: 500.0,
            reverse_factor: 0.5,
            low_energy_threshold: 15.0,
            low_energy_factor: 0.6,
            player_width: 24.0,
            player_height: 60.0,
            slide_height: 30.0,
            spawn_x: 100.0,
            spawn_y: 240.0,
            fall_reset_y: 470.0,
            reset_y: 270.0,

            energy_max: 100.0,
            drain_rate: 4.8,
            sprint_drain_rate: 24.0,
            pickup_energy: 25.0,

            ground_y: 380.0,
            ground_tile_width: 1000.0,
            ground_depth: 400.0,
            initial_sector_x: -1000.0,
            initial_sector_width: 5000.0,
            sector_width_min: 4000.0,
            sector_width_max: 6000.0,
            min_sector_width: 100.0,
            lookahead: 4000.0,
            cull_distance: 4000.0,
            first_stride: 400.0,
            stride_min: 400.0,
            stride_max: 800.0,

            meters_per_unit: 0.1,
            time_distance_rate: 35.0,
            level_length: 500.0,

            pursuit_start_x: -500.0,
            pursuit_width: 20.0,
            pursuit_top: 0.0,
            pursuit_height: 450.0,
            pursuit_base_speed: 300.0,
            pursuit_speed_per_level: 50.0,
            pursuit_max_gap: 600.0,

            static_threshold: 0.2,
            oscillating_threshold: 0.4,
            patrolling_threshold: 0.5,
            platform_threshold: 0.7,

            car_width: 60.0,
            car_height: 40.0,
            drone_size: 30.0,
            drone_bottom: 340.0,
            drone_amplitude: -30.0,
            drone_period: 1.2,
            spike_size: 30.0,
            spike_patrol: 100.0,
            spike_period: 4.0,
            platform_top: 280.0,
            platform_height: 20.0,
            platform_width_min: 300.0,
            platform_width_max: 500.0,
            platform_pickup_chance: 0.6,
            pickup_width: 15.0,
            pickup_height: 30.0,
            pickup_bottom: 340.0,
            platform_pickup_clearance: 40.0,
        }
    }
}

impl Tuning {
    /// Horizontal speed for the given input and energy level
    pub fn horizontal_speed(&self, sprinting: bool, energy: f32) -> f32 {
        let base = if sprinting {
            self.sprint_speed
        } else {
            self.run_speed
        };
        if energy < self.low_energy_threshold {
            base * self.low_energy_factor
        } else {
            base
        }
    }

    /// Pursuit speed at a difficulty level (level 1 is the base speed)
    pub fn pursuit_speed_for_level(&self, level: u32) -> f32 {
        self.pursuit_base_speed + level.saturating_sub(1) as f32 * self.pursuit_speed_per_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_energy_slows_runner() {
        let tuning = Tuning::default();
        assert_eq!(tuning.horizontal_speed(false, 50.0), 350.0);
        assert_eq!(tuning.horizontal_speed(true, 50.0), 500.0);
        assert!((tuning.horizontal_speed(false, 10.0) - 210.0).abs() < 0.001);
        assert!((tuning.horizontal_speed(true, 14.9) - 300.0).abs() < 0.001);
    }

    #[test]
    fn test_pursuit_speed_scales_per_level() {
        let tuning = Tuning::default();
        assert_eq!(tuning.pursuit_speed_for_level(1), 300.0);
        assert_eq!(tuning.pursuit_speed_for_level(3), 400.0);
        assert_eq!(tuning.pursuit_speed_for_level(0), 300.0);
    }

    #[test]
    fn test_partial_tuning_file_uses_defaults() {
        let tuning: Tuning = serde_json::from_str(r#"{ "gravity": 1200.0 }"#).unwrap();
        assert_eq!(tuning.gravity, 1200.0);
        assert_eq!(tuning.run_speed, Tuning::default().run_speed);
    }
}
