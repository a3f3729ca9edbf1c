//! Player controller
//!
//! Turns input and physics into player motion. The controller only knows
//! three motion states; whether the run is over is the session's business.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::collision::Support;
use super::tick::TickInput;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    Airborne,
    Grounded,
    /// Ducked: the hitbox is the lower part of the standing box
    Sliding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left of the standing silhouette
    pub pos: Vec2,
    pub vel: Vec2,
    /// Position before this tick's integration step
    pub prev_pos: Vec2,
    pub state: MotionState,
    pub width: f32,
    pub height: f32,
    pub slide_height: f32,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        let spawn = Vec2::new(tuning.spawn_x, tuning.spawn_y);
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            prev_pos: spawn,
            state: MotionState::Airborne,
            width: tuning.player_width,
            height: tuning.player_height,
            slide_height: tuning.slide_height.min(tuning.player_height),
        }
    }

    fn box_at(&self, pos: Vec2) -> Aabb {
        match self.state {
            MotionState::Sliding => Aabb::new(
                pos.x,
                pos.y + self.height - self.slide_height,
                self.width,
                self.slide_height,
            ),
            _ => Aabb::new(pos.x, pos.y, self.width, self.height),
        }
    }

    /// Current hitbox
    pub fn hitbox(&self) -> Aabb {
        self.box_at(self.pos)
    }

    /// Hitbox as it was before the last integration step
    pub fn previous_hitbox(&self) -> Aabb {
        self.box_at(self.prev_pos)
    }

    pub fn is_supported(&self) -> bool {
        matches!(self.state, MotionState::Grounded | MotionState::Sliding)
    }
}

/// What an input step changed, for cues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlEffects {
    pub jumped: bool,
    pub slide_started: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerController {
    player: Player,
}

impl PlayerController {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            player: Player::new(tuning),
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn state(&self) -> MotionState {
        self.player.state
    }

    pub fn reset(&mut self, tuning: &Tuning) {
        self.player = Player::new(tuning);
    }

    /// Resolve this tick's controls: run speed, slide and jump
    pub fn apply_input(&mut self, input: &TickInput, energy: f32, tuning: &Tuning) -> ControlEffects {
        let p = &mut self.player;
        let mut effects = ControlEffects::default();

        let speed = tuning.horizontal_speed(input.sprint, energy);
        p.vel.x = if input.right {
            speed
        } else if input.left {
            -speed * tuning.reverse_factor
        } else {
            0.0
        };

        match p.state {
            MotionState::Grounded if input.duck => {
                p.state = MotionState::Sliding;
                effects.slide_started = true;
            }
            MotionState::Sliding if !input.duck => {
                p.state = MotionState::Grounded;
            }
            _ => {}
        }

        if input.jump && p.state == MotionState::Grounded {
            p.vel.y = -tuning.jump_impulse;
            p.state = MotionState::Airborne;
            effects.jumped = true;
        }

        effects
    }

    /// Apply gravity and move
    pub fn integrate(&mut self, dt: f32, tuning: &Tuning) {
        let p = &mut self.player;
        p.prev_pos = p.pos;
        p.vel.y = (p.vel.y + tuning.gravity * dt).min(tuning.max_fall_speed);
        p.pos += p.vel * dt;
    }

    /// Apply the support found by the collision pass
    pub fn apply_support(&mut self, support: Option<Support>) {
        let p = &mut self.player;
        match support {
            Some(Support::Land { top }) => {
                // Standing and sliding boxes share the same bottom edge
                p.pos.y = top - p.height;
                p.vel.y = 0.0;
                if p.state == MotionState::Airborne {
                    p.state = MotionState::Grounded;
                }
            }
            Some(Support::Ceiling { bottom }) => {
                let offset = p.hitbox().top() - p.pos.y;
                p.pos.y = bottom - offset;
                p.vel.y = 0.0;
            }
            None => {
                // Walked or slid off an edge
                if p.is_supported() {
                    p.state = MotionState::Airborne;
                }
            }
        }
    }

    /// Catch a player that fell below the world. Returns true if it fired.
    pub fn safety_net(&mut self, tuning: &Tuning) -> bool {
        let p = &mut self.player;
        if p.pos.y > tuning.fall_reset_y {
            p.pos.y = tuning.reset_y;
            p.prev_pos.y = tuning.reset_y;
            p.vel.y = 0.0;
            true
        } else {
            false
        }
    }

    /// Stop all motion (run ended)
    pub fn freeze(&mut self) {
        self.player.vel = Vec2::ZERO;
    }

    /// Move the player without integrating; it starts falling from there
    #[cfg(test)]
    pub fn teleport(&mut self, pos: Vec2) {
        let p = &mut self.player;
        p.pos = pos;
        p.prev_pos = pos;
        p.vel.y = 0.0;
        p.state = MotionState::Airborne;
    }
}
