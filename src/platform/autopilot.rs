//! Autopilot - plays the game for headless and demo runs
//!
//! Runs forward, jumps ground hazards and slides under drones. It reads the
//! session only through its public view and answers with held controls,
//! like a player at a keyboard.

use crate::sim::{EntityKind, MotionState, RunSession};

use super::{Control, HeldControls};

#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Jump when a ground hazard is this close ahead
    pub jump_gap: f32,
    /// Start sliding when a drone is this close ahead
    pub slide_gap: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            jump_gap: 110.0,
            slide_gap: 90.0,
        }
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controls to hold this tick
    pub fn controls(&self, session: &RunSession) -> HeldControls {
        let mut held = HeldControls::new().with(Control::Right);
        let player = session.player();
        let hitbox = player.hitbox();
        let look = self.jump_gap.max(self.slide_gap);

        let mut jump = false;
        let mut slide = false;
        for entity in session.registry().in_range(hitbox.left(), hitbox.right() + look) {
            // Gap from the player's front edge; negative once alongside
            let gap = entity.bbox.left() - hitbox.right();
            let alongside = entity.bbox.right() > hitbox.left();
            match entity.kind {
                EntityKind::StaticObstacle | EntityKind::PatrollingHazard => {
                    jump |= gap >= 0.0 && gap <= self.jump_gap;
                }
                EntityKind::OscillatingObstacle => {
                    slide |= gap <= self.slide_gap && alongside;
                }
                _ => {}
            }
        }

        match player.state {
            MotionState::Grounded if jump => held.press(Control::Jump),
            MotionState::Grounded | MotionState::Sliding if slide => held.press(Control::Down),
            _ => {}
        }
        held
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::consts::SIM_DT;
    use crate::platform::InputMapper;
    use crate::sim::{Aabb, Axis, GamePhase, Motion, TickInput};

    fn grounded_session(seed: u64) -> RunSession {
        let mut session = RunSession::offline(seed, RunConfig::default());
        session.start();
        for _ in 0..60 {
            session.tick(&TickInput::default(), SIM_DT);
        }
        session
    }

    fn drive(session: &mut RunSession, ticks: usize) {
        let pilot = Autopilot::new();
        let mut mapper = InputMapper::new();
        for _ in 0..ticks {
            let input = mapper.sample(&pilot.controls(session));
            session.tick(&input, SIM_DT);
        }
    }

    #[test]
    fn test_runs_forward_on_open_ground() {
        let mut session = grounded_session(1);
        let start = session.player().pos.x;
        drive(&mut session, 30);
        assert!(session.player().pos.x > start + 150.0);
        assert_eq!(session.phase(), GamePhase::Active);
    }

    #[test]
    fn test_jumps_over_car() {
        let mut session = grounded_session(2);
        let x = session.player().hitbox().right() + 300.0;
        session.registry_mut().create(
            EntityKind::StaticObstacle,
            Aabb::from_bottom_center(x, 380.0, 60.0, 40.0),
            None,
            0.0,
        );
        session.registry_mut().commit();

        drive(&mut session, 120);
        assert_eq!(session.phase(), GamePhase::Active);
        assert!(session.player().hitbox().left() > x + 30.0);
    }

    #[test]
    fn test_slides_under_drone() {
        let mut session = grounded_session(3);
        let x = session.player().hitbox().right() + 250.0;
        session.registry_mut().create(
            EntityKind::OscillatingObstacle,
            Aabb::from_bottom_center(x, 340.0, 30.0, 30.0),
            Some(Motion::new(-30.0, 1.2, Axis::Y)),
            0.0,
        );
        session.registry_mut().commit();

        drive(&mut session, 90);
        assert_eq!(session.phase(), GamePhase::Active);
        assert!(session.player().hitbox().left() > x + 15.0);
    }
}
