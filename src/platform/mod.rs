//! Platform abstraction layer
//!
//! The simulation consumes [`TickInput`]s. Hosts describe their controls as
//! an [`InputSource`] that can be polled for the held state of each
//! [`Control`]; [`InputMapper`] turns that into per-tick input, including
//! edge detection for the jump.

pub mod autopilot;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::sim::TickInput;

pub use autopilot::Autopilot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Control {
    Left,
    Right,
    /// Alternate jump key
    Up,
    /// Slide
    Down,
    Sprint,
    Jump,
}

/// Anything that can report whether a control is held right now
pub trait InputSource {
    fn is_down(&self, control: Control) -> bool;
}

/// A plain set of held controls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldControls(BTreeSet<Control>);

impl HeldControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, control: Control) {
        self.0.insert(control);
    }

    pub fn release(&mut self, control: Control) {
        self.0.remove(&control);
    }

    pub fn with(mut self, control: Control) -> Self {
        self.press(control);
        self
    }
}

impl InputSource for HeldControls {
    fn is_down(&self, control: Control) -> bool {
        self.0.contains(&control)
    }
}

/// Samples an input source once per tick
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    jump_was_down: bool,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build this tick's input. Jump fires only on the tick it goes down.
    pub fn sample<S: InputSource + ?Sized>(&mut self, source: &S) -> TickInput {
        let jump_down = source.is_down(Control::Jump) || source.is_down(Control::Up);
        let jump = jump_down && !self.jump_was_down;
        self.jump_was_down = jump_down;

        TickInput {
            right: source.is_down(Control::Right),
            left: source.is_down(Control::Left),
            sprint: source.is_down(Control::Sprint),
            jump,
            duck: source.is_down(Control::Down),
        }
    }

    /// Forget held state, e.g. after a restart
    pub fn reset(&mut self) {
        self.jump_was_down = false;
    }
}

/// Fixed-timestep accumulator for the host frame loop
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's elapsed time; returns how many `SIM_DT` ticks to run.
    /// Capped at `MAX_SUBSTEPS` so a stall can't snowball; the excess is dropped.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
