//! One-line text renderer for headless runs
//!
//! Squashes the view into a strip of characters, one per column, with the
//! HUD appended. Good enough to eyeball a run in a log.

use crate::sim::{EntityKind, MotionState};

use super::{DrawKind, Frame, Renderer, VIEW_WIDTH};

pub struct StripRenderer {
    columns: usize,
    last: String,
}

impl StripRenderer {
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            last: String::new(),
        }
    }

    /// Most recently rendered line
    pub fn last_line(&self) -> &str {
        &self.last
    }

    fn glyph(kind: DrawKind) -> char {
        match kind {
            DrawKind::Entity(EntityKind::Ground) => '_',
            DrawKind::Entity(EntityKind::ElevatedPlatform) => '=',
            DrawKind::Entity(EntityKind::StaticObstacle) => 'C',
            DrawKind::Entity(EntityKind::PatrollingHazard) => '^',
            DrawKind::Entity(EntityKind::OscillatingObstacle) => 'o',
            DrawKind::Entity(EntityKind::Pickup) => '+',
            DrawKind::Entity(EntityKind::PursuitHazard) => '|',
            DrawKind::Player(MotionState::Grounded) => 'R',
            DrawKind::Player(MotionState::Sliding) => 'r',
            DrawKind::Player(MotionState::Airborne) => '\'',
        }
    }

    /// Render a frame to a string without storing it
    pub fn draw(&self, frame: &Frame) -> String {
        let scale = VIEW_WIDTH / self.columns as f32;
        let mut cells = vec![' '; self.columns];
        // Commands are depth-sorted, so later ones overwrite earlier ones
        for command in &frame.commands {
            let (left, right) = command.rect.span_x();
            let first = (left / scale).floor().max(0.0) as usize;
            let last = ((right / scale).ceil().max(0.0) as usize).min(self.columns);
            for cell in cells.iter_mut().take(last).skip(first) {
                *cell = Self::glyph(command.kind);
            }
        }

        let hud = &frame.hud;
        let mut line: String = cells.into_iter().collect();
        line.push_str(&format!(
            " {:>6}m E{:>3.0}% S{} BEST {}",
            hud.distance,
            hud.energy * 100.0,
            hud.level,
            hud.best
        ));
        if let Some(reason) = hud.banner {
            line.push_str(&format!(" [{reason}]"));
        }
        line
    }
}

impl Renderer for StripRenderer {
    fn render(&mut self, frame: &Frame) {
        self.last = self.draw(frame);
        log::trace!("{}", self.last);
    }
}
