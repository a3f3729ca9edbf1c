//! Rendering boundary
//!
//! The core never draws. Each frame it produces a flat list of
//! "draw kind K at box B" commands plus HUD values, in world coordinates
//! translated into a camera that follows the player. Backends consume
//! [`Frame`]s through the [`Renderer`] trait.

pub mod strip;

use serde::{Deserialize, Serialize};

use crate::sim::{Aabb, EntityKind, GamePhase, MotionState, RunSession, TerminationReason};

pub use strip::StripRenderer;

/// Visible width of the world, in world units
pub const VIEW_WIDTH: f32 = 1000.0;
/// Where the player sits horizontally inside the view
pub const PLAYER_SCREEN_X: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawKind {
    Entity(EntityKind),
    Player(MotionState),
}

impl DrawKind {
    /// Base fill color
    pub fn color(&self) -> [f32; 4] {
        match self {
            DrawKind::Entity(EntityKind::Ground) => rgb(0x080808, 1.0),
            DrawKind::Entity(EntityKind::ElevatedPlatform) => rgb(0x111111, 1.0),
            DrawKind::Entity(EntityKind::StaticObstacle) => rgb(0xff0000, 1.0),
            DrawKind::Entity(EntityKind::PatrollingHazard) => rgb(0xff0000, 1.0),
            DrawKind::Entity(EntityKind::OscillatingObstacle) => rgb(0x222222, 1.0),
            DrawKind::Entity(EntityKind::Pickup) => rgb(0x00ff00, 1.0),
            DrawKind::Entity(EntityKind::PursuitHazard) => rgb(0xff0000, 0.6),
            DrawKind::Player(_) => rgb(0xffffff, 1.0),
        }
    }

    /// Painter's order, lowest first
    pub fn depth(&self) -> u8 {
        match self {
            DrawKind::Entity(EntityKind::Ground | EntityKind::ElevatedPlatform) => 0,
            DrawKind::Entity(EntityKind::PursuitHazard) => 15,
            DrawKind::Player(_) => 20,
            DrawKind::Entity(_) => 10,
        }
    }
}

fn rgb(hex: u32, alpha: f32) -> [f32; 4] {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), alpha]
}

/// One rectangle to draw, already in screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    pub kind: DrawKind,
    pub rect: Aabb,
}

/// Numbers shown over the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub distance: u64,
    /// 0.0 - 1.0
    pub energy: f32,
    pub level: u32,
    pub best: u64,
    pub phase: GamePhase,
    /// Game-over banner, while ended
    pub banner: Option<TerminationReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Left edge of the view in world units
    pub camera_x: f32,
    pub commands: Vec<DrawCommand>,
    pub hud: Hud,
}

/// Draw-command consumer
pub trait Renderer {
    fn render(&mut self, frame: &Frame);
}

/// Build the frame for the current session state
pub fn build_frame(session: &RunSession) -> Frame {
    let player = session.player();
    let camera_x = player.pos.x - PLAYER_SCREEN_X;
    let offset = glam::Vec2::new(-camera_x, 0.0);

    let mut commands: Vec<DrawCommand> = session
        .registry()
        .in_range(camera_x, camera_x + VIEW_WIDTH)
        .map(|e| DrawCommand {
            kind: DrawKind::Entity(e.kind),
            rect: e.bbox.translated(offset),
        })
        .collect();
    commands.push(DrawCommand {
        kind: DrawKind::Player(player.state),
        rect: player.hitbox().translated(offset),
    });
    // Stable: equal depths keep registry (id) order
    commands.sort_by_key(|c| c.kind.depth());

    let run = session.run();
    Frame {
        camera_x,
        commands,
        hud: Hud {
            distance: run.score(),
            energy: session.energy().fraction(),
            level: run.difficulty_level,
            best: session.best_score().max(run.score()),
            phase: session.phase(),
            banner: session.termination(),
        },
    }
}
