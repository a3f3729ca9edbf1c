//! World entity types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;

/// Stable entity identifier, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Two-way solid floor tile
    Ground,
    /// One-way platform, only supports from above
    ElevatedPlatform,
    /// Parked car
    StaticObstacle,
    /// Spike sliding back and forth along the ground
    PatrollingHazard,
    /// Drone bobbing up and down
    OscillatingObstacle,
    /// Energy drink
    Pickup,
    /// The laser wall
    PursuitHazard,
}

impl EntityKind {
    /// Kinds the generator places at stride points
    pub const SPAWNABLE: [EntityKind; 5] = [
        EntityKind::StaticObstacle,
        EntityKind::OscillatingObstacle,
        EntityKind::PatrollingHazard,
        EntityKind::ElevatedPlatform,
        EntityKind::Pickup,
    ];

    pub fn is_hazard(&self) -> bool {
        matches!(
            self,
            EntityKind::StaticObstacle
                | EntityKind::PatrollingHazard
                | EntityKind::OscillatingObstacle
                | EntityKind::PursuitHazard
        )
    }

    pub fn is_support(&self) -> bool {
        matches!(self, EntityKind::Ground | EntityKind::ElevatedPlatform)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Ground => "ground",
            EntityKind::ElevatedPlatform => "platform",
            EntityKind::StaticObstacle => "car",
            EntityKind::PatrollingHazard => "spike",
            EntityKind::OscillatingObstacle => "drone",
            EntityKind::Pickup => "energy drink",
            EntityKind::PursuitHazard => "laser",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// Periodic back-and-forth motion around a rest position.
///
/// The offset ramps linearly from 0 to `amplitude` over the first half of
/// `period` and back to 0 over the second half.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub amplitude: f32,
    /// Seconds for a full out-and-back cycle
    pub period: f32,
    pub axis: Axis,
}

impl Motion {
    pub fn new(amplitude: f32, period: f32, axis: Axis) -> Self {
        Self {
            amplitude,
            period,
            axis,
        }
    }

    /// Displacement from rest after `t` seconds
    pub fn offset(&self, t: f32) -> Vec2 {
        if self.period <= 0.0 {
            return Vec2::ZERO;
        }
        let phase = (t.max(0.0) / self.period).fract();
        let ramp = if phase < 0.5 {
            phase * 2.0
        } else {
            (1.0 - phase) * 2.0
        };
        let d = self.amplitude * ramp;
        match self.axis {
            Axis::X => Vec2::new(d, 0.0),
            Axis::Y => Vec2::new(0.0, d),
        }
    }

    /// Box covering every position the moving box can reach
    pub fn sweep(&self, rest: &Aabb) -> Aabb {
        let far = match self.axis {
            Axis::X => rest.translated(Vec2::new(self.amplitude, 0.0)),
            Axis::Y => rest.translated(Vec2::new(0.0, self.amplitude)),
        };
        let min = rest.min.min(far.min);
        let max = (rest.min + rest.size).max(far.min + far.size);
        Aabb {
            min,
            size: max - min,
        }
    }
}

/// A live world object, owned by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Current bounding box
    pub bbox: Aabb,
    /// Box at rest; `bbox` is derived from it for moving entities
    pub rest: Aabb,
    pub motion: Option<Motion>,
    /// World time the entity was materialized at
    pub spawned_at: f32,
    pub destroyed: bool,
}

impl Entity {
    /// Bounding box at world time `now`
    pub fn box_at(&self, now: f32) -> Aabb {
        match &self.motion {
            Some(motion) => self.rest.translated(motion.offset(now - self.spawned_at)),
            None => self.rest,
        }
    }

    /// Horizontal space the entity can ever occupy
    pub fn footprint(&self) -> Aabb {
        match &self.motion {
            Some(motion) => motion.sweep(&self.rest),
            None => self.rest,
        }
    }
}
