//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or network dependencies

pub mod aabb;
pub mod clock;
pub mod collision;
pub mod energy;
pub mod entity;
pub mod generator;
pub mod player;
pub mod registry;
pub mod session;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use clock::WorldClock;
pub use collision::{Outcome, Support, resolve, resolve_support};
pub use energy::Energy;
pub use entity::{Axis, Entity, EntityId, EntityKind, Motion};
pub use generator::{ProceduralGenerator, Sector};
pub use player::{ControlEffects, MotionState, Player, PlayerController};
pub use registry::{EntityRegistry, SpawnRequest};
pub use session::RunSession;
pub use state::{GameEvent, GamePhase, RunState, ScoreRecord, TerminationReason};
pub use tick::{TickInput, tick};
