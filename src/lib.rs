//! Midnight Run - an endless-runner simulation engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world generation, physics, run lifecycle)
//! - `tuning`: Data-driven game balance
//! - `config`: Per-variant run configuration
//! - `persistence`: Remote score service (best-effort, offline tolerant)
//! - `platform`: Input collaborator boundary
//! - `renderer`: Draw-command boundary
//! - `audio`: Sound cue boundary

pub mod audio;
pub mod config;
pub mod highscores;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use config::{DistanceBasis, RunConfig};
pub use highscores::HighScores;
pub use tuning::Tuning;

/// Host loop constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the pacing the drain rates were tuned at)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest delta a single tick will integrate; longer stalls are clamped
    pub const MAX_FRAME_DT: f32 = 0.1;
}
