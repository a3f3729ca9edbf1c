//! Run state and core simulation types

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a start command
    Idle,
    /// Ticking
    Active,
    /// Run over, score computed
    Ended,
}

/// Why a run ended. These are normal outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Ran into a car or a drone
    Crashed,
    /// Ran into a spike
    Impaled,
    /// Caught by the laser wall
    Incinerated,
    /// Ran out of energy
    Exhausted,
}

impl TerminationReason {
    /// Game-over banner text
    pub fn label(&self) -> &'static str {
        match self {
            TerminationReason::Crashed => "CRASHED",
            TerminationReason::Impaled => "IMPALED",
            TerminationReason::Incinerated => "INCINERATED",
            TerminationReason::Exhausted => "EXHAUSTED",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Things that happened during a tick, for audio and HUD collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    Jumped,
    SlideStarted,
    Collected { id: EntityId, energy: f32 },
    LevelUp { level: u32 },
    RunEnded { reason: TerminationReason, score: u64 },
}

/// Per-run counters, reset on start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Meters traveled
    pub distance: f32,
    /// Mirror of the energy economy after the last tick
    pub energy: f32,
    pub difficulty_level: u32,
    pub pursuit_speed: f32,
    /// World content exists up to here
    pub next_frontier: f32,
    pub is_active: bool,
    /// Fastest horizontal speed reached
    pub max_speed: f32,
}

impl RunState {
    pub fn new(energy: f32, pursuit_speed: f32, next_frontier: f32) -> Self {
        Self {
            distance: 0.0,
            energy,
            difficulty_level: 1,
            pursuit_speed,
            next_frontier,
            is_active: false,
            max_speed: 0.0,
        }
    }

    /// Whole meters shown on the HUD and submitted as score
    pub fn score(&self) -> u64 {
        self.distance.max(0.0).floor() as u64
    }
}

/// Snapshot produced when a run ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: u64,
    pub reason: TerminationReason,
    /// Meters traveled
    pub distance: f32,
    /// Seconds survived
    pub duration: f32,
    pub stamina_collected: f32,
    pub max_speed: f32,
    pub level: u32,
    /// Submitted without player identity
    pub identity_dropped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_distinct() {
        let reasons = [
            TerminationReason::Crashed,
            TerminationReason::Impaled,
            TerminationReason::Incinerated,
            TerminationReason::Exhausted,
        ];
        let labels: std::collections::HashSet<_> = reasons.iter().map(|r| r.label()).collect();
        assert_eq!(labels.len(), 4);
        assert_eq!(TerminationReason::Incinerated.to_string(), "INCINERATED");
    }

    #[test]
    fn test_score_floors_distance() {
        let mut run = RunState::new(100.0, 300.0, 4000.0);
        run.distance = 123.9;
        assert_eq!(run.score(), 123);
        run.distance = -4.0;
        assert_eq!(run.score(), 0);
    }
}
