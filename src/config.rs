//! Run configuration
//!
//! The game variants differ in how distance is measured, which hazards
//! exist and when each kind is introduced. All of that is data here, chosen
//! once when a session is created.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::EntityKind;
use crate::tuning::Tuning;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What the distance counter is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistanceBasis {
    /// Player x position
    #[default]
    PositionBased,
    /// Time survived
    TimeBased,
}

/// Shape of the body posted to `/submit_run`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SubmitFormat {
    /// `{ "score": n }`
    #[default]
    Simple,
    /// Full run statistics
    Detailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Preset name, for logs
    pub name: String,
    pub distance_basis: DistanceBasis,
    /// Kinds the generator may place at all
    pub hazard_roster: BTreeSet<EntityKind>,
    /// Kinds unlocked at each difficulty level. A kind listed nowhere is
    /// available from level 1.
    pub difficulty_gates: BTreeMap<u32, BTreeSet<EntityKind>>,
    pub submit_format: SubmitFormat,
    /// Submit runs without identity
    pub anonymous: bool,
    pub tuning: Tuning,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::midnight_run()
    }
}

impl RunConfig {
    /// Distance follows the player; spikes and platforms unlock at level 2
    pub fn midnight_run() -> Self {
        let mut difficulty_gates = BTreeMap::new();
        difficulty_gates.insert(
            2,
            BTreeSet::from([EntityKind::PatrollingHazard, EntityKind::ElevatedPlatform]),
        );
        Self {
            name: "midnight-run".to_string(),
            distance_basis: DistanceBasis::PositionBased,
            hazard_roster: EntityKind::SPAWNABLE.into_iter().collect(),
            difficulty_gates,
            submit_format: SubmitFormat::Simple,
            anonymous: false,
            tuning: Tuning::default(),
        }
    }

    /// Distance follows the clock; submits full run statistics
    pub fn time_trial() -> Self {
        Self {
            name: "time-trial".to_string(),
            distance_basis: DistanceBasis::TimeBased,
            submit_format: SubmitFormat::Detailed,
            ..Self::midnight_run()
        }
    }

    /// Lowest level at which `kind` may spawn
    pub fn unlock_level(&self, kind: EntityKind) -> u32 {
        self.difficulty_gates
            .iter()
            .find(|(_, kinds)| kinds.contains(&kind))
            .map(|(&level, _)| level)
            .unwrap_or(1)
    }

    /// Whether the generator may place `kind` at `level`
    pub fn is_enabled(&self, kind: EntityKind, level: u32) -> bool {
        self.hazard_roster.contains(&kind) && level >= self.unlock_level(kind)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from `path`, falling back to the default preset on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded run config '{}' from {}", config.name, path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using default run config");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gates() {
        let config = RunConfig::default();
        assert!(config.is_enabled(EntityKind::StaticObstacle, 1));
        assert!(config.is_enabled(EntityKind::Pickup, 1));
        assert!(!config.is_enabled(EntityKind::PatrollingHazard, 1));
        assert!(!config.is_enabled(EntityKind::ElevatedPlatform, 1));
        assert!(config.is_enabled(EntityKind::PatrollingHazard, 2));
        assert!(config.is_enabled(EntityKind::ElevatedPlatform, 7));
        let count = |level| {
            config
                .hazard_roster
                .iter()
                .filter(|&&k| config.is_enabled(k, level))
                .count()
        };
        assert_eq!(count(1), 3);
        assert_eq!(count(2), 5);
    }

    #[test]
    fn test_roster_excludes_kind() {
        let mut config = RunConfig::default();
        config.hazard_roster.remove(&EntityKind::OscillatingObstacle);
        assert!(!config.is_enabled(EntityKind::OscillatingObstacle, 10));
    }

    #[test]
    fn test_time_trial_preset() {
        let config = RunConfig::time_trial();
        assert_eq!(config.distance_basis, DistanceBasis::TimeBased);
        assert_eq!(config.submit_format, SubmitFormat::Detailed);
        assert_eq!(config.unlock_level(EntityKind::PatrollingHazard), 2);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("midnight-run-config-{}.json", std::process::id()));
        let config = RunConfig::time_trial();
        config.save(&path).unwrap();
        let loaded = RunConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = RunConfig::load_or_default(Path::new("/nonexistent/midnight-run.json"));
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let path = std::env::temp_dir().join(format!("midnight-run-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = RunConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
