//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{NeuroSyncError, Result};
use crate::thresholds::ThresholdSet;

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tick loop period in milliseconds
    pub tick_interval_ms: u64,

    /// Quiescence interval shared by all buttons, in milliseconds
    pub debounce_ms: u64,

    /// How cues are played
    pub playback: PlaybackMode,

    /// Training session settings
    pub training: TrainingSettings,

    /// Thresholds at startup
    pub thresholds: ThresholdSet,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            debounce_ms: 200,
            playback: PlaybackMode::NonBlocking,
            training: TrainingSettings::default(),
            thresholds: ThresholdSet::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tick period
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    /// Set the debounce interval
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the training timeout
    pub fn with_session_timeout_secs(mut self, secs: u64) -> Self {
        self.training.session_timeout_secs = secs;
        self
    }

    /// Set the initial thresholds
    pub fn with_thresholds(mut self, thresholds: ThresholdSet) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the playback mode
    pub fn with_playback(mut self, playback: PlaybackMode) -> Self {
        self.playback = playback;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Check values the state machines rely on
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(NeuroSyncError::InvalidConfig(
                "tick_interval_ms must be greater than 0".into(),
            ));
        }
        if self.training.max_level == 0 {
            return Err(NeuroSyncError::InvalidConfig(
                "training.max_level must be greater than 0".into(),
            ));
        }
        if self.training.points_per_level == 0 {
            return Err(NeuroSyncError::InvalidConfig(
                "training.points_per_level must be greater than 0".into(),
            ));
        }
        if self.training.session_timeout_secs == 0 {
            return Err(NeuroSyncError::InvalidConfig(
                "training.session_timeout_secs must be greater than 0".into(),
            ));
        }
        if !self.thresholds.is_valid() {
            return Err(NeuroSyncError::InvalidConfig(format!(
                "thresholds out of range or too close together: {:?}",
                self.thresholds
            )));
        }
        Ok(())
    }

    /// Load configuration from a file (`.toml` or JSON)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = if is_toml(path) {
            toml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file (`.toml` or JSON)
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_toml(path) {
            toml::to_string_pretty(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "toml")
}

/// Training session settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    /// Session ends after this many seconds
    pub session_timeout_secs: u64,

    /// Score needed per level-up
    pub points_per_level: u32,

    /// Reaching this level completes the session
    pub max_level: u8,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            session_timeout_secs: 300, // 5 minutes
            points_per_level: 50,
            max_level: 10,
        }
    }
}

/// Tone playback strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// The tick loop waits for each cue to finish
    Blocking,
    /// Cues stop themselves through deferred tasks
    NonBlocking,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(200));
        assert_eq!(config.training.session_timeout_secs, 300);
        assert_eq!(config.training.max_level, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new()
            .with_tick_interval_ms(20)
            .with_debounce_ms(150)
            .with_session_timeout_secs(60)
            .with_playback(PlaybackMode::Blocking);

        assert_eq!(config.tick_interval(), Duration::from_millis(20));
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.training.session_timeout_secs, 60);
        assert_eq!(config.playback, PlaybackMode::Blocking);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.training.max_level = 0;
        assert!(matches!(
            config.validate(),
            Err(NeuroSyncError::InvalidConfig(_))
        ));

        let config = EngineConfig::default().with_thresholds(ThresholdSet {
            relax_low: 7.0,
            relax_high: 7.2,
            ..ThresholdSet::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "debounce_ms": 120, "training": { "max_level": 5 } }"#)
                .unwrap();
        assert_eq!(config.debounce_ms, 120);
        assert_eq!(config.training.max_level, 5);
        assert_eq!(config.training.points_per_level, 50);
        assert_eq!(config.playback, PlaybackMode::NonBlocking);
    }

    #[test]
    fn test_file_round_trip_json_and_toml() {
        let dir = tempfile::tempdir().unwrap();

        let config = EngineConfig::default().with_debounce_ms(180);
        for name in ["engine.json", "engine.toml"] {
            let path = dir.path().join(name);
            config.to_file(&path).unwrap();
            let loaded = EngineConfig::from_file(&path).unwrap();
            assert_eq!(loaded.debounce_ms, 180);
            assert_eq!(loaded.thresholds, config.thresholds);
        }
    }
}
