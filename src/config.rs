// Configuration - Default pattern, generator bounds and audio settings
// Stored as RON, like the rest of the app's settings files

use crate::pattern::{GaitKind, PatternLimits};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse RON config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tone rendering settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneSettings {
    /// Length of each step tone
    pub duration_ms: f32,
    /// Peak amplitude of a tone (0.0 to 1.0)
    pub amplitude: f32,
    /// Output volume (0.0 to 1.0)
    pub volume: f32,
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            duration_ms: 60.0,
            amplitude: 0.6,
            volume: 0.8,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetronomeConfig {
    /// Gait selected at startup
    pub gait: GaitKind,
    /// Cycle period in seconds
    pub period: f64,
    pub asymmetry: f64,
    pub limits: PatternLimits,
    /// How early the next cycle is materialized before a boundary (seconds)
    pub boundary_lookahead: f64,
    pub tone: ToneSettings,
    pub command_capacity: usize,
    pub event_capacity: usize,
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            gait: GaitKind::Walk,
            period: 1.0,
            asymmetry: 0.6,
            limits: PatternLimits::default(),
            boundary_lookahead: 0.05,
            tone: ToneSettings::default(),
            command_capacity: 64,
            event_capacity: 256,
        }
    }
}

impl MetronomeConfig {
    /// Default config location (`<config dir>/stepcue/config.ron`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stepcue").join("config.ron"))
    }

    /// Parse and validate a RON document
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty-printed RON form of this config
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Read and validate a RON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    /// Load `path` if given, else the default location, else built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write this config as RON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Check bounds that the generators and scheduler rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;

        if !(limits.period_min > 0.0 && limits.period_min <= limits.period_max) {
            return Err(ConfigError::Invalid(format!(
                "period bounds [{}, {}] must satisfy 0 < min <= max",
                limits.period_min, limits.period_max
            )));
        }
        if !limits.period_max.is_finite() {
            return Err(ConfigError::Invalid("period_max must be finite".to_string()));
        }
        if !(limits.asymmetry_epsilon > 0.0 && limits.asymmetry_epsilon < 0.5) {
            return Err(ConfigError::Invalid(format!(
                "asymmetry_epsilon {} must lie in (0, 0.5)",
                limits.asymmetry_epsilon
            )));
        }
        if !(limits.transition_cap > 0.0 && limits.transition_cap.is_finite()) {
            return Err(ConfigError::Invalid(
                "transition_cap must be finite and > 0".to_string(),
            ));
        }
        if limits.left_note > 127 || limits.right_note > 127 {
            return Err(ConfigError::Invalid("notes must be MIDI 0-127".to_string()));
        }
        if !(self.period.is_finite() && self.asymmetry.is_finite()) {
            return Err(ConfigError::Invalid(
                "period and asymmetry must be finite".to_string(),
            ));
        }
        if !(self.boundary_lookahead >= 0.0 && self.boundary_lookahead.is_finite()) {
            return Err(ConfigError::Invalid(
                "boundary_lookahead must be finite and >= 0".to_string(),
            ));
        }
        if self.tone.duration_ms <= 0.0 {
            return Err(ConfigError::Invalid("tone duration must be > 0".to_string()));
        }
        if self.command_capacity == 0 || self.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "channel capacities must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MetronomeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = MetronomeConfig::from_ron_str("(gait: skip, period: 0.8)").unwrap();

        assert_eq!(config.gait, GaitKind::Skip);
        assert_eq!(config.period, 0.8);
        assert_eq!(config.asymmetry, 0.6);
        assert_eq!(config.limits, PatternLimits::default());
    }

    #[test]
    fn test_nested_limits() {
        let config =
            MetronomeConfig::from_ron_str("(limits: (period_min: 0.5, transition_cap: 0.1))")
                .unwrap();

        assert_eq!(config.limits.period_min, 0.5);
        assert_eq!(config.limits.period_max, 2.0);
        assert_eq!(config.limits.transition_cap, 0.1);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let result = MetronomeConfig::from_ron_str("(limits: (period_min: 3.0, period_max: 2.0))");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = MetronomeConfig::from_ron_str("(limits: (asymmetry_epsilon: 0.7))");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error() {
        let result = MetronomeConfig::from_ron_str("(gait: trot)");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_ron_roundtrip() {
        let mut config = MetronomeConfig::default();
        config.gait = GaitKind::Gallop;
        config.tone.volume = 0.3;

        let text = config.to_ron_string().unwrap();
        assert_eq!(MetronomeConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.ron");

        let config = MetronomeConfig {
            period: 1.4,
            ..Default::default()
        };
        config.save(&path).unwrap();

        assert_eq!(MetronomeConfig::load(&path).unwrap(), config);
        assert!(matches!(
            MetronomeConfig::load(&dir.path().join("missing.ron")),
            Err(ConfigError::Io(_))
        ));
    }
}
