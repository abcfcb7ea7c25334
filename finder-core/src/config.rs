//! # Configuration Module
//!
//! Tracker settings, loadable from JSON. Fields missing from a file fall
//! back to the live-tuning defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TunerError};
use crate::notes::{A4_REFERENCE, ModifierPreference, NoteResolver};

/// Responsiveness presets for the smoothing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmoothingPreset {
    /// Follows the instrument closely while the player adjusts a string.
    LiveTuning,
    /// Steadier reading for background monitoring.
    PassiveListening,
}

impl SmoothingPreset {
    pub fn smoothing_factor(self) -> f32 {
        match self {
            SmoothingPreset::LiveTuning => 0.5,
            SmoothingPreset::PassiveListening => 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Weight of each new sample in the moving average, in (0, 1].
    pub smoothing_factor: f32,
    /// Frequency of A4 in Hz.
    pub reference_a4: f32,
    /// How accidentals are spelled when notes are shown.
    pub modifier_preference: ModifierPreference,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::from_preset(SmoothingPreset::LiveTuning)
    }
}

impl TrackerConfig {
    pub fn from_preset(preset: SmoothingPreset) -> Self {
        Self {
            smoothing_factor: preset.smoothing_factor(),
            reference_a4: A4_REFERENCE,
            modifier_preference: ModifierPreference::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| TunerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(target: "config", "loaded {}", path.display());
        Self::from_json_str(&json)
    }

    /// Checks the numeric fields are usable by a tracker.
    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(TunerError::InvalidSmoothingFactor(self.smoothing_factor));
        }
        NoteResolver::new(self.reference_a4)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_live_tuning_at_concert_pitch() {
        let config = TrackerConfig::default();
        assert_eq!(config.smoothing_factor, 0.5);
        assert_eq!(config.reference_a4, 440.0);
    }

    #[test]
    fn passive_preset_is_slower() {
        let live = TrackerConfig::from_preset(SmoothingPreset::LiveTuning);
        let passive = TrackerConfig::from_preset(SmoothingPreset::PassiveListening);
        assert!(passive.smoothing_factor < live.smoothing_factor);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = TrackerConfig::from_json_str(r#"{ "reference_a4": 442.0 }"#).unwrap();
        assert_eq!(config.reference_a4, 442.0);
        assert_eq!(config.smoothing_factor, 0.5);
    }

    #[test]
    fn reads_modifier_preference() {
        let config = TrackerConfig::from_json_str(r#"{ "modifier_preference": "flats" }"#).unwrap();
        assert_eq!(config.modifier_preference, ModifierPreference::Flats);
        assert_eq!(
            TrackerConfig::default().modifier_preference,
            ModifierPreference::Sharps
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            TrackerConfig::from_json_str(r#"{ "smoothing_factor": 0.0 }"#),
            Err(TunerError::InvalidSmoothingFactor(_))
        ));
        assert!(matches!(
            TrackerConfig::from_json_str(r#"{ "reference_a4": -1.0 }"#),
            Err(TunerError::InvalidReference(_))
        ));
        assert!(matches!(
            TrackerConfig::from_json_str("not json"),
            Err(TunerError::ConfigParse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "smoothing_factor": 0.25, "reference_a4": 415.0 }}"#).unwrap();

        let config = TrackerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.smoothing_factor, 0.25);
        assert_eq!(config.reference_a4, 415.0);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = TrackerConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, TunerError::ConfigIo { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn preset_names_are_kebab_case() {
        let preset: SmoothingPreset = serde_json::from_str(r#""passive-listening""#).unwrap();
        assert_eq!(preset, SmoothingPreset::PassiveListening);
    }
}
