use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Result, WorkoutError};

/// Longest exercise a configuration may allow: one day.
pub const MAX_DURATION_CEILING: u32 = 86_400;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkoutConfig {
    pub durations: DurationConfig,
    pub timer: TimerConfig,
    pub speech: SpeechConfig,
}

impl WorkoutConfig {
    /// Reads a JSON configuration file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.durations;
        if d.min_seconds == 0 {
            return Err(WorkoutError::InvalidConfig(
                "durations.min_seconds must be positive".into(),
            ));
        }
        if d.min_seconds > d.max_seconds {
            return Err(WorkoutError::InvalidConfig(format!(
                "durations.min_seconds ({}) exceeds durations.max_seconds ({})",
                d.min_seconds, d.max_seconds
            )));
        }
        if d.max_seconds > MAX_DURATION_CEILING {
            return Err(WorkoutError::InvalidConfig(format!(
                "durations.max_seconds ({}) exceeds the {MAX_DURATION_CEILING} second ceiling",
                d.max_seconds
            )));
        }
        if d.step_seconds == 0 {
            return Err(WorkoutError::InvalidConfig(
                "durations.step_seconds must be positive".into(),
            ));
        }
        if self.timer.tick_interval_ms == 0 {
            return Err(WorkoutError::InvalidConfig(
                "timer.tick_interval_ms must be positive".into(),
            ));
        }
        if self.speech.language.trim().is_empty() {
            return Err(WorkoutError::InvalidConfig(
                "speech.language must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Bounds applied to exercise durations when they enter the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DurationConfig {
    pub min_seconds: u32,
    pub max_seconds: u32,
    pub step_seconds: u32,
}

impl DurationConfig {
    pub fn clamp(&self, seconds: u32) -> u32 {
        // `u32::clamp` panics on inverted bounds; unvalidated configs must not.
        seconds.max(self.min_seconds).min(self.max_seconds)
    }
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            min_seconds: 10,
            max_seconds: 600,
            step_seconds: 10,
        }
    }
}

/// Configuration specific to the session timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimerConfig {
    pub tick_interval_ms: u64,
}

impl TimerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
        }
    }
}

/// Spoken cue settings. `program` names the system speech binary used by
/// [`crate::CommandAnnouncer`]; `None` picks the platform default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeechConfig {
    pub language: String,
    pub program: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            program: None,
        }
    }
}
