use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{audio::CueId, KenkoError, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub playback: PlaybackConfig,
    pub audio: AudioConfig,
}

impl AppConfig {
    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.playback.tick_interval_ms == 0 {
            return Err(KenkoError::InvalidInput("tick_interval_ms must be positive"));
        }
        Ok(())
    }
}

/// Configuration for the playback loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub tick_interval_ms: u64,
    /// Exercise played or shown when no id is given.
    pub default_exercise: String,
}

impl PlaybackConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            default_exercise: "morning".to_string(),
        }
    }
}

/// Configuration specific to the audio cues.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub muted: bool,
    pub cues: CueAssets,
}

/// Where the host finds the sound for each cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueAssets {
    pub inhale: String,
    pub exhale: String,
    pub hold: String,
}

impl CueAssets {
    pub fn path(&self, cue: CueId) -> &str {
        match cue {
            CueId::Inhale => &self.inhale,
            CueId::Exhale => &self.exhale,
            CueId::Hold => &self.hold,
        }
    }
}

impl Default for CueAssets {
    fn default() -> Self {
        Self {
            inhale: "audio/inhale.mp3".to_string(),
            exhale: "audio/exhale.mp3".to_string(),
            hold: "audio/hold.mp3".to_string(),
        }
    }
}
