use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub audio: AudioConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses a configuration from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Configuration specific to playback pacing and previews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Pause between pacing ticks of the playback worker.
    pub tick_millis: u64,
    /// Point count for the one-shot preview spectrum; must stay a power
    /// of two.
    pub preview_window: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            tick_millis: 100,
            preview_window: 8192,
        }
    }
}
