//! Run settings and board configuration
//!
//! Persisted as JSON. The host validates before building an engine; the
//! simulation itself assumes in-range values.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{BoardConfig, LayoutError};

/// Largest run the host allows
pub const MAX_BALL_COUNT: u32 = 1000;
/// Spawn pacing range (balls per second)
pub const MIN_SPEED: u32 = 1;
pub const MAX_SPEED: u32 = 10;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("ball count {0} out of range (0..={max})", max = MAX_BALL_COUNT)]
    BallCountOutOfRange(u32),

    #[error("speed {0} out of range ({min}..={max})", min = MIN_SPEED, max = MAX_SPEED)]
    SpeedOutOfRange(u32),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Run parameters plus board geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Balls to drop per run
    pub ball_count: u32,
    /// Spawn pacing (higher drops faster)
    pub speed: u32,
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
    pub board: BoardConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ball_count: 10,
            speed: 3,
            seed: None,
            board: BoardConfig::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.ball_count > MAX_BALL_COUNT {
            return Err(SettingsError::BallCountOutOfRange(self.ball_count));
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(SettingsError::SpeedOutOfRange(self.speed));
        }
        self.board.validate()?;
        Ok(())
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        if let Err(e) = settings.validate() {
            log::warn!("Rejected settings: {}", e);
            return Err(e);
        }
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
