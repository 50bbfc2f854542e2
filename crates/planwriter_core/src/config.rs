//! Write-session configuration.
//!
//! # Invariants
//! - `save_debounce_ms` is strictly positive.
//! - Missing fields fall back to the defaults below.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 300;
const DEFAULT_IMAGE_WIDTH_PADDING: u32 = 48;

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: &'static str },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => write!(f, "invalid `{field}`: {reason}"),
            Self::Parse(err) => write!(f, "invalid session config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Tunables of one write session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet period after the last edit before the remote save runs.
    pub save_debounce_ms: u64,
    /// Subtracted from the viewport width when no selection width is known.
    pub image_width_padding: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
            image_width_padding: DEFAULT_IMAGE_WIDTH_PADDING,
        }
    }
}

impl SessionConfig {
    /// Parses a JSON config object and validates it.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.save_debounce_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "save_debounce_ms",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}
