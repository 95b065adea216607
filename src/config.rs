//! Match timing configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Timing and randomness settings for matches.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Seconds a participant has to answer each prompt.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// Delay before the opponent is prompted, in milliseconds.
    #[serde(default = "default_stagger_ms")]
    stagger_ms: u64,

    /// Delay between series messages, in milliseconds.
    #[serde(default = "default_pacing_ms")]
    pacing_ms: u64,

    /// Seed for the automatic player. Entropy when absent.
    #[serde(default)]
    seed: Option<u64>,
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_stagger_ms() -> u64 {
    250
}

fn default_pacing_ms() -> u64 {
    1000
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            stagger_ms: default_stagger_ms(),
            pacing_ms: default_pacing_ms(),
            seed: None,
        }
    }
}

impl MatchConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(?config, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.timeout_secs == 0 {
            return Err(ConfigError::new("timeout_secs must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Returns a copy with a different reply timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Returns a copy with a fixed automatic-player seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reply timeout per prompt.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before the opponent's prompt.
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    /// Delay between series messages.
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
