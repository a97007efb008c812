use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Longest period accepted for the sync and bus-poll loops.
const MAX_INTERVAL_MS: u64 = 60 * 60 * 1000;

/// TOML configuration. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Period of the position/duration sync loop
    pub update_interval_ms: u64,

    /// How often the headless loop drains the bus
    pub bus_poll_interval_ms: u64,

    /// Bound on the blocking state query behind play/pause.
    /// Absent means wait for the pipeline to settle.
    pub state_query_timeout_ms: Option<u64>,

    pub window: WindowConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_interval_ms: 200,
            bus_poll_interval_ms: 50,
            state_query_timeout_ms: None,
            window: WindowConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 120.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms.clamp(1, MAX_INTERVAL_MS))
    }

    pub fn bus_poll_interval(&self) -> Duration {
        Duration::from_millis(self.bus_poll_interval_ms.clamp(1, MAX_INTERVAL_MS))
    }

    pub fn state_query_timeout(&self) -> Option<Duration> {
        self.state_query_timeout_ms.map(Duration::from_millis)
    }
}
