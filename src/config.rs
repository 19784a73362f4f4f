// src/config.rs

//! Configuration structures for the frame-relay core.
//!
//! These structs can be deserialized from a JSON configuration file to
//! customize the streaming pipeline and the UI refresh cadence. Default
//! values are provided for every option, so an empty file (or no file at
//! all) yields a working configuration.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Global configuration, lazily initialized with defaults.
///
/// Components that are not handed an explicit [`Config`] read this one.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::default);

/// Root configuration for the frame-relay core.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)] // Apply default values for the entire struct if a field is missing.
pub struct Config {
    /// Framebuffer streaming settings.
    pub stream: StreamConfig,
    /// UI refresh settings.
    pub refresh: RefreshConfig,
}

impl Config {
    /// Load configuration from a JSON file, filling in defaults for any
    /// missing fields.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Settings for the framebuffer streaming pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Initial canvas width in pixels, used to size the image pair before
    /// the first real frame arrives.
    pub initial_width: u32,
    /// Initial canvas height in pixels.
    pub initial_height: u32,
    /// Name given to the background copy worker thread.
    pub worker_thread_name: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            initial_width: 1280,
            initial_height: 720,
            worker_thread_name: "frame-copy".to_string(),
        }
    }
}

/// Settings for the UI-side refresh cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// How often the UI role checks for a newly published front image.
    /// The pipeline itself does not tick; this is a hint for the
    /// embedding UI loop.
    pub refresh_rate_hz: f64,
}

impl RefreshConfig {
    /// The tick interval corresponding to the configured rate. A rate
    /// that is zero or non-finite yields a zero interval (tick as fast
    /// as the loop allows).
    pub fn tick_interval(&self) -> Duration {
        if self.refresh_rate_hz.is_finite() && self.refresh_rate_hz > 0.0 {
            Duration::from_secs_f64(1.0 / self.refresh_rate_hz)
        } else {
            Duration::ZERO
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            refresh_rate_hz: 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_provide_sensible_defaults() {
        let config = Config::default();
        assert!(config.stream.initial_width > 0);
        assert!(config.stream.initial_height > 0);
        assert_eq!(config.refresh.refresh_rate_hz, 60.0);
    }

    #[test]
    fn it_should_derive_the_tick_interval_from_the_refresh_rate() {
        let refresh = RefreshConfig {
            refresh_rate_hz: 50.0,
        };
        assert_eq!(refresh.tick_interval(), Duration::from_millis(20));

        let unbounded = RefreshConfig {
            refresh_rate_hz: 0.0,
        };
        assert_eq!(unbounded.tick_interval(), Duration::ZERO);
    }

    #[test]
    fn it_should_fill_in_missing_fields_when_deserializing() {
        let config: Config =
            serde_json::from_str(r#"{"stream": {"initial_width": 640}}"#).unwrap();
        assert_eq!(config.stream.initial_width, 640);
        assert_eq!(
            config.stream.initial_height,
            StreamConfig::default().initial_height
        );
        assert_eq!(config.refresh.refresh_rate_hz, 60.0);
    }
}
