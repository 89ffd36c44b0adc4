//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/appgrd/config.json`.
//! Every section is optional and unknown keys are ignored, so a minimal
//! `{}` file is valid.
//!
//! # Example
//!
//! ```json
//! {
//!   "keys": { "modifier": "super", "confirm_keys": ["return"] },
//!   "switcher": { "raise_delay_ms": 80 },
//!   "layout": { "base_tile": 128, "spacing_boost": 2 }
//! }
//! ```

use crate::command::Rect;
use crate::grid::LayoutConfig;
use crate::interceptor::KeyBindings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Modifier and session keys.
    #[serde(default)]
    pub keys: KeyBindings,

    /// Timing and fallbacks of the engine.
    #[serde(default)]
    pub switcher: SwitcherConfig,

    /// Grid planner constants.
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Engine timing and fallbacks.
///
/// Durations are in **milliseconds**.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitcherConfig {
    /// Settle time between activating an application and raising its
    /// windows.
    pub raise_delay_ms: u64,
    /// Interval of the capability poll that installs the keyboard tap.
    pub capability_poll_ms: u64,
    /// Overlay area used when the window manager cannot report one.
    pub fallback_width: f64,
    pub fallback_height: f64,
}

impl Default for SwitcherConfig {
    fn default() -> Self {
        Self {
            raise_delay_ms: 50,
            capability_poll_ms: 5000,
            fallback_width: 1920.0,
            fallback_height: 1080.0,
        }
    }
}

impl SwitcherConfig {
    pub fn raise_delay(&self) -> Duration {
        Duration::from_millis(self.raise_delay_ms)
    }

    pub fn capability_poll(&self) -> Duration {
        Duration::from_millis(self.capability_poll_ms)
    }

    /// The fallback area, anchored at the origin.
    pub fn fallback_area(&self) -> Rect {
        Rect::new(0.0, 0.0, self.fallback_width, self.fallback_height)
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
