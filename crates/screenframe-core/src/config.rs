//! Screen frame configuration
//!
//! Defaults can be overridden at runtime via environment variables:
//!
//! | Environment Variable | Default | Description |
//! |---------------------|---------|-------------|
//! | `SCREENFRAME_WINDOW_TITLE` | `Elite - Dangerous (CLIENT)` | Exact title of the target window |
//! | `SCREENFRAME_CALIBRATION_PATH` | `./configs/resolution.json` | Calibration scale file |

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scale::DEFAULT_CALIBRATION_PATH;

/// Default exact title of the target application window
pub const DEFAULT_WINDOW_TITLE: &str = "Elite - Dangerous (CLIENT)";

/// Environment variable overriding [`FrameConfig::window_title`]
pub const WINDOW_TITLE_ENV: &str = "SCREENFRAME_WINDOW_TITLE";

/// Environment variable overriding [`FrameConfig::calibration_path`]
pub const CALIBRATION_PATH_ENV: &str = "SCREENFRAME_CALIBRATION_PATH";

/// Inputs needed to build a [`crate::screen::ScreenFrame`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Exact title of the window whose monitor should be captured
    pub window_title:     String,
    /// Location of the calibration scale file
    pub calibration_path: PathBuf,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            window_title:     DEFAULT_WINDOW_TITLE.to_string(),
            calibration_path: PathBuf::from(DEFAULT_CALIBRATION_PATH),
        }
    }
}

/// Reads a non-empty string from the environment
fn get_from_env(env_var: &str) -> Option<String> {
    std::env::var(env_var).ok().filter(|s| !s.trim().is_empty())
}

impl FrameConfig {
    /// Creates a config for the given window title with the default
    /// calibration path
    pub fn new(window_title: impl Into<String>) -> Self {
        Self {
            window_title: window_title.into(),
            ..Self::default()
        }
    }

    /// Sets the calibration file path
    pub fn with_calibration_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.calibration_path = path.into();
        self
    }

    /// Default config with environment variable overrides applied
    ///
    /// Empty or whitespace-only values are ignored.
    ///
    /// # Example
    ///
    /// ```bash
    /// export SCREENFRAME_WINDOW_TITLE="My Game"
    /// export SCREENFRAME_CALIBRATION_PATH=/etc/screenframe/resolution.json
    /// ```
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies environment variable overrides on top of this config
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(title) = get_from_env(WINDOW_TITLE_ENV) {
            tracing::debug!("Window title overridden from {}: '{}'", WINDOW_TITLE_ENV, title);
            self.window_title = title;
        }
        if let Some(path) = get_from_env(CALIBRATION_PATH_ENV) {
            tracing::debug!("Calibration path overridden from {}: {}", CALIBRATION_PATH_ENV, path);
            self.calibration_path = PathBuf::from(path);
        }
        self
    }
}
