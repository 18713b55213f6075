// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dashboard configuration.
//!
//! Every setting has a built-in default. A YAML file can override any
//! subset of them; a missing file simply means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Resume window: videos longer than this resume this many seconds before the end.
pub const VIDEO_DURATION_DEFINITION: f64 = 30.0;

/// Start position for videos no longer than the resume window.
pub const VIDEO_START_TIME: f64 = 0.0;

/// Errors raised while loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub resume_window_secs: f64,
    pub start_time_secs: f64,
    pub playback_rates: Vec<f64>,
    pub capture_width: u32,
    pub capture_height: u32,
    /// Lowercase file extensions accepted by intake
    pub video_extensions: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            resume_window_secs: VIDEO_DURATION_DEFINITION,
            start_time_secs: VIDEO_START_TIME,
            playback_rates: vec![0.5, 1.0, 1.5, 2.0],
            capture_width: 640,
            capture_height: 360,
            video_extensions: ["mp4", "m4v", "mov", "mkv", "webm", "avi", "ogv", "mpeg", "mpg"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl DashboardConfig {
    /// Load the configuration, falling back to defaults when no file is given
    /// or the given file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            log::warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&yaml).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.resume_window_secs < 0.0 || self.start_time_secs < 0.0 {
            return Err(ConfigError::Invalid("times must not be negative".to_string()));
        }
        if self.playback_rates.is_empty() || self.playback_rates.iter().any(|rate| *rate <= 0.0) {
            return Err(ConfigError::Invalid(
                "playback_rates must be a non-empty list of positive numbers".to_string(),
            ));
        }
        if self.capture_width == 0 || self.capture_height == 0 {
            return Err(ConfigError::Invalid("capture size must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Whether the extension of `path` is an accepted video type.
    pub fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.video_extensions.iter().any(|known| *known == ext))
    }
}
