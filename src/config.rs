//! Application configuration
//!
//! Stream defaults come from `config.toml` in the user's config directory
//! (or a file given with `--config`). Command-line flags override them.
//!
//! ```toml
//! [stream]
//! app_name = "pa-raw"
//! stream_name = "pa-raw"
//! samples_per_second = 48000
//! channels = 2
//! format = "f32ne"
//! buffer_max_bytes = 0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::audio::{SampleFormat, StreamConfig};
use crate::constants::*;
use crate::error::{Error, Result};

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub stream: StreamSettings,
}

/// `[stream]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamSettings {
    pub app_name: String,
    pub stream_name: String,
    pub samples_per_second: u32,
    pub channels: u16,
    pub format: String,
    pub buffer_max_bytes: u32,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            stream_name: DEFAULT_STREAM_NAME.to_string(),
            samples_per_second: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            format: SampleFormat::Float32Ne.as_str().to_string(),
            buffer_max_bytes: 0,
        }
    }
}

impl StreamSettings {
    /// Turn the settings into stream parameters
    ///
    /// Fails with `UnknownFormat` when the format literal is not recognised.
    /// Whether the server accepts the values is checked later, by
    /// [`StreamConfig::validate`].
    pub fn to_stream_config(&self) -> Result<StreamConfig> {
        let format = self.format.parse::<SampleFormat>()?;
        Ok(StreamConfig {
            format,
            rate: self.samples_per_second,
            channels: self.channels,
            app_name: self.app_name.clone(),
            stream_name: self.stream_name.clone(),
            buffer_max_bytes: self.buffer_max_bytes,
        })
    }
}

impl AppConfig {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Settings(e.to_string()))
    }

    /// Load a config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Settings(format!("{}: {}", path.display(), e)))
    }

    /// Load from `custom_path`, or from the default location
    pub fn load(custom_path: Option<&Path>) -> Result<Self> {
        match custom_path {
            Some(path) => Self::load_from(path),
            None => match default_config_path() {
                Some(path) => Self::load_from(&path),
                None => Ok(Self::default()),
            },
        }
    }
}

/// `<config dir>/pa-raw/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("tools", "hz", "pa-raw")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
