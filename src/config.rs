//! Configuration for the pedal plotter window and its serial link.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::history::{Channel, HISTORY_CAPACITY};
use crate::data::trace_look::{TraceLook, TraceLookSerde};

/// Fixed Y axis range: the full 10-bit ADC scale.
pub const Y_RANGE: (f64, f64) = (0.0, 1023.0);
/// Fixed X axis range: one sample index per history slot.
pub const X_RANGE: (f64, f64) = (0.0, HISTORY_CAPACITY as f64);

/// Placeholder replaced by the throttle-min value in [`PedalPlotConfig::command_template`].
pub const VALUE_PLACEHOLDER: &str = "{value}";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("HOME env var not set")]
    NoHome,
}

/// Platform-typical name of the controller's port.
pub fn default_port() -> String {
    if cfg!(windows) {
        "COM15".to_string()
    } else if cfg!(target_os = "macos") {
        "/dev/cu.usbmodem1101".to_string()
    } else {
        "/dev/ttyACM0".to_string()
    }
}

/// Top-level configuration.
///
/// | Field              | Purpose |
/// |--------------------|---------|
/// | `port`             | Serial device to open at startup |
/// | `title`            | Native window title |
/// | `throttle_min`     | Initial content of the "Throttle Min" field |
/// | `command_template` | Command sent by the "Send" button, `None` hides it |
/// | `brake`/`throttle` | Line styling |
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PedalPlotConfig {
    pub port: String,
    pub title: String,
    pub throttle_min: i32,
    pub command_template: Option<String>,
    pub brake: TraceLookSerde,
    pub throttle: TraceLookSerde,
    /// Optional eframe native-window options.
    #[serde(skip)]
    pub native_options: Option<eframe::NativeOptions>,
}

impl Default for PedalPlotConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            title: "Controller Configuration + Live Plot".to_string(),
            throttle_min: 0,
            command_template: Some(format!("THROTTLE_MIN {VALUE_PLACEHOLDER}")),
            brake: TraceLookSerde::from(&TraceLook::for_channel(Channel::Brake)),
            throttle: TraceLookSerde::from(&TraceLook::for_channel(Channel::Throttle)),
            native_options: None,
        }
    }
}

impl PedalPlotConfig {
    pub fn from_yaml(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&s)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, self.to_yaml()?).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `~/.pedalplot/config.yaml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .ok_or(ConfigError::NoHome)?;
        Ok(PathBuf::from(home).join(".pedalplot").join("config.yaml"))
    }

    /// Styling for one channel.
    pub fn look(&self, channel: Channel) -> TraceLook {
        match channel {
            Channel::Brake => TraceLook::from(&self.brake),
            Channel::Throttle => TraceLook::from(&self.throttle),
        }
    }
}

/// Substitute [`VALUE_PLACEHOLDER`] in `template` with `value`.
pub fn expand_template(template: &str, value: i32) -> String {
    template.replace(VALUE_PLACEHOLDER, &value.to_string())
}
