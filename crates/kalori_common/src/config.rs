//! Kalori configuration
//!
//! Configuration lives in `<XDG config dir>/kalori/config.toml` unless
//! `$KALORI_CONFIG` (or the `--config` flag) points elsewhere. Every field has
//! a default, so an empty or missing file is a valid configuration. A
//! malformed file is an error; the binary warns and runs with defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment override for the config file location
pub const CONFIG_ENV: &str = "KALORI_CONFIG";
const CONFIG_DIR: &str = "kalori";
const CONFIG_FILE: &str = "config.toml";

/// Production analysis endpoint
pub const DEFAULT_ENDPOINT: &str = "https://mydiet-backend-production.up.railway.app/analyze-food";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("camera.source = \"file\" requires camera.photo")]
    MissingPhoto,

    #[error("No config directory available (set ${})", CONFIG_ENV)]
    NoConfigDir,
}

/// Where photos come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CameraSource {
    #[default]
    V4l2,
    File,
}

impl CameraSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraSource::V4l2 => "v4l2",
            CameraSource::File => "file",
        }
    }
}

/// Analysis service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Full URL of the analyze-food endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

/// Camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub source: CameraSource,

    /// V4L2 device node
    #[serde(default = "default_device")]
    pub device: PathBuf,

    /// Still image used by the file source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<PathBuf>,

    /// ffmpeg binary used to grab frames
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// Where captured photos are written (defaults to <tmp>/kalori)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_dir: Option<PathBuf>,
}

fn default_device() -> PathBuf {
    PathBuf::from("/dev/video0")
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

impl CameraConfig {
    pub fn effective_capture_dir(&self) -> PathBuf {
        self.capture_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(CONFIG_DIR))
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: CameraSource::default(),
            device: default_device(),
            photo: None,
            ffmpeg: default_ffmpeg(),
            capture_dir: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Complete Kalori configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KaloriConfig {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl KaloriConfig {
    /// Load config from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config as TOML, creating the parent directory
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = self.to_toml()?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Get the config file path ($KALORI_CONFIG, then the XDG config dir)
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
