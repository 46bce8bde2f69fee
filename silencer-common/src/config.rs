//! Service configuration loading
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! Command-line and environment values are merged by the binary (clap reads
//! both) and handed to [`ServiceConfig::apply_overrides`]. This module owns
//! TOML discovery, parsing and validation.

use crate::params::ProcessingParameters;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default upload limit (50 MiB) for a single file and for the whole request
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Silence removal parameters applied to every file
    #[serde(default)]
    pub processing: ProcessingParameters,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory for transient working files (default: OS temp dir)
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Upload size limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted single file in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_file_size_bytes: usize,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_request_size_bytes: usize,
}

/// Batch worker pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Upper bound on files processed concurrently within one request
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Deadline for processing one file, in seconds
    #[serde(default = "default_file_timeout_secs")]
    pub file_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr only if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(8)
}

fn default_file_timeout_secs() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_upload_bytes(),
            max_request_size_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            file_timeout_secs: default_file_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    pub max_workers: Option<usize>,
}

impl ServiceConfig {
    /// Load configuration
    ///
    /// An explicit `path` must exist and parse. Without one, the platform
    /// default location is tried; a missing default file logs a warning and
    /// falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                Some(path) => {
                    warn!(
                        "No config file at {}, using built-in defaults",
                        path.display()
                    );
                    Ok(Self::default())
                }
                None => {
                    warn!("Could not determine config directory, using built-in defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Apply command-line/environment values on top of the file values
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(file) = overrides.log_file {
            self.logging.file = Some(file);
        }
        if let Some(dir) = overrides.work_dir {
            self.work_dir = Some(dir);
        }
        if let Some(workers) = overrides.max_workers {
            self.batch.max_workers = workers;
        }
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        self.processing
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;

        if self.limits.max_file_size_bytes == 0 {
            return Err(Error::Config("limits.max_file_size_bytes must be > 0".to_string()));
        }
        if self.limits.max_request_size_bytes == 0 {
            return Err(Error::Config(
                "limits.max_request_size_bytes must be > 0".to_string(),
            ));
        }
        if self.batch.max_workers == 0 {
            return Err(Error::Config("batch.max_workers must be > 0".to_string()));
        }
        if self.batch.file_timeout_secs == 0 {
            return Err(Error::Config("batch.file_timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }

    /// Directory for transient working files
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Platform config location: `<config_dir>/silencer/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("silencer").join("config.toml"))
}
