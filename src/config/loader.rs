//! Configuration loader for memory-scan
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "memory-scan.toml";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_scanner")]
    pub scanner: ScannerConfig,

    #[serde(default = "default_tasks")]
    pub tasks: TasksConfig,

    #[serde(default = "default_detector")]
    pub detector: DetectorConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
    #[serde(default = "default_alignment")]
    pub default_alignment: usize,
}

/// Task configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

/// Emulator detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default = "default_dolphin_title_prefix")]
    pub dolphin_title_prefix: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if file doesn't exist.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from the default location
pub fn load_config() -> Result<Config, ConfigError> {
    ConfigLoader::new(DEFAULT_CONFIG_FILE).load_or_default()
}

// Default functions for serde
fn default_scanner() -> ScannerConfig {
    let defaults = default_config();
    ScannerConfig {
        parallel: defaults.scanner.parallel,
        max_threads: defaults.scanner.max_threads,
        default_alignment: defaults.scanner.default_alignment,
    }
}

fn default_tasks() -> TasksConfig {
    TasksConfig {
        progress_interval: default_config().tasks.progress_interval,
    }
}

fn default_detector() -> DetectorConfig {
    DetectorConfig {
        dolphin_title_prefix: default_config().detector.dolphin_title_prefix,
    }
}

fn default_logging() -> LoggingConfig {
    let defaults = default_config();
    LoggingConfig {
        level: defaults.logging.level,
        with_target: defaults.logging.with_target,
    }
}

// Individual field defaults
fn default_parallel() -> bool {
    default_config().scanner.parallel
}

fn default_max_threads() -> usize {
    default_config().scanner.max_threads
}

fn default_alignment() -> usize {
    default_config().scanner.default_alignment
}

fn default_progress_interval() -> usize {
    default_config().tasks.progress_interval
}

fn default_dolphin_title_prefix() -> String {
    default_config().detector.dolphin_title_prefix
}

fn default_log_level() -> String {
    default_config().logging.level
}

fn default_with_target() -> bool {
    default_config().logging.with_target
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scanner: default_scanner(),
            tasks: default_tasks(),
            detector: default_detector(),
            logging: default_logging(),
        }
    }
}
