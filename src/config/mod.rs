//! Configuration module for memory-scan
//!
//! Provides configuration loading, validation, and default settings
//! for the scanner, the task scheduler and the emulator detector.

mod defaults;
mod loader;
mod validator;

pub use defaults::{default_config, ConfigDefaults};
pub use loader::{load_config, ConfigLoader, DEFAULT_CONFIG_FILE};
pub use validator::{validate_config, ConfigValidator};

// Re-export the main configuration structure
pub use loader::{Config, DetectorConfig, LoggingConfig, ScannerConfig, TasksConfig};

// Configuration-related error type
pub use loader::ConfigError;

// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;
