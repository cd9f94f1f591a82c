//! Configuration validator for memory-scan
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, DetectorConfig, LoggingConfig, ScannerConfig, TasksConfig};
use crate::core::types::MemoryAlignment;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_scanner(&config.scanner)?;
        Self::validate_tasks(&config.tasks)?;
        Self::validate_detector(&config.detector)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates scanner configuration
    fn validate_scanner(scanner: &ScannerConfig) -> Result<(), ConfigError> {
        if scanner.max_threads == 0 {
            return Err(ConfigError::Invalid(
                "Scanner threads must be at least 1".to_string(),
            ));
        }

        if scanner.max_threads > 128 {
            return Err(ConfigError::Invalid(
                "Scanner threads cannot exceed 128".to_string(),
            ));
        }

        if MemoryAlignment::try_from(scanner.default_alignment).is_err() {
            return Err(ConfigError::Invalid(format!(
                "Default alignment must be 1, 2, 4 or 8, got {}",
                scanner.default_alignment
            )));
        }

        Ok(())
    }

    /// Validates task configuration
    fn validate_tasks(tasks: &TasksConfig) -> Result<(), ConfigError> {
        if tasks.progress_interval == 0 {
            return Err(ConfigError::Invalid(
                "Progress interval must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates emulator detector configuration
    fn validate_detector(detector: &DetectorConfig) -> Result<(), ConfigError> {
        if detector.dolphin_title_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Dolphin title prefix cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
