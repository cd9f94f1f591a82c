//! Default configuration values for memory-scan

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub scanner: ScannerDefaults,
    pub tasks: TasksDefaults,
    pub detector: DetectorDefaults,
    pub logging: LoggingDefaults,
}

/// Default scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerDefaults {
    pub parallel: bool,
    pub max_threads: usize,
    pub default_alignment: usize,
}

/// Default task configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksDefaults {
    pub progress_interval: usize,
}

/// Default emulator detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorDefaults {
    pub dolphin_title_prefix: String,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
    pub with_target: bool,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        scanner: ScannerDefaults {
            parallel: true,
            max_threads: num_cpus::get().min(8),
            default_alignment: 1,
        },
        tasks: TasksDefaults {
            progress_interval: 1,
        },
        detector: DetectorDefaults {
            dolphin_title_prefix: "Dolphin".to_string(),
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
            with_target: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_defaults() {
        let config = default_config();
        assert!(config.scanner.parallel);
        assert!(config.scanner.max_threads > 0);
        assert!(config.scanner.max_threads <= 8);
        assert_eq!(config.scanner.default_alignment, 1);
    }

    #[test]
    fn test_task_and_detector_defaults() {
        let config = default_config();
        assert_eq!(config.tasks.progress_interval, 1);
        assert_eq!(config.detector.dolphin_title_prefix, "Dolphin");
    }

    #[test]
    fn test_logging_defaults() {
        let config = default_config();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.with_target);
    }

    #[test]
    fn test_serialization() {
        let config = default_config();
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("dolphin_title_prefix"));
        assert!(serialized.contains("progress_interval"));

        let deserialized: ConfigDefaults = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.scanner.max_threads, config.scanner.max_threads);
        assert_eq!(deserialized.logging.level, config.logging.level);
    }
}
