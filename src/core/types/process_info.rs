//! Target process description and emulator classification

use super::ProcessId;
use serde::{Deserialize, Serialize};

/// What the engine knows about the process whose memory was captured
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: ProcessId,
    pub name: String,
    pub main_window_title: Option<String>,
}

impl ProcessInfo {
    /// Creates a new ProcessInfo with minimal information
    pub fn new(pid: ProcessId, name: String) -> Self {
        ProcessInfo {
            pid,
            name,
            main_window_title: None,
        }
    }

    /// Attaches the title of the process's main window
    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.main_window_title = Some(title.into());
        self
    }
}

/// Emulator hosting the target, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmulatorType {
    /// Detect on attach
    Auto,
    /// The target is not an emulator
    None,
    Dolphin,
    /// Detection was canceled or failed
    Unknown,
}

impl EmulatorType {
    /// True for a positive detection
    pub fn is_emulator(&self) -> bool {
        matches!(self, EmulatorType::Dolphin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_info_builder() {
        let process = ProcessInfo::new(42, "Dolphin.exe".to_string()).with_window_title("Dolphin 5.0");
        assert_eq!(process.pid, 42);
        assert_eq!(process.main_window_title.as_deref(), Some("Dolphin 5.0"));
        assert!(ProcessInfo::new(1, "a".to_string()).main_window_title.is_none());
    }

    #[test]
    fn test_emulator_type() {
        assert!(EmulatorType::Dolphin.is_emulator());
        assert!(!EmulatorType::None.is_emulator());
        assert!(!EmulatorType::Unknown.is_emulator());
        assert_eq!(serde_json::to_string(&EmulatorType::Dolphin).unwrap(), "\"dolphin\"");
    }
}
