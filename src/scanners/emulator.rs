//! Emulator detection heuristics

use crate::config::DetectorConfig;
use crate::core::types::{EmulatorType, MemoryResult, ProcessInfo};
use crate::tasks::{TaskOutcome, TaskScheduler, TrackableTask};
use tracing::{error, info, warn};

/// Decides whether a target process is an emulator
#[derive(Debug, Clone)]
pub struct EmulatorDetector {
    scheduler: TaskScheduler,
    dolphin_title_prefix: String,
}

impl EmulatorDetector {
    pub const NAME: &'static str = "Emulator Detector";

    pub fn new(scheduler: TaskScheduler, config: &DetectorConfig) -> Self {
        EmulatorDetector {
            scheduler,
            dolphin_title_prefix: config.dolphin_title_prefix.clone(),
        }
    }

    /// Classifies a main window title
    pub fn classify(&self, window_title: Option<&str>) -> EmulatorType {
        match window_title {
            Some(title) if title.starts_with(&self.dolphin_title_prefix) => EmulatorType::Dolphin,
            _ => EmulatorType::None,
        }
    }

    /// Start detection for `process`.
    ///
    /// Without an identifier the task is keyed by the process id, so at most one
    /// detection per process runs at a time.
    pub fn detect(
        &self,
        process: &ProcessInfo,
        identifier: Option<String>,
    ) -> MemoryResult<TrackableTask<EmulatorType>> {
        let identifier = identifier.unwrap_or_else(|| format!("emulator-detector-{}", process.pid));
        let title = process.main_window_title.clone();
        let detector = self.clone();

        let task = self.scheduler.create(Self::NAME, identifier, move |context| {
            let detected = detector.classify(title.as_deref());
            context.check_canceled()?;

            if detected.is_emulator() {
                info!(emulator = ?detected, "emulator detected, scans are limited to emulated console memory");
            }
            Ok(detected)
        });

        if task.is_err() {
            warn!("unable to start emulator detection, this task is already queued");
        }
        task
    }

    /// Maps a finished detection to an emulator type.
    ///
    /// Cancellation and failure become [`EmulatorType::Unknown`], never an error.
    pub fn resolve(outcome: TaskOutcome<EmulatorType>) -> EmulatorType {
        match outcome {
            TaskOutcome::Completed(detected) => detected,
            TaskOutcome::Canceled => {
                warn!("emulator detection canceled, emulator type unknown");
                EmulatorType::Unknown
            }
            TaskOutcome::Failed(reason) => {
                error!(%reason, "emulator detection failed, emulator type unknown");
                EmulatorType::Unknown
            }
        }
    }

    /// Runs detection and waits for its resolved result
    pub async fn detect_and_wait(&self, process: &ProcessInfo) -> MemoryResult<EmulatorType> {
        let task = self.detect(process, None)?;
        Ok(Self::resolve(task.result().await))
    }
}
