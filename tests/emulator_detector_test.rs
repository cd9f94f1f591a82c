//! Emulator detection through the task scheduler

use memory_scan::config::{Config, DetectorConfig};
use memory_scan::tasks::TaskContext;
use memory_scan::{
    EmulatorDetector, EmulatorType, MemoryError, MemoryResult, ProcessInfo, TaskOutcome,
    TaskScheduler,
};
use std::thread;
use std::time::Duration;

fn hold_until_canceled(context: &TaskContext) -> MemoryResult<()> {
    loop {
        context.check_canceled()?;
        thread::sleep(Duration::from_millis(1));
    }
}

#[tokio::test]
async fn test_detects_dolphin_by_title() {
    let scheduler = TaskScheduler::current().unwrap();
    let detector = EmulatorDetector::new(scheduler, &Config::default().detector);
    let process = ProcessInfo::new(4242, "Dolphin.exe".to_string())
        .with_window_title("Dolphin 5.0-21088 | JIT64 DC | Direct3D 11");

    let task = detector.detect(&process, None).unwrap();
    assert_eq!(task.identifier(), "emulator-detector-4242");
    assert_eq!(task.name(), EmulatorDetector::NAME);
    assert_eq!(
        EmulatorDetector::resolve(task.result().await),
        EmulatorType::Dolphin
    );
}

#[tokio::test]
async fn test_non_emulator_is_a_genuine_negative() {
    let scheduler = TaskScheduler::current().unwrap();
    let detector = EmulatorDetector::new(scheduler, &Config::default().detector);
    let process = ProcessInfo::new(7, "notepad.exe".to_string()).with_window_title("Untitled - Notepad");

    let detected = detector.detect_and_wait(&process).await.unwrap();
    assert_eq!(detected, EmulatorType::None);
    assert_ne!(detected, EmulatorType::Unknown);
}

#[tokio::test]
async fn test_custom_title_prefix() {
    let scheduler = TaskScheduler::current().unwrap();
    let config = DetectorConfig {
        dolphin_title_prefix: "Dolphin-MMJR".to_string(),
    };
    let detector = EmulatorDetector::new(scheduler, &config);

    assert_eq!(detector.classify(Some("Dolphin-MMJR 10.0")), EmulatorType::Dolphin);
    assert_eq!(detector.classify(Some("Dolphin 5.0")), EmulatorType::None);
}

#[tokio::test]
async fn test_detection_conflicts_with_running_task() {
    let scheduler = TaskScheduler::current().unwrap();
    let blocker = scheduler
        .create("blocker", "emulator-detector-99", hold_until_canceled)
        .unwrap();
    let detector = EmulatorDetector::new(scheduler.clone(), &Config::default().detector);
    let process = ProcessInfo::new(99, "Dolphin.exe".to_string()).with_window_title("Dolphin");

    let result = detector.detect(&process, None);
    assert!(matches!(result, Err(MemoryError::TaskConflict { .. })));

    blocker.cancel();
    assert!(blocker.result().await.is_canceled());
    assert_eq!(
        detector.detect_and_wait(&process).await.unwrap(),
        EmulatorType::Dolphin
    );
}

#[test]
fn test_canceled_and_failed_detection_are_unknown() {
    assert_eq!(EmulatorDetector::resolve(TaskOutcome::Canceled), EmulatorType::Unknown);
    assert_eq!(
        EmulatorDetector::resolve(TaskOutcome::Failed("window closed".to_string())),
        EmulatorType::Unknown
    );
}
