//! Consumers of the task scheduler: background scans and emulator detection

pub mod emulator;
pub mod manual;

pub use emulator::EmulatorDetector;
pub use manual::{ManualScanner, ScanResults};
