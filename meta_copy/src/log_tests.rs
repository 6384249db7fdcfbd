//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the global logger.

use crate::log::{self, DefaultLogger, LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Logger capturing entries for inspection
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    log::set_logger(CaptureLogger { entries: Arc::clone(&entries) });
    entries
}

/// Entries emitted by this test module (other tests may log concurrently)
fn captured_from_test(entries: &Arc<Mutex<Vec<LogEntry>>>) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.source == "meta_copy::test")
        .cloned()
        .collect()
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: "meta_copy::test".to_string(),
            message: "message".to_string(),
            file: None,
            line: None,
        });
    }
}

#[test]
fn test_default_logger_error_with_file_line() {
    let logger = DefaultLogger;
    logger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "meta_copy::factory".to_string(),
        message: "failed to create render pass".to_string(),
        file: Some("factory.rs"),
        line: Some(42),
    });
}

// ============================================================================
// GLOBAL LOGGER TESTS
// ============================================================================

#[test]
#[serial]
fn test_macros_route_to_installed_logger() {
    let entries = install_capture();

    crate::meta_trace!("meta_copy::test", "trace {}", 1);
    crate::meta_debug!("meta_copy::test", "debug {}", 2);
    crate::meta_info!("meta_copy::test", "info {}", 3);
    crate::meta_warn!("meta_copy::test", "warn {}", 4);

    let captured = captured_from_test(&entries);
    log::reset_logger();

    assert_eq!(captured.len(), 4);
    assert_eq!(captured[0].severity, LogSeverity::Trace);
    assert_eq!(captured[1].message, "debug 2");
    assert_eq!(captured[2].severity, LogSeverity::Info);
    assert_eq!(captured[3].source, "meta_copy::test");
    assert!(captured.iter().all(|e| e.file.is_none() && e.line.is_none()));
}

#[test]
#[serial]
fn test_error_macro_carries_file_and_line() {
    let entries = install_capture();

    crate::meta_error!("meta_copy::test", "boom: {}", "render pass");

    let captured = captured_from_test(&entries);
    log::reset_logger();

    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert_eq!(captured[0].message, "boom: render pass");
    assert!(captured[0].file.unwrap().ends_with("log_tests.rs"));
    assert!(captured[0].line.is_some());
}

#[test]
#[serial]
fn test_reset_logger_detaches_capture() {
    let entries = install_capture();
    log::reset_logger();

    crate::meta_info!("meta_copy::test", "not captured");

    assert!(captured_from_test(&entries).is_empty());
}

#[test]
#[serial]
fn test_logger_replacement_survives_poisoned_lock() {
    let poisoner = std::thread::spawn(|| {
        let _guard = log::logger_lock().write().unwrap();
        panic!("logger swap interrupted");
    });
    assert!(poisoner.join().is_err());
    assert!(log::logger_lock().is_poisoned());

    let entries = install_capture();
    crate::meta_info!("meta_copy::test", "after poison");
    let captured = captured_from_test(&entries);

    log::reset_logger();
    log::logger_lock().clear_poison();

    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].message, "after poison");
}
