//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry and the DefaultLogger formatting.

use super::*;
use std::time::{Duration, SystemTime};

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
fn test_log_severity_labels_are_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Warn.label(), "WARN ");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

fn entry(file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
        source: "lime::RenderList".to_string(),
        message: "Batch overflow".to_string(),
        file,
        line,
    }
}

#[test]
fn test_log_entry_clone() {
    let original = entry(Some("render_list.rs"), Some(12));
    let cloned = original.clone();
    assert_eq!(cloned.source, original.source);
    assert_eq!(cloned.message, original.message);
    assert_eq!(cloned.file, Some("render_list.rs"));
    assert_eq!(cloned.line, Some(12));
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_format_plain_without_location() {
    let text = DefaultLogger::format_plain(&entry(None, None));
    assert!(text.ends_with("[ERROR] [lime::RenderList] Batch overflow"));
}

#[test]
fn test_format_plain_with_location() {
    let text = DefaultLogger::format_plain(&entry(Some("render_list.rs"), Some(42)));
    assert!(text.ends_with("Batch overflow (render_list.rs:42)"));
}

#[test]
fn test_default_logger_does_not_panic() {
    DefaultLogger.log(&entry(None, None));
    DefaultLogger.log(&entry(Some("a.rs"), Some(1)));
}
