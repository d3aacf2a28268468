//! Unit tests for error.rs
//!
//! Tests Error display, conversions and the engine_err!/engine_bail! macros.

use super::*;

// ============================================================================
// DISPLAY TESTS
// ============================================================================

#[test]
fn test_error_display_backend() {
    let err = Error::BackendError("context lost".to_string());
    assert_eq!(err.to_string(), "Backend error: context lost");
}

#[test]
fn test_error_display_out_of_memory() {
    assert_eq!(Error::OutOfMemory.to_string(), "Out of GPU memory");
}

#[test]
fn test_error_display_invalid_object_state() {
    let err = Error::InvalidObjectState("buffer disposed".to_string());
    assert_eq!(err.to_string(), "Invalid object state: buffer disposed");
}

#[test]
fn test_error_display_driver_errors() {
    let err = Error::DriverErrors(vec![0x0500, 0x0502]);
    assert_eq!(err.to_string(), "Driver errors: 0x0500, 0x0502");
}

#[test]
fn test_error_display_capacity_exceeded() {
    let err = Error::CapacityExceeded("1200 > 1000".to_string());
    assert_eq!(err.to_string(), "Capacity exceeded: 1200 > 1000");
}

// ============================================================================
// CONVERSION TESTS
// ============================================================================

#[test]
fn test_error_from_io_eof_is_invalid_data() {
    let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short");
    assert!(matches!(Error::from(io), Error::InvalidData(_)));
}

#[test]
fn test_error_from_io_not_found() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
    match Error::from(io) {
        Error::Io(msg) => assert!(msg.contains("missing.png")),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_error_clone_and_eq() {
    let err = Error::UnsupportedFormat("PVRTC".to_string());
    assert_eq!(err.clone(), err);
}

// ============================================================================
// MACRO TESTS
// ============================================================================

fn bail_with_variant(count: usize) -> Result<()> {
    if count > 10 {
        crate::engine_bail!(CapacityExceeded, "lime::test", "{} > 10", count);
    }
    Ok(())
}

fn bail_default(fail: bool) -> Result<u32> {
    if fail {
        crate::engine_bail!("lime::test", "failure {}", 42);
    }
    Ok(7)
}

#[test]
fn test_engine_bail_with_variant() {
    assert!(bail_with_variant(3).is_ok());
    assert_eq!(
        bail_with_variant(11),
        Err(Error::CapacityExceeded("11 > 10".to_string()))
    );
}

#[test]
fn test_engine_bail_defaults_to_backend_error() {
    assert_eq!(bail_default(false), Ok(7));
    assert_eq!(bail_default(true), Err(Error::BackendError("failure 42".to_string())));
}

#[test]
fn test_engine_err_builds_variant() {
    let err = crate::engine_err!(InvalidData, "lime::test", "bad magic 0x{:08X}", 0xDEADBEEFu32);
    assert_eq!(err, Error::InvalidData("bad magic 0xDEADBEEF".to_string()));
}
