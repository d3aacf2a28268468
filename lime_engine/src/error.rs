//! Error types for the Lime render core
//!
//! This module defines the error type shared by the batching, buffer,
//! texture and backend layers, plus the `engine_err!` / `engine_bail!`
//! macros that log an error before handing it back to the caller.

use std::fmt;

/// Result type for Lime engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lime engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (OpenGL driver, context creation, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, etc.)
    InvalidResource(String),

    /// Initialization failed (renderer, backend, subsystems)
    InitializationFailed(String),

    /// Operation on an object that was already disposed
    InvalidObjectState(String),

    /// Image or texture format the current context cannot consume
    UnsupportedFormat(String),

    /// Malformed container header or truncated payload
    InvalidData(String),

    /// Error codes drained from the driver after a frame (debug builds)
    DriverErrors(Vec<u32>),

    /// Shader compilation or program link failure, with the info log
    ShaderCompilation(String),

    /// Request larger than a pooled buffer can ever hold
    CapacityExceeded(String),

    /// I/O failure while reading an image stream or asset bundle
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidObjectState(msg) => write!(f, "Invalid object state: {}", msg),
            Error::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            Error::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            Error::DriverErrors(codes) => {
                let codes: Vec<String> = codes.iter().map(|c| format!("0x{:04X}", c)).collect();
                write!(f, "Driver errors: {}", codes.join(", "))
            }
            Error::ShaderCompilation(msg) => write!(f, "Shader compilation failed: {}", msg),
            Error::CapacityExceeded(msg) => write!(f, "Capacity exceeded: {}", msg),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => {
                Error::InvalidData(format!("unexpected end of stream ({})", err))
            }
            _ => Error::Io(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => Error::UnsupportedFormat(e.to_string()),
            image::ImageError::IoError(e) => Error::from(e),
            other => Error::InvalidData(other.to_string()),
        }
    }
}

// ===== ERROR MACROS =====

/// Log an ERROR entry and build the matching `Error`
///
/// Without a variant the error is a `BackendError`.
///
/// # Example
///
/// ```no_run
/// # use lime_engine::engine_err;
/// # let id = 0;
/// let err = engine_err!("lime::Buffer", "Buffer {} is gone", id);
/// let err = engine_err!(InvalidObjectState, "lime::Buffer", "Buffer {} was disposed", id);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($variant:ident, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::lime::Error::$variant(message)
    }};
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::lime::Error::BackendError(message)
    }};
}

/// Log an ERROR entry and return early with the matching `Error`
///
/// # Example
///
/// ```no_run
/// # use lime_engine::engine_bail;
/// # fn f() -> lime_engine::lime::Result<()> {
/// # let count = 0;
/// engine_bail!(CapacityExceeded, "lime::RenderList", "{} vertices requested", count);
/// # }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($($arg:tt)*) => {
        return Err($crate::engine_err!($($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
