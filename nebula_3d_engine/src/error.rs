//! Error types for the Nebula3D frame core
//!
//! Only backend failures, frame-lifecycle misuse and post-process failures
//! travel through `Result`. Atlas exhaustion, invalid drawables and program
//! variant misses are handled by skipping the affected unit of work.

use std::fmt;

/// Result type for Nebula3D operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nebula3D errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error reported by a command list or device
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (mesh, material, program variant, etc.)
    InvalidResource(String),

    /// Initialization failed (device probe, atlas creation)
    InitializationFailed(String),

    /// Frame lifecycle misuse (render without begin_frame, nested frames)
    InvalidFrameState(String),

    /// A post-process effect failed; wraps the effect name for context
    PostProcessFailed {
        effect: String,
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidFrameState(msg) => write!(f, "Invalid frame state: {}", msg),
            Error::PostProcessFailed { effect, message } => {
                write!(f, "Post-process effect '{}' failed: {}", effect, message)
            }
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error and build an `Error::BackendError` from it
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("nebula3d::ShadowAtlas", "tile {} out of range", id);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::nebula3d::Error::BackendError(message)
    }};
}

/// Log an error and return early with `Err(Error::BackendError)`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
