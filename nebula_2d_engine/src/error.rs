//! Error types for the Nebula2D engine
//!
//! All errors surface synchronously to the caller of the triggering
//! operation. Nothing is retried internally: GPU resource errors are treated
//! as programmer or configuration errors, not transient faults.

use std::fmt;

/// Result type for Nebula2D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nebula2D engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid arguments caught before any device call (bad component count,
    /// unknown pixel kind, bad swizzle string, compare function on a
    /// non-depth texture, ...). Always caller-recoverable.
    Configuration(String),

    /// Byte-length mismatch between supplied data and the format-computed
    /// expectation. Raised before any device mutation; never a partial write.
    Validation(String),

    /// The device failed to allocate a handle, or an operation was attempted
    /// on a resource whose handle has already been invalidated. Fatal for
    /// that resource.
    Resource(String),

    /// Operation valid in general but not on the active API variant
    /// (e.g. texture readback or bindless handles on the restricted variant).
    Unsupported(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::Validation(msg) => write!(f, "Validation error: {}", msg),
            Error::Resource(msg) => write!(f, "Resource error: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
