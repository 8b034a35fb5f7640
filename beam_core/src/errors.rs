//! # Error Types
//!
//! Structured error types for beam_core. Every validation failure carries the
//! offending value so callers can surface it to the user directly; nothing is
//! silently downgraded to a default (a zero-rigidity segment fails, it never
//! produces infinite curvature).
//!
//! ## Example
//!
//! ```rust
//! use beam_core::errors::{BeamError, BeamResult};
//!
//! fn validate_length(length_m: f64) -> BeamResult<()> {
//!     if length_m <= 0.0 {
//!         return Err(BeamError::degenerate_beam(length_m));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for beam_core operations
pub type BeamResult<T> = Result<T, BeamError>;

/// Structured error type for solver and library operations.
///
/// All solver-side variants are deterministic input-validation failures,
/// detected eagerly at construction or at the start of a solve. None are
/// retried; only [`BeamError::FileLocked`] is worth retrying at all.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum BeamError {
    /// Segments are malformed: non-contiguous, non-increasing, or with
    /// non-positive stiffness properties
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// A load position or interval is malformed or outside the beam
    #[error("Invalid load: {reason}")]
    InvalidLoad { reason: String },

    /// A query position lies outside `[0, total_length]`
    #[error("Position {position} m is outside the beam (0 to {total_length} m)")]
    OutOfRange { position: f64, total_length: f64 },

    /// The beam has non-positive total length
    #[error("Degenerate beam: total length {total_length} m must be positive")]
    DegenerateBeam { total_length: f64 },

    /// A computed rigidity or curvature is zero or non-finite
    #[error("Numeric overflow at x = {position} m (zero or non-finite rigidity)")]
    NumericOverflow { position: f64 },

    /// A library entry with the same name already exists
    #[error("Duplicate {kind} name: '{name}' already exists in the library")]
    DuplicateName { kind: String, name: String },

    /// Library file I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Library file is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Library schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl BeamError {
    /// Create an InvalidGeometry error
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        BeamError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Create an InvalidLoad error
    pub fn invalid_load(reason: impl Into<String>) -> Self {
        BeamError::InvalidLoad {
            reason: reason.into(),
        }
    }

    /// Create an OutOfRange error
    pub fn out_of_range(position: f64, total_length: f64) -> Self {
        BeamError::OutOfRange {
            position,
            total_length,
        }
    }

    /// Create a DegenerateBeam error
    pub fn degenerate_beam(total_length: f64) -> Self {
        BeamError::DegenerateBeam { total_length }
    }

    /// Create a NumericOverflow error
    pub fn numeric_overflow(position: f64) -> Self {
        BeamError::NumericOverflow { position }
    }

    /// Create a DuplicateName error
    pub fn duplicate_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        BeamError::DuplicateName {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        BeamError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        BeamError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BeamError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            BeamError::InvalidGeometry { .. } => "INVALID_GEOMETRY",
            BeamError::InvalidLoad { .. } => "INVALID_LOAD",
            BeamError::OutOfRange { .. } => "OUT_OF_RANGE",
            BeamError::DegenerateBeam { .. } => "DEGENERATE_BEAM",
            BeamError::NumericOverflow { .. } => "NUMERIC_OVERFLOW",
            BeamError::DuplicateName { .. } => "DUPLICATE_NAME",
            BeamError::FileError { .. } => "FILE_ERROR",
            BeamError::FileLocked { .. } => "FILE_LOCKED",
            BeamError::SerializationError { .. } => "SERIALIZATION_ERROR",
            BeamError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = BeamError::invalid_geometry("segment [2, 1] has non-positive length");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: BeamError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            BeamError::out_of_range(-1.0, 10.0).error_code(),
            "OUT_OF_RANGE"
        );
        assert_eq!(
            BeamError::degenerate_beam(0.0).error_code(),
            "DEGENERATE_BEAM"
        );
    }

    #[test]
    fn test_only_locks_are_recoverable() {
        assert!(BeamError::file_locked("lib.json", "someone", "today").is_recoverable());
        assert!(!BeamError::invalid_load("position -1 m").is_recoverable());
    }
}
