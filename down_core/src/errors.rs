//! # Error Types
//!
//! Structured error types for down_core. These errors separate real faults
//! (bad base size, broken file, incompatible schema) from the lenient cell
//! parsing in [`crate::parse`], which never errors.
//!
//! ## Example
//!
//! ```rust
//! use down_core::errors::{AllocError, AllocResult};
//!
//! fn validate_weight(grams: f64) -> AllocResult<()> {
//!     if grams < 0.0 {
//!         return Err(AllocError::invalid_input(
//!             "down_weight_g",
//!             grams.to_string(),
//!             "Weight must not be negative",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for down_core operations
pub type AllocResult<T> = Result<T, AllocError>;

/// Structured error type for allocation and sheet operations.
///
/// Each variant provides specific context about what went wrong, so front
/// ends can show a useful message instead of a generic failure.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum AllocError {
    /// An input value is invalid (out of range, wrong shape, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The requested size is not among the grid's size columns
    #[error("Size not found: {size_name}")]
    SizeNotFound { size_name: String },

    /// A size name collides with an existing column
    #[error("Duplicate size name: {size_name}")]
    DuplicateSize { size_name: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AllocError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        AllocError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        AllocError::MissingField {
            field: field.into(),
        }
    }

    /// Create a SizeNotFound error
    pub fn size_not_found(size_name: impl Into<String>) -> Self {
        AllocError::SizeNotFound {
            size_name: size_name.into(),
        }
    }

    /// Create a DuplicateSize error
    pub fn duplicate_size(size_name: impl Into<String>) -> Self {
        AllocError::DuplicateSize {
            size_name: size_name.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        AllocError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error leaves the edited data intact (the user can
    /// simply retry with a different value)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AllocError::DuplicateSize { .. } | AllocError::SizeNotFound { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AllocError::InvalidInput { .. } => "INVALID_INPUT",
            AllocError::MissingField { .. } => "MISSING_FIELD",
            AllocError::SizeNotFound { .. } => "SIZE_NOT_FOUND",
            AllocError::DuplicateSize { .. } => "DUPLICATE_SIZE",
            AllocError::FileError { .. } => "FILE_ERROR",
            AllocError::SerializationError { .. } => "SERIALIZATION_ERROR",
            AllocError::VersionMismatch { .. } => "VERSION_MISMATCH",
            AllocError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = AllocError::invalid_input("down_weight_g", "-120", "Weight must not be negative");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: AllocError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AllocError::missing_field("base_size").error_code(), "MISSING_FIELD");
        assert_eq!(AllocError::size_not_found("XXL").error_code(), "SIZE_NOT_FOUND");
        assert_eq!(AllocError::duplicate_size("M").error_code(), "DUPLICATE_SIZE");
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(AllocError::duplicate_size("M").is_recoverable());
        assert!(!AllocError::missing_field("base_size").is_recoverable());
    }
}
