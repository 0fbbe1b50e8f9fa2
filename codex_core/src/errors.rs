//! # Error Types
//!
//! Structured error types for codex_core. Every variant carries enough
//! context to be reported on the command line or serialized as JSON for
//! tooling that drives the catalog programmatically.
//!
//! ## Example
//!
//! ```rust
//! use codex_core::errors::{CodexError, CodexResult};
//!
//! fn validate_id(id: &str) -> CodexResult<()> {
//!     if id.trim().is_empty() {
//!         return Err(CodexError::invalid_input("id", id, "Id must not be empty"));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for codex_core operations
pub type CodexResult<T> = Result<T, CodexError>;

/// Structured error type for catalog, archive and ledger operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CodexError {
    /// An input value is invalid (empty id, malformed payload, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// An equation with this id is already registered
    #[error("Duplicate equation id: {id}")]
    DuplicateId { id: String },

    /// No equation with this id exists
    #[error("Equation not found: {id}")]
    EquationNotFound { id: String },

    /// No member with this id exists
    #[error("Member not found: {id}")]
    MemberNotFound { id: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
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

    /// Ledger replay found a block that does not link or hash correctly
    #[error("Ledger chain broken at block {index}: {reason}")]
    ChainBroken { index: u64, reason: String },
}

impl CodexError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CodexError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a DuplicateId error
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        CodexError::DuplicateId { id: id.into() }
    }

    /// Create an EquationNotFound error
    pub fn equation_not_found(id: impl Into<String>) -> Self {
        CodexError::EquationNotFound { id: id.into() }
    }

    /// Create a MemberNotFound error
    pub fn member_not_found(id: impl Into<String>) -> Self {
        CodexError::MemberNotFound { id: id.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CodexError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CodexError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError from anything printable
    pub fn serialization(reason: impl ToString) -> Self {
        CodexError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Create a ChainBroken error
    pub fn chain_broken(index: u64, reason: impl Into<String>) -> Self {
        CodexError::ChainBroken {
            index,
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CodexError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CodexError::InvalidInput { .. } => "INVALID_INPUT",
            CodexError::DuplicateId { .. } => "DUPLICATE_ID",
            CodexError::EquationNotFound { .. } => "EQUATION_NOT_FOUND",
            CodexError::MemberNotFound { .. } => "MEMBER_NOT_FOUND",
            CodexError::FileError { .. } => "FILE_ERROR",
            CodexError::FileLocked { .. } => "FILE_LOCKED",
            CodexError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CodexError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CodexError::ChainBroken { .. } => "CHAIN_BROKEN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CodexError::chain_broken(3, "prev_hash does not match block 2");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"ChainBroken\""));
        let roundtrip: CodexError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CodexError::duplicate_id("EQ0001").error_code(), "DUPLICATE_ID");
        assert_eq!(CodexError::equation_not_found("EQ0001").error_code(), "EQUATION_NOT_FOUND");
        assert_eq!(CodexError::serialization("bad json").error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_only_lock_errors_are_recoverable() {
        assert!(CodexError::file_locked("a.cdx", "someone", "now").is_recoverable());
        assert!(!CodexError::duplicate_id("EQ0001").is_recoverable());
    }

    #[test]
    fn test_display_messages() {
        let err = CodexError::duplicate_id("EQ177-A");
        assert_eq!(err.to_string(), "Duplicate equation id: EQ177-A");
    }
}
