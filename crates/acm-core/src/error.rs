//! # Error Types — Structured Error Hierarchy
//!
//! Errors shared across the workspace. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Validation errors carry the rejected input and the expected format.
//! - Registration errors name the conflicting key.
//! - The compliance evaluator itself has no error type: it is total over
//!   every finite machine list.

use thiserror::Error;

/// Top-level error type for the Arcade Compliance Manager.
#[derive(Error, Debug)]
pub enum AcmError {
    /// A domain primitive failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A machine with the same serial number is already registered.
    #[error("Machine with serial number {0} already exists")]
    DuplicateSerial(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Serial number is empty after trimming.
    #[error("serial number must not be empty")]
    EmptySerialNumber,

    /// Serial number exceeds the maximum length.
    #[error("serial number \"{value}\" exceeds {max} characters")]
    SerialNumberTooLong {
        /// The rejected serial number.
        value: String,
        /// Maximum accepted length.
        max: usize,
    },

    /// Category tag is not one of the known machine categories.
    #[error("unknown machine category: \"{0}\" (expected B3, C, D or OTHER)")]
    UnknownCategory(String),

    /// A required text field is empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}
