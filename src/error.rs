//! Error types for guardrails.
//!
//! Uses thiserror for derive macros. Only configuration, registration and
//! audit persistence can fail; diff parsing and rule matching degrade
//! gracefully instead of returning errors.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for guardrails operations.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Invalid arguments or unreadable input.
    #[error("{0}")]
    UserError(String),

    /// Configuration could not be loaded or failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A rule, plugin or compliance pack could not be registered.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// An audit record could not be persisted.
    #[error("audit write failed: {0}")]
    AuditWrite(String),

    /// Serialization of an audit record or export failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl GuardError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GuardError::UserError(_) => exit_codes::USER_ERROR,
            GuardError::Config(_) => exit_codes::USER_ERROR,
            GuardError::InvalidRule(_) => exit_codes::USER_ERROR,
            GuardError::AuditWrite(_) => exit_codes::AUDIT_FAILURE,
            GuardError::Serialization(_) => exit_codes::AUDIT_FAILURE,
        }
    }
}

/// Result type alias for guardrails operations.
pub type Result<T> = std::result::Result<T, GuardError>;
