//! Core error types for authform.
//!
//! [`AuthFormError`] covers schema definition mistakes, controller guard
//! rejections, faults raised by the external identity collaborator, and
//! configuration problems. Per-field validation messages are not errors in
//! this sense; they travel as a [`FieldErrors`] map.

use std::collections::HashMap;

use thiserror::Error;

/// Per-field error messages, keyed by field name.
///
/// Each field carries at most one message: the first check that failed for it.
pub type FieldErrors = HashMap<String, String>;

/// The primary error type for authform.
#[derive(Error, Debug)]
pub enum AuthFormError {
    // ── Schema definition ────────────────────────────────────────────

    /// Two fields in one schema share a name.
    #[error("Duplicate field: {0}")]
    DuplicateField(String),

    /// A field name that the schema does not define.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A cross-field rule that cannot be evaluated (no dependents, bad target).
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    // ── Controller ───────────────────────────────────────────────────

    /// A mutation or submit arrived while a submission is outstanding.
    #[error("A submission is already in flight")]
    SubmissionInFlight,

    // ── External collaborator ────────────────────────────────────────

    /// The identity collaborator failed in a way it did not model as a
    /// submission failure.
    #[error("Submission error: {0}")]
    Submission(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthFormError {
    /// Returns `true` if the user can recover by editing input or submitting again.
    ///
    /// - `SubmissionInFlight`, `Submission` -> recoverable
    /// - schema, configuration, and IO errors -> not recoverable
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::SubmissionInFlight | Self::Submission(_) => true,
            Self::DuplicateField(_)
            | Self::UnknownField(_)
            | Self::InvalidRule(_)
            | Self::Configuration(_)
            | Self::Io(_) => false,
        }
    }
}

/// A convenience type alias for `Result<T, AuthFormError>`.
pub type AuthFormResult<T> = Result<T, AuthFormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AuthFormError::UnknownField("nickname".into()).to_string(),
            "Unknown field: nickname"
        );
        assert_eq!(
            AuthFormError::SubmissionInFlight.to_string(),
            "A submission is already in flight"
        );
    }

    #[test]
    fn test_recoverability() {
        assert!(AuthFormError::SubmissionInFlight.is_recoverable());
        assert!(AuthFormError::Submission("timeout".into()).is_recoverable());
        assert!(!AuthFormError::DuplicateField("email".into()).is_recoverable());
        assert!(!AuthFormError::Configuration("bad".into()).is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: AuthFormError = io_err.into();
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("file missing"));
    }
}
