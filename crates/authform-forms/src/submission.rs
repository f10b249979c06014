//! Submission of validated input to an external identity collaborator.
//!
//! The controller only knows the [`Submitter`] contract. Whatever the
//! collaborator does (HTTP, RPC, a fixed delay), [`SubmissionHandler::run`]
//! folds its result into a [`HandledOutcome`]:
//!
//! - `Ok(Success)` -> succeeded
//! - `Ok(Failure { .. })` -> failed with the collaborator's reason, verbatim
//! - `Err(_)` or a panic -> logged, failed with [`GENERIC_FAILURE`]

use std::sync::Arc;

use async_trait::async_trait;

use authform_core::AuthFormResult;

use crate::validation::CleanedData;

/// Message shown when the collaborator fails in a way it did not model.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// The modeled result of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The collaborator accepted the submission.
    Success,
    /// The collaborator rejected the submission.
    Failure {
        /// Message shown to the user verbatim.
        reason: String,
        /// The field the rejection is attributable to, if any.
        field: Option<String>,
    },
}

impl SubmissionOutcome {
    /// A form-level rejection.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
            field: None,
        }
    }

    /// A rejection attributable to one field.
    pub fn field_failure(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
            field: Some(field.into()),
        }
    }
}

/// The external identity collaborator.
///
/// `Ok` carries a modeled outcome. `Err` is reserved for faults the
/// collaborator did not model (a dropped connection, a bug); those are
/// logged and shown to the user as a generic failure.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use authform_core::AuthFormResult;
/// use authform_forms::submission::{SubmissionOutcome, Submitter};
/// use authform_forms::validation::CleanedData;
///
/// struct AlwaysOk;
///
/// #[async_trait]
/// impl Submitter for AlwaysOk {
///     async fn submit(&self, _values: CleanedData) -> AuthFormResult<SubmissionOutcome> {
///         Ok(SubmissionOutcome::Success)
///     }
/// }
/// ```
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Hands validated values to the collaborator and awaits its verdict.
    async fn submit(&self, values: CleanedData) -> AuthFormResult<SubmissionOutcome>;
}

/// What the controller applies once a submission completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandledOutcome {
    /// The submission went through.
    Succeeded,
    /// The submission did not go through.
    Failed {
        /// Message shown to the user.
        reason: String,
        /// The field the failure belongs to, if any.
        field: Option<String>,
    },
}

/// Runs a [`Submitter`] and normalizes everything it can produce.
#[derive(Clone)]
pub struct SubmissionHandler {
    submitter: Arc<dyn Submitter>,
}

impl SubmissionHandler {
    /// Wraps a collaborator.
    pub fn new(submitter: Arc<dyn Submitter>) -> Self {
        Self { submitter }
    }

    /// Submits `values` and waits for the collaborator to finish.
    ///
    /// The collaborator runs on its own task so a panic inside it is
    /// observed here as a join error instead of unwinding into the caller.
    pub async fn run(&self, values: CleanedData) -> HandledOutcome {
        let submitter = Arc::clone(&self.submitter);
        let task = tokio::spawn(async move { submitter.submit(values).await });

        match task.await {
            Ok(Ok(SubmissionOutcome::Success)) => HandledOutcome::Succeeded,
            Ok(Ok(SubmissionOutcome::Failure { reason, field })) => {
                tracing::info!(reason = %reason, field = ?field, "submission rejected");
                HandledOutcome::Failed { reason, field }
            }
            Ok(Err(error)) => {
                tracing::error!(error = %error, "identity collaborator failed unexpectedly");
                generic_failure()
            }
            Err(join_error) => {
                tracing::error!(error = %join_error, "identity collaborator aborted");
                generic_failure()
            }
        }
    }
}

fn generic_failure() -> HandledOutcome {
    HandledOutcome::Failed {
        reason: GENERIC_FAILURE.to_string(),
        field: None,
    }
}
