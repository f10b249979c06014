//! Form state controller.
//!
//! A [`FormController`] owns one form instance: its current values, the
//! touched and dirty flags, the per-field error map, and the
//! [`SubmissionState`]. The presentation layer mutates it through
//! [`set_field`](FormController::set_field) and
//! [`submit`](FormController::submit) and renders from
//! [`snapshot`](FormController::snapshot).
//!
//! ## State machine
//!
//! ```text
//!  Idle ──submit, invalid──▶ Idle (errors shown)
//!  Idle ──submit, valid───▶ Submitting ──success──▶ Succeeded
//!                                      └─failure──▶ Failed(reason)
//!  Succeeded / Failed ──submit──▶ (as from Idle)
//! ```
//!
//! While `Submitting`, every mutation and every further submit is rejected
//! with [`AuthFormError::SubmissionInFlight`]. Once a submission starts it
//! runs to completion on its own task, even if the caller stops waiting.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tracing::Instrument;

use authform_core::logging::form_span;
use authform_core::{AuthFormError, AuthFormResult, FieldErrors, FormSettings};

use crate::fields::{FieldSpec, FieldValue};
use crate::schema::FormSchema;
use crate::submission::{HandledOutcome, SubmissionHandler, Submitter};
use crate::validation::{validate, ValidationResult};

/// Where a form is in its submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SubmissionState {
    /// Accepting input.
    Idle,
    /// A submission is outstanding.
    Submitting,
    /// The last submission went through.
    Succeeded,
    /// The last submission did not go through.
    Failed(String),
}

impl SubmissionState {
    /// Returns `true` while a submission is outstanding.
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Submitting => write!(f, "submitting"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Per-instance behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormOptions {
    /// Restore initial values after a successful submission.
    pub reset_on_success: bool,
}

impl From<&FormSettings> for FormOptions {
    fn from(settings: &FormSettings) -> Self {
        Self {
            reset_on_success: settings.reset_on_success,
        }
    }
}

/// A read-only view of a form, for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    /// The form name.
    pub form: String,
    /// Current field values.
    pub values: HashMap<String, FieldValue>,
    /// Current per-field error messages.
    pub errors: FieldErrors,
    /// Submission status.
    pub status: SubmissionState,
    /// Fields the user has interacted with.
    pub touched: BTreeSet<String>,
    /// Fields whose value differs from the initial value.
    pub dirty: BTreeSet<String>,
}

impl FormSnapshot {
    /// Whether the submit trigger should be enabled.
    pub const fn can_submit(&self) -> bool {
        !self.status.is_submitting()
    }

    /// The error message for one field, if any.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// What a call to [`FormController::submit`] ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// Validation failed; nothing was submitted.
    Invalid(FieldErrors),
    /// The collaborator accepted the submission.
    Succeeded,
    /// The collaborator rejected the submission or failed.
    Failed(String),
}

#[derive(Debug)]
struct FormState {
    values: HashMap<String, FieldValue>,
    errors: FieldErrors,
    status: SubmissionState,
    touched: BTreeSet<String>,
    dirty: BTreeSet<String>,
}

impl FormState {
    fn new(schema: &FormSchema) -> Self {
        Self {
            values: schema.initial_values(),
            errors: FieldErrors::new(),
            status: SubmissionState::Idle,
            touched: BTreeSet::new(),
            dirty: BTreeSet::new(),
        }
    }

    fn clear_input(&mut self, schema: &FormSchema) {
        self.values = schema.initial_values();
        self.touched.clear();
        self.dirty.clear();
    }
}

struct Inner {
    schema: FormSchema,
    handler: SubmissionHandler,
    options: FormOptions,
    state: Mutex<FormState>,
    status_tx: watch::Sender<SubmissionState>,
}

/// Handle to one form instance.
///
/// Clones share the same instance, so the presentation layer and a pending
/// submission see the same state. Create a new controller per form render;
/// nothing is shared between controllers.
#[derive(Clone)]
pub struct FormController {
    inner: Arc<Inner>,
}

impl FormController {
    /// Creates a controller over `schema` that submits through `submitter`.
    pub fn new(schema: FormSchema, submitter: Arc<dyn Submitter>, options: FormOptions) -> Self {
        let state = FormState::new(&schema);
        let (status_tx, _) = watch::channel(SubmissionState::Idle);
        Self {
            inner: Arc::new(Inner {
                schema,
                handler: SubmissionHandler::new(submitter),
                options,
                state: Mutex::new(state),
                status_tx,
            }),
        }
    }

    /// The schema this form validates against.
    pub fn schema(&self) -> &FormSchema {
        &self.inner.schema
    }

    /// The options this form was created with.
    pub fn options(&self) -> FormOptions {
        self.inner.options
    }

    /// A copy of everything the presentation layer renders.
    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.lock();
        FormSnapshot {
            form: self.inner.schema.name().to_string(),
            values: state.values.clone(),
            errors: state.errors.clone(),
            status: state.status.clone(),
            touched: state.touched.clone(),
            dirty: state.dirty.clone(),
        }
    }

    /// The current submission status.
    pub fn status(&self) -> SubmissionState {
        self.lock().status.clone()
    }

    /// Whether a submit would currently be accepted.
    pub fn can_submit(&self) -> bool {
        !self.lock().status.is_submitting()
    }

    /// Subscribes to status changes.
    ///
    /// The navigation collaborator watches this for
    /// [`SubmissionState::Succeeded`].
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.inner.status_tx.subscribe()
    }

    /// Stores a value for `name` and marks it touched.
    ///
    /// Does not validate; validation happens on submit.
    pub fn set_field(&self, name: &str, value: impl Into<FieldValue>) -> AuthFormResult<()> {
        let value = value.into();
        let initial = self.known_field(name)?.initial.clone();

        let mut state = self.lock();
        self.ensure_idle(&state, "set_field")?;

        if initial.as_ref() == Some(&value) || (initial.is_none() && value.is_empty()) {
            state.dirty.remove(name);
        } else {
            state.dirty.insert(name.to_string());
        }
        state.touched.insert(name.to_string());
        state.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Marks `name` touched without changing its value (a blur event).
    pub fn touch(&self, name: &str) -> AuthFormResult<()> {
        self.known_field(name)?;
        let mut state = self.lock();
        self.ensure_idle(&state, "touch")?;
        state.touched.insert(name.to_string());
        Ok(())
    }

    /// Validates the current values and stores the resulting errors.
    pub fn validate(&self) -> AuthFormResult<ValidationResult> {
        let mut state = self.lock();
        self.ensure_idle(&state, "validate")?;
        let result = validate(&self.inner.schema, &state.values);
        state.errors = result.errors().cloned().unwrap_or_default();
        Ok(result)
    }

    /// Restores initial values, clears errors and flags, and returns to idle.
    pub fn reset(&self) -> AuthFormResult<()> {
        let mut state = self.lock();
        self.ensure_idle(&state, "reset")?;
        state.clear_input(&self.inner.schema);
        state.errors.clear();
        self.transition(&mut state, SubmissionState::Idle);
        Ok(())
    }

    /// Validates and, if valid, submits the current values.
    ///
    /// Invalid input leaves the form idle with its errors stored. Valid input
    /// moves the form to `Submitting`, clears previous errors, and awaits the
    /// collaborator. A submit while one is already outstanding is rejected
    /// and changes nothing.
    pub async fn submit(&self) -> AuthFormResult<SubmitResult> {
        let span = form_span(self.inner.schema.name());

        let values = {
            let _entered = span.enter();
            let mut state = self.lock();
            self.ensure_idle(&state, "submit")?;

            match validate(&self.inner.schema, &state.values) {
                ValidationResult::Invalid(errors) => {
                    tracing::debug!(errors = errors.len(), "validation failed");
                    state.errors.clone_from(&errors);
                    self.transition(&mut state, SubmissionState::Idle);
                    return Ok(SubmitResult::Invalid(errors));
                }
                ValidationResult::Valid(cleaned) => {
                    tracing::debug!(values = ?self.inner.schema.redact(&cleaned), "validation passed");
                    state.errors.clear();
                    self.transition(&mut state, SubmissionState::Submitting);
                    cleaned
                }
            }
        };

        let controller = self.clone();
        let driver = tokio::spawn(
            async move {
                let outcome = controller.inner.handler.run(values).await;
                controller.finish(outcome)
            }
            .instrument(span),
        );

        driver
            .await
            .map_err(|e| AuthFormError::Submission(e.to_string()))
    }

    fn finish(&self, outcome: HandledOutcome) -> SubmitResult {
        let mut state = self.lock();
        match outcome {
            HandledOutcome::Succeeded => {
                if self.inner.options.reset_on_success {
                    state.clear_input(&self.inner.schema);
                }
                self.transition(&mut state, SubmissionState::Succeeded);
                SubmitResult::Succeeded
            }
            HandledOutcome::Failed { reason, field } => {
                match field {
                    Some(name) if self.inner.schema.contains(&name) => {
                        state.errors.entry(name).or_insert_with(|| reason.clone());
                    }
                    Some(name) => {
                        tracing::warn!(field = %name, "failure attributed to a field this form does not have");
                    }
                    None => {}
                }
                self.transition(&mut state, SubmissionState::Failed(reason.clone()));
                SubmitResult::Failed(reason)
            }
        }
    }

    fn transition(&self, state: &mut FormState, next: SubmissionState) {
        if state.status != next {
            tracing::info!(from = %state.status, to = %next, "form status changed");
        }
        state.status = next.clone();
        self.inner.status_tx.send_replace(next);
    }

    fn ensure_idle(&self, state: &FormState, operation: &str) -> AuthFormResult<()> {
        if state.status.is_submitting() {
            tracing::warn!(
                form = self.inner.schema.name(),
                operation,
                "rejected while a submission is in flight"
            );
            return Err(AuthFormError::SubmissionInFlight);
        }
        Ok(())
    }

    fn known_field(&self, name: &str) -> AuthFormResult<&FieldSpec> {
        self.inner
            .schema
            .field(name)
            .ok_or_else(|| AuthFormError::UnknownField(name.to_string()))
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("form", &self.inner.schema.name())
            .field("options", &self.inner.options)
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}
