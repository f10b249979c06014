//! Integration tests for the schema -> validator -> controller -> submitter pipeline.
//!
//! Covers:
//! 1. Validation properties (required fields, determinism)
//! 2. The in-flight submission guard
//! 3. Collaborator faults and cancellation never stranding a form

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use authform_core::{AuthFormError, AuthFormResult};
use authform_forms::fields::{FieldKind, FieldSpec, FieldValue};
use authform_forms::schema::{CrossFieldRule, FormSchema};
use authform_forms::submission::{SubmissionOutcome, Submitter, GENERIC_FAILURE};
use authform_forms::validation::{validate, CleanedData, ValidationResult};
use authform_forms::{FormController, FormOptions, SubmissionState, SubmitResult};

// ============================================================================
// Shared helpers
// ============================================================================

fn make_schema() -> FormSchema {
    FormSchema::builder("account")
        .field(FieldSpec::new("name", FieldKind::Text))
        .field(FieldSpec::new("email", FieldKind::Email))
        .field(FieldSpec::new("password", FieldKind::Password).min_length(8))
        .field(FieldSpec::new("confirmPassword", FieldKind::Password).required(false))
        .rule(CrossFieldRule::fields_equal(
            "password",
            "confirmPassword",
            "Passwords do not match",
        ))
        .build()
        .unwrap()
}

fn complete_input() -> HashMap<String, FieldValue> {
    [
        ("name", "Ada"),
        ("email", "ada@example.com"),
        ("password", "abcdefgh"),
        ("confirmPassword", "abcdefgh"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), FieldValue::from(v)))
    .collect()
}

fn fill(controller: &FormController) {
    for (name, value) in complete_input() {
        controller.set_field(&name, value).unwrap();
    }
}

/// Blocks inside `submit` until released, counting how often it was entered.
struct GatedSubmitter {
    started: Arc<Notify>,
    release: Arc<Notify>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Submitter for GatedSubmitter {
    async fn submit(&self, _values: CleanedData) -> AuthFormResult<SubmissionOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(SubmissionOutcome::Success)
    }
}

struct Gate {
    started: Arc<Notify>,
    release: Arc<Notify>,
    calls: Arc<AtomicUsize>,
}

fn gated_controller(reset_on_success: bool) -> (FormController, Gate) {
    let gate = Gate {
        started: Arc::new(Notify::new()),
        release: Arc::new(Notify::new()),
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let submitter = GatedSubmitter {
        started: Arc::clone(&gate.started),
        release: Arc::clone(&gate.release),
        calls: Arc::clone(&gate.calls),
    };
    let controller = FormController::new(
        make_schema(),
        Arc::new(submitter),
        FormOptions { reset_on_success },
    );
    (controller, gate)
}

struct ErroringSubmitter;

#[async_trait]
impl Submitter for ErroringSubmitter {
    async fn submit(&self, _values: CleanedData) -> AuthFormResult<SubmissionOutcome> {
        Err(AuthFormError::Submission("upstream returned garbage".into()))
    }
}

struct PanickingSubmitter;

#[async_trait]
impl Submitter for PanickingSubmitter {
    async fn submit(&self, _values: CleanedData) -> AuthFormResult<SubmissionOutcome> {
        panic!("unhandled collaborator fault");
    }
}

// ============================================================================
// Validation properties
// ============================================================================

#[test]
fn test_missing_any_required_field_is_invalid() {
    let schema = make_schema();
    for field in ["name", "email", "password"] {
        let mut raw = complete_input();
        raw.remove(field);
        let result = validate(&schema, &raw);
        let errors = result.errors().expect("missing required field must be invalid");
        assert!(errors.contains_key(field), "no error keyed to {field}");
    }
}

#[test]
fn test_error_keys_are_schema_fields() {
    let schema = make_schema();
    let mut raw = HashMap::new();
    raw.insert("unexpected".to_string(), FieldValue::from("x"));
    let result = validate(&schema, &raw);
    for key in result.errors().unwrap().keys() {
        assert!(schema.contains(key));
    }
}

#[test]
fn test_validate_twice_is_identical() {
    let schema = make_schema();
    let mut raw = complete_input();
    raw.insert("confirmPassword".into(), FieldValue::from("abcdefgi"));
    let first = validate(&schema, &raw);
    let second = validate(&schema, &raw);
    assert_eq!(first, second);
}

#[test]
fn test_valid_values_pass_through_unchanged() {
    let schema = make_schema();
    let mut raw = complete_input();
    raw.insert("name".into(), FieldValue::from("  Ada  "));
    let ValidationResult::Valid(data) = validate(&schema, &raw) else {
        panic!("expected valid");
    };
    assert_eq!(data.get("name"), Some(&FieldValue::from("  Ada  ")));
}

// ============================================================================
// In-flight guard
// ============================================================================

#[tokio::test]
async fn test_second_submit_while_submitting_is_rejected() {
    let (controller, gate) = gated_controller(false);
    fill(&controller);

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    gate.started.notified().await;
    assert_eq!(controller.status(), SubmissionState::Submitting);
    assert!(!controller.can_submit());
    assert!(!controller.snapshot().can_submit());

    let second = controller.submit().await;
    assert!(matches!(second, Err(AuthFormError::SubmissionInFlight)));

    gate.release.notify_one();
    let result = first.await.unwrap().unwrap();
    assert_eq!(result, SubmitResult::Succeeded);
    assert_eq!(gate.calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.status(), SubmissionState::Succeeded);
}

#[tokio::test]
async fn test_mutations_locked_while_submitting() {
    let (controller, gate) = gated_controller(false);
    fill(&controller);

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    gate.started.notified().await;

    assert!(matches!(
        controller.set_field("name", "Grace"),
        Err(AuthFormError::SubmissionInFlight)
    ));
    assert!(matches!(controller.touch("name"), Err(AuthFormError::SubmissionInFlight)));
    assert!(matches!(controller.reset(), Err(AuthFormError::SubmissionInFlight)));
    assert!(matches!(controller.validate(), Err(AuthFormError::SubmissionInFlight)));

    gate.release.notify_one();
    pending.await.unwrap().unwrap();
    assert_eq!(
        controller.snapshot().values.get("name"),
        Some(&FieldValue::from("Ada"))
    );
    controller.set_field("name", "Grace").unwrap();
}

#[tokio::test]
async fn test_transitions_idle_submitting_succeeded() {
    let (controller, gate) = gated_controller(true);
    let mut rx = controller.subscribe();
    fill(&controller);
    assert_eq!(controller.status(), SubmissionState::Idle);

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), SubmissionState::Submitting);

    gate.release.notify_one();
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), SubmissionState::Succeeded);

    pending.await.unwrap().unwrap();
    assert!(controller.snapshot().values.is_empty());
}

#[tokio::test]
async fn test_dropped_submit_still_completes() {
    let (controller, gate) = gated_controller(false);
    fill(&controller);

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    gate.started.notified().await;
    pending.abort();

    let mut rx = controller.subscribe();
    gate.release.notify_one();
    while rx.borrow_and_update().is_submitting() {
        rx.changed().await.unwrap();
    }
    assert_eq!(controller.status(), SubmissionState::Succeeded);
}

// ============================================================================
// Collaborator faults
// ============================================================================

#[tokio::test]
async fn test_unexpected_error_becomes_generic_failure() {
    let controller = FormController::new(
        make_schema(),
        Arc::new(ErroringSubmitter),
        FormOptions::default(),
    );
    fill(&controller);
    let result = controller.submit().await.unwrap();
    assert_eq!(result, SubmitResult::Failed(GENERIC_FAILURE.into()));
    let snap = controller.snapshot();
    assert_eq!(snap.status, SubmissionState::Failed(GENERIC_FAILURE.into()));
    assert!(snap.errors.is_empty());
    assert_eq!(snap.values.len(), 4);
}

#[tokio::test]
async fn test_panicking_collaborator_does_not_strand_form() {
    let controller = FormController::new(
        make_schema(),
        Arc::new(PanickingSubmitter),
        FormOptions::default(),
    );
    fill(&controller);
    let result = controller.submit().await.unwrap();
    assert_eq!(result, SubmitResult::Failed(GENERIC_FAILURE.into()));
    assert!(controller.can_submit());

    // Re-submission after a failure is allowed.
    let again = controller.submit().await.unwrap();
    assert_eq!(again, SubmitResult::Failed(GENERIC_FAILURE.into()));
}

// ============================================================================
// Instance isolation
// ============================================================================

#[tokio::test]
async fn test_controllers_do_not_share_state() {
    let (first, first_gate) = gated_controller(false);
    let (second, _second_gate) = gated_controller(false);
    fill(&first);

    let pending = tokio::spawn({
        let first = first.clone();
        async move { first.submit().await }
    });
    first_gate.started.notified().await;

    second.set_field("name", "Grace").unwrap();
    assert_eq!(second.status(), SubmissionState::Idle);
    assert!(second.snapshot().values.get("email").is_none());

    first_gate.release.notify_one();
    pending.await.unwrap().unwrap();
}
