//! # authform-forms
//!
//! Forms core for authform. A [`FormSchema`](schema::FormSchema) declares
//! fields and cross-field rules, [`validate`](validation::validate) checks raw
//! input against it, and a [`FormController`](controller::FormController)
//! owns one form instance's values, errors, and submission status, handing
//! valid input to a [`Submitter`](submission::Submitter).

pub mod controller;
pub mod fields;
pub mod schema;
pub mod submission;
pub mod validation;

pub use controller::{FormController, FormOptions, FormSnapshot, SubmissionState, SubmitResult};
pub use fields::{FieldFormat, FieldKind, FieldSpec, FieldValue};
pub use schema::{CrossFieldRule, FormSchema};
pub use submission::{SubmissionHandler, SubmissionOutcome, Submitter};
pub use validation::{validate, CleanedData, ValidationResult};
