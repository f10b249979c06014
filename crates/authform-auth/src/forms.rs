//! Sign-in and sign-up forms.
//!
//! Each form owns its own schema; the two are defined independently even
//! though they share field names. [`FormKind`] ties a schema to its
//! settings, its route, and its submit label so the presentation layer can
//! build a controller per render.

use std::sync::Arc;

use authform_core::{AuthFormResult, FormSettings, Settings};
use authform_forms::fields::{FieldKind, FieldSpec};
use authform_forms::schema::{CrossFieldRule, FormSchema};
use authform_forms::submission::Submitter;
use authform_forms::{FormController, FormOptions};

use crate::identity::SimulatedIdentityService;

/// Minimum password length for both forms.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Sign-in: email and password.
pub fn sign_in_schema() -> AuthFormResult<FormSchema> {
    FormSchema::builder(FormKind::SignIn.name())
        .field(FieldSpec::new("email", FieldKind::Email))
        .field(FieldSpec::new("password", FieldKind::Password).min_length(MIN_PASSWORD_LENGTH))
        .build()
}

/// Sign-up: names, email, password with confirmation, and terms acceptance.
///
/// The confirmation is not required on its own; an empty confirmation fails
/// the match rule instead.
pub fn sign_up_schema() -> AuthFormResult<FormSchema> {
    FormSchema::builder(FormKind::SignUp.name())
        .field(FieldSpec::new("firstName", FieldKind::Text))
        .field(FieldSpec::new("lastName", FieldKind::Text))
        .field(FieldSpec::new("email", FieldKind::Email))
        .field(FieldSpec::new("password", FieldKind::Password).min_length(MIN_PASSWORD_LENGTH))
        .field(FieldSpec::new("confirmPassword", FieldKind::Password).required(false))
        .field(FieldSpec::new("terms", FieldKind::Boolean))
        .rule(CrossFieldRule::fields_equal(
            "password",
            "confirmPassword",
            "Passwords do not match",
        ))
        .build()
}

/// The credential forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    /// Authentication.
    SignIn,
    /// Registration.
    SignUp,
}

impl FormKind {
    /// Form name used in logs and snapshots.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SignIn => "sign_in",
            Self::SignUp => "sign_up",
        }
    }

    /// The route this form is mounted at.
    pub const fn path(self) -> &'static str {
        match self {
            Self::SignIn => "/",
            Self::SignUp => "/signup",
        }
    }

    /// The form linked from this one ("Don't have an account?").
    pub const fn alternate(self) -> Self {
        match self {
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::SignIn,
        }
    }

    /// Text on the submit trigger.
    pub const fn submit_label(self, submitting: bool) -> &'static str {
        match (self, submitting) {
            (Self::SignIn, false) => "Sign in",
            (Self::SignIn, true) => "Signing in…",
            (Self::SignUp, false) => "Sign up",
            (Self::SignUp, true) => "Signing up…",
        }
    }

    /// Builds a fresh schema for this form.
    pub fn schema(self) -> AuthFormResult<FormSchema> {
        match self {
            Self::SignIn => sign_in_schema(),
            Self::SignUp => sign_up_schema(),
        }
    }

    /// This form's section of the settings.
    pub const fn settings(self, settings: &Settings) -> &FormSettings {
        match self {
            Self::SignIn => &settings.sign_in,
            Self::SignUp => &settings.sign_up,
        }
    }

    /// Builds a controller that submits through `submitter`.
    pub fn controller(
        self,
        settings: &Settings,
        submitter: Arc<dyn Submitter>,
    ) -> AuthFormResult<FormController> {
        let options = FormOptions::from(self.settings(settings));
        Ok(FormController::new(self.schema()?, submitter, options))
    }

    /// Builds a controller backed by the simulated identity service.
    pub fn simulated_controller(self, settings: &Settings) -> AuthFormResult<FormController> {
        let service = SimulatedIdentityService::from_settings(self.schema()?, settings);
        self.controller(settings, Arc::new(service))
    }
}
