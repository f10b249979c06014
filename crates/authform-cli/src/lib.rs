//! # authform-cli
//!
//! A terminal driver for the credential forms. It stands in for a
//! presentation layer: field values come from command-line flags, are fed
//! through the controller one `set_field` at a time, and the final form
//! state is printed as JSON.
//!
//! ```text
//! authform [--config settings.toml] sign-in --email a@b.co --password hunter22
//! authform sign-up --first-name Ada --last-name Lovelace --email ada@example.com \
//!     --password abcdefgh --confirm-password abcdefgh --terms
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use authform_auth::FormKind;
use authform_core::settings_loader;
use authform_core::{AuthFormResult, Settings};
use authform_forms::fields::FieldValue;
use authform_forms::schema::FormSchema;
use authform_forms::{FormSnapshot, SubmitResult};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "authform", about = "Fill in and submit a credential form")]
pub struct Cli {
    /// TOML settings file; `AUTHFORM_*` variables override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// One subcommand per form.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in with an email and password.
    SignIn {
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Create an account.
    SignUp {
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "")]
        confirm_password: String,
        /// Accept the terms and conditions.
        #[arg(long)]
        terms: bool,
    },
}

impl Command {
    /// The form this command fills in.
    pub const fn kind(&self) -> FormKind {
        match self {
            Self::SignIn { .. } => FormKind::SignIn,
            Self::SignUp { .. } => FormKind::SignUp,
        }
    }

    /// Field values in the order a user would type them.
    pub fn values(&self) -> Vec<(&'static str, FieldValue)> {
        match self {
            Self::SignIn { email, password } => vec![
                ("email", email.as_str().into()),
                ("password", password.as_str().into()),
            ],
            Self::SignUp {
                first_name,
                last_name,
                email,
                password,
                confirm_password,
                terms,
            } => vec![
                ("firstName", first_name.as_str().into()),
                ("lastName", last_name.as_str().into()),
                ("email", email.as_str().into()),
                ("password", password.as_str().into()),
                ("confirmPassword", confirm_password.as_str().into()),
                ("terms", (*terms).into()),
            ],
        }
    }
}

/// Loads settings from `config` plus the environment, or the environment alone.
pub fn load_settings(config: Option<&Path>) -> AuthFormResult<Settings> {
    match config {
        Some(path) => settings_loader::from_toml_file_with_env(path),
        None => Ok(settings_loader::from_env()),
    }
}

/// The form state printed once a run finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Route the form is mounted at.
    pub path: &'static str,
    /// Label the submit trigger shows now.
    pub submit_label: &'static str,
    /// The final snapshot, with secret values masked.
    pub form: serde_json::Value,
    /// Whether the identity service accepted the submission.
    #[serde(skip)]
    pub succeeded: bool,
}

/// Fills in and submits the form named by `command`.
pub async fn execute(command: &Command, settings: &Settings) -> AuthFormResult<Report> {
    let kind = command.kind();
    let controller = kind.simulated_controller(settings)?;

    for (name, value) in command.values() {
        controller.set_field(name, value)?;
    }

    let result = controller.submit().await?;
    if let SubmitResult::Invalid(errors) = &result {
        tracing::info!(form = kind.name(), errors = errors.len(), "form has errors");
    }

    let snapshot = controller.snapshot();
    Ok(Report {
        path: kind.path(),
        submit_label: kind.submit_label(snapshot.status.is_submitting()),
        form: render(controller.schema(), &snapshot),
        succeeded: result == SubmitResult::Succeeded,
    })
}

/// Serializes a snapshot with secret values masked.
pub fn render(schema: &FormSchema, snapshot: &FormSnapshot) -> serde_json::Value {
    let mut rendered = serde_json::json!(snapshot);
    rendered["values"] = serde_json::json!(schema.redact(&snapshot.values));
    rendered
}
