//! # authform
//!
//! Credential forms for Rust.
//!
//! This is the meta-crate that re-exports the member crates. Depend on
//! `authform` to get everything, or on the individual crates for
//! finer-grained control.
//!
//! ```
//! use authform::auth::FormKind;
//! use authform::core::Settings;
//!
//! let controller = FormKind::SignIn
//!     .simulated_controller(&Settings::default())
//!     .unwrap();
//! controller.set_field("email", "a@b.co").unwrap();
//! assert!(controller.can_submit());
//! ```

/// Settings, error types, and logging setup.
pub use authform_core as core;

/// Schemas, validation, the form state controller, and submission.
#[cfg(feature = "forms")]
pub use authform_forms as forms;

/// The sign-in and sign-up forms and the simulated identity service.
#[cfg(feature = "auth")]
pub use authform_auth as auth;

/// Terminal driver.
#[cfg(feature = "cli")]
pub use authform_cli as cli;

// Third-party re-exports
pub use async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use tracing_subscriber;

/// Commonly used items.
pub mod prelude {
    pub use authform_core::{AuthFormError, AuthFormResult, FieldErrors, Settings};

    #[cfg(feature = "forms")]
    pub use authform_forms::{
        FieldKind, FieldSpec, FieldValue, FormController, FormOptions, FormSchema,
        FormSnapshot, SubmissionOutcome, SubmissionState, SubmitResult, Submitter,
    };

    #[cfg(feature = "auth")]
    pub use authform_auth::{FormKind, SimulatedIdentityService};
}
