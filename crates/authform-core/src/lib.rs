//! # authform-core
//!
//! Core types, settings, and error types for authform.
//! This crate has no framework dependencies and is the foundation for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Settings for the credential forms
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{AuthFormError, AuthFormResult, FieldErrors};
pub use settings::{FormSettings, Settings};
