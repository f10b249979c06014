//! Settings for authform.
//!
//! [`Settings`] holds the logging configuration, the delay used by the
//! simulated identity service, and per-form behavior. Settings are plain
//! values passed to whoever needs them; there is no global instance.

use serde::{Deserialize, Serialize};

/// Behavior that differs between the sign-in and sign-up forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
    /// Whether field values are cleared after a successful submission.
    pub reset_on_success: bool,
}

/// The complete set of settings.
///
/// # Examples
///
/// ```
/// use authform_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.sign_in.reset_on_success);
/// assert!(!settings.sign_up.reset_on_success);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter (e.g. "info", "debug", "authform_forms=trace").
    pub log_level: String,

    // ── Submission ───────────────────────────────────────────────────

    /// Fixed delay of the simulated identity service, in milliseconds.
    pub submission_delay_ms: u64,

    // ── Forms ────────────────────────────────────────────────────────

    /// Sign-in form behavior.
    pub sign_in: FormSettings,
    /// Sign-up form behavior.
    pub sign_up: FormSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            submission_delay_ms: 1000,
            sign_in: FormSettings {
                reset_on_success: true,
            },
            sign_up: FormSettings {
                reset_on_success: false,
            },
        }
    }
}
