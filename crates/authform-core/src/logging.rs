//! Logging integration for authform.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-form spans.

use crate::settings::Settings;

/// Placeholder written in place of secret values whenever values are logged.
pub const REDACTED: &str = "********";

/// Installs the process-wide subscriber for the forms and the CLI.
///
/// `Settings::default()` has `debug = true`, so a run with no config file
/// gets pretty multi-line events with file and line; set `debug = false`
/// (or `AUTHFORM_DEBUG=off`) for one JSON object per event. `log_level` is
/// an `EnvFilter` directive such as `info` or `authform_forms=debug`; an
/// unparseable directive falls back to `info`. Only the first call installs
/// anything.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one form instance.
///
/// # Examples
///
/// ```
/// use authform_core::logging::form_span;
///
/// let span = form_span("sign_in");
/// let _guard = span.enter();
/// tracing::info!("submitting");
/// ```
pub fn form_span(form_name: &str) -> tracing::Span {
    tracing::info_span!("form", name = form_name)
}
