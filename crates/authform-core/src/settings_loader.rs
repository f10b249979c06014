//! Reading [`Settings`] from TOML, JSON, and `AUTHFORM_*` variables.
//!
//! Sources are layered: defaults, then a file, then the environment. A file
//! only needs the keys it changes; nested tables such as `[sign_up]` are
//! merged key by key, so `reset_on_success` can be set for one form alone.
//!
//! | Variable | Setting |
//! |---|---|
//! | `AUTHFORM_DEBUG` | `debug` |
//! | `AUTHFORM_LOG_LEVEL` | `log_level` |
//! | `AUTHFORM_SUBMISSION_DELAY_MS` | `submission_delay_ms` |
//! | `AUTHFORM_SIGN_IN_RESET_ON_SUCCESS` | `sign_in.reset_on_success` |
//! | `AUTHFORM_SIGN_UP_RESET_ON_SUCCESS` | `sign_up.reset_on_success` |
//!
//! ```rust,no_run
//! use authform_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("authform.toml")?;
//! # Ok::<(), authform_core::AuthFormError>(())
//! ```

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::AuthFormError;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy)]
enum Format {
    Toml,
    Json,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        })
    }
}

/// Parses TOML settings; absent keys keep their defaults.
pub fn from_toml_str(input: &str) -> Result<Settings, AuthFormError> {
    let parsed: toml::Value = toml::from_str(input).map_err(|e| parse_error(Format::Toml, e))?;
    layer_over_defaults(toml_to_json(parsed), Format::Toml)
}

/// Reads and parses a TOML settings file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, AuthFormError> {
    from_toml_str(&read_source(path.as_ref(), Format::Toml)?)
}

/// Reads a TOML settings file, then applies the environment on top.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, AuthFormError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Parses JSON settings; absent keys keep their defaults.
pub fn from_json_str(input: &str) -> Result<Settings, AuthFormError> {
    let parsed: Value = serde_json::from_str(input).map_err(|e| parse_error(Format::Json, e))?;
    layer_over_defaults(parsed, Format::Json)
}

/// Reads and parses a JSON settings file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, AuthFormError> {
    from_json_str(&read_source(path.as_ref(), Format::Json)?)
}

/// Defaults with the environment applied.
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Overwrites every setting whose `AUTHFORM_*` variable is set.
///
/// Flags accept `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off` in any
/// case. A flag or delay that does not parse leaves the setting alone.
pub fn apply_env_overrides(settings: &mut Settings) {
    let var = |name: &str| std::env::var(name).ok();

    if let Some(on) = var("AUTHFORM_DEBUG").as_deref().and_then(parse_flag) {
        settings.debug = on;
    }
    if let Some(val) = var("AUTHFORM_LOG_LEVEL") {
        settings.log_level = val;
    }
    if let Some(ms) = var("AUTHFORM_SUBMISSION_DELAY_MS").and_then(|v| v.trim().parse::<u64>().ok()) {
        settings.submission_delay_ms = ms;
    }
    if let Some(on) = var("AUTHFORM_SIGN_IN_RESET_ON_SUCCESS").as_deref().and_then(parse_flag) {
        settings.sign_in.reset_on_success = on;
    }
    if let Some(on) = var("AUTHFORM_SIGN_UP_RESET_ON_SUCCESS").as_deref().and_then(parse_flag) {
        settings.sign_up.reset_on_success = on;
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    let val = val.trim();
    if ["true", "1", "yes", "on"].iter().any(|on| val.eq_ignore_ascii_case(on)) {
        Some(true)
    } else if ["false", "0", "no", "off"].iter().any(|off| val.eq_ignore_ascii_case(off)) {
        Some(false)
    } else {
        None
    }
}

fn parse_error(format: Format, err: impl fmt::Display) -> AuthFormError {
    AuthFormError::Configuration(format!("invalid {format} settings: {err}"))
}

fn read_source(path: &Path, format: Format) -> Result<String, AuthFormError> {
    std::fs::read_to_string(path).map_err(|e| {
        AuthFormError::Configuration(format!(
            "cannot read {format} settings from {}: {e}",
            path.display()
        ))
    })
}

fn layer_over_defaults(layer: Value, format: Format) -> Result<Settings, AuthFormError> {
    let mut merged = serde_json::to_value(Settings::default())
        .map_err(|e| AuthFormError::Configuration(format!("default settings: {e}")))?;
    merge_into(&mut merged, layer);
    serde_json::from_value(merged).map_err(|e| parse_error(format, e))
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => items.into_iter().map(toml_to_json).collect(),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect::<Map<_, _>>(),
        ),
    }
}

/// Objects merge key by key; any other value replaces what was there.
fn merge_into(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}
