//! Field definitions and per-field validation.
//!
//! Each [`FieldSpec`] describes one input: its [`FieldKind`], whether it is
//! required, and its atomic constraints. [`clean_field_value`] runs those
//! constraints against a raw [`FieldValue`] and either coerces it to the
//! declared kind or returns the first error message that applies.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Standard email shape: local part, `@`, dotted domain, alphabetic TLD.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

/// Error codes accepted by [`FieldSpec::error_message`].
pub mod codes {
    /// A required field is absent or empty.
    pub const REQUIRED: &str = "required";
    /// An email field does not have an email shape.
    pub const INVALID_EMAIL: &str = "invalid_email";
    /// A text field is shorter than its minimum length.
    pub const MIN_LENGTH: &str = "min_length";
    /// A text field does not match its custom format.
    pub const INVALID_FORMAT: &str = "invalid_format";
    /// A required boolean field is false.
    pub const MUST_ACCEPT: &str = "must_accept";
}

/// The declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// An email address.
    Email,
    /// A secret; never logged in clear.
    Password,
    /// A checkbox.
    Boolean,
}

impl FieldKind {
    /// The HTML input type this kind renders as.
    pub const fn input_type(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Boolean => "checkbox",
        }
    }

    /// Returns `true` for kinds whose values must be redacted in logs.
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::Password)
    }
}

/// A raw or normalized field value as delivered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A checkbox state.
    Bool(bool),
    /// Text input, passed through byte-for-byte.
    Text(String),
}

impl FieldValue {
    /// Returns the text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    /// Returns the boolean, if this is a boolean value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) => None,
        }
    }

    /// Empty text counts as no input; a boolean is never empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A custom format constraint on a text field.
#[derive(Debug, Clone)]
pub enum FieldFormat {
    /// The value must match the regex.
    Regex(Regex),
    /// The value must satisfy the predicate.
    Predicate(fn(&str) -> bool),
}

impl FieldFormat {
    /// Returns `true` if `value` satisfies this format.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(value),
            Self::Predicate(pred) => pred(value),
        }
    }
}

/// Complete definition of a form field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// The field name, unique within its schema.
    pub name: String,
    /// The declared kind, controlling coercion and built-in checks.
    pub kind: FieldKind,
    /// Whether the field must be present and non-empty.
    pub required: bool,
    /// Minimum length, for text-like kinds. Counted in Unicode scalar
    /// values (`char`s), so `"😀😀😀😀"` has length 4.
    pub min_length: Option<usize>,
    /// Additional format constraint, for text-like kinds.
    pub format: Option<FieldFormat>,
    /// Human-readable label, used in messages.
    pub label: String,
    /// Value the field holds before any input and after a reset.
    pub initial: Option<FieldValue>,
    /// Custom error messages keyed by code (see [`codes`]).
    pub error_messages: HashMap<String, String>,
}

impl FieldSpec {
    /// Creates a required field with a label derived from its name.
    ///
    /// Boolean fields start out as `false`; other kinds start absent.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        let label = humanize(&name);
        let initial = (kind == FieldKind::Boolean).then_some(FieldValue::Bool(false));
        Self {
            name,
            kind,
            required: true,
            min_length: None,
            format: None,
            label,
            initial,
            error_messages: HashMap::new(),
        }
    }

    /// Sets whether this field is required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the minimum length, counted in `char`s rather than bytes or
    /// UTF-16 code units.
    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Sets a custom format constraint.
    #[must_use]
    pub fn format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn initial(mut self, value: impl Into<FieldValue>) -> Self {
        self.initial = Some(value.into());
        self
    }

    /// Sets a custom error message for a given code.
    #[must_use]
    pub fn error_message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), msg.into());
        self
    }

    fn message(&self, code: &str, default: impl FnOnce() -> String) -> String {
        self.error_messages
            .get(code)
            .cloned()
            .unwrap_or_else(default)
    }
}

/// Cleans (validates and coerces) one raw value against its field spec.
///
/// Checks run in order and stop at the first failure:
/// 1. Required check (absent or empty text)
/// 2. Email shape, for email fields
/// 3. Minimum length
/// 4. Custom format
/// 5. Required booleans must be `true`
///
/// On success returns the value coerced to the declared kind, or `None` for
/// an optional field that was never given a value.
pub fn clean_field_value(
    field: &FieldSpec,
    raw: Option<&FieldValue>,
) -> Result<Option<FieldValue>, String> {
    let is_empty = raw.map_or(true, FieldValue::is_empty);

    if field.required && is_empty {
        return Err(field.message(codes::REQUIRED, || format!("{} is required", field.label)));
    }

    let Some(raw) = raw else {
        return Ok(field.initial.clone());
    };

    if field.kind == FieldKind::Boolean {
        let checked = coerce_bool(raw);
        if field.required && !checked {
            return Err(field.message(codes::MUST_ACCEPT, || {
                "You must accept the terms".to_string()
            }));
        }
        return Ok(Some(FieldValue::Bool(checked)));
    }

    let text = match raw {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Bool(b) => b.to_string(),
    };

    // Optional and empty: nothing further to check.
    if is_empty {
        return Ok(Some(FieldValue::Text(text)));
    }

    if field.kind == FieldKind::Email && !EMAIL_RE.is_match(&text) {
        return Err(field.message(codes::INVALID_EMAIL, || "Invalid email address".to_string()));
    }

    if let Some(min) = field.min_length {
        if text.chars().count() < min {
            return Err(field.message(codes::MIN_LENGTH, || {
                format!("{} must be at least {min} characters", field.label)
            }));
        }
    }

    if let Some(format) = &field.format {
        if !format.matches(&text) {
            return Err(field.message(codes::INVALID_FORMAT, || format!("{} is invalid", field.label)));
        }
    }

    Ok(Some(FieldValue::Text(text)))
}

fn coerce_bool(raw: &FieldValue) -> bool {
    match raw {
        FieldValue::Bool(b) => *b,
        FieldValue::Text(s) => matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on"),
    }
}

/// Turns `confirmPassword` or `first_name` into `Confirm password` / `First name`.
fn humanize(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 2);
    for (i, c) in name.chars().enumerate() {
        if c == '_' || c == '-' {
            label.push(' ');
        } else if c.is_uppercase() {
            if i > 0 {
                label.push(' ');
            }
            label.extend(c.to_lowercase());
        } else {
            label.push(c);
        }
    }
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
