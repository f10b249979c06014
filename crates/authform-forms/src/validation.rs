//! Validation pipeline for form input.
//!
//! 1. Field-level validation: each field, in schema order, is checked and
//!    coerced by [`clean_field_value`].
//! 2. Cross-field validation: each rule whose dependents all passed step 1
//!    is evaluated; a failing rule writes its message to its target unless
//!    that field already has one.
//!
//! Errors accumulate across fields rather than short-circuiting, so every
//! problem is reported at once. [`validate`] is pure: same schema and input,
//! same result.

use std::collections::{HashMap, HashSet};

use authform_core::FieldErrors;

use crate::fields::{clean_field_value, FieldValue};
use crate::schema::FormSchema;

/// Normalized values of a form that passed validation, keyed by field name.
pub type CleanedData = HashMap<String, FieldValue>;

/// The outcome of validating input against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Every field and rule passed.
    Valid(CleanedData),
    /// At least one field has an error.
    Invalid(FieldErrors),
}

impl ValidationResult {
    /// Returns `true` for [`ValidationResult::Valid`].
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns the error map, if invalid.
    pub const fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(errors) => Some(errors),
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<CleanedData, FieldErrors> {
        match self {
            Self::Valid(data) => Ok(data),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

/// Performs field-level validation for all fields.
///
/// Values for names the schema does not define are ignored.
pub fn clean_fields(
    schema: &FormSchema,
    raw_data: &HashMap<String, FieldValue>,
    cleaned_data: &mut CleanedData,
    errors: &mut FieldErrors,
) {
    for field in schema.fields() {
        match clean_field_value(field, raw_data.get(&field.name)) {
            Ok(Some(value)) => {
                cleaned_data.insert(field.name.clone(), value);
            }
            Ok(None) => {}
            Err(message) => {
                errors.insert(field.name.clone(), message);
            }
        }
    }
}

/// Evaluates cross-field rules over fields that passed field-level validation.
///
/// `errors` holds the field-level errors on entry. Only those decide which
/// rules are skipped; a message written by one rule never suppresses a later
/// rule that reads its target. First writer wins: a rule never replaces a
/// message already on its target.
pub fn clean_rules(schema: &FormSchema, cleaned_data: &CleanedData, errors: &mut FieldErrors) {
    let failed_fields: HashSet<String> = errors.keys().cloned().collect();

    for rule in schema.rules() {
        if rule.dependents().iter().any(|name| failed_fields.contains(name)) {
            continue;
        }
        if !rule.holds(cleaned_data) {
            errors
                .entry(rule.error_target().to_string())
                .or_insert_with(|| rule.message().to_string());
        }
    }
}

/// Validates raw input against a schema.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use authform_forms::fields::{FieldKind, FieldSpec};
/// use authform_forms::schema::FormSchema;
/// use authform_forms::validation::validate;
///
/// let schema = FormSchema::builder("demo")
///     .field(FieldSpec::new("email", FieldKind::Email))
///     .build()
///     .unwrap();
///
/// let result = validate(&schema, &HashMap::new());
/// assert_eq!(
///     result.errors().and_then(|e| e.get("email")).map(String::as_str),
///     Some("Email is required")
/// );
/// ```
pub fn validate(schema: &FormSchema, raw_data: &HashMap<String, FieldValue>) -> ValidationResult {
    let mut cleaned_data = CleanedData::new();
    let mut errors = FieldErrors::new();

    clean_fields(schema, raw_data, &mut cleaned_data, &mut errors);
    clean_rules(schema, &cleaned_data, &mut errors);

    if errors.is_empty() {
        ValidationResult::Valid(cleaned_data)
    } else {
        ValidationResult::Invalid(errors)
    }
}
