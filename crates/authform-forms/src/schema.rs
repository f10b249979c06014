//! Declarative form schemas.
//!
//! A [`FormSchema`] is an ordered list of [`FieldSpec`]s plus the
//! [`CrossFieldRule`]s that relate them. Schemas are pure data: they are
//! checked once at construction by [`SchemaBuilder::build`] and never change
//! afterwards, so nothing downstream looks up a field name the schema does
//! not define.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use authform_core::logging::REDACTED;
use authform_core::{AuthFormError, AuthFormResult};

use crate::fields::{FieldSpec, FieldValue};

/// Predicate over the values of a rule's dependents, in dependent order.
///
/// A dependent that has no value is passed as `None`.
pub type RulePredicate = Arc<dyn Fn(&[Option<&FieldValue>]) -> bool + Send + Sync>;

/// A constraint whose truth depends on more than one field.
#[derive(Clone)]
pub struct CrossFieldRule {
    dependents: Vec<String>,
    predicate: RulePredicate,
    message: String,
    error_target: String,
}

impl CrossFieldRule {
    /// Creates a rule over `dependents` that reports `message` on `error_target`.
    pub fn new<I, S, P>(
        dependents: I,
        error_target: impl Into<String>,
        message: impl Into<String>,
        predicate: P,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        P: Fn(&[Option<&FieldValue>]) -> bool + Send + Sync + 'static,
    {
        Self {
            dependents: dependents.into_iter().map(Into::into).collect(),
            predicate: Arc::new(predicate),
            message: message.into(),
            error_target: error_target.into(),
        }
    }

    /// A rule requiring `confirm` to equal `original`; the error lands on `confirm`.
    pub fn fields_equal(
        original: impl Into<String>,
        confirm: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let confirm = confirm.into();
        Self::new(
            [original.into(), confirm.clone()],
            confirm,
            message,
            |values| values.windows(2).all(|pair| pair[0] == pair[1]),
        )
    }

    /// The fields this rule reads, in order.
    pub fn dependents(&self) -> &[String] {
        &self.dependents
    }

    /// The message reported when the rule fails.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The field the failure message is attached to.
    pub fn error_target(&self) -> &str {
        &self.error_target
    }

    /// Evaluates the predicate against a value map.
    pub fn holds(&self, values: &HashMap<String, FieldValue>) -> bool {
        let args: Vec<Option<&FieldValue>> =
            self.dependents.iter().map(|name| values.get(name)).collect();
        (self.predicate)(&args)
    }
}

impl fmt::Debug for CrossFieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossFieldRule")
            .field("dependents", &self.dependents)
            .field("message", &self.message)
            .field("error_target", &self.error_target)
            .finish_non_exhaustive()
    }
}

/// An immutable description of one form's fields and rules.
#[derive(Debug, Clone)]
pub struct FormSchema {
    name: String,
    fields: Vec<FieldSpec>,
    rules: Vec<CrossFieldRule>,
}

impl FormSchema {
    /// Starts building a schema with the given form name.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// The form name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field specs in display order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Cross-field rules in evaluation order.
    pub fn rules(&self) -> &[CrossFieldRule] {
        &self.rules
    }

    /// Looks up a field spec by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if the schema defines `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Values every field holds before input and after a reset.
    pub fn initial_values(&self) -> HashMap<String, FieldValue> {
        self.fields
            .iter()
            .filter_map(|f| f.initial.clone().map(|v| (f.name.clone(), v)))
            .collect()
    }

    /// Renders values for logging, masking secret fields.
    pub fn redact(&self, values: &HashMap<String, FieldValue>) -> BTreeMap<String, String> {
        values
            .iter()
            .map(|(name, value)| {
                let secret = self.field(name).is_some_and(|f| f.kind.is_secret());
                let shown = if secret {
                    REDACTED.to_string()
                } else {
                    value.to_string()
                };
                (name.clone(), shown)
            })
            .collect()
    }
}

/// Collects fields and rules, then checks them in [`build`](Self::build).
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldSpec>,
    rules: Vec<CrossFieldRule>,
}

impl SchemaBuilder {
    /// Appends a field. Insertion order is display order.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a cross-field rule.
    #[must_use]
    pub fn rule(mut self, rule: CrossFieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Checks the definition and produces the schema.
    ///
    /// Fails if two fields share a name, if a rule has no dependents, or if a
    /// rule names a dependent or error target that is not a field.
    pub fn build(self) -> AuthFormResult<FormSchema> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(AuthFormError::DuplicateField(field.name.clone()));
            }
        }

        for rule in &self.rules {
            if rule.dependents.is_empty() {
                return Err(AuthFormError::InvalidRule(format!(
                    "rule targeting '{}' has no dependents",
                    rule.error_target
                )));
            }
            if let Some(unknown) = rule
                .dependents
                .iter()
                .chain(std::iter::once(&rule.error_target))
                .find(|name| !seen.contains(name.as_str()))
            {
                return Err(AuthFormError::UnknownField(unknown.clone()));
            }
        }

        Ok(FormSchema {
            name: self.name,
            fields: self.fields,
            rules: self.rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldKind;

    fn passwords() -> SchemaBuilder {
        FormSchema::builder("test")
            .field(FieldSpec::new("password", FieldKind::Password))
            .field(FieldSpec::new("confirmPassword", FieldKind::Password).required(false))
    }

    #[test]
    fn test_build_valid_schema() {
        let schema = passwords()
            .rule(CrossFieldRule::fields_equal(
                "password",
                "confirmPassword",
                "Passwords do not match",
            ))
            .build()
            .unwrap();
        assert_eq!(schema.name(), "test");
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.fields()[0].name, "password");
        assert_eq!(schema.rules()[0].error_target(), "confirmPassword");
        assert!(schema.contains("password"));
        assert!(!schema.contains("email"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = passwords()
            .field(FieldSpec::new("password", FieldKind::Text))
            .build();
        assert!(matches!(result, Err(AuthFormError::DuplicateField(name)) if name == "password"));
    }

    #[test]
    fn test_rule_with_unknown_dependent_rejected() {
        let result = passwords()
            .rule(CrossFieldRule::fields_equal("pasword", "confirmPassword", "x"))
            .build();
        assert!(matches!(result, Err(AuthFormError::UnknownField(name)) if name == "pasword"));
    }

    #[test]
    fn test_rule_with_unknown_target_rejected() {
        let rule = CrossFieldRule::new(["password"], "nowhere", "x", |_| true);
        let result = passwords().rule(rule).build();
        assert!(matches!(result, Err(AuthFormError::UnknownField(name)) if name == "nowhere"));
    }

    #[test]
    fn test_rule_without_dependents_rejected() {
        let rule = CrossFieldRule::new(Vec::<String>::new(), "password", "x", |_| true);
        let result = passwords().rule(rule).build();
        assert!(matches!(result, Err(AuthFormError::InvalidRule(_))));
    }

    #[test]
    fn test_fields_equal_holds() {
        let rule = CrossFieldRule::fields_equal("a", "b", "differ");
        let mut values = HashMap::new();
        values.insert("a".to_string(), FieldValue::from("x"));
        values.insert("b".to_string(), FieldValue::from("x"));
        assert!(rule.holds(&values));
        values.insert("b".to_string(), FieldValue::from("y"));
        assert!(!rule.holds(&values));
        values.remove("b");
        assert!(!rule.holds(&values));
    }

    #[test]
    fn test_initial_values() {
        let schema = FormSchema::builder("test")
            .field(FieldSpec::new("email", FieldKind::Email))
            .field(FieldSpec::new("terms", FieldKind::Boolean))
            .build()
            .unwrap();
        let initial = schema.initial_values();
        assert_eq!(initial.len(), 1);
        assert_eq!(initial.get("terms"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn test_redact_masks_secrets() {
        let schema = FormSchema::builder("test")
            .field(FieldSpec::new("email", FieldKind::Email))
            .field(FieldSpec::new("password", FieldKind::Password))
            .build()
            .unwrap();
        let mut values = HashMap::new();
        values.insert("email".to_string(), FieldValue::from("a@b.co"));
        values.insert("password".to_string(), FieldValue::from("hunter22"));
        let shown = schema.redact(&values);
        assert_eq!(shown.get("email").map(String::as_str), Some("a@b.co"));
        assert_eq!(shown.get("password").map(String::as_str), Some(REDACTED));
    }
}
