//! Simulated identity service.
//!
//! Stands in for a real authentication or registration endpoint: waits a
//! fixed delay, logs what it received with secrets masked, and accepts.

use std::time::Duration;

use async_trait::async_trait;

use authform_core::{AuthFormResult, Settings};
use authform_forms::schema::FormSchema;
use authform_forms::submission::{SubmissionOutcome, Submitter};
use authform_forms::validation::CleanedData;

/// An identity service that always accepts after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedIdentityService {
    schema: FormSchema,
    delay: Duration,
}

impl SimulatedIdentityService {
    /// Creates a service for the form described by `schema`.
    pub const fn new(schema: FormSchema, delay: Duration) -> Self {
        Self { schema, delay }
    }

    /// Creates a service using `submission_delay_ms` from the settings.
    pub fn from_settings(schema: FormSchema, settings: &Settings) -> Self {
        Self::new(schema, Duration::from_millis(settings.submission_delay_ms))
    }

    /// The configured delay.
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Submitter for SimulatedIdentityService {
    async fn submit(&self, values: CleanedData) -> AuthFormResult<SubmissionOutcome> {
        tokio::time::sleep(self.delay).await;
        tracing::info!(
            form = self.schema.name(),
            values = ?self.schema.redact(&values),
            "submission received"
        );
        Ok(SubmissionOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::sign_in_schema;
    use authform_forms::fields::FieldValue;

    #[tokio::test(start_paused = true)]
    async fn test_always_succeeds_after_delay() {
        let service = SimulatedIdentityService::new(sign_in_schema().unwrap(), Duration::from_secs(1));
        let mut values = CleanedData::new();
        values.insert("email".into(), FieldValue::from("a@b.co"));

        let start = tokio::time::Instant::now();
        let outcome = service.submit(values).await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::Success);
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[test]
    fn test_from_settings_delay() {
        let settings = Settings {
            submission_delay_ms: 250,
            ..Settings::default()
        };
        let service = SimulatedIdentityService::from_settings(sign_in_schema().unwrap(), &settings);
        assert_eq!(service.delay(), Duration::from_millis(250));
    }
}
