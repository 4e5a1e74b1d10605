//! Required field validator

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use async_trait::async_trait;
use serde_json::Value;

/// Validator that ensures a field is present and not empty
#[derive(Debug, Clone, Default)]
pub struct RequiredValidator {
    /// Custom error message
    pub message: Option<String>,
}

impl RequiredValidator {
    pub fn new() -> Self {
        Self { message: None }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Check if a value is considered empty
    fn is_empty(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(arr) => arr.is_empty(),
            Value::Object(obj) => obj.is_empty(),
            _ => false,
        }
    }
}

#[async_trait]
impl ValidationRule for RequiredValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        if self.is_empty(value) {
            let message = self
                .message
                .clone()
                .unwrap_or_else(|| format!("{} is required", field));

            Err(ValidationError::with_code(field, message, "required").into())
        } else {
            Ok(())
        }
    }

    fn rule_name(&self) -> &'static str {
        "required"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn rejects_null_and_blank_values() {
        let validator = RequiredValidator::new();

        for value in [json!(null), json!(""), json!("   "), json!([]), json!({})] {
            let result = validator.validate(&value, "email").await;
            assert!(result.is_err(), "expected rejection for {value}");
            assert!(result.unwrap_err().has_field("email"));
        }
    }

    #[tokio::test]
    async fn accepts_present_values() {
        let validator = RequiredValidator::new();

        // Zero and false are present values, not absences.
        for value in [json!("John"), json!(0), json!(false), json!(["tag"])] {
            assert!(validator.validate(&value, "field").await.is_ok());
        }
    }

    #[tokio::test]
    async fn custom_message_replaces_default() {
        let validator = RequiredValidator::with_message("This field cannot be empty");
        let errors = validator.validate(&Value::Null, "email").await.unwrap_err();
        assert_eq!(errors.errors[0].message, "This field cannot be empty");
        assert_eq!(errors.errors[0].code, "required");
    }
}
