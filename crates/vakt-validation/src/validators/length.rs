//! Length validators for strings and arrays

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use async_trait::async_trait;
use serde_json::Value;

/// Validator for string/array length constraints
#[derive(Debug, Clone, Default)]
pub struct LengthValidator {
    /// Minimum length (inclusive)
    pub min: Option<usize>,
    /// Maximum length (inclusive)
    pub max: Option<usize>,
    /// Custom error message
    pub message: Option<String>,
}

impl LengthValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum length constraint
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    /// Set maximum length constraint
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Set length range (min and max)
    pub fn range(mut self, min: usize, max: usize) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Set custom error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Length of a value; strings count characters, not bytes
    fn get_length(&self, value: &Value) -> Option<usize> {
        match value {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(arr) => Some(arr.len()),
            _ => None,
        }
    }

    fn create_error_message(&self, field: &str, actual: usize) -> String {
        if let Some(ref custom) = self.message {
            return custom.clone();
        }

        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max => {
                format!("{} must be exactly {} characters long", field, min)
            }
            (Some(min), Some(max)) => {
                format!("{} must be between {} and {} characters long", field, min, max)
            }
            (Some(min), None) => format!("{} must be at least {} characters long", field, min),
            (None, Some(max)) => format!("{} must be at most {} characters long", field, max),
            (None, None) => format!("{} has invalid length: {}", field, actual),
        }
    }
}

#[async_trait]
impl ValidationRule for LengthValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        // Null is handled by RequiredValidator
        if value.is_null() {
            return Ok(());
        }

        let length = match self.get_length(value) {
            Some(len) => len,
            None => {
                return Err(ValidationError::with_code(
                    field,
                    format!("{} must be a string or array for length validation", field),
                    "invalid_type",
                )
                .into());
            }
        };

        if let Some(min) = self.min {
            if length < min {
                return Err(ValidationError::with_code(
                    field,
                    self.create_error_message(field, length),
                    "too_short",
                )
                .into());
            }
        }

        if let Some(max) = self.max {
            if length > max {
                return Err(ValidationError::with_code(
                    field,
                    self.create_error_message(field, length),
                    "too_long",
                )
                .into());
            }
        }

        Ok(())
    }

    fn rule_name(&self) -> &'static str {
        "length"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn enforces_string_bounds() {
        let validator = LengthValidator::new().range(2, 5);

        assert!(validator.validate(&json!("abc"), "name").await.is_ok());
        assert!(validator.validate(&json!("ab"), "name").await.is_ok());
        assert!(validator.validate(&json!("abcde"), "name").await.is_ok());

        let errors = validator.validate(&json!("a"), "name").await.unwrap_err();
        assert_eq!(errors.errors[0].code, "too_short");
        let errors = validator.validate(&json!("abcdef"), "name").await.unwrap_err();
        assert_eq!(errors.errors[0].code, "too_long");
    }

    #[tokio::test]
    async fn counts_characters_not_bytes() {
        let validator = LengthValidator::new().max(4);
        // Four characters, more than four bytes.
        assert!(validator.validate(&json!("héllo"), "name").await.is_err());
        assert!(validator.validate(&json!("héll"), "name").await.is_ok());
    }

    #[tokio::test]
    async fn applies_to_arrays_and_skips_null() {
        let validator = LengthValidator::new().min(1);
        assert!(validator.validate(&json!(["a"]), "tags").await.is_ok());
        assert!(validator.validate(&json!([]), "tags").await.is_err());
        assert!(validator.validate(&json!(null), "tags").await.is_ok());
        assert!(validator.validate(&json!(42), "tags").await.is_err());
    }
}
