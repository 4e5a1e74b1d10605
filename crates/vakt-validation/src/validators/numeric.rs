//! Numeric value validators

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use async_trait::async_trait;
use serde_json::Value;

/// Validator for numeric constraints
#[derive(Debug, Clone, Default)]
pub struct NumericValidator {
    /// Minimum value (inclusive)
    pub min: Option<f64>,
    /// Maximum value (inclusive)
    pub max: Option<f64>,
    /// Allow only integers (no decimals)
    pub integer_only: bool,
    /// Custom error message
    pub message: Option<String>,
}

impl NumericValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum value constraint
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set maximum value constraint
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Set value range (min and max)
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Require integer values only
    pub fn integer_only(mut self, integer_only: bool) -> Self {
        self.integer_only = integer_only;
        self
    }

    /// Set custom error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Extract a numeric value; numeric strings count
    fn get_numeric_value(&self, value: &Value) -> Option<f64> {
        match value {
            Value::Number(num) => num.as_f64(),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    fn create_error_message(&self, field: &str, value: f64) -> String {
        if let Some(ref custom) = self.message {
            return custom.clone();
        }

        if self.integer_only && value.fract() != 0.0 {
            return format!("{} must be an integer", field);
        }

        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("{} must be between {} and {}", field, min, max),
            (Some(min), None) => format!("{} must be at least {}", field, min),
            (None, Some(max)) => format!("{} must be at most {}", field, max),
            (None, None) => format!("{} has invalid numeric value: {}", field, value),
        }
    }
}

#[async_trait]
impl ValidationRule for NumericValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        if value.is_null() {
            return Ok(());
        }

        let num = match self.get_numeric_value(value) {
            Some(n) => n,
            None => {
                return Err(ValidationError::with_code(
                    field,
                    format!("{} must be a numeric value", field),
                    "invalid_type",
                )
                .into());
            }
        };

        if !num.is_finite() {
            return Err(ValidationError::with_code(
                field,
                format!("{} must be a finite number", field),
                "invalid_number",
            )
            .into());
        }

        if self.integer_only && num.fract() != 0.0 {
            return Err(ValidationError::with_code(
                field,
                self.create_error_message(field, num),
                "not_integer",
            )
            .into());
        }

        if let Some(min) = self.min {
            if num < min {
                return Err(ValidationError::with_code(
                    field,
                    self.create_error_message(field, num),
                    "below_minimum",
                )
                .into());
            }
        }

        if let Some(max) = self.max {
            if num > max {
                return Err(ValidationError::with_code(
                    field,
                    self.create_error_message(field, num),
                    "above_maximum",
                )
                .into());
            }
        }

        Ok(())
    }

    fn rule_name(&self) -> &'static str {
        "numeric"
    }
}
