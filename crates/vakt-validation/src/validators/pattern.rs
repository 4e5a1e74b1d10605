//! Regular-expression pattern validator

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

/// Validator matching string values against a regular expression
#[derive(Debug, Clone)]
pub struct PatternValidator {
    pattern: Regex,
    /// Custom error message
    pub message: Option<String>,
}

impl PatternValidator {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            message: None,
        })
    }

    pub fn from_regex(regex: Regex) -> Self {
        Self {
            pattern: regex,
            message: None,
        }
    }

    /// Set custom error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn pattern_string(&self) -> &str {
        self.pattern.as_str()
    }

    /// Alphanumeric strings only
    pub fn alphanumeric() -> Self {
        Self::new(r"^[a-zA-Z0-9]+$")
            .expect("alphanumeric pattern is valid")
            .message("Must contain only letters and numbers")
    }

    /// URL-safe slugs (lowercase, digits, dashes)
    pub fn slug() -> Self {
        Self::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$")
            .expect("slug pattern is valid")
            .message("Must be a lowercase slug")
    }
}

#[async_trait]
impl ValidationRule for PatternValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        if value.is_null() {
            return Ok(());
        }

        let text = match value.as_str() {
            Some(text) => text,
            None => {
                return Err(ValidationError::with_code(
                    field,
                    format!("{} must be a string for pattern validation", field),
                    "invalid_type",
                )
                .into());
            }
        };

        if !self.pattern.is_match(text) {
            let message = self
                .message
                .clone()
                .unwrap_or_else(|| format!("{} does not match the required pattern", field));
            return Err(ValidationError::with_code(field, message, "pattern_mismatch").into());
        }

        Ok(())
    }

    fn rule_name(&self) -> &'static str {
        "pattern"
    }
}
