//! Date parsing and range validators

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::Value;

fn parse_date(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    // Bare dates are taken as midnight UTC.
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Cross-field rule: one date field must come strictly after another.
///
/// Runs against the whole normalized object; violations are reported
/// against the end field, the most specific path for "ends before it
/// starts".
#[derive(Debug, Clone)]
pub struct DateRangeValidator {
    start_field: String,
    end_field: String,
    /// Custom error message
    pub message: Option<String>,
}

impl DateRangeValidator {
    pub fn new(start_field: impl Into<String>, end_field: impl Into<String>) -> Self {
        Self {
            start_field: start_field.into(),
            end_field: end_field.into(),
            message: None,
        }
    }

    /// Set custom error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The field path violations are reported against
    pub fn reported_field(&self) -> &str {
        &self.end_field
    }
}

#[async_trait]
impl ValidationRule for DateRangeValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        let object = match value.as_object() {
            Some(object) => object,
            None => return Ok(()),
        };

        // Both fields must be present, parseable strings before the
        // ordering check applies; per-field rules own those failures.
        let start = object
            .get(&self.start_field)
            .and_then(Value::as_str)
            .and_then(parse_date);
        let end = object
            .get(&self.end_field)
            .and_then(Value::as_str)
            .and_then(parse_date);

        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                let message = self.message.clone().unwrap_or_else(|| {
                    format!("{} must be after {}", self.end_field, self.start_field)
                });
                return Err(ValidationError::with_code(field, message, "date_out_of_range").into());
            }
        }

        Ok(())
    }

    fn rule_name(&self) -> &'static str {
        "date_range"
    }
}

/// Per-field rule: the value must be a parseable date string.
#[derive(Debug, Clone, Default)]
pub struct DateValidator {
    /// Custom error message
    pub message: Option<String>,
}

impl DateValidator {
    pub fn new() -> Self {
        Self { message: None }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[async_trait]
impl ValidationRule for DateValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        if value.is_null() {
            return Ok(());
        }

        let valid = value.as_str().and_then(parse_date).is_some();
        if !valid {
            let message = self
                .message
                .clone()
                .unwrap_or_else(|| format!("{} must be a valid date", field));
            return Err(ValidationError::with_code(field, message, "invalid_date").into());
        }

        Ok(())
    }

    fn rule_name(&self) -> &'static str {
        "date"
    }
}
