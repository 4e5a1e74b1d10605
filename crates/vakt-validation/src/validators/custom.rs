//! Custom validation closures

use crate::error::ValidationResult;
use crate::traits::ValidationRule;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

type ValidationFn = Arc<dyn Fn(&Value, &str) -> ValidationResult<()> + Send + Sync>;

/// Validator wrapping a user-supplied closure.
///
/// Cross-field refinements are usually expressed with this: the schema
/// hands the whole normalized object as the value and the most specific
/// field path as the reporting target.
#[derive(Clone)]
pub struct CustomValidator {
    name: String,
    check: ValidationFn,
}

impl CustomValidator {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &str) -> ValidationResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for CustomValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomValidator")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl ValidationRule for CustomValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        (self.check)(value, field)
    }

    fn rule_name(&self) -> &'static str {
        "custom"
    }
}
