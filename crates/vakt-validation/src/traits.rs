//! Core validation trait

use crate::error::ValidationResult;
use async_trait::async_trait;
use serde_json::Value;

/// A single validation rule applied to one value.
///
/// Rules receive the dot-joined field path they are reporting against;
/// cross-field refinements receive the whole (already normalized) object
/// as the value and the most specific relevant path as the field.
#[async_trait]
pub trait ValidationRule: Send + Sync {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()>;

    /// Rule name, for diagnostics
    fn rule_name(&self) -> &'static str;
}
