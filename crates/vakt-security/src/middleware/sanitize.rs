//! Deep payload sanitizer
//!
//! Recursively walks the request's body, query and route params,
//! neutralizing script-injection content in every string leaf with an
//! allow-nothing policy: script blocks go first (content included), then
//! any remaining markup, event-handler attributes and `javascript:`
//! URIs. Cleaned strings are trimmed; strings that end up empty become
//! explicit nulls when configured. Non-string leaves pass through
//! untouched, and keys are never rewritten.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use vakt_http::middleware::{Middleware, Next, NextFuture};
use vakt_http::request::validation::Source;
use vakt_http::request::Request;

use crate::config::SanitizeConfig;

// Script blocks are removed with their content; a dangling open or
// close tag is removed as well.
static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("script pattern is valid"));
static SCRIPT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?script[^>]*>").expect("script tag pattern is valid"));
static EVENT_HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bon\w+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("event handler pattern is valid")
});
static JAVASCRIPT_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript\s*:").expect("javascript uri pattern is valid"));
static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"));

/// Strip injection content from one string
pub fn sanitize_text(text: &str, config: &SanitizeConfig) -> Value {
    let mut cleaned = SCRIPT_BLOCK.replace_all(text, "").into_owned();
    cleaned = SCRIPT_TAG.replace_all(&cleaned, "").into_owned();
    cleaned = EVENT_HANDLER.replace_all(&cleaned, "").into_owned();
    cleaned = MARKUP_TAG.replace_all(&cleaned, "").into_owned();
    cleaned = JAVASCRIPT_URI.replace_all(&cleaned, "").into_owned();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() && config.empty_string_to_null {
        Value::Null
    } else {
        Value::String(trimmed.to_string())
    }
}

fn sanitize_at_depth(value: &Value, config: &SanitizeConfig, depth: usize) -> Value {
    // Past the cap the value is an opaque leaf: strings still get
    // cleaned, structure passes through rather than risking unbounded
    // recursion.
    if depth >= config.max_depth {
        return match value {
            Value::String(text) => sanitize_text(text, config),
            other => other.clone(),
        };
    }

    match value {
        Value::String(text) => sanitize_text(text, config),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| sanitize_at_depth(item, config, depth + 1))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, item) in map {
                // Values only; keys are identifiers, not content.
                out.insert(key.clone(), sanitize_at_depth(item, config, depth + 1));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// Recursively sanitize a JSON value. Never fails; unexpected shapes
/// pass through as-is.
pub fn sanitize_value(value: &Value, config: &SanitizeConfig) -> Value {
    sanitize_at_depth(value, config, 0)
}

/// Pipeline stage applying the sanitizer to all three request sources
/// before any validator or handler sees them.
#[derive(Debug, Clone, Default)]
pub struct SanitizeMiddleware {
    config: SanitizeConfig,
}

impl SanitizeMiddleware {
    pub fn new(config: SanitizeConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }
}

impl Middleware for SanitizeMiddleware {
    fn handle(&self, mut request: Request, next: Next) -> NextFuture<'static> {
        let config = self.config.clone();
        Box::pin(async move {
            for source in [Source::Body, Source::Query, Source::Params] {
                let cleaned = sanitize_value(request.source(source), &config);
                request.set_source(source, cleaned);
            }
            next.run(request).await
        })
    }

    fn name(&self) -> &'static str {
        "SanitizeMiddleware"
    }
}
