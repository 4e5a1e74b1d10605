//! Colon-hardened pattern compilation
//!
//! [`SafePattern`] wraps [`RoutePattern`] so that pattern text containing a
//! reserved scheme delimiter compiles instead of erroring: the pattern is
//! run through the codec before parsing, candidate paths are encoded the
//! same way before matching, and extracted parameter values are decoded
//! back before anyone sees them. For input without a delimiter the wrapper
//! behaves exactly like the plain parser.

use std::collections::HashMap;

use super::codec;
use super::pattern::{RoutePattern, RoutePatternError};

/// A route pattern compiled from possibly URL-bearing text
#[derive(Debug, Clone)]
pub struct SafePattern {
    inner: RoutePattern,
    original: String,
}

impl SafePattern {
    /// Compile a pattern, neutralizing reserved scheme delimiters first.
    ///
    /// Still fails for genuinely malformed parameter syntax (`/x/:`), but
    /// never for the delimiter itself.
    pub fn compile(pattern: &str) -> Result<Self, RoutePatternError> {
        let encoded = codec::encode(pattern);
        let inner = RoutePattern::parse(&encoded)?;
        Ok(SafePattern {
            inner,
            original: pattern.to_string(),
        })
    }

    /// The pattern text as supplied by the caller
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Parameter names in positional order
    pub fn param_names(&self) -> &[String] {
        &self.inner.param_names
    }

    /// Matching priority, see [`RoutePattern::priority`]
    pub fn priority(&self) -> usize {
        self.inner.priority()
    }

    /// Match a candidate path, encoding it the same way the pattern was
    pub fn matches(&self, path: &str) -> bool {
        self.inner.matches(&codec::encode(path))
    }

    /// Extract parameters from a matching path, decoded back to the
    /// caller's original text
    pub fn extract_params(&self, path: &str) -> HashMap<String, String> {
        self.inner
            .extract_params(&codec::encode(path))
            .into_iter()
            .map(|(name, value)| (name, codec::decode(&value).into_owned()))
            .collect()
    }
}

/// Diagnostic predicate: does this text contain a colon that is not part
/// of recognized `:name` parameter syntax?
///
/// Useful for logging suspicious route registrations; correctness never
/// depends on it.
pub fn might_cause_issue(text: &str) -> bool {
    for segment in text.split('/') {
        for (idx, ch) in segment.char_indices() {
            if ch != ':' {
                continue;
            }
            if idx != 0 {
                return true;
            }
            // Leading colon must introduce a parameter name.
            let mut rest = segment[idx + ch.len_utf8()..].chars();
            match rest.next() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
                _ => return true,
            }
        }
    }
    false
}
