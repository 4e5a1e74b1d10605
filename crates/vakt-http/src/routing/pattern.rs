//! Route pattern parsing and matching
//!
//! Patterns use colon-named segments (`/users/:id`) with an optional
//! trailing catch-all (`/files/*path`). The parser is strict: a colon
//! anywhere except as a whole-segment parameter prefix is rejected, which
//! is exactly what makes a raw URL such as `https://example.com/users/:id`
//! unusable as a pattern. The hardened wrapper in [`super::safe`] exists
//! to absorb that class of input.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur while parsing a route pattern
#[derive(Error, Debug)]
pub enum RoutePatternError {
    #[error("Missing parameter name in segment '{0}'")]
    MissingParameterName(String),
    #[error("Unexpected ':' in segment '{0}'")]
    UnexpectedColon(String),
    #[error("Invalid parameter name '{0}'")]
    InvalidParameterName(String),
    #[error("Duplicate parameter name: {0}")]
    DuplicateParameter(String),
    #[error("Catch-all must be the last segment")]
    CatchAllNotLast,
    #[error("Catch-all segment must have a name")]
    UnnamedCatchAll,
}

/// A single path segment in a parsed pattern
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Static text, matched literally
    Static(String),
    /// Named parameter bound by position (`:id`)
    Parameter(String),
    /// Trailing catch-all (`*path`)
    CatchAll(String),
}

/// Parsed route pattern
#[derive(Debug, Clone)]
pub struct RoutePattern {
    pub segments: Vec<PathSegment>,
    pub param_names: Vec<String>,
    pub has_catch_all: bool,
    static_segments: usize,
}

/// Everything from the start of the `idx`-th non-empty segment to the end
/// of the path, slashes preserved.
fn tail_from_segment(path: &str, idx: usize) -> String {
    let bytes = path.as_bytes();
    let mut seen = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'/' {
            i += 1;
            continue;
        }
        if seen == idx {
            return path[i..].to_string();
        }
        while i < bytes.len() && bytes[i] != b'/' {
            i += 1;
        }
        seen += 1;
    }
    String::new()
}

fn is_valid_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl RoutePattern {
    /// Parse a pattern string, rejecting anything the matcher could not
    /// handle unambiguously.
    pub fn parse(path: &str) -> Result<Self, RoutePatternError> {
        let mut segments = Vec::new();
        let mut param_names = Vec::new();
        let mut has_catch_all = false;
        let mut static_segments = 0;
        let mut seen = HashSet::new();

        let raw_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for (index, segment) in raw_segments.iter().enumerate() {
            if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() {
                    return Err(RoutePatternError::MissingParameterName(segment.to_string()));
                }
                if !is_valid_param_name(name) {
                    return Err(RoutePatternError::InvalidParameterName(name.to_string()));
                }
                if !seen.insert(name.to_string()) {
                    return Err(RoutePatternError::DuplicateParameter(name.to_string()));
                }
                segments.push(PathSegment::Parameter(name.to_string()));
                param_names.push(name.to_string());
            } else if let Some(name) = segment.strip_prefix('*') {
                if name.is_empty() {
                    return Err(RoutePatternError::UnnamedCatchAll);
                }
                if index != raw_segments.len() - 1 {
                    return Err(RoutePatternError::CatchAllNotLast);
                }
                if !seen.insert(name.to_string()) {
                    return Err(RoutePatternError::DuplicateParameter(name.to_string()));
                }
                segments.push(PathSegment::CatchAll(name.to_string()));
                param_names.push(name.to_string());
                has_catch_all = true;
            } else {
                // A colon inside a literal segment is ambiguous matcher
                // syntax; refuse it rather than guess.
                if segment.contains(':') {
                    return Err(RoutePatternError::UnexpectedColon(segment.to_string()));
                }
                segments.push(PathSegment::Static(segment.to_string()));
                static_segments += 1;
            }
        }

        Ok(RoutePattern {
            segments,
            param_names,
            has_catch_all,
            static_segments,
        })
    }

    /// Check whether a concrete path matches this pattern
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Static(expected) => {
                    if parts.get(idx) != Some(&expected.as_str()) {
                        return false;
                    }
                }
                PathSegment::Parameter(_) => {
                    if parts.get(idx).is_none() {
                        return false;
                    }
                }
                PathSegment::CatchAll(_) => {
                    // Matches all remaining segments, including none.
                    return parts.len() >= idx;
                }
            }
        }

        parts.len() == self.segments.len()
    }

    /// Extract named parameter values from a matching path
    pub fn extract_params(&self, path: &str) -> HashMap<String, String> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = HashMap::new();

        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Static(_) => {}
                PathSegment::Parameter(name) => {
                    if let Some(value) = parts.get(idx) {
                        params.insert(name.clone(), (*value).to_string());
                    }
                }
                PathSegment::CatchAll(name) => {
                    // Slice the raw path so repeated slashes inside the
                    // tail survive verbatim.
                    params.insert(name.clone(), tail_from_segment(path, idx));
                    break;
                }
            }
        }

        params
    }

    /// Matching priority: lower is more specific. Static segments beat
    /// parameters, so the longest literal match wins during dispatch.
    pub fn priority(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| match segment {
                PathSegment::Static(_) => 1,
                PathSegment::Parameter(_) => 10,
                PathSegment::CatchAll(_) => 100,
            })
            .sum()
    }

    /// Whether this pattern is purely literal
    pub fn is_static(&self) -> bool {
        self.static_segments == self.segments.len()
    }
}
