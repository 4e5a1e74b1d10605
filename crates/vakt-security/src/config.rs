//! Security configuration types

use std::collections::HashSet;

/// CSRF guard configuration
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// Cookie carrying the server copy of the token
    pub cookie_name: String,
    /// Request header carrying the client copy
    pub token_header: String,
    /// Body field fallback when the header is absent
    pub body_field: String,
    /// Paths exempt from validation; a trailing `*` matches by prefix
    pub exempt_paths: HashSet<String>,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "csrf_token".to_string(),
            token_header: "x-csrf-token".to_string(),
            body_field: "_csrf".to_string(),
            exempt_paths: HashSet::new(),
        }
    }
}

impl CsrfConfig {
    pub fn exempt_path(mut self, path: impl Into<String>) -> Self {
        self.exempt_paths.insert(path.into());
        self
    }

    /// Whether a path is exempt from token validation
    pub fn is_exempt_path(&self, path: &str) -> bool {
        self.exempt_paths.iter().any(|exempt| {
            if let Some(prefix) = exempt.strip_suffix('*') {
                path.starts_with(prefix)
            } else {
                path == exempt
            }
        })
    }
}

/// Deep payload sanitizer configuration
#[derive(Debug, Clone)]
pub struct SanitizeConfig {
    /// Convert strings that end up empty after cleaning to null
    pub empty_string_to_null: bool,
    /// Structures nested deeper than this are treated as opaque leaves
    pub max_depth: usize,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            empty_string_to_null: true,
            max_depth: 32,
        }
    }
}

/// Security response headers configuration
#[derive(Debug, Clone)]
pub struct SecurityHeadersConfig {
    pub x_content_type_options: Option<String>,
    pub x_frame_options: Option<String>,
    pub referrer_policy: Option<String>,
    pub content_security_policy: Option<String>,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            x_content_type_options: Some("nosniff".to_string()),
            x_frame_options: Some("DENY".to_string()),
            referrer_policy: Some("strict-origin-when-cross-origin".to_string()),
            content_security_policy: Some("default-src 'self'".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exempt_paths_match_exactly_or_by_prefix() {
        let config = CsrfConfig::default()
            .exempt_path("/api/webhook")
            .exempt_path("/public/*");

        assert!(config.is_exempt_path("/api/webhook"));
        assert!(config.is_exempt_path("/public/assets/logo.png"));
        assert!(!config.is_exempt_path("/api/webhooks"));
        assert!(!config.is_exempt_path("/api/users"));
    }
}
