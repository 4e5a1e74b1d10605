//! Cookie parsing and serialization
//!
//! Just enough of RFC 6265 for the pipeline: reading name/value pairs
//! from a request `Cookie` header and rendering `Set-Cookie` values with
//! the attributes the CSRF guard needs.

use http::header::{HeaderMap, COOKIE};

/// `SameSite` cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// An outbound cookie with the attributes the pipeline sets.
///
/// No `Max-Age`/`Expires` support: every cookie this pipeline issues is
/// session-scoped.
#[derive(Debug, Clone)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            http_only: false,
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Render as a `Set-Cookie` header value
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}; Path={}", self.name, self.value, self.path);
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.secure {
            out.push_str("; Secure");
        }
        out.push_str("; SameSite=");
        out.push_str(self.same_site.as_str());
        out
    }
}

/// Read a named cookie's value out of the request headers.
///
/// Multiple `Cookie` headers are scanned in order; the first match wins.
pub fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((cookie_name, value)) = pair.trim().split_once('=') {
                if cookie_name == name {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn renders_set_cookie_attributes() {
        let cookie = Cookie::new("csrf_token", "abc123")
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Strict);

        assert_eq!(
            cookie.to_header_value(),
            "csrf_token=abc123; Path=/; HttpOnly; Secure; SameSite=Strict"
        );
    }

    #[test]
    fn session_cookies_carry_no_expiry() {
        let rendered = Cookie::new("csrf_token", "abc").to_header_value();
        assert!(!rendered.contains("Max-Age"));
        assert!(!rendered.contains("Expires"));
    }

    #[test]
    fn finds_named_cookie_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("session=xyz; csrf_token=tok-1; theme=dark"),
        );

        assert_eq!(request_cookie(&headers, "csrf_token").as_deref(), Some("tok-1"));
        assert_eq!(request_cookie(&headers, "theme").as_deref(), Some("dark"));
        assert!(request_cookie(&headers, "missing").is_none());
    }

    #[test]
    fn no_cookie_header_is_none() {
        let headers = HeaderMap::new();
        assert!(request_cookie(&headers, "csrf_token").is_none());
    }
}
