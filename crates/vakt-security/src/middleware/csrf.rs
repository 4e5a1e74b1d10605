//! CSRF guard: stateless double-submit cookie
//!
//! The server keeps no token store. One high-entropy token is issued as
//! an HTTP-only session cookie on the first request that lacks it; the
//! client proves same-origin script access by echoing the same value in
//! a header (or a reserved body field) on every mutating request. The
//! two copies must be byte-equal. The token is session-scoped and never
//! rotates on validation; the cookie's lifetime is the rotation
//! boundary.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use http::Method;
use rand::RngCore;
use tracing::debug;

use vakt_http::config::AppEnv;
use vakt_http::error::HttpError;
use vakt_http::errors::responses::error_response;
use vakt_http::middleware::{Middleware, Next, NextFuture};
use vakt_http::request::cookies::{Cookie, SameSite};
use vakt_http::request::Request;
use vakt_http::response::Response;

use crate::config::CsrfConfig;
use crate::{SecurityError, SecurityResult};

/// Request extension exposing the plaintext token to the response
/// rendering layer (form embedding, script echo).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

/// CSRF protection stage
#[derive(Debug, Clone)]
pub struct CsrfMiddleware {
    config: CsrfConfig,
    env: AppEnv,
}

impl CsrfMiddleware {
    pub fn new(config: CsrfConfig, env: AppEnv) -> Self {
        Self { config, env }
    }

    pub fn with_defaults(env: AppEnv) -> Self {
        Self::new(CsrfConfig::default(), env)
    }

    /// Generate a fresh token: 32 bytes from the OS-seeded CSPRNG,
    /// url-safe base64 encoded.
    pub fn generate_token(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn is_safe_method(method: &Method) -> bool {
        matches!(method, &Method::GET | &Method::HEAD | &Method::OPTIONS)
    }

    /// Client-supplied token copy: dedicated header first, reserved
    /// body field as fallback.
    fn client_token(&self, request: &Request) -> Option<String> {
        if let Some(token) = request.header_string(&self.config.token_header) {
            return Some(token);
        }
        request
            .body_field(&self.config.body_field)
            .and_then(|value| value.as_str())
            .map(str::to_string)
    }

    /// Validate a mutating request against the cookie copy.
    ///
    /// Missing cookie, missing client copy and mismatch are deliberately
    /// indistinguishable: one generic failure, no hint which half was
    /// absent. Empty values count as absent, so an empty-for-empty pair
    /// never validates.
    pub fn validate_token(&self, request: &Request) -> SecurityResult<()> {
        let expected = request
            .cookie(&self.config.cookie_name)
            .filter(|token| !token.is_empty());
        let provided = self.client_token(request).filter(|token| !token.is_empty());

        match (expected, provided) {
            (Some(expected), Some(provided)) if expected == provided => Ok(()),
            _ => Err(SecurityError::CsrfValidationFailed),
        }
    }

    fn issue_cookie(&self, response: &mut Response, token: &str) {
        let cookie = Cookie::new(&self.config.cookie_name, token)
            .http_only(true)
            .secure(self.env.is_production())
            .same_site(SameSite::Strict);
        // Cookie values are url-safe base64; this cannot fail.
        let _ = response.add_cookie(&cookie);
    }

    fn expose_token(&self, response: &mut Response, token: &str) {
        let _ = response.set_header("x-csrf-token", token);
    }
}

impl Middleware for CsrfMiddleware {
    fn handle(&self, mut request: Request, next: Next) -> NextFuture<'static> {
        let stage = self.clone();
        Box::pin(async move {
            let existing = request.cookie(&stage.config.cookie_name);
            let issued = existing.is_none().then(|| stage.generate_token());
            let token = existing.clone().or_else(|| issued.clone()).unwrap_or_default();

            request.insert_extension(CsrfToken(token.clone()));

            let must_validate = !Self::is_safe_method(&request.method)
                && !stage.config.is_exempt_path(request.path());

            if must_validate {
                if let Err(err) = stage.validate_token(&request) {
                    debug!(path = request.path(), "{err}");
                    let mut response = error_response(&HttpError::CsrfRejected, stage.env);
                    // The rejection still carries a usable cookie so the
                    // client can retry with matching copies.
                    if issued.is_some() {
                        stage.issue_cookie(&mut response, &token);
                    }
                    stage.expose_token(&mut response, &token);
                    return response;
                }
            }

            let mut response = next.run(request).await;
            if issued.is_some() {
                stage.issue_cookie(&mut response, &token);
            }
            stage.expose_token(&mut response, &token);
            response
        })
    }

    fn name(&self) -> &'static str {
        "CsrfMiddleware"
    }
}
