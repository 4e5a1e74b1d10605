//! Security response headers

use vakt_http::middleware::{Middleware, Next, NextFuture};
use vakt_http::request::Request;

use crate::config::SecurityHeadersConfig;

/// Applies the configured security headers to every response.
///
/// Headers already set further in are left alone so a handler can
/// override the defaults per response.
#[derive(Debug, Clone, Default)]
pub struct SecurityHeadersMiddleware {
    config: SecurityHeadersConfig,
}

impl SecurityHeadersMiddleware {
    pub fn new(config: SecurityHeadersConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }
}

impl Middleware for SecurityHeadersMiddleware {
    fn handle(&self, request: Request, next: Next) -> NextFuture<'static> {
        let config = self.config.clone();
        Box::pin(async move {
            let mut response = next.run(request).await;

            let headers = [
                ("x-content-type-options", &config.x_content_type_options),
                ("x-frame-options", &config.x_frame_options),
                ("referrer-policy", &config.referrer_policy),
                ("content-security-policy", &config.content_security_policy),
            ];
            for (name, value) in headers {
                if let Some(value) = value {
                    if response.headers.get(name).is_none() {
                        let _ = response.set_header(name, value);
                    }
                }
            }

            response
        })
    }

    fn name(&self) -> &'static str {
        "SecurityHeadersMiddleware"
    }
}
