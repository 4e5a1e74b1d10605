//! # vakt-security
//!
//! Security stages for the vakt request pipeline: the stateless
//! double-submit-cookie CSRF guard, the deep payload sanitizer, and the
//! standard security response headers.

pub mod config;
pub mod middleware;

use thiserror::Error;

pub use config::{CsrfConfig, SanitizeConfig, SecurityHeadersConfig};
pub use middleware::csrf::{CsrfMiddleware, CsrfToken};
pub use middleware::headers::SecurityHeadersMiddleware;
pub use middleware::sanitize::{sanitize_text, sanitize_value, SanitizeMiddleware};

/// Errors produced by security components
#[derive(Error, Debug)]
pub enum SecurityError {
    #[error("CSRF validation failed")]
    CsrfValidationFailed,

    #[error("Security configuration error: {message}")]
    ConfigError { message: String },
}

pub type SecurityResult<T> = Result<T, SecurityError>;
