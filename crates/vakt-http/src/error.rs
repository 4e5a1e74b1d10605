//! Pipeline error types
//!
//! The error taxonomy every stage reports through. Terminal rendering to
//! the wire shape lives in `errors::responses`; message sanitization for
//! logging lives in `errors::normalize`.

use http::StatusCode;
use thiserror::Error;
use vakt_validation::ValidationErrors;

/// Result type for pipeline operations
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors produced by pipeline stages and handlers
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("CSRF validation failed")]
    CsrfRejected,

    #[error("Access forbidden: {message}")]
    Forbidden { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("{errors}")]
    Validation { errors: ValidationErrors },

    #[error("Route pattern rejected: {message}")]
    RouteMatch { message: String },

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl HttpError {
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        HttpError::BadRequest {
            message: message.into(),
        }
    }

    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        HttpError::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found<T: Into<String>>(resource: T) -> Self {
        HttpError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn validation(errors: ValidationErrors) -> Self {
        HttpError::Validation { errors }
    }

    /// A route pattern that could not be compiled even after encoding.
    /// Logged server-side and rendered to the client as a plain not-found.
    pub fn route_match<T: Into<String>>(message: T) -> Self {
        HttpError::RouteMatch {
            message: message.into(),
        }
    }

    pub fn internal<T: Into<String>>(message: T) -> Self {
        HttpError::InternalError {
            message: message.into(),
        }
    }

    /// HTTP status code this error renders with
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            HttpError::CsrfRejected => StatusCode::FORBIDDEN,
            HttpError::Forbidden { .. } => StatusCode::FORBIDDEN,
            HttpError::NotFound { .. } => StatusCode::NOT_FOUND,
            HttpError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            HttpError::RouteMatch { .. } => StatusCode::NOT_FOUND,
            HttpError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for HttpError {
    fn from(errors: ValidationErrors) -> Self {
        HttpError::Validation { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(HttpError::CsrfRejected.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            HttpError::validation(ValidationErrors::new()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            HttpError::route_match("bad pattern").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
