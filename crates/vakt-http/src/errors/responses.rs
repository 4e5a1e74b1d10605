//! The uniform wire shape for failures
//!
//! Every failure leaving the pipeline renders as
//! `{"success": false, "message": ..., "errors"?: [{"path", "message"}]}`.
//! CSRF failures are 403 without `errors`; validation failures are
//! 422-class with `errors` populated; anything unhandled is a generic
//! 500 whose raw detail is included only outside production.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AppEnv;
use crate::error::HttpError;
use crate::response::Response;

/// One field violation in the wire shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

/// The uniform error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    /// Raw detail for operators; never serialized in production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Build the wire body for an error, applying the environment's
    /// detail policy.
    pub fn from_error(error: &HttpError, env: AppEnv) -> Self {
        match error {
            HttpError::Validation { errors } => Self {
                success: false,
                message: "Validation failed".to_string(),
                errors: Some(
                    errors
                        .iter()
                        .map(|e| FieldError {
                            path: e.field.clone(),
                            message: e.message.clone(),
                        })
                        .collect(),
                ),
                detail: None,
            },
            // Pattern rejections are an internal condition; clients see
            // a plain not-found.
            HttpError::RouteMatch { .. } => Self {
                success: false,
                message: "Resource not found".to_string(),
                errors: None,
                detail: None,
            },
            HttpError::InternalError { message } => Self {
                success: false,
                message: "Internal server error".to_string(),
                errors: None,
                detail: if env.is_production() {
                    None
                } else {
                    Some(message.clone())
                },
            },
            other => Self {
                success: false,
                message: other.to_string(),
                errors: None,
                detail: None,
            },
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({"success": false, "message": "Internal server error"})
        })
    }
}

/// Render an error as its terminal JSON response.
///
/// Message text is restored through the codec at this boundary, so the
/// internal marker never reaches a client.
pub fn error_response(error: &HttpError, env: AppEnv) -> Response {
    let mut body = ErrorBody::from_error(error, env);
    super::normalize::restore_body(&mut body);
    Response::with_status(error.status_code()).json(body.to_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use vakt_validation::{ValidationError, ValidationErrors};

    fn validation_error() -> HttpError {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::with_code("email", "Invalid email", "invalid_email"));
        errors.add(ValidationError::with_code("age", "Must be at least 0", "below_minimum"));
        HttpError::validation(errors)
    }

    #[test]
    fn csrf_renders_403_without_errors() {
        let response = error_response(&HttpError::CsrfRejected, AppEnv::Production);
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        let body = serde_json::to_value(ErrorBody::from_error(
            &HttpError::CsrfRejected,
            AppEnv::Production,
        ))
        .unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "CSRF validation failed");
        assert!(body.get("errors").is_none());
    }

    #[test]
    fn validation_renders_422_with_field_paths() {
        let error = validation_error();
        let response = error_response(&error, AppEnv::Production);
        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = ErrorBody::from_error(&error, AppEnv::Production);
        let errors = body.errors.unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path, "email");
        assert_eq!(errors[1].path, "age");
    }

    #[test]
    fn internal_detail_is_suppressed_in_production() {
        let error = HttpError::internal("db connection refused at 10.0.0.3");

        let dev = ErrorBody::from_error(&error, AppEnv::Development);
        assert_eq!(dev.detail.as_deref(), Some("db connection refused at 10.0.0.3"));

        let prod = ErrorBody::from_error(&error, AppEnv::Production);
        assert_eq!(prod.message, "Internal server error");
        assert!(prod.detail.is_none());

        let serialized = serde_json::to_string(&prod).unwrap();
        assert!(!serialized.contains("detail"));
        assert!(!serialized.contains("10.0.0.3"));
    }

    #[test]
    fn route_match_failures_render_as_not_found() {
        let error = HttpError::route_match("pattern '/x/:' rejected");
        let response = error_response(&error, AppEnv::Development);
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let body = ErrorBody::from_error(&error, AppEnv::Development);
        assert_eq!(body.message, "Resource not found");
        assert!(!body.to_value().to_string().contains("pattern"));
    }
}
