//! Shape-aware error text normalization
//!
//! Error messages routinely quote URLs. Logging and formatting layers
//! that re-interpret text as route patterns choke on the scheme
//! delimiter, so message text is encoded through the codec before an
//! error enters those paths and decoded again at the boundary where a
//! human finally reads it.
//!
//! Only message text is rewritten. Field paths, machine codes, status
//! codes and resource names are structure, not prose, and pass through
//! untouched.

use vakt_validation::{ValidationError, ValidationErrors};

use crate::error::HttpError;
use crate::routing::codec;

use super::responses::ErrorBody;

/// Encode the message text inside each known error shape.
pub fn sanitize_error(error: HttpError) -> HttpError {
    match error {
        HttpError::BadRequest { message } => HttpError::BadRequest {
            message: codec::encode(&message).into_owned(),
        },
        HttpError::Forbidden { message } => HttpError::Forbidden {
            message: codec::encode(&message).into_owned(),
        },
        HttpError::NotFound { resource } => HttpError::NotFound { resource },
        HttpError::Validation { errors } => HttpError::Validation {
            errors: sanitize_validation_errors(errors),
        },
        HttpError::RouteMatch { message } => HttpError::RouteMatch {
            message: codec::encode(&message).into_owned(),
        },
        HttpError::InternalError { message } => HttpError::InternalError {
            message: codec::encode(&message).into_owned(),
        },
        // No message text to rewrite.
        HttpError::CsrfRejected => HttpError::CsrfRejected,
    }
}

/// Exact inverse of [`sanitize_error`].
pub fn restore_error(error: HttpError) -> HttpError {
    match error {
        HttpError::BadRequest { message } => HttpError::BadRequest {
            message: codec::decode(&message).into_owned(),
        },
        HttpError::Forbidden { message } => HttpError::Forbidden {
            message: codec::decode(&message).into_owned(),
        },
        HttpError::NotFound { resource } => HttpError::NotFound { resource },
        HttpError::Validation { errors } => HttpError::Validation {
            errors: restore_validation_errors(errors),
        },
        HttpError::RouteMatch { message } => HttpError::RouteMatch {
            message: codec::decode(&message).into_owned(),
        },
        HttpError::InternalError { message } => HttpError::InternalError {
            message: codec::decode(&message).into_owned(),
        },
        HttpError::CsrfRejected => HttpError::CsrfRejected,
    }
}

fn sanitize_validation_errors(errors: ValidationErrors) -> ValidationErrors {
    ValidationErrors {
        errors: errors
            .errors
            .into_iter()
            .map(|e| ValidationError {
                field: e.field,
                message: codec::encode(&e.message).into_owned(),
                code: e.code,
            })
            .collect(),
    }
}

fn restore_validation_errors(errors: ValidationErrors) -> ValidationErrors {
    ValidationErrors {
        errors: errors
            .errors
            .into_iter()
            .map(|e| ValidationError {
                field: e.field,
                message: codec::decode(&e.message).into_owned(),
                code: e.code,
            })
            .collect(),
    }
}

/// Decode the message text of a rendered body in place.
///
/// Called at every exit point just before serialization, so the encoded
/// marker is never observable in a client-facing response.
pub fn restore_body(body: &mut ErrorBody) {
    body.message = codec::decode(&body.message).into_owned();
    if let Some(errors) = body.errors.as_mut() {
        for entry in errors {
            entry.message = codec::decode(&entry.message).into_owned();
        }
    }
    if let Some(detail) = body.detail.take() {
        body.detail = Some(codec::decode(&detail).into_owned());
    }
}
