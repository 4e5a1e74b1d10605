//! Schema validation gateway
//!
//! Binds named schemas to request sources and runs them as one pipeline
//! stage. Composite bindings (body + query + params) are all evaluated;
//! violations from every source land in a single combined error array
//! rather than failing fast on the first source. Success replaces each
//! validated section with the schema's normalized output; failure leaves
//! the request untouched and terminates the chain.

use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;
use vakt_validation::{Schema, ValidationErrors};

use crate::config::AppEnv;
use crate::error::HttpError;
use crate::errors::normalize::restore_body;
use crate::errors::responses::ErrorBody;
use crate::middleware::{Middleware, Next, NextFuture};
use crate::request::Request;
use crate::response::Response;

/// The three request sources a schema can bind to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Body,
    Query,
    Params,
}

/// Validation stage for one route's bound schemas
#[derive(Debug, Clone)]
pub struct ValidateMiddleware {
    bindings: Arc<Vec<(Source, Arc<Schema>)>>,
    env: AppEnv,
    failure_status: StatusCode,
}

impl ValidateMiddleware {
    pub fn new(env: AppEnv) -> Self {
        Self {
            bindings: Arc::new(Vec::new()),
            env,
            failure_status: StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Bind a schema to a source. Binding order is report order.
    pub fn bind(mut self, source: Source, schema: Arc<Schema>) -> Self {
        Arc::make_mut(&mut self.bindings).push((source, schema));
        self
    }

    /// Override the status validation failures render with
    pub fn failure_status(mut self, status: StatusCode) -> Self {
        self.failure_status = status;
        self
    }

    /// Validate every bound source against the request.
    ///
    /// Returns the per-source normalized outputs, or the combined error
    /// set. Nothing is written back here; the caller decides when the
    /// request may be mutated.
    pub async fn validate(
        &self,
        request: &Request,
    ) -> Result<Vec<(Source, Value)>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut outputs = Vec::with_capacity(self.bindings.len());

        for (source, schema) in self.bindings.iter() {
            match schema.validate(request.source(*source)).await {
                Ok(normalized) => outputs.push((*source, normalized)),
                Err(source_errors) => errors.merge(source_errors),
            }
        }

        if errors.is_empty() {
            Ok(outputs)
        } else {
            Err(errors)
        }
    }

    fn reject(&self, errors: ValidationErrors) -> Response {
        let error = HttpError::validation(errors);
        let mut body = ErrorBody::from_error(&error, self.env);
        restore_body(&mut body);
        Response::with_status(self.failure_status).json(body.to_value())
    }
}

impl Middleware for ValidateMiddleware {
    fn handle(&self, mut request: Request, next: Next) -> NextFuture<'static> {
        let stage = self.clone();
        Box::pin(async move {
            match stage.validate(&request).await {
                Ok(outputs) => {
                    // All sources passed; only now is the request
                    // rewritten.
                    for (source, normalized) in outputs {
                        request.set_source(source, normalized);
                    }
                    next.run(request).await
                }
                Err(errors) => stage.reject(errors),
            }
        })
    }

    fn name(&self) -> &'static str {
        "ValidateMiddleware"
    }
}
