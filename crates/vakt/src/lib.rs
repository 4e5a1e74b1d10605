//! # vakt
//!
//! The request/response safety pipeline: every inbound request passes
//! the CSRF guard, the deep payload sanitizer and the schema validation
//! gateway before its handler runs; responses flow back out through the
//! transparent cache, and every failure is rendered through one uniform
//! error surface with URL-safe message normalization.
//!
//! This crate re-exports the public surface of the member crates and
//! assembles the standard stage ordering.
//!
//! ```
//! use std::sync::Arc;
//! use vakt::{standard_pipeline, AppEnv, MemoryBackend, PipelineBuilder};
//!
//! let backend = Arc::new(MemoryBackend::with_defaults());
//! let pipeline = standard_pipeline(PipelineBuilder::new(AppEnv::Development).cache(backend));
//! assert_eq!(
//!     pipeline.names(),
//!     vec!["CsrfMiddleware", "SanitizeMiddleware", "ResponseCacheMiddleware"]
//! );
//! ```

use std::sync::Arc;

pub use vakt_http::config::AppEnv;
pub use vakt_http::error::{HttpError, HttpResult};
pub use vakt_http::errors::responses::{error_response, ErrorBody, FieldError};
pub use vakt_http::middleware::{ErrorHandler, Middleware, MiddlewarePipeline, Next, NextFuture};
pub use vakt_http::request::validation::{Source, ValidateMiddleware};
pub use vakt_http::request::Request;
pub use vakt_http::response::{Response, ResponseBody};
pub use vakt_http::routing::{codec, RouteMatch, RoutePattern, Router, SafePattern};

pub use vakt_validation::{
    Coerce, CustomValidator, DateRangeValidator, DateValidator, EmailValidator, Field,
    LengthValidator, NumericValidator, PatternValidator, RequiredValidator, Schema,
    SchemaRegistry, UnknownFields, ValidationError, ValidationErrors, ValidationRule,
};

pub use vakt_security::{
    sanitize_value, CsrfConfig, CsrfMiddleware, CsrfToken, SanitizeConfig, SanitizeMiddleware,
    SecurityHeadersMiddleware,
};

pub use vakt_cache::{
    CacheBackend, CacheBypass, MemoryBackend, ResponseCacheConfig, ResponseCacheMiddleware,
};

/// Ingredients for the standard stage ordering
pub struct PipelineBuilder {
    env: AppEnv,
    csrf: CsrfConfig,
    sanitize: SanitizeConfig,
    validation: Option<ValidateMiddleware>,
    cache: Option<Arc<dyn CacheBackend>>,
    cache_config: ResponseCacheConfig,
}

impl PipelineBuilder {
    pub fn new(env: AppEnv) -> Self {
        Self {
            env,
            csrf: CsrfConfig::default(),
            sanitize: SanitizeConfig::default(),
            validation: None,
            cache: None,
            cache_config: ResponseCacheConfig::default(),
        }
    }

    pub fn csrf(mut self, config: CsrfConfig) -> Self {
        self.csrf = config;
        self
    }

    pub fn sanitize(mut self, config: SanitizeConfig) -> Self {
        self.sanitize = config;
        self
    }

    /// Bound schemas for this route group
    pub fn validation(mut self, validation: ValidateMiddleware) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn cache(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(backend);
        self
    }

    pub fn cache_config(mut self, config: ResponseCacheConfig) -> Self {
        self.cache_config = config;
        self
    }
}

/// Assemble the documented stage order:
/// CSRF guard, payload sanitizer, validation gateway, then the response
/// cache innermost around the handler. The terminal error stage is not
/// a list entry; wrap the handler with [`ErrorHandler::run`] when
/// executing the pipeline.
pub fn standard_pipeline(builder: PipelineBuilder) -> MiddlewarePipeline {
    let mut pipeline = MiddlewarePipeline::new()
        .add(CsrfMiddleware::new(builder.csrf, builder.env))
        .add(SanitizeMiddleware::new(builder.sanitize));

    if let Some(validation) = builder.validation {
        pipeline = pipeline.add(validation);
    }

    if let Some(backend) = builder.cache {
        pipeline = pipeline.add(ResponseCacheMiddleware::new(backend, builder.cache_config));
    }

    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_order_matches_the_contract() {
        let backend: Arc<dyn CacheBackend> = Arc::new(MemoryBackend::with_defaults());
        let pipeline = standard_pipeline(
            PipelineBuilder::new(AppEnv::Development)
                .validation(ValidateMiddleware::new(AppEnv::Development))
                .cache(backend),
        );

        assert_eq!(
            pipeline.names(),
            vec![
                "CsrfMiddleware",
                "SanitizeMiddleware",
                "ValidateMiddleware",
                "ResponseCacheMiddleware",
            ]
        );
    }

    #[test]
    fn stages_are_individually_optional() {
        let pipeline = standard_pipeline(PipelineBuilder::new(AppEnv::Production));
        assert_eq!(pipeline.names(), vec!["CsrfMiddleware", "SanitizeMiddleware"]);
    }
}
