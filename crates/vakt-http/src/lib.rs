//! # vakt-http
//!
//! Core request/response pipeline for the vakt safety middleware stack.
//! Provides the framework-owned request and response types, the ordered
//! middleware chain every inbound request passes through, hardened route
//! pattern matching, and the uniform error surface every outbound failure
//! is rendered with.

pub mod config;
pub mod error;
pub mod errors;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routing;

pub use config::AppEnv;
pub use error::{HttpError, HttpResult};
pub use errors::responses::{ErrorBody, FieldError};
pub use middleware::{ErrorHandler, Middleware, MiddlewarePipeline, Next, NextFuture};
pub use request::cookies::{Cookie, SameSite};
pub use request::validation::{Source, ValidateMiddleware};
pub use request::Request;
pub use response::{Response, ResponseBody};
pub use routing::{codec, RouteMatch, RoutePattern, RoutePatternError, Router, SafePattern};
