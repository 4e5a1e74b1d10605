//! Terminal error stage at the handler boundary
//!
//! Handlers are fallible; the rest of the chain speaks responses. The
//! [`ErrorHandler`] adapts one to the other: it catches `Err` results
//! and panics, runs message sanitization around logging (a message
//! quoting a URL must never crash whatever re-parses log text as a
//! pattern), and restores the original text in the rendered body.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{error, warn};

use crate::config::AppEnv;
use crate::error::{HttpError, HttpResult};
use crate::errors::normalize::{restore_error, sanitize_error};
use crate::errors::responses::error_response;
use crate::request::Request;
use crate::response::Response;

/// Converts handler failures into the uniform error response
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorHandler {
    env: AppEnv,
}

impl ErrorHandler {
    pub fn new(env: AppEnv) -> Self {
        Self { env }
    }

    /// Render an error as its terminal response, logging on the way.
    ///
    /// The error is sanitized before logging and restored before
    /// rendering, so the log path never sees a raw delimiter and the
    /// client never sees the marker.
    pub fn render(&self, error: HttpError) -> Response {
        let sanitized = sanitize_error(error);
        let status = sanitized.status_code();

        if status.is_server_error() {
            error!(status = %status, error = %sanitized, "request failed");
        } else {
            warn!(status = %status, error = %sanitized, "request rejected");
        }

        error_response(&restore_error(sanitized), self.env)
    }

    /// Run a fallible handler, converting `Err` and panics into the
    /// uniform body. This is the outermost stage around the handler.
    pub async fn run<F, Fut>(&self, request: Request, handler: F) -> Response
    where
        F: FnOnce(Request) -> Fut + Send,
        Fut: Future<Output = HttpResult<Response>> + Send,
    {
        let outcome = AssertUnwindSafe(handler(request)).catch_unwind().await;

        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => self.render(error),
            Err(panic) => {
                let message = if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else if let Some(s) = panic.downcast_ref::<&str>() {
                    (*s).to_string()
                } else {
                    "unknown panic".to_string()
                };
                self.render(HttpError::internal(format!("handler panicked: {message}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseBody;
    use http::{HeaderMap, Method, StatusCode};
    use serde_json::Value;

    fn request() -> Request {
        Request::new(Method::GET, "/boom".parse().unwrap(), HeaderMap::new())
    }

    fn body_json(response: &Response) -> Value {
        match response.body() {
            ResponseBody::Json(value) => value.clone(),
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ok_results_pass_through_untouched() {
        let handler = ErrorHandler::new(AppEnv::Development);
        let response = handler
            .run(request(), |_req| async { Ok(Response::ok().text("fine")) })
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn errors_render_the_uniform_body() {
        let handler = ErrorHandler::new(AppEnv::Production);
        let response = handler
            .run(request(), |_req| async {
                Err(HttpError::internal("secret backend detail"))
            })
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(&response);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("detail").is_none());
    }

    #[tokio::test]
    async fn url_bearing_messages_round_trip_to_the_client() {
        let handler = ErrorHandler::new(AppEnv::Development);
        let response = handler
            .run(request(), |_req| async {
                Err(HttpError::internal("Error at https://example.com"))
            })
            .await;

        let body = body_json(&response);
        // The client sees the original text; the marker never leaks.
        assert_eq!(body["detail"], "Error at https://example.com");
        assert!(!body.to_string().contains("__//"));
    }

    #[tokio::test]
    async fn panics_become_generic_500s() {
        let handler = ErrorHandler::new(AppEnv::Production);
        let response = handler
            .run(request(), |_req| async { panic!("boom at https://x.y") })
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(&response);
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("detail").is_none());
    }
}
