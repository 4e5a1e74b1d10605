//! Ordered middleware chain
//!
//! Stages implement [`Middleware`] and either pass a (possibly rewritten)
//! request to [`Next`] or return a terminal response themselves, which is
//! how the CSRF guard and the validation gateway short-circuit. The
//! chain is an explicit ordered list; there is no implicit shared
//! mutable request object.

pub mod error_handler;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

pub use error_handler::ErrorHandler;

/// Boxed future produced by middleware and handlers
pub type NextFuture<'a> = Pin<Box<dyn Future<Output = Response> + Send + 'a>>;

/// The rest of the chain, consumed by running it
pub struct Next {
    handler: Box<dyn FnOnce(Request) -> NextFuture<'static> + Send>,
}

impl Next {
    pub fn new<F>(handler: F) -> Self
    where
        F: FnOnce(Request) -> NextFuture<'static> + Send + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Run the remaining stages with the given request
    pub async fn run(self, request: Request) -> Response {
        (self.handler)(request).await
    }
}

/// One pipeline stage
pub trait Middleware: Send + Sync + std::fmt::Debug {
    /// Handle the request: forward through `next` or return a terminal
    /// response without calling it.
    fn handle(&self, request: Request, next: Next) -> NextFuture<'static>;

    /// Stage name, for diagnostics
    fn name(&self) -> &'static str {
        "Middleware"
    }
}

/// Ordered list of stages executed around a handler
#[derive(Debug, Clone, Default)]
pub struct MiddlewarePipeline {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; stages run in insertion order
    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Append an already-shared stage
    pub fn add_shared(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Execute the chain around a handler.
    ///
    /// The chain is folded back-to-front so the first-added stage sees
    /// the request first and the response last.
    pub async fn execute<F, Fut>(&self, request: Request, handler: F) -> Response
    where
        F: FnOnce(Request) -> Fut + Send + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let mut chain = Box::new(move |req: Request| Box::pin(handler(req)) as NextFuture<'static>)
            as Box<dyn FnOnce(Request) -> NextFuture<'static> + Send>;

        for middleware in self.middleware.iter().rev() {
            let middleware = middleware.clone();
            let next_handler = chain;
            chain = Box::new(move |req: Request| {
                let next = Next::new(next_handler);
                middleware.handle(req, next)
            });
        }

        chain(request).await
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Stage names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, StatusCode};

    fn request() -> Request {
        Request::new(Method::GET, "/test".parse().unwrap(), HeaderMap::new())
    }

    /// Marks the request on the way in, the response on the way out
    #[derive(Debug)]
    struct TagMiddleware {
        tag: &'static str,
    }

    impl Middleware for TagMiddleware {
        fn handle(&self, mut request: Request, next: Next) -> NextFuture<'static> {
            let tag = self.tag;
            Box::pin(async move {
                request
                    .headers
                    .append("x-seen-by", tag.parse().unwrap());
                let mut response = next.run(request).await;
                response
                    .headers
                    .append("x-wrapped-by", tag.parse().unwrap());
                response
            })
        }

        fn name(&self) -> &'static str {
            self.tag
        }
    }

    /// Terminates without calling next
    #[derive(Debug)]
    struct RejectMiddleware;

    impl Middleware for RejectMiddleware {
        fn handle(&self, _request: Request, _next: Next) -> NextFuture<'static> {
            Box::pin(async { Response::with_status(StatusCode::FORBIDDEN) })
        }

        fn name(&self) -> &'static str {
            "reject"
        }
    }

    #[tokio::test]
    async fn stages_run_in_insertion_order() {
        let pipeline = MiddlewarePipeline::new()
            .add(TagMiddleware { tag: "first" })
            .add(TagMiddleware { tag: "second" });

        let response = pipeline
            .execute(request(), |req| async move {
                let seen: Vec<_> = req
                    .headers
                    .get_all("x-seen-by")
                    .iter()
                    .map(|v| v.to_str().unwrap().to_string())
                    .collect();
                assert_eq!(seen, ["first", "second"]);
                Response::ok()
            })
            .await;

        // Response headers wrap in reverse: innermost stage appends
        // first.
        let wrapped: Vec<_> = response
            .headers
            .get_all("x-wrapped-by")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(wrapped, ["second", "first"]);
    }

    #[tokio::test]
    async fn short_circuit_skips_handler_and_later_stages() {
        let pipeline = MiddlewarePipeline::new()
            .add(RejectMiddleware)
            .add(TagMiddleware { tag: "after" });

        let response = pipeline
            .execute(request(), |_req| async move {
                panic!("handler must not run");
            })
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        assert!(response.headers.get("x-wrapped-by").is_none());
    }

    #[tokio::test]
    async fn empty_pipeline_calls_handler_directly() {
        let pipeline = MiddlewarePipeline::new();
        assert!(pipeline.is_empty());

        let response = pipeline
            .execute(request(), |_req| async { Response::ok() })
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[test]
    fn names_reflect_stage_order() {
        let pipeline = MiddlewarePipeline::new()
            .add(TagMiddleware { tag: "first" })
            .add(RejectMiddleware);
        assert_eq!(pipeline.names(), vec!["first", "reject"]);
    }
}
