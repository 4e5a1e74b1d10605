//! Transparent response cache at the handler boundary
//!
//! Sits innermost in the pipeline: a live entry short-circuits the
//! handler entirely and replays the stored status and body; a miss runs
//! the handler and writes the result through, but only for responses
//! below 400 on cacheable methods. Handlers never see the cache.
//!
//! Every backend failure is logged and treated as a miss or a no-op;
//! the request proceeds as if the cache did not exist.

use std::sync::Arc;
use std::time::Duration;

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vakt_http::middleware::{Middleware, Next, NextFuture};
use vakt_http::request::Request;
use vakt_http::response::Response;

use crate::CacheBackend;

/// Request extension: set by a handler or upstream stage to force-skip
/// both lookup and store for this request. Never client-visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBypass;

/// Pluggable cache-key derivation
pub type KeyFn = Arc<dyn Fn(&Request) -> String + Send + Sync>;

/// Serialized form of a cached response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub etag: String,
}

impl CachedResponse {
    fn from_response(response: &Response) -> Self {
        let body = response.body_bytes();
        let status = response.status_code().as_u16();
        Self {
            etag: make_etag(status, &body),
            status,
            content_type: response.content_type(),
            body,
        }
    }

    fn to_response(&self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        let mut response = Response::from_parts(status, self.content_type.as_deref(), &self.body);
        let _ = response.set_header("etag", &self.etag);
        let _ = response.set_header("x-cache", "HIT");
        response
    }
}

fn make_etag(status: u16, body: &[u8]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&status.to_be_bytes());
    hasher.update(body);
    format!("\"{}\"", hex::encode(&hasher.finalize().as_bytes()[..8]))
}

/// Response cache configuration
#[derive(Debug, Clone)]
pub struct ResponseCacheConfig {
    /// TTL for stored entries
    pub ttl: Duration,
    /// Methods eligible for caching
    pub cacheable_methods: Vec<Method>,
    /// Prefix namespacing this middleware's keys in a shared backend
    pub key_prefix: String,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            cacheable_methods: vec![Method::GET, Method::HEAD],
            key_prefix: "resp:".to_string(),
        }
    }
}

/// Caching stage wrapping the handler
pub struct ResponseCacheMiddleware {
    backend: Arc<dyn CacheBackend>,
    config: ResponseCacheConfig,
    key_fn: Option<KeyFn>,
}

impl ResponseCacheMiddleware {
    pub fn new(backend: Arc<dyn CacheBackend>, config: ResponseCacheConfig) -> Self {
        Self {
            backend,
            config,
            key_fn: None,
        }
    }

    pub fn with_defaults(backend: Arc<dyn CacheBackend>) -> Self {
        Self::new(backend, ResponseCacheConfig::default())
    }

    /// Replace the default `METHOD:path` key with a custom derivation,
    /// for responses that vary per caller.
    pub fn key_fn(mut self, key_fn: KeyFn) -> Self {
        self.key_fn = Some(key_fn);
        self
    }

    /// Key derivation: custom function when configured, else
    /// `METHOD:originalPath`.
    pub fn cache_key(&self, request: &Request) -> String {
        let raw = match &self.key_fn {
            Some(key_fn) => key_fn(request),
            None => format!("{}:{}", request.method, request.path()),
        };
        format!("{}{}", self.config.key_prefix, raw)
    }

    /// A key function varying on the query string and a set of request
    /// headers. Header values are hashed so the key stays bounded and
    /// opaque.
    pub fn vary_on(headers: Vec<String>) -> KeyFn {
        Arc::new(move |request: &Request| {
            let mut hasher = blake3::Hasher::new();
            if let Some(query) = request.query_string() {
                hasher.update(query.as_bytes());
            }
            for name in &headers {
                if let Some(value) = request.header_string(name) {
                    hasher.update(name.as_bytes());
                    hasher.update(b"=");
                    hasher.update(value.as_bytes());
                }
            }
            let digest = hex::encode(&hasher.finalize().as_bytes()[..16]);
            format!("{}:{}:{}", request.method, request.path(), digest)
        })
    }

    /// Drop one entry. Failures are logged and swallowed.
    pub async fn invalidate(&self, key: &str) {
        if let Err(err) = self.backend.forget(key).await {
            warn!(key, %err, "cache invalidate failed");
        }
    }

    /// Drop every entry. Failures are logged and swallowed.
    pub async fn invalidate_all(&self) {
        if let Err(err) = self.backend.flush().await {
            warn!(%err, "cache flush failed");
        }
    }

    fn is_cacheable(&self, request: &Request) -> bool {
        self.config.cacheable_methods.contains(&request.method)
            && !request.has_extension::<CacheBypass>()
    }

    /// Lookup, degrading any backend failure to a miss.
    async fn lookup(&self, key: &str) -> Option<CachedResponse> {
        match self.backend.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(cached) => Some(cached),
                Err(err) => {
                    warn!(key, %err, "cached entry undecodable, treating as miss");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(key, %err, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Write-through, degrading any failure to a no-op.
    async fn store(&self, key: &str, response: &Response) {
        let cached = CachedResponse::from_response(response);
        let bytes = match serde_json::to_vec(&cached) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key, %err, "cache serialization failed, skipping store");
                return;
            }
        };
        if let Err(err) = self.backend.put(key, bytes, Some(self.config.ttl)).await {
            warn!(key, %err, "cache store failed");
        }
    }
}

impl Clone for ResponseCacheMiddleware {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            config: self.config.clone(),
            key_fn: self.key_fn.clone(),
        }
    }
}

impl std::fmt::Debug for ResponseCacheMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCacheMiddleware")
            .field("config", &self.config)
            .field("custom_key", &self.key_fn.is_some())
            .finish()
    }
}

impl Middleware for ResponseCacheMiddleware {
    fn handle(&self, request: Request, next: Next) -> NextFuture<'static> {
        let stage = self.clone();
        Box::pin(async move {
            if !stage.is_cacheable(&request) {
                return next.run(request).await;
            }

            let key = stage.cache_key(&request);
            if let Some(cached) = stage.lookup(&key).await {
                debug!(key, "cache hit");
                return cached.to_response();
            }

            let mut response = next.run(request).await;

            // Error states are never written through; staleness is
            // bounded by TTL, not by luck.
            if response.status_code().as_u16() < 400 {
                stage.store(&key, &response).await;
                let _ = response.set_header("etag", &make_etag(
                    response.status_code().as_u16(),
                    &response.body_bytes(),
                ));
            }
            response
        })
    }

    fn name(&self) -> &'static str {
        "ResponseCacheMiddleware"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CacheError, CacheResult, MemoryBackend};
    use async_trait::async_trait;
    use http::HeaderMap;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::sleep;

    fn get(path: &str) -> Request {
        Request::new(Method::GET, path.parse().unwrap(), HeaderMap::new())
    }

    fn counting_next(counter: Arc<AtomicU32>) -> Next {
        Next::new(move |_req: Request| {
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Response::ok().json(json!({"widgets": [1, 2, 3]}))
            })
        })
    }

    fn stage() -> ResponseCacheMiddleware {
        ResponseCacheMiddleware::with_defaults(Arc::new(MemoryBackend::with_defaults()))
    }

    #[tokio::test]
    async fn second_get_within_ttl_skips_the_handler() {
        let stage = stage();
        let calls = Arc::new(AtomicU32::new(0));

        let first = stage.handle(get("/widgets"), counting_next(calls.clone())).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(first.header_string("x-cache").is_none());

        let second = stage.handle(get("/widgets"), counting_next(calls.clone())).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.header_string("x-cache").as_deref(), Some("HIT"));
        assert_eq!(second.body(), first.body());
        assert!(second.header_string("etag").is_some());
    }

    #[tokio::test]
    async fn post_always_invokes_the_handler() {
        let stage = stage();
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let request = Request::new(Method::POST, "/widgets".parse().unwrap(), HeaderMap::new());
            stage.handle(request, counting_next(calls.clone())).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entries_recompute() {
        let backend = Arc::new(MemoryBackend::with_defaults());
        let stage = ResponseCacheMiddleware::new(
            backend,
            ResponseCacheConfig {
                ttl: Duration::from_millis(30),
                ..ResponseCacheConfig::default()
            },
        );
        let calls = Arc::new(AtomicU32::new(0));

        stage.handle(get("/widgets"), counting_next(calls.clone())).await;
        sleep(Duration::from_millis(60)).await;
        stage.handle(get("/widgets"), counting_next(calls.clone())).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn error_responses_are_never_stored() {
        let stage = stage();
        let failing = Next::new(|_req: Request| {
            Box::pin(async move {
                Response::with_status(StatusCode::INTERNAL_SERVER_ERROR)
                    .json(json!({"success": false}))
            })
        });
        stage.handle(get("/widgets"), failing).await;

        // Next request misses and runs the handler again.
        let calls = Arc::new(AtomicU32::new(0));
        let response = stage.handle(get("/widgets"), counting_next(calls.clone())).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bypass_extension_skips_lookup_and_store() {
        let stage = stage();
        let calls = Arc::new(AtomicU32::new(0));

        // Warm the cache, then bypass it.
        stage.handle(get("/widgets"), counting_next(calls.clone())).await;

        let mut request = get("/widgets");
        request.insert_extension(CacheBypass);
        let response = stage.handle(request, counting_next(calls.clone())).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(response.header_string("x-cache").is_none());
    }

    #[tokio::test]
    async fn invalidate_forces_recompute() {
        let stage = stage();
        let calls = Arc::new(AtomicU32::new(0));

        stage.handle(get("/widgets"), counting_next(calls.clone())).await;
        stage.invalidate(&stage.cache_key(&get("/widgets"))).await;
        stage.handle(get("/widgets"), counting_next(calls.clone())).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn key_variation_separates_entries() {
        let stage = stage().key_fn(ResponseCacheMiddleware::vary_on(vec![
            "accept-language".to_string(),
        ]));
        let calls = Arc::new(AtomicU32::new(0));

        let mut en = get("/widgets");
        en.headers.insert("accept-language", "en".parse().unwrap());
        let mut de = get("/widgets");
        de.headers.insert("accept-language", "de".parse().unwrap());

        stage.handle(en, counting_next(calls.clone())).await;
        stage.handle(de, counting_next(calls.clone())).await;
        // Different variation axis, different entry: both computed.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Backend that fails every operation
    struct BrokenBackend;

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
        async fn put(&self, _key: &str, _value: Vec<u8>, _ttl: Option<Duration>) -> CacheResult<()> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
        async fn forget(&self, _key: &str) -> CacheResult<bool> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
        async fn exists(&self, _key: &str) -> CacheResult<bool> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
        async fn flush(&self) -> CacheResult<()> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn backend_failures_degrade_to_misses() {
        let stage = ResponseCacheMiddleware::with_defaults(Arc::new(BrokenBackend));
        let calls = Arc::new(AtomicU32::new(0));

        // Lookup and store both fail; the request still succeeds.
        let response = stage.handle(get("/widgets"), counting_next(calls.clone())).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // And invalidation is a silent no-op.
        stage.invalidate("resp:GET:/widgets").await;
        stage.invalidate_all().await;
    }
}
