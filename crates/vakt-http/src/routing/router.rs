//! Route table built on hardened patterns
//!
//! Registration accepts pattern text from configuration or code that may
//! embed full URLs. Compilation goes through [`SafePattern`]; a pattern
//! that still fails to compile is logged and skipped, so dispatch for it
//! falls through to not-found instead of poisoning the process.

use std::collections::HashMap;

use http::Method;
use tracing::{debug, warn};

use super::safe::{might_cause_issue, SafePattern};

/// Result of a successful dispatch lookup
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route_id: String,
    pub params: HashMap<String, String>,
}

#[derive(Debug)]
struct Route {
    id: String,
    method: Method,
    pattern: SafePattern,
    priority: usize,
}

/// Ordered route table
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
    // Compilation results are reused across registrations of the same
    // pattern text (route groups register overlapping prefixes a lot).
    compiled: HashMap<String, SafePattern>,
    sorted: bool,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route. Returns whether the pattern compiled; a rejected
    /// pattern is logged and the route is simply absent from dispatch.
    pub fn register(
        &mut self,
        method: Method,
        pattern: impl AsRef<str>,
        route_id: impl Into<String>,
    ) -> bool {
        let pattern = pattern.as_ref();
        let route_id = route_id.into();

        let compiled = match self.compiled.get(pattern) {
            Some(existing) => existing.clone(),
            None => match SafePattern::compile(pattern) {
                Ok(compiled) => {
                    self.compiled.insert(pattern.to_string(), compiled.clone());
                    compiled
                }
                Err(err) => {
                    warn!(pattern, route_id = %route_id, %err, "route pattern rejected");
                    return false;
                }
            },
        };

        if might_cause_issue(pattern) {
            debug!(pattern, "route pattern contains a bare colon");
        }

        let priority = compiled.priority();
        self.routes.push(Route {
            id: route_id,
            method,
            pattern: compiled,
            priority,
        });
        self.sorted = false;
        true
    }

    /// Find the best-matching route for a method and path. Ties are broken
    /// toward the most literal pattern.
    pub fn match_path(&mut self, method: &Method, path: &str) -> Option<RouteMatch> {
        if !self.sorted {
            self.routes.sort_by_key(|route| route.priority);
            self.sorted = true;
        }

        self.routes
            .iter()
            .find(|route| route.method == *method && route.pattern.matches(path))
            .map(|route| RouteMatch {
                route_id: route.id.clone(),
                params: route.pattern.extract_params(path),
            })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
