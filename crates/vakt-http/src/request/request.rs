//! The request type every pipeline stage operates on

use std::any::{Any, TypeId};
use std::collections::HashMap;

use http::{HeaderMap, Method, Uri};
use serde_json::{Map, Value};

use super::cookies;
use super::validation::Source;

/// Framework-owned request wrapping the `http` crate primitives.
///
/// The three data sources the pipeline sanitizes and validates (body,
/// query, route params) are held as JSON values so stages can rewrite
/// them wholesale; everything else passes through untouched. Extensions
/// carry per-request flags between stages without widening the type.
#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    body: Value,
    query: Value,
    params: Value,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Request {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        let query = parse_query(uri.query());
        Self {
            method,
            uri,
            headers,
            body: Value::Null,
            query,
            params: Value::Null,
            extensions: HashMap::new(),
        }
    }

    /// Attach an already-parsed JSON body
    pub fn with_json_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Attach route parameters extracted during dispatch
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        let map: Map<String, Value> = params
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect();
        self.params = Value::Object(map);
        self
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn query(&self) -> &Value {
        &self.query
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Read one of the three pipeline data sources
    pub fn source(&self, source: Source) -> &Value {
        match source {
            Source::Body => &self.body,
            Source::Query => &self.query,
            Source::Params => &self.params,
        }
    }

    /// Replace one of the three pipeline data sources wholesale; this is
    /// how the sanitizer and the validation gateway hand cleaned data to
    /// the next stage.
    pub fn set_source(&mut self, source: Source, value: Value) {
        match source {
            Source::Body => self.body = value,
            Source::Query => self.query = value,
            Source::Params => self.params = value,
        }
    }

    /// Header value as a string, if present and valid UTF-8. Lookup is
    /// case-insensitive per the underlying header map.
    pub fn header_string(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    /// Named cookie from the request `Cookie` header
    pub fn cookie(&self, name: &str) -> Option<String> {
        cookies::request_cookie(&self.headers, name)
    }

    /// A body field, when the body is a JSON object
    pub fn body_field(&self, name: &str) -> Option<&Value> {
        self.body.as_object().and_then(|map| map.get(name))
    }

    pub fn insert_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

/// Parse a raw query string into a JSON object of string values.
///
/// Duplicate keys keep the last occurrence, matching the urlencoded
/// map semantics downstream validation expects.
fn parse_query(raw: Option<&str>) -> Value {
    let Some(raw) = raw else {
        return Value::Object(Map::new());
    };

    let pairs: HashMap<String, String> = serde_urlencoded::from_str(raw).unwrap_or_default();
    let map: Map<String, Value> = pairs
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(uri: &str) -> Request {
        Request::new(Method::GET, uri.parse().unwrap(), HeaderMap::new())
    }

    #[test]
    fn parses_query_string_into_object() {
        let req = request("/ads?category=bikes&page=2");
        assert_eq!(req.query(), &json!({"category": "bikes", "page": "2"}));
        assert_eq!(req.path(), "/ads");
    }

    #[test]
    fn empty_query_is_an_empty_object() {
        let req = request("/ads");
        assert_eq!(req.query(), &json!({}));
    }

    #[test]
    fn sources_are_individually_replaceable() {
        let mut req = request("/ads?page=1").with_json_body(json!({"title": "Bike"}));

        assert_eq!(req.source(Source::Body), &json!({"title": "Bike"}));
        req.set_source(Source::Body, json!({"title": "Bike", "price": 10}));
        assert_eq!(req.body_field("price"), Some(&json!(10)));

        // Replacing one source leaves the others alone.
        assert_eq!(req.source(Source::Query), &json!({"page": "1"}));
    }

    #[test]
    fn params_become_a_string_object() {
        let mut params = HashMap::new();
        params.insert("id".to_string(), "42".to_string());
        let req = request("/ads/42").with_params(params);
        assert_eq!(req.params(), &json!({"id": "42"}));
    }

    #[test]
    fn extensions_are_typed_per_request_flags() {
        #[derive(Debug, PartialEq)]
        struct Marker(u32);

        let mut req = request("/");
        assert!(!req.has_extension::<Marker>());
        req.insert_extension(Marker(7));
        assert_eq!(req.get_extension::<Marker>(), Some(&Marker(7)));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("X-CSRF-Token", "tok".parse().unwrap());
        let req = Request::new(Method::POST, "/".parse().unwrap(), headers);
        assert_eq!(req.header_string("x-csrf-token").as_deref(), Some("tok"));
    }
}
