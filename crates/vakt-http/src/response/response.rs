//! The response type pipeline stages produce

use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, SET_COOKIE};
use http::StatusCode;
use serde_json::Value;

use crate::error::{HttpError, HttpResult};
use crate::request::cookies::Cookie;

/// Response body content
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    Text(String),
    Json(Value),
}

/// Framework-owned response wrapping the `http` crate primitives
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    pub headers: HeaderMap,
    body: ResponseBody,
}

impl Response {
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
        }
    }

    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// JSON body; sets the content type
    pub fn json(mut self, value: Value) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = ResponseBody::Json(value);
        self
    }

    /// Plain-text body; sets the content type
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        self.body = ResponseBody::Text(text.into());
        self
    }

    /// Set a header, replacing any previous value
    pub fn header(mut self, name: &str, value: &str) -> HttpResult<Self> {
        self.set_header(name, value)?;
        Ok(self)
    }

    /// Set a header on an existing response
    pub fn set_header(&mut self, name: &str, value: &str) -> HttpResult<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::internal(format!("invalid header name: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| HttpError::internal(format!("invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Append a `Set-Cookie` header; appends rather than replaces so
    /// multiple cookies survive on one response.
    pub fn add_cookie(&mut self, cookie: &Cookie) -> HttpResult<()> {
        let value = HeaderValue::from_str(&cookie.to_header_value())
            .map_err(|e| HttpError::internal(format!("invalid cookie value: {e}")))?;
        self.headers.append(SET_COOKIE, value);
        Ok(())
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn header_string(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    pub fn content_type(&self) -> Option<String> {
        self.header_string("content-type")
    }

    /// Serialized body bytes, for caching and transport
    pub fn body_bytes(&self) -> Vec<u8> {
        match &self.body {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Text(text) => text.as_bytes().to_vec(),
            ResponseBody::Json(value) => serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    /// Rebuild a response from cached status/content-type/bytes.
    ///
    /// JSON content is re-parsed so downstream serialization stays
    /// canonical; anything else is carried as text.
    pub fn from_parts(status: StatusCode, content_type: Option<&str>, body: &[u8]) -> Self {
        let response = Self::with_status(status);
        if body.is_empty() {
            return response;
        }

        match content_type {
            Some(ct) if ct.contains("application/json") => {
                match serde_json::from_slice::<Value>(body) {
                    Ok(value) => response.json(value),
                    Err(_) => response.text(String::from_utf8_lossy(body).into_owned()),
                }
            }
            _ => response.text(String::from_utf8_lossy(body).into_owned()),
        }
    }
}
