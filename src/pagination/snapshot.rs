//! Captured HTTP responses
//!
//! A response body can only be read once from the transport. Pages need to
//! look at it several times (counting, extracting markers, following links),
//! so every fetched response is read fully into a [`ResponseSnapshot`] first.

use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Body of an `application/json` response
    Json(Value),
    /// Any other body, stored verbatim
    Raw(Bytes),
}

/// Immutable capture of one HTTP response
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    request_url: Url,
    headers: HeaderMap,
    body: Body,
}

impl ResponseSnapshot {
    /// Create a snapshot from already-decoded parts
    pub fn new(request_url: Url, headers: HeaderMap, body: Body) -> Self {
        Self {
            request_url,
            headers,
            body,
        }
    }

    /// Create a snapshot from raw body bytes
    ///
    /// The body is parsed as JSON only when `Content-Type` is exactly
    /// `application/json`; otherwise the bytes are kept as-is.
    pub fn from_parts(request_url: Url, headers: HeaderMap, raw: Bytes) -> Result<Self> {
        let body = if is_json(&headers) {
            Body::Json(serde_json::from_slice(&raw)?)
        } else {
            Body::Raw(raw)
        };

        Ok(Self::new(request_url, headers, body))
    }

    /// Read a response to completion and capture it
    ///
    /// `request_url` is the URL the request was sent to. The response is
    /// consumed, so its body stream is released whether or not reading it
    /// succeeds.
    pub async fn from_response(request_url: Url, response: Response) -> Result<Self> {
        let headers = response.headers().clone();
        let raw = response.bytes().await?;
        Self::from_parts(request_url, headers, raw)
    }

    /// URL the response was fetched from
    pub fn request_url(&self) -> &Url {
        &self.request_url
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values of a header, in the order received
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Response body
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// JSON body, if the response was JSON
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            Body::Raw(_) => None,
        }
    }

    /// JSON body as an object, or a decode error
    pub fn json_object(&self) -> Result<&Map<String, Value>> {
        match &self.body {
            Body::Json(Value::Object(map)) => Ok(map),
            Body::Json(other) => Err(Error::decode(format!(
                "expected a JSON object, got {}",
                json_kind(other)
            ))),
            Body::Raw(_) => Err(Error::decode("response body is not JSON")),
        }
    }

    /// Decode the JSON body into a resource-specific type
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.body {
            Body::Json(value) => Ok(T::deserialize(value)?),
            Body::Raw(_) => Err(Error::decode("response body is not JSON")),
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct == "application/json")
}

/// Name of a JSON value's type, for error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
