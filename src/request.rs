//! Incoming HTTP request façade.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method};

use crate::path::Params;
use crate::transport::Incoming;

/// An incoming HTTP request, normalised from the transport.
///
/// Built once per dispatch before any middleware runs and never modified
/// afterwards. Cloning is cheap: every clone shares the same request.
#[derive(Clone, Debug)]
pub struct Request {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
    raw_body: Bytes,
    body: String,
    params: Params,
}

impl Request {
    pub(crate) fn new(incoming: Incoming, params: Params) -> Self {
        let Incoming { method, path, query, headers, body } = incoming;
        let query = query.as_deref().map(parse_query).unwrap_or_default();
        let text = String::from_utf8_lossy(&body).into_owned();
        Self {
            inner: Arc::new(Inner { method, path, query, headers, raw_body: body, body: text, params }),
        }
    }

    pub fn method(&self) -> &Method { &self.inner.method }
    pub fn path(&self) -> &str { &self.inner.path }
    pub fn headers(&self) -> &HeaderMap { &self.inner.headers }

    /// The body decoded as UTF-8. Invalid sequences become `U+FFFD`.
    pub fn body(&self) -> &str { &self.inner.body }

    pub fn body_bytes(&self) -> &[u8] { &self.inner.raw_body }

    /// First value of the named header (case-insensitive), if present and
    /// valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers.get(name).and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.inner.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &Params { &self.inner.params }

    pub fn query(&self) -> &HashMap<String, String> { &self.inner.query }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.inner.query.get(key).map(String::as_str)
    }
}

/// Splits a raw query string into key/value pairs.
///
/// A pair is kept only when it is `key=value` with exactly one `=` and both
/// sides non-empty; anything else is dropped. Later duplicates overwrite
/// earlier ones. Nothing is percent-decoded.
pub(crate) fn parse_query(raw: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for pair in raw.split('&') {
        let mut parts = pair.split('=');
        if let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) {
            if !key.is_empty() && !value.is_empty() {
                map.insert(key.to_owned(), value.to_owned());
            }
        }
    }
    map
}
