//! The boundary between the dispatch core and an HTTP transport.
//!
//! A transport hands the dispatcher one [`Incoming`] per request together
//! with a [`ResponseSink`], and gets back at most one [`Outgoing`] through
//! that sink. Sockets, header parsing and body buffering all live on the
//! transport side; [`Server`](crate::Server) is the hyper-backed one.

use bytes::Bytes;
use http::{HeaderMap, Method};

/// An inbound request as delivered by the transport, body fully buffered.
#[derive(Clone, Debug, Default)]
pub struct Incoming {
    pub method: Method,
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Incoming {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), ..Self::default() }
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Appends a header. Invalid names or values are ignored.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::HeaderName::from_bytes(name.as_bytes()),
            http::HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// One complete response: status line, an optional `Content-Type`, the body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outgoing {
    pub status: u16,
    /// `None` leaves the header to the transport's default.
    pub content_type: Option<&'static str>,
    pub body: Bytes,
}

/// Where a response goes.
///
/// `write` sets status and headers, writes the body and closes the exchange
/// as a single operation. It takes `self` by value: a sink can be written at
/// most once.
pub trait ResponseSink: Send + 'static {
    fn write(self: Box<Self>, response: Outgoing) -> Result<(), crate::Error>;
}
