//! Unified error type.

use thiserror::Error;

/// The error type returned by switchyard's fallible operations.
///
/// A missing route is not an error: the dispatcher answers it with a `404`.
/// This type surfaces failures that abort a single dispatch (a handler or
/// middleware giving up, a broken transport) and infrastructure failures
/// such as binding a port or reading the configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("http: {0}")]
    Http(#[from] http::Error),

    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    /// The transport stopped waiting for the response.
    #[error("transport closed before the response was written")]
    Closed,

    /// A handler or middleware reported a failure.
    #[error("handler: {0}")]
    Handler(Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Wraps an application error so it can be returned from a handler or
    /// middleware with `?` via `.map_err(Error::handler)`.
    pub fn handler(e: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Handler(e.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Handler(Box::new(e))
    }
}
