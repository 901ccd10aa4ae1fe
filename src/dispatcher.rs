//! Per-request dispatch: route lookup, middleware, handler.
//!
//! ```text
//! RECEIVED ──▶ MATCHING ──no route──▶ NOT_FOUND_RESPONDED   (404, middleware skipped)
//!                 │
//!                 ▼ route found
//!          MIDDLEWARE_RUNNING ──▶ HANDLING ──▶ RESPONDED
//! ```
//!
//! Middleware only ever sees requests that matched a route. Any error
//! returned by a middleware or handler is handed back to the transport, which
//! aborts that one connection without a response.

use tracing::{debug, warn};

use crate::error::Error;
use crate::middleware::MiddlewareChain;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::transport::{Incoming, ResponseSink};

const NOT_FOUND_BODY: &str = "404 Not Found";

/// How a dispatch ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No route matched; the fixed 404 response was written.
    NotFound,
    /// The chain ran and something wrote a response.
    Responded,
    /// The chain ran but nothing has written a response yet. A clone of the
    /// [`Response`] kept alive elsewhere may still do so.
    Unanswered,
}

/// The frozen routing and middleware configuration.
///
/// Holds no per-request state and is shared read-only across concurrent
/// dispatches (typically behind an `Arc`).
pub struct Dispatcher {
    router: Router,
    chain: MiddlewareChain,
}

impl Dispatcher {
    pub fn new(mut router: Router) -> Self {
        let chain = MiddlewareChain::new(std::mem::take(&mut router.middleware));
        Self { router, chain }
    }

    /// Handles one inbound request from receipt to response.
    pub async fn dispatch(
        &self,
        incoming: Incoming,
        sink: Box<dyn ResponseSink>,
    ) -> Result<Outcome, Error> {
        let Some((handler, params)) = self.router.lookup(&incoming.method, &incoming.path) else {
            debug!(method = %incoming.method, path = %incoming.path, "no route matched");
            Response::new(sink).finish(404, Some("text/plain"), NOT_FOUND_BODY)?;
            return Ok(Outcome::NotFound);
        };

        let req = Request::new(incoming, params);
        let res = Response::new(sink);
        self.chain.run(req.clone(), res.clone(), handler).await?;

        if res.is_sent() {
            Ok(Outcome::Responded)
        } else {
            warn!(method = %req.method(), path = req.path(), "chain finished without a response");
            Ok(Outcome::Unanswered)
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.router.len())
            .field("middleware", &self.chain.len())
            .finish()
    }
}

impl From<Router> for Dispatcher {
    fn from(router: Router) -> Self {
        Self::new(router)
    }
}
