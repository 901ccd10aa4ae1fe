//! Middleware layer.
//!
//! Middleware runs before the route handler and is the place for
//! cross-cutting concerns: tracing, request-id checks, authentication-header
//! inspection. A middleware is any async function of the shape
//!
//! ```text
//! async fn name(req: Request, res: Response, next: Next) -> impl IntoResult
//! ```
//!
//! Calling `next.run().await` hands control to the next middleware in
//! registration order, and after the last one to the matched handler.
//! Returning without calling it ends the chain right there: nothing after
//! it runs and whatever it wrote to `res` is the answer.
//!
//! ```rust,no_run
//! use switchyard::{Error, Next, Request, Response, Router};
//!
//! async fn require_token(req: Request, res: Response, next: Next) -> Result<(), Error> {
//!     if req.header("authorization").is_none() {
//!         return res.status(401, "missing token");
//!     }
//!     next.run().await
//! }
//!
//! let app = Router::new().use_middleware(require_token);
//! ```
//!
//! `Next` is consumed by `run`, so a middleware continues the chain at most
//! once. Each middleware runs at most once per request.

mod trace;

use std::future::Future;
use std::sync::Arc;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, IntoResult};
use crate::request::Request;
use crate::response::Response;

pub use trace::trace;

#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, req: Request, res: Response, next: Next) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

/// Implemented for every valid middleware function. Sealed, like
/// [`Handler`](crate::Handler).
pub trait Middleware: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResult + Send + 'static,
{
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResult + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

struct FnMiddleware<F>(F);

impl<F, Fut, R> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResult + Send + 'static,
{
    fn call(&self, req: Request, res: Response, next: Next) -> BoxFuture {
        let fut = (self.0)(req, res, next);
        Box::pin(async move { fut.await.into_result() })
    }
}

// ── Chain ─────────────────────────────────────────────────────────────────────

/// The ordered, frozen middleware list shared by every dispatch.
#[derive(Clone, Default)]
pub(crate) struct MiddlewareChain {
    stack: Arc<[BoxedMiddleware]>,
}

impl MiddlewareChain {
    pub(crate) fn new(stack: Vec<BoxedMiddleware>) -> Self {
        Self { stack: stack.into() }
    }

    pub(crate) fn len(&self) -> usize {
        self.stack.len()
    }

    /// Runs the chain for one request, ending in `endpoint`.
    pub(crate) async fn run(
        &self,
        req: Request,
        res: Response,
        endpoint: BoxedHandler,
    ) -> Result<(), Error> {
        Next { stack: Arc::clone(&self.stack), cursor: 0, endpoint, req, res }
            .run()
            .await
    }
}

/// The rest of the chain after the current middleware.
///
/// Holds the request and response of the current dispatch, so continuing
/// takes no arguments.
pub struct Next {
    stack: Arc<[BoxedMiddleware]>,
    cursor: usize,
    endpoint: BoxedHandler,
    req: Request,
    res: Response,
}

impl Next {
    /// Runs the next middleware, or the handler if none is left.
    pub async fn run(self) -> Result<(), Error> {
        self.step().await
    }

    fn step(self) -> BoxFuture {
        let Some(middleware) = self.stack.get(self.cursor).map(Arc::clone) else {
            return self.endpoint.call(self.req, self.res);
        };
        let (req, res) = (self.req.clone(), self.res.clone());
        let next = Next { cursor: self.cursor + 1, ..self };
        middleware.call(req, res, next)
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("cursor", &self.cursor)
            .field("len", &self.stack.len())
            .finish()
    }
}
