//! Ordered route table and the registration API.
//!
//! Routes are tried in registration order and the first one whose method and
//! pattern both match wins. Registering the same method and pattern twice
//! keeps both; the earlier one shadows the later. Lookup is a linear scan,
//! which is fine for the handful of routes a service like this carries.
//!
//! Middleware is registered on the same builder and runs, in registration
//! order, for every request that matched a route.

use std::sync::Arc;

use http::Method;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{BoxedMiddleware, Middleware};
use crate::path::{Params, Pattern};

struct Route {
    method: Method,
    pattern: Pattern,
    handler: BoxedHandler,
}

/// The application: routes plus middleware.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve)
/// or [`Dispatcher::new`](crate::Dispatcher::new). It is frozen from then on.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    pub(crate) middleware: Vec<BoxedMiddleware>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + pattern pair. Returns `self` for chaining.
    ///
    /// Path parameters use `:name` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use switchyard::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request, _: Response) {}
    /// # async fn create_user(_: Request, _: Response) {}
    /// Router::new()
    ///     .on(Method::GET,  "/users/:id", get_user)
    ///     .on(Method::POST, "/users",     create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `pattern` has a parameter without a name or repeats a
    /// parameter name.
    pub fn on(mut self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        let pattern = Pattern::parse(pattern)
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"));
        self.routes.push(Route { method, pattern, handler: handler.into_boxed_handler() });
        self
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, pattern, handler)
    }

    /// Append a middleware to the chain. Returns `self` for chaining.
    pub fn use_middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(middleware.into_boxed_middleware());
        self
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, Params)> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                let params = route.pattern.matches(path)?;
                Some((Arc::clone(&route.handler), params))
            })
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field(
                "routes",
                &self.routes.iter().map(|r| format!("{} {}", r.method, r.pattern)).collect::<Vec<_>>(),
            )
            .field("middleware", &self.middleware.len())
            .finish()
    }
}
