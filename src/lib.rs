//! # switchyard
//!
//! A minimal HTTP request-dispatch core: match a route, thread the request
//! through an ordered middleware chain, hand a small request/response façade
//! to the handler.
//!
//! - **Routes** are `(method, pattern, handler)` triples tried in
//!   registration order; the first match wins. Patterns are `/`-separated,
//!   `:name` segments bind parameters, and a path must have exactly as many
//!   segments as the pattern.
//! - **Middleware** runs in registration order and must call
//!   `next.run().await` to continue. Not calling it ends the request there.
//! - **Responses** are write-once: the first `send`, `json` or `status` goes
//!   to the client, later ones are silently ignored.
//! - Requests that match no route get `404` with body `404 Not Found`
//!   without running any middleware.
//!
//! Sockets, HTTP parsing and body buffering belong to the transport. The
//! bundled [`Server`] uses hyper; anything else can drive a [`Dispatcher`]
//! through the types in [`transport`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use switchyard::{Error, Request, Response, Router, Server, middleware};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let app = Router::new()
//!         .use_middleware(middleware::trace)
//!         .get("/user/:id", get_user)
//!         .post("/echo", echo);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn get_user(req: Request, res: Response) -> Result<(), Error> {
//!     let id = req.param("id").unwrap_or("unknown");
//!     res.json(format!(r#"{{"user_id": "{id}"}}"#))
//! }
//!
//! async fn echo(req: Request, res: Response) -> Result<(), Error> {
//!     res.json_value(&serde_json::json!({ "you_sent": req.body() }))
//! }
//! ```

mod config;
mod dispatcher;
mod error;
mod handler;
mod path;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;
pub mod transport;

pub use config::{ADDR_ENV, Config};
pub use dispatcher::{Dispatcher, Outcome};
pub use error::Error;
pub use handler::{Handler, IntoResult};
pub use http::Method;
pub use middleware::{Middleware, Next};
pub use path::{Params, Pattern, PatternError, match_path};
pub use request::Request;
pub use response::Response;
pub use router::Router;
pub use server::{Server, serve_with_shutdown};
