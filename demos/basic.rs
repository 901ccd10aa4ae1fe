//! Minimal switchyard example — text and JSON endpoints behind a logging middleware.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic [config.toml]
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/user/42
//!   curl -X POST http://localhost:3000/echo -d 'hello "world"'
//!   curl http://localhost:3000/nope

use switchyard::{Config, Error, Next, Request, Response, Router, Server, middleware};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_env_overrides();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter.as_str().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = Router::new()
        .use_middleware(middleware::trace)
        .use_middleware(announce)
        .get("/", hello)
        .get("/user/:id", get_user)
        .post("/echo", echo);

    Server::from_config(&config).serve(app).await
}

async fn announce(req: Request, _res: Response, next: Next) -> Result<(), Error> {
    tracing::debug!(method = %req.method(), path = req.path(), query = ?req.query(), "incoming");
    next.run().await
}

// GET /
async fn hello(_req: Request, res: Response) -> Result<(), Error> {
    res.send("Hello from switchyard!")
}

// GET /user/:id
async fn get_user(req: Request, res: Response) -> Result<(), Error> {
    let id = req.param("id").unwrap_or("unknown");
    res.json(format!(r#"{{"user_id": "{id}"}}"#))
}

// POST /echo — only double quotes are escaped.
async fn echo(req: Request, res: Response) -> Result<(), Error> {
    let escaped = req.body().replace('"', "\\\"");
    res.json(format!(r#"{{"you_sent": "{escaped}"}}"#))
}
