//! hyper-backed transport and graceful shutdown.
//!
//! Each request runs its dispatch in its own tokio task and waits for the
//! response on a oneshot channel. That gives three properties:
//!
//! 1. The response goes out as soon as something writes it, even while
//!    middleware is still unwinding.
//! 2. A handler that errors, panics or drops every `Response` handle without
//!    writing closes the channel; the service then returns `Err` and hyper
//!    aborts that connection. Nothing else is affected.
//! 3. A handler that keeps a `Response` clone alive keeps the request open
//!    until it writes.
//!
//! On SIGTERM or Ctrl-C the server stops accepting, asks every open
//! connection to close once its in-flight request is answered, waits for
//! them, then returns from [`Server::serve`].

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tracing::{error, info};

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::Error;
use crate::router::Router;
use crate::transport::{Incoming, Outgoing, ResponseSink};

type HttpResponse = http::Response<Full<Bytes>>;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    ///
    /// ```rust,no_run
    /// use switchyard::Server;
    /// let server = Server::bind("0.0.0.0:3000");
    /// ```
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    pub fn from_config(config: &Config) -> Self {
        Self { addr: config.addr }
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        serve_with_shutdown(listener, router, shutdown_signal()).await
    }
}

/// Serves `router` on an already-bound listener until `signal` resolves,
/// then drains in-flight connections.
pub async fn serve_with_shutdown(
    listener: TcpListener,
    router: Router,
    signal: impl Future<Output = ()>,
) -> Result<(), Error> {
    let dispatcher = Arc::new(Dispatcher::new(router));
    info!(addr = %listener.local_addr()?, ?dispatcher, "switchyard listening");

    let mut tasks = tokio::task::JoinSet::new();
    let (drain_tx, drain_rx) = watch::channel(());
    tokio::pin!(signal);

    loop {
        tokio::select! {
            biased;

            () = &mut signal => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let dispatcher = Arc::clone(&dispatcher);
                let io = TokioIo::new(stream);

                let mut draining = drain_rx.clone();

                tasks.spawn(async move {
                    let svc = service_fn(move |req| {
                        let dispatcher = Arc::clone(&dispatcher);
                        async move { exchange(dispatcher, req, peer).await }
                    });

                    let builder = ConnBuilder::new(TokioExecutor::new());
                    let conn = builder.serve_connection(io, svc);
                    tokio::pin!(conn);

                    // Idle keep-alive connections would otherwise hold up the drain.
                    let result = tokio::select! {
                        res = conn.as_mut() => res,
                        _ = draining.changed() => {
                            conn.as_mut().graceful_shutdown();
                            conn.await
                        }
                    };
                    if let Err(e) = result {
                        error!(%peer, "connection error: {e}");
                    }
                });
            }

            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);
    let _ = drain_tx.send(());
    while tasks.join_next().await.is_some() {}

    info!("switchyard stopped");
    Ok(())
}

// ── Request exchange ──────────────────────────────────────────────────────────

/// Runs one dispatch and waits for its response.
async fn exchange(
    dispatcher: Arc<Dispatcher>,
    req: hyper::Request<hyper::body::Incoming>,
    peer: SocketAddr,
) -> Result<HttpResponse, Error> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await.map_err(Error::handler)?.to_bytes();
    let incoming = Incoming {
        method: parts.method,
        path: parts.uri.path().to_owned(),
        query: parts.uri.query().map(str::to_owned),
        headers: parts.headers,
        body,
    };

    let (tx, rx) = oneshot::channel();
    let task = tokio::spawn(async move { dispatcher.dispatch(incoming, Box::new(ChannelSink(tx))).await });

    match rx.await {
        Ok(response) => Ok(response),
        Err(_) => {
            let error = match task.await {
                Ok(Err(e)) => e,
                Ok(Ok(_)) => Error::Closed,
                Err(join) => Error::handler(join.to_string()),
            };
            error!(%peer, "dispatch aborted: {error}");
            Err(error)
        }
    }
}

/// Hands the finished response to the waiting hyper service.
struct ChannelSink(oneshot::Sender<HttpResponse>);

impl ResponseSink for ChannelSink {
    fn write(self: Box<Self>, response: Outgoing) -> Result<(), Error> {
        let status = http::StatusCode::from_u16(response.status)
            .map_err(|_| Error::InvalidStatus(response.status))?;
        let mut builder = http::Response::builder().status(status);
        if let Some(content_type) = response.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let response = builder.body(Full::new(response.body))?;
        self.0.send(response).map_err(|_| Error::Closed)
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or Ctrl-C. On non-Unix platforms only
/// Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
