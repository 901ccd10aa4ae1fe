use std::time::Instant;

use tracing::{info, warn};

use super::Next;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// One structured event per request: method, path, status and latency.
///
/// Register it first so the latency covers the rest of the chain:
///
/// ```rust,no_run
/// use switchyard::{Router, middleware};
///
/// let app = Router::new().use_middleware(middleware::trace);
/// ```
pub async fn trace(req: Request, res: Response, next: Next) -> Result<(), Error> {
    let started = Instant::now();
    let result = next.run().await;
    let latency_us = started.elapsed().as_micros() as u64;

    match &result {
        Ok(()) => info!(
            method = %req.method(),
            path = req.path(),
            status = ?res.status_code(),
            latency_us,
            "request"
        ),
        Err(e) => warn!(
            method = %req.method(),
            path = req.path(),
            latency_us,
            error = %e,
            "request failed"
        ),
    }
    result
}
