use std::time::Instant;

use tracing::{Instrument, info, info_span};

use crate::middleware::Next;
use crate::request::Request;
use crate::response::Response;

/// Per-request span with method and path; logs status and latency on the way out.
///
/// ```rust,no_run
/// use gatehouse::{middleware, Router};
///
/// let app = Router::new().middleware(middleware::trace);
/// ```
pub async fn trace(req: Request, next: Next) -> Response {
    let span = info_span!("request", method = %req.method(), path = %req.path());
    let start = Instant::now();

    async move {
        let res = next.run(req).await;
        info!(
            status = res.status_code().as_u16(),
            latency_us = start.elapsed().as_micros() as u64,
            "handled",
        );
        res
    }
    .instrument(span)
    .await
}
