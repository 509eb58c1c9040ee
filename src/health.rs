//! Liveness endpoint.
//!
//! ```rust,no_run
//! use gatehouse::{Router, health};
//!
//! let app = Router::new().get("/health", health::liveness);
//! ```

use http::StatusCode;
use serde_json::json;

use crate::{Request, Response};

/// Always answers `200 OK` with `{"status":"ok"}`. If the process can respond
/// at all it is alive, so this handler has no dependencies.
pub async fn liveness(_req: Request) -> Response {
    Response::to_json(StatusCode::OK, &json!({ "status": "ok" }))
}
