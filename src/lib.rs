//! # gatehouse
//!
//! The request-handling core of a JSON API server: an ordered router with
//! `:param` path templates, composable middleware, a per-request context, a
//! bearer-token authentication gate and a permissive CORS gate.
//!
//! ## The pieces
//!
//! - [`Router`] scans routes in registration order. The first route whose
//!   method and template match wins.
//! - [`Middleware`](middleware::Middleware) wraps every request, in the order
//!   it was registered, including requests that end in `404`.
//! - [`Context`] carries values such as the authenticated user id from
//!   middleware to handlers. Each request has its own.
//! - [`auth::Authenticator`] verifies HMAC-signed JWTs from the
//!   `Authorization` header or the session cookie.
//! - [`middleware::Cors`] echoes the caller's origin and answers preflights.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use gatehouse::auth::Authenticator;
//! use gatehouse::middleware::{self, Cors};
//! use gatehouse::{Config, Request, Response, Router, Server, health};
//! use http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gatehouse::Error> {
//!     let config = Config::from_env()?;
//!     let auth = Authenticator::from_config(&config);
//!
//!     let app = Router::new()
//!         .middleware(Cors::default())
//!         .middleware(middleware::trace)
//!         .get("/health", health::liveness)
//!         .get("/lists/:id", auth.protect(get_list));
//!
//!     Server::bind(config.addr()).serve(app).await
//! }
//!
//! async fn get_list(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or_default();
//!     let owner = req.user_id().unwrap_or_default();
//!     Response::to_json(StatusCode::OK, &serde_json::json!({ "id": id, "owner": owner }))
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod auth;
pub mod config;
pub mod context;
pub mod cookie;
pub mod health;
pub mod middleware;
pub mod path;

pub use config::Config;
pub use context::Context;
pub use cookie::Cookie;
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
