//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the place for
//! cross-cutting concerns: tracing, CORS, authentication.
//!
//! A middleware receives the request and a [`Next`] handle. It may answer on
//! its own (a CORS preflight, a rejected credential) or call
//! [`Next::run`] exactly once and post-process the response.
//!
//! Any `async fn(Request, Next) -> Response` is a middleware:
//!
//! ```rust
//! use gatehouse::middleware::Next;
//! use gatehouse::{Request, Response, Router};
//! use http::HeaderValue;
//!
//! async fn powered_by(req: Request, next: Next) -> Response {
//!     let mut res = next.run(req).await;
//!     res.headers_mut().insert("x-powered-by", HeaderValue::from_static("gatehouse"));
//!     res
//! }
//!
//! let app = Router::new().middleware(powered_by);
//! ```
//!
//! # Ordering
//!
//! Router middleware runs in registration order: the first one registered
//! sees the request first and the response last. The router gets there by
//! folding the list from last to first around the selected handler, so the
//! first registered ends up outermost.
//!
//! Built-in middleware:
//! - [`cors::Cors`]: cross-origin headers and preflight answers
//! - [`trace()`]: one span per request, closed with the status and latency
//! - [`Authenticator`](crate::auth::Authenticator): bearer-token gate

pub mod cors;
mod trace;

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, private};
use crate::request::Request;
use crate::response::Response;

pub use cors::Cors;
pub use trace::trace;

/// A transform around a handler.
///
/// Implemented for every `Fn(Request, Next) -> impl Future<Output = Response>`
/// and for the built-in gates.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin((self)(req, next))
    }
}

/// The rest of the chain, as seen from inside a middleware.
pub struct Next {
    handler: BoxedHandler,
}

impl Next {
    /// Runs the remaining middleware and the handler.
    ///
    /// Takes `self` so the rest of the chain can run at most once.
    pub async fn run(self, req: Request) -> Response {
        self.handler.call(req).await
    }
}

/// A handler wrapped in one middleware.
///
/// This is itself a [`Handler`], so wrapped handlers can be registered as
/// routes or wrapped again.
pub struct Layered {
    middleware: Arc<dyn Middleware>,
    next: BoxedHandler,
}

impl Layered {
    pub(crate) fn new(middleware: Arc<dyn Middleware>, next: BoxedHandler) -> Self {
        Self { middleware, next }
    }
}

impl ErasedHandler for Layered {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Next { handler: Arc::clone(&self.next) };
        self.middleware.call(req, next)
    }
}

impl private::Sealed for Layered {}

impl Handler for Layered {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

/// Wraps a single handler in `middleware`.
///
/// Use this for per-route middleware; [`Router::middleware`](crate::Router::middleware)
/// applies to every request.
pub fn wrap(middleware: impl Middleware, handler: impl Handler) -> Layered {
    Layered::new(Arc::new(middleware), handler.into_boxed_handler())
}
