//! Ordered request router.
//!
//! Routes are kept in registration order and scanned linearly: the first
//! route whose method matches *and* whose template matches the path wins.
//! There is no priority beyond that. Two routes that match the same paths are
//! not an error; the one registered first simply shadows the other.
//!
//! Middleware registered on the router wraps every request, including the
//! ones that end in `404`.

use std::borrow::Cow;
use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::trace;

use crate::context::PATH_PARAMS;
use crate::handler::{BoxedHandler, ErasedHandler, Handler};
use crate::middleware::{Layered, Middleware};
use crate::path::{Params, Template};
use crate::request::Request;
use crate::response::Response;

struct Route {
    method: Method,
    template: Template,
    handler: BoxedHandler,
}

/// The application router.
///
/// Build it once at startup and hand it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain.
pub struct Router {
    routes: Vec<Route>,
    middleware: Vec<Arc<dyn Middleware>>,
    not_found: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            middleware: Vec::new(),
            not_found: not_found.into_boxed_handler(),
        }
    }

    /// Register a handler for a method + template pair. Returns `self` for chaining.
    ///
    /// Parameters use `:name` syntax and `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// # use gatehouse::{Request, Response, Router};
    /// # use http::Method;
    /// # async fn get_list(_: Request) -> Response { Response::text("") }
    /// # async fn create_list(_: Request) -> Response { Response::text("") }
    /// # async fn delete_list(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,    "/lists/:id", get_list)
    ///     .on(Method::POST,   "/lists",     create_list)
    ///     .on(Method::DELETE, "/lists/:id", delete_list);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the template has a parameter with no name or the same
    /// parameter twice. Routes are registered at startup, so this surfaces
    /// before the server accepts anything.
    pub fn on(mut self, method: Method, template: &str, handler: impl Handler) -> Self {
        let template = Template::parse(template)
            .unwrap_or_else(|e| panic!("invalid route `{template}`: {e}"));
        self.routes.push(Route { method, template, handler: handler.into_boxed_handler() });
        self
    }

    pub fn get(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, template, handler)
    }

    pub fn post(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, template, handler)
    }

    pub fn put(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, template, handler)
    }

    pub fn patch(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, template, handler)
    }

    pub fn delete(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, template, handler)
    }

    /// Appends a middleware. Middleware runs in the order it was added.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Dispatches one request and produces its response.
    pub async fn handle(&self, req: Request) -> Response {
        let found = {
            let path = decode_path(req.path());
            self.lookup(req.method(), &path)
        };
        let (handler, req) = match found {
            Some((handler, params)) => (handler, req.with_value(PATH_PARAMS, params)),
            None => (Arc::clone(&self.not_found), req),
        };

        // Fold from last to first so the first-registered middleware is outermost.
        let handler = self.middleware.iter().rev().fold(handler, |next, mw| {
            Arc::new(Layered::new(Arc::clone(mw), next)) as BoxedHandler
        });

        handler.call(req).await
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, Params)> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                let params = route.template.matches(path)?;
                trace!(%method, path, template = %route.template, "route matched");
                Some((Arc::clone(&route.handler), params))
            })
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

async fn not_found(_req: Request) -> Response {
    Response::builder().status(StatusCode::NOT_FOUND).text("404 page not found")
}

/// Percent-decodes the request path. A path that does not decode to UTF-8 is
/// matched as sent.
fn decode_path(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}
