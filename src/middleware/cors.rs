//! Cross-origin headers.
//!
//! [`Cors`] echoes the caller's `Origin` back verbatim and allows credentials.
//! That is as permissive as CORS gets; there is no allow-list. Put it first in
//! the chain so that preflights are answered before anything else runs and
//! every response, including 401s and 404s, carries the headers.

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ORIGIN,
};
use http::{HeaderMap, HeaderValue, Method, StatusCode};

use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Permissive CORS gate.
///
/// `OPTIONS` requests are answered with `204 No Content` and never reach the
/// handler. Every other request is passed through and the headers are added
/// to whatever comes back. The gate never rejects a request.
#[derive(Clone, Debug)]
pub struct Cors {
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    max_age: HeaderValue,
}

impl Default for Cors {
    fn default() -> Self {
        Self {
            allow_methods: HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS, PATCH"),
            allow_headers: HeaderValue::from_static("Content-Type, Authorization, X-Requested-With"),
            max_age: HeaderValue::from_static("3600"),
        }
    }
}

impl Cors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_methods(mut self, methods: HeaderValue) -> Self {
        self.allow_methods = methods;
        self
    }

    pub fn allow_headers(mut self, headers: HeaderValue) -> Self {
        self.allow_headers = headers;
        self
    }

    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = HeaderValue::from(seconds);
        self
    }

    fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        // No Origin header, nothing to echo.
        if let Some(origin) = origin {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        }
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers.insert(ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
    }
}

impl Middleware for Cors {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let origin = req.headers().get(ORIGIN).cloned();

        if req.method() == Method::OPTIONS {
            let mut res = Response::status(StatusCode::NO_CONTENT);
            self.apply(origin.as_ref(), res.headers_mut());
            return Box::pin(async move { res });
        }

        let cors = self.clone();
        Box::pin(async move {
            let mut res = next.run(req).await;
            cors.apply(origin.as_ref(), res.headers_mut());
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;

    use super::*;
    use crate::handler::Handler;
    use crate::middleware::wrap;

    fn request(method: Method, origin: Option<&str>) -> Request {
        let mut b = http::Request::builder().method(method).uri("/lists");
        if let Some(o) = origin {
            b = b.header("origin", o);
        }
        b.body(Bytes::new()).unwrap().into()
    }

    #[tokio::test]
    async fn preflight_short_circuits_with_no_content() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let handler = move |_req: Request| {
            seen.fetch_add(1, Ordering::SeqCst);
            async { StatusCode::OK }
        };

        let res = wrap(Cors::default(), handler)
            .into_boxed_handler()
            .call(request(Method::OPTIONS, Some("http://localhost:3000")))
            .await;

        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn passes_through_and_decorates() {
        let handler = |_req: Request| async { Response::text("lists") };

        let res = wrap(Cors::default(), handler)
            .into_boxed_handler()
            .call(request(Method::GET, Some("https://example.com")))
            .await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"lists");
        let h = res.headers();
        assert_eq!(h[ACCESS_CONTROL_ALLOW_ORIGIN], "https://example.com");
        assert_eq!(h[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(h[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, PUT, DELETE, OPTIONS, PATCH");
        assert_eq!(h[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Authorization, X-Requested-With");
        assert_eq!(h[ACCESS_CONTROL_MAX_AGE], "3600");
    }

    #[tokio::test]
    async fn decorates_error_responses_too() {
        let handler = |_req: Request| async { Response::error(StatusCode::UNAUTHORIZED, "nope") };

        let res = wrap(Cors::default(), handler)
            .into_boxed_handler()
            .call(request(Method::DELETE, Some("https://example.com")))
            .await;

        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://example.com");
    }

    #[tokio::test]
    async fn missing_origin_is_not_invented() {
        let handler = |_req: Request| async { StatusCode::OK };

        let res = wrap(Cors::default(), handler)
            .into_boxed_handler()
            .call(request(Method::GET, None))
            .await;

        assert!(res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn overrides_replace_defaults() {
        let cors = Cors::new()
            .allow_methods(HeaderValue::from_static("GET"))
            .allow_headers(HeaderValue::from_static("Content-Type"))
            .max_age(60);
        let mut headers = HeaderMap::new();
        cors.apply(None, &mut headers);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "60");
    }
}
