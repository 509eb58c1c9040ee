//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it. Middleware gets the
//! same value back from [`Next::run`](crate::middleware::Next::run) and may
//! add headers before passing it on.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, IntoHeaderName, SET_COOKIE};
use http::{HeaderMap, HeaderValue, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

use crate::cookie::Cookie;

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts
///
/// ```rust
/// use gatehouse::Response;
/// use http::StatusCode;
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// Response::error(StatusCode::FORBIDDEN, "You do not have access to this list");
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use gatehouse::Response;
/// use http::{header::LOCATION, HeaderValue, StatusCode};
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header(LOCATION, HeaderValue::from_static("/lists/42"))
///     .json(br#"{"id":42}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// `200 OK` with an `application/json` body.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK` with a `text/plain; charset=utf-8` body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { status: code, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// Serializes `value` as the JSON body with the given status.
    ///
    /// A value that fails to serialize becomes a bare `500`.
    pub fn to_json<T: Serialize + ?Sized>(code: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => Self::builder().status(code).json(bytes),
            Err(e) => {
                error!("response serialization failed: {e}");
                Self::status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// `{"error": message}` with the given status.
    pub fn error(code: StatusCode, message: &str) -> Self {
        Self::to_json(code, &serde_json::json!({ "error": message }))
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { status: StatusCode::OK, headers: HeaderMap::new() }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Appends a `Set-Cookie` header. Cookies that don't form a valid header
    /// value are dropped with an error log.
    pub fn set_cookie(&mut self, cookie: &Cookie) {
        append_cookie(&mut self.headers, cookie);
    }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method.
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn cookie(mut self, cookie: &Cookie) -> Self {
        append_cookie(&mut self.headers, cookie);
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish(HeaderValue::from_static("application/json"), body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(HeaderValue::from_static("text/plain; charset=utf-8"), Bytes::from(body.into()))
    }

    /// Terminate with no body (e.g. `204 No Content`).
    pub fn no_body(self) -> Response {
        Response { status: self.status, headers: self.headers, body: Bytes::new() }
    }

    fn finish(mut self, content_type: HeaderValue, body: Bytes) -> Response {
        self.headers.insert(CONTENT_TYPE, content_type);
        Response { status: self.status, headers: self.headers, body }
    }
}

fn append_cookie(headers: &mut HeaderMap, cookie: &Cookie) {
    match HeaderValue::try_from(cookie.to_string()) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(e) => error!(cookie = %cookie.name, "invalid cookie: {e}"),
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a status directly from a handler: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(res: &Response) -> serde_json::Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    #[test]
    fn error_has_json_error_field() {
        let res = Response::error(StatusCode::UNAUTHORIZED, "Authentication required");
        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_json(&res)["error"], "Authentication required");
    }

    #[test]
    fn to_json_keeps_status_and_shape() {
        let res = Response::to_json(StatusCode::CREATED, &serde_json::json!({"id": "123", "name": "Test"}));
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(body_json(&res)["name"], "Test");

        let list = Response::to_json(StatusCode::OK, &["item1", "item2", "item3"]);
        assert_eq!(body_json(&list).as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn set_cookie_appends() {
        let mut res = Response::status(StatusCode::OK);
        res.set_cookie(&Cookie::new("a", "1"));
        res.set_cookie(&Cookie::new("b", "2"));
        let all: Vec<_> = res.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(all, ["a=1", "b=2"]);
    }

    #[test]
    fn builder_cookie_and_body() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .cookie(&Cookie::new("jwt_token", "t").path("/"))
            .json(r#"{"ok":true}"#);
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(res.headers()[SET_COOKIE], "jwt_token=t; Path=/");
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn result_picks_matching_arm() {
        let ok: Result<&'static str, StatusCode> = Ok("fine");
        let err: Result<&'static str, StatusCode> = Err(StatusCode::FORBIDDEN);
        assert_eq!(ok.into_response().body(), b"fine");
        assert_eq!(err.into_response().status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn into_inner_carries_everything() {
        let res = Response::builder().status(StatusCode::ACCEPTED).text("queued").into_inner();
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    }
}
