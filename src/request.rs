//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;

use crate::context::{Context, Key, PATH_PARAMS, USER_ID};
use crate::path::Params;

/// An incoming HTTP request with its body fully buffered.
///
/// The request owns its [`Context`]. Adding a value consumes the request and
/// hands back a new one bound to the derived context; the original context is
/// never modified.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    context: Context,
}

impl Request {
    pub fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            context: Context::new(),
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn context(&self) -> &Context { &self.context }

    /// Header lookup. Values that are not visible ASCII read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Value of the first cookie called `name` across all `Cookie` headers.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(http::header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.trim_matches('"'))
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params()?.get(name)
    }

    /// All parameters bound by the matched route, if a route matched.
    pub fn params(&self) -> Option<&Params> {
        self.context.get(PATH_PARAMS)
    }

    /// Identity installed by the authentication gate.
    ///
    /// `None` means the request did not pass through the gate (or the gate is
    /// not installed on this route); treat it as unauthenticated.
    pub fn user_id(&self) -> Option<&str> {
        self.context.get(USER_ID).map(String::as_str)
    }

    /// Returns this request bound to a context that also holds `key = value`.
    pub fn with_value<T>(self, key: Key<T>, value: T) -> Self
    where
        T: std::any::Any + Send + Sync,
    {
        let context = self.context.with(key, value);
        Self { context, ..self }
    }

    pub fn with_context(self, context: Context) -> Self {
        Self { context, ..self }
    }

    /// Deserializes the body as JSON. An empty body is an error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::from_parts(parts, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> http::request::Builder {
        http::Request::builder().method(Method::GET).uri(uri)
    }

    #[test]
    fn reads_cookie_among_several() {
        let req: Request = get("/")
            .header("cookie", "theme=dark; jwt_token=abc.def.ghi ; lang=en")
            .body(Bytes::new())
            .unwrap()
            .into();
        assert_eq!(req.cookie("jwt_token"), Some("abc.def.ghi"));
        assert_eq!(req.cookie("lang"), Some("en"));
        assert_eq!(req.cookie("missing"), None);
    }

    #[test]
    fn reads_cookie_from_second_header() {
        let req: Request = get("/")
            .header("cookie", "a=1")
            .header("cookie", "b=2")
            .body(Bytes::new())
            .unwrap()
            .into();
        assert_eq!(req.cookie("b"), Some("2"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req: Request = get("/")
            .header("Authorization", "Bearer t")
            .body(Bytes::new())
            .unwrap()
            .into();
        assert_eq!(req.header("authorization"), Some("Bearer t"));
        assert_eq!(req.header("AUTHORIZATION"), Some("Bearer t"));
    }

    #[test]
    fn with_value_leaves_other_request_untouched() {
        let a: Request = get("/a").body(Bytes::new()).unwrap().into();
        let b: Request = get("/b").body(Bytes::new()).unwrap().into();

        let a = a.with_value(USER_ID, "alice".to_owned());

        assert_eq!(a.user_id(), Some("alice"));
        assert_eq!(b.user_id(), None);
        assert_eq!(a.path(), "/a");
    }

    #[test]
    fn param_without_route_match_is_none() {
        let req: Request = get("/lists/1").body(Bytes::new()).unwrap().into();
        assert!(req.params().is_none());
        assert_eq!(req.param("id"), None);
    }

    #[test]
    fn decodes_json_body() {
        #[derive(serde::Deserialize)]
        struct Signin {
            email: String,
            age: u32,
        }

        let req: Request = http::Request::builder()
            .method(Method::POST)
            .uri("/signin")
            .body(Bytes::from_static(br#"{"email":"john@example.com","age":30}"#))
            .unwrap()
            .into();
        let body: Signin = req.json().unwrap();
        assert_eq!(body.email, "john@example.com");
        assert_eq!(body.age, 30);
    }

    #[test]
    fn rejects_malformed_or_empty_json() {
        let bad: Request = get("/").body(Bytes::from_static(br#"{"name":}"#)).unwrap().into();
        let empty: Request = get("/").body(Bytes::new()).unwrap().into();
        assert!(bad.json::<serde_json::Value>().is_err());
        assert!(empty.json::<serde_json::Value>().is_err());
    }
}
