//! Bearer-token authentication.
//!
//! [`Authenticator`] is the gate. It looks for a token in
//! `Authorization: Bearer <token>` first and in the session cookie second,
//! verifies it, and installs the verified identity into the request context
//! under [`USER_ID`](crate::context::USER_ID). Requests without a valid token
//! are answered with `401` and never reach the wrapped handler.
//!
//! ```rust,no_run
//! use gatehouse::{auth::Authenticator, Request, Response, Router};
//! use http::StatusCode;
//!
//! async fn me(req: Request) -> Response {
//!     match req.user_id() {
//!         Some(id) => Response::to_json(StatusCode::OK, &serde_json::json!({ "id": id })),
//!         None => Response::error(StatusCode::UNAUTHORIZED, "User ID not found in context"),
//!     }
//! }
//!
//! let auth = Authenticator::new(b"process-wide secret");
//! let app = Router::new().get("/me", auth.protect(me));
//! ```
//!
//! Endpoints that treat authentication as optional call
//! [`Authenticator::authenticate`] themselves and decide what an error means.

mod error;
pub mod token;

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::context::USER_ID;
use crate::cookie::Cookie;
use crate::handler::{BoxFuture, Handler};
use crate::middleware::{self, Layered, Middleware, Next};
use crate::request::Request;
use crate::response::IntoResponse;

pub use error::AuthError;
pub use token::{Claims, TokenKeys};

/// Default name of the cookie carrying the raw session token.
pub const SESSION_COOKIE: &str = "jwt_token";

/// Token gate and issuer sharing one secret.
///
/// Cloning is cheap; every clone uses the same keys.
#[derive(Clone, Debug)]
pub struct Authenticator {
    keys: Arc<TokenKeys>,
    cookie: Arc<str>,
}

impl Authenticator {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            keys: Arc::new(TokenKeys::from_secret(secret)),
            cookie: Arc::from(SESSION_COOKIE),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.jwt_secret.expose()).cookie_name(&config.session_cookie)
    }

    /// Overrides the session cookie name.
    pub fn cookie_name(mut self, name: &str) -> Self {
        self.cookie = Arc::from(name);
        self
    }

    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    /// Raw token presented with the request, if any.
    ///
    /// The header wins when both are present. A header that is not exactly
    /// `Bearer <token>` is ignored and the cookie is tried instead.
    pub fn bearer_token<'r>(&self, req: &'r Request) -> Option<&'r str> {
        req.header("authorization")
            .and_then(parse_bearer)
            .or_else(|| req.cookie(&self.cookie).filter(|t| !t.is_empty()))
    }

    /// Extracts and verifies the caller's identity without rejecting anything.
    pub fn authenticate(&self, req: &Request) -> Result<String, AuthError> {
        let token = self.bearer_token(req).ok_or(AuthError::MissingCredential)?;
        let claims = self.keys.verify(token)?;
        Ok(claims.user_id)
    }

    /// Signs a fresh token for `user_id`.
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        self.keys.issue(user_id)
    }

    /// Cookie that carries `token` for the lifetime of the token.
    pub fn session_cookie(&self, token: &str) -> Cookie {
        Cookie::new(&*self.cookie, token)
            .max_age(token::TOKEN_LIFETIME.as_secs() as i64)
            .path("/")
            .http_only(true)
    }

    /// Cookie that makes the client drop its session token.
    pub fn clear_session_cookie(&self) -> Cookie {
        Cookie::new(&*self.cookie, "").max_age(-1).path("/").http_only(true)
    }

    /// Wraps a single handler so it only runs for authenticated requests.
    pub fn protect(&self, handler: impl Handler) -> Layered {
        middleware::wrap(self.clone(), handler)
    }
}

impl Middleware for Authenticator {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        match self.authenticate(&req) {
            Ok(user_id) => {
                let req = req.with_value(USER_ID, user_id);
                Box::pin(next.run(req))
            }
            Err(e) => {
                debug!(method = %req.method(), path = %req.path(), error = %e, "request rejected");
                Box::pin(async move { e.into_response() })
            }
        }
    }
}

fn parse_bearer(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}
