//! Minimal gatehouse app: health check, sign-in, a protected endpoint and an
//! endpoint where authentication is optional.
//!
//! Run with:
//!   JWT_SECRET=dev-secret RUST_LOG=info,gatehouse=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:8080/health
//!   curl -i -X POST http://localhost:8080/login -d '{"user_id":"alice"}'
//!   curl -H "Authorization: Bearer $TOKEN" http://localhost:8080/me
//!   curl -b "jwt_token=$TOKEN" http://localhost:8080/greeting
//!   curl -i -X OPTIONS -H 'Origin: http://localhost:3000' http://localhost:8080/me

use gatehouse::auth::{AuthError, Authenticator};
use gatehouse::middleware::{self, Cors};
use gatehouse::{Config, Cookie, IntoResponse, Request, Response, Router, Server, health};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Deserialize)]
struct Login {
    user_id: String,
}

#[tokio::main]
async fn main() -> Result<(), gatehouse::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let auth = Authenticator::from_config(&config);

    let login_auth = auth.clone();
    let logout_auth = auth.clone();
    let greeting_auth = auth.clone();

    let app = Router::new()
        .middleware(Cors::default())
        .middleware(middleware::trace)
        .get("/health", health::liveness)
        .post("/login", move |req: Request| {
            let auth = login_auth.clone();
            async move { login(&auth, req) }
        })
        .post("/logout", move |_req: Request| {
            let cookie = logout_auth.clear_session_cookie();
            async move { logout(&cookie) }
        })
        .get("/me", auth.protect(me))
        .get("/greeting", move |req: Request| {
            let auth = greeting_auth.clone();
            async move { greeting(&auth, req) }
        });

    Server::bind(config.addr()).serve(app).await
}

// POST /login  {"user_id": "..."}
//
// A real app checks a password first. The token is returned in the body and
// set as the session cookie.
fn login(auth: &Authenticator, req: Request) -> Response {
    let Ok(input) = req.json::<Login>() else {
        return Response::error(StatusCode::BAD_REQUEST, "Invalid request body");
    };
    let token = match auth.issue(&input.user_id) {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    let mut res = Response::to_json(StatusCode::OK, &json!({ "token": token }));
    res.set_cookie(&auth.session_cookie(&token));
    res
}

// POST /logout
fn logout(cookie: &Cookie) -> Response {
    let mut res = Response::to_json(StatusCode::OK, &json!({ "message": "Signed out" }));
    res.set_cookie(cookie);
    res
}

// GET /me  (behind the gate)
async fn me(req: Request) -> Response {
    match req.user_id() {
        Some(id) => Response::to_json(StatusCode::OK, &json!({ "user_id": id })),
        None => Response::error(StatusCode::UNAUTHORIZED, "User ID not found in context"),
    }
}

// GET /greeting  (authentication optional)
fn greeting(auth: &Authenticator, req: Request) -> Response {
    let name = match auth.authenticate(&req) {
        Ok(id) => id,
        Err(AuthError::MissingCredential) => "stranger".to_owned(),
        Err(e) => return e.into_response(),
    };
    Response::to_json(StatusCode::OK, &json!({ "greeting": format!("hello, {name}") }))
}
