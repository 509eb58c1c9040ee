//! Serves over a real socket and talks raw HTTP/1.1 to it.

use std::net::SocketAddr;

use gatehouse::auth::Authenticator;
use gatehouse::middleware::{self, Cors};
use gatehouse::{Request, Router, Server, health};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

const SECRET: &[u8] = b"test-secret-key-for-testing-purposes-only";

async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

async fn echo_user(req: Request) -> String {
    req.user_id().unwrap_or_default().to_owned()
}

#[tokio::test]
async fn serves_requests_and_shuts_down() {
    let auth = Authenticator::new(SECRET);
    let app = Router::new()
        .middleware(Cors::default())
        .middleware(middleware::trace)
        .get("/health", health::liveness)
        .post("/whoami", auth.protect(echo_user));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        Server::from_listener(listener)
            .serve_with_shutdown(app, async {
                let _ = stopped.await;
            })
            .await
    });

    let health = roundtrip(
        addr,
        "GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(health.starts_with("HTTP/1.1 200 OK\r\n"), "{health}");
    assert!(health.ends_with(r#"{"status":"ok"}"#), "{health}");

    let unauthorized = roundtrip(
        addr,
        "POST /whoami HTTP/1.1\r\nHost: localhost\r\nOrigin: http://app.test\r\n\
         Content-Length: 0\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(unauthorized.starts_with("HTTP/1.1 401 Unauthorized\r\n"), "{unauthorized}");
    assert!(
        unauthorized.to_ascii_lowercase().contains("access-control-allow-origin: http://app.test"),
        "{unauthorized}"
    );

    let token = auth.issue("alice").unwrap();
    let body = "ignored";
    let authorized = roundtrip(
        addr,
        &format!(
            "POST /whoami HTTP/1.1\r\nHost: localhost\r\nAuthorization: Bearer {token}\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ),
    )
    .await;
    assert!(authorized.starts_with("HTTP/1.1 200 OK\r\n"), "{authorized}");
    assert!(authorized.ends_with("alice"), "{authorized}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
