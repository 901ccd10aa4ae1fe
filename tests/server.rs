//! End-to-end tests over a real socket with raw HTTP/1.1.

use std::net::SocketAddr;
use std::time::Duration;

use switchyard::{Error, Request, Response, Router, serve_with_shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

struct TestServer {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<Result<(), Error>>,
}

impl TestServer {
    async fn start(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve_with_shutdown(listener, router, async {
            let _ = stopped.await;
        }));
        Self { addr, stop: Some(stop), handle }
    }

    async fn request(&self, raw: &str) -> String {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut buf = Vec::new();
        let read = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf)).await;
        assert!(read.is_ok(), "server did not close the connection");
        String::from_utf8_lossy(&buf).into_owned()
    }

    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }
}

fn get(path: &str) -> String {
    format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
}

fn post(path: &str, body: &str) -> String {
    format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
}

async fn explode(_req: Request, _res: Response) {
    panic!("handler blew up")
}

fn app() -> Router {
    Router::new()
        .get("/", |_req: Request, res: Response| async move { res.send("Hello!") })
        .get("/user/:id", |req: Request, res: Response| async move {
            res.json(format!(r#"{{"user_id": "{}"}}"#, req.param("id").unwrap_or_default()))
        })
        .post("/echo", |req: Request, res: Response| async move {
            let escaped = req.body().replace('"', "\\\"");
            res.json(format!(r#"{{"you_sent": "{escaped}"}}"#))
        })
        .get("/teapot", |_req: Request, res: Response| async move { res.status(418, "short and stout") })
        .get("/fail", |_req: Request, _res: Response| async { Err::<(), _>(Error::handler("nope")) })
        .get("/panic", explode)
        .get("/silent", |_req: Request, _res: Response| async {})
}

#[tokio::test]
async fn serves_text_json_and_custom_status() {
    let server = TestServer::start(app()).await;

    let text = server.request(&get("/")).await;
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"), "{text}");
    assert!(text.to_ascii_lowercase().contains("content-type: text/plain\r\n"), "{text}");
    assert!(text.ends_with("\r\n\r\nHello!"), "{text}");

    let json = server.request(&get("/user/42")).await;
    assert!(json.to_ascii_lowercase().contains("content-type: application/json\r\n"), "{json}");
    assert!(json.ends_with(r#"{"user_id": "42"}"#), "{json}");

    let echoed = server.request(&post("/echo", r#"hello "world""#)).await;
    assert!(echoed.ends_with(r#"{"you_sent": "hello \"world\""}"#), "{echoed}");

    let teapot = server.request(&get("/teapot")).await;
    assert!(teapot.starts_with("HTTP/1.1 418 "), "{teapot}");
    assert!(teapot.ends_with("short and stout"), "{teapot}");

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_route_is_404() {
    let server = TestServer::start(app()).await;

    let missing = server.request(&get("/nope")).await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"), "{missing}");
    assert!(missing.ends_with("\r\n\r\n404 Not Found"), "{missing}");

    let too_deep = server.request(&get("/user/42/x")).await;
    assert!(too_deep.starts_with("HTTP/1.1 404 "), "{too_deep}");

    server.shutdown().await;
}

#[tokio::test]
async fn failures_abort_only_their_own_connection() {
    let server = TestServer::start(app()).await;

    for path in ["/fail", "/panic", "/silent"] {
        let aborted = server.request(&get(path)).await;
        assert!(!aborted.starts_with("HTTP/1.1"), "{path}: {aborted}");
    }

    let healthy = server.request(&get("/")).await;
    assert!(healthy.ends_with("Hello!"), "{healthy}");

    server.shutdown().await;
}

#[tokio::test]
async fn idle_keep_alive_connection_does_not_block_shutdown() {
    let server = TestServer::start(app()).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.ends_with(b"Hello!") {
        let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut chunk))
            .await
            .unwrap()
            .unwrap();
        assert!(n > 0, "connection closed before the response arrived");
        buf.extend_from_slice(&chunk[..n]);
    }

    // The client keeps the socket open and sends nothing more.
    server.shutdown().await;

    let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut chunk))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(n, 0, "server should close the idle connection");
}
