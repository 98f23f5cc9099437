//! End-to-end tests over real sockets.

use static_serve::config::{ConnectionMode, ServerConfig};
use static_serve::server::Server;
use std::net::SocketAddr;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const INDEX: &[u8] = b"<!doctype html><title>t</title>";

async fn start(mode: ConnectionMode) -> (SocketAddr, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
    std::fs::write(dir.path().join("pixel.png"), [0x89, b'P', b'N', b'G', 0, 1, 2, 0xff]).unwrap();

    let mut cfg = ServerConfig::new(8080, dir.path()).unwrap();
    cfg.mode = mode;
    cfg.read_timeout_ms = Some(500);

    let server = Server::bind_to("127.0.0.1:0".parse().unwrap(), cfg)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    (addr, dir)
}

async fn exchange(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    out
}

fn split(wire: &[u8]) -> (String, Vec<u8>) {
    let end = wire
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no header terminator in response");
    (
        String::from_utf8_lossy(&wire[..end]).into_owned(),
        wire[end + 4..].to_vec(),
    )
}

fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines()
        .skip(1)
        .find_map(|l| l.strip_prefix(name)?.strip_prefix(": "))
}

#[tokio::test]
async fn test_get_index() {
    let (addr, _dir) = start(ConnectionMode::Task).await;

    let wire = exchange(addr, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    let (head, body) = split(&wire);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(header(&head, "Content-Type"), Some("text/html"));
    assert_eq!(header(&head, "Content-Length"), Some(INDEX.len().to_string().as_str()));
    assert_eq!(header(&head, "Connection"), Some("close"));
    assert!(header(&head, "Server").unwrap().starts_with("static_serve/"));
    assert_eq!(body, INDEX);
}

#[tokio::test]
async fn test_get_binary_file() {
    let (addr, _dir) = start(ConnectionMode::Task).await;

    let wire = exchange(addr, b"GET /pixel.png HTTP/1.1\r\n\r\n").await;
    let (head, body) = split(&wire);

    assert_eq!(header(&head, "Content-Type"), Some("image/png"));
    assert_eq!(header(&head, "Content-Length"), Some("8"));
    assert_eq!(body, [0x89, b'P', b'N', b'G', 0, 1, 2, 0xff]);
}

#[tokio::test]
async fn test_missing_file() {
    let (addr, _dir) = start(ConnectionMode::Task).await;

    let wire = exchange(addr, b"GET /missing.txt HTTP/1.1\r\n\r\n").await;
    let (head, body) = split(&wire);

    assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert_eq!(header(&head, "Content-Type"), Some("text/plain"));
    assert_eq!(body, b"Not Found");
}

#[tokio::test]
async fn test_post_is_method_not_allowed() {
    let (addr, _dir) = start(ConnectionMode::Task).await;

    for path in ["/anything", "/../etc/passwd", "/has%20pct"] {
        let raw = format!("POST {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let wire = exchange(addr, raw.as_bytes()).await;
        let (head, body) = split(&wire);

        assert!(head.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"), "{path}: {head}");
        assert_eq!(body, b"Method Not Allowed");
    }
}

#[tokio::test]
async fn test_unrecognized_method_is_method_not_allowed() {
    let (addr, _dir) = start(ConnectionMode::Task).await;

    let wire = exchange(addr, b"BREW /pot HTTP/1.1\r\n\r\n").await;
    assert!(wire.starts_with(b"HTTP/1.1 405 "));
}

#[tokio::test]
async fn test_traversal_is_bad_request() {
    let (addr, _dir) = start(ConnectionMode::Task).await;

    let wire = exchange(addr, b"GET /../secret HTTP/1.1\r\n\r\n").await;
    assert!(wire.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn test_malformed_request_closes_without_response() {
    let (addr, _dir) = start(ConnectionMode::Task).await;

    let wire = exchange(addr, b"GET /\r\n\r\n").await;
    assert!(wire.is_empty());
}

#[tokio::test]
async fn test_fragmented_request_head() {
    let (addr, _dir) = start(ConnectionMode::Task).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET / HT").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    stream.write_all(b"TP/1.1\r\nHost: x\r\n\r\n").await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_silent_client_times_out() {
    let (addr, _dir) = start(ConnectionMode::Task).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut out = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut out)).await;

    assert!(read.is_ok());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_bind_rejects_zero_read_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = ServerConfig::new(8080, dir.path()).unwrap();
    cfg.read_buffer_size = 0;

    let result = Server::bind_to("127.0.0.1:0".parse().unwrap(), cfg).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_serial_mode_survives_failed_connections() {
    let (addr, _dir) = start(ConnectionMode::Serial).await;

    // Client that disconnects without sending anything
    drop(TcpStream::connect(addr).await.unwrap());
    // Client that sends garbage
    assert!(exchange(addr, b"\r\n\r\n").await.is_empty());

    for _ in 0..3 {
        let wire = exchange(addr, b"GET /index.html HTTP/1.1\r\n\r\n").await;
        assert!(wire.starts_with(b"HTTP/1.1 200 OK\r\n"));
    }
}

#[tokio::test]
async fn test_concurrent_clients() {
    let (addr, _dir) = start(ConnectionMode::Task).await;

    // An idle connection must not block others in task mode
    let _idle = TcpStream::connect(addr).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| tokio::spawn(exchange(addr, b"GET / HTTP/1.1\r\n\r\n")))
        .collect();
    for handle in handles {
        let wire = handle.await.unwrap();
        assert!(wire.starts_with(b"HTTP/1.1 200 OK\r\n"));
    }
}
