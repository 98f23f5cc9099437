use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::http::parser::parse_http_request;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::static_files;

/// One accepted client connection, carrying exactly one request and one response.
pub struct Connection<S> {
    stream: S,
    peer: SocketAddr,
    config: Arc<ServerConfig>,
    buffer: BytesMut,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Parsing,
    Dispatching(Request),
    Responding(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, config: Arc<ServerConfig>) -> Self {
        let capacity = config.read_buffer_size;
        Self {
            stream,
            peer,
            config,
            buffer: BytesMut::with_capacity(capacity),
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection until it is closed.
    ///
    /// A read error, a request that does not parse, or a response that cannot be
    /// serialized closes the connection without writing anything. Errors are
    /// returned for logging only; the stream is dropped either way.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    if self.read_request_head().await? {
                        self.state = ConnectionState::Parsing;
                    } else {
                        debug!(peer = %self.peer, "Client closed before sending a request");
                    }
                }

                ConnectionState::Parsing => {
                    let request = parse_http_request(&self.buffer).context("HTTP parse error")?;
                    debug!(
                        peer = %self.peer,
                        method = %request.method,
                        path = %request.path,
                        version = %request.version,
                        host = ?request.host,
                        user_agent = ?request.user_agent,
                        accept = ?request.accept,
                        connection = ?request.connection,
                        "Parsed request"
                    );
                    self.state = ConnectionState::Dispatching(request);
                }

                ConnectionState::Dispatching(request) => {
                    let response = self
                        .handle_request(&request)
                        .await
                        .with_server(self.config.server_name.clone());

                    info!(
                        peer = %self.peer,
                        method = %request.method,
                        path = %request.path,
                        status = response.status.as_u16(),
                        bytes = response.content_length(),
                        "Request served"
                    );

                    let writer = ResponseWriter::new(&response)
                        .context("failed to serialize response")?;
                    self.state = ConnectionState::Responding(writer);
                }

                ConnectionState::Responding(mut writer) => {
                    writer
                        .write_to_stream(&mut self.stream)
                        .await
                        .context("failed to write response")?;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until the blank line ending the request head, EOF, or a full buffer.
    ///
    /// Returns `false` when the client closed without sending anything.
    pub async fn read_request_head(&mut self) -> anyhow::Result<bool> {
        let limit = self.config.read_buffer_size;
        let deadline = self.config.read_timeout_ms.map(Duration::from_millis);

        while self.buffer.len() < limit && !has_head_end(&self.buffer) {
            let remaining = (limit - self.buffer.len()) as u64;
            let mut reader = (&mut self.stream).take(remaining);
            let read = reader.read_buf(&mut self.buffer);

            let n = match deadline {
                Some(d) => tokio::time::timeout(d, read)
                    .await
                    .context("timed out reading request")??,
                None => read.await?,
            };

            if n == 0 {
                break;
            }
        }

        Ok(!self.buffer.is_empty())
    }

    async fn handle_request(&self, req: &Request) -> Response {
        match req.method {
            Method::GET => static_files::serve_get(req, &self.config.root).await,
            _ => {
                warn!(peer = %self.peer, method = %req.method, "Method not allowed");
                Response::method_not_allowed()
            }
        }
    }
}

fn has_head_end(buf: &[u8]) -> bool {
    buf.windows(4).any(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn config() -> Arc<ServerConfig> {
        Arc::new(ServerConfig::new(8080, "/nonexistent-root").unwrap())
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn head_end_detection() {
        assert!(has_head_end(b"GET / HTTP/1.1\r\n\r\n"));
        assert!(!has_head_end(b"GET / HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn put_gets_405_over_duplex() {
        let (client, server) = tokio::io::duplex(4096);
        let (mut rd, mut wr) = tokio::io::split(client);

        wr.write_all(b"PUT /x HTTP/1.1\r\n\r\n").await.unwrap();
        let mut conn = Connection::new(server, peer(), config());
        conn.run().await.unwrap();
        drop(conn);

        let mut out = Vec::new();
        rd.read_to_end(&mut out).await.unwrap();
        assert!(out.starts_with(b"HTTP/1.1 405 Method Not Allowed\r\n"));
    }

    #[tokio::test]
    async fn head_read_stops_at_buffer_limit() {
        let (mut client, server) = tokio::io::duplex(4096);
        client
            .write_all(b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n")
            .await
            .unwrap();

        let mut cfg = ServerConfig::new(8080, "/nonexistent-root").unwrap();
        cfg.read_buffer_size = 16;
        let mut conn = Connection::new(server, peer(), Arc::new(cfg));

        assert!(conn.read_request_head().await.unwrap());
        assert_eq!(&conn.buffer[..], b"GET /index.html ");
    }

    #[tokio::test]
    async fn fragmented_head_is_collected() {
        let (mut client, server) = tokio::io::duplex(4096);
        let mut conn = Connection::new(server, peer(), config());

        let reader = tokio::spawn(async move {
            conn.read_request_head().await.unwrap();
            conn.buffer
        });
        client.write_all(b"GET / HT").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        client.write_all(b"TP/1.1\r\n\r\n").await.unwrap();

        let buffer = reader.await.unwrap();
        assert_eq!(&buffer[..], b"GET / HTTP/1.1\r\n\r\n");
    }

    #[tokio::test]
    async fn parse_failure_writes_nothing() {
        let (client, server) = tokio::io::duplex(4096);
        let (mut rd, mut wr) = tokio::io::split(client);

        wr.write_all(b"GET /\r\n\r\n").await.unwrap();
        let mut conn = Connection::new(server, peer(), config());
        assert!(conn.run().await.is_err());
        drop(conn);

        let mut out = Vec::new();
        rd.read_to_end(&mut out).await.unwrap();
        assert!(out.is_empty());
    }
}
