use std::net::SocketAddr;
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, warn};

use crate::config::{ConnectionMode, ServerConfig};
use crate::http::connection::Connection;

/// Create a `TcpListener` with `SO_REUSEADDR` enabled and the given backlog.
///
/// Must be called from within a Tokio runtime.
pub fn bind(addr: SocketAddr, backlog: i32) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // Allows restarting while the old socket sits in TIME_WAIT
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

/// Accepts connections forever.
///
/// Accept errors are logged and the loop keeps going; nothing that happens on a
/// single connection stops the server.
pub async fn run(listener: TcpListener, cfg: Arc<ServerConfig>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
                continue;
            }
        };
        debug!(peer = %peer, "Accepted connection");

        match cfg.mode {
            ConnectionMode::Serial => serve(socket, peer, Arc::clone(&cfg)).await,
            ConnectionMode::Task => {
                let cfg = Arc::clone(&cfg);
                tokio::spawn(serve(socket, peer, cfg));
            }
        }
    }
}

async fn serve(socket: TcpStream, peer: SocketAddr, cfg: Arc<ServerConfig>) {
    let mut conn = Connection::new(socket, peer, cfg);
    if let Err(e) = conn.run().await {
        warn!(peer = %peer, error = %format!("{e:#}"), "Connection dropped");
    }
    // Dropping the connection closes the socket.
    debug!(peer = %peer, "Connection closed");
}
