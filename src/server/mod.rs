//! Listening socket and accept loop.

pub mod listener;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;

/// A bound server, ready to accept connections.
pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the address described by `config`.
    ///
    /// Any failure here (socket creation, options, bind, listen) is fatal and
    /// reported to the caller; the accept loop is never entered.
    pub async fn bind(config: ServerConfig) -> anyhow::Result<Self> {
        let addr = config.socket_addr();
        Self::bind_to(addr, config).await
    }

    /// Binds `addr` instead of the configured host and port. Port 0 picks a free port.
    pub async fn bind_to(addr: SocketAddr, config: ServerConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid server configuration")?;
        let listener = listener::bind(addr, config.backlog)
            .with_context(|| format!("failed to listen on {addr}"))?;

        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop. Does not return under normal operation.
    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            addr = %self.local_addr()?,
            root = %self.config.root.display(),
            mode = ?self.config.mode,
            "Listening"
        );
        listener::run(self.listener, self.config).await
    }
}

/// Binds according to `config` and serves until the process is stopped.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    Server::bind(config).await?.run().await
}
