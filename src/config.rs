use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::http::response::DEFAULT_SERVER_NAME;

/// Longest root directory path accepted, in bytes.
pub const MAX_ROOT_LEN: usize = 4096;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("port must be between 1 and 65535")]
    InvalidPort,
    #[error("root directory path is {len} bytes, limit is {limit}")]
    RootTooLong { len: usize, limit: usize },
    #[error("read_buffer_size must be at least 1 byte")]
    EmptyReadBuffer,
    #[error("root directory must be an absolute path: {0}")]
    RootNotAbsolute(PathBuf),
    #[error("{name} is not valid: {value}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// How accepted connections are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// Handle each connection to completion before accepting the next.
    Serial,
    /// Spawn one task per accepted connection.
    Task,
}

/// Server configuration. Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    pub root: PathBuf,
    pub host: IpAddr,
    pub backlog: i32,
    pub read_buffer_size: usize,
    pub mode: ConnectionMode,
    pub read_timeout_ms: Option<u64>,
    pub server_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 80,
            root: PathBuf::from("./"),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            backlog: 64,
            read_buffer_size: 8 * 1024,
            mode: ConnectionMode::Serial,
            read_timeout_ms: None,
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

impl ServerConfig {
    /// Stores the port and root directory; everything else takes defaults.
    ///
    /// The caller is expected to have checked that `root` exists.
    pub fn new(port: u16, root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let cfg = Self {
            port,
            root: root.into(),
            ..Self::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Applies `STATIC_SERVE_PORT`, `STATIC_SERVE_ROOT` and `STATIC_SERVE_HOST`.
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(port) = std::env::var("STATIC_SERVE_PORT") {
            self.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "STATIC_SERVE_PORT",
                value: port.clone(),
            })?;
        }
        if let Ok(root) = std::env::var("STATIC_SERVE_ROOT") {
            self.root = PathBuf::from(root);
        }
        if let Ok(host) = std::env::var("STATIC_SERVE_HOST") {
            self.host = host.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "STATIC_SERVE_HOST",
                value: host.clone(),
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.read_buffer_size == 0 {
            return Err(ConfigError::EmptyReadBuffer);
        }

        let len = self.root.as_os_str().len();
        if len > MAX_ROOT_LEN {
            return Err(ConfigError::RootTooLong {
                len,
                limit: MAX_ROOT_LEN,
            });
        }

        Ok(())
    }

    /// Like [`validate`](Self::validate), and additionally requires an absolute root.
    pub fn validate_absolute(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if !self.root.is_absolute() {
            return Err(ConfigError::RootNotAbsolute(self.root.clone()));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
