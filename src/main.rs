use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use static_serve::config::{ConnectionMode, ServerConfig};
use static_serve::server::Server;
use tracing::Level;

/// Serve a directory over HTTP/1.1.
#[derive(Debug, Parser)]
#[command(name = "static-serve", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Root directory to serve
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Spawn one task per connection instead of handling them one at a time
    #[arg(long)]
    concurrent: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: Level,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let mut cfg = match &self.config {
            Some(path) => ServerConfig::from_yaml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ServerConfig::default(),
        }
        .apply_env()?;

        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(dir) = self.directory {
            cfg.root = dir;
        }
        if self.concurrent {
            cfg.mode = ConnectionMode::Task;
        }

        if cfg.root.is_relative() {
            let cwd = std::env::current_dir().context("could not get current working directory")?;
            cfg.root = cwd.join(&cfg.root);
        }
        if !cfg.root.is_dir() {
            bail!("directory does not exist: {}", cfg.root.display());
        }

        cfg.validate_absolute()?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cli.log_level)
        .init();

    let cfg = match cli.into_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("{e:#}");
            std::process::exit(1);
        }
    };

    let server = match Server::bind(cfg).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("{e:#}");
            std::process::exit(1);
        }
    };

    tokio::select! {
        res = server.run() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
