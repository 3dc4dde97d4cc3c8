//! # newswire
//!
//! News fan-out server binary — wires configuration to the HTTP/WebSocket
//! server and runs until interrupted.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use newswire_server::config::ServerConfig;
use newswire_server::server::NewsServer;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Real-time news fan-out server.
#[derive(Parser, Debug)]
#[command(name = "newswire", about = "Real-time news fan-out server")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, default_value = "8081")]
    port: u16,

    /// Maximum number of news items retained in history.
    #[arg(long, default_value = "100")]
    max_history: usize,

    /// Heartbeat interval in seconds.
    #[arg(long, default_value = "30")]
    heartbeat_interval: u64,

    /// Directory with the landing page and static assets.
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            max_history: self.max_history,
            heartbeat_interval_secs: self.heartbeat_interval,
            static_dir: self.static_dir,
            ..ServerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let server = NewsServer::new(cli.into_config());

    let (addr, handle) = server
        .listen()
        .await
        .context("failed to start news server")?;
    info!(%addr, "newswire ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");

    server
        .shutdown()
        .graceful_shutdown(handle, Duration::from_secs(30))
        .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["newswire"]);
        assert_eq!(cli.host, "0.0.0.0");
        assert_eq!(cli.port, 8081);
        assert_eq!(cli.max_history, 100);
        assert_eq!(cli.heartbeat_interval, 30);
        assert_eq!(cli.static_dir, PathBuf::from("static"));
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::parse_from([
            "newswire",
            "--host",
            "127.0.0.1",
            "--port",
            "0",
            "--max-history",
            "10",
            "--heartbeat-interval",
            "5",
            "--static-dir",
            "/srv/www",
        ]);
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 0);
        assert_eq!(cli.max_history, 10);
        assert_eq!(cli.heartbeat_interval, 5);
        assert_eq!(cli.static_dir, PathBuf::from("/srv/www"));
    }

    #[test]
    fn cli_maps_into_config() {
        let cli = Cli::parse_from(["newswire", "--port", "9000", "--max-history", "7"]);
        let cfg = cli.into_config();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.max_history, 7);
        // Untouched fields keep their defaults
        assert_eq!(cfg.heartbeat_timeout_secs, 90);
    }
}
