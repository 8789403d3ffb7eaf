//! Bridge Server - standalone binary hosting the LAN smart-home bridge
//! emulator.
//!
//! Seeds the in-memory device registry from configuration, binds the HTTP
//! and SSDP sockets, and runs until a shutdown signal arrives.
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bridge_core::{DeviceSink, Hub, InMemoryNodeSource, NodeRecord, SemanticEvent};
use clap::Parser;
use tokio::signal;

use crate::config::ServerConfig;

/// Bridge Server - headless Hue/Alexa LAN bridge emulator.
#[derive(Parser, Debug)]
#[command(name = "bridge-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "BRIDGE_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Bind port (overrides config file).
    #[arg(short = 'p', long, env = "BRIDGE_BIND_PORT")]
    port: Option<u16>,
}

/// A `DeviceSink` that logs received events instead of actuating anything.
/// Real device handlers are out of scope for the standalone binary  -
/// this exists so the facade and directive endpoint have something to
/// dispatch to when exercised against the seeded device list.
struct LoggingSink {
    device_id: String,
    name: String,
}

#[async_trait]
impl DeviceSink for LoggingSink {
    async fn receive(&self, event: SemanticEvent) {
        log::info!(
            "device {} ({}) received {} event: {event:?}",
            self.device_id,
            self.name,
            event.topic()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("bridge-server v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        ServerConfig::load(args.config.as_deref()).context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.bind_port = port;
    }

    log::info!(
        "hub_id={} bind_port={} devices={}",
        config.hub_id,
        config.bind_port,
        config.devices.len()
    );

    let source = Arc::new(InMemoryNodeSource::new());
    for device in &config.devices {
        source.register(
            NodeRecord {
                id: device.id.clone(),
                name: device.name.clone(),
            },
            Arc::new(LoggingSink {
                device_id: device.id.clone(),
                name: device.name.clone(),
            }),
        );
    }

    let hub = Hub::new(config.hub_id.clone(), source, config.to_core_config());
    let running = hub.start().await.context("failed to start hub")?;

    log::info!("listening on {}", running.local_addr());

    shutdown_signal().await;
    log::info!("shutdown signal received, cleaning up...");

    running.shutdown().await;
    log::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
