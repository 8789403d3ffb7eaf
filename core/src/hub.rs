//! Hub Lifecycle (component G).
//!
//! Owns the `initializing -> listening -> closing -> closed` state machine:
//! binds the TCP listener and the SSDP multicast socket, starts both
//! the HTTP server and the SSDP responder loop, and drives a coordinated
//! graceful shutdown via a single `CancellationToken`.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::context::{bridge_uuid, HubNetwork};
use crate::error::{BridgeError, BridgeResult};
use crate::registry::{DeviceRegistry, NodeSource};
use crate::router::{build_router, AppState};
use crate::ssdp::{bind_multicast_socket, ResponderContext};
use crate::state::Config;

/// Coarse health signal a hub reports for external monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubStatus {
    /// Bound and serving normally.
    Green,
    /// Bound but degraded (e.g. SSDP responder not running).
    Yellow,
    /// Not currently serving.
    Red,
}

/// Lifecycle state a `Hub` moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    Initializing,
    Listening,
    Closing,
    Closed,
}

/// A not-yet-started hub: holds everything needed to bind and serve, but has
/// not bound any sockets yet.
pub struct Hub {
    hub_id: String,
    registry: Arc<DeviceRegistry>,
    config: Config,
    state: Arc<RwLock<HubState>>,
}

impl Hub {
    /// Creates a hub for `hub_id`, backed by `source` for device records.
    #[must_use]
    pub fn new(hub_id: String, source: Arc<dyn NodeSource>, config: Config) -> Self {
        let registry = Arc::new(DeviceRegistry::new(hub_id.clone(), source));
        Self {
            hub_id,
            registry,
            config,
            state: Arc::new(RwLock::new(HubState::Initializing)),
        }
    }

    /// Returns the hub's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> HubState {
        *self.state.read()
    }

    /// Binds the TCP listener and UDP SSDP socket and starts serving both.
    ///
    /// Detects the host's local IPv4 address unless the environment has
    /// already been configured otherwise. Returns a `RunningHub` which must
    /// be `shutdown()` to tear down cleanly.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Bind` if either socket cannot be bound.
    pub async fn start(self) -> BridgeResult<RunningHub> {
        let local_ip = HubNetwork::detect_local_ip()
            .map_err(|e| BridgeError::Bind(format!("could not detect local IP: {e}")))?;

        let (listener, addr) = crate::router::bind_tcp_listener(self.config.port)
            .await
            .map_err(|e| BridgeError::Bind(format!("TCP bind failed: {e}")))?;

        let network = HubNetwork::new(local_ip, addr.port());

        let local_ipv4: Ipv4Addr = match local_ip {
            std::net::IpAddr::V4(v4) => v4,
            std::net::IpAddr::V6(_) => {
                return Err(BridgeError::Bind(
                    "SSDP requires an IPv4 local address".to_string(),
                ))
            }
        };

        // SSDP bind failure is non-fatal: discovery will not work,
        // but the HTTP side (and thus direct `/alexa` POSTs) must still
        // start. TCP bind failure above is the only fatal transport error.
        let ssdp_socket = match bind_multicast_socket(local_ipv4) {
            Ok(socket) => Some(socket),
            Err(err) => {
                log::error!("SSDP bind failed, discovery will not work: {err}");
                None
            }
        };

        *self.state.write() = HubState::Listening;
        log::info!(
            "hub {} listening on {addr} (advertising {})",
            self.hub_id,
            network.url_builder().base_url()
        );

        let hub_id_upper = self.hub_id.to_uppercase();
        let app_state = AppState {
            hub_id: self.hub_id.clone(),
            hub_id_upper: hub_id_upper.clone(),
            registry: self.registry.clone(),
            network: network.clone(),
            config: self.config.clone(),
        };
        let router = build_router(app_state, &self.config);

        let shutdown = CancellationToken::new();
        let http_shutdown = shutdown.clone();
        let http_handle = tokio::spawn(async move {
            let service = router.into_make_service_with_connect_info::<std::net::SocketAddr>();
            if let Err(err) = axum::serve(listener, service)
                .with_graceful_shutdown(async move { http_shutdown.cancelled().await })
                .await
            {
                log::error!("HTTP server error: {err}");
            }
        });

        let ssdp_handle = ssdp_socket.map(|socket| {
            let ssdp_ctx = ResponderContext {
                bridge_uuid: bridge_uuid(&self.hub_id),
                hub_id_upper,
                urls: network.url_builder(),
                ad_interval: Duration::from_secs(self.config.ad_interval_secs),
            };
            let ssdp_shutdown = shutdown.clone();
            let socket = Arc::new(socket);
            tokio::spawn(async move {
                crate::ssdp::run(socket, ssdp_ctx, ssdp_shutdown).await;
            })
        });

        Ok(RunningHub {
            hub_id: self.hub_id,
            addr,
            state: self.state,
            shutdown,
            http_handle,
            ssdp_handle,
            shutdown_grace: Duration::from_secs(self.config.shutdown_grace_secs),
        })
    }
}

/// A hub with the HTTP listener running and, if the SSDP bind succeeded,
/// the SSDP responder running alongside it.
pub struct RunningHub {
    hub_id: String,
    addr: std::net::SocketAddr,
    state: Arc<RwLock<HubState>>,
    shutdown: CancellationToken,
    http_handle: tokio::task::JoinHandle<()>,
    ssdp_handle: Option<tokio::task::JoinHandle<()>>,
    shutdown_grace: Duration,
}

impl RunningHub {
    /// Returns the socket address the HTTP listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.addr
    }

    /// Returns the hub's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> HubState {
        *self.state.read()
    }

    /// A coarse health signal for monitoring. `Yellow` once shutdown
    /// has begun, or while listening with no working SSDP responder; `Red`
    /// once closed.
    #[must_use]
    pub fn status(&self) -> HubStatus {
        match self.state() {
            HubState::Listening if self.ssdp_handle.is_some() => HubStatus::Green,
            HubState::Listening => HubStatus::Yellow,
            HubState::Closing => HubStatus::Yellow,
            HubState::Initializing | HubState::Closed => HubStatus::Red,
        }
    }

    /// Signals both workers to stop, sends SSDP `byebye`, and waits up to
    /// the configured grace period for them to finish.
    pub async fn shutdown(self) {
        *self.state.write() = HubState::Closing;
        log::info!("hub {} shutting down", self.hub_id);
        self.shutdown.cancel();

        let grace = tokio::time::timeout(self.shutdown_grace, async {
            match self.ssdp_handle {
                Some(ssdp_handle) => {
                    let _ = futures::future::join(self.http_handle, ssdp_handle).await;
                }
                None => {
                    let _ = self.http_handle.await;
                }
            }
        })
        .await;

        if grace.is_err() {
            log::warn!(
                "hub {} did not finish shutting down within the grace period",
                self.hub_id
            );
        }

        *self.state.write() = HubState::Closed;
    }
}
