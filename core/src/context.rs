//! Network configuration context for a single hub.
//!
//! A small `Clone`-able bundle of the address/port a hub is reachable at,
//! plus a `UrlBuilder` for the URLs the SSDP responder and UPnP descriptor
//! need to advertise.

use std::net::IpAddr;
use std::sync::Arc;

use parking_lot::RwLock;

/// Network configuration shared across a hub's components.
#[derive(Clone)]
pub struct HubNetwork {
    /// TCP listen port (set once the listener has bound).
    port: Arc<RwLock<u16>>,
    /// The primary non-loopback IPv4 address Echo can reach this hub at.
    local_ip: Arc<RwLock<IpAddr>>,
    /// Whether the bound port is 443, which selects `https` in `URLBase`.
    use_https: Arc<RwLock<bool>>,
}

impl HubNetwork {
    /// Creates a `HubNetwork` with an explicit address and port.
    #[must_use]
    pub fn new(local_ip: IpAddr, port: u16) -> Self {
        Self {
            port: Arc::new(RwLock::new(port)),
            local_ip: Arc::new(RwLock::new(local_ip)),
            use_https: Arc::new(RwLock::new(port == 443)),
        }
    }

    /// Detects the primary non-loopback IPv4 address of the host.
    ///
    /// # Errors
    ///
    /// Returns an error if no such address could be found.
    pub fn detect_local_ip() -> Result<IpAddr, NetworkError> {
        local_ip_address::local_ip().map_err(|e| NetworkError::Detection(e.to_string()))
    }

    /// Returns the current port.
    #[must_use]
    pub fn port(&self) -> u16 {
        *self.port.read()
    }

    /// Returns the current local IP.
    #[must_use]
    pub fn local_ip(&self) -> IpAddr {
        *self.local_ip.read()
    }

    /// Returns whether the descriptor should advertise `https`.
    #[must_use]
    pub fn use_https(&self) -> bool {
        *self.use_https.read()
    }

    /// Updates the bound port (used once the TCP listener has actually bound,
    /// e.g. after port-0 auto-assignment).
    pub fn set_port(&self, port: u16) {
        *self.port.write() = port;
        *self.use_https.write() = port == 443;
    }

    /// Returns a `UrlBuilder` for the current network configuration.
    #[must_use]
    pub fn url_builder(&self) -> UrlBuilder {
        UrlBuilder::new(self.local_ip(), self.port(), self.use_https())
    }
}

/// Errors that can occur while resolving network configuration.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Could not detect a local, non-loopback IPv4 address.
    #[error("failed to detect local IP: {0}")]
    Detection(String),
}

/// Builder for constructing the URLs a hub advertises.
pub struct UrlBuilder {
    ip: IpAddr,
    port: u16,
    use_https: bool,
}

impl UrlBuilder {
    /// Creates a new `UrlBuilder`.
    #[must_use]
    pub fn new(ip: IpAddr, port: u16, use_https: bool) -> Self {
        Self {
            ip,
            port,
            use_https,
        }
    }

    fn scheme(&self) -> &'static str {
        if self.use_https {
            "https"
        } else {
            "http"
        }
    }

    /// Returns the base URL for the hub, e.g. `http://192.168.1.10:80`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.ip, self.port)
    }

    /// Returns the `/description.xml` URL advertised in SSDP `LOCATION`
    /// headers and the UPnP descriptor's `URLBase`.
    #[must_use]
    pub fn description_url(&self) -> String {
        format!("{}/description.xml", self.base_url())
    }
}

/// Builds the deterministic bridge UUID for a hub: `2f402f80-da50-11e1-9b23-<hubId>`.
///
/// Deterministic per hub, never randomly generated - Echo expects the same
/// UUID across restarts and across every advertisement for the same hub.
#[must_use]
pub fn bridge_uuid(hub_id: &str) -> String {
    format!("2f402f80-da50-11e1-9b23-{hub_id}")
}
