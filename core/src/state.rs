//! Core configuration types.
//!
//! A single `Config` struct with sensible defaults, `Serialize`/`Deserialize`
//! so it can round-trip through the server's YAML config file.

use serde::{Deserialize, Serialize};

/// Per-hub configuration.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// TCP listen port. 443 selects `https` in the UPnP descriptor's
    /// `URLBase` (transport selection itself is implementation-defined -
    /// this crate always serves plain HTTP and only changes the advertised
    /// scheme, see `descriptor::build_description_xml`).
    pub port: u16,

    /// Enables verbose per-request logging.
    pub debug: bool,

    /// Interval between periodic SSDP `NOTIFY ssdp:alive` beacons (seconds).
    pub ad_interval_secs: u64,

    /// Soft per-request deadline for HTTP handlers (seconds).
    pub request_timeout_secs: u64,

    /// Grace period handlers are given to finish after a shutdown signal
    /// before the server force-closes (seconds).
    pub shutdown_grace_secs: u64,

    /// Fixed-window rate limit: max requests per client IP per window.
    pub rate_limit_max: u32,

    /// Fixed-window rate limit window length (seconds).
    pub rate_limit_window_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 80,
            debug: false,
            ad_interval_secs: 30,
            request_timeout_secs: 10,
            shutdown_grace_secs: 5,
            rate_limit_max: 100,
            rate_limit_window_secs: 900,
        }
    }
}
