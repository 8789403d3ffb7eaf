//! Core library for the LAN smart-home bridge emulator.
//!
//! Impersonates a Philips Hue bridge well enough for an Amazon Echo to
//! discover and control virtual devices over SSDP/UPnP and the Hue v1 REST
//! API, with no cloud round-trip, and additionally exposes an Alexa Smart
//! Home v3 JSON directive endpoint on the same process. See the module docs
//! below for the seven components this crate is built from.

pub mod alexa;
pub mod context;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod hub;
pub mod hue;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod runtime;
pub mod sanitize;
pub mod ssdp;
pub mod state;

pub use context::{bridge_uuid, HubNetwork, UrlBuilder};
pub use dispatch::{dispatch, ColorPayload, DispatchOutcome, SemanticEvent};
pub use error::{BridgeError, BridgeResult};
pub use hub::{Hub, HubState, HubStatus, RunningHub};
pub use registry::{DeviceRegistry, DeviceSink, InMemoryNodeSource, NodeRecord, NodeSource};
pub use router::AppState;
pub use state::Config;
