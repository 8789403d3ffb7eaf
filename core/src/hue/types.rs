//! Hue v1 REST wire types.
//!
//! Field names and casing are bit-exact - Echo validates them. Shapes are
//! built directly as literal structs rather than routed through
//! `crate::error::BridgeError`, since the generic error envelope there does
//! not match Hue's numeric `type` error codes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Hue error body `type` codes actually used by this facade.
pub mod error_type {
    /// Generic "not found" (e.g. unknown resource).
    pub const NOT_FOUND: u32 = 1;
    /// Invalid or missing parameters in the request body.
    pub const INVALID_PARAMETERS: u32 = 6;
}

#[derive(Debug, Serialize)]
pub struct HueError {
    #[serde(rename = "type")]
    pub typ: u32,
    pub address: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct HueErrorEnvelope {
    pub error: HueError,
}

impl HueErrorEnvelope {
    #[must_use]
    pub fn new(typ: u32, address: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: HueError {
                typ,
                address: address.into(),
                description: description.into(),
            },
        }
    }
}

/// Builds the `[{"success":{"username":..., "clientkey":...}}]` pairing
/// response body.
#[must_use]
pub fn pairing_response(hub_id: &str) -> Value {
    serde_json::json!([{
        "success": {
            "username": format!("node-red-alexa-{hub_id}"),
            "clientkey": format!("node-red-alexa-{hub_id}"),
        }
    }])
}

/// Bridge config object returned by `GET /api/config` and embedded in
/// `GET /api/:user`.
#[derive(Debug, Serialize)]
pub struct BridgeConfig {
    pub name: String,
    pub datastoreversion: String,
    pub swversion: String,
    pub apiversion: String,
    pub mac: String,
    pub bridgeid: String,
    pub factorynew: bool,
    pub replacesbridgeid: Option<String>,
    pub modelid: String,
    pub ipaddress: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<Value>,
}

impl BridgeConfig {
    /// Builds the bridge-config object for a hub. `whitelist`, when
    /// present, must contain the paired user (the bridge-config object
    /// requires `config.whitelist` to contain the paired user).
    #[must_use]
    pub fn new(hub_id_upper: &str, local_ip: &str, username: Option<&str>) -> Self {
        let whitelist = username.map(|user| {
            serde_json::json!({
                user: {
                    "last use date": "2024-01-01T00:00:00",
                    "create date": "2024-01-01T00:00:00",
                    "name": "Echo"
                }
            })
        });
        Self {
            name: "Philips hue".to_string(),
            datastoreversion: "163".to_string(),
            swversion: "1965111030".to_string(),
            apiversion: "1.65.0".to_string(),
            mac: hub_id_upper
                .as_bytes()
                .chunks(2)
                .map(|c| std::str::from_utf8(c).unwrap_or("00"))
                .collect::<Vec<_>>()
                .join(":"),
            bridgeid: hub_id_upper.to_string(),
            factorynew: false,
            replacesbridgeid: None,
            modelid: "BSB002".to_string(),
            ipaddress: local_ip.to_string(),
            whitelist,
        }
    }
}

/// Full dataset object returned by `GET /api/:user`.
#[derive(Debug, Serialize)]
pub struct FullState {
    pub lights: Map<String, Value>,
    pub groups: Map<String, Value>,
    pub config: BridgeConfig,
    pub schedules: Map<String, Value>,
    pub scenes: Map<String, Value>,
    pub rules: Map<String, Value>,
    pub sensors: Map<String, Value>,
    pub resourcelinks: Map<String, Value>,
}

/// Default light `state` object.
#[derive(Debug, Serialize, Clone)]
pub struct LightState {
    pub on: bool,
    pub bri: u32,
    pub hue: u32,
    pub sat: u32,
    pub effect: &'static str,
    pub xy: [f64; 2],
    pub ct: u32,
    pub alert: &'static str,
    pub colormode: &'static str,
    pub mode: &'static str,
    pub reachable: bool,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            on: false,
            bri: 254,
            hue: 0,
            sat: 254,
            effect: "none",
            xy: [0.0, 0.0],
            ct: 199,
            alert: "none",
            colormode: "ct",
            mode: "homeautomation",
            reachable: true,
        }
    }
}

/// A light object as returned by `/lights` and `/lights/:id`.
#[derive(Debug, Serialize)]
pub struct LightObject {
    pub state: LightState,
    #[serde(rename = "type")]
    pub typ: &'static str,
    pub name: String,
    pub modelid: &'static str,
    pub manufacturername: &'static str,
    pub productname: &'static str,
    pub uniqueid: String,
    pub swversion: &'static str,
}

impl LightObject {
    /// Builds a light object with the defaults and identity fields Echo
    /// expects. State is always the default - the hub does not track
    /// actual device state.
    #[must_use]
    pub fn new(name: String, uniqueid: String) -> Self {
        Self {
            state: LightState::default(),
            typ: "Extended color light",
            name,
            modelid: "LCT015",
            manufacturername: "Signify",
            productname: "Hue color lamp",
            uniqueid,
            swversion: "1.88.1",
        }
    }
}

/// Body of `PUT /api/:user/lights/:id/state`.
///
/// Every field is optional; which are present determines the
/// `SemanticEvent` mapping (see `crate::hue::mapping`).
#[derive(Debug, Deserialize, Default)]
pub struct HueStateUpdate {
    pub on: Option<bool>,
    pub bri: Option<u32>,
    pub hue: Option<u32>,
    pub sat: Option<u32>,
    pub xy: Option<[f64; 2]>,
    pub ct: Option<u32>,
}

impl HueStateUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.on.is_none()
            && self.bri.is_none()
            && self.hue.is_none()
            && self.sat.is_none()
            && self.xy.is_none()
            && self.ct.is_none()
    }
}
