//! Alexa Smart Home v3 wire types.
//!
//! Field names and casing are bit-exact, same rationale as `hue::types` -
//! response shapes are built as literal structs rather than routed through
//! `crate::error::BridgeError`.

use serde::Serialize;
use serde_json::Value;

/// Error `type` codes actually used by this handler.
pub mod error_type {
    pub const INVALID_DIRECTIVE: &str = "INVALID_DIRECTIVE";
    pub const ENDPOINT_UNREACHABLE: &str = "ENDPOINT_UNREACHABLE";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

#[derive(Debug, Serialize)]
pub struct ResponseHeader {
    pub namespace: &'static str,
    pub name: &'static str,
    #[serde(rename = "messageId")]
    pub message_id: String,
    #[serde(rename = "correlationToken", skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,
    #[serde(rename = "payloadVersion")]
    pub payload_version: &'static str,
}

impl ResponseHeader {
    #[must_use]
    pub fn new(
        namespace: &'static str,
        name: &'static str,
        message_id: String,
        correlation_token: Option<String>,
    ) -> Self {
        Self {
            namespace,
            name,
            message_id,
            correlation_token,
            payload_version: "3",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    #[serde(rename = "type")]
    pub typ: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub event: ErrorEvent,
}

#[derive(Debug, Serialize)]
pub struct ErrorEvent {
    pub header: ResponseHeader,
    pub payload: ErrorPayload,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(
        typ: &'static str,
        message: impl Into<String>,
        message_id: String,
        correlation_token: Option<String>,
    ) -> Self {
        Self {
            event: ErrorEvent {
                header: ResponseHeader::new("Alexa", "ErrorResponse", message_id, correlation_token),
                payload: ErrorPayload {
                    typ,
                    message: message.into(),
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SupportedProperty {
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CapabilityProperties {
    pub supported: Vec<SupportedProperty>,
    #[serde(rename = "proactivelyReported")]
    pub proactively_reported: bool,
    pub retrievable: bool,
}

#[derive(Debug, Serialize)]
pub struct Capability {
    #[serde(rename = "type")]
    pub typ: &'static str,
    pub interface: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<CapabilityProperties>,
}

impl Capability {
    fn alexa() -> Self {
        Self {
            typ: "AlexaInterface",
            interface: "Alexa",
            version: "3",
            properties: None,
        }
    }

    fn interface(name: &'static str, property: &'static str) -> Self {
        Self {
            typ: "AlexaInterface",
            interface: name,
            version: "3",
            properties: Some(CapabilityProperties {
                supported: vec![SupportedProperty { name: property }],
                proactively_reported: false,
                retrievable: true,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlexaEndpoint {
    #[serde(rename = "endpointId")]
    pub endpoint_id: String,
    #[serde(rename = "manufacturerName")]
    pub manufacturer_name: &'static str,
    #[serde(rename = "friendlyName")]
    pub friendly_name: String,
    pub description: &'static str,
    #[serde(rename = "displayCategories")]
    pub display_categories: Vec<&'static str>,
    pub capabilities: Vec<Capability>,
}

impl AlexaEndpoint {
    /// Builds a discovery endpoint for a device: the four required
    /// capabilities (`Alexa`, `PowerController`, `BrightnessController`,
    /// `ColorController`) and `displayCategories: ["LIGHT","SWITCH"]`.
    /// `friendly_name` must already be HTML-sanitized by the caller.
    #[must_use]
    pub fn new(endpoint_id: String, friendly_name: String) -> Self {
        Self {
            endpoint_id,
            manufacturer_name: "Signify",
            friendly_name,
            description: "Virtual light exposed by the LAN bridge emulator",
            display_categories: vec!["LIGHT", "SWITCH"],
            capabilities: vec![
                Capability::alexa(),
                Capability::interface("Alexa.PowerController", "powerState"),
                Capability::interface("Alexa.BrightnessController", "brightness"),
                Capability::interface("Alexa.ColorController", "color"),
            ],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiscoverPayload {
    pub endpoints: Vec<AlexaEndpoint>,
}

#[derive(Debug, Serialize)]
pub struct DiscoverEvent {
    pub header: ResponseHeader,
    pub payload: DiscoverPayload,
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub event: DiscoverEvent,
}

impl DiscoverResponse {
    #[must_use]
    pub fn new(endpoints: Vec<AlexaEndpoint>, message_id: String) -> Self {
        Self {
            event: DiscoverEvent {
                header: ResponseHeader::new(
                    "Alexa.Discovery",
                    "Discover.Response",
                    message_id,
                    None,
                ),
                payload: DiscoverPayload { endpoints },
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ControlEndpoint {
    #[serde(rename = "endpointId")]
    pub endpoint_id: String,
}

#[derive(Debug, Serialize)]
pub struct ControlEvent {
    pub header: ResponseHeader,
    pub endpoint: ControlEndpoint,
    pub payload: Value,
}

#[derive(Debug, Serialize)]
pub struct PropertyReport {
    pub namespace: &'static str,
    pub name: &'static str,
    pub value: Value,
    #[serde(rename = "timeOfSample")]
    pub time_of_sample: String,
    #[serde(rename = "uncertaintyInMilliseconds")]
    pub uncertainty_in_milliseconds: u32,
}

#[derive(Debug, Serialize)]
pub struct ResponseContext {
    pub properties: Vec<PropertyReport>,
}

#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub event: ControlEvent,
    pub context: ResponseContext,
}

impl ControlResponse {
    #[must_use]
    pub fn new(
        endpoint_id: String,
        message_id: String,
        correlation_token: Option<String>,
        property_namespace: &'static str,
        property_name: &'static str,
        property_value: Value,
        time_of_sample: String,
    ) -> Self {
        Self {
            event: ControlEvent {
                header: ResponseHeader::new("Alexa", "Response", message_id, correlation_token),
                endpoint: ControlEndpoint { endpoint_id },
                payload: serde_json::json!({}),
            },
            context: ResponseContext {
                properties: vec![PropertyReport {
                    namespace: property_namespace,
                    name: property_name,
                    value: property_value,
                    time_of_sample,
                    uncertainty_in_milliseconds: 0,
                }],
            },
        }
    }
}
