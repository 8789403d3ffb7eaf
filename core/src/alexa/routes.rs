//! Alexa Directive Handler (component E): single route `POST /alexa`.
//!
//! Parses the envelope manually against `serde_json::Value` rather than a
//! strict `Deserialize` struct, so that malformed requests produce the exact
//! `ErrorResponse` shapes Echo expects instead of axum's generic JSON
//! rejection body.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use futures::FutureExt;
use serde_json::Value;

use crate::alexa::mapping::map_directive;
use crate::alexa::types::{error_type, AlexaEndpoint, ControlResponse, DiscoverResponse, ErrorResponse};
use crate::dispatch::dispatch;
use crate::router::AppState;
use crate::sanitize::strip_html;

fn error_response(
    status: StatusCode,
    typ: &'static str,
    message: impl Into<String>,
    message_id: String,
    correlation_token: Option<String>,
) -> Response {
    let body = ErrorResponse::new(typ, message, message_id, correlation_token);
    (status, Json(body)).into_response()
}

fn invalid_directive(message: impl Into<String>, message_id: String) -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        error_type::INVALID_DIRECTIVE,
        message,
        message_id,
        None,
    )
}

/// `POST /alexa`. Accepts the raw JSON body as a `Value` so every
/// validation failure can be reported with the caller-visible shape
/// pinned down below, instead of axum's default deserialization error.
///
/// Processing is caught with `catch_unwind` rather than relying solely on
/// the ambient `CatchPanicLayer`: that layer returns a generic plain-text
/// body, but an unexpected failure here must surface as the literal
/// `ErrorResponse` envelope with `payload.type == "INTERNAL_ERROR"` that
/// Echo's Alexa integration expects, never a bare framework error.
pub async fn handle_alexa(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    match AssertUnwindSafe(process_alexa(state, body))
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(panic) => {
            log::error!(
                "panic while processing Alexa directive: {}",
                panic_message(&panic)
            );
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_type::INTERNAL_ERROR,
                "Internal error while processing directive",
                "unknown".to_string(),
                None,
            )
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

async fn process_alexa(state: AppState, body: Value) -> Response {
    let Some(directive) = body.get("directive") else {
        return invalid_directive("Missing directive", "unknown".to_string());
    };
    let Some(header) = directive.get("header") else {
        return invalid_directive("Missing header", "unknown".to_string());
    };
    let Some(namespace) = header.get("namespace").and_then(Value::as_str) else {
        return invalid_directive("Missing header.namespace", "unknown".to_string());
    };
    let name = header.get("name").and_then(Value::as_str).unwrap_or("");
    let message_id = header
        .get("messageId")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let correlation_token = header
        .get("correlationToken")
        .and_then(Value::as_str)
        .map(String::from);
    let payload = directive.get("payload").cloned().unwrap_or(Value::Null);
    let endpoint_id = directive
        .get("endpoint")
        .and_then(|e| e.get("endpointId"))
        .and_then(Value::as_str)
        .map(String::from);

    if namespace == "Alexa.Discovery" && name == "Discover" {
        return handle_discover(&state, message_id).await;
    }

    let Some(endpoint_id) = endpoint_id else {
        return invalid_directive("Missing endpointId", message_id);
    };

    let Some(device_id) = state.registry.resolve(&endpoint_id).await else {
        return error_response(
            StatusCode::NOT_FOUND,
            error_type::ENDPOINT_UNREACHABLE,
            format!("No device for endpointId {endpoint_id}"),
            message_id,
            correlation_token,
        );
    };

    let Some(mapped) = map_directive(namespace, name, &payload) else {
        return invalid_directive(
            format!("Unsupported directive: {namespace}.{name}"),
            message_id,
        );
    };

    dispatch(&state.registry, &device_id, mapped.event).await;

    let response = ControlResponse::new(
        endpoint_id,
        message_id,
        correlation_token,
        mapped.property_namespace,
        mapped.property_name,
        mapped.property_value,
        Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    );
    Json(response).into_response()
}

async fn handle_discover(state: &AppState, message_id: String) -> Response {
    let entries = state.registry.list_devices().await;
    let endpoints = entries
        .into_iter()
        .map(|entry| AlexaEndpoint::new(entry.device_id, strip_html(&entry.name)))
        .collect();
    Json(DiscoverResponse::new(endpoints, message_id)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DeviceRegistry, DeviceSink, InMemoryNodeSource, NodeRecord, RecordingSink};
    use crate::router::build_router;
    use crate::state::Config;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// A sink that panics on delivery, used to exercise the `/alexa`
    /// internal-error boundary.
    #[derive(Default)]
    struct PanickingSink;

    #[async_trait]
    impl DeviceSink for PanickingSink {
        async fn receive(&self, _event: crate::dispatch::SemanticEvent) {
            panic!("sink failure");
        }
    }

    fn test_state() -> (AppState, Arc<RecordingSink>) {
        let source = Arc::new(InMemoryNodeSource::new());
        let sink = Arc::new(RecordingSink::default());
        source.register(
            NodeRecord {
                id: "d1".into(),
                name: "<b>Lamp</b>".into(),
            },
            sink.clone(),
        );
        let registry = Arc::new(DeviceRegistry::new("001788fffe123456".into(), source));
        let state = AppState {
            hub_id: "001788fffe123456".into(),
            hub_id_upper: "001788FFFE123456".into(),
            registry,
            network: crate::context::HubNetwork::new(
                std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
                80,
            ),
            config: Config::default(),
        };
        (state, sink)
    }

    async fn post_alexa(state: AppState, body: Value) -> (StatusCode, Value) {
        let app = build_router(state, &Config::default());
        let request = Request::builder()
            .method("POST")
            .uri("/alexa")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn discover_lists_sanitized_friendly_names() {
        let (state, _sink) = test_state();
        let body = serde_json::json!({
            "directive": {
                "header": {"namespace": "Alexa.Discovery", "name": "Discover", "messageId": "m1", "payloadVersion": "3"},
                "payload": {}
            }
        });
        let (status, value) = post_alexa(state, body).await;
        assert_eq!(status, StatusCode::OK);
        let endpoints = value["event"]["payload"]["endpoints"].as_array().unwrap();
        assert_eq!(endpoints.len(), 1);
        let name = endpoints[0]["friendlyName"].as_str().unwrap();
        assert!(!name.contains('<'));
        assert!(!name.contains('>'));
    }

    #[tokio::test]
    async fn missing_namespace_returns_invalid_directive() {
        let (state, _sink) = test_state();
        let body = serde_json::json!({"directive": {"header": {"name": "TurnOn"}}});
        let (status, value) = post_alexa(state, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["event"]["payload"]["type"], "INVALID_DIRECTIVE");
    }

    #[tokio::test]
    async fn unknown_endpoint_returns_endpoint_unreachable() {
        let (state, _sink) = test_state();
        let body = serde_json::json!({
            "directive": {
                "header": {"namespace": "Alexa.PowerController", "name": "TurnOn", "messageId": "m1"},
                "endpoint": {"endpointId": "ghost"},
                "payload": {}
            }
        });
        let (status, value) = post_alexa(state, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            value["event"]["payload"]["type"],
            "ENDPOINT_UNREACHABLE"
        );
    }

    #[tokio::test]
    async fn set_brightness_dispatches_and_reports_context_value() {
        let (state, sink) = test_state();
        let body = serde_json::json!({
            "directive": {
                "header": {
                    "namespace": "Alexa.BrightnessController",
                    "name": "SetBrightness",
                    "messageId": "m1",
                    "correlationToken": "c1"
                },
                "endpoint": {"endpointId": "d1"},
                "payload": {"brightness": 42}
            }
        });
        let (status, value) = post_alexa(state, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["event"]["header"]["name"], "Response");
        assert_eq!(value["context"]["properties"][0]["value"], 42.0);
        assert_eq!(
            value["context"]["properties"][0]["namespace"],
            "Alexa.BrightnessController"
        );

        let events = sink.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], crate::dispatch::SemanticEvent::Brightness(42.0));
    }

    #[tokio::test]
    async fn sink_panic_returns_internal_error_envelope_not_generic_500() {
        let source = Arc::new(InMemoryNodeSource::new());
        source.register(
            NodeRecord {
                id: "d1".into(),
                name: "Lamp".into(),
            },
            Arc::new(PanickingSink),
        );
        let registry = Arc::new(DeviceRegistry::new("001788fffe123456".into(), source));
        let state = AppState {
            hub_id: "001788fffe123456".into(),
            hub_id_upper: "001788FFFE123456".into(),
            registry,
            network: crate::context::HubNetwork::new(
                std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
                80,
            ),
            config: Config::default(),
        };
        let body = serde_json::json!({
            "directive": {
                "header": {"namespace": "Alexa.PowerController", "name": "TurnOn", "messageId": "m1"},
                "endpoint": {"endpointId": "d1"},
                "payload": {}
            }
        });
        let (status, value) = post_alexa(state, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value["event"]["payload"]["type"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn unsupported_directive_returns_invalid_directive() {
        let (state, _sink) = test_state();
        let body = serde_json::json!({
            "directive": {
                "header": {"namespace": "Alexa.LockController", "name": "Lock", "messageId": "m1"},
                "endpoint": {"endpointId": "d1"},
                "payload": {}
            }
        });
        let (status, value) = post_alexa(state, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["event"]["payload"]["message"]
            .as_str()
            .unwrap()
            .contains("Alexa.LockController.Lock"));
    }
}
