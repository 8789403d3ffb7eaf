//! Hue v1 REST Facade route handlers.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Map, Value};

use crate::dispatch::dispatch;
use crate::hue::mapping::map_hue_state;
use crate::hue::types::{
    error_type, pairing_response, BridgeConfig, FullState, HueErrorEnvelope, HueStateUpdate,
    LightObject,
};
use crate::router::AppState;
use crate::sanitize::strip_html;

/// Recognized `HueState` keys. Only these are
/// ever echoed in the PUT success envelope.
const RECOGNIZED_STATE_KEYS: [&str; 6] = ["on", "bri", "hue", "sat", "xy", "ct"];

fn not_found(id: &str) -> Response {
    let body = HueErrorEnvelope::new(
        error_type::NOT_FOUND,
        format!("/lights/{id}"),
        format!("resource, /lights/{id}, not available"),
    );
    (StatusCode::NOT_FOUND, Json(vec![body])).into_response()
}

fn invalid_parameters(id: &str) -> Response {
    let body = HueErrorEnvelope::new(
        error_type::INVALID_PARAMETERS,
        format!("/lights/{id}/state"),
        "body contains invalid parameters".to_string(),
    );
    (StatusCode::BAD_REQUEST, Json(vec![body])).into_response()
}

/// `POST /api` - pairing. The `devicetype` field is accepted but
/// ignored; the body is read loosely (it may even be absent) since Echo's
/// behavior here varies across firmware.
pub async fn pairing(State(state): State<AppState>, body: Option<Json<Value>>) -> Response {
    let _ = body;
    Json(pairing_response(&state.hub_id)).into_response()
}

/// `GET /api/config` and its `/api/:user/config` alias.
pub async fn get_config(State(state): State<AppState>) -> Response {
    let config = BridgeConfig::new(&state.hub_id_upper, &state.network.local_ip().to_string(), None);
    Json(config).into_response()
}

async fn build_lights_map(state: &AppState) -> Map<String, Value> {
    let entries = state.registry.list_devices().await;
    let mut lights = Map::new();
    for entry in entries {
        let light = LightObject::new(strip_html(&entry.name), entry.uniqueid);
        let value = serde_json::to_value(light).unwrap_or(Value::Null);
        lights.insert(entry.index.to_string(), value);
    }
    lights
}

/// `GET /api/:user`: the full dataset object.
pub async fn get_full_state(State(state): State<AppState>, Path(user): Path<String>) -> Response {
    let lights = build_lights_map(&state).await;
    let config = BridgeConfig::new(
        &state.hub_id_upper,
        &state.network.local_ip().to_string(),
        Some(&user),
    );
    let full = FullState {
        lights,
        groups: Map::new(),
        config,
        schedules: Map::new(),
        scenes: Map::new(),
        rules: Map::new(),
        sensors: Map::new(),
        resourcelinks: Map::new(),
    };
    Json(full).into_response()
}

/// `GET /api/:user/lights`.
pub async fn get_lights(State(state): State<AppState>, Path(_user): Path<String>) -> Response {
    Json(build_lights_map(&state).await).into_response()
}

/// `GET /api/:user/lights/:id`.
pub async fn get_light(
    State(state): State<AppState>,
    Path((_user, id)): Path<(String, String)>,
) -> Response {
    let Some(device_id) = state.registry.resolve(&id).await else {
        return not_found(&id);
    };
    let entries = state.registry.list_devices().await;
    let Some(entry) = entries.into_iter().find(|e| e.device_id == device_id) else {
        return not_found(&id);
    };
    let light = LightObject::new(strip_html(&entry.name), entry.uniqueid);
    Json(light).into_response()
}

/// `PUT /api/:user/lights/:id/state`.
///
/// Builds the success envelope by walking the *raw request body's* key
/// order (via `serde_json::Map`, which preserves insertion order with the
/// `preserve_order` feature) rather than a fixed field order, since Echo
/// expects mutated keys reported in the order they appeared in the request.
pub async fn put_light_state(
    State(state): State<AppState>,
    Path((_user, id)): Path<(String, String)>,
    body: axum::body::Bytes,
) -> Response {
    let Ok(raw) = serde_json::from_slice::<Value>(&body) else {
        return invalid_parameters(&id);
    };
    let Some(raw_map) = raw.as_object() else {
        return invalid_parameters(&id);
    };
    let Ok(update) = serde_json::from_value::<HueStateUpdate>(raw.clone()) else {
        return invalid_parameters(&id);
    };
    if update.is_empty() {
        return invalid_parameters(&id);
    }
    let Some(event) = map_hue_state(&update) else {
        return invalid_parameters(&id);
    };

    let Some(device_id) = state.registry.resolve(&id).await else {
        return not_found(&id);
    };

    dispatch(&state.registry, &device_id, event).await;

    let mut success = Vec::new();
    for (key, value) in raw_map {
        if RECOGNIZED_STATE_KEYS.contains(&key.as_str()) {
            let mut entry = Map::new();
            entry.insert(format!("/lights/{id}/state/{key}"), value.clone());
            success.push(serde_json::json!({ "success": Value::Object(entry) }));
        }
    }
    Json(success).into_response()
}
