//! HTTP surface wiring: shared `AppState` and the combined router for the
//! UPnP descriptor, Hue v1 REST facade, and Alexa directive endpoint.
//!
//! One `Router::new()` with routes merged in, state attached once, and
//! cross-cutting concerns applied as `tower` layers rather than
//! per-handler checks.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::context::HubNetwork;
use crate::descriptor::build_description_xml;
use crate::registry::DeviceRegistry;
use crate::state::Config;

/// Maximum accepted request body size: Hue/Alexa payloads are small JSON
/// objects, so this is a generous but finite cap against abuse.
const MAX_BODY_BYTES: usize = 10 * 1024;

/// Shared application state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    /// Raw (lowercase) hub id, used in `uniqueid`s and pairing usernames.
    pub hub_id: String,
    /// Uppercase hub id, used as `bridgeid`/`mac`.
    pub hub_id_upper: String,
    pub registry: Arc<DeviceRegistry>,
    pub network: HubNetwork,
    pub config: Config,
}

async fn get_description_xml(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::response::Response {
    let bridge_uuid = crate::context::bridge_uuid(&state.hub_id);
    let base_url = state.network.url_builder().base_url();
    match build_description_xml(&state.hub_id, &bridge_uuid, &base_url) {
        Ok(xml) => (
            StatusCode::OK,
            [("content-type", "application/xml")],
            xml,
        )
            .into_response(),
        Err(err) => {
            log::error!("failed to render UPnP descriptor: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Builds the complete router: descriptor, Hue facade, Alexa directive
/// endpoint, plus the ambient middleware stack.
#[must_use]
pub fn build_router(state: AppState, config: &Config) -> Router {
    let limiter = Arc::new(crate::middleware::RateLimiter::new(
        config.rate_limit_max,
        Duration::from_secs(config.rate_limit_window_secs),
    ));

    let mut router = Router::new()
        .route("/description.xml", get(get_description_xml))
        .route("/api", post(crate::hue::routes::pairing))
        .route("/api/config", get(crate::hue::routes::get_config))
        .route("/api/{user}/config", get(crate::hue::routes::get_config))
        .route("/api/{user}", get(crate::hue::routes::get_full_state))
        .route("/api/{user}/lights", get(crate::hue::routes::get_lights))
        .route("/api/{user}/lights/", get(crate::hue::routes::get_lights))
        .route(
            "/api/{user}/lights/{id}",
            get(crate::hue::routes::get_light),
        )
        .route(
            "/api/{user}/lights/{id}/state",
            put(crate::hue::routes::put_light_state),
        )
        .route("/alexa", post(crate::alexa::routes::handle_alexa))
        .route_layer(axum::middleware::from_fn_with_state(
            limiter,
            crate::middleware::rate_limit,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("strict-transport-security"),
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http());

    if config.debug {
        router = router.layer(axum::middleware::from_fn(
            crate::middleware::verbose_request_log,
        ));
    }

    router.with_state(state)
}

/// Binds a `TcpListener` and returns the local socket address the hub ended
/// up bound to (relevant when `port` is 0 for ephemeral binding in tests).
///
/// # Errors
///
/// Returns an error if the port cannot be bound.
pub async fn bind_tcp_listener(port: u16) -> std::io::Result<(tokio::net::TcpListener, SocketAddr)> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    let addr = listener.local_addr()?;
    Ok((listener, addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DeviceRegistry, InMemoryNodeSource};
    use axum::body::Body;
    use axum::http::Request;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let source = Arc::new(InMemoryNodeSource::new());
        AppState {
            hub_id: "001788fffe123456".into(),
            hub_id_upper: "001788FFFE123456".into(),
            registry: Arc::new(DeviceRegistry::new("001788fffe123456".into(), source)),
            network: HubNetwork::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 80),
            config: Config::default(),
        }
    }

    #[tokio::test]
    async fn debug_enabled_router_still_serves_requests() {
        let config = Config {
            debug: true,
            ..Config::default()
        };
        let app = build_router(test_state(), &config);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/description.xml")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn debug_disabled_router_still_serves_requests() {
        let app = build_router(test_state(), &Config::default());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/description.xml")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
