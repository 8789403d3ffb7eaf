//! Centralized error types for the bridge core library.
//!
//! A `thiserror`-based enum per operational error surface, an `ErrorCode`
//! trait for machine-readable codes, and `IntoResponse` for the rare path
//! that needs a generic JSON error body. Most Hue/Alexa error responses do NOT go through this type -
//! Echo requires bit-exact wire shapes (see `hue::types::HueErrorBody` and
//! `alexa::types::ErrorResponse`), so this type covers operational failures:
//! socket bind failures, bad configuration, internal errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Trait for error types that provide a machine-readable error code.
pub trait ErrorCode {
    /// Returns a machine-readable error code for API responses.
    fn code(&self) -> &'static str;
}

/// Errors from the SSDP responder (component B).
#[derive(Debug, Error)]
pub enum SsdpError {
    /// The UDP socket could not be bound or could not join the multicast group.
    #[error("SSDP socket error: {0}")]
    Socket(#[source] std::io::Error),
}

impl ErrorCode for SsdpError {
    fn code(&self) -> &'static str {
        match self {
            Self::Socket(_) => "ssdp_socket_failed",
        }
    }
}

/// Application-wide error type for the bridge server.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum BridgeError {
    /// SSDP/network discovery failed.
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// The TCP listener or UDP socket could not be bound.
    #[error("bind failed: {0}")]
    Bind(String),

    /// Configuration is missing a required value or is internally inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An uncaught failure while handling a request. Never propagated to the
    /// framework - directive/REST handlers catch everything and return this
    /// only when recovery is impossible.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Maps the error to an appropriate HTTP status code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Discovery(_) | Self::Bind(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ErrorCode for BridgeError {
    fn code(&self) -> &'static str {
        match self {
            Self::Discovery(_) => "discovery_failed",
            Self::Bind(_) => "bind_failed",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<SsdpError> for BridgeError {
    fn from(err: SsdpError) -> Self {
        Self::Discovery(err.to_string())
    }
}

/// JSON response body for generic (non-Hue, non-Alexa) error responses.
#[derive(Serialize)]
struct ErrorResponseBody {
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponseBody {
            error: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

/// Convenient Result alias for application-wide operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
