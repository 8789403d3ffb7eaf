//! Dispatch Core (component F).
//!
//! Normalizes both wire protocols (Hue PUT bodies and Alexa directives) to a
//! single `SemanticEvent` and delivers it to the addressed device sink.
//! Delivery is fire-and-forget: the dispatch core never awaits any effect of
//! the sink beyond the `receive` call returning (which itself may be a
//! non-blocking hand-off via `registry::AsyncSink`).

use crate::registry::DeviceRegistry;

/// Color payload variants a `SemanticEvent::Color` can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorPayload {
    /// Hue/saturation/brightness, each normalized to `[0,1]` except `hue`
    /// which stays in degrees `[0,360)`.
    HueSat {
        hue: f64,
        saturation: f64,
        brightness: f64,
    },
    /// CIE xy chromaticity plus brightness normalized to `[0,1]`.
    Xy { xy: [f64; 2], brightness: f64 },
    /// Mired color temperature plus brightness normalized to `[0,1]`.
    Ct { ct: u32, brightness: f64 },
    /// Opaque Alexa `ColorController.SetColor` payload, passed through
    /// unmodified (hue/saturation/brightness object from the directive).
    Alexa(serde_json::Value),
}

/// The normalized internal event form, mapped from two external
/// wire protocols at the boundary; everything downstream of dispatch only
/// ever sees this type.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticEvent {
    /// `true` = on, `false` = off.
    Power(bool),
    /// Percentage in `[0,100]`.
    Brightness(f64),
    Color(ColorPayload),
}

impl SemanticEvent {
    /// Returns the wire `topic` string for this event (`power`, `brightness`,
    /// or `color`).
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::Power(_) => "power",
            Self::Brightness(_) => "brightness",
            Self::Color(_) => "color",
        }
    }
}

/// Outcome of a dispatch attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event was handed off to the resolved device's sink.
    Delivered,
    /// No device resolved for the given id/token.
    NotFound,
}

/// Delivers `event` to the device addressed by `device_id` via `registry`.
///
/// Fire-and-forget: once the sink's `receive` future is awaited, this
/// function returns regardless of what the sink does with the event - a
/// slow or blocking sink must be wrapped (e.g. `registry::AsyncSink`) by the
/// host environment before being registered, not by this function.
pub async fn dispatch(
    registry: &DeviceRegistry,
    device_id: &str,
    event: SemanticEvent,
) -> DispatchOutcome {
    match registry.sink(device_id).await {
        Some(sink) => {
            sink.receive(event).await;
            DispatchOutcome::Delivered
        }
        None => DispatchOutcome::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DeviceRegistry, InMemoryNodeSource, NodeRecord, RecordingSink};
    use std::sync::Arc;

    #[tokio::test]
    async fn dispatch_delivers_to_resolved_sink() {
        let source = Arc::new(InMemoryNodeSource::new());
        let sink = Arc::new(RecordingSink::default());
        source.register(
            NodeRecord {
                id: "d1".into(),
                name: "Lamp".into(),
            },
            sink.clone(),
        );
        let registry = DeviceRegistry::new("001788fffe123456".into(), source);

        let outcome = dispatch(&registry, "d1", SemanticEvent::Power(true)).await;

        assert_eq!(outcome, DispatchOutcome::Delivered);
        assert_eq!(sink.events.lock().as_slice(), &[SemanticEvent::Power(true)]);
    }

    #[tokio::test]
    async fn dispatch_reports_not_found_for_unknown_device() {
        let source = Arc::new(InMemoryNodeSource::new());
        let registry = DeviceRegistry::new("001788fffe123456".into(), source);

        let outcome = dispatch(&registry, "ghost", SemanticEvent::Power(true)).await;

        assert_eq!(outcome, DispatchOutcome::NotFound);
    }

    #[test]
    fn topic_names_match_wire_vocabulary() {
        assert_eq!(SemanticEvent::Power(true).topic(), "power");
        assert_eq!(SemanticEvent::Brightness(50.0).topic(), "brightness");
        assert_eq!(
            SemanticEvent::Color(ColorPayload::Ct {
                ct: 300,
                brightness: 1.0
            })
            .topic(),
            "color"
        );
    }
}
