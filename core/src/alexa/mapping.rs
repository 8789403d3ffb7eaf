//! Directive → `SemanticEvent` mapping.
use serde_json::Value;

use crate::dispatch::{ColorPayload, SemanticEvent};

/// Result of mapping a directive: the normalized event to dispatch plus the
/// `context.properties[0]` fields the success response must report.
pub struct MappedDirective {
    pub event: SemanticEvent,
    pub property_namespace: &'static str,
    pub property_name: &'static str,
    pub property_value: Value,
}

/// Maps `(namespace, name, payload)` to a `MappedDirective`, or `None` if the
/// pair is unsupported or the payload is missing a required field - both
/// cases are reported identically by the caller as `INVALID_DIRECTIVE`
/// (every unsupported `(namespace,name)` pair).
#[must_use]
pub fn map_directive(namespace: &str, name: &str, payload: &Value) -> Option<MappedDirective> {
    match (namespace, name) {
        ("Alexa.PowerController", "TurnOn") => Some(MappedDirective {
            event: SemanticEvent::Power(true),
            property_namespace: "Alexa.PowerController",
            property_name: "powerState",
            property_value: Value::String("ON".to_string()),
        }),
        ("Alexa.PowerController", "TurnOff") => Some(MappedDirective {
            event: SemanticEvent::Power(false),
            property_namespace: "Alexa.PowerController",
            property_name: "powerState",
            property_value: Value::String("OFF".to_string()),
        }),
        ("Alexa.BrightnessController", "SetBrightness") => {
            let brightness = payload.get("brightness")?.as_f64()?;
            Some(MappedDirective {
                event: SemanticEvent::Brightness(brightness),
                property_namespace: "Alexa.BrightnessController",
                property_name: "brightness",
                property_value: serde_json::json!(brightness),
            })
        }
        ("Alexa.BrightnessController", "AdjustBrightness") => {
            let delta = payload.get("brightnessDelta")?.as_f64()?;
            Some(MappedDirective {
                event: SemanticEvent::Brightness(delta),
                property_namespace: "Alexa.BrightnessController",
                property_name: "brightness",
                property_value: serde_json::json!(delta),
            })
        }
        ("Alexa.ColorController", "SetColor") => {
            let color = payload.get("color")?.clone();
            Some(MappedDirective {
                event: SemanticEvent::Color(ColorPayload::Alexa(color.clone())),
                property_namespace: "Alexa.ColorController",
                property_name: "color",
                property_value: color,
            })
        }
        _ => None,
    }
}
