//! PUT body → `SemanticEvent` mapping.
use crate::dispatch::{ColorPayload, SemanticEvent};
use crate::hue::types::HueStateUpdate;

/// Maps a `HueStateUpdate` to a `SemanticEvent`, following the precedence
/// order below (first match wins). Returns `None` if no recognized field
/// is present - callers must then return the `type:6` invalid-parameters
/// error and must not deliver an event.
#[must_use]
pub fn map_hue_state(update: &HueStateUpdate) -> Option<SemanticEvent> {
    if let Some(on) = update.on {
        return Some(SemanticEvent::Power(on));
    }

    if let Some(bri) = update.bri {
        if update.hue.is_none() && update.sat.is_none() {
            let pct = (f64::from(bri) / 254.0 * 100.0).round().clamp(0.0, 100.0);
            return Some(SemanticEvent::Brightness(pct));
        }
    }

    if let (Some(hue), Some(sat)) = (update.hue, update.sat) {
        let brightness = f64::from(update.bri.unwrap_or(254)) / 254.0;
        return Some(SemanticEvent::Color(ColorPayload::HueSat {
            hue: f64::from(hue),
            saturation: f64::from(sat) / 254.0,
            brightness,
        }));
    }

    if let Some(xy) = update.xy {
        let brightness = f64::from(update.bri.unwrap_or(254)) / 254.0;
        return Some(SemanticEvent::Color(ColorPayload::Xy { xy, brightness }));
    }

    if let Some(ct) = update.ct {
        let brightness = f64::from(update.bri.unwrap_or(254)) / 254.0;
        return Some(SemanticEvent::Color(ColorPayload::Ct { ct, brightness }));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_present_wins_over_everything_else() {
        let update = HueStateUpdate {
            on: Some(true),
            bri: Some(128),
            ..Default::default()
        };
        assert_eq!(map_hue_state(&update), Some(SemanticEvent::Power(true)));
    }

    #[test]
    fn bri_alone_maps_to_brightness_percent() {
        let update = HueStateUpdate {
            bri: Some(128),
            ..Default::default()
        };
        let event = map_hue_state(&update).unwrap();
        match event {
            SemanticEvent::Brightness(pct) => assert!((pct - 50.4).abs() < 0.5),
            other => panic!("expected Brightness, got {other:?}"),
        }
    }

    #[test]
    fn bri_zero_maps_to_brightness_not_power() {
        let update = HueStateUpdate {
            bri: Some(0),
            ..Default::default()
        };
        assert_eq!(
            map_hue_state(&update),
            Some(SemanticEvent::Brightness(0.0))
        );
    }

    #[test]
    fn hue_and_sat_both_present_map_to_color() {
        let update = HueStateUpdate {
            hue: Some(100),
            sat: Some(254),
            ..Default::default()
        };
        let event = map_hue_state(&update).unwrap();
        assert_eq!(
            event,
            SemanticEvent::Color(ColorPayload::HueSat {
                hue: 100.0,
                saturation: 1.0,
                brightness: 1.0,
            })
        );
    }

    #[test]
    fn bri_present_alongside_hue_sat_does_not_take_brightness_branch() {
        let update = HueStateUpdate {
            bri: Some(254),
            hue: Some(10),
            sat: Some(20),
            ..Default::default()
        };
        let event = map_hue_state(&update).unwrap();
        assert!(matches!(
            event,
            SemanticEvent::Color(ColorPayload::HueSat { .. })
        ));
    }

    #[test]
    fn xy_present_maps_to_color_xy() {
        let update = HueStateUpdate {
            xy: Some([0.3, 0.4]),
            ..Default::default()
        };
        assert_eq!(
            map_hue_state(&update),
            Some(SemanticEvent::Color(ColorPayload::Xy {
                xy: [0.3, 0.4],
                brightness: 1.0,
            }))
        );
    }

    #[test]
    fn ct_present_maps_to_color_ct() {
        let update = HueStateUpdate {
            ct: Some(300),
            bri: None,
            ..Default::default()
        };
        assert_eq!(
            map_hue_state(&update),
            Some(SemanticEvent::Color(ColorPayload::Ct {
                ct: 300,
                brightness: 1.0,
            }))
        );
    }

    #[test]
    fn empty_body_maps_to_none() {
        assert_eq!(map_hue_state(&HueStateUpdate::default()), None);
    }
}
