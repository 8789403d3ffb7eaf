//! UPnP Descriptor (component C): serves `/description.xml`.
//!
//! Builds the `Device`/`Root` structs with `quick_xml`'s serde serializer to
//! produce the exact Hue-2015-bridge document shape Echo expects.

use serde::Serialize;

#[derive(Serialize)]
struct SpecVersion {
    major: u8,
    minor: u8,
}

#[derive(Serialize)]
struct Device {
    #[serde(rename = "deviceType")]
    device_type: String,
    #[serde(rename = "friendlyName")]
    friendly_name: String,
    manufacturer: String,
    #[serde(rename = "manufacturerURL")]
    manufacturer_url: String,
    #[serde(rename = "modelDescription")]
    model_description: String,
    #[serde(rename = "modelName")]
    model_name: String,
    #[serde(rename = "modelNumber")]
    model_number: String,
    #[serde(rename = "modelURL")]
    model_url: String,
    #[serde(rename = "serialNumber")]
    serial_number: String,
    #[serde(rename = "UDN")]
    udn: String,
}

#[derive(Serialize)]
#[serde(rename = "root")]
struct Root {
    #[serde(rename = "@xmlns")]
    xmlns: String,
    #[serde(rename = "specVersion")]
    spec_version: SpecVersion,
    #[serde(rename = "URLBase")]
    url_base: String,
    device: Device,
}

/// Builds the `/description.xml` document for a hub.
///
/// `hub_id` is the raw (lowercase) hub id used as `serialNumber`; `bridge_uuid`
/// is the full `2f402f80-...` UUID; `base_url` is the hub's
/// `http(s)://ip:port` root.
///
/// # Errors
///
/// Returns an error if XML serialization fails (should not happen for this
/// fixed, non-recursive shape).
pub fn build_description_xml(
    hub_id: &str,
    bridge_uuid: &str,
    base_url: &str,
) -> Result<String, quick_xml::SeError> {
    let root = Root {
        xmlns: "urn:schemas-upnp-org:device-1-0".to_string(),
        spec_version: SpecVersion { major: 1, minor: 0 },
        url_base: format!("{base_url}/"),
        device: Device {
            device_type: "urn:schemas-upnp-org:device:PhilipsHueBridge:1".to_string(),
            friendly_name: format!("Philips hue ({base_url})"),
            manufacturer: "Royal Philips Electronics".to_string(),
            manufacturer_url: "http://www.philips.com".to_string(),
            model_description: "Philips hue Personal Wireless Lighting".to_string(),
            model_name: "Philips hue bridge 2015".to_string(),
            model_number: "BSB002".to_string(),
            model_url: "http://www.meethue.com".to_string(),
            serial_number: hub_id.to_string(),
            udn: format!("uuid:{bridge_uuid}"),
        },
    };

    let body = quick_xml::se::to_string(&root)?;
    Ok(format!("<?xml version=\"1.0\"?>\n{body}"))
}
