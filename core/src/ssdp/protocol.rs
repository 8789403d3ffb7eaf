//! SSDP wire-level constants and message builders.
use crate::context::UrlBuilder;

/// Standard SSDP multicast address and port.
pub const MULTICAST_ADDR: &str = "239.255.255.250:1900";

/// Per-UPnP-1.0 multicast group.
pub const MULTICAST_GROUP: std::net::Ipv4Addr = std::net::Ipv4Addr::new(239, 255, 255, 250);

pub const SSDP_PORT: u16 = 1900;

/// `SERVER` header value every advertisement and reply carries.
pub const SERVER_HEADER: &str = "Linux/3.14.0 UPnP/1.0 PhilipsHue/1.0";

/// The four USN "lines" (`NT`/`ST` suffix values) advertised for every hub.
pub const USN_LINES: [&str; 4] = [
    "upnp:rootdevice",
    "urn:schemas-upnp-org:device:basic:1",
    "urn:schemas-upnp-org:device:PhilipsHueBridge:1",
    "uuid:self",
];

/// Legacy Hue bridge URN, accepted alongside the modern one.
pub const LEGACY_BRIDGE_URN: &str = "urn:philips-hue:device:bridge:1";

/// Search targets that should trigger an `M-SEARCH` reply: exactly the set
/// in §4.B (`ssdp:all`, `upnp:rootdevice`, the basic device URN, or a Hue
/// bridge URN). No `uuid:*` prefix match - replying to an arbitrary
/// `ST: uuid:<anything>` would assert the bridge is a device it is not.
#[must_use]
pub fn matches_search_target(st: &str) -> bool {
    st == "ssdp:all"
        || st == "upnp:rootdevice"
        || st == "urn:schemas-upnp-org:device:basic:1"
        || st == "urn:schemas-upnp-org:device:PhilipsHueBridge:1"
        || st == LEGACY_BRIDGE_URN
}

/// Returns the `ST` values an inbound search target expands to for reply
/// purposes.
/// `ssdp:all` fans out to one reply per advertised USN line; any other
/// recognized target (already checked via `matches_search_target`) gets a
/// single reply that echoes the request's own `ST` value verbatim.
#[must_use]
pub fn matching_lines(st: &str) -> Vec<String> {
    if st == "ssdp:all" {
        USN_LINES
            .iter()
            .map(|line| {
                if *line == "uuid:self" {
                    "uuid:self".to_string()
                } else {
                    (*line).to_string()
                }
            })
            .collect()
    } else {
        vec![st.to_string()]
    }
}

/// Builds the `NT`/`USN` line pair for a given USN "line" entry.
///
/// For the `uuid:self` sentinel, returns just `uuid:<bridgeUuid>` for both
/// `NT` and `USN` (no `::` suffix).
fn nt_and_usn(line: &str, bridge_uuid: &str) -> (String, String) {
    if line == "uuid:self" {
        let uuid_line = format!("uuid:{bridge_uuid}");
        (uuid_line.clone(), uuid_line)
    } else {
        (
            line.to_string(),
            format!("uuid:{bridge_uuid}::{line}"),
        )
    }
}

/// Builds one `NOTIFY ssdp:alive` datagram body for a single USN line.
#[must_use]
pub fn build_notify_alive(
    line: &str,
    bridge_uuid: &str,
    hub_id_upper: &str,
    urls: &UrlBuilder,
) -> String {
    let (nt, usn) = nt_and_usn(line, bridge_uuid);
    format!(
        "NOTIFY * HTTP/1.1\r\n\
         HOST: {MULTICAST_ADDR}\r\n\
         CACHE-CONTROL: max-age=100\r\n\
         LOCATION: {location}\r\n\
         SERVER: {SERVER_HEADER}\r\n\
         hue-bridgeid: {hub_id_upper}\r\n\
         BRIDGEID: {hub_id_upper}\r\n\
         NTS: ssdp:alive\r\n\
         NT: {nt}\r\n\
         USN: {usn}\r\n\r\n",
        location = urls.description_url(),
    )
}

/// Builds one unicast `M-SEARCH` `HTTP/1.1 200 OK` reply for a single
/// matched line. The `uuid:self` sentinel (used when fanning a `ssdp:all`
/// request out across `USN_LINES`) resolves to the hub's own bridge UUID,
/// matching the `NT`/`USN` handling in `build_notify_alive`.
#[must_use]
pub fn build_msearch_reply(
    st: &str,
    bridge_uuid: &str,
    hub_id_upper: &str,
    urls: &UrlBuilder,
) -> String {
    let st_line = if st == "uuid:self" {
        format!("uuid:{bridge_uuid}")
    } else {
        st.to_string()
    };
    let usn = if st_line.starts_with("uuid:") {
        format!("uuid:{bridge_uuid}")
    } else {
        format!("uuid:{bridge_uuid}::{st_line}")
    };
    format!(
        "HTTP/1.1 200 OK\r\n\
         CACHE-CONTROL: max-age=100\r\n\
         EXT:\r\n\
         LOCATION: {location}\r\n\
         SERVER: {SERVER_HEADER}\r\n\
         hue-bridgeid: {hub_id_upper}\r\n\
         BRIDGEID: {hub_id_upper}\r\n\
         ST: {st_line}\r\n\
         USN: {usn}\r\n\r\n",
        location = urls.description_url(),
    )
}

/// Builds one `NOTIFY ssdp:byebye` datagram for graceful shutdown.
#[must_use]
pub fn build_notify_byebye(line: &str, bridge_uuid: &str) -> String {
    let (nt, usn) = nt_and_usn(line, bridge_uuid);
    format!(
        "NOTIFY * HTTP/1.1\r\n\
         HOST: {MULTICAST_ADDR}\r\n\
         NTS: ssdp:byebye\r\n\
         NT: {nt}\r\n\
         USN: {usn}\r\n\r\n"
    )
}

/// A parsed inbound `M-SEARCH` request.
#[derive(Debug, PartialEq)]
pub struct MSearchRequest {
    pub st: String,
    pub mx: u64,
}

/// Parses a raw UDP datagram, returning `Some` only if it is a well-formed
/// `M-SEARCH * HTTP/1.1` request (first line exact match, case-sensitive per
/// the UPnP spec's ABNF, though header names below are matched
/// case-insensitively as real devices vary their casing).
#[must_use]
pub fn parse_msearch(datagram: &str) -> Option<MSearchRequest> {
    let mut lines = datagram.lines();
    let first = lines.next()?;
    if first.trim() != "M-SEARCH * HTTP/1.1" {
        return None;
    }

    let mut st = None;
    let mut mx = 2u64;
    for line in lines {
        if let Some(rest) = strip_header(line, "st") {
            st = Some(rest.trim().to_string());
        } else if let Some(rest) = strip_header(line, "mx") {
            mx = rest.trim().parse().unwrap_or(2);
        }
    }

    Some(MSearchRequest { st: st?, mx })
}

fn strip_header<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let colon = line.find(':')?;
    let (header, rest) = line.split_at(colon);
    if header.eq_ignore_ascii_case(name) {
        Some(&rest[1..])
    } else {
        None
    }
}
