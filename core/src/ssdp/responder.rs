//! SSDP Responder (component B): binds the multicast socket, emits periodic
//! `NOTIFY ssdp:alive` beacons, and replies to unicast `M-SEARCH` requests.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use socket2::{Domain, Protocol as SockProtocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use crate::context::UrlBuilder;
use crate::error::SsdpError;
use crate::ssdp::protocol::{
    self, build_msearch_reply, build_notify_alive, build_notify_byebye, MULTICAST_GROUP,
    SSDP_PORT, USN_LINES,
};

/// Maximum datagram size read per `recv_from` call. UPnP discovery traffic
/// is small; this bounds worst-case allocation for a malformed or hostile
/// sender.
const RECV_BUF_SIZE: usize = 2048;

/// Caps the random M-SEARCH reply delay even if a peer sends a large `MX`.
const MAX_REPLY_DELAY_SECS: u64 = 3;

/// Binds the SSDP UDP socket and joins the multicast group.
///
/// Sets `SO_REUSEADDR` (and `SO_REUSEPORT` on Unix) so multiple hub
/// instances on the same host can coexist, mirroring common UPnP responder
/// implementations that must share port 1900 system-wide.
pub fn bind_multicast_socket(local_ip: Ipv4Addr) -> Result<UdpSocket, SsdpError> {
    let socket =
        Socket::new(Domain::IPV4, Type::DGRAM, Some(SockProtocol::UDP)).map_err(SsdpError::Socket)?;

    socket.set_reuse_address(true).map_err(SsdpError::Socket)?;
    #[cfg(unix)]
    socket.set_reuse_port(true).map_err(SsdpError::Socket)?;

    let bind_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), SSDP_PORT);
    socket.bind(&bind_addr.into()).map_err(SsdpError::Socket)?;

    socket
        .join_multicast_v4(&MULTICAST_GROUP, &local_ip)
        .map_err(SsdpError::Socket)?;
    socket.set_multicast_ttl_v4(4).map_err(SsdpError::Socket)?;
    socket.set_nonblocking(true).map_err(SsdpError::Socket)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket).map_err(SsdpError::Socket)
}

/// Parameters the responder needs to construct wire messages.
pub struct ResponderContext {
    pub bridge_uuid: String,
    pub hub_id_upper: String,
    pub urls: UrlBuilder,
    pub ad_interval: Duration,
}

/// Runs the SSDP responder loop until `shutdown` is cancelled.
///
/// Drives two suspension points concurrently: the periodic `adInterval`
/// ticker emitting `NOTIFY ssdp:alive`, and the UDP socket read loop
/// answering `M-SEARCH` requests. Sends a `NOTIFY ssdp:byebye` for each USN
/// line on the way out.
pub async fn run(socket: Arc<UdpSocket>, ctx: ResponderContext, shutdown: CancellationToken) {
    let mut ticker = interval(ctx.ad_interval);
    let mut buf = [0u8; RECV_BUF_SIZE];
    let multicast_dest: SocketAddr = protocol::MULTICAST_ADDR.parse().expect("valid literal");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                send_byebye(&socket, &ctx, multicast_dest).await;
                break;
            }
            _ = ticker.tick() => {
                send_alive_beacons(&socket, &ctx, multicast_dest).await;
            }
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((len, peer)) => {
                        handle_datagram(&socket, &ctx, &buf[..len], peer).await;
                    }
                    Err(err) => {
                        log::warn!("SSDP socket read error: {err}");
                    }
                }
            }
        }
    }
}

async fn send_alive_beacons(socket: &UdpSocket, ctx: &ResponderContext, dest: SocketAddr) {
    for line in USN_LINES {
        let msg = build_notify_alive(line, &ctx.bridge_uuid, &ctx.hub_id_upper, &ctx.urls);
        if let Err(err) = socket.send_to(msg.as_bytes(), dest).await {
            log::warn!("failed to send SSDP NOTIFY alive for {line}: {err}");
        }
    }
}

async fn send_byebye(socket: &UdpSocket, ctx: &ResponderContext, dest: SocketAddr) {
    for line in USN_LINES {
        let msg = build_notify_byebye(line, &ctx.bridge_uuid);
        if let Err(err) = socket.send_to(msg.as_bytes(), dest).await {
            log::debug!("failed to send SSDP NOTIFY byebye for {line}: {err}");
        }
    }
}

async fn handle_datagram(socket: &UdpSocket, ctx: &ResponderContext, bytes: &[u8], peer: SocketAddr) {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return;
    };
    let Some(request) = protocol::parse_msearch(text) else {
        return;
    };
    if !protocol::matches_search_target(&request.st) {
        return;
    }

    let delay_secs = {
        let mut rng = rand::thread_rng();
        rng.gen_range(0..=request.mx.min(MAX_REPLY_DELAY_SECS))
    };
    tokio::time::sleep(Duration::from_secs(delay_secs)).await;

    for line in protocol::matching_lines(&request.st) {
        let reply = build_msearch_reply(&line, &ctx.bridge_uuid, &ctx.hub_id_upper, &ctx.urls);
        if let Err(err) = socket.send_to(reply.as_bytes(), peer).await {
            log::warn!("failed to send SSDP M-SEARCH reply to {peer}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_delay_never_exceeds_cap_regardless_of_mx() {
        let mx = 120u64;
        let capped = mx.min(MAX_REPLY_DELAY_SECS);
        assert_eq!(capped, 3);
    }

    #[tokio::test]
    async fn handle_datagram_ignores_non_matching_search_target() {
        let socket = Arc::new(
            UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
                .await
                .expect("bind ephemeral"),
        );
        let ctx = ResponderContext {
            bridge_uuid: "2f402f80-da50-11e1-9b23-001788abcdef".into(),
            hub_id_upper: "001788ABCDEF".into(),
            urls: UrlBuilder::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 80, false),
            ad_interval: Duration::from_secs(30),
        };
        let peer: SocketAddr = ([127, 0, 0, 1], 9999).into();
        let datagram = b"M-SEARCH * HTTP/1.1\r\nST: urn:schemas-upnp-org:device:ZonePlayer:1\r\nMX: 1\r\n\r\n";

        // Should not panic or send anything back to a closed peer.
        handle_datagram(&socket, &ctx, datagram, peer).await;
    }
}
