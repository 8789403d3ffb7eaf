//! SSDP Responder (component B).
//!
//! Built on `socket2`/tokio `UdpSocket` plumbing: server-side multicast
//! join, a periodic alive ticker, and unicast `M-SEARCH` replies.

mod protocol;
mod responder;

pub use protocol::{
    build_msearch_reply, build_notify_alive, build_notify_byebye, matches_search_target,
    parse_msearch, MSearchRequest, MULTICAST_ADDR, SERVER_HEADER, SSDP_PORT, USN_LINES,
};
pub use responder::{bind_multicast_socket, run, ResponderContext};
