//! An in-memory IPv4 packet builder and forwarding simulator in Rust
//!
//! This library provides:
//! - IPv4, ICMP, TCP and UDP header codecs with RFC 1071 checksums
//! - A packet builder producing complete, checksummed IPv4 packets
//! - A longest-prefix-match routing table
//! - A simulated IP-layer forwarding decision (TTL check, route lookup)
//!
//! Nothing touches real sockets or interfaces; packets are plain byte
//! buffers.

pub mod builder;
pub mod config;
pub mod error;
pub mod iface;
pub mod logging;
pub mod network;
pub mod transport;

// Re-export commonly used types
pub use builder::{PacketBuilder, Transport};
pub use config::SimConfig;
pub use error::{AddrParseError, BuildError, ConfigError, PacketError, RouteError};
pub use iface::forward::{parse_packet, DropReason, ForwardOutcome, ParsedPacket, Router, TransportHeader};
pub use iface::route::{RouteEntry, RoutingTable};
pub use network::icmp::{IcmpHeader, ICMP_TYPE_ECHO_REPLY, ICMP_TYPE_ECHO_REQUEST};
pub use network::ipv4::{ip_string_to_int, Ipv4Header};
pub use transport::tcp::TcpHeader;
pub use transport::udp::UdpHeader;
