//! Inbound packet inspection and the simulated forwarding decision
//!
//! Each packet is handled independently: validate and parse the IPv4
//! header, decode the transport header for display, then check TTL and
//! consult the routing table. TTL is not decremented on forward.

use std::fmt;

use crate::error::{PacketError, RouteError};
use crate::iface::route::RoutingTable;
use crate::network::icmp::IcmpHeader;
use crate::network::ipv4::{int_to_ip_string, protocol, Ipv4Header, IPV4_HEADER_LEN, IPV4_VERSION};
use crate::transport::{TcpHeader, UdpHeader};

/// Transport header decoded from an inbound packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportHeader {
    Icmp(IcmpHeader),
    Tcp(TcpHeader),
    Udp(UdpHeader),
    /// Known protocol, but the buffer ends before its header does
    Truncated(PacketError),
    /// Protocol number this simulator does not decode
    Unknown(u8),
}

impl fmt::Display for TransportHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportHeader::Icmp(header) => write!(f, "{}", header),
            TransportHeader::Tcp(header) => write!(f, "{}", header),
            TransportHeader::Udp(header) => write!(f, "{}", header),
            TransportHeader::Truncated(e) => write!(f, "Transport header unavailable: {}", e),
            TransportHeader::Unknown(proto) => write!(
                f,
                "Unknown or unsupported transport layer protocol: {}",
                proto
            ),
        }
    }
}

/// An inbound packet with its headers decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPacket {
    pub ip: Ipv4Header,
    pub transport: TransportHeader,
}

impl fmt::Display for ParsedPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.ip)?;
        write!(f, "{}", self.transport)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    TtlExpired,
    NoRoute,
}

/// Result of processing one inbound packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    Forwarded {
        interface: String,
        /// Gateway of the matched route, 0 when directly connected
        next_hop: u32,
    },
    Dropped(DropReason),
    Malformed(PacketError),
}

impl ForwardOutcome {
    pub fn is_forwarded(&self) -> bool {
        matches!(self, ForwardOutcome::Forwarded { .. })
    }
}

impl fmt::Display for ForwardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardOutcome::Forwarded { interface, .. } => {
                write!(f, "Forwarding packet to interface {}", interface)
            }
            ForwardOutcome::Dropped(DropReason::TtlExpired) => {
                write!(f, "Packet dropped: TTL expired")
            }
            ForwardOutcome::Dropped(DropReason::NoRoute) => {
                write!(f, "No route found. Dropping packet.")
            }
            ForwardOutcome::Malformed(e) => write!(f, "Malformed packet: {}", e),
        }
    }
}

/// Validate and decode an inbound IPv4 packet
///
/// Fails only when the IPv4 header itself is unusable (bad version or too
/// short). Transport problems are reported in [`ParsedPacket::transport`].
pub fn parse_packet(packet: &[u8]) -> Result<ParsedPacket, PacketError> {
    tracing::debug!("Starting packet parsing, packet size: {} bytes", packet.len());

    if let Some(first) = packet.first() {
        let version = first >> 4;
        if version != IPV4_VERSION {
            tracing::error!("Unsupported IP version: {} (expected 4)", version);
            return Err(PacketError::UnsupportedVersion(version));
        }
    }

    let ip = Ipv4Header::from_bytes(packet, 0).map_err(|e| {
        tracing::error!("Packet too short: {}", e);
        e
    })?;
    tracing::debug!(
        "Parsed packet - TTL: {}, Protocol: {}, Total Length: {}",
        ip.ttl,
        ip.protocol,
        ip.total_len
    );

    let transport = parse_transport(packet, &ip);
    Ok(ParsedPacket { ip, transport })
}

fn parse_transport(packet: &[u8], ip: &Ipv4Header) -> TransportHeader {
    tracing::debug!("Parsing Layer 4 header for protocol {}", ip.protocol);

    let parsed = match ip.protocol {
        protocol::ICMP => IcmpHeader::from_bytes(packet, IPV4_HEADER_LEN).map(TransportHeader::Icmp),
        protocol::TCP => TcpHeader::from_bytes(packet, IPV4_HEADER_LEN).map(TransportHeader::Tcp),
        protocol::UDP => UdpHeader::from_bytes(packet, IPV4_HEADER_LEN).map(TransportHeader::Udp),
        other => {
            tracing::warn!("Unknown or unsupported protocol: {}", other);
            return TransportHeader::Unknown(other);
        }
    };

    parsed.unwrap_or_else(|e| {
        tracing::error!("{}", e);
        TransportHeader::Truncated(e)
    })
}

/// IP-layer forwarding simulator backed by a routing table
#[derive(Debug, Clone, Default)]
pub struct Router {
    table: RoutingTable,
}

impl Router {
    pub fn new(table: RoutingTable) -> Self {
        Router { table }
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    pub fn add_route(
        &mut self,
        cidr: &str,
        interface: &str,
        next_hop: &str,
        metric: u32,
    ) -> Result<(), RouteError> {
        self.table.add_route(cidr, interface, next_hop, metric)
    }

    /// Decide what happens to a packet with this IPv4 header
    ///
    /// TTL 0 always drops, whatever the routing table holds.
    pub fn decide(&self, ip: &Ipv4Header) -> ForwardOutcome {
        let destination = int_to_ip_string(ip.dst_addr);
        tracing::debug!("Attempting to forward packet to destination: {}", destination);

        if ip.ttl == 0 {
            tracing::warn!("Packet dropped: TTL expired for destination {}", destination);
            return ForwardOutcome::Dropped(DropReason::TtlExpired);
        }

        match self.table.lookup_entry(ip.dst_addr) {
            Some(route) => {
                tracing::info!(
                    "Forwarding packet to interface {} for destination {}",
                    route.interface,
                    destination
                );
                ForwardOutcome::Forwarded {
                    interface: route.interface.clone(),
                    next_hop: route.next_hop,
                }
            }
            None => {
                tracing::warn!(
                    "No route found for destination {}. Dropping packet",
                    destination
                );
                ForwardOutcome::Dropped(DropReason::NoRoute)
            }
        }
    }

    /// Parse an inbound buffer and decide its fate
    pub fn parse_and_forward(&self, packet: &[u8]) -> ForwardOutcome {
        match parse_packet(packet) {
            Ok(parsed) => {
                tracing::debug!("\n{}", parsed);
                self.decide(&parsed.ip)
            }
            Err(e) => ForwardOutcome::Malformed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{PacketBuilder, Transport};
    use crate::network::ipv4::ip_string_to_int;

    fn router() -> Router {
        crate::logging::init_for_tests();
        let mut router = Router::default();
        router.add_route("192.168.1.0/24", "wlan0", "", 1).unwrap();
        router.add_route("127.0.0.0/8", "lo", "", 1).unwrap();
        router.add_route("8.8.8.8/32", "wlan0", "192.168.1.1", 1).unwrap();
        router
    }

    fn udp_to(dst: &str, ttl: u8) -> Vec<u8> {
        PacketBuilder::new(
            "192.168.1.100",
            dst,
            Transport::Udp {
                src_port: 12345,
                dst_port: 53,
            },
        )
        .ttl(ttl)
        .payload("query")
        .build()
    }

    #[test]
    fn test_forward_matching_route() {
        let outcome = router().parse_and_forward(&udp_to("8.8.8.8", 64));
        assert_eq!(
            outcome,
            ForwardOutcome::Forwarded {
                interface: "wlan0".into(),
                next_hop: ip_string_to_int("192.168.1.1").unwrap(),
            }
        );
        assert_eq!(outcome.to_string(), "Forwarding packet to interface wlan0");
    }

    #[test]
    fn test_drop_no_route() {
        let outcome = router().parse_and_forward(&udp_to("1.1.1.1", 64));
        assert_eq!(outcome, ForwardOutcome::Dropped(DropReason::NoRoute));
    }

    #[test]
    fn test_ttl_zero_drops_before_routing() {
        let outcome = router().parse_and_forward(&udp_to("8.8.8.8", 0));
        assert_eq!(outcome, ForwardOutcome::Dropped(DropReason::TtlExpired));
        // Also with an empty table.
        let outcome = Router::default().parse_and_forward(&udp_to("8.8.8.8", 0));
        assert_eq!(outcome, ForwardOutcome::Dropped(DropReason::TtlExpired));
    }

    #[test]
    fn test_ttl_not_decremented() {
        let packet = udp_to("8.8.8.8", 1);
        assert!(router().parse_and_forward(&packet).is_forwarded());
        assert_eq!(packet[8], 1);
    }

    #[test]
    fn test_malformed_version() {
        let mut packet = udp_to("8.8.8.8", 64);
        packet[0] = 0x65;
        assert_eq!(
            router().parse_and_forward(&packet),
            ForwardOutcome::Malformed(PacketError::UnsupportedVersion(6))
        );
    }

    #[test]
    fn test_malformed_too_short() {
        let packet = udp_to("8.8.8.8", 64);
        assert!(matches!(
            router().parse_and_forward(&packet[..12]),
            ForwardOutcome::Malformed(PacketError::TooShort { actual: 12, .. })
        ));
        assert!(matches!(
            router().parse_and_forward(&[]),
            ForwardOutcome::Malformed(PacketError::TooShort { actual: 0, .. })
        ));
    }

    #[test]
    fn test_parse_packet_dispatches_transport() {
        let packet = PacketBuilder::new(
            "192.168.1.100",
            "192.168.1.50",
            Transport::echo_request(1234, 1),
        )
        .payload("ping")
        .build();
        let parsed = parse_packet(&packet).unwrap();
        assert!(matches!(parsed.transport, TransportHeader::Icmp(h) if h.identifier == 1234));
        assert!(parsed.to_string().contains("Echo Request"));
    }

    #[test]
    fn test_unknown_protocol_still_forwarded() {
        let mut packet = udp_to("192.168.1.7", 64);
        packet[9] = 47; // GRE
        let parsed = parse_packet(&packet).unwrap();
        assert_eq!(parsed.transport, TransportHeader::Unknown(47));
        assert!(router().parse_and_forward(&packet).is_forwarded());
    }

    #[test]
    fn test_truncated_transport_still_decided() {
        let packet = udp_to("127.0.0.1", 64);
        let parsed = parse_packet(&packet[..24]).unwrap();
        assert!(matches!(
            parsed.transport,
            TransportHeader::Truncated(PacketError::TooShort { header: "UDP", .. })
        ));
        assert_eq!(
            router().parse_and_forward(&packet[..24]),
            ForwardOutcome::Forwarded {
                interface: "lo".into(),
                next_hop: 0
            }
        );
    }
}
