//! Packet builder for constructing complete, checksummed IPv4 packets
//!
//! A single [`PacketBuilder`] carries the IPv4 fields and one [`Transport`]
//! variant. Building serializes the transport header with a zero checksum,
//! appends the payload, wraps it in an IPv4 header and then patches the
//! transport checksum in place.

use crate::error::BuildError;
use crate::network::icmp::{self, IcmpHeader, ICMP_CHECKSUM_OFFSET, ICMP_TYPE_ECHO_REQUEST};
use crate::network::ipv4::{flags, ip_string_to_int, protocol, Ipv4Header, IPV4_HEADER_LEN};
use crate::transport::tcp::{self, TcpHeader, TCP_CHECKSUM_OFFSET};
use crate::transport::udp::{self, UdpHeader, UDP_CHECKSUM_OFFSET};
use byteorder::{BigEndian, ByteOrder};

const DEFAULT_TTL: u8 = 64;

/// Transport layer carried by a built packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Icmp {
        msg_type: u8,
        identifier: u16,
        sequence: u16,
    },
    Tcp {
        src_port: u16,
        dst_port: u16,
        flags: u8,
    },
    Udp {
        src_port: u16,
        dst_port: u16,
    },
}

impl Transport {
    /// ICMP echo request with the given identifier and sequence
    pub fn echo_request(identifier: u16, sequence: u16) -> Self {
        Transport::Icmp {
            msg_type: ICMP_TYPE_ECHO_REQUEST,
            identifier,
            sequence,
        }
    }

    pub fn protocol(&self) -> u8 {
        match self {
            Transport::Icmp { .. } => protocol::ICMP,
            Transport::Tcp { .. } => protocol::TCP,
            Transport::Udp { .. } => protocol::UDP,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transport::Icmp { .. } => "ICMP",
            Transport::Tcp { .. } => "TCP",
            Transport::Udp { .. } => "UDP",
        }
    }

    fn header_len(&self) -> usize {
        match self {
            Transport::Icmp { .. } => icmp::ICMP_HEADER_LEN,
            Transport::Tcp { .. } => tcp::TCP_HEADER_LEN,
            Transport::Udp { .. } => udp::UDP_HEADER_LEN,
        }
    }

    fn checksum_offset(&self) -> usize {
        match self {
            Transport::Icmp { .. } => ICMP_CHECKSUM_OFFSET,
            Transport::Tcp { .. } => TCP_CHECKSUM_OFFSET,
            Transport::Udp { .. } => UDP_CHECKSUM_OFFSET,
        }
    }

    /// Serialize the transport header with a zero checksum
    fn header_bytes(&self, payload_len: u16) -> Vec<u8> {
        match *self {
            Transport::Icmp {
                msg_type,
                identifier,
                sequence,
            } => IcmpHeader::new(msg_type, identifier, sequence)
                .to_bytes()
                .to_vec(),
            Transport::Tcp {
                src_port,
                dst_port,
                flags,
            } => TcpHeader::new(src_port, dst_port, flags).to_bytes().to_vec(),
            Transport::Udp { src_port, dst_port } => UdpHeader::new(src_port, dst_port, payload_len)
                .to_bytes()
                .to_vec(),
        }
    }

    fn checksum(&self, src_addr: u32, dst_addr: u32, segment: &[u8]) -> u16 {
        match self {
            Transport::Icmp { .. } => icmp::calculate_checksum(segment),
            Transport::Tcp { .. } => tcp::calculate_checksum(src_addr, dst_addr, segment),
            Transport::Udp { .. } => udp::calculate_checksum(src_addr, dst_addr, segment),
        }
    }
}

/// Logical description of an IPv4 packet to build
#[derive(Debug, Clone)]
pub struct PacketBuilder {
    pub src_ip: String,
    pub dst_ip: String,
    pub ttl: u8,
    pub tos: u8,
    pub identification: u16,
    pub flags_frag_offset: u16,
    pub transport: Transport,
    pub payload: Vec<u8>,
}

impl PacketBuilder {
    /// Create a builder with TTL 64, TOS 0, identification 0, DF set and
    /// an empty payload
    pub fn new(src_ip: impl Into<String>, dst_ip: impl Into<String>, transport: Transport) -> Self {
        PacketBuilder {
            src_ip: src_ip.into(),
            dst_ip: dst_ip.into(),
            ttl: DEFAULT_TTL,
            tos: 0,
            identification: 0,
            flags_frag_offset: flags::DONT_FRAGMENT,
            transport,
            payload: Vec::new(),
        }
    }

    pub fn ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn tos(mut self, tos: u8) -> Self {
        self.tos = tos;
        self
    }

    pub fn identification(mut self, identification: u16) -> Self {
        self.identification = identification;
        self
    }

    pub fn flags_frag_offset(mut self, flags_frag_offset: u16) -> Self {
        self.flags_frag_offset = flags_frag_offset;
        self
    }

    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Emit the 20-byte IPv4 header with version/IHL 0x45 and its checksum
    pub fn create_ip_header(
        &self,
        total_len: u16,
        protocol: u8,
    ) -> Result<[u8; IPV4_HEADER_LEN], BuildError> {
        let src_addr = ip_string_to_int(&self.src_ip)?;
        let dst_addr = ip_string_to_int(&self.dst_ip)?;

        let mut header = Ipv4Header::new(
            self.tos,
            total_len,
            self.identification,
            self.flags_frag_offset,
            self.ttl,
            protocol,
            src_addr,
            dst_addr,
        );
        header.update_checksum();
        Ok(header.to_bytes())
    }

    /// Build the packet, returning the first error encountered
    pub fn try_build(&self) -> Result<Vec<u8>, BuildError> {
        let src_addr = ip_string_to_int(&self.src_ip)?;
        let dst_addr = ip_string_to_int(&self.dst_ip)?;

        let transport_len = self.transport.header_len() + self.payload.len();
        let max_payload = u16::MAX as usize - IPV4_HEADER_LEN - self.transport.header_len();
        if self.payload.len() > max_payload {
            return Err(BuildError::PayloadTooLarge {
                len: self.payload.len(),
                max: max_payload,
            });
        }
        let total_len = (IPV4_HEADER_LEN + transport_len) as u16;

        let mut packet = Vec::with_capacity(total_len as usize);
        packet.extend_from_slice(&self.create_ip_header(total_len, self.transport.protocol())?);
        packet.extend_from_slice(&self.transport.header_bytes(self.payload.len() as u16));
        packet.extend_from_slice(&self.payload);

        let segment = &packet[IPV4_HEADER_LEN..];
        let checksum = self.transport.checksum(src_addr, dst_addr, segment);
        let at = IPV4_HEADER_LEN + self.transport.checksum_offset();
        BigEndian::write_u16(&mut packet[at..at + 2], checksum);

        tracing::debug!(
            "Built {} packet: {} bytes total",
            self.transport.name(),
            packet.len()
        );
        Ok(packet)
    }

    /// Build the packet, or an empty buffer if it cannot be built
    ///
    /// Failures are logged with the source, destination and cause. Callers
    /// must discard an empty result.
    pub fn build(&self) -> Vec<u8> {
        match self.try_build() {
            Ok(packet) => packet,
            Err(e) => {
                tracing::error!(
                    "Failed to build {} packet: {} (src: {}, dst: {}) - dropping packet",
                    self.transport.name(),
                    e,
                    self.src_ip,
                    self.dst_ip
                );
                Vec::new()
            }
        }
    }
}
