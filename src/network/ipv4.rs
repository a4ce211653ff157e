//! IPv4 protocol implementation
//!
//! This module provides IPv4 header parsing, serialization and checksum
//! calculation, plus conversion between dotted-quad strings and host-order
//! addresses.
//!
//! Features:
//! - IPv4 header parsing and serialization (fixed 20-byte header, no options)
//! - Checksum calculation and validation
//! - Dotted-quad address parsing with explicit errors

use std::fmt;
use std::net::Ipv4Addr;

use crate::error::{AddrParseError, PacketError};
use crate::network::checksum;
use byteorder::{BigEndian, ByteOrder};

pub const IPV4_HEADER_LEN: usize = 20;
pub const IPV4_VERSION: u8 = 4;
const DEFAULT_IHL: u8 = 5; // 5 * 4 = 20 bytes (standard header length)

/// Byte offset of the header checksum within the IPv4 header.
pub const IPV4_CHECKSUM_OFFSET: usize = 10;

/// IPv4 packet header structure
///
/// Represents the standard 20-byte IPv4 header as defined in RFC 791.
/// Addresses are held in host order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    pub ihl: u8, // Internet Header Length
    pub tos: u8, // Type of Service
    pub total_len: u16,
    pub id: u16,
    pub flags_frag_offset: u16, // Flags and Fragment Offset
    pub ttl: u8,                // Time to Live
    pub protocol: u8,           // Next Protocol
    pub checksum: u16,
    pub src_addr: u32, // Source IP Address
    pub dst_addr: u32, // Destination IP Address
}

impl Ipv4Header {
    /// Create a new IPv4 header with specified parameters
    ///
    /// Version is 4 and IHL is 5. The checksum is left at zero; call
    /// [`Ipv4Header::update_checksum`] once all fields are final.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tos: u8,
        total_len: u16,
        id: u16,
        flags_frag_offset: u16,
        ttl: u8,
        protocol: u8,
        src_addr: u32,
        dst_addr: u32,
    ) -> Self {
        Ipv4Header {
            version: IPV4_VERSION,
            ihl: DEFAULT_IHL,
            tos,
            total_len,
            id,
            flags_frag_offset,
            ttl,
            protocol,
            checksum: 0,
            src_addr,
            dst_addr,
        }
    }

    /// Parse IPv4 header from `data` starting at `offset`
    ///
    /// Only the length is checked here; the version nibble is decoded as-is
    /// and left for the caller to validate.
    pub fn from_bytes(data: &[u8], offset: usize) -> Result<Self, PacketError> {
        let available = data.len().saturating_sub(offset);
        if available < IPV4_HEADER_LEN {
            return Err(PacketError::TooShort {
                header: "IPv4",
                min: IPV4_HEADER_LEN,
                actual: available,
            });
        }
        let data = &data[offset..offset + IPV4_HEADER_LEN];

        Ok(Ipv4Header {
            version: (data[0] & 0xF0) >> 4,
            ihl: data[0] & 0x0F,
            tos: data[1],
            total_len: BigEndian::read_u16(&data[2..4]),
            id: BigEndian::read_u16(&data[4..6]),
            flags_frag_offset: BigEndian::read_u16(&data[6..8]),
            ttl: data[8],
            protocol: data[9],
            checksum: BigEndian::read_u16(&data[10..12]),
            src_addr: BigEndian::read_u32(&data[12..16]),
            dst_addr: BigEndian::read_u32(&data[16..20]),
        })
    }

    /// Convert IPv4 header to bytes
    ///
    /// The checksum field is written as stored, not recomputed.
    pub fn to_bytes(&self) -> [u8; IPV4_HEADER_LEN] {
        let mut bytes = [0u8; IPV4_HEADER_LEN];
        bytes[0] = (self.version << 4) | (self.ihl & 0x0F);
        bytes[1] = self.tos;
        BigEndian::write_u16(&mut bytes[2..4], self.total_len);
        BigEndian::write_u16(&mut bytes[4..6], self.id);
        BigEndian::write_u16(&mut bytes[6..8], self.flags_frag_offset);
        bytes[8] = self.ttl;
        bytes[9] = self.protocol;
        BigEndian::write_u16(&mut bytes[10..12], self.checksum);
        BigEndian::write_u32(&mut bytes[12..16], self.src_addr);
        BigEndian::write_u32(&mut bytes[16..20], self.dst_addr);

        bytes
    }

    /// Calculate IPv4 header checksum
    ///
    /// The checksum field is treated as zero during calculation.
    pub fn calculate_checksum(&self) -> u16 {
        let mut bytes = self.to_bytes();
        bytes[IPV4_CHECKSUM_OFFSET..IPV4_CHECKSUM_OFFSET + 2].fill(0);
        checksum(&bytes)
    }

    /// Update checksum after modifying header fields
    pub fn update_checksum(&mut self) {
        self.checksum = self.calculate_checksum();
    }

    /// Returns true if the stored checksum matches the header contents
    pub fn has_valid_checksum(&self) -> bool {
        self.calculate_checksum() == self.checksum
    }

    /// Get the header length in bytes
    pub fn header_len(&self) -> usize {
        (self.ihl as usize) * 4
    }

    /// Get payload length
    ///
    /// Returns the length of the payload (total length - header length)
    pub fn payload_len(&self) -> usize {
        (self.total_len as usize).saturating_sub(self.header_len())
    }

    pub fn src_ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.src_addr)
    }

    pub fn dst_ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dst_addr)
    }
}

impl fmt::Display for Ipv4Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IPv4 Header:")?;
        writeln!(f, "  Source IP: {}", self.src_ip())?;
        writeln!(f, "  Destination IP: {}", self.dst_ip())?;
        writeln!(f, "  TTL: {}", self.ttl)?;
        write!(f, "  Protocol: {}", self.protocol)
    }
}

/// IPv4 protocol constants
pub mod protocol {
    pub const ICMP: u8 = 1;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
}

/// IPv4 flags constants
pub mod flags {
    pub const DONT_FRAGMENT: u16 = 0x4000;
    pub const MORE_FRAGMENTS: u16 = 0x2000;
    pub const FRAGMENT_OFFSET_MASK: u16 = 0x1FFF;
}

/// Parse a dotted-quad string into a host-order address
///
/// Exactly four numeric segments, each in `0..=255`, are required.
pub fn ip_string_to_int(addr: &str) -> Result<u32, AddrParseError> {
    let segments: Vec<&str> = addr.split('.').collect();
    if segments.len() != 4 {
        return Err(AddrParseError::WrongSegmentCount {
            addr: addr.to_string(),
            count: segments.len(),
        });
    }

    let mut result = 0u32;
    for segment in segments {
        let invalid = || AddrParseError::InvalidOctet {
            addr: addr.to_string(),
            segment: segment.to_string(),
        };
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: u32 = segment.parse().map_err(|_| invalid())?;
        if value > 255 {
            return Err(AddrParseError::OctetOutOfRange {
                addr: addr.to_string(),
                value,
            });
        }
        result = (result << 8) | value;
    }

    Ok(result)
}

/// Format a host-order address as a dotted-quad string
pub fn int_to_ip_string(addr: u32) -> String {
    Ipv4Addr::from(addr).to_string()
}
