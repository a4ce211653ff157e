//! UDP (User Datagram Protocol) header implementation
//!
//! This module provides UDP header parsing, construction and checksum
//! calculation.

use std::fmt;

use crate::error::PacketError;
use crate::network::{protocol, pseudo_header_checksum};
use byteorder::{BigEndian, ByteOrder};

/// UDP header length in bytes
pub const UDP_HEADER_LEN: usize = 8;

/// Byte offset of the checksum within the UDP header
pub const UDP_CHECKSUM_OFFSET: usize = 6;

/// UDP packet header structure
///
/// Represents the standard 8-byte UDP header as defined in RFC 768
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub length: u16, // Length of UDP header and data
    pub checksum: u16,
}

impl UdpHeader {
    /// Create a UDP header for a payload of `data_len` bytes
    pub fn new(src_port: u16, dst_port: u16, data_len: u16) -> Self {
        let header = UdpHeader {
            src_port,
            dst_port,
            length: (UDP_HEADER_LEN as u16).wrapping_add(data_len),
            checksum: 0,
        };
        tracing::debug!(
            "Created UDP header - Port {} -> {}, Length: {}",
            src_port,
            dst_port,
            header.length
        );
        header
    }

    /// Parse UDP header from `data` starting at `offset`
    pub fn from_bytes(data: &[u8], offset: usize) -> Result<Self, PacketError> {
        let available = data.len().saturating_sub(offset);
        if available < UDP_HEADER_LEN {
            return Err(PacketError::TooShort {
                header: "UDP",
                min: UDP_HEADER_LEN,
                actual: available,
            });
        }
        let data = &data[offset..offset + UDP_HEADER_LEN];

        let header = UdpHeader {
            src_port: BigEndian::read_u16(&data[0..2]),
            dst_port: BigEndian::read_u16(&data[2..4]),
            length: BigEndian::read_u16(&data[4..6]),
            checksum: BigEndian::read_u16(&data[6..8]),
        };
        tracing::debug!(
            "Parsed UDP header - Src Port: {}, Dst Port: {}, Length: {}",
            header.src_port,
            header.dst_port,
            header.length
        );
        Ok(header)
    }

    /// Convert UDP header to bytes
    pub fn to_bytes(&self) -> [u8; UDP_HEADER_LEN] {
        let mut bytes = [0u8; UDP_HEADER_LEN];
        BigEndian::write_u16(&mut bytes[0..2], self.src_port);
        BigEndian::write_u16(&mut bytes[2..4], self.dst_port);
        BigEndian::write_u16(&mut bytes[4..6], self.length);
        BigEndian::write_u16(&mut bytes[6..8], self.checksum);
        bytes
    }
}

/// Calculate the UDP checksum of `datagram` (header + payload)
///
/// Addresses are host order. The checksum slot in `datagram` must be zero.
pub fn calculate_checksum(src_addr: u32, dst_addr: u32, datagram: &[u8]) -> u16 {
    pseudo_header_checksum(src_addr, dst_addr, protocol::UDP, datagram)
}

impl fmt::Display for UdpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "UDP Header:")?;
        writeln!(
            f,
            "  Source Port: {}, Destination Port: {}",
            self.src_port, self.dst_port
        )?;
        write!(
            f,
            "  Length: {} bytes, Checksum: 0x{:x}",
            self.length, self.checksum
        )
    }
}
