//! ICMP (Internet Control Message Protocol) implementation
//!
//! This module provides ICMP header parsing, construction and checksum
//! calculation. Only the echo-request/reply header shape is modelled.

use std::fmt;

use crate::error::PacketError;
use crate::network::checksum;
use byteorder::{BigEndian, ByteOrder};

/// ICMP header length in bytes
pub const ICMP_HEADER_LEN: usize = 8;

/// Byte offset of the checksum within the ICMP header
pub const ICMP_CHECKSUM_OFFSET: usize = 2;

/// ICMP message types
pub const ICMP_TYPE_ECHO_REPLY: u8 = 0;
pub const ICMP_TYPE_DEST_UNREACHABLE: u8 = 3;
pub const ICMP_TYPE_ECHO_REQUEST: u8 = 8;
pub const ICMP_TYPE_TIME_EXCEEDED: u8 = 11;

/// ICMP packet header structure
///
/// Represents the 8-byte ICMP echo header as defined in RFC 792
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IcmpHeader {
    pub msg_type: u8,  // ICMP message type
    pub msg_code: u8,  // ICMP message code
    pub checksum: u16, // ICMP checksum
    pub identifier: u16,
    pub sequence: u16,
}

impl IcmpHeader {
    /// Create an ICMP header with code 0 and a zero checksum placeholder
    pub fn new(msg_type: u8, identifier: u16, sequence: u16) -> Self {
        let header = IcmpHeader {
            msg_type,
            msg_code: 0,
            checksum: 0,
            identifier,
            sequence,
        };
        tracing::debug!(
            "Created ICMP header - Type: {} ({}), ID: {}, Seq: {}",
            msg_type,
            type_name(msg_type),
            identifier,
            sequence
        );
        header
    }

    /// Parse ICMP header from `data` starting at `offset`
    pub fn from_bytes(data: &[u8], offset: usize) -> Result<Self, PacketError> {
        let available = data.len().saturating_sub(offset);
        if available < ICMP_HEADER_LEN {
            return Err(PacketError::TooShort {
                header: "ICMP",
                min: ICMP_HEADER_LEN,
                actual: available,
            });
        }
        let data = &data[offset..offset + ICMP_HEADER_LEN];

        let header = IcmpHeader {
            msg_type: data[0],
            msg_code: data[1],
            checksum: BigEndian::read_u16(&data[2..4]),
            identifier: BigEndian::read_u16(&data[4..6]),
            sequence: BigEndian::read_u16(&data[6..8]),
        };
        tracing::debug!(
            "Parsed ICMP header - Type: {} ({}), Code: {}, ID: {}, Seq: {}",
            header.msg_type,
            header.type_name(),
            header.msg_code,
            header.identifier,
            header.sequence
        );
        Ok(header)
    }

    /// Convert ICMP header to bytes
    pub fn to_bytes(&self) -> [u8; ICMP_HEADER_LEN] {
        let mut bytes = [0u8; ICMP_HEADER_LEN];
        bytes[0] = self.msg_type;
        bytes[1] = self.msg_code;
        BigEndian::write_u16(&mut bytes[2..4], self.checksum);
        BigEndian::write_u16(&mut bytes[4..6], self.identifier);
        BigEndian::write_u16(&mut bytes[6..8], self.sequence);
        bytes
    }

    /// Check if this is an Echo Request message
    pub fn is_echo_request(&self) -> bool {
        self.msg_type == ICMP_TYPE_ECHO_REQUEST
    }

    /// Check if this is an Echo Reply message
    pub fn is_echo_reply(&self) -> bool {
        self.msg_type == ICMP_TYPE_ECHO_REPLY
    }

    pub fn type_name(&self) -> &'static str {
        type_name(self.msg_type)
    }
}

/// Human-readable name of an ICMP message type
pub fn type_name(msg_type: u8) -> &'static str {
    match msg_type {
        ICMP_TYPE_ECHO_REPLY => "Echo Reply",
        ICMP_TYPE_DEST_UNREACHABLE => "Destination Unreachable",
        ICMP_TYPE_ECHO_REQUEST => "Echo Request",
        ICMP_TYPE_TIME_EXCEEDED => "Time Exceeded",
        _ => "Unknown",
    }
}

/// Calculate the ICMP checksum over header + payload
///
/// ICMP has no pseudo-header; the checksum slot in `message` must be zero.
pub fn calculate_checksum(message: &[u8]) -> u16 {
    checksum(message)
}

impl fmt::Display for IcmpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ICMP Header:")?;
        writeln!(
            f,
            "  Type: {} ({}), Code: {}",
            self.msg_type,
            self.type_name(),
            self.msg_code
        )?;
        write!(
            f,
            "  Identifier: {}, Sequence: {}, Checksum: 0x{:x}",
            self.identifier, self.sequence, self.checksum
        )
    }
}
