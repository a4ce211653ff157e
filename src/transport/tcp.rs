//! TCP (Transmission Control Protocol) header implementation
//!
//! This module provides TCP header parsing, construction and checksum
//! calculation. Connection state is not tracked; only the wire format is.

use std::fmt;

use crate::error::PacketError;
use crate::network::{protocol, pseudo_header_checksum};
use byteorder::{BigEndian, ByteOrder};

/// TCP header length in bytes (no options)
pub const TCP_HEADER_LEN: usize = 20;

/// Byte offset of the checksum within the TCP header
pub const TCP_CHECKSUM_OFFSET: usize = 16;

/// Data offset byte for a 20-byte header (5 words, no reserved bits)
const DEFAULT_DATA_OFFSET: u8 = 0x50;
const DEFAULT_SEQ_NUMBER: u32 = 0x1234_5678;
const DEFAULT_ACK_NUMBER: u32 = 0x8765_4321;
const DEFAULT_WINDOW_SIZE: u16 = 8192;

/// TCP flag bits as carried in header byte 13
pub mod flags {
    pub const FIN: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const RST: u8 = 0x04;
    pub const PSH: u8 = 0x08;
    pub const ACK: u8 = 0x10;
    pub const URG: u8 = 0x20;
    pub const ECE: u8 = 0x40;
    pub const CWR: u8 = 0x80;

    pub(crate) const NAMES: [(u8, &str); 8] = [
        (FIN, "FIN"),
        (SYN, "SYN"),
        (RST, "RST"),
        (PSH, "PSH"),
        (ACK, "ACK"),
        (URG, "URG"),
        (ECE, "ECE"),
        (CWR, "CWR"),
    ];
}

/// TCP packet header structure
///
/// Represents the standard 20-byte TCP header as defined in RFC 793
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq_number: u32,
    pub ack_number: u32,
    pub data_offset: u8, // Data offset (4 bits) + Reserved (3 bits) + NS (1 bit)
    pub flags: u8,
    pub window_size: u16,
    pub checksum: u16,
    pub urgent_ptr: u16,
}

impl TcpHeader {
    /// Create a TCP header with sample sequencing values
    ///
    /// The ack number is only populated when `flags` carries ACK; the
    /// checksum is left as a zero placeholder.
    pub fn new(src_port: u16, dst_port: u16, flags: u8) -> Self {
        let header = TcpHeader {
            src_port,
            dst_port,
            seq_number: DEFAULT_SEQ_NUMBER,
            ack_number: if flags & flags::ACK != 0 {
                DEFAULT_ACK_NUMBER
            } else {
                0
            },
            data_offset: DEFAULT_DATA_OFFSET,
            flags,
            window_size: DEFAULT_WINDOW_SIZE,
            checksum: 0,
            urgent_ptr: 0,
        };
        tracing::debug!(
            "Created TCP header - Port {} -> {}, Flags: 0x{:02x}",
            src_port,
            dst_port,
            flags
        );
        header
    }

    /// Parse TCP header from `data` starting at `offset`
    pub fn from_bytes(data: &[u8], offset: usize) -> Result<Self, PacketError> {
        let available = data.len().saturating_sub(offset);
        if available < TCP_HEADER_LEN {
            return Err(PacketError::TooShort {
                header: "TCP",
                min: TCP_HEADER_LEN,
                actual: available,
            });
        }
        let data = &data[offset..offset + TCP_HEADER_LEN];

        let header = TcpHeader {
            src_port: BigEndian::read_u16(&data[0..2]),
            dst_port: BigEndian::read_u16(&data[2..4]),
            seq_number: BigEndian::read_u32(&data[4..8]),
            ack_number: BigEndian::read_u32(&data[8..12]),
            data_offset: data[12],
            flags: data[13],
            window_size: BigEndian::read_u16(&data[14..16]),
            checksum: BigEndian::read_u16(&data[16..18]),
            urgent_ptr: BigEndian::read_u16(&data[18..20]),
        };
        tracing::debug!(
            "Parsed TCP header - Src Port: {}, Dst Port: {}, Flags: 0x{:02x}",
            header.src_port,
            header.dst_port,
            header.flags
        );
        Ok(header)
    }

    /// Convert TCP header to bytes
    pub fn to_bytes(&self) -> [u8; TCP_HEADER_LEN] {
        let mut bytes = [0u8; TCP_HEADER_LEN];
        BigEndian::write_u16(&mut bytes[0..2], self.src_port);
        BigEndian::write_u16(&mut bytes[2..4], self.dst_port);
        BigEndian::write_u32(&mut bytes[4..8], self.seq_number);
        BigEndian::write_u32(&mut bytes[8..12], self.ack_number);
        bytes[12] = self.data_offset;
        bytes[13] = self.flags;
        BigEndian::write_u16(&mut bytes[14..16], self.window_size);
        BigEndian::write_u16(&mut bytes[16..18], self.checksum);
        BigEndian::write_u16(&mut bytes[18..20], self.urgent_ptr);
        bytes
    }

    /// Check if SYN flag is set
    pub fn is_syn(&self) -> bool {
        self.flags & flags::SYN != 0
    }

    /// Check if ACK flag is set
    pub fn is_ack(&self) -> bool {
        self.flags & flags::ACK != 0
    }

    /// Check if FIN flag is set
    pub fn is_fin(&self) -> bool {
        self.flags & flags::FIN != 0
    }

    /// Check if RST flag is set
    pub fn is_rst(&self) -> bool {
        self.flags & flags::RST != 0
    }

    /// Get the data offset (header length) in bytes
    pub fn header_len(&self) -> usize {
        ((self.data_offset >> 4) as usize) * 4
    }

    /// Names of the flags set in this header, lowest bit first
    pub fn flag_names(&self) -> Vec<&'static str> {
        flags::NAMES
            .iter()
            .filter(|(mask, _)| self.flags & mask != 0)
            .map(|&(_, name)| name)
            .collect()
    }
}

/// Calculate the TCP checksum of `segment` (header + payload)
///
/// Addresses are host order. The checksum slot in `segment` must be zero.
pub fn calculate_checksum(src_addr: u32, dst_addr: u32, segment: &[u8]) -> u16 {
    pseudo_header_checksum(src_addr, dst_addr, protocol::TCP, segment)
}

impl fmt::Display for TcpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TCP Header:")?;
        writeln!(
            f,
            "  Source Port: {}, Destination Port: {}",
            self.src_port, self.dst_port
        )?;
        writeln!(
            f,
            "  Sequence Number: {}, Acknowledgment Number: {}",
            self.seq_number, self.ack_number
        )?;
        writeln!(
            f,
            "  Window Size: {}, Checksum: 0x{:x}",
            self.window_size, self.checksum
        )?;
        write!(f, "  Flags: ")?;
        for name in self.flag_names() {
            write!(f, "{} ", name)?;
        }
        write!(f, "(0x{:x})", self.flags)
    }
}
