//! Transport layer protocols implementation
//!
//! This module contains header codecs for transport layer protocols:
//! - TCP: Transmission Control Protocol
//! - UDP: User Datagram Protocol

pub mod tcp;
pub mod udp;

// Re-export commonly used items
pub use tcp::TcpHeader;
pub use udp::UdpHeader;
