//! Network layer protocols implementation
//!
//! This module contains implementations for network layer protocols:
//! - IPv4: Internet Protocol version 4
//! - ICMP: Internet Control Message Protocol
//!
//! It also hosts the Internet checksum shared by every codec in the crate.

pub mod icmp;
pub mod ipv4;

// Re-export commonly used items
pub use icmp::{IcmpHeader, ICMP_TYPE_ECHO_REPLY, ICMP_TYPE_ECHO_REQUEST};
pub use ipv4::{flags, protocol, Ipv4Header};

/// Sum data in 16-bit big-endian words without folding or complementing.
///
/// An odd trailing byte is treated as the high byte of a zero-padded word.
fn ones_complement_sum(data: &[u8], mut sum: u32) -> u32 {
    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }

    if let Some(&last_byte) = chunks.remainder().first() {
        sum += (last_byte as u32) << 8;
    }

    sum
}

fn fold(mut sum: u32) -> u16 {
    while (sum >> 16) > 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

/// Calculate Internet checksum
///
/// Algorithm: Sum data in 16-bit chunks, add carry bits to the sum,
/// and return the one's complement of the result (RFC 1071).
/// This is used for both IP and ICMP checksums.
pub fn checksum(data: &[u8]) -> u16 {
    !fold(ones_complement_sum(data, 0))
}

/// Calculate a TCP/UDP checksum including the IPv4 pseudo-header.
///
/// The pseudo-header is source address, destination address, a zero byte,
/// the protocol number and the segment length. The length is taken from
/// `segment`, which must hold exactly the transport header plus payload.
/// Addresses are in host order.
pub fn pseudo_header_checksum(src_addr: u32, dst_addr: u32, protocol: u8, segment: &[u8]) -> u16 {
    let mut sum = 0u32;
    sum += (src_addr >> 16) + (src_addr & 0xFFFF);
    sum += (dst_addr >> 16) + (dst_addr & 0xFFFF);
    sum += protocol as u32;
    sum += segment.len() as u32 & 0xFFFF;

    !fold(ones_complement_sum(segment, sum))
}

/// Check a region that already carries its checksum.
///
/// Summing a correctly checksummed region yields `0xFFFF`, so its
/// complement is zero.
pub fn verify_checksum(data: &[u8]) -> bool {
    checksum(data) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_checksum_rfc1071_example() {
        // Example from RFC 1071 section 3: sum 0xddf2, checksum 0x220d
        let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
        assert_eq!(checksum(&data), 0x220d);
    }

    #[test]
    fn test_checksum_known_ipv4_header() {
        let header = [
            0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00, 0xc0, 0xa8,
            0x00, 0x01, 0xc0, 0xa8, 0x00, 0xc7,
        ];
        assert_eq!(checksum(&header), 0xb861);
    }

    #[test]
    fn test_checksum_odd_length_pads_low_byte() {
        assert_eq!(checksum(&[0xAB]), !0xAB00u16);
        assert_eq!(checksum(&[0x12, 0x34, 0x56]), !(0x1234u16 + 0x5600));
    }

    #[test]
    fn test_checksum_empty() {
        assert_eq!(checksum(&[]), 0xFFFF);
    }

    #[test]
    fn test_pseudo_header_matches_explicit_layout() {
        let src: u32 = 0xC0A8_0164; // 192.168.1.100
        let dst: u32 = 0x0808_0808;
        let segment = [0xD4, 0x31, 0x00, 0x35, 0x00, 0x0B, 0x00, 0x00, b'a', b'b', b'c'];

        let mut explicit = Vec::new();
        explicit.extend_from_slice(&src.to_be_bytes());
        explicit.extend_from_slice(&dst.to_be_bytes());
        explicit.push(0);
        explicit.push(protocol::UDP);
        explicit.extend_from_slice(&(segment.len() as u16).to_be_bytes());
        explicit.extend_from_slice(&segment);

        assert_eq!(
            pseudo_header_checksum(src, dst, protocol::UDP, &segment),
            checksum(&explicit)
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn checksum_self_verifies(mut data in proptest::collection::vec(any::<u8>(), 4..128)) {
            // Use bytes 2..4 as the checksum slot, as in ICMP.
            data[2] = 0;
            data[3] = 0;
            let sum = checksum(&data);
            data[2..4].copy_from_slice(&sum.to_be_bytes());
            prop_assert!(verify_checksum(&data));
        }
    }
}
