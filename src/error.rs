//! Error types for packet construction, parsing and routing.

/// Failure to parse a dotted-quad IPv4 address string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddrParseError {
    #[error("invalid IP address format: {addr:?} has {count} segments, expected 4")]
    WrongSegmentCount { addr: String, count: usize },

    #[error("invalid IP address: {addr:?} has non-numeric segment {segment:?}")]
    InvalidOctet { addr: String, segment: String },

    #[error("invalid IP address: {addr:?} has byte value {value} > 255")]
    OctetOutOfRange { addr: String, value: u32 },
}

/// Failure to decode a header from a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("packet too short for {header} header: need {min} bytes, got {actual}")]
    TooShort {
        header: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("unsupported IP version: {0} (expected 4)")]
    UnsupportedVersion(u8),
}

/// Failure to add a route to the routing table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("invalid CIDR notation: {0:?}")]
    InvalidCidr(String),

    #[error("invalid prefix length in {cidr:?}: {prefix} (must be 0..=32)")]
    InvalidPrefixLength { cidr: String, prefix: u32 },

    #[error("address error: {0}")]
    Address(#[from] AddrParseError),
}

/// Failure to assemble a packet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("address error: {0}")]
    Address(#[from] AddrParseError),

    #[error("payload of {len} bytes does not fit in an IPv4 packet (max {max})")]
    PayloadTooLarge { len: usize, max: usize },
}

/// Failure to load the simulator configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid route in config: {0}")]
    Route(#[from] RouteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addr_parse_error_display() {
        let err = AddrParseError::OctetOutOfRange {
            addr: "999.1.1.1".into(),
            value: 999,
        };
        assert_eq!(
            err.to_string(),
            "invalid IP address: \"999.1.1.1\" has byte value 999 > 255"
        );

        let err = AddrParseError::WrongSegmentCount {
            addr: "1.2.3".into(),
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "invalid IP address format: \"1.2.3\" has 3 segments, expected 4"
        );
    }

    #[test]
    fn test_packet_error_display() {
        let err = PacketError::TooShort {
            header: "TCP",
            min: 40,
            actual: 28,
        };
        assert_eq!(
            err.to_string(),
            "packet too short for TCP header: need 40 bytes, got 28"
        );

        let err = PacketError::UnsupportedVersion(6);
        assert_eq!(err.to_string(), "unsupported IP version: 6 (expected 4)");
    }

    #[test]
    fn test_route_error_from_addr_error() {
        let ae = AddrParseError::InvalidOctet {
            addr: "a.b.c.d".into(),
            segment: "a".into(),
        };
        let re: RouteError = ae.into();
        assert!(matches!(re, RouteError::Address(_)));
        assert!(re.to_string().starts_with("address error: "));
    }

    #[test]
    fn test_build_error_from_addr_error() {
        let ae = AddrParseError::WrongSegmentCount {
            addr: "1.2.3".into(),
            count: 3,
        };
        let be: BuildError = ae.into();
        assert!(matches!(be, BuildError::Address(_)));
    }
}
