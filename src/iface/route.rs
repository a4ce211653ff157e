//! Routing table with longest-prefix-match lookup
//!
//! Routes are kept sorted by mask, longest first, so the first matching entry
//! during a linear scan is the most specific one. Routes with equal masks are
//! ordered by metric, then by insertion order.

use std::fmt;

use crate::error::RouteError;
use crate::network::ipv4::{int_to_ip_string, ip_string_to_int};

/// A single CIDR route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Network address, always pre-masked
    pub network: u32,
    pub mask: u32,
    pub interface: String,
    /// Gateway address, 0 for a directly connected network
    pub next_hop: u32,
    pub metric: u32,
}

impl RouteEntry {
    pub fn prefix_len(&self) -> u32 {
        self.mask.count_ones()
    }

    pub fn is_direct(&self) -> bool {
        self.next_hop == 0
    }

    pub fn matches(&self, destination: u32) -> bool {
        destination & self.mask == self.network
    }
}

/// Convert a prefix length to a host-order netmask
pub fn prefix_to_mask(prefix_len: u32) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - prefix_len)
    }
}

/// Parse `a.b.c.d/n` into `(network, mask)`
///
/// A bare address without `/` is a `/32` host route.
pub fn parse_cidr(cidr: &str) -> Result<(u32, u32), RouteError> {
    let (addr, mask) = match cidr.split_once('/') {
        None => (ip_string_to_int(cidr)?, u32::MAX),
        Some((addr, prefix)) => {
            let prefix_len: u32 = prefix
                .parse()
                .map_err(|_| RouteError::InvalidCidr(cidr.to_string()))?;
            if prefix_len > 32 {
                return Err(RouteError::InvalidPrefixLength {
                    cidr: cidr.to_string(),
                    prefix: prefix_len,
                });
            }
            (ip_string_to_int(addr)?, prefix_to_mask(prefix_len))
        }
    };
    Ok((addr & mask, mask))
}

#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: Vec<RouteEntry>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route
    ///
    /// `next_hop` empty means directly connected.
    pub fn add_route(
        &mut self,
        cidr: &str,
        interface: &str,
        next_hop: &str,
        metric: u32,
    ) -> Result<(), RouteError> {
        let (network, mask) = parse_cidr(cidr)?;
        let next_hop = if next_hop.is_empty() {
            0
        } else {
            ip_string_to_int(next_hop)?
        };

        self.routes.push(RouteEntry {
            network,
            mask,
            interface: interface.to_string(),
            next_hop,
            metric,
        });
        // Stable sort keeps insertion order among equal (mask, metric) keys.
        self.routes
            .sort_by(|a, b| b.mask.cmp(&a.mask).then(a.metric.cmp(&b.metric)));

        tracing::debug!(
            "Added route {}/{} via {} on {} (metric {})",
            int_to_ip_string(network),
            mask.count_ones(),
            if next_hop == 0 {
                "direct".to_string()
            } else {
                int_to_ip_string(next_hop)
            },
            interface,
            metric
        );
        Ok(())
    }

    /// Find the most specific route matching `destination` (host order)
    pub fn lookup_entry(&self, destination: u32) -> Option<&RouteEntry> {
        self.routes.iter().find(|route| route.matches(destination))
    }

    /// Find the egress interface for `destination` (host order)
    pub fn lookup_route(&self, destination: u32) -> Option<&str> {
        self.lookup_entry(destination)
            .map(|route| route.interface.as_str())
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Display for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Routing Table:")?;
        writeln!(
            f,
            "{:<18}{:<16}{:<10}{:<16}Metric",
            "Network", "Mask", "Interface", "Next Hop"
        )?;
        writeln!(f, "{}", "-".repeat(70))?;
        for route in &self.routes {
            let next_hop = if route.is_direct() {
                "Direct".to_string()
            } else {
                int_to_ip_string(route.next_hop)
            };
            writeln!(
                f,
                "{:<18}{:<16}{:<10}{:<16}{}",
                int_to_ip_string(route.network),
                int_to_ip_string(route.mask),
                route.interface,
                next_hop,
                route.metric
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AddrParseError;

    fn ip(s: &str) -> u32 {
        ip_string_to_int(s).unwrap()
    }

    #[test]
    fn test_prefix_to_mask() {
        assert_eq!(prefix_to_mask(0), 0);
        assert_eq!(prefix_to_mask(8), 0xFF00_0000);
        assert_eq!(prefix_to_mask(24), 0xFFFF_FF00);
        assert_eq!(prefix_to_mask(32), u32::MAX);
    }

    #[test]
    fn test_parse_cidr_masks_network() {
        assert_eq!(
            parse_cidr("192.168.1.77/24").unwrap(),
            (ip("192.168.1.0"), 0xFFFF_FF00)
        );
        assert_eq!(parse_cidr("8.8.8.8").unwrap(), (ip("8.8.8.8"), u32::MAX));
        assert_eq!(parse_cidr("10.9.8.7/0").unwrap(), (0, 0));
    }

    #[test]
    fn test_parse_cidr_errors() {
        assert!(matches!(
            parse_cidr("10.0.0.0/33"),
            Err(RouteError::InvalidPrefixLength { prefix: 33, .. })
        ));
        assert!(matches!(
            parse_cidr("10.0.0.0/abc"),
            Err(RouteError::InvalidCidr(_))
        ));
        assert!(matches!(
            parse_cidr("10.0.0/8"),
            Err(RouteError::Address(AddrParseError::WrongSegmentCount { .. }))
        ));
    }

    #[test]
    fn test_longest_prefix_match() {
        let mut table = RoutingTable::new();
        table.add_route("10.0.0.0/8", "eth0", "", 1).unwrap();
        table.add_route("10.1.0.0/16", "eth1", "", 1).unwrap();

        assert_eq!(table.lookup_route(ip("10.1.2.3")), Some("eth1"));
        assert_eq!(table.lookup_route(ip("10.2.2.3")), Some("eth0"));
        assert_eq!(table.lookup_route(ip("11.0.0.1")), None);
    }

    #[test]
    fn test_sorted_longest_prefix_first() {
        let mut table = RoutingTable::new();
        table.add_route("0.0.0.0/0", "wlan0", "192.168.1.1", 10).unwrap();
        table.add_route("8.8.8.8/32", "wlan0", "192.168.1.1", 1).unwrap();
        table.add_route("127.0.0.0/8", "lo", "", 1).unwrap();
        table.add_route("192.168.1.0/24", "wlan0", "", 1).unwrap();

        let prefixes: Vec<u32> = table.routes().iter().map(RouteEntry::prefix_len).collect();
        assert_eq!(prefixes, vec![32, 24, 8, 0]);
    }

    #[test]
    fn test_default_route_catch_all() {
        let mut table = RoutingTable::new();
        table.add_route("0.0.0.0/0", "wan0", "10.0.0.1", 10).unwrap();
        assert_eq!(table.lookup_route(ip("203.0.113.9")), Some("wan0"));

        table.add_route("203.0.113.0/24", "lan0", "", 1).unwrap();
        assert_eq!(table.lookup_route(ip("203.0.113.9")), Some("lan0"));
        assert_eq!(table.lookup_route(ip("198.51.100.1")), Some("wan0"));
    }

    #[test]
    fn test_equal_mask_tie_break_by_metric_then_insertion() {
        let mut table = RoutingTable::new();
        table.add_route("10.0.0.0/8", "first", "", 5).unwrap();
        table.add_route("10.0.0.0/8", "second", "", 5).unwrap();
        assert_eq!(table.lookup_route(ip("10.0.0.1")), Some("first"));

        table.add_route("10.0.0.0/8", "cheaper", "", 2).unwrap();
        assert_eq!(table.lookup_route(ip("10.0.0.1")), Some("cheaper"));
    }

    #[test]
    fn test_lookup_entry_next_hop() {
        let mut table = RoutingTable::new();
        table.add_route("8.8.8.8/32", "wlan0", "192.168.1.1", 1).unwrap();
        table.add_route("192.168.1.0/24", "wlan0", "", 1).unwrap();

        let entry = table.lookup_entry(ip("8.8.8.8")).unwrap();
        assert_eq!(entry.next_hop, ip("192.168.1.1"));
        assert!(!entry.is_direct());
        assert!(table.lookup_entry(ip("192.168.1.9")).unwrap().is_direct());
    }

    #[test]
    fn test_add_route_rejects_bad_next_hop() {
        let mut table = RoutingTable::new();
        assert!(table.add_route("10.0.0.0/8", "eth0", "10.0.0", 1).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_display() {
        let mut table = RoutingTable::new();
        table.add_route("192.168.1.0/24", "wlan0", "", 1).unwrap();
        table.add_route("0.0.0.0/0", "wlan0", "192.168.1.1", 10).unwrap();

        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Routing Table:");
        assert_eq!(
            lines[1],
            "Network           Mask            Interface Next Hop        Metric"
        );
        assert_eq!(lines[2], "-".repeat(70));
        assert_eq!(
            lines[3],
            "192.168.1.0       255.255.255.0   wlan0     Direct          1"
        );
        assert_eq!(
            lines[4],
            "0.0.0.0           0.0.0.0         wlan0     192.168.1.1     10"
        );
    }
}
