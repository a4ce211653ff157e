//! TOML-based configuration for the forwarding simulator.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::iface::route::RoutingTable;

/// Top-level simulator configuration loaded from a TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SimConfig {
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteConfig>,
}

/// The `[logging]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingSection {
    /// Filter directive, e.g. `debug` or `toy_router=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Append log output to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// A `[[routes]]` entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RouteConfig {
    pub cidr: String,
    pub interface: String,
    /// Gateway address. Absent for a directly connected network.
    #[serde(default)]
    pub next_hop: String,
    #[serde(default = "default_metric")]
    pub metric: u32,
}

impl RouteConfig {
    fn new(cidr: &str, interface: &str, next_hop: &str, metric: u32) -> Self {
        RouteConfig {
            cidr: cidr.to_string(),
            interface: interface.to_string(),
            next_hop: next_hop.to_string(),
            metric,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metric() -> u32 {
    1
}

/// Home network: LAN, loopback, two public DNS host routes and a default
/// route via the home router.
fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("192.168.1.0/24", "wlan0", "", 1),
        RouteConfig::new("127.0.0.0/8", "lo", "", 1),
        RouteConfig::new("8.8.8.8/32", "wlan0", "192.168.1.1", 1),
        RouteConfig::new("1.1.1.1/32", "wlan0", "192.168.1.1", 1),
        RouteConfig::new("0.0.0.0/0", "wlan0", "192.168.1.1", 10),
    ]
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            logging: LoggingSection::default(),
            routes: default_routes(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Build a routing table from the configured routes.
    pub fn routing_table(&self) -> Result<RoutingTable, ConfigError> {
        let mut table = RoutingTable::new();
        for route in &self.routes {
            table.add_route(&route.cidr, &route.interface, &route.next_hop, route.metric)?;
        }
        Ok(table)
    }
}
