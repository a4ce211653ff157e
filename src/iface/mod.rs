//! Routing and forwarding layer
//!
//! This module provides the IP-layer forwarding simulation:
//! - Routing table with longest-prefix-match lookup
//! - Inbound packet validation and protocol dispatch
//! - Forward/drop decision

pub mod forward;
pub mod route;

// Re-export commonly used items
pub use forward::{DropReason, ForwardOutcome, Router};
pub use route::{RouteEntry, RoutingTable};
