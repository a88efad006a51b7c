//! Topomap Discovery - Recursive multi-vendor topology discovery
//!
//! This crate provides the discovery pipeline:
//! - CDP/LLDP detail parsers plus L3 routing protocol tables (OSPF,
//!   EIGRP, BGP, IS-IS)
//! - Neighbor merging across protocol sources
//! - A breadth-first crawler over management sessions with vendor
//!   device-type fallback and per-device failure tracking
//! - A canned mock network for offline runs and tests

pub mod crawler;
pub mod merge;
pub mod mock;
pub mod parsers;
pub mod session;

pub use crawler::{
    hostname_from_prompt, DiscoveryError, DiscoveryFailure, DiscoveryReport, TopologyDiscoverer,
};
pub use merge::merge_neighbor_info;
pub use mock::MockNetwork;
pub use session::{ConnectError, Connector, Credentials, DeviceSession, SessionTimeouts};
