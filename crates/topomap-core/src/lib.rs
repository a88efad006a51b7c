//! Topomap Core - Data model and device classification
//!
//! This crate provides the foundational types for the Topomap system:
//! - Device, link, and neighbor-record types shared by all parsers
//! - Topology graph keyed by hostname, with a text tree renderer
//! - Device-type classifier driven by external pattern rules

pub mod classifier;
pub mod device;
pub mod topology;

pub use classifier::{
    categorize, ClassifierError, DeviceTypeDetector, DeviceTypePatterns, DeviceTypeRule,
};
pub use device::{
    is_ipv4, parse_capabilities, Device, DeviceCategory, DiscoveryFilters, Link, NeighborRecord,
    Protocol,
};
pub use topology::{render_topology_tree, Topology};
