//! Stateful text parsers for neighbor discovery command output
//!
//! Each parser is a line-oriented state machine producing the common
//! `NeighborRecord` shape. Unexpected line shapes are skipped, never
//! errors; vendor header/footer lines are tolerated everywhere.

pub mod cdp;
pub mod l3;
pub mod lldp;

pub use cdp::parse_cdp_neighbors_detail;
pub use l3::{
    parse_bgp_neighbors, parse_eigrp_neighbors, parse_isis_neighbors, parse_l3_neighbors,
    parse_ospf_neighbors,
};
pub use lldp::parse_lldp_neighbors_detail;
