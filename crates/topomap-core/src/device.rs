//! Device, link, and neighbor-record types for the topology graph

use serde::{Deserialize, Serialize};

/// Coarse functional classification of a device, distinct from its
/// vendor-specific device-type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Router,
    Switch,
    Firewall,
    AccessPoint,
    Phone,
    Server,
    Other,
}

impl std::fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Router => "router",
            Self::Switch => "switch",
            Self::Firewall => "firewall",
            Self::AccessPoint => "access_point",
            Self::Phone => "phone",
            Self::Server => "server",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Protocol that observed an adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    Cdp,
    Lldp,
    Ospf,
    Eigrp,
    Bgp,
    Isis,
}

impl Protocol {
    /// L3 routing protocols identify peers by session, not physical adjacency.
    pub fn is_l3(&self) -> bool {
        !matches!(self, Self::Cdp | Self::Lldp)
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Cdp => "CDP",
            Self::Lldp => "LLDP",
            Self::Ospf => "OSPF",
            Self::Eigrp => "EIGRP",
            Self::Bgp => "BGP",
            Self::Isis => "IS-IS",
        };
        write!(f, "{}", s)
    }
}

/// A neighbor observation extracted from one discovery protocol, before
/// merging. Every field is optional; all three parser families share this
/// shape so the merger has a single schema to reason about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborRecord {
    /// Neighbor hostname (or IS-IS system ID)
    pub remote_device: Option<String>,
    /// Management IP address
    pub remote_ip: Option<String>,
    /// Platform string (CDP) or chassis ID (LLDP)
    pub remote_platform: Option<String>,
    /// Raw vendor-format capability string (e.g. "Router Switch", "B,R")
    pub remote_capabilities: Option<String>,
    /// LLDP system description, possibly multi-line
    pub system_description: Option<String>,
    /// Local interface name
    pub local_intf: Option<String>,
    /// Remote interface name
    pub remote_intf: Option<String>,
    /// Protocol session state for L3 sources (e.g. "FULL", "ESTABLISHED")
    pub state: Option<String>,
    /// Protocols that observed this adjacency
    pub protocols: Vec<Protocol>,
}

impl NeighborRecord {
    /// A record is usable only if it identifies the neighbor somehow.
    pub fn is_usable(&self) -> bool {
        self.remote_device.is_some() || self.remote_ip.is_some()
    }

    /// Merge key: device name if present, else IP.
    pub fn merge_key(&self) -> Option<&str> {
        self.remote_device
            .as_deref()
            .or(self.remote_ip.as_deref())
    }

    /// True if no field has been populated yet.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Directed edge stored on the local device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub local_device: String,
    pub local_intf: String,
    pub remote_device: String,
    pub remote_intf: String,
    pub remote_ip: Option<String>,
    /// Category of the remote device as classified at discovery time
    pub remote_category: Option<DeviceCategory>,
    /// Whether the remote device has routing capabilities
    pub remote_has_routing: bool,
    pub protocols: Vec<Protocol>,
}

/// A discovered network device. Hostname is the unique key in the topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub hostname: String,
    pub mgmt_ip: Option<String>,
    /// Vendor device-type tag (e.g. "cisco_ios")
    pub device_type: Option<String>,
    pub category: Option<DeviceCategory>,
    /// True for devices that both switch and route (e.g. an L3 switch)
    pub has_routing: bool,
    pub platform: Option<String>,
    /// Outbound links observed from this device
    pub links: Vec<Link>,
}

impl Device {
    /// Create a device known only by name (e.g. a neighbor never visited).
    pub fn stub(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            mgmt_ip: None,
            device_type: None,
            category: None,
            has_routing: false,
            platform: None,
            links: Vec::new(),
        }
    }
}

/// Per-category crawl/include flags supplied by the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryFilters {
    pub include_routers: bool,
    pub include_switches: bool,
    pub include_phones: bool,
    pub include_servers: bool,
    pub include_aps: bool,
    pub include_other: bool,
    /// Also query L3 routing protocols (OSPF/EIGRP/BGP/IS-IS)
    pub include_l3: bool,
}

impl Default for DiscoveryFilters {
    fn default() -> Self {
        Self {
            include_routers: true,
            include_switches: true,
            include_phones: false,
            include_servers: false,
            include_aps: false,
            include_other: false,
            include_l3: false,
        }
    }
}

impl DiscoveryFilters {
    /// Whether a device of the given category should be included.
    /// Firewalls are crawlable like routers.
    pub fn includes(&self, category: DeviceCategory) -> bool {
        match category {
            DeviceCategory::Router | DeviceCategory::Firewall => self.include_routers,
            DeviceCategory::Switch => self.include_switches,
            DeviceCategory::Phone => self.include_phones,
            DeviceCategory::Server => self.include_servers,
            DeviceCategory::AccessPoint => self.include_aps,
            DeviceCategory::Other => self.include_other,
        }
    }
}

/// Parse a raw vendor capability string ("Router Switch" or "B,R") into
/// upper-cased tokens.
pub fn parse_capabilities(raw: &str) -> Vec<String> {
    raw.replace(',', " ")
        .to_uppercase()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// IPv4 syntax check used to validate addresses pulled out of tabular output.
pub fn is_ipv4(s: &str) -> bool {
    s.parse::<std::net::Ipv4Addr>().is_ok()
}
