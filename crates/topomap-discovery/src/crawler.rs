//! Recursive topology discovery engine
//!
//! Breadth-first crawl over management sessions: connect to a device,
//! collect CDP/LLDP (and optionally L3 protocol) neighbors, merge them,
//! classify each neighbor, record links, and queue crawlable neighbors
//! for the next depth level. Per-device failures are recorded and never
//! abort the run.

use std::collections::{BTreeMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use topomap_core::classifier::{categorize, DeviceTypeDetector};
use topomap_core::device::{
    parse_capabilities, DeviceCategory, DiscoveryFilters, Link, NeighborRecord, Protocol,
};
use topomap_core::topology::Topology;

use crate::merge::merge_neighbor_info;
use crate::parsers::{parse_cdp_neighbors_detail, parse_l3_neighbors, parse_lldp_neighbors_detail};
use crate::session::{ConnectError, Connector, Credentials, DeviceSession, SessionTimeouts};

/// A discovery-level failure for one device.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Connection timeout to {ip}")]
    Timeout { ip: String },
    #[error("Authentication failed to {ip}")]
    AuthFailure { ip: String },
    #[error("Connection failed to {ip} (tried {tried:?}): {last_error}")]
    Connection {
        ip: String,
        tried: Vec<String>,
        last_error: String,
    },
    #[error("{0}")]
    Generic(String),
}

impl DiscoveryError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::AuthFailure { .. } => "auth",
            Self::Connection { .. } => "connection",
            Self::Generic(_) => "generic",
        }
    }
}

/// Failure entry kept in the report, keyed by device IP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryFailure {
    pub kind: String,
    pub reason: String,
}

impl From<&DiscoveryError> for DiscoveryFailure {
    fn from(err: &DiscoveryError) -> Self {
        Self {
            kind: err.kind().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Outcome of one discovery run. Always produced, even when every
/// device failed; a partial topology is still a topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub topology: Topology,
    /// Device IPs processed, in visit order
    pub visited: Vec<String>,
    pub failed: BTreeMap<String, DiscoveryFailure>,
    pub device_count: usize,
    pub link_count: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Commands that list established L3 protocol neighbors, per vendor
/// device-type tag.
pub fn l3_commands(device_type: &str) -> &'static [(Protocol, &'static str)] {
    const CISCO_IOS: &[(Protocol, &str)] = &[
        (Protocol::Ospf, "show ip ospf neighbor"),
        (Protocol::Eigrp, "show ip eigrp neighbors"),
        (Protocol::Bgp, "show ip bgp neighbors"),
        (Protocol::Isis, "show isis neighbors"),
    ];
    const CISCO_NXOS: &[(Protocol, &str)] = &[
        (Protocol::Ospf, "show ip ospf neighbors"),
        (Protocol::Eigrp, "show ip eigrp neighbors"),
        (Protocol::Bgp, "show bgp ipv4 unicast neighbors"),
        (Protocol::Isis, "show isis adjacency"),
    ];
    const ARISTA_EOS: &[(Protocol, &str)] = &[
        (Protocol::Ospf, "show ip ospf neighbor"),
        (Protocol::Bgp, "show ip bgp neighbors"),
        (Protocol::Isis, "show isis neighbors"),
    ];
    const JUNIPER_JUNOS: &[(Protocol, &str)] = &[
        (Protocol::Ospf, "show ospf neighbor"),
        (Protocol::Bgp, "show bgp neighbor"),
        (Protocol::Isis, "show isis adjacency"),
    ];
    const EXTREME: &[(Protocol, &str)] = &[
        (Protocol::Ospf, "show ospf neighbor"),
        (Protocol::Bgp, "show bgp neighbor"),
    ];

    match device_type {
        "cisco_ios" | "cisco_xe" => CISCO_IOS,
        "cisco_nxos" => CISCO_NXOS,
        "arista_eos" => ARISTA_EOS,
        "juniper_junos" => JUNIPER_JUNOS,
        "extreme" => EXTREME,
        _ => CISCO_IOS,
    }
}

/// Alternate device-type tags to try when a connection attempt fails
/// with a non-fatal error. Ordered by likelihood.
fn device_type_aliases(device_type: &str) -> &'static [&'static str] {
    match device_type {
        "cisco_ios" => &["cisco_xe", "cisco_nxos"],
        "cisco_xe" => &["cisco_ios"],
        "cisco_nxos" => &["cisco_ios"],
        "hp_procurve" => &["hp_comware", "aruba_os"],
        "hp_comware" => &["hp_procurve", "aruba_os"],
        "aruba_os" => &["hp_procurve"],
        "dell_os10" => &["dell_force10"],
        "dell_force10" => &["dell_os10"],
        "extreme" => &["extreme_vsp"],
        "extreme_vsp" => &["extreme"],
        "ubiquiti_edge" => &["ubiquiti_unifi"],
        _ => &[],
    }
}

/// Extract a hostname from a session prompt by stripping trailing
/// `#`/`>` markers.
pub fn hostname_from_prompt(prompt: &str) -> String {
    prompt.trim().trim_end_matches(['#', '>']).trim().to_string()
}

/// Breadth-first topology discoverer.
pub struct TopologyDiscoverer {
    connector: Box<dyn Connector>,
    detector: DeviceTypeDetector,
    max_depth: u32,
    filters: DiscoveryFilters,
    timeouts: SessionTimeouts,
}

impl TopologyDiscoverer {
    pub fn new(
        connector: Box<dyn Connector>,
        detector: DeviceTypeDetector,
        max_depth: u32,
        filters: DiscoveryFilters,
    ) -> Self {
        info!(max_depth, ?filters, "Topology discoverer initialized");
        Self {
            connector,
            detector,
            max_depth,
            filters,
            timeouts: SessionTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: SessionTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Run a discovery starting from a seed device. Per-device failures
    /// land in the report's failure map; the run itself never errors.
    pub fn discover(
        &self,
        seed_ip: &str,
        seed_device_type: &str,
        credentials: &Credentials,
    ) -> DiscoveryReport {
        let started_at = Utc::now();
        let mut topology = Topology::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut visit_order: Vec<String> = Vec::new();
        let mut failed: BTreeMap<String, DiscoveryFailure> = BTreeMap::new();
        let mut queue: VecDeque<(String, String, u32)> = VecDeque::new();
        queue.push_back((seed_ip.to_string(), seed_device_type.to_string(), 0));

        info!(seed_ip, seed_device_type, "Starting discovery");

        while let Some((ip, device_type, depth)) = queue.pop_front() {
            debug!(queue_len = queue.len(), ip = %ip, depth, "Processing queue entry");

            if visited.contains(&ip) {
                debug!(ip = %ip, "Already visited, skipping");
                continue;
            }
            if depth > self.max_depth {
                debug!(ip = %ip, depth, max_depth = self.max_depth, "Depth exceeded, skipping");
                continue;
            }

            visited.insert(ip.clone());
            visit_order.push(ip.clone());
            info!(ip = %ip, depth, "Discovering device");

            let mut session = match self.connect_with_fallback(&ip, &device_type, credentials) {
                Ok(session) => session,
                Err(err) => {
                    error!(ip = %ip, error = %err, "Discovery failed");
                    failed.insert(ip.clone(), DiscoveryFailure::from(&err));
                    continue;
                }
            };

            let hostname = hostname_from_prompt(&session.find_prompt());
            if hostname.is_empty() {
                // An empty key would collapse this device with every other
                // promptless device in the graph
                let err = DiscoveryError::Generic(format!("no usable prompt from {ip}"));
                error!(ip = %ip, error = %err, "Discovery failed");
                failed.insert(ip.clone(), DiscoveryFailure::from(&err));
                session.disconnect();
                continue;
            }
            info!(hostname = %hostname, ip = %ip, "Connected");
            topology.add_device(&hostname, Some(ip.clone()), Some(device_type.clone()), None);

            let neighbors = self.discover_neighbors(session.as_mut(), &hostname, &device_type);

            for neighbor in neighbors {
                let Some((neighbor_type, category, has_routing)) =
                    self.resolve_neighbor_type(&neighbor)
                else {
                    debug!(
                        neighbor = neighbor.remote_device.as_deref().unwrap_or("Unknown"),
                        "Skipping neighbor, no device type detected"
                    );
                    continue;
                };

                if !self.filters.includes(category) {
                    info!(
                        neighbor = neighbor.remote_device.as_deref().unwrap_or("Unknown"),
                        category = %category,
                        "Skipping neighbor, category filtered out"
                    );
                    continue;
                }

                info!(
                    neighbor = neighbor.remote_device.as_deref().unwrap_or("Unknown"),
                    device_type = %neighbor_type,
                    category = %category,
                    has_routing,
                    "Neighbor resolved"
                );

                // L3-only neighbors with no hostname are keyed by IP
                let remote_name = neighbor
                    .remote_device
                    .clone()
                    .or_else(|| neighbor.remote_ip.clone())
                    .unwrap_or_else(|| "Unknown".to_string());
                let link = Link {
                    local_device: hostname.clone(),
                    local_intf: neighbor.local_intf.clone().unwrap_or_else(|| "?".to_string()),
                    remote_device: remote_name.clone(),
                    remote_intf: neighbor
                        .remote_intf
                        .clone()
                        .unwrap_or_else(|| "?".to_string()),
                    remote_ip: neighbor.remote_ip.clone(),
                    remote_category: Some(category),
                    remote_has_routing: has_routing,
                    protocols: neighbor.protocols.clone(),
                };
                topology.add_link(link);
                debug!(local = %hostname, remote = %remote_name, "Link added");

                let Some(remote_ip) = neighbor.remote_ip.as_deref() else {
                    debug!(remote = %remote_name, "Not queuing, no IP address");
                    continue;
                };
                let capabilities = neighbor.remote_capabilities.as_deref().unwrap_or("");
                if !self.detector.should_crawl(capabilities, Some(&self.filters)) {
                    debug!(remote = %remote_name, category = %category, "Not queuing, non-crawlable");
                    continue;
                }
                if visited.contains(remote_ip) {
                    debug!(remote_ip, "Not queuing, already visited");
                    continue;
                }
                queue.push_back((remote_ip.to_string(), neighbor_type.clone(), depth + 1));
                debug!(remote = %remote_name, remote_ip, depth = depth + 1, "Queued for discovery");
            }

            session.disconnect();
        }

        let device_count = topology.device_count();
        let link_count = topology.link_count();
        info!(
            devices = device_count,
            links = link_count,
            failed = failed.len(),
            "Discovery complete"
        );
        if !failed.is_empty() {
            warn!(?failed, "Some devices could not be discovered");
        }

        DiscoveryReport {
            topology,
            visited: visit_order,
            failed,
            device_count,
            link_count,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Open a session, falling back through vendor alias device types.
    /// Timeouts and auth failures are fatal for the device; other errors
    /// advance to the next alias.
    fn connect_with_fallback(
        &self,
        ip: &str,
        device_type: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn DeviceSession>, DiscoveryError> {
        let mut tried: Vec<String> = vec![device_type.to_string()];
        tried.extend(
            device_type_aliases(device_type)
                .iter()
                .map(|t| t.to_string()),
        );

        let mut last_error = String::new();
        for dt in &tried {
            if dt != device_type {
                info!(ip, device_type = %dt, "Trying fallback device type");
            }
            match self.connector.connect(ip, dt, credentials, &self.timeouts) {
                Ok(session) => {
                    info!(ip, device_type = %dt, "Connected");
                    return Ok(session);
                }
                Err(ConnectError::Timeout(_)) => {
                    // Device unreachable, other aliases will not help
                    return Err(DiscoveryError::Timeout { ip: ip.to_string() });
                }
                Err(ConnectError::Auth(_)) => {
                    return Err(DiscoveryError::AuthFailure { ip: ip.to_string() });
                }
                Err(ConnectError::Other(reason)) => {
                    warn!(ip, device_type = %dt, reason = %reason, "Connection attempt failed");
                    last_error = reason;
                }
            }
        }

        Err(DiscoveryError::Connection {
            ip: ip.to_string(),
            tried,
            last_error,
        })
    }

    /// Collect CDP, LLDP, and (when enabled) L3 protocol neighbors from
    /// an open session and merge them. Command failures degrade to empty
    /// per-protocol results.
    fn discover_neighbors(
        &self,
        session: &mut dyn DeviceSession,
        hostname: &str,
        device_type: &str,
    ) -> Vec<NeighborRecord> {
        let cdp = match session.send_command("show cdp neighbors detail", self.timeouts.read) {
            Ok(output) => {
                let parsed = parse_cdp_neighbors_detail(&output);
                info!(hostname, count = parsed.len(), "CDP neighbors");
                parsed
            }
            Err(err) => {
                warn!(hostname, error = %err, "CDP discovery failed");
                Vec::new()
            }
        };

        let lldp = match session.send_command("show lldp neighbors detail", self.timeouts.read) {
            Ok(output) => {
                let parsed = parse_lldp_neighbors_detail(&output);
                info!(hostname, count = parsed.len(), "LLDP neighbors");
                parsed
            }
            Err(err) => {
                warn!(hostname, error = %err, "LLDP discovery failed");
                Vec::new()
            }
        };

        let mut l3 = Vec::new();
        if self.filters.include_l3 {
            for (protocol, command) in l3_commands(device_type) {
                match session.send_command(command, self.timeouts.read) {
                    Ok(output) => {
                        let parsed = parse_l3_neighbors(&output, *protocol);
                        if !parsed.is_empty() {
                            info!(hostname, protocol = %protocol, count = parsed.len(), "L3 neighbors");
                        }
                        l3.extend(parsed);
                    }
                    Err(err) => {
                        debug!(hostname, protocol = %protocol, error = %err, "L3 discovery failed");
                    }
                }
            }
        }

        merge_neighbor_info(cdp, lldp, l3)
    }

    /// Resolve (device type, category, has_routing) for a merged
    /// neighbor. Platform-based detection wins, then system description,
    /// then capability-only categorization with the default device type.
    /// Returns None when the record carries nothing to classify.
    fn resolve_neighbor_type(
        &self,
        neighbor: &NeighborRecord,
    ) -> Option<(String, DeviceCategory, bool)> {
        let platform = neighbor.remote_platform.as_deref().unwrap_or("");
        let capabilities = neighbor.remote_capabilities.as_deref().unwrap_or("");
        let system_desc = neighbor.system_description.as_deref().unwrap_or("");

        if platform.is_empty() && capabilities.is_empty() && system_desc.is_empty() {
            return None;
        }

        let caps = parse_capabilities(capabilities);
        let (category, has_routing) = categorize(&caps, platform, system_desc);

        if !platform.is_empty() {
            let device_type = self.detector.detect_type(platform, "");
            return Some((device_type, category, has_routing));
        }
        if !system_desc.is_empty() {
            let device_type = self.detector.detect_type("", system_desc);
            return Some((device_type, category, has_routing));
        }
        // Capability-only records (L3 sources set remote_capabilities to
        // "Router") still get queued under the default device type.
        if !caps.is_empty() {
            return Some((self.detector.default_type().to_string(), category, has_routing));
        }
        None
    }
}
