//! Topology graph accumulated across a discovery run

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::device::{Device, DeviceCategory, Link};

/// Network topology: devices keyed by hostname, each holding its
/// outbound links. Built empty at the start of a run and mutated only
/// by the discoverer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    devices: HashMap<String, Device>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device visited directly. Creates the entry if absent;
    /// otherwise back-fills identity fields that are still unset (a device
    /// first seen as an under-specified neighbor reference may be visited
    /// later with richer data).
    pub fn add_device(
        &mut self,
        hostname: &str,
        mgmt_ip: Option<String>,
        device_type: Option<String>,
        platform: Option<String>,
    ) {
        let device = self
            .devices
            .entry(hostname.to_string())
            .or_insert_with(|| Device::stub(hostname));
        if device.mgmt_ip.is_none() {
            device.mgmt_ip = mgmt_ip;
        }
        if device.device_type.is_none() {
            device.device_type = device_type;
        }
        if device.platform.is_none() {
            device.platform = platform;
        }
    }

    /// Add a link, creating stub entries for both endpoints on demand.
    /// Category and routing flags on an existing remote device are only
    /// back-filled when currently unset (first writer wins).
    pub fn add_link(&mut self, link: Link) {
        self.devices
            .entry(link.local_device.clone())
            .or_insert_with(|| Device::stub(&link.local_device));

        let remote = self
            .devices
            .entry(link.remote_device.clone())
            .or_insert_with(|| Device::stub(&link.remote_device));
        if remote.mgmt_ip.is_none() {
            remote.mgmt_ip = link.remote_ip.clone();
        }
        if remote.category.is_none() {
            if let Some(category) = link.remote_category {
                remote.category = Some(category);
                remote.has_routing = link.remote_has_routing;
            }
        }

        if let Some(local) = self.devices.get_mut(&link.local_device) {
            local.links.push(link);
        }
    }

    pub fn get(&self, hostname: &str) -> Option<&Device> {
        self.devices.get(hostname)
    }

    pub fn contains(&self, hostname: &str) -> bool {
        self.devices.contains_key(hostname)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Number of unique undirected adjacencies: each sorted endpoint pair
    /// counts once even when both directions were recorded.
    pub fn link_count(&self) -> usize {
        let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
        for device in self.devices.values() {
            for link in &device.links {
                let mut pair = [link.local_device.as_str(), link.remote_device.as_str()];
                pair.sort();
                pairs.insert((pair[0].to_string(), pair[1].to_string()));
            }
        }
        pairs.len()
    }

    /// Devices of a given category.
    pub fn devices_in_category(&self, category: DeviceCategory) -> Vec<&Device> {
        self.devices
            .values()
            .filter(|d| d.category == Some(category))
            .collect()
    }
}

struct EdgeLabel<'a> {
    local_intf: &'a str,
    remote_intf: &'a str,
    remote_ip: Option<&'a str>,
    protocols: &'a [crate::device::Protocol],
}

/// Render the topology as a text tree with interface, IP, and protocol
/// labels. Each device appears exactly once even though an A-B adjacency
/// is usually stored as two directed links.
pub fn render_topology_tree(topology: &Topology, root: Option<&str>) -> String {
    if topology.is_empty() {
        return "No devices discovered".to_string();
    }

    // Undirected adjacency plus per-direction edge labels
    let mut adjacency: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut labels: HashMap<(&str, &str), EdgeLabel<'_>> = HashMap::new();

    for device in topology.devices() {
        adjacency.entry(&device.hostname).or_default();
        for link in &device.links {
            adjacency
                .entry(&link.local_device)
                .or_default()
                .insert(&link.remote_device);
            adjacency
                .entry(&link.remote_device)
                .or_default()
                .insert(&link.local_device);
            labels.insert(
                (&link.local_device, &link.remote_device),
                EdgeLabel {
                    local_intf: &link.local_intf,
                    remote_intf: &link.remote_intf,
                    remote_ip: link.remote_ip.as_deref(),
                    protocols: &link.protocols,
                },
            );
        }
    }

    let root = root
        .and_then(|r| adjacency.keys().find(|k| **k == r).copied())
        .or_else(|| adjacency.keys().next().copied());
    let root = match root {
        Some(r) => r,
        None => return "No devices discovered".to_string(),
    };

    let mut lines = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    build_tree(topology, &adjacency, &labels, root, "", true, &mut visited, &mut lines);
    lines.join("\n")
}

#[allow(clippy::too_many_arguments)]
fn build_tree<'a>(
    topology: &'a Topology,
    adjacency: &BTreeMap<&'a str, BTreeSet<&'a str>>,
    labels: &HashMap<(&'a str, &'a str), EdgeLabel<'a>>,
    node: &'a str,
    prefix: &str,
    is_last: bool,
    visited: &mut HashSet<&'a str>,
    lines: &mut Vec<String>,
) {
    visited.insert(node);

    let label = match topology.get(node).and_then(|d| d.mgmt_ip.as_deref()) {
        Some(ip) => format!("{} ({})", node, ip),
        None => node.to_string(),
    };
    lines.push(format!("{}{}", prefix, label));

    // Claim unvisited neighbors before recursing so a cycle reached through
    // a sibling subtree cannot change which child prints last.
    let children: Vec<&str> = adjacency
        .get(node)
        .map(|set| set.iter().copied().filter(|n| !visited.contains(n)).collect())
        .unwrap_or_default();
    for &child in &children {
        visited.insert(child);
    }

    let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
    let count = children.len();
    for (i, neighbor) in children.into_iter().enumerate() {
        let is_last_neighbor = i == count - 1;
        let connector = if is_last_neighbor { "└─" } else { "├─" };

        let mut edge = String::new();
        if let Some(info) = labels
            .get(&(node, neighbor))
            .or_else(|| labels.get(&(neighbor, node)))
        {
            let protocols = info
                .protocols
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("+");
            let tag = if protocols.is_empty() {
                String::new()
            } else {
                format!("[{}]", protocols)
            };
            edge = format!("{} {} ↔ {}", tag, info.local_intf, info.remote_intf);
            if let Some(ip) = info.remote_ip {
                edge.push_str(&format!(" ({})", ip));
            }
        }
        lines.push(format!("{}{}{}", child_prefix, connector, edge));

        let new_prefix = format!(
            "{}{}",
            child_prefix,
            if is_last_neighbor { "   " } else { "│  " }
        );
        build_tree(
            topology,
            adjacency,
            labels,
            neighbor,
            &new_prefix,
            is_last_neighbor,
            visited,
            lines,
        );
    }
}
