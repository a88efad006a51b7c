//! Multi-source neighbor merge and deduplication
//!
//! CDP usually carries the richest platform data, so CDP records seed the
//! merge; LLDP fills gaps; L3 observations only tag protocols. L2 records
//! key by device name (falling back to IP), L3 records correlate by IP
//! only, since routing protocols rarely expose a hostname.

use std::collections::HashMap;
use topomap_core::{NeighborRecord, Protocol};
use tracing::{debug, info};

/// Insertion-ordered merge map.
#[derive(Default)]
struct MergeMap {
    order: Vec<String>,
    entries: HashMap<String, NeighborRecord>,
}

impl MergeMap {
    fn get_mut(&mut self, key: &str) -> Option<&mut NeighborRecord> {
        self.entries.get_mut(key)
    }

    fn insert(&mut self, key: String, record: NeighborRecord) {
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.insert(key, record);
    }

    fn into_records(mut self) -> Vec<NeighborRecord> {
        self.order
            .iter()
            .filter_map(|k| self.entries.remove(k))
            .collect()
    }
}

/// Merge CDP, LLDP, and L3 neighbor lists into a deduplicated list with a
/// unioned protocol set per adjacency. Records identifying the neighbor by
/// neither name nor IP are dropped.
pub fn merge_neighbor_info(
    cdp_neighbors: Vec<NeighborRecord>,
    lldp_neighbors: Vec<NeighborRecord>,
    l3_neighbors: Vec<NeighborRecord>,
) -> Vec<NeighborRecord> {
    let mut merged = MergeMap::default();

    // CDP first: richest platform info wins the seed position
    for mut neighbor in cdp_neighbors {
        let Some(key) = neighbor.merge_key().map(str::to_string) else {
            continue;
        };
        neighbor.protocols = vec![Protocol::Cdp];
        merged.insert(key, neighbor);
    }

    for mut neighbor in lldp_neighbors {
        let Some(key) = neighbor.merge_key().map(str::to_string) else {
            continue;
        };
        if let Some(entry) = merged.get_mut(&key) {
            // Fill only what CDP was missing; L2 interface data from CDP
            // stays authoritative
            if entry.remote_ip.is_none() {
                entry.remote_ip = neighbor.remote_ip.take();
            }
            if entry.remote_intf.is_none() {
                entry.remote_intf = neighbor.remote_intf.take();
            }
            if entry.local_intf.is_none() {
                entry.local_intf = neighbor.local_intf.take();
            }
            // LLDP system description is richer than anything CDP offers
            if neighbor
                .system_description
                .as_deref()
                .is_some_and(|d| !d.is_empty())
            {
                entry.system_description = neighbor.system_description.take();
            }
            entry.protocols.push(Protocol::Lldp);
        } else {
            neighbor.protocols = vec![Protocol::Lldp];
            merged.insert(key, neighbor);
        }
    }

    if !l3_neighbors.is_empty() {
        // Secondary index built once after the L2 merge; L3-only
        // insertions register their IP so repeats of the same peer across
        // protocols collapse into one entry
        let mut ip_index: HashMap<String, String> = HashMap::new();
        for key in &merged.order {
            if let Some(ip) = merged.entries.get(key).and_then(|e| e.remote_ip.clone()) {
                ip_index.insert(ip, key.clone());
            }
        }

        for mut neighbor in l3_neighbors {
            let protocol = neighbor.protocols.first().copied().unwrap_or(Protocol::Ospf);
            let matched_key = neighbor
                .remote_ip
                .as_ref()
                .and_then(|ip| ip_index.get(ip).cloned());

            if let Some(key) = matched_key {
                // Known from L2 (or an earlier L3 entry): just tag the protocol
                if let Some(entry) = merged.get_mut(&key) {
                    if !entry.protocols.contains(&protocol) {
                        entry.protocols.push(protocol);
                    }
                }
                debug!(%protocol, key, "L3 neighbor merged with existing entry");
            } else {
                let Some(key) = neighbor
                    .remote_ip
                    .clone()
                    .or_else(|| neighbor.remote_device.clone())
                else {
                    continue;
                };
                neighbor.protocols = vec![protocol];
                if let Some(ip) = neighbor.remote_ip.clone() {
                    ip_index.insert(ip, key.clone());
                }
                debug!(%protocol, key, "L3-only neighbor added");
                merged.insert(key, neighbor);
            }
        }
    }

    let result = merged.into_records();
    info!(count = result.len(), "Merged neighbor sources");
    result
}
