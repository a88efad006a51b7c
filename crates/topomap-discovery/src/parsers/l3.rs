//! Parsers for L3 routing-protocol neighbor tables (OSPF, EIGRP, BGP, IS-IS)
//!
//! Only adjacencies considered up/established are returned. Every record
//! carries remote_capabilities = "Router" so the classifier treats L3-only
//! neighbors as routing-capable even though they expose no platform string.

use topomap_core::{is_ipv4, NeighborRecord, Protocol};
use tracing::{debug, info};

fn l3_record(protocol: Protocol, state: &str) -> NeighborRecord {
    NeighborRecord {
        remote_capabilities: Some("Router".to_string()),
        state: Some(state.to_string()),
        protocols: vec![protocol],
        ..Default::default()
    }
}

/// Dispatch to the protocol-specific parser.
pub fn parse_l3_neighbors(output: &str, protocol: Protocol) -> Vec<NeighborRecord> {
    match protocol {
        Protocol::Ospf => parse_ospf_neighbors(output),
        Protocol::Eigrp => parse_eigrp_neighbors(output),
        Protocol::Bgp => parse_bgp_neighbors(output),
        Protocol::Isis => parse_isis_neighbors(output),
        Protocol::Cdp | Protocol::Lldp => Vec::new(),
    }
}

/// `show ip ospf neighbor` tabular output (IOS, IOS-XE, NX-OS).
/// Line shape: neighbor-id  pri  state  dead-time  address  interface.
/// Only FULL (or UP) adjacencies are returned.
pub fn parse_ospf_neighbors(output: &str) -> Vec<NeighborRecord> {
    let mut neighbors = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with("Neighbor")
            || line.starts_with("OSPF")
            || line.starts_with("Total")
        {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 {
            continue;
        }
        let state = parts[2].to_uppercase();
        if !state.contains("FULL") && !state.contains("UP") {
            continue;
        }
        let address = parts[4];
        if !is_ipv4(address) {
            continue;
        }
        let mut rec = l3_record(Protocol::Ospf, &state);
        rec.remote_ip = Some(address.to_string());
        rec.local_intf = Some(parts[5].to_string());
        debug!(neighbor_id = parts[0], address, interface = parts[5], "OSPF neighbor");
        neighbors.push(rec);
    }
    info!(count = neighbors.len(), "Parsed OSPF neighbors");
    neighbors
}

/// `show ip eigrp neighbors` tabular output. The protocol shows no down
/// state, so every well-formed row counts. Line shape:
/// H  address  interface  hold  uptime  srtt  rto  q  seq.
pub fn parse_eigrp_neighbors(output: &str) -> Vec<NeighborRecord> {
    let mut neighbors = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with("H ")
            || line.starts_with("EIGRP")
            || line.starts_with("IP-EIGRP")
        {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }
        // The H column is a numeric index; anything else is a header/footer
        if parts[0].parse::<u32>().is_err() {
            continue;
        }
        let address = parts[1];
        if !is_ipv4(address) {
            continue;
        }
        let mut rec = l3_record(Protocol::Eigrp, "UP");
        rec.remote_ip = Some(address.to_string());
        rec.local_intf = Some(parts[2].to_string());
        debug!(address, interface = parts[2], "EIGRP neighbor");
        neighbors.push(rec);
    }
    info!(count = neighbors.len(), "Parsed EIGRP neighbors");
    neighbors
}

/// `show ip bgp neighbors` multi-paragraph output keyed by
/// "BGP neighbor is X" / "BGP state = Y". Only Established sessions are
/// returned; peers are identified by IP only.
pub fn parse_bgp_neighbors(output: &str) -> Vec<NeighborRecord> {
    let mut neighbors = Vec::new();
    let mut current_ip: Option<String> = None;
    let mut current_state: Option<String> = None;

    let flush = |ip: &Option<String>, state: &Option<String>, out: &mut Vec<NeighborRecord>| {
        if let (Some(ip), Some(state)) = (ip, state) {
            if state.to_uppercase().contains("ESTABLISHED") {
                let mut rec = l3_record(Protocol::Bgp, state);
                rec.remote_ip = Some(ip.clone());
                out.push(rec);
            }
        }
    };

    for line in output.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("BGP neighbor is ") {
            flush(&current_ip, &current_state, &mut neighbors);
            let ip = rest.split(',').next().unwrap_or(rest).trim();
            current_ip = Some(ip.to_string());
            current_state = None;
        } else if line.starts_with("BGP state =") || line.contains("BGP state=") {
            let normalized = line.replace("BGP state=", "BGP state = ");
            if let Some((_, rest)) = normalized.split_once("BGP state =") {
                let state = rest.split(',').next().unwrap_or(rest).trim();
                current_state = Some(state.to_string());
            }
        }
    }
    flush(&current_ip, &current_state, &mut neighbors);

    info!(count = neighbors.len(), "Parsed BGP neighbors");
    neighbors
}

/// `show isis neighbors` / `show isis adjacency` tabular output.
/// Line shape: system-id  interface  snpa  state  holdtime  type  protocol.
/// IS-IS identifies peers by system ID, not IP.
pub fn parse_isis_neighbors(output: &str) -> Vec<NeighborRecord> {
    let mut neighbors = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with("System")
            || line.starts_with("IS-IS")
            || line.starts_with("Tag")
        {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }
        let state = parts[3].to_uppercase();
        if !state.contains("UP") {
            continue;
        }
        let mut rec = l3_record(Protocol::Isis, &state);
        rec.remote_device = Some(parts[0].to_string());
        rec.local_intf = Some(parts[1].to_string());
        debug!(system_id = parts[0], interface = parts[1], "IS-IS neighbor");
        neighbors.push(rec);
    }
    info!(count = neighbors.len(), "Parsed IS-IS neighbors");
    neighbors
}
