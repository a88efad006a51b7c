//! Parser for `show cdp neighbors detail` output

use topomap_core::NeighborRecord;
use tracing::{debug, info};

/// Parse CDP detail output into neighbor records. A "Device ID" line
/// starts a new record; the in-progress record is flushed on the next
/// boundary and at end of input. Unexpected line shapes are skipped.
pub fn parse_cdp_neighbors_detail(output: &str) -> Vec<NeighborRecord> {
    let mut neighbors: Vec<NeighborRecord> = Vec::new();
    let mut current: Option<NeighborRecord> = None;

    for line in output.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("Device ID:") {
            if let Some(rec) = current.take() {
                neighbors.push(rec);
            }
            let device_id = rest.trim();
            // Sometimes includes a domain suffix, strip it
            let hostname = device_id.split('.').next().unwrap_or(device_id);
            current = Some(NeighborRecord {
                remote_device: Some(hostname.to_string()),
                ..Default::default()
            });
        } else if line.contains("IP address:") || line.contains("IPv4 Address:") {
            let ip = if let Some((_, v)) = line.split_once("IPv4 Address:") {
                v.trim()
            } else if let Some((_, v)) = line.split_once("IP address:") {
                v.trim()
            } else {
                ""
            };
            // Skip placeholders like "(not available)"
            if !ip.is_empty() && !ip.starts_with('(') {
                current
                    .get_or_insert_with(Default::default)
                    .remote_ip = Some(ip.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("Platform:") {
            let rec = current.get_or_insert_with(Default::default);
            let mut parts = line.split(',');
            if let Some(first) = parts.next() {
                let platform = first.strip_prefix("Platform:").unwrap_or(rest).trim();
                rec.remote_platform = Some(platform.to_string());
            }
            for part in parts {
                if let Some((_, caps)) = part.split_once("Capabilities:") {
                    rec.remote_capabilities = Some(caps.trim().to_string());
                }
            }
        } else if line.starts_with("Interface:") {
            // "Interface: GigabitEthernet1/0/1,  Port ID (outgoing port): GigabitEthernet0/1"
            let rec = current.get_or_insert_with(Default::default);
            let mut parts = line.split(',');
            if let Some(first) = parts.next() {
                if let Some((_, local)) = first.split_once("Interface:") {
                    rec.local_intf = Some(local.trim().to_string());
                }
            }
            for part in parts {
                if part.contains("Port ID") {
                    if let Some((_, remote)) = part.rsplit_once(':') {
                        rec.remote_intf = Some(remote.trim().to_string());
                    }
                    break;
                }
            }
        }
    }

    if let Some(rec) = current.take() {
        neighbors.push(rec);
    }

    info!(count = neighbors.len(), "Parsed CDP neighbors");
    for (i, n) in neighbors.iter().enumerate() {
        debug!(
            index = i + 1,
            device = n.remote_device.as_deref().unwrap_or("?"),
            ip = n.remote_ip.as_deref().unwrap_or("MISSING"),
            platform = n.remote_platform.as_deref().unwrap_or("?"),
            "CDP neighbor"
        );
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_neighbor() {
        let output = "\
Device ID: SW1
Entry address(es):
  IP address: 10.0.0.2
Platform: cisco WS-C3750,  Capabilities: Switch
Interface: GigabitEthernet1/0/1,  Port ID (outgoing port): GigabitEthernet0/1
Holdtime : 164 sec
";
        let neighbors = parse_cdp_neighbors_detail(output);
        assert_eq!(neighbors.len(), 1);
        let n = &neighbors[0];
        assert_eq!(n.remote_device.as_deref(), Some("SW1"));
        assert_eq!(n.remote_ip.as_deref(), Some("10.0.0.2"));
        assert_eq!(n.remote_platform.as_deref(), Some("cisco WS-C3750"));
        assert_eq!(n.remote_capabilities.as_deref(), Some("Switch"));
        assert_eq!(n.local_intf.as_deref(), Some("GigabitEthernet1/0/1"));
        assert_eq!(n.remote_intf.as_deref(), Some("GigabitEthernet0/1"));
    }

    #[test]
    fn test_domain_suffix_stripped() {
        let output = "Device ID: core-sw.example.com\n";
        let neighbors = parse_cdp_neighbors_detail(output);
        assert_eq!(neighbors[0].remote_device.as_deref(), Some("core-sw"));
    }

    #[test]
    fn test_placeholder_ip_skipped() {
        let output = "\
Device ID: SEP001122334455
Entry address(es):
  IP address: (not available)
Platform: Cisco IP Phone 7965,  Capabilities: Host Phone
";
        let neighbors = parse_cdp_neighbors_detail(output);
        assert_eq!(neighbors.len(), 1);
        assert!(neighbors[0].remote_ip.is_none());
        assert_eq!(neighbors[0].remote_capabilities.as_deref(), Some("Host Phone"));
    }

    #[test]
    fn test_multiple_blocks_with_separators() {
        let output = "\
Device ID: DIST-EXTREME-01
Entry address(es):
  IP address: 192.168.1.10
Platform: Extreme Summit X670-G2,  Capabilities: Router Switch
Interface: Ethernet1/1,  Port ID (outgoing port): 1:1
Holdtime : 164 sec

-------------------------
Device ID: FW-PALOALTO-01
Entry address(es):
  IPv4 Address: 192.168.1.5
Platform: Palo Alto Networks PA-3220,  Capabilities: Router
Interface: Ethernet1/10,  Port ID (outgoing port): ethernet1/1
";
        let neighbors = parse_cdp_neighbors_detail(output);
        assert_eq!(neighbors.len(), 2);
        // Port ID value is taken after its final colon
        assert_eq!(neighbors[0].remote_intf.as_deref(), Some("1"));
        assert_eq!(neighbors[1].remote_device.as_deref(), Some("FW-PALOALTO-01"));
        assert_eq!(neighbors[1].remote_ip.as_deref(), Some("192.168.1.5"));
        assert_eq!(
            neighbors[1].remote_platform.as_deref(),
            Some("Palo Alto Networks PA-3220")
        );
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert!(parse_cdp_neighbors_detail("").is_empty());
        assert!(parse_cdp_neighbors_detail("% CDP is not enabled\n").is_empty());
    }
}
