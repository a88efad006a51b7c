//! Parser for `show lldp neighbors detail` output

use topomap_core::NeighborRecord;
use tracing::{debug, info};

/// Lines that terminate the free-text system-description accumulator.
const DESCRIPTION_TERMINATORS: &[&str] = &[
    "Time remaining",
    "System Capabilities",
    "Enabled Capabilities",
    "Management",
    "IP:",
    "IPv4",
    "IPv6",
    "Auto Negotiation",
    "Physical media",
    "Vlan ID",
    "Local Port id",
];

fn is_description_terminator(line: &str) -> bool {
    DESCRIPTION_TERMINATORS.iter().any(|k| line.starts_with(k))
}

/// Parse LLDP detail output. A "Chassis id" line starts a new record and
/// seeds the platform field. "System Description" opens a multi-line
/// accumulator; "Management Addresses" opens a bounded sub-scan that only
/// accepts "IP:" lines, so unrelated "IP:" text elsewhere in the block is
/// never misread as the management address.
pub fn parse_lldp_neighbors_detail(output: &str) -> Vec<NeighborRecord> {
    let mut neighbors: Vec<NeighborRecord> = Vec::new();
    let mut current: Option<NeighborRecord> = None;
    let mut in_mgmt_addresses = false;
    let mut in_description = false;

    for line in output.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("Chassis id:") {
            if let Some(rec) = current.take() {
                neighbors.push(rec);
            }
            in_mgmt_addresses = false;
            in_description = false;
            current = Some(NeighborRecord {
                remote_platform: Some(rest.trim().to_string()),
                ..Default::default()
            });
        } else if let Some(rest) = line.strip_prefix("System Name:") {
            let name = rest.trim();
            let hostname = name.split('.').next().unwrap_or(name);
            current.get_or_insert_with(Default::default).remote_device =
                Some(hostname.to_string());
            in_mgmt_addresses = false;
            in_description = false;
        } else if let Some(rest) = line.strip_prefix("Local Port id:") {
            current.get_or_insert_with(Default::default).local_intf =
                Some(rest.trim().to_string());
            in_mgmt_addresses = false;
            in_description = false;
        } else if let Some(rest) = line.strip_prefix("Port id:") {
            current.get_or_insert_with(Default::default).remote_intf =
                Some(rest.trim().to_string());
            in_mgmt_addresses = false;
            in_description = false;
        } else if line.starts_with("System Description:") {
            // Description text continues on following lines
            current
                .get_or_insert_with(Default::default)
                .system_description = Some(String::new());
            in_mgmt_addresses = false;
            in_description = true;
        } else if let Some(rest) = line.strip_prefix("System Capabilities:") {
            current
                .get_or_insert_with(Default::default)
                .remote_capabilities = Some(rest.trim().to_string());
            in_mgmt_addresses = false;
            in_description = false;
        } else if line.starts_with("Management Addresses:") || line.starts_with("Management Address:")
        {
            in_mgmt_addresses = true;
            in_description = false;
        } else if in_mgmt_addresses {
            if let Some(rest) = line.strip_prefix("IP:") {
                let ip = rest.trim();
                if !ip.is_empty() {
                    debug!(ip, "LLDP management address");
                    current.get_or_insert_with(Default::default).remote_ip =
                        Some(ip.to_string());
                }
            } else if !line.is_empty()
                && !["IP", "IPv4", "IPv6", "Other"]
                    .iter()
                    .any(|p| line.starts_with(p))
            {
                in_mgmt_addresses = false;
            }
        } else if in_description {
            if is_description_terminator(line) {
                in_description = false;
            } else if !line.is_empty() {
                if let Some(desc) = current
                    .get_or_insert_with(Default::default)
                    .system_description
                    .as_mut()
                {
                    if !desc.is_empty() {
                        desc.push(' ');
                    }
                    desc.push_str(line);
                }
            }
        }
    }

    if let Some(rec) = current.take() {
        neighbors.push(rec);
    }

    info!(count = neighbors.len(), "Parsed LLDP neighbors");
    for (i, n) in neighbors.iter().enumerate() {
        debug!(
            index = i + 1,
            device = n.remote_device.as_deref().unwrap_or("?"),
            ip = n.remote_ip.as_deref().unwrap_or("MISSING"),
            "LLDP neighbor"
        );
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTREME_BLOCK: &str = "\
------------------------------------------------
Chassis id: 00:1c:73:aa:bb:cc
Port id: 1:1
Port Description: Port 1:1
System Name: DIST-EXTREME-01

System Description:
ExtremeXOS (X670-G2) version 30.7.1.4 by release-manager

Time remaining: 112 seconds
System Capabilities: B,R
Enabled Capabilities: B,R
Management Addresses:
    IP: 192.168.1.10
Auto Negotiation - supported, enabled
Physical media capabilities:
    10GbaseT(FD)
Vlan ID: 1

Local Port id: Eth1/1
";

    #[test]
    fn test_parse_full_block() {
        let neighbors = parse_lldp_neighbors_detail(EXTREME_BLOCK);
        assert_eq!(neighbors.len(), 1);
        let n = &neighbors[0];
        assert_eq!(n.remote_device.as_deref(), Some("DIST-EXTREME-01"));
        assert_eq!(n.remote_platform.as_deref(), Some("00:1c:73:aa:bb:cc"));
        assert_eq!(n.remote_intf.as_deref(), Some("1:1"));
        assert_eq!(n.local_intf.as_deref(), Some("Eth1/1"));
        assert_eq!(n.remote_capabilities.as_deref(), Some("B,R"));
        assert_eq!(n.remote_ip.as_deref(), Some("192.168.1.10"));
        assert_eq!(
            n.system_description.as_deref(),
            Some("ExtremeXOS (X670-G2) version 30.7.1.4 by release-manager")
        );
    }

    #[test]
    fn test_multiline_description_accumulates() {
        let output = "\
Chassis id: 00:0a:95:cc:dd:ee
System Name: ACCESS-JUNIPER-01
System Description:
Juniper Networks, Inc. ex4300-48p Ethernet Switch,
kernel JUNOS 18.4R3.3
Time remaining: 108 seconds
";
        let neighbors = parse_lldp_neighbors_detail(output);
        assert_eq!(
            neighbors[0].system_description.as_deref(),
            Some("Juniper Networks, Inc. ex4300-48p Ethernet Switch, kernel JUNOS 18.4R3.3")
        );
    }

    #[test]
    fn test_mgmt_address_scan_is_bounded() {
        // The "IP:" line outside the management block must not be misread
        let output = "\
Chassis id: aa:bb:cc:dd:ee:ff
System Name: SW-EDGE-01
Management Addresses:
    IP: 10.1.1.1
Auto Negotiation - supported, enabled
Some Vendor Extension:
    IP: 172.16.0.99
";
        let neighbors = parse_lldp_neighbors_detail(output);
        assert_eq!(neighbors[0].remote_ip.as_deref(), Some("10.1.1.1"));
    }

    #[test]
    fn test_mgmt_section_without_ip() {
        let output = "\
Chassis id: aa:bb:cc:dd:ee:ff
System Name: SW-EDGE-02
Management Addresses:
    Other: 0x001122
";
        let neighbors = parse_lldp_neighbors_detail(output);
        assert!(neighbors[0].remote_ip.is_none());
    }

    #[test]
    fn test_domain_stripped_from_system_name() {
        let output = "Chassis id: aa:bb:cc\nSystem Name: core1.corp.example.com\n";
        let neighbors = parse_lldp_neighbors_detail(output);
        assert_eq!(neighbors[0].remote_device.as_deref(), Some("core1"));
    }

    #[test]
    fn test_multiple_blocks() {
        let two = format!(
            "{}\n------------------------------------------------\nChassis id: 00:1c:73:dd:ee:ff\nPort id: Ethernet1\nSystem Name: DIST-ARISTA-01\n",
            EXTREME_BLOCK
        );
        let neighbors = parse_lldp_neighbors_detail(&two);
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[1].remote_device.as_deref(), Some("DIST-ARISTA-01"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_lldp_neighbors_detail("").is_empty());
    }
}
