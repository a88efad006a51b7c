//! Canned multi-vendor network satisfying the device-session contract
//!
//! Simulates a small enterprise network (Nexus core, Extreme/Arista
//! distribution, Palo Alto and Fortinet firewalls, Juniper/Cisco access,
//! plus phone/AP/server leaves) with realistic CDP/LLDP text, so crawls
//! can be exercised without hardware.

use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::session::{ConnectError, Connector, Credentials, DeviceSession, SessionTimeouts};

struct MockDevice {
    hostname: &'static str,
    cdp_output: &'static str,
    lldp_output: &'static str,
}

/// A fixed in-memory network keyed by management IP.
pub struct MockNetwork {
    devices: HashMap<&'static str, MockDevice>,
}

impl Default for MockNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNetwork {
    pub fn new() -> Self {
        let mut devices = HashMap::new();

        // Core layer - Cisco Nexus
        devices.insert(
            "192.168.1.1",
            MockDevice {
                hostname: "CORE-NX-01",
                cdp_output: CORE_NX_01_CDP,
                lldp_output: CORE_NX_01_LLDP,
            },
        );
        // Distribution layer
        devices.insert(
            "192.168.1.10",
            MockDevice {
                hostname: "DIST-EXTREME-01",
                cdp_output: "",
                lldp_output: DIST_EXTREME_01_LLDP,
            },
        );
        devices.insert(
            "192.168.1.11",
            MockDevice {
                hostname: "DIST-ARISTA-01",
                cdp_output: "",
                lldp_output: DIST_ARISTA_01_LLDP,
            },
        );
        // Firewalls
        devices.insert(
            "192.168.1.5",
            MockDevice {
                hostname: "FW-PALOALTO-01",
                cdp_output: "",
                lldp_output: FW_PALOALTO_01_LLDP,
            },
        );
        devices.insert(
            "192.168.1.6",
            MockDevice {
                hostname: "FW-FORTINET-01",
                cdp_output: "",
                lldp_output: FW_FORTINET_01_LLDP,
            },
        );
        devices.insert(
            "192.168.1.7",
            MockDevice {
                hostname: "FW-PALOALTO-02",
                cdp_output: "",
                lldp_output: FW_PALOALTO_02_LLDP,
            },
        );
        // Access layer
        devices.insert(
            "192.168.1.20",
            MockDevice {
                hostname: "ACCESS-JUNIPER-01",
                cdp_output: "",
                lldp_output: ACCESS_JUNIPER_01_LLDP,
            },
        );
        devices.insert(
            "192.168.1.21",
            MockDevice {
                hostname: "ACCESS-CISCO-01",
                cdp_output: ACCESS_CISCO_01_CDP,
                lldp_output: ACCESS_CISCO_01_LLDP,
            },
        );
        // Leaves: phone, access point, server
        devices.insert(
            "192.168.1.100",
            MockDevice {
                hostname: "SEP001122334455",
                cdp_output: PHONE_CDP,
                lldp_output: "",
            },
        );
        devices.insert(
            "192.168.1.50",
            MockDevice {
                hostname: "AP-OFFICE-01",
                cdp_output: AP_CDP,
                lldp_output: "",
            },
        );
        devices.insert(
            "192.168.1.200",
            MockDevice {
                hostname: "SRV-DB-01",
                cdp_output: SERVER_CDP,
                lldp_output: "",
            },
        );

        Self { devices }
    }

    pub fn has_host(&self, host: &str) -> bool {
        self.devices.contains_key(host)
    }
}

impl Connector for MockNetwork {
    fn connect(
        &self,
        host: &str,
        device_type: &str,
        _credentials: &Credentials,
        _timeouts: &SessionTimeouts,
    ) -> Result<Box<dyn DeviceSession>, ConnectError> {
        match self.devices.get(host) {
            Some(device) => {
                info!(host, device_type, hostname = device.hostname, "Mock session opened");
                Ok(Box::new(MockSession {
                    hostname: device.hostname,
                    cdp_output: device.cdp_output,
                    lldp_output: device.lldp_output,
                }))
            }
            None => Err(ConnectError::Other(format!(
                "mock device {} not found",
                host
            ))),
        }
    }
}

struct MockSession {
    hostname: &'static str,
    cdp_output: &'static str,
    lldp_output: &'static str,
}

impl DeviceSession for MockSession {
    fn find_prompt(&mut self) -> String {
        format!("{}#", self.hostname)
    }

    fn send_command(&mut self, command: &str, _read_timeout: Duration) -> anyhow::Result<String> {
        debug!(hostname = self.hostname, command, "Mock command");
        let output = if command.contains("show cdp neighbors detail") {
            self.cdp_output
        } else if command.contains("show lldp neighbors detail") {
            self.lldp_output
        } else {
            ""
        };
        Ok(output.to_string())
    }

    fn disconnect(&mut self) {
        debug!(hostname = self.hostname, "Mock session closed");
    }
}

const CORE_NX_01_CDP: &str = "\
Device ID: DIST-EXTREME-01
Entry address(es):
  IP address: 192.168.1.10
Platform: Extreme Summit X670-G2,  Capabilities: Router Switch
Interface: Ethernet1/1,  Port ID (outgoing port): 1:1
Holdtime : 164 sec

-------------------------
Device ID: DIST-ARISTA-01
Entry address(es):
  IP address: 192.168.1.11
Platform: Arista DCS-7280SR-48C6,  Capabilities: Router Switch
Interface: Ethernet1/2,  Port ID (outgoing port): Ethernet1
Holdtime : 142 sec

-------------------------
Device ID: FW-PALOALTO-01
Entry address(es):
  IP address: 192.168.1.5
Platform: Palo Alto Networks PA-3220,  Capabilities: Router
Interface: Ethernet1/10,  Port ID (outgoing port): ethernet1/1
Holdtime : 155 sec
";

const CORE_NX_01_LLDP: &str = "\
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
Vlan ID: 1

Local Port id: Eth1/1

------------------------------------------------
Chassis id: 00:1c:73:dd:ee:ff
Port id: Ethernet1
Port Description: Ethernet1
System Name: DIST-ARISTA-01

System Description:
Arista Networks EOS version 4.28.3M running on an Arista DCS-7280SR-48C6

Time remaining: 97 seconds
System Capabilities: B,R
Enabled Capabilities: B,R
Management Addresses:
    IP: 192.168.1.11
Auto Negotiation - supported, enabled
Vlan ID: 1

Local Port id: Eth1/2

------------------------------------------------
Chassis id: 00:1c:14:aa:bb:01
Port id: ethernet1/1
Port Description: ethernet1/1
System Name: FW-PALOALTO-01

System Description:
Palo Alto Networks PA-3220 running PAN-OS 10.2.3

Time remaining: 105 seconds
System Capabilities: R
Enabled Capabilities: R
Management Addresses:
    IP: 192.168.1.5
Auto Negotiation - supported, enabled

Local Port id: Eth1/10
";

const DIST_EXTREME_01_LLDP: &str = "\
------------------------------------------------
Chassis id: 00:1c:73:11:22:33
Port id: Eth1/1
Port Description: Ethernet1/1
System Name: CORE-NX-01

System Description:
Cisco Nexus Operating System (NX-OS) Software, Version 9.3(8)

Time remaining: 115 seconds
System Capabilities: B,R
Enabled Capabilities: B,R
Management Addresses:
    IP: 192.168.1.1
Auto Negotiation - supported, enabled
Vlan ID: 1

Local Port id: 1:1

------------------------------------------------
Chassis id: 00:0a:95:cc:dd:ee
Port id: ge-0/0/10
Port Description: ge-0/0/10
System Name: ACCESS-JUNIPER-01

System Description:
Juniper Networks, Inc. ex4300-48p Ethernet Switch, kernel JUNOS 18.4R3.3

Time remaining: 108 seconds
System Capabilities: B,R
Enabled Capabilities: B,R
Management Addresses:
    IP: 192.168.1.20
Auto Negotiation - supported, enabled
Vlan ID: 1

Local Port id: 1:10

------------------------------------------------
Chassis id: 70:4c:a5:aa:bb:cc
Port id: port1
Port Description: port1
System Name: FW-FORTINET-01

System Description:
FortiGate-100F v7.2.4,build1396,220915 (GA.F)

Time remaining: 102 seconds
System Capabilities: B,R
Enabled Capabilities: B,R
Management Addresses:
    IP: 192.168.1.6
Auto Negotiation - supported, enabled

Local Port id: 1:15
";

const DIST_ARISTA_01_LLDP: &str = "\
------------------------------------------------
Chassis id: 00:1c:73:11:22:33
Port id: Eth1/2
Port Description: Ethernet1/2
System Name: CORE-NX-01

System Description:
Cisco Nexus Operating System (NX-OS) Software, Version 9.3(8)

Time remaining: 108 seconds
System Capabilities: B,R
Enabled Capabilities: B,R
Management Addresses:
    IP: 192.168.1.1
Auto Negotiation - supported, enabled
Vlan ID: 1

Local Port id: Ethernet1

------------------------------------------------
Chassis id: 00:1c:14:bb:cc:02
Port id: ethernet1/2
Port Description: ethernet1/2
System Name: FW-PALOALTO-02

System Description:
Palo Alto Networks PA-850 running PAN-OS 10.2.3

Time remaining: 95 seconds
System Capabilities: R
Enabled Capabilities: R
Management Addresses:
    IP: 192.168.1.7
Auto Negotiation - supported, enabled

Local Port id: Ethernet10

------------------------------------------------
Chassis id: 00:50:56:aa:bb:cc
Port id: GigabitEthernet0/1
Port Description: GigabitEthernet0/1
System Name: ACCESS-CISCO-01

System Description:
Cisco IOS Software, C2960X Software

Time remaining: 112 seconds
System Capabilities: B
Enabled Capabilities: B
Management Addresses:
    IP: 192.168.1.21
Auto Negotiation - supported, enabled
Vlan ID: 1

Local Port id: Ethernet20
";

const FW_PALOALTO_01_LLDP: &str = "\
------------------------------------------------
Chassis id: 00:1c:73:11:22:33
Port id: Eth1/10
Port Description: Ethernet1/10
System Name: CORE-NX-01

System Description:
Cisco Nexus Operating System (NX-OS) Software, Version 9.3(8)

Time remaining: 95 seconds
System Capabilities: B,R
Enabled Capabilities: B,R
Management Addresses:
    IP: 192.168.1.1
Auto Negotiation - supported, enabled
Vlan ID: 1

Local Port id: ethernet1/1
";

const FW_PALOALTO_02_LLDP: &str = "\
------------------------------------------------
Chassis id: 00:1c:73:dd:ee:ff
Port id: Ethernet10
Port Description: Ethernet10
System Name: DIST-ARISTA-01

System Description:
Arista Networks EOS version 4.28.3M running on an Arista DCS-7280SR-48C6

Time remaining: 102 seconds
System Capabilities: B,R
Enabled Capabilities: B,R
Management Addresses:
    IP: 192.168.1.11
Auto Negotiation - supported, enabled
Vlan ID: 1

Local Port id: ethernet1/2
";

const FW_FORTINET_01_LLDP: &str = "\
------------------------------------------------
Chassis id: 00:1c:73:aa:bb:cc
Port id: 1:15
Port Description: Port 1:15
System Name: DIST-EXTREME-01

System Description:
ExtremeXOS (X670-G2) version 30.7.1.4 by release-manager

Time remaining: 98 seconds
System Capabilities: B,R
Enabled Capabilities: B,R
Management Addresses:
    IP: 192.168.1.10
Auto Negotiation - supported, enabled
Vlan ID: 1

Local Port id: port1
";

const ACCESS_JUNIPER_01_LLDP: &str = "\
------------------------------------------------
Chassis id: 00:1c:73:aa:bb:cc
Port id: 1:10
Port Description: Port 1:10
System Name: DIST-EXTREME-01

System Description:
ExtremeXOS (X670-G2) version 30.7.1.4 by release-manager

Time remaining: 115 seconds
System Capabilities: B,R
Enabled Capabilities: B,R
Management Addresses:
    IP: 192.168.1.10
Auto Negotiation - supported, enabled
Vlan ID: 1

Local Port id: ge-0/0/10
";

const ACCESS_CISCO_01_CDP: &str = "\
Device ID: SEP001122334455
Entry address(es):
  IP address: 192.168.1.100
Platform: Cisco IP Phone 7965,  Capabilities: Host Phone
Interface: GigabitEthernet0/5,  Port ID (outgoing port): Port 1
Holdtime : 156 sec

-------------------------
Device ID: AP-OFFICE-01
Entry address(es):
  IP address: 192.168.1.50
Platform: Cisco AIR-AP3802I-B-K9,  Capabilities: Trans-Bridge
Interface: GigabitEthernet0/10,  Port ID (outgoing port): GigabitEthernet0
Holdtime : 143 sec

-------------------------
Device ID: SRV-DB-01
Entry address(es):
  IP address: 192.168.1.200
Platform: VMware ESXi,  Capabilities: Host
Interface: GigabitEthernet0/15,  Port ID (outgoing port): eth0
Holdtime : 138 sec
";

const ACCESS_CISCO_01_LLDP: &str = "\
------------------------------------------------
Chassis id: 00:1c:73:dd:ee:ff
Port id: Ethernet20
Port Description: Ethernet20
System Name: DIST-ARISTA-01

System Description:
Arista Networks EOS version 4.28.3M running on an Arista DCS-7280SR-48C6

Time remaining: 105 seconds
System Capabilities: B,R
Enabled Capabilities: B,R
Management Addresses:
    IP: 192.168.1.11
Auto Negotiation - supported, enabled
Vlan ID: 1

Local Port id: Gi0/1
";

const PHONE_CDP: &str = "\
Device ID: ACCESS-CISCO-01
Entry address(es):
  IP address: 192.168.1.21
Platform: cisco WS-C2960X-48,  Capabilities: Switch IGMP
Interface: Port 1,  Port ID (outgoing port): GigabitEthernet0/5
Holdtime : 156 sec
";

const AP_CDP: &str = "\
Device ID: ACCESS-CISCO-01
Entry address(es):
  IP address: 192.168.1.21
Platform: cisco WS-C2960X-48,  Capabilities: Switch IGMP
Interface: GigabitEthernet0,  Port ID (outgoing port): GigabitEthernet0/10
Holdtime : 148 sec
";

const SERVER_CDP: &str = "\
Device ID: ACCESS-CISCO-01
Entry address(es):
  IP address: 192.168.1.21
Platform: cisco WS-C2960X-48,  Capabilities: Switch IGMP
Interface: eth0,  Port ID (outgoing port): GigabitEthernet0/15
Holdtime : 138 sec
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_known_host() {
        let network = MockNetwork::new();
        let credentials = Credentials::new("admin", "admin");
        let mut session = network
            .connect("192.168.1.1", "cisco_nxos", &credentials, &SessionTimeouts::default())
            .unwrap();
        assert_eq!(session.find_prompt(), "CORE-NX-01#");
        let output = session
            .send_command("show cdp neighbors detail", Duration::from_secs(15))
            .unwrap();
        assert!(output.contains("DIST-EXTREME-01"));
        session.disconnect();
    }

    #[test]
    fn test_connect_unknown_host_is_not_fatal() {
        let network = MockNetwork::new();
        let credentials = Credentials::new("admin", "admin");
        let err = network
            .connect("10.255.255.1", "cisco_ios", &credentials, &SessionTimeouts::default())
            .err()
            .unwrap();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_unrecognized_command_returns_empty() {
        let network = MockNetwork::new();
        let credentials = Credentials::new("admin", "admin");
        let mut session = network
            .connect("192.168.1.10", "extreme", &credentials, &SessionTimeouts::default())
            .unwrap();
        let output = session
            .send_command("show ip ospf neighbor", Duration::from_secs(15))
            .unwrap();
        assert!(output.is_empty());
    }

    mod crawl {
        use super::*;
        use crate::crawler::{DiscoveryReport, TopologyDiscoverer};
        use topomap_core::classifier::{DeviceTypeDetector, DeviceTypePatterns};
        use topomap_core::device::{DeviceCategory, DiscoveryFilters};

        fn discoverer(max_depth: u32, filters: DiscoveryFilters) -> TopologyDiscoverer {
            TopologyDiscoverer::new(
                Box::new(MockNetwork::new()),
                DeviceTypeDetector::new(DeviceTypePatterns::default()),
                max_depth,
                filters,
            )
        }

        fn run(max_depth: u32, filters: DiscoveryFilters) -> DiscoveryReport {
            discoverer(max_depth, filters).discover(
                "192.168.1.1",
                "cisco_nxos",
                &Credentials::new("admin", "admin"),
            )
        }

        #[test]
        fn test_full_crawl_reaches_infrastructure() {
            let report = run(3, DiscoveryFilters::default());

            for hostname in [
                "CORE-NX-01",
                "DIST-EXTREME-01",
                "DIST-ARISTA-01",
                "FW-PALOALTO-01",
                "FW-PALOALTO-02",
                "FW-FORTINET-01",
                "ACCESS-JUNIPER-01",
                "ACCESS-CISCO-01",
            ] {
                assert!(report.topology.contains(hostname), "missing {hostname}");
            }
            assert!(report.failed.is_empty(), "failures: {:?}", report.failed);
            assert_eq!(report.device_count, 8);
            assert_eq!(report.device_count, report.topology.device_count());
            assert_eq!(report.link_count, report.topology.link_count());
        }

        #[test]
        fn test_default_filters_exclude_leaf_endpoints() {
            let report = run(3, DiscoveryFilters::default());

            assert!(!report.topology.contains("SEP001122334455"));
            assert!(!report.topology.contains("AP-OFFICE-01"));
            assert!(!report.topology.contains("SRV-DB-01"));
        }

        #[test]
        fn test_endpoint_filters_include_leaves() {
            let filters = DiscoveryFilters {
                include_phones: true,
                include_aps: true,
                include_servers: true,
                ..DiscoveryFilters::default()
            };
            let report = run(3, filters);

            assert!(report.topology.contains("SEP001122334455"));
            assert!(report.topology.contains("AP-OFFICE-01"));
            assert!(report.topology.contains("SRV-DB-01"));
            assert_eq!(report.device_count, 11);

            let phone = report.topology.get("SEP001122334455").unwrap();
            assert_eq!(phone.category, Some(DeviceCategory::Phone));
            let ap = report.topology.get("AP-OFFICE-01").unwrap();
            assert_eq!(ap.category, Some(DeviceCategory::AccessPoint));
        }

        #[test]
        fn test_depth_limit_stops_at_distribution() {
            let report = run(1, DiscoveryFilters::default());

            // Depth 0 seed plus its depth 1 neighbors get visited
            assert!(report.visited.contains(&"192.168.1.1".to_string()));
            assert!(report.visited.contains(&"192.168.1.10".to_string()));
            // Depth 2 devices appear only as link endpoints
            assert!(!report.visited.contains(&"192.168.1.20".to_string()));
            assert!(report.topology.contains("ACCESS-JUNIPER-01"));
            assert!(report
                .topology
                .get("ACCESS-JUNIPER-01")
                .unwrap()
                .device_type
                .is_none());
        }

        #[test]
        fn test_firewalls_classified_from_vendor_text() {
            let report = run(3, DiscoveryFilters::default());

            for firewall in ["FW-PALOALTO-01", "FW-PALOALTO-02", "FW-FORTINET-01"] {
                let device = report.topology.get(firewall).unwrap();
                assert_eq!(
                    device.category,
                    Some(DeviceCategory::Firewall),
                    "{firewall} category"
                );
            }
        }

        #[test]
        fn test_report_serializes_round_trip() {
            let report = run(2, DiscoveryFilters::default());
            let json = serde_json::to_string(&report).unwrap();
            let restored: DiscoveryReport = serde_json::from_str(&json).unwrap();
            assert_eq!(restored.device_count, report.device_count);
            assert_eq!(restored.link_count, report.link_count);
            assert_eq!(restored.visited, report.visited);
            assert_eq!(restored.started_at, report.started_at);
        }
    }
}
