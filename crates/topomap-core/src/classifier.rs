//! Device-type classification from CDP/LLDP platform and capability data
//!
//! Pattern rules are loaded from a TOML document mapping device-type tags
//! to platform/description substrings with a priority weight. Category
//! precedence is an explicit ordered rule table so the resolution order
//! (firewall > AP > phone > server > switch > router > other) is visible
//! and testable.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::device::{parse_capabilities, DeviceCategory, DiscoveryFilters};

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("failed to read pattern config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse pattern config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Matching rule for one device-type tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceTypeRule {
    /// Platform substrings (case-insensitive), CDP-style
    #[serde(default)]
    pub platforms: Vec<String>,
    /// System-description substrings (case-insensitive), LLDP-style
    #[serde(default)]
    pub system_descriptions: Vec<String>,
    /// Match weight; a description match counts half
    #[serde(default = "default_priority")]
    pub priority: u32,
}

fn default_priority() -> u32 {
    10
}

/// Externally supplied pattern configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceTypePatterns {
    /// Rules in document order; the earlier-listed rule wins score ties
    #[serde(
        default,
        deserialize_with = "rules_in_document_order",
        serialize_with = "rules_as_table"
    )]
    pub device_types: Vec<(String, DeviceTypeRule)>,
    /// Capability tokens considered crawlable when no filter set is supplied
    #[serde(default)]
    pub allowed_capabilities: Vec<String>,
    #[serde(default = "default_device_type")]
    pub default_device_type: String,
}

fn default_device_type() -> String {
    "cisco_ios".to_string()
}

/// TOML tables deserialize here through a map visitor so the rule order
/// matches the config document, not the key sort order.
fn rules_in_document_order<'de, D>(
    deserializer: D,
) -> Result<Vec<(String, DeviceTypeRule)>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct RulesVisitor;

    impl<'de> serde::de::Visitor<'de> for RulesVisitor {
        type Value = Vec<(String, DeviceTypeRule)>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a table of device type rules")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut rules = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                rules.push(entry);
            }
            Ok(rules)
        }
    }

    deserializer.deserialize_map(RulesVisitor)
}

fn rules_as_table<S>(
    rules: &[(String, DeviceTypeRule)],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_map(rules.iter().map(|(tag, rule)| (tag, rule)))
}

impl Default for DeviceTypePatterns {
    /// Minimal built-in rules used when no config file is available:
    /// a single generic IOS-like rule.
    fn default() -> Self {
        let device_types = vec![(
            "cisco_ios".to_string(),
            DeviceTypeRule {
                platforms: vec!["cisco".to_string(), "catalyst".to_string()],
                system_descriptions: vec!["IOS".to_string()],
                priority: 50,
            },
        )];
        Self {
            device_types,
            allowed_capabilities: ["Router", "Switch", "R", "S", "B"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_device_type: default_device_type(),
        }
    }
}

impl DeviceTypePatterns {
    pub fn from_toml(content: &str) -> Result<Self, ClassifierError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ClassifierError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from file, falling back to the built-in defaults when the
    /// file is missing or unparsable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(patterns) => {
                info!(
                    path = %path.display(),
                    types = patterns.device_types.len(),
                    "Loaded device type patterns"
                );
                patterns
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Pattern config unavailable, using defaults");
                Self::default()
            }
        }
    }
}

/// Platform/description keywords identifying firewall vendors. Checked
/// before capability-based classification because firewalls legitimately
/// advertise the Router capability.
const FIREWALL_KEYWORDS: &[&str] = &[
    "palo alto",
    "paloalto",
    "fortinet",
    "fortigate",
    "checkpoint",
    "cisco asa",
    "firepower",
    "sophos",
    "sonicwall",
    "watchguard",
    "barracuda",
    "juniper srx",
    "pa-",
    "fw-",
    "pan-os",
];

/// One entry of the ordered category-resolution table: the first rule
/// whose predicate matches wins.
struct CategoryRule {
    category: DeviceCategory,
    matches: fn(caps: &[String], text: &str) -> bool,
}

fn has_any(caps: &[String], tokens: &[&str]) -> bool {
    caps.iter().any(|c| tokens.contains(&c.as_str()))
}

fn matches_firewall(_caps: &[String], text: &str) -> bool {
    FIREWALL_KEYWORDS.iter().any(|k| text.contains(k))
}

fn matches_access_point(caps: &[String], _text: &str) -> bool {
    // Trans-Bridge is how Cisco APs advertise themselves over CDP
    has_any(caps, &["WLAN", "W", "AP", "TRANS-BRIDGE"])
}

fn matches_phone(caps: &[String], _text: &str) -> bool {
    has_any(caps, &["PHONE", "P", "T"])
}

fn matches_server(caps: &[String], _text: &str) -> bool {
    has_any(caps, &["HOST", "H", "SERVER"])
}

fn matches_switch(caps: &[String], _text: &str) -> bool {
    has_any(caps, &["SWITCH", "S", "BRIDGE", "B"])
}

fn matches_router(caps: &[String], _text: &str) -> bool {
    has_any(caps, &["ROUTER", "R"])
}

/// Evaluated top to bottom. Switch precedes router so L3 switches
/// advertising both capabilities are labeled switches.
const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: DeviceCategory::Firewall,
        matches: matches_firewall,
    },
    CategoryRule {
        category: DeviceCategory::AccessPoint,
        matches: matches_access_point,
    },
    CategoryRule {
        category: DeviceCategory::Phone,
        matches: matches_phone,
    },
    CategoryRule {
        category: DeviceCategory::Server,
        matches: matches_server,
    },
    CategoryRule {
        category: DeviceCategory::Switch,
        matches: matches_switch,
    },
    CategoryRule {
        category: DeviceCategory::Router,
        matches: matches_router,
    },
];

/// Categorize a device from upper-cased capability tokens plus platform
/// and system-description text. Returns the category and whether the
/// device advertises routing capability.
pub fn categorize(
    caps: &[String],
    platform: &str,
    system_desc: &str,
) -> (DeviceCategory, bool) {
    let has_routing = has_any(caps, &["ROUTER", "R"]);
    let text = format!("{} {}", platform, system_desc).to_lowercase();

    for rule in CATEGORY_RULES {
        if (rule.matches)(caps, &text) {
            return (rule.category, has_routing);
        }
    }
    (DeviceCategory::Other, has_routing)
}

/// Detects vendor device-type tags from CDP/LLDP platform information
/// using the configured pattern rules.
pub struct DeviceTypeDetector {
    patterns: DeviceTypePatterns,
    config_path: Option<PathBuf>,
    allowed_caps: HashSet<String>,
}

impl DeviceTypeDetector {
    pub fn new(patterns: DeviceTypePatterns) -> Self {
        let allowed_caps = patterns
            .allowed_capabilities
            .iter()
            .map(|c| c.to_uppercase())
            .collect();
        info!(types = patterns.device_types.len(), "Device type detector initialized");
        Self {
            patterns,
            config_path: None,
            allowed_caps,
        }
    }

    /// Build a detector from a pattern config file, falling back to the
    /// built-in defaults if the file cannot be used. The path is kept so
    /// the config can be reloaded.
    pub fn from_file(path: &Path) -> Self {
        let mut detector = Self::new(DeviceTypePatterns::load_or_default(path));
        detector.config_path = Some(path.to_path_buf());
        detector
    }

    /// Re-read the pattern config from the original path, if any.
    pub fn reload(&mut self) {
        if let Some(path) = self.config_path.clone() {
            *self = Self::from_file(&path);
            info!("Pattern configuration reloaded");
        }
    }

    pub fn default_type(&self) -> &str {
        &self.patterns.default_device_type
    }

    /// Match platform and description text against the configured rules.
    /// Score = priority for a platform substring match plus priority/2 for
    /// a description match; highest score wins, the rule listed first in
    /// the config wins ties; no match falls back to the configured
    /// default type.
    pub fn detect_type(&self, platform: &str, system_desc: &str) -> String {
        let platform_lower = platform.to_lowercase();
        let desc_lower = system_desc.to_lowercase();

        let mut best: Option<(&str, f64)> = None;
        for (device_type, rule) in &self.patterns.device_types {
            let mut score = 0.0;
            if rule
                .platforms
                .iter()
                .any(|p| platform_lower.contains(&p.to_lowercase()))
            {
                score += rule.priority as f64;
            }
            if rule
                .system_descriptions
                .iter()
                .any(|p| desc_lower.contains(&p.to_lowercase()))
            {
                score += rule.priority as f64 * 0.5;
            }
            if score > 0.0 {
                debug!(device_type = %device_type, score, "Pattern matched");
                // Strictly greater, so the earlier-listed rule wins ties
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((device_type, score));
                }
            }
        }

        match best {
            Some((device_type, _)) => device_type.to_string(),
            None => {
                debug!(default = %self.patterns.default_device_type, "No pattern matched, using default");
                self.patterns.default_device_type.clone()
            }
        }
    }

    /// Decide whether a device should be crawled given its raw capability
    /// string and the active filter set. Devices advertising no
    /// capabilities default to crawlable (treated as router/switch).
    /// Without a filter set, legacy behavior applies: crawlable iff the
    /// capability tokens intersect the configured allow-list.
    pub fn should_crawl(&self, capabilities: &str, filters: Option<&DiscoveryFilters>) -> bool {
        if capabilities.trim().is_empty() {
            return match filters {
                None => true,
                Some(f) => f.include_routers || f.include_switches,
            };
        }

        let caps = parse_capabilities(capabilities);
        match filters {
            None => caps.iter().any(|c| self.allowed_caps.contains(c)),
            Some(filters) => {
                let (category, _) = categorize(&caps, "", "");
                filters.includes(category)
            }
        }
    }
}
