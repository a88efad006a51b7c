//! Topomap CLI - Run a topology discovery and print the result
//!
//! Crawls the built-in mock network from a seed device and renders the
//! discovered topology as a text tree (or JSON report).

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use topomap_core::classifier::DeviceTypeDetector;
use topomap_core::device::DiscoveryFilters;
use topomap_core::topology::render_topology_tree;
use topomap_discovery::{Credentials, MockNetwork, TopologyDiscoverer};

#[derive(Parser, Debug)]
#[command(name = "topomap")]
#[command(about = "Recursive multi-vendor network topology discovery")]
#[command(version)]
struct Args {
    /// Seed device IP address
    #[arg(short, long, default_value = "192.168.1.1")]
    seed: String,

    /// Vendor device type of the seed (e.g. cisco_ios, cisco_nxos)
    #[arg(short = 't', long, default_value = "cisco_nxos")]
    device_type: String,

    /// Management username
    #[arg(short, long, default_value = "admin")]
    username: String,

    /// Management password
    #[arg(short, long, default_value = "admin")]
    password: String,

    /// Maximum crawl depth from the seed
    #[arg(short, long, default_value_t = 3)]
    max_depth: u32,

    /// Path to device-type pattern configuration
    #[arg(short = 'c', long, default_value = "device_patterns.toml")]
    patterns: PathBuf,

    /// Include IP phones
    #[arg(long)]
    include_phones: bool,

    /// Include servers and hosts
    #[arg(long)]
    include_servers: bool,

    /// Include wireless access points
    #[arg(long)]
    include_aps: bool,

    /// Include unclassified devices
    #[arg(long)]
    include_other: bool,

    /// Also query L3 routing protocols (OSPF, EIGRP, BGP, IS-IS)
    #[arg(long)]
    include_l3: bool,

    /// Root hostname for the rendered tree (defaults to first device)
    #[arg(long)]
    root: Option<String>,

    /// Print the full report as JSON instead of a tree
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Topomap v{}", env!("CARGO_PKG_VERSION"));

    let detector = DeviceTypeDetector::from_file(&args.patterns);

    let filters = DiscoveryFilters {
        include_phones: args.include_phones,
        include_servers: args.include_servers,
        include_aps: args.include_aps,
        include_other: args.include_other,
        include_l3: args.include_l3,
        ..DiscoveryFilters::default()
    };

    let discoverer = TopologyDiscoverer::new(
        Box::new(MockNetwork::new()),
        detector,
        args.max_depth,
        filters,
    );

    let credentials = Credentials::new(&args.username, &args.password);
    let report = discoverer.discover(&args.seed, &args.device_type, &credentials);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", render_topology_tree(&report.topology, args.root.as_deref()));
    println!();
    println!(
        "Discovered {} devices, {} links ({} visited, {} failed)",
        report.device_count,
        report.link_count,
        report.visited.len(),
        report.failed.len()
    );
    if !report.failed.is_empty() {
        warn!("Some devices could not be discovered:");
        for (ip, failure) in &report.failed {
            warn!(ip = %ip, kind = %failure.kind, reason = %failure.reason, "Discovery failure");
        }
    }

    Ok(())
}
