//! memcache-discover - print the nodes behind an ElastiCache configuration endpoint

use anyhow::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use memcache_autodiscovery::config::{CacheConfig, CliArgs, OutputFormat};
use memcache_autodiscovery::{ClusterInfo, ClusterTopologyClient};

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn print_topology(info: &ClusterInfo, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(info)?);
        }
        OutputFormat::Text => {
            match info.version {
                Some(version) => println!("Config version: {}", version),
                None => println!("Config version: unknown (configuration endpoint used as the only node)"),
            }
            println!("Nodes: {}", info.num_nodes());
            for node in &info.nodes {
                println!("  {}", node);
            }
        }
    }
    Ok(())
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse_args();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    args.validate()
        .map_err(|e| anyhow::anyhow!("Invalid arguments: {}", e))?;

    // Build configuration
    let config = CacheConfig::from_cli(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let client = ClusterTopologyClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    info!("Querying configuration endpoint {}", config.location);
    let info = client
        .get_cluster_info()
        .map_err(|e| anyhow::anyhow!("Cluster discovery failed: {}", e))?;

    print_topology(&info, args.format)
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
