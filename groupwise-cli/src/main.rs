//! groupwise - batch grouping from the command line
//!
//! Reads a JSON grouping request (ballots, name map, restrictions, optional
//! balance tags), partitions the participants and writes the JSON result.
//!
//! **Usage:**
//! ```bash
//! groupwise --input request.json --group-size 4 --pretty
//! cat request.json | groupwise > result.json
//! ```
//!
//! Logs go to stderr so stdout carries only the result.

use anyhow::{Context, Result};
use clap::Parser;
use groupwise_common::api::{process_request, GroupsRequest};
use groupwise_common::config::load_config;
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

/// Affinity grouping utility
#[derive(Parser, Debug)]
#[clap(name = "groupwise", version)]
#[clap(about = "Partition participants into groups from mutual preference ballots")]
struct Args {
    /// Request file (JSON); reads stdin when omitted
    #[clap(long, short, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[clap(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Target group size (overrides the request and the config file)
    #[clap(long)]
    group_size: Option<usize>,

    /// Balance discount in [0, 1] (overrides the request and the config file)
    #[clap(long)]
    balance_weight: Option<f64>,

    /// Configuration file (TOML)
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[clap(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing before config resolution (stderr; RUST_LOG wins
    // over the configured level)
    let env_filter = EnvFilter::try_from_default_env().ok();
    let follows_config = env_filter.is_none();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if follows_config {
        filter_handle.reload(EnvFilter::new(&config.logging.level))?;
    }

    debug!("Configuration: {:?}", config);

    let raw = read_input(args.input.as_ref())?;
    let mut request: GroupsRequest =
        serde_json::from_str(&raw).context("Request is not valid grouping JSON")?;

    if let Some(group_size) = args.group_size {
        request.group_size = Some(group_size);
    }
    if let Some(balance_weight) = args.balance_weight {
        request.balance_weight = Some(balance_weight);
    }

    info!("Grouping {} ballots", request.ballots.len());
    let response = process_request(request, &config.grouping)?;

    for message in &response.warnings {
        warn!("{}", message);
    }
    info!("Formed {} groups", response.groups.len());

    let json = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    write_output(args.output.as_ref(), &json)?;

    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read request from stdin")?;
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&PathBuf>, json: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("✓ Result written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}
