//! datamerge -- print the merged contents of overlaid data packs as JSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Configuration or pack error
//!   2 - Entries were skipped and --fail-on-skip was set

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::Args;
use datamerge::{LoaderConfig, MergeConfig, PackEntry, load_merge_config};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    let args = Args::parse();
    init_logging(&args);

    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(args: &Args) {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    // Only fails if a subscriber is already installed.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Combine the config file (if any) with command-line packs and types.
fn build_config(args: &Args) -> Result<MergeConfig> {
    let mut config = match &args.config {
        Some(path) => load_merge_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MergeConfig::default(),
    };

    config
        .packs
        .extend(args.packs.iter().map(|(name, path)| PackEntry {
            name: name.clone(),
            path: path.clone(),
        }));
    config.loaders.extend(args.types.iter().map(|t| LoaderConfig {
        resource_type: t.clone(),
        suffix: args.suffix.clone(),
    }));

    config.validate().context("Invalid command-line options")?;
    Ok(config)
}

fn run(args: &Args) -> Result<i32> {
    let config = build_config(args)?;
    if config.loaders.is_empty() {
        bail!("No resource types to aggregate; pass --type or a config with loaders");
    }
    if config.packs.is_empty() {
        warn!("No packs configured; output will be empty");
    }
    debug!("Config: {:?}", config);

    let stack = config.pack_stack().context("Failed to open packs")?;

    let mut output = Map::new();
    let mut skipped = 0;
    for loader_config in &config.loaders {
        let report = loader_config.build().aggregate_with_report(&stack);
        info!(
            "{}: {} identifier(s), {} document(s), {} skipped",
            loader_config.resource_type,
            report.data.len(),
            report.data.value_count(),
            report.skipped.len()
        );
        skipped += report.skipped.len();

        let value = serde_json::to_value(&report.data)
            .context("Failed to serialize aggregated data")?;
        output.insert(loader_config.resource_type.clone(), value);
    }

    let output = Value::Object(output);
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("Failed to render output")?;
    println!("{rendered}");

    if args.fail_on_skip && skipped > 0 {
        warn!("Skipped entries: {}", skipped);
        return Ok(2);
    }
    Ok(0)
}
