//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Merge JSON definitions from overlaid data packs.
///
/// Every file `data/<namespace>/<type>/<path><suffix>` found in any pack is
/// parsed and grouped under `<namespace>:<path>`, one entry per pack. The
/// merged result is printed as a JSON object keyed by resource type.
///
/// Examples:
///   datamerge --pack base=./base --pack addon=./addon --type powers
///   datamerge --config merge.toml --pretty
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Merge configuration file (RON, TOML or JSON)
    #[arg(short, long, value_name = "FILE", env = "DATAMERGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pack to overlay, as NAME=DIR. Repeatable; order is preserved
    #[arg(short, long = "pack", value_name = "NAME=DIR", value_parser = parse_pack)]
    pub packs: Vec<(String, PathBuf)>,

    /// Resource type directory to aggregate. Repeatable
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub types: Vec<String>,

    /// File suffix for resource types given with --type
    #[arg(long, default_value = ".json")]
    pub suffix: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Exit with status 2 if any entry was skipped
    #[arg(long)]
    pub fail_on_skip: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_pack(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((name, dir)) if !name.is_empty() && !dir.is_empty() => {
            Ok((name.to_string(), PathBuf::from(dir)))
        }
        _ => Err(format!("expected NAME=DIR, got '{s}'")),
    }
}
