use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use variants::config::{DEFAULT_CONFIG_FILE, VariantsConfig};
use variants::format::OutputFormat;
use variants::telemetry;

mod commands;

/// Culture and segment variant reconciliation for content items
///
/// Works on JSON snapshots of a content item: the data as last saved
/// (persisted) and the data with unsaved edits (current). Variant ids are
/// written `<culture>` or `<culture>_<segment>`, with `invariant` for no
/// culture, e.g. `en-US`, `da-DK_vip`, `invariant_members`.
///
/// QUICK START:
///
///   variants changed --persisted saved.json --current edited.json
///   variants merge --persisted saved.json --current edited.json --select en-US -o save.json
///   variants check --snapshot save.json --select en-US --varies-by-culture
///   variants name --snapshot saved.json --culture da-DK
#[derive(Parser)]
#[command(name = "variants")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'variants <command> --help' for more information on a specific command.")]
struct Cli {
    /// Configuration file (default: ./variants.toml)
    #[arg(long, global = true, env = "VARIANTS_CONFIG")]
    config: Option<PathBuf>,

    /// Output format: text or json (default: `output.format` from config)
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    /// Shorthand for --format json
    #[arg(long, global = true, hide = true, conflicts_with = "format")]
    json: bool,

    #[command(subcommand)]
    command: commands::Commands,
}

fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = VariantsConfig::load(&config_path)?;
    let format = OutputFormat::resolve(cli.format, cli.json, config.output.format);

    commands::run(cli.command, &config, format)
}
