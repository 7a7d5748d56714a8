//! `variants` subcommands.
//!
//! Each subcommand reads snapshot files (the camelCase JSON form of
//! [`ContentSnapshot`]), runs one engine operation, and prints a report in
//! the selected [`OutputFormat`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;

use variants::config::VariantsConfig;
use variants::format::OutputFormat;
use variants_core::{ContentSnapshot, VariantId};

mod changed;
mod check;
mod merge;
mod name;

#[derive(Subcommand)]
pub enum Commands {
    /// List the variants whose data differs between two snapshots
    ///
    /// A missing persisted file means the item was never saved; every
    /// variant and value of the current snapshot then counts as changed.
    Changed {
        /// Snapshot as last saved
        #[arg(long)]
        persisted: PathBuf,

        /// Snapshot with unsaved edits
        #[arg(long)]
        current: PathBuf,
    },

    /// Build the data to submit when saving selected variants
    ///
    /// Selected variants take their current data; every other variant keeps
    /// its persisted data. Invariant values are always taken from current.
    Merge {
        /// Snapshot as last saved (missing file: never saved)
        #[arg(long)]
        persisted: PathBuf,

        /// Snapshot with unsaved edits
        #[arg(long)]
        current: PathBuf,

        /// Variants the user chose to save, e.g. `en-US` or `da-DK_vip`
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        select: Vec<VariantId>,

        /// Further variants to store (e.g. segment variants of a selected culture)
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        store: Vec<VariantId>,

        /// Treat the item as invariant: no per-variant reconciliation
        #[arg(long)]
        invariant_only: bool,

        /// Write the merged snapshot to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Resolve the display name of an item
    Name {
        /// Snapshot to read names from
        #[arg(long)]
        snapshot: PathBuf,

        /// Culture the user is viewing
        #[arg(long)]
        culture: Option<String>,

        /// Culture to fall back to (default: `names.fallback_culture`)
        #[arg(long)]
        fallback: Option<String>,
    },

    /// Check save data before submitting it
    ///
    /// Fails when a selected variant is missing or any variant has no name.
    Check {
        /// Save data, typically the output of `variants merge`
        #[arg(long)]
        snapshot: PathBuf,

        /// Variants being saved
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        select: Vec<VariantId>,

        /// The item varies by culture (invariant selections need no variant)
        #[arg(long)]
        varies_by_culture: bool,
    },
}

pub fn run(command: Commands, config: &VariantsConfig, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Changed { persisted, current } => changed::run(&persisted, &current, format),
        Commands::Merge {
            persisted,
            current,
            select,
            store,
            invariant_only,
            output,
        } => merge::run(
            &merge::MergeArgs {
                persisted: &persisted,
                current: &current,
                select: &select,
                store: &store,
                varies: config.merge.varies && !invariant_only,
                output: output.as_deref(),
            },
            format,
        ),
        Commands::Name {
            snapshot,
            culture,
            fallback,
        } => name::run(
            &snapshot,
            culture.as_deref(),
            fallback.as_deref().or(config.names.fallback_culture.as_deref()),
            format,
        ),
        Commands::Check {
            snapshot,
            select,
            varies_by_culture,
        } => check::run(&snapshot, &select, varies_by_culture, format),
    }
}

/// Read a snapshot file.
fn read_snapshot(path: &Path) -> Result<ContentSnapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))
}

/// Read a snapshot file that may not exist yet (item never saved).
fn read_persisted(path: &Path) -> Result<Option<ContentSnapshot>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "persisted snapshot not found, treating item as never saved");
        return Ok(None);
    }
    read_snapshot(path).map(Some)
}

fn id_labels(ids: &[VariantId]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}
