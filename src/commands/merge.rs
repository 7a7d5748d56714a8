use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use variants::format::OutputFormat;
use variants_core::{
    ContentSnapshot, UNTITLED, ValueMergerRegistry, VariantCoordinates, VariantId, merge_for_save,
};

use super::{read_persisted, read_snapshot};

pub struct MergeArgs<'a> {
    pub persisted: &'a Path,
    pub current: &'a Path,
    pub select: &'a [VariantId],
    pub store: &'a [VariantId],
    pub varies: bool,
    pub output: Option<&'a Path>,
}

pub fn run(args: &MergeArgs<'_>, format: OutputFormat) -> Result<()> {
    let persisted = read_persisted(args.persisted)?;
    let current = read_snapshot(args.current)?;
    let merged = merge_for_save(
        persisted.as_ref(),
        &current,
        args.select,
        args.store,
        args.varies,
        &ValueMergerRegistry::new(),
    )
    .context("Failed to build save data")?;

    if let Some(path) = args.output {
        let json = OutputFormat::Json.serialize(&merged)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote merged snapshot");
        if format == OutputFormat::Text {
            print!("{}", summary(&merged));
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", format.serialize(&merged)?),
        OutputFormat::Text => print!("{}", summary(&merged)),
    }
    Ok(())
}

/// One line per variant, then the number of property values.
fn summary(merged: &ContentSnapshot) -> String {
    let mut out = String::new();
    for variant in &merged.variants {
        let _ = writeln!(
            out,
            "{}\t{}\t{:?}",
            variant.variant_id(),
            variant.name.as_deref().unwrap_or(UNTITLED),
            variant.state
        );
    }
    let _ = writeln!(out, "{} property values", merged.values.len());
    out
}
