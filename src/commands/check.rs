use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use variants::format::OutputFormat;
use variants_core::{VariantId, validate_save_data};

use super::{id_labels, read_snapshot};

#[derive(Debug, Serialize)]
struct CheckReport {
    ok: bool,
    selected: Vec<String>,
}

pub fn run(
    snapshot: &Path,
    selected: &[VariantId],
    varies_by_culture: bool,
    format: OutputFormat,
) -> Result<()> {
    let data = read_snapshot(snapshot)?;
    validate_save_data(&data, selected, varies_by_culture)
        .with_context(|| format!("{} cannot be saved", snapshot.display()))?;

    match format {
        OutputFormat::Json => {
            let report = CheckReport {
                ok: true,
                selected: id_labels(selected),
            };
            println!("{}", format.serialize(&report)?);
        }
        OutputFormat::Text => println!("ok: {}", id_labels(selected).join(", ")),
    }
    Ok(())
}
