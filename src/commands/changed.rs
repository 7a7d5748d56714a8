use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use variants::format::OutputFormat;
use variants_core::detect_changed;

use super::{id_labels, read_persisted, read_snapshot};

#[derive(Debug, Serialize)]
struct ChangedReport {
    changed: Vec<String>,
}

pub fn run(persisted: &Path, current: &Path, format: OutputFormat) -> Result<()> {
    let persisted = read_persisted(persisted)?;
    let current = read_snapshot(current)?;
    let changed = detect_changed(persisted.as_ref(), &current)?;

    let report = ChangedReport {
        changed: id_labels(&changed),
    };
    match format {
        OutputFormat::Json => println!("{}", format.serialize(&report)?),
        OutputFormat::Text => {
            for id in &report.changed {
                println!("{id}");
            }
        }
    }
    Ok(())
}
