use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use variants::format::OutputFormat;
use variants_core::VariantContext;

use super::read_snapshot;

#[derive(Debug, Serialize)]
struct NameReport<'a> {
    name: &'a str,
    culture: Option<&'a str>,
    fallback: Option<&'a str>,
}

pub fn run(
    snapshot: &Path,
    culture: Option<&str>,
    fallback: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let snapshot = read_snapshot(snapshot)?;
    let name = VariantContext::new(culture, fallback).resolve(snapshot.variants.as_slice());

    match format {
        OutputFormat::Json => {
            let report = NameReport {
                name: &name,
                culture,
                fallback,
            };
            println!("{}", format.serialize(&report)?);
        }
        OutputFormat::Text => println!("{name}"),
    }
    Ok(())
}
