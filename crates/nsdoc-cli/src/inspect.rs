//! The `inspect` command

use anyhow::{Context, Result};
use std::fmt::{self, Write};
use std::path::Path;

use nsdoc_core::{read_snapshot, AggregateDocument};

/// Per-namespace summary of the snapshot at `path`
pub fn summary(path: &Path) -> Result<String> {
    let document = read_snapshot(path)
        .with_context(|| format!("Failed to read snapshot '{}'", path.display()))?;
    Ok(render(&document)?)
}

fn render(document: &AggregateDocument) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "{} {}",
        document.name.as_deref().unwrap_or("<unnamed>"),
        document.version.as_deref().unwrap_or("<unversioned>")
    )?;
    if let Some(description) = &document.description {
        writeln!(out, "{description}")?;
    }
    writeln!(
        out,
        "{} namespaces, {} vars",
        document.namespaces.len(),
        document.symbol_count()
    )?;
    for (name, records) in &document.namespaces {
        let documented = records.iter().filter(|r| r.doc().is_some()).count();
        writeln!(out, "  {name}: {} vars, {documented} documented", records.len())?;
    }
    Ok(out)
}
