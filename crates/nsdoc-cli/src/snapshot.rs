//! The `project` and `clojure` commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use nsdoc_core::{aggregate, ProjectDescriptor, SnapshotWriter, SourceFile, StaticLoader};
use nsdoc_project::{clojure_descriptor, read_project, Config, EXCLUDED_FILES};

/// Snapshot the Leiningen project in `dir`
pub fn project(dir: &Path, config: &Config, output: Option<PathBuf>) -> Result<PathBuf> {
    let descriptor = read_project(dir)
        .with_context(|| format!("Failed to read project in '{}'", dir.display()))?;
    let roots: Vec<_> = descriptor.source_paths.iter().map(|p| dir.join(p)).collect();
    let files = config
        .discovery()
        .discover_all(&roots)
        .context("Failed to discover source files")?;
    write(&descriptor, &files, config, output)
}

/// Snapshot the Clojure sources under `src_dir` as Clojure `version`
pub fn clojure(
    src_dir: &Path,
    version: &str,
    config: &Config,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let descriptor = clojure_descriptor(version);
    let files = config
        .discovery()
        .exclude(EXCLUDED_FILES)
        .discover(src_dir)
        .context("Failed to discover source files")?;
    write(&descriptor, &files, config, output)
}

fn write(
    descriptor: &ProjectDescriptor,
    files: &[SourceFile],
    config: &Config,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    if files.is_empty() {
        warn!("no source files found");
    }

    let mut loader = StaticLoader::new(config.reader_options());
    let result = aggregate(descriptor, files, &mut loader);

    let writer = config
        .compression
        .map_or_else(SnapshotWriter::default, SnapshotWriter::with_level);
    let dir = output
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let path = writer
        .write(&result.document, &dir)
        .with_context(|| format!("Failed to write snapshot to '{}'", dir.display()))?;

    info!(
        namespaces = result.document.namespaces.len(),
        vars = result.document.symbol_count(),
        failures = result.failures.len(),
        "snapshot complete"
    );
    Ok(path)
}
