//! Gzip-compressed JSON snapshots
//!
//! A snapshot is the [`AggregateDocument`] of one project serialized as JSON
//! straight into a gzip stream, named `<name>-<version>.json.gz`. The file is
//! overwritten if it already exists.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;
use tracing::{debug, info};

use crate::aggregate::AggregateDocument;

/// Errors raised while writing or reading a snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SnapshotError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File name of the snapshot of `document`; missing fields become empty text
pub fn snapshot_filename(document: &AggregateDocument) -> String {
    format!(
        "{}-{}.json.gz",
        document.name.as_deref().unwrap_or_default(),
        document.version.as_deref().unwrap_or_default()
    )
}

/// Writes snapshots at a fixed compression level
#[derive(Debug, Clone, Copy)]
pub struct SnapshotWriter {
    compression: Compression,
}

impl Default for SnapshotWriter {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
        }
    }
}

impl SnapshotWriter {
    /// Create a writer using gzip level `level` (0-9)
    #[must_use]
    pub fn with_level(level: u32) -> Self {
        Self {
            compression: Compression::new(level),
        }
    }

    /// Write `document` into `dir` and return the path of the artifact
    pub fn write(&self, document: &AggregateDocument, dir: &Path) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(dir).map_err(|e| SnapshotError::io(dir, e))?;
        let filename = snapshot_filename(document);
        let path = dir.join(&filename);
        debug!(path = %path.display(), level = self.compression.level(), "writing snapshot");

        let file = File::create(&path).map_err(|e| SnapshotError::io(&path, e))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), self.compression);
        serde_json::to_writer(&mut encoder, document).map_err(|e| SnapshotError::json(&path, e))?;
        let mut buffer = encoder.finish().map_err(|e| SnapshotError::io(&path, e))?;
        buffer.flush().map_err(|e| SnapshotError::io(&path, e))?;

        info!("wrote {filename}");
        Ok(path)
    }
}

/// Write `document` into `dir` at the default compression level
pub fn write_snapshot(document: &AggregateDocument, dir: &Path) -> Result<PathBuf, SnapshotError> {
    SnapshotWriter::default().write(document, dir)
}

/// Decode a snapshot written by [`write_snapshot`]
pub fn read_snapshot(path: &Path) -> Result<AggregateDocument, SnapshotError> {
    let file = File::open(path).map_err(|e| SnapshotError::io(path, e))?;
    let decoder = GzDecoder::new(BufReader::new(file));
    serde_json::from_reader(decoder).map_err(|e| SnapshotError::json(path, e))
}
