//! Namespace resolution errors

use std::path::PathBuf;

use thiserror::Error;

use crate::reader::ReadError;

/// Why a source file contributed nothing to the snapshot
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in '{}': {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("no ns declaration found in '{}'", .0.display())]
    NoDeclaration(PathBuf),

    #[error("ns declaration in '{}' does not name a namespace", .0.display())]
    MalformedDeclaration(PathBuf),

    #[error("'{}' declares {found}, expected {expected}", .path.display())]
    NameMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("could not locate '{resource}' loaded from '{}'", .from.display())]
    LoadNotFound { resource: String, from: PathBuf },
}
