//! nsdoc Core - Documentation snapshots for Clojure projects
//!
//! This crate provides the pipeline:
//! - Lexer: Tokenization of Clojure source
//! - Reader: Forms from the token stream
//! - Meta: Raw var metadata and its normalized form
//! - Resolve: Namespace declaration and static loading
//! - Aggregate: Project-wide document assembly
//! - Snapshot: Gzip-compressed JSON output

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lexer module - tokenization of Clojure source
pub mod lexer;

/// Reader module - converts tokens into forms
pub mod reader;

/// Metadata model and normalizer
pub mod meta;

/// Namespace resolver and static loader
pub mod resolve;

/// Project descriptor
pub mod descriptor;

/// Project aggregator
pub mod aggregate;

/// Snapshot writer and decoder
pub mod snapshot;

pub use aggregate::{aggregate, AggregateDocument, Aggregation, ResolveFailure};
pub use descriptor::ProjectDescriptor;
pub use meta::{normalize, MetaValue, SymbolMeta, SymbolRecord};
pub use reader::{Form, ReadError, Reader, ReaderOptions};
pub use resolve::{resolve_source, ModuleLoader, ModuleResult, ResolveError, SourceFile, StaticLoader};
pub use snapshot::{read_snapshot, snapshot_filename, write_snapshot, SnapshotError, SnapshotWriter};
