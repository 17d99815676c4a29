//! Project-wide aggregation of namespace records

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::descriptor::ProjectDescriptor;
use crate::meta::SymbolRecord;
use crate::resolve::{resolve_source, ModuleLoader, ResolveError, SourceFile};

/// The complete documentation snapshot of one project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<serde_json::Value>,
    /// Records of every resolved namespace, by namespace name
    #[serde(default)]
    pub namespaces: BTreeMap<String, Vec<SymbolRecord>>,
}

impl AggregateDocument {
    /// A document carrying the serializable subset of `descriptor` and no namespaces
    pub fn from_descriptor(descriptor: &ProjectDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            url: descriptor.url.clone(),
            description: descriptor.description.clone(),
            version: descriptor.version.clone(),
            group: descriptor.group.clone(),
            scm: descriptor.scm.clone(),
            license: descriptor.license.clone(),
            namespaces: BTreeMap::new(),
        }
    }

    /// Total number of records across all namespaces
    pub fn symbol_count(&self) -> usize {
        self.namespaces.values().map(Vec::len).sum()
    }
}

/// A source file that contributed nothing
#[derive(Debug)]
pub struct ResolveFailure {
    pub file: PathBuf,
    pub error: ResolveError,
}

/// Outcome of aggregating a project
#[derive(Debug)]
pub struct Aggregation {
    pub document: AggregateDocument,
    /// Files that failed to resolve, in processing order
    pub failures: Vec<ResolveFailure>,
}

/// Resolve every source file and merge the results into one document.
///
/// Files are processed in order. A namespace resolved again by a later file
/// replaces the earlier records entirely. Files that fail to resolve are
/// logged and reported in [`Aggregation::failures`]; they never stop the run.
pub fn aggregate<L>(
    descriptor: &ProjectDescriptor,
    sources: &[SourceFile],
    loader: &mut L,
) -> Aggregation
where
    L: ModuleLoader + ?Sized,
{
    let mut document = AggregateDocument::from_descriptor(descriptor);
    let mut failures = Vec::new();

    for source in sources {
        match resolve_source(loader, source) {
            Ok(module) => {
                document.namespaces.insert(module.name, module.symbols);
            }
            Err(error) => {
                warn!("unable to resolve {source}: {error}");
                failures.push(ResolveFailure {
                    file: source.path.clone(),
                    error,
                });
            }
        }
    }

    Aggregation { document, failures }
}
