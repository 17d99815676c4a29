//! Namespace resolution
//!
//! A [`ModuleLoader`] reads the declared namespace of a source file and
//! materializes it into a [`LoadedNamespace`] whose public vars can be
//! inspected. [`resolve_source`] runs both steps for one file and normalizes
//! the metadata of every public var.

mod defs;
mod error;
mod loader;

pub use error::ResolveError;
pub use loader::StaticLoader;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::meta::{normalize, MetaValue, SymbolMeta, SymbolRecord};

/// A source file presumed to declare one namespace
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceFile {
    /// Path of the file
    pub path: PathBuf,
    /// Source root the file was found under
    pub root: PathBuf,
}

impl SourceFile {
    /// Create a reference to `path` found under `root`
    pub fn new(root: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: root.into(),
        }
    }

    /// Path relative to the source root with `/` separators, as recorded in
    /// the `file` field of var metadata
    pub fn relative_path(&self) -> String {
        relative_to(&self.root, &self.path)
    }

    /// File name of the source
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

pub(crate) fn relative_to(root: &Path, path: &Path) -> String {
    let root = without_cur_dir(root);
    let path = without_cur_dir(path);
    let relative = path.strip_prefix(&root).unwrap_or(&path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `path` with its `.` components removed
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// A namespace materialized for inspection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedNamespace {
    /// Namespace name
    pub name: String,
    /// Every var the namespace defines, public or not, by name
    pub vars: BTreeMap<String, SymbolMeta>,
}

impl LoadedNamespace {
    /// Create an empty namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: BTreeMap::new(),
        }
    }

    /// Define or redefine a var
    pub fn intern(&mut self, name: impl Into<String>, meta: SymbolMeta) {
        self.vars.insert(name.into(), meta);
    }

    /// Raw metadata of every public var, sorted by name
    pub fn publics(&self) -> impl Iterator<Item = &SymbolMeta> {
        self.vars.values().filter(|meta| is_public(meta))
    }
}

fn is_public(meta: &SymbolMeta) -> bool {
    !matches!(meta.get("private"), Some(MetaValue::Bool(true)))
}

/// Materializes namespaces from source files
pub trait ModuleLoader {
    /// Read the namespace name declared by `source`
    fn declared_name(&mut self, source: &SourceFile) -> Result<String, ResolveError>;

    /// Load namespace `name` from `source` so its vars can be inspected
    fn load(&mut self, source: &SourceFile, name: &str) -> Result<&LoadedNamespace, ResolveError>;
}

/// The normalized records of one namespace
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleResult {
    /// Namespace name
    pub name: String,
    /// One record per public var
    pub symbols: Vec<SymbolRecord>,
}

/// Resolve one source file into the records of the namespace it declares
pub fn resolve_source<L>(loader: &mut L, source: &SourceFile) -> Result<ModuleResult, ResolveError>
where
    L: ModuleLoader + ?Sized,
{
    let name = match loader.declared_name(source) {
        Ok(name) => name,
        Err(e) => {
            info!("loading {source}");
            return Err(e);
        }
    };
    info!("loading {name}");

    let namespace = loader.load(source, &name)?;
    let symbols: Vec<_> = namespace.publics().map(normalize).collect();
    debug!(namespace = %name, vars = symbols.len(), "resolved");
    Ok(ModuleResult { name, symbols })
}
