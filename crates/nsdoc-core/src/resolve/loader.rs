//! Static namespace loader
//!
//! Loads a namespace by reading its source and interpreting the top-level
//! definition forms, without evaluating any code. Loaded namespaces are kept
//! in a registry owned by the loader, so separate loaders never share state.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::defs::{self, DefContext};
use super::{relative_to, LoadedNamespace, ModuleLoader, ResolveError, SourceFile};
use crate::lexer::LineIndex;
use crate::reader::{Form, FormKind, Reader, ReaderOptions};

/// Extensions tried when resolving a `(load "...")` resource
const LOAD_EXTENSIONS: [&str; 2] = ["clj", "cljc"];

/// Loads namespaces from source without evaluating them
#[derive(Debug, Default)]
pub struct StaticLoader {
    options: ReaderOptions,
    registry: BTreeMap<String, LoadedNamespace>,
}

impl StaticLoader {
    /// Create a loader reading sources with the given options
    #[must_use]
    pub fn new(options: ReaderOptions) -> Self {
        Self {
            options,
            registry: BTreeMap::new(),
        }
    }

    /// A namespace loaded earlier by this loader
    pub fn namespace(&self, name: &str) -> Option<&LoadedNamespace> {
        self.registry.get(name)
    }

    /// Interpret one file into `namespace`, following its `load` forms
    fn load_file(
        &self,
        path: &Path,
        root: &Path,
        expected: Option<&str>,
        namespace: &mut LoadedNamespace,
        visited: &mut BTreeSet<PathBuf>,
    ) -> Result<(), ResolveError> {
        if !visited.insert(path.to_path_buf()) {
            return Ok(());
        }
        trace!(path = %path.display(), namespace = %namespace.name, "reading");

        let text = read_source(path)?;
        let forms = Reader::read_all(&text, self.options.clone()).map_err(|source| {
            ResolveError::Syntax {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if expected.is_none() {
            if let Some(other) = switched_namespace(&forms).filter(|n| *n != namespace.name) {
                debug!(path = %path.display(), namespace = other, "skipping file of another namespace");
                return Ok(());
            }
        }
        let line_index = LineIndex::new(&text);
        let file = relative_to(root, path);
        let ns = namespace.name.clone();
        let cx = DefContext {
            ns: &ns,
            file: &file,
            source: &text,
            line_index: &line_index,
        };

        for form in &forms {
            if form.is_call_to("ns") {
                if let Some(expected) = expected {
                    let found = declared_name(form).unwrap_or_default();
                    if found != expected {
                        return Err(ResolveError::NameMismatch {
                            path: path.to_path_buf(),
                            expected: expected.to_string(),
                            found: found.to_string(),
                        });
                    }
                }
                continue;
            }
            if form.is_call_to("load") || form.is_call_to("clojure.core/load") {
                let args = form.as_list().into_iter().flatten().skip(1);
                let resources = args.filter_map(Form::as_str);
                for resource in resources {
                    let target = resolve_load(path, root, resource)?;
                    debug!(resource, namespace = %ns, "following load");
                    self.load_file(&target, root, None, namespace, visited)?;
                }
                continue;
            }
            for (name, meta) in defs::interpret(form, &cx) {
                namespace.intern(name, meta);
            }
        }
        Ok(())
    }
}

impl ModuleLoader for StaticLoader {
    fn declared_name(&mut self, source: &SourceFile) -> Result<String, ResolveError> {
        let text = read_source(&source.path)?;
        for form in Reader::new(&text, self.options.clone()) {
            let form = form.map_err(|e| ResolveError::Syntax {
                path: source.path.clone(),
                source: e,
            })?;
            if form.is_call_to("ns") {
                return declared_name(&form)
                    .map(str::to_string)
                    .ok_or_else(|| ResolveError::MalformedDeclaration(source.path.clone()));
            }
        }
        Err(ResolveError::NoDeclaration(source.path.clone()))
    }

    fn load(&mut self, source: &SourceFile, name: &str) -> Result<&LoadedNamespace, ResolveError> {
        let mut namespace = LoadedNamespace::new(name);
        let mut visited = BTreeSet::new();
        self.load_file(
            &source.path,
            &source.root,
            Some(name),
            &mut namespace,
            &mut visited,
        )?;
        if self.registry.contains_key(name) {
            debug!(namespace = name, "reloading");
        }
        self.registry.insert(name.to_string(), namespace);
        Ok(&self.registry[name])
    }
}

/// The namespace symbol of an `(ns ...)` form
fn declared_name(form: &Form) -> Option<&str> {
    form.as_list()?.get(1)?.as_symbol()
}

/// The namespace named by the first `ns` or `in-ns` form
fn switched_namespace(forms: &[Form]) -> Option<&str> {
    let form = forms
        .iter()
        .find(|f| f.is_call_to("ns") || f.is_call_to("in-ns"))?;
    let target = form.as_list()?.get(1)?;
    match &target.kind {
        FormKind::Quote(inner) => inner.as_symbol(),
        _ => target.as_symbol(),
    }
}

fn read_source(path: &Path) -> Result<String, ResolveError> {
    std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve a `load` resource: absolute ones against the source root, relative
/// ones against the directory of the loading file
fn resolve_load(current: &Path, root: &Path, resource: &str) -> Result<PathBuf, ResolveError> {
    let base = match resource.strip_prefix('/') {
        Some(absolute) => root.join(absolute),
        None => current.parent().unwrap_or(root).join(resource),
    };
    LOAD_EXTENSIONS
        .iter()
        .map(|ext| {
            let mut candidate = OsString::from(base.as_os_str());
            candidate.push(".");
            candidate.push(ext);
            PathBuf::from(candidate)
        })
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ResolveError::LoadNotFound {
            resource: resource.to_string(),
            from: current.to_path_buf(),
        })
}
