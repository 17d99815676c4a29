//! Leiningen `project.clj` descriptors

use std::fs;
use std::path::{Path, PathBuf};

use nsdoc_core::reader::{Form, ReadError, Reader, ReaderOptions};
use nsdoc_core::{MetaValue, ProjectDescriptor};
use thiserror::Error;
use tracing::debug;

/// Name of the Leiningen build descriptor
pub const PROJECT_FILE: &str = "project.clj";

/// Source root used when the project names none
const DEFAULT_SOURCE_PATH: &str = "src";

/// Errors that can occur when reading a project descriptor.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("no defproject form in '{}'", .0.display())]
    NotDefproject(PathBuf),
}

/// Read `project.clj` in `dir`
pub fn read_project(dir: &Path) -> Result<ProjectDescriptor, ProjectError> {
    read_project_file(&dir.join(PROJECT_FILE))
}

/// Read the first `defproject` form of a descriptor file
pub fn read_project_file(path: &Path) -> Result<ProjectDescriptor, ProjectError> {
    let text = fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let forms = Reader::read_all(&text, ReaderOptions::default()).map_err(|source| {
        ProjectError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    forms
        .iter()
        .find_map(parse_defproject)
        .ok_or_else(|| ProjectError::NotDefproject(path.to_path_buf()))
}

/// Interpret `(defproject group/name "version" & options)`
fn parse_defproject(form: &Form) -> Option<ProjectDescriptor> {
    if !form.is_call_to("defproject") {
        return None;
    }
    let items = form.as_list()?;
    let (group, name) = match items.get(1)?.as_symbol()? {
        qualified if qualified.contains('/') => qualified.split_once('/')?,
        name => (name, name),
    };

    let mut descriptor = ProjectDescriptor {
        name: Some(name.to_string()),
        group: Some(group.to_string()),
        version: items.get(2).map(|v| MetaValue::from_form(v).to_text()),
        ..ProjectDescriptor::default()
    };

    let options = items.get(3..).unwrap_or_default();
    let mut licenses = None;
    let mut source_path = None;
    for pair in options.chunks(2) {
        let [key, value] = pair else {
            debug!("ignoring trailing defproject option");
            continue;
        };
        let Some(key) = key.as_keyword() else {
            continue;
        };
        match key {
            "description" => descriptor.description = value.as_str().map(str::to_string),
            "url" => descriptor.url = value.as_str().map(str::to_string),
            "license" => descriptor.license = json_value(key, value),
            "licenses" => licenses = json_value(key, value),
            "scm" => descriptor.scm = json_value(key, value),
            "source-paths" => descriptor.source_paths = paths(value),
            "source-path" => source_path = value.as_str().map(PathBuf::from),
            _ => {
                if let Some(value) = json_value(key, value) {
                    descriptor.extra.insert(key.to_string(), value);
                }
            }
        }
    }

    if descriptor.license.is_none() {
        descriptor.license = licenses.and_then(|l| match l {
            serde_json::Value::Array(mut all) if !all.is_empty() => Some(all.swap_remove(0)),
            _ => None,
        });
    }
    if descriptor.source_paths.is_empty() {
        descriptor.source_paths =
            vec![source_path.unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_PATH))];
    }
    Some(descriptor)
}

fn json_value(key: &str, value: &Form) -> Option<serde_json::Value> {
    match serde_json::to_value(MetaValue::from_form(value)) {
        Ok(json) => Some(json),
        Err(e) => {
            debug!("skipping defproject option {key}: {e}");
            None
        }
    }
}

fn paths(value: &Form) -> Vec<PathBuf> {
    value
        .as_vector()
        .unwrap_or_default()
        .iter()
        .filter_map(Form::as_str)
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_project(text: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_FILE), text).unwrap();
        dir
    }

    #[test]
    fn test_read_full_descriptor() {
        let dir = write_project(
            r#"(defproject org.demo/demo "0.1.0"
  :description "A demo."
  :url "https://example.com/demo"
  :license {:name "EPL-1.0" :url "https://www.eclipse.org/legal/epl-v10.html"}
  :scm {:name "git" :url "https://example.com/demo.git"}
  :source-paths ["src/clj" "src/cljc"]
  :dependencies [[org.clojure/clojure "1.11.1"]])
"#,
        );

        let descriptor = read_project(dir.path()).unwrap();
        assert_eq!(descriptor.name.as_deref(), Some("demo"));
        assert_eq!(descriptor.group.as_deref(), Some("org.demo"));
        assert_eq!(descriptor.version.as_deref(), Some("0.1.0"));
        assert_eq!(descriptor.description.as_deref(), Some("A demo."));
        assert_eq!(descriptor.url.as_deref(), Some("https://example.com/demo"));
        assert_eq!(
            descriptor.license,
            Some(json!({"name": "EPL-1.0", "url": "https://www.eclipse.org/legal/epl-v10.html"}))
        );
        assert_eq!(descriptor.scm.unwrap()["name"], "git");
        assert_eq!(
            descriptor.source_paths,
            vec![PathBuf::from("src/clj"), PathBuf::from("src/cljc")]
        );
        assert_eq!(
            descriptor.extra["dependencies"],
            json!([["org.clojure/clojure", "1.11.1"]])
        );
    }

    #[test]
    fn test_unqualified_name_is_its_own_group() {
        let dir = write_project("(defproject demo \"1.0.0\")");
        let descriptor = read_project(dir.path()).unwrap();
        assert_eq!(descriptor.name.as_deref(), Some("demo"));
        assert_eq!(descriptor.group.as_deref(), Some("demo"));
        assert_eq!(descriptor.source_paths, vec![PathBuf::from("src")]);
        assert!(descriptor.license.is_none());
    }

    #[test]
    fn test_legacy_source_path_and_licenses() {
        let dir = write_project(
            r#"(defproject demo "1.0.0"
  :source-path "lib"
  :licenses [{:name "MIT"} {:name "EPL-1.0"}])"#,
        );
        let descriptor = read_project(dir.path()).unwrap();
        assert_eq!(descriptor.source_paths, vec![PathBuf::from("lib")]);
        assert_eq!(descriptor.license, Some(json!({"name": "MIT"})));
    }

    #[test]
    fn test_leading_forms_are_skipped() {
        let dir = write_project(
            "(def version \"2.0.0\")\n(defproject demo \"1.0.0\" :url \"https://example.com\")",
        );
        let descriptor = read_project(dir.path()).unwrap();
        assert_eq!(descriptor.url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_missing_defproject() {
        let dir = write_project("(ns not.a.project)");
        let err = read_project(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotDefproject(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_project(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::Io { .. }));
    }

    #[test]
    fn test_unbalanced_descriptor() {
        let dir = write_project("(defproject demo \"1.0.0\"");
        let err = read_project(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::Read { .. }));
    }
}
