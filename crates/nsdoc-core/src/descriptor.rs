//! Project-level metadata supplied by the caller

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Identity and metadata of the project being documented
///
/// Only `name`, `group`, `url`, `description`, `version`, `scm` and
/// `license` reach the snapshot; everything else stays with the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDescriptor {
    pub name: Option<String>,
    pub group: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub scm: Option<serde_json::Value>,
    pub license: Option<serde_json::Value>,
    /// Source roots, relative to the project directory
    pub source_paths: Vec<PathBuf>,
    /// Other fields of the build descriptor
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProjectDescriptor {
    /// Create a descriptor with a name and version
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_scm(mut self, scm: serde_json::Value) -> Self {
        self.scm = Some(scm);
        self
    }

    #[must_use]
    pub fn with_license(mut self, license: serde_json::Value) -> Self {
        self.license = Some(license);
        self
    }
}
