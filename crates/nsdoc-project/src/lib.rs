//! Project inputs for nsdoc
//!
//! Everything the snapshot pipeline needs from outside the source files:
//! - [`leiningen`]: descriptors read from `project.clj`
//! - [`clojure`]: the descriptor of Clojure itself
//! - [`discovery`]: source files under the project's source roots
//! - [`config`]: `nsdoc.toml` settings

pub mod clojure;
pub mod config;
pub mod discovery;
pub mod leiningen;

pub use clojure::{clojure_descriptor, EXCLUDED_FILES};
pub use config::{Config, ConfigError, CONFIG_FILE};
pub use discovery::{DiscoveryError, SourceDiscovery, DEFAULT_EXTENSIONS};
pub use leiningen::{read_project, read_project_file, ProjectError, PROJECT_FILE};
