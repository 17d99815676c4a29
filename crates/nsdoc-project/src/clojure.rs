//! The descriptor of Clojure itself
//!
//! Documenting the Clojure sources needs no `project.clj`: the descriptor is
//! fixed apart from the version. Several files of `clojure.core` start with
//! `in-ns` rather than `ns`, so they declare no namespace of their own. They
//! are skipped during discovery; their vars still arrive through the `load`
//! forms of `clojure/core.clj`.

use nsdoc_core::ProjectDescriptor;
use serde_json::json;

/// Basenames of files that only extend `clojure.core`
pub const EXCLUDED_FILES: [&str; 7] = [
    "core_deftype.clj",
    "core_print.clj",
    "core_proxy.clj",
    "genclass.clj",
    "gvec.clj",
    "uuid.clj",
    "core_instant18.clj",
];

/// Descriptor for Clojure at `version`
pub fn clojure_descriptor(version: impl Into<String>) -> ProjectDescriptor {
    ProjectDescriptor::new("clojure", version)
        .with_group("org.clojure")
        .with_url("http://clojure.org")
        .with_description("Clojure core environment and runtime library.")
        .with_scm(json!({
            "name": "git",
            "url": "https://github.com/clojure/clojure",
        }))
        .with_license(json!({
            "name": "Eclipse Public License 1.0",
            "url": "http://opensource.org/licenses/eclipse-1.0.php",
        }))
}
