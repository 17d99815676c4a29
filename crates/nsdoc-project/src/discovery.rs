//! Source file discovery

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use nsdoc_core::SourceFile;
use thiserror::Error;
use tracing::debug;

/// Extensions of Clojure source files
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["clj", "cljc"];

/// Errors raised while scanning source roots
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("invalid source pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to scan sources: {0}")]
    Glob(#[from] glob::GlobError),
}

/// Finds source files beneath source roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDiscovery {
    extensions: Vec<String>,
    exclude: BTreeSet<String>,
}

impl Default for SourceDiscovery {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

impl SourceDiscovery {
    /// Discover files with any of `extensions`
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            exclude: BTreeSet::new(),
        }
    }

    /// Skip files with any of these basenames
    #[must_use]
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// All matching files beneath `root`, sorted by path
    pub fn discover(&self, root: &Path) -> Result<Vec<SourceFile>, DiscoveryError> {
        if !root.is_dir() {
            debug!(root = %root.display(), "source root does not exist");
            return Ok(Vec::new());
        }

        let root = clean_root(root);
        let base = glob::Pattern::escape(&root.to_string_lossy());
        let mut paths = BTreeSet::new();
        for extension in &self.extensions {
            for entry in glob::glob(&format!("{base}/**/*.{extension}"))? {
                let path = entry?;
                if !path.is_file() {
                    continue;
                }
                let excluded = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| self.exclude.contains(n));
                if excluded {
                    debug!(path = %path.display(), "excluded");
                    continue;
                }
                paths.insert(path);
            }
        }

        Ok(paths
            .into_iter()
            .map(|path| SourceFile::new(&root, path))
            .collect())
    }

    /// Files beneath every root, each root's files in order
    pub fn discover_all<P: AsRef<Path>>(
        &self,
        roots: &[P],
    ) -> Result<Vec<SourceFile>, DiscoveryError> {
        let mut files = Vec::new();
        for root in roots {
            files.extend(self.discover(root.as_ref())?);
        }
        Ok(files)
    }
}

/// `root` without `.` components, which glob results never carry
fn clean_root(root: &Path) -> PathBuf {
    let cleaned: PathBuf = root
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn relative(files: &[SourceFile]) -> Vec<String> {
        files.iter().map(SourceFile::relative_path).collect()
    }

    #[test]
    fn test_discover_sorted_by_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "demo/zeta.clj");
        touch(dir.path(), "demo/alpha.cljc");
        touch(dir.path(), "demo/util/io.clj");
        touch(dir.path(), "demo/readme.md");
        touch(dir.path(), "demo/app.cljs");

        let files = SourceDiscovery::default().discover(dir.path()).unwrap();
        assert_eq!(
            relative(&files),
            vec!["demo/alpha.cljc", "demo/util/io.clj", "demo/zeta.clj"]
        );
        assert!(files.iter().all(|f| f.root == dir.path()));
    }

    #[test]
    fn test_discover_excludes_basenames() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "clojure/core.clj");
        touch(dir.path(), "clojure/core_print.clj");
        touch(dir.path(), "clojure/gvec.clj");

        let files = SourceDiscovery::default()
            .exclude(crate::clojure::EXCLUDED_FILES)
            .discover(dir.path())
            .unwrap();
        assert_eq!(relative(&files), vec!["clojure/core.clj"]);
    }

    /// Working directory override, restored on drop
    struct CurrentDir(PathBuf);

    impl CurrentDir {
        fn enter(dir: &Path) -> Self {
            let previous = std::env::current_dir().unwrap();
            std::env::set_current_dir(dir).unwrap();
            Self(previous)
        }
    }

    impl Drop for CurrentDir {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    #[test]
    fn test_relative_root_keeps_root_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/demo/core.clj");
        let _cwd = CurrentDir::enter(dir.path());

        let files = SourceDiscovery::default()
            .discover(&Path::new(".").join("src"))
            .unwrap();
        assert_eq!(relative(&files), vec!["demo/core.clj"]);
        assert_eq!(files[0].root, PathBuf::from("src"));
        assert!(files[0].path.is_file());
    }

    #[test]
    fn test_clean_root() {
        assert_eq!(clean_root(Path::new("./src")), PathBuf::from("src"));
        assert_eq!(clean_root(Path::new(".")), PathBuf::from("."));
        assert_eq!(clean_root(Path::new("/a/./b")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let files = SourceDiscovery::default()
            .discover(&dir.path().join("absent"))
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_all_keeps_root_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b/demo/one.clj");
        touch(dir.path(), "a/demo/two.clj");

        let roots = [dir.path().join("b"), dir.path().join("a")];
        let files = SourceDiscovery::new(["clj"]).discover_all(&roots).unwrap();
        assert_eq!(relative(&files), vec!["demo/one.clj", "demo/two.clj"]);
        assert_eq!(files[0].root, roots[0]);
    }
}
