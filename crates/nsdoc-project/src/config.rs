//! `nsdoc.toml` configuration
//!
//! Every key is optional. Command-line flags take precedence over the file.

use std::fs;
use std::path::{Path, PathBuf};

use nsdoc_core::reader::{ReaderOptions, DEFAULT_FEATURE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::discovery::{SourceDiscovery, DEFAULT_EXTENSIONS};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "nsdoc.toml";

/// Highest gzip compression level
const MAX_COMPRESSION: u32 = 9;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("compression level {0} is out of range 0-9")]
    InvalidCompression(u32),
}

/// Settings for a snapshot run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Directory the snapshot is written to
    pub output_dir: Option<PathBuf>,
    /// Source file extensions to discover
    pub extensions: Vec<String>,
    /// Additional file basenames to skip
    pub exclude: Vec<String>,
    /// Gzip level, 0-9
    pub compression: Option<u32>,
    /// Reader conditional features, in order of preference
    pub features: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            exclude: Vec::new(),
            compression: None,
            features: vec![DEFAULT_FEATURE.to_string()],
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `nsdoc.toml` from `dir`, or the defaults when there is none
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.compression {
            Some(level) if level > MAX_COMPRESSION => Err(ConfigError::InvalidCompression(level)),
            _ => Ok(()),
        }
    }

    /// Reader options for the configured features
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            features: self.features.clone(),
        }
    }

    /// Discovery for the configured extensions and exclusions
    pub fn discovery(&self) -> SourceDiscovery {
        SourceDiscovery::new(self.extensions.iter().cloned()).exclude(self.exclude.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Config {
        let config: Config = toml::from_str(text).unwrap();
        config.validate().unwrap();
        config
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = parse("");
        assert_eq!(config, Config::default());
        assert_eq!(config.extensions, vec!["clj", "cljc"]);
        assert_eq!(config.reader_options().features, vec!["clj"]);
    }

    #[test]
    fn test_all_keys() {
        let config = parse(
            r#"
output-dir = "target/doc"
extensions = ["clj"]
exclude = ["user.clj"]
compression = 9
features = ["cljs", "clj"]
"#,
        );
        assert_eq!(config.output_dir, Some(PathBuf::from("target/doc")));
        assert_eq!(config.extensions, vec!["clj"]);
        assert_eq!(config.exclude, vec!["user.clj"]);
        assert_eq!(config.compression, Some(9));
        assert_eq!(config.features, vec!["cljs", "clj"]);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "output = \"x\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_compression_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "compression = 12\n").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::InvalidCompression(12))
        ));
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_or_default(dir.path()).unwrap(), Config::default());

        fs::write(dir.path().join(CONFIG_FILE), "exclude = [\"dev.clj\"]\n").unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.exclude, vec!["dev.clj"]);
        assert_eq!(config.extensions, vec!["clj", "cljc"]);
    }
}
