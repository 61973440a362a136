//! Run configuration for doccheck.
//!
//! Configuration is optional: with no config file every gate defaults to on.
//! A `doccheck.yaml` can relax the three configurable rule gates and exclude
//! paths from discovery.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["doccheck.yaml", ".doccheck.yaml"];

/// Errors raised while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
}

/// The rule gates. Supplied once per run and immutable for its duration.
///
/// Type and member documentation is always checked; only these three kinds
/// are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlDocOptions {
    /// Check enum members for documentation.
    pub check_enum_members: bool,
    /// Require a `<summary>` on documented fields.
    pub require_summary_for_fields: bool,
    /// Require documentation on namespace declarations.
    pub require_documentation_for_namespaces: bool,
}

impl Default for XmlDocOptions {
    fn default() -> Self {
        Self {
            check_enum_members: true,
            require_summary_for_fields: true,
            require_documentation_for_namespaces: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,
    /// Rule gates.
    pub options: XmlDocOptions,
    /// Glob patterns for paths to exclude from analysis
    /// (e.g. "**/Generated/**").
    pub excluded_paths: Vec<String>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path_str,
            source,
        })
    }

    /// Check if a path matches one of the `excluded_paths` patterns.
    /// Uses globset, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

/// Discover a config file in the current directory.
pub fn discover_config() -> Option<PathBuf> {
    for name in DEFAULT_CONFIG_NAMES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_all_on() {
        let options = XmlDocOptions::default();
        assert!(options.check_enum_members);
        assert!(options.require_summary_for_fields);
        assert!(options.require_documentation_for_namespaces);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str(
            r#"
options:
  check_enum_members: false
"#,
        )
        .unwrap();
        assert!(!config.options.check_enum_members);
        assert!(config.options.require_summary_for_fields);
        assert!(config.options.require_documentation_for_namespaces);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.options, XmlDocOptions::default());
        assert!(config.excluded_paths.is_empty());
    }

    #[test]
    fn test_excluded_paths() {
        let config = Config {
            excluded_paths: vec!["**/Generated/**".to_string()],
            ..Config::default()
        };
        assert!(config.is_path_excluded(Path::new("src/Generated/Api.cs")));
        assert!(!config.is_path_excluded(Path::new("src/Api.cs")));
    }

    #[test]
    fn test_parse_file_missing() {
        let err = Config::parse_file("/nonexistent/doccheck.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
