//! Collection configuration: template root, file patterns and reload mode.
//!
//! Usually constructed in code, but can also be read from a TOML file:
//!
//! ```toml
//! root = "~/site/templates"
//! patterns = ["*.html", "*.css"]
//! dynamic = true
//! case-filters = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

fn default_patterns() -> Vec<String> {
    vec!["*.html".to_string()]
}

/// Settings for building a [`Collection`](crate::Collection).
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct CollectionConfig {
    /// Directory searched recursively for template files.
    #[serde(deserialize_with = "deserialize_root")]
    pub root: PathBuf,

    /// Glob patterns matched against each file's base name. Default: `["*.html"]`.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,

    /// Check files for changes on every lookup and reload when stale.
    #[serde(default)]
    pub dynamic: bool,

    /// Descend into symlinked directories while traversing `root`.
    ///
    /// Symlinks to regular files are always candidates regardless of this
    /// setting.
    #[serde(default)]
    pub follow_links: bool,

    /// Register the `snake_case`, `pascal_case`, `camel_case` and `kebab_case`
    /// filters on every built set. Default: `true`.
    #[serde(default = "default_case_filters")]
    pub case_filters: bool,
}

fn default_case_filters() -> bool {
    true
}

impl CollectionConfig {
    /// Static-mode configuration for `root` with the given patterns.
    pub fn new<P, I, S>(root: P, patterns: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: root.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            dynamic: false,
            follow_links: false,
            case_filters: true,
        }
    }

    pub fn with_dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn with_case_filters(mut self, case_filters: bool) -> Self {
        self.case_filters = case_filters;
        self
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(?path, root = %config.root.display(), "Loaded template collection config");
        Ok(config)
    }
}

fn deserialize_root<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(expand_path(&raw))
}

/// Resolve a leading `~` in a configured template root against the user's
/// home directory. Left untouched when no home directory is known.
pub(crate) fn expand_path(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) => match rest.strip_prefix('/') {
            Some(rest) => rest,
            None => return PathBuf::from(path),
        },
        None => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
