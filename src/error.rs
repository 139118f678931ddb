//! # Template Collection Error Types
//!
//! Every failure surfaced by the loader or the collection, carrying enough
//! context (root, patterns, template name, file path) to diagnose without
//! inspecting internals.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Template collection result type
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors produced while building, checking or rendering a template collection.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("invalid template pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("failed to traverse root={} while searching for template files: {source}", .root.display())]
    Traversal {
        root: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to read template file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse template {name:?} under {}: {source}", .root.display())]
    Compile {
        root: PathBuf,
        name: String,
        source: tera::Error,
    },

    #[error("failed to link templates under {} with patterns {patterns:?}: {source}", .root.display())]
    Link {
        root: PathBuf,
        patterns: Vec<String>,
        source: tera::Error,
    },

    #[error("zero templates found under {} with patterns {patterns:?}", .root.display())]
    Empty { root: PathBuf, patterns: Vec<String> },

    #[error("template {name:?} not found in collection in root={}, patterns={patterns:?}", .root.display())]
    NotFound {
        name: String,
        root: PathBuf,
        patterns: Vec<String>,
    },

    #[error("after reload, template {name:?} no longer found in collection in root={}, patterns={patterns:?}", .root.display())]
    RemovedOnReload {
        name: String,
        root: PathBuf,
        patterns: Vec<String>,
    },

    #[error("get({name:?}): failed to get file info for template {template:?}, path {}: {source}", .path.display())]
    Stat {
        name: String,
        template: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("reload triggered by template {name:?} failed: {source}")]
    Reload {
        name: String,
        source: Box<TemplateError>,
    },

    #[error("failed to render template {name:?}: {source}")]
    Render { name: String, source: tera::Error },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TemplateError {
    /// True for both "never existed" and "removed during reload" lookups.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::RemovedOnReload { .. })
    }

    /// The template name a lookup or render error refers to, if any.
    pub fn template_name(&self) -> Option<&str> {
        match self {
            Self::Compile { name, .. }
            | Self::NotFound { name, .. }
            | Self::RemovedOnReload { name, .. }
            | Self::Stat { name, .. }
            | Self::Reload { name, .. }
            | Self::Render { name, .. } => Some(name),
            _ => None,
        }
    }
}
