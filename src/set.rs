//! Compiled template sets and the handles returned to callers.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tera::{Context, Tera};

use crate::error::{TemplateError, TemplateResult};

/// Source path and modification time of every file compiled into a
/// [`TemplateSet`], keyed by root-relative template name.
///
/// The path is the one the loader actually read, so staleness checks stat the
/// same file even when the template name had to be lossily converted to UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    files: BTreeMap<String, TrackedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedFile {
    path: PathBuf,
    modified: SystemTime,
}

impl Snapshot {
    pub(crate) fn insert(&mut self, name: String, path: PathBuf, modified: SystemTime) {
        self.files.insert(name, TrackedFile { path, modified });
    }

    pub fn get(&self, name: &str) -> Option<SystemTime> {
        self.files.get(name).map(|file| file.modified)
    }

    /// Path the named template was read from.
    pub fn path(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(|file| file.path.as_path())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SystemTime)> {
        self.files.iter().map(|(name, file)| (name.as_str(), file.modified))
    }

    /// Stat every tracked file and return the first one modified strictly
    /// after it was read.
    ///
    /// `requested` is the template whose lookup triggered the scan; it is only
    /// used to annotate a stat failure.
    pub fn first_stale(&self, requested: &str) -> TemplateResult<Option<&str>> {
        for (name, file) in &self.files {
            let modified = std::fs::metadata(&file.path)
                .and_then(|meta| meta.modified())
                .map_err(|e| TemplateError::Stat {
                    name: requested.to_string(),
                    template: name.clone(),
                    path: file.path.clone(),
                    source: e,
                })?;
            if modified > file.modified {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }
}

/// One immutable build of every template file under a root.
///
/// The compiled templates and their [`Snapshot`] are produced together by a
/// single loader run and are never modified afterwards; a reload replaces the
/// whole set.
#[derive(Debug)]
pub struct TemplateSet {
    tera: Tera,
    snapshot: Snapshot,
}

impl TemplateSet {
    pub(crate) fn new(tera: Tera, snapshot: Snapshot) -> Self {
        Self { tera, snapshot }
    }

    /// Template names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.snapshot.files.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.snapshot.contains(name)
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The underlying Tera instance, e.g. for one-off rendering with the same
    /// filters and members.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    pub fn render(&self, name: &str, context: &Context) -> TemplateResult<String> {
        self.tera
            .render(name, context)
            .map_err(|e| TemplateError::Render {
                name: name.to_string(),
                source: e,
            })
    }

    pub fn render_to(&self, name: &str, context: &Context, write: impl Write) -> TemplateResult<()> {
        self.tera
            .render_to(name, context, write)
            .map_err(|e| TemplateError::Render {
                name: name.to_string(),
                source: e,
            })
    }
}

/// A named member of a compiled [`TemplateSet`].
///
/// The handle keeps its whole set alive, so it keeps rendering the content it
/// was looked up with (including included members) even after the owning
/// collection reloads.
#[derive(Debug, Clone)]
pub struct Template {
    set: Arc<TemplateSet>,
    name: String,
}

impl Template {
    pub(crate) fn new(set: Arc<TemplateSet>, name: &str) -> Self {
        Self {
            set,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Modification time of the file this template was compiled from.
    pub fn modified(&self) -> Option<SystemTime> {
        self.set.snapshot.get(&self.name)
    }

    /// The set this template was compiled in.
    pub fn set(&self) -> &Arc<TemplateSet> {
        &self.set
    }

    pub fn render(&self, context: &Context) -> TemplateResult<String> {
        self.set.render(&self.name, context)
    }

    pub fn render_to(&self, context: &Context, write: impl Write) -> TemplateResult<()> {
        self.set.render_to(&self.name, context, write)
    }
}
