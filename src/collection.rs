//! The template collection: serves templates by name and, in dynamic mode,
//! reloads the whole set when any tracked file changed on disk.
//!
//! Static mode compiles once and serves lock-free. Dynamic mode serializes
//! every lookup behind one mutex: the lookup, the staleness scan and any
//! reload form a single critical section, so two callers can never reload
//! concurrently and nobody observes a half-replaced set.
//!
//! There is no template dependency graph, so a change to any file invalidates
//! the whole set: a template that includes a changed member must be recompiled
//! too.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tera::Context;

use crate::config::CollectionConfig;
use crate::error::{TemplateError, TemplateResult};
use crate::loader;
use crate::set::{Template, TemplateSet};

#[derive(Debug)]
enum State {
    /// Read-only after construction.
    Static(Arc<TemplateSet>),
    /// Replaced wholesale on reload, only while the lock is held.
    Dynamic(Mutex<Arc<TemplateSet>>),
}

/// All templates under a root directory, compiled into one set.
#[derive(Debug)]
pub struct Collection {
    config: CollectionConfig,
    state: State,
    reloads: AtomicU64,
}

impl Collection {
    /// Parse every file under `root` whose base name matches one of `patterns`.
    ///
    /// With `dynamic` set, every [`get`](Self::get) checks all files for
    /// changes and re-parses the whole set when any changed. Fails if no file
    /// matches.
    pub fn new<P, I, S>(root: P, patterns: I, dynamic: bool) -> TemplateResult<Self>
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_config(CollectionConfig::new(root, patterns).with_dynamic(dynamic))
    }

    pub fn from_config(config: CollectionConfig) -> TemplateResult<Self> {
        let set = Arc::new(loader::build(&config)?);
        let state = if config.dynamic {
            State::Dynamic(Mutex::new(set))
        } else {
            State::Static(set)
        };
        tracing::debug!(
            root = %config.root.display(),
            dynamic = config.dynamic,
            "Created template collection"
        );
        Ok(Self {
            config,
            state,
            reloads: AtomicU64::new(0),
        })
    }

    /// Build from a TOML configuration file (see [`CollectionConfig`]).
    pub fn from_config_file(path: &Path) -> TemplateResult<Self> {
        Self::from_config(CollectionConfig::load(path)?)
    }

    /// Look up a template by its root-relative name.
    ///
    /// In dynamic mode, if any file changed since the current set was built,
    /// the whole set is re-parsed first. A failed reload leaves the previous
    /// set in place.
    pub fn get(&self, name: &str) -> TemplateResult<Template> {
        let lock = match &self.state {
            State::Static(set) if set.contains(name) => {
                return Ok(Template::new(Arc::clone(set), name));
            }
            State::Static(_) => return Err(self.not_found(name)),
            State::Dynamic(lock) => lock,
        };

        let mut current = lock_set(lock);
        if !current.contains(name) {
            return Err(self.not_found(name));
        }

        let Some(changed) = current.snapshot().first_stale(name)? else {
            return Ok(Template::new(Arc::clone(&current), name));
        };
        tracing::info!(
            template = %name,
            changed = %changed,
            root = %self.config.root.display(),
            "Template files changed, reloading set"
        );

        let reloaded = match loader::build(&self.config) {
            Ok(set) => Arc::new(set),
            Err(e) => {
                tracing::warn!(
                    template = %name,
                    error = %e,
                    "Template reload failed, keeping previous set"
                );
                return Err(TemplateError::Reload {
                    name: name.to_string(),
                    source: Box::new(e),
                });
            }
        };
        *current = reloaded;
        self.reloads.fetch_add(1, Ordering::Relaxed);

        if !current.contains(name) {
            return Err(TemplateError::RemovedOnReload {
                name: name.to_string(),
                root: self.config.root.clone(),
                patterns: self.config.patterns.clone(),
            });
        }
        Ok(Template::new(Arc::clone(&current), name))
    }

    /// Look up and render a template in one step.
    pub fn render(&self, name: &str, context: &Context) -> TemplateResult<String> {
        self.get(name)?.render(context)
    }

    /// The current compiled set, without checking for changes.
    ///
    /// Useful for enumerating template names; use [`get`](Self::get) for
    /// up-to-date content.
    pub fn template_set(&self) -> Arc<TemplateSet> {
        match &self.state {
            State::Static(set) => Arc::clone(set),
            State::Dynamic(lock) => Arc::clone(&lock_set(lock)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn patterns(&self) -> &[String] {
        &self.config.patterns
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.state, State::Dynamic(_))
    }

    /// Number of successful reloads since construction.
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    fn not_found(&self, name: &str) -> TemplateError {
        tracing::debug!(template = %name, "Template not found in collection");
        TemplateError::NotFound {
            name: name.to_string(),
            root: self.config.root.clone(),
            patterns: self.config.patterns.clone(),
        }
    }
}

/// Sets are swapped in a single assignment, so even a poisoned lock holds a
/// complete set.
fn lock_set(lock: &Mutex<Arc<TemplateSet>>) -> MutexGuard<'_, Arc<TemplateSet>> {
    lock.lock().unwrap_or_else(|p| p.into_inner())
}
