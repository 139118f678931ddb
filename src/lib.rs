//! Directory-backed Tera template collections with optional hot reload.
//!
//! A [`Collection`] parses every file under a root directory whose base name
//! matches one of a set of glob patterns, naming each template by its path
//! relative to the root (so `{% include "nav/menu.html" %}` works across
//! directories).
//!
//! In dynamic mode every [`Collection::get`] checks whether any template file
//! changed on disk and, if so, re-parses the whole set before answering. This
//! is handy during development but costs a `stat` per file per lookup, so leave
//! it off in production.
//!
//! ```no_run
//! use tasker_templates::{Collection, Context};
//!
//! # fn main() -> Result<(), tasker_templates::TemplateError> {
//! let templates = Collection::new("templates", ["*.html", "*.js", "*.css"], true)?;
//!
//! let mut context = Context::new();
//! context.insert("user", "ada");
//! let page = templates.get("nav/login.html")?.render(&context)?;
//! # let _ = page;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`collection`] — Lookup, staleness detection and whole-set reload
//! - [`config`] — Collection settings, optionally loaded from TOML
//! - [`error`] — Error taxonomy shared by every operation
//! - `loader` — Directory traversal, pattern matching and compilation
//! - [`set`] — Compiled template sets, modification-time snapshots and handles

pub mod collection;
pub mod config;
pub mod error;
mod filters;
mod loader;
pub mod set;

pub use collection::Collection;
pub use config::{CollectionConfig, ConfigError};
pub use error::{TemplateError, TemplateResult};
pub use set::{Snapshot, Template, TemplateSet};
pub use tera::Context;
