//! Build a [`TemplateSet`] from every matching file under a root directory.
//!
//! Files are found by walking the root recursively and matching each file's
//! base name (never its directories) against the configured glob patterns.
//! Members are named by their path relative to the root, always with `/`
//! separators, so templates can include one another by relative path.
//! Symlinks to regular files are candidates like any other file; symlinked
//! directories are only entered when `follow_links` is set.

use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use glob::Pattern;
use tera::Tera;
use walkdir::WalkDir;

use crate::config::CollectionConfig;
use crate::error::{TemplateError, TemplateResult};
use crate::filters;
use crate::set::{Snapshot, TemplateSet};

/// Compile all templates matched by `config`.
///
/// Any failure aborts the whole build; no partial set is returned.
pub(crate) fn build(config: &CollectionConfig) -> TemplateResult<TemplateSet> {
    let started = Instant::now();
    let patterns = compile_patterns(&config.patterns)?;
    let files = find_template_files(config, &patterns)?;

    let mut snapshot = Snapshot::default();
    let mut sources = Vec::with_capacity(files.len());
    for (name, path) in files {
        let io_error = |e| TemplateError::Io {
            path: path.clone(),
            source: e,
        };
        let modified = std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .map_err(io_error)?;
        let contents = std::fs::read_to_string(&path).map_err(io_error)?;

        tera::Template::new(&name, None, &contents).map_err(|e| TemplateError::Compile {
            root: config.root.clone(),
            name: name.clone(),
            source: e,
        })?;

        tracing::debug!(template = %name, ?path, "Parsed template file");
        snapshot.insert(name.clone(), path, modified);
        sources.push((name, contents));
    }

    if sources.is_empty() {
        return Err(TemplateError::Empty {
            root: config.root.clone(),
            patterns: config.patterns.clone(),
        });
    }

    let mut tera = Tera::default();
    if config.case_filters {
        filters::register(&mut tera);
    }
    tera.add_raw_templates(sources)
        .map_err(|e| TemplateError::Link {
            root: config.root.clone(),
            patterns: config.patterns.clone(),
            source: e,
        })?;

    tracing::info!(
        root = %config.root.display(),
        templates = snapshot.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Built template set"
    );
    Ok(TemplateSet::new(tera, snapshot))
}

fn compile_patterns(patterns: &[String]) -> TemplateResult<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| TemplateError::Pattern {
                pattern: pattern.clone(),
                source: e,
            })
        })
        .collect()
}

/// Relative name and on-disk path of every file whose base name matches a
/// pattern, in walk order (sorted by file name within each directory).
fn find_template_files(
    config: &CollectionConfig,
    patterns: &[Pattern],
) -> TemplateResult<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();
    let walker = WalkDir::new(&config.root)
        .follow_links(config.follow_links)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| TemplateError::Traversal {
            root: config.root.clone(),
            source: e,
        })?;
        if entry.depth() == 0 {
            continue;
        }

        let file_type = entry.file_type();
        if !file_type.is_file() && !file_type.is_symlink() {
            continue;
        }

        let base_name = entry.file_name().to_string_lossy();
        if !patterns.iter().any(|pattern| pattern.matches(&base_name)) {
            continue;
        }

        if file_type.is_symlink() && !links_to_file(entry.path())? {
            tracing::debug!(path = ?entry.path(), "Matched symlink does not resolve to a file, skipping");
            continue;
        }

        match entry.path().strip_prefix(&config.root) {
            Ok(relative) => found.push((template_name(relative), entry.path().to_path_buf())),
            Err(_) => {
                tracing::warn!(path = ?entry.path(), "Matched file outside template root, skipping");
            }
        }
    }

    Ok(found)
}

/// Whether a symlink resolves to a regular file. Dangling links resolve to
/// nothing and are reported as `false`.
fn links_to_file(path: &Path) -> TemplateResult<bool> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(TemplateError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn template_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
