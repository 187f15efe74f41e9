use crate::config::RunOptions;
use crate::error::DiscoveryError;
use crate::grammar;
use crate::model::FileContent;
use crate::util::normalize_path;
use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub root: PathBuf,
    pub include: Vec<String>,
    pub ignore: Vec<String>,
    pub no_gitignore: bool,
    pub max_file_size: u64,
}

impl DiscoveryOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from(&RunOptions::new(root))
    }
}

impl From<&RunOptions> for DiscoveryOptions {
    fn from(options: &RunOptions) -> Self {
        Self {
            root: options.root.clone(),
            include: options.include.clone(),
            ignore: options.ignore.clone(),
            no_gitignore: options.no_gitignore,
            max_file_size: options.max_file_size,
        }
    }
}

/// Source files under `root` that some registered grammar can parse, sorted
/// by project-relative path.
pub fn discover(options: &DiscoveryOptions) -> Result<Vec<FileContent>, DiscoveryError> {
    let root = options.root.as_path();
    if !root.exists() {
        return Err(DiscoveryError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|err| DiscoveryError::Walk(err.into()))?;

    let overrides = build_overrides(root, &options.include, &options.ignore)?;
    let mut builder = WalkBuilder::new(root);
    if options.no_gitignore {
        builder
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false);
    } else {
        builder
            .ignore(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .parents(true)
            .require_git(false);
    }
    let walker = builder
        .hidden(true)
        .overrides(overrides)
        .filter_entry(|entry| entry.file_name() != OsStr::new(".git"))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "walk error");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let Some(rel_path) = relative_path(root, path) else {
            continue;
        };
        if grammar::lookup(&rel_path).is_none() {
            continue;
        }
        if let Some(file) = read_source(path, rel_path, options.max_file_size) {
            files.push(file);
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(root = %root.display(), files = files.len(), "discovery finished");
    Ok(files)
}

fn build_overrides(
    root: &Path,
    include: &[String],
    ignore: &[String],
) -> Result<Override, DiscoveryError> {
    let mut builder = OverrideBuilder::new(root);
    let negated = ignore.iter().map(|glob| format!("!{glob}"));
    for pattern in include.iter().cloned().chain(negated) {
        builder
            .add(&pattern)
            .map_err(|source| DiscoveryError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
    }
    builder
        .build()
        .map_err(|source| DiscoveryError::InvalidPattern {
            pattern: include.iter().chain(ignore).cloned().collect::<Vec<_>>().join(" "),
            source,
        })
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let rel = normalize_path(rel);
    (rel != ".").then_some(rel)
}

fn read_source(path: &Path, rel_path: String, max_size: u64) -> Option<FileContent> {
    let size = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
    if size > max_size {
        tracing::debug!(path = %rel_path, size, "skipping oversized file");
        return None;
    }
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(path = %rel_path, error = %err, "unreadable file");
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(content) => Some(FileContent::new(rel_path, content)),
        Err(_) => {
            tracing::debug!(path = %rel_path, "skipping non-UTF-8 file");
            None
        }
    }
}
