// src/scan/select.rs
// =============================================================================
// This module decides which files a link check run looks at.
//
// How it works:
// 1. Every root given on the command line must exist (file or directory)
// 2. Directories are walked recursively, sorted by name for stable output
// 3. Ignored names (.git and friends) and exclude entries prune whole
//    subtrees: we never descend into them
// 4. With include patterns, only files matching one of them are kept
// 5. A file reachable from two roots is only scanned once
//
// Include and exclude cannot be combined; SelectorConfig::new refuses that.
// =============================================================================

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::checker::ScanTarget;
use crate::error::{GuardianError, Result};

/// Version-control metadata directories that are never scanned
pub const DEFAULT_IGNORED: [&str; 3] = [".git", ".hg", ".svn"];

/// Include/exclude/ignore settings, fixed before the walk starts
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    include: Option<GlobSet>,
    exclude: Vec<String>,
    ignored: Vec<String>,
}

impl SelectorConfig {
    /// Fails with a configuration error when both lists are non-empty
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Result<Self> {
        let include: Vec<String> = include.into_iter().filter(|p| !p.is_empty()).collect();
        let exclude: Vec<String> = exclude.into_iter().filter(|e| !e.is_empty()).collect();

        if !include.is_empty() && !exclude.is_empty() {
            return Err(GuardianError::Configuration(
                "include and exclude lists are mutually exclusive".to_string(),
            ));
        }

        let include = if include.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &include {
                builder.add(Glob::new(pattern)?);
            }
            Some(builder.build()?)
        };

        Ok(Self {
            include,
            exclude,
            ignored: DEFAULT_IGNORED.iter().map(|name| name.to_string()).collect(),
        })
    }

    /// Adds names to the ignore list on top of the defaults
    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(names.into_iter().map(Into::into));
        self
    }

    // Ignored names and exclude entries both cut the subtree
    fn is_pruned(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str());
        if let Some(name) = name {
            if self.ignored.iter().any(|ignored| ignored == name) {
                return true;
            }
        }
        self.is_excluded(path)
    }

    // An exclude entry matches the name, the stem, or the tail of the
    // resolved path (so `docs/legacy` works as well as `legacy`)
    fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }

        let name = path.file_name().and_then(|n| n.to_str());
        let stem = path.file_stem().and_then(|s| s.to_str());
        let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        self.exclude.iter().any(|entry| {
            Some(entry.as_str()) == name
                || Some(entry.as_str()) == stem
                || resolved.ends_with(entry)
        })
    }

    // Include globs are tried against the root-relative path and the file name
    fn is_included(&self, path: &Path, root: &Path) -> bool {
        let Some(include) = &self.include else {
            return true;
        };

        let relative = path.strip_prefix(root).unwrap_or(path);
        include.is_match(relative)
            || path
                .file_name()
                .is_some_and(|name| include.is_match(Path::new(name)))
    }
}

/// Produces the files to scan under `roots`, in walk order.
pub fn select_targets(roots: &[PathBuf], config: &SelectorConfig) -> Result<Vec<ScanTarget>> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for root in roots {
        let found = if root.is_file() {
            select_file(root, config)
        } else if root.is_dir() {
            select_directory(root, config)
        } else {
            return Err(GuardianError::NotFound(root.clone()));
        };

        for target in found {
            // same file through two roots (or `.` and `./docs`) -> once
            let key = fs::canonicalize(&target.path).unwrap_or_else(|_| target.path.clone());
            if seen.insert(key) {
                targets.push(target);
            }
        }
    }

    debug!(count = targets.len(), "selected files");
    Ok(targets)
}

// A file named directly is scanned relative to its own directory
fn select_file(path: &Path, config: &SelectorConfig) -> Vec<ScanTarget> {
    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if config.is_pruned(path) || !config.is_included(path, &root) {
        return Vec::new();
    }
    vec![ScanTarget::new(path, root)]
}

fn select_directory(root: &Path, config: &SelectorConfig) -> Vec<ScanTarget> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        // the root itself is never pruned, only what is below it
        .filter_entry(|entry| entry.depth() == 0 || !config.is_pruned(entry.path()));

    let mut targets = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if config.is_included(entry.path(), root) {
            targets.push(ScanTarget::new(entry.path(), root));
        }
    }
    targets
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. filter_entry vs filter
//    - `filter` drops an entry but walkdir still descends into a directory
//    - `filter_entry` stops the descent, so a pruned directory costs nothing
//
// 2. Why canonicalize for the `seen` set?
//    - `docs/a.md` and `./docs/../docs/a.md` are the same file
//    - canonicalize() resolves `.`/`..` and symlinks to one absolute path
// -----------------------------------------------------------------------------
