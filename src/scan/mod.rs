// src/scan/mod.rs
// =============================================================================
// This module handles picking the files a link check run scans.
//
// Features:
// - Recursive directory walk with stable (sorted) order
// - Ignored names for version-control metadata (.git, .hg, .svn)
// - Include globs OR exclude names, never both
// =============================================================================

mod select;

pub use select::{select_targets, SelectorConfig};
