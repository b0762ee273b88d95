// src/git/mod.rs
// =============================================================================
// This module wraps the version-control commands the release helpers run.
// =============================================================================

mod command;

pub use command::{GitCli, GitLog};
