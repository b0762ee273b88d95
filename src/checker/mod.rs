// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - reference: ScanTarget / Reference / CheckResult data types
// - extract: Finds references in markdown and commented source files
// - local: Resolves in-repository paths on the filesystem
// - http: HEAD/GET checks with the one-shot retry
// - summary: Collects failures, exit code, result line format
// - validator: Runs the whole pipeline over the selected files
// =============================================================================

mod extract;
mod http;
mod local;
mod reference;
mod summary;
mod validator;

// Re-export public items from submodules
// This lets users write `checker::LinkValidator` instead of
// `checker::validator::LinkValidator`
pub use http::HttpTransport;
pub use reference::{CheckResult, ScanTarget};
pub use summary::Symbols;
pub use validator::LinkValidator;
