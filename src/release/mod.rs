// src/release/mod.rs
// =============================================================================
// Release pipeline helpers.
//
// Submodules:
// - changelog: markdown changelog from merge commits
// - description: changelog section of a merge request description
// - details: branch/commit of the open infrastructure release MR
// - infra: version bump pushed to the infrastructure release repository
// =============================================================================

mod changelog;
mod description;
mod details;
mod infra;

pub use changelog::build_changelog;
pub use description::{changelog_section, fetch_mr_description};
pub use details::{fetch_release_details, DEFAULT_INFRA_PROJECT};
pub use infra::{update_infra, InfraUpdate, CLONE_DIR, DEFAULT_INFRA_REPO};
