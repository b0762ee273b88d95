// src/gitlab/mod.rs
// =============================================================================
// This module handles the GitLab REST API.
//
// Currently implements:
// - Listing merge requests by IID
// - Listing open merge requests that target a branch
// =============================================================================

mod api;

pub use api::{GitlabClient, GitlabConfig, MergeRequestQuery};
