// src/release/infra.rs
// =============================================================================
// Pushes a component version bump to the infrastructure release repository.
//
// Steps:
// 1. Read FW_RELEASE_BRANCH / FW_RELEASE_COMMIT from the MR description
// 2. Clone the release repository and check out that branch
// 3. Rewrite `RELEASECI_<component>_VERSION: ...` in .gitlab-ci.yml
// 4. Commit everything with the prepared message and push
// =============================================================================

use regex::{NoExpand, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::details::ReleaseDetails;
use crate::error::{GuardianError, Result};
use crate::git::GitCli;

pub const DEFAULT_INFRA_REPO: &str = "git@gitlab.com:flywheel-io/infrastructure/release.git";

/// Where the release repository gets cloned
pub const CLONE_DIR: &str = "./release_repo";

/// The pipeline file holding the pinned versions
pub const PIPELINE_FILE: &str = ".gitlab-ci.yml";

/// Replaces every match of `pattern` in `path` with the literal `replacement`
pub fn replace_in_file(path: &Path, pattern: &str, replacement: &str) -> Result<()> {
    let search = Regex::new(pattern).map_err(|e| GuardianError::Configuration(e.to_string()))?;
    let content = fs::read_to_string(path).map_err(|e| GuardianError::io(path, e))?;
    let updated = search.replace_all(&content, NoExpand(replacement));
    fs::write(path, updated.as_bytes()).map_err(|e| GuardianError::io(path, e))
}

/// Sets `RELEASECI_<component>_VERSION` to `version` in the pipeline file
pub fn bump_component_version(pipeline_file: &Path, component: &str, version: &str) -> Result<()> {
    let key = format!("RELEASECI_{}_VERSION", component);
    replace_in_file(
        pipeline_file,
        &format!("{}:.*", regex::escape(&key)),
        &format!("{}: {}", key, version),
    )
}

/// What `update_infra` needs besides the MR description
#[derive(Debug, Clone)]
pub struct InfraUpdate {
    pub repo_url: String,
    pub clone_dir: PathBuf,
    pub component: String,
    pub version: String,
}

/// Applies the bump described in `description`.
///
/// Returns `Ok(false)` when the description carries no release details.
pub fn update_infra(update: &InfraUpdate, description: &str) -> Result<bool> {
    let Some(details) = ReleaseDetails::parse(description) else {
        return Ok(false);
    };

    info!(branch = %details.branch, "updating {}", update.repo_url);
    let repo = GitCli::clone_into(&update.repo_url, &update.clone_dir)?;
    repo.checkout(&details.branch)?;

    bump_component_version(
        &update.clone_dir.join(PIPELINE_FILE),
        &update.component,
        &update.version,
    )?;

    repo.commit_all(&details.commit)?;
    repo.push()?;
    Ok(true)
}
