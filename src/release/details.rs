// src/release/details.rs
// =============================================================================
// Finds where a component's version bump should go in the infrastructure
// release repository.
//
// There is usually one open MR on that repository collecting the bumps of a
// release; its source branch is where we push. The result is printed as a
// `>>>` fenced block that the CI job pastes into the merge commit, and that
// `infra-update` later parses back (see infra.rs).
// =============================================================================

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

use crate::error::Result;
use crate::gitlab::{GitlabClient, MergeRequestQuery};

/// Project path of the infrastructure release repository
pub const DEFAULT_INFRA_PROJECT: &str = "flywheel-io/infrastructure/release";

const TARGET_BRANCH: &str = "master";

static DETAILS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"FW_RELEASE_BRANCH="(.*)"\s*FW_RELEASE_COMMIT="(.*)""#).expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDetails {
    /// Empty when no open MR exists
    pub branch: String,
    pub commit: String,
}

impl ReleaseDetails {
    pub fn new(branch: impl Into<String>, component: &str, version: &str) -> Self {
        Self {
            branch: branch.into(),
            commit: release_commit(component, version),
        }
    }

    /// Finds a printed details block anywhere in `text`
    pub fn parse(text: &str) -> Option<Self> {
        DETAILS.captures(text).map(|caps| Self {
            branch: caps[1].to_string(),
            commit: caps[2].to_string(),
        })
    }
}

impl fmt::Display for ReleaseDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ">>>\nFW_RELEASE_BRANCH=\"{}\"\nFW_RELEASE_COMMIT=\"{}\"\n>>>",
            self.branch, self.commit
        )
    }
}

pub fn release_commit(component: &str, version: &str) -> String {
    format!("fix: update {} version to {}", component, version)
}

/// Looks up the open release MR on `infra_project`
pub async fn fetch_release_details(
    client: &GitlabClient,
    infra_project: &str,
    component: &str,
    version: &str,
) -> Result<ReleaseDetails> {
    let query = MergeRequestQuery::Open {
        target_branch: TARGET_BRANCH.to_string(),
    };
    let merge_requests = client.merge_requests(infra_project, &query).await?;

    let branch = match merge_requests.into_iter().next() {
        Some(mr) => mr.source_branch,
        None => {
            warn!("No open MR found in {} repository.", infra_project);
            String::new()
        }
    };

    Ok(ReleaseDetails::new(branch, component, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printed_block() {
        let details = ReleaseDetails::new("source-branch", "component", "1.2.3");
        assert_eq!(
            details.to_string(),
            ">>>\nFW_RELEASE_BRANCH=\"source-branch\"\nFW_RELEASE_COMMIT=\"fix: update component version to 1.2.3\"\n>>>"
        );
    }

    #[test]
    fn test_empty_branch_block() {
        let details = ReleaseDetails::new("", "api", "2.0.0");
        assert!(details.to_string().contains("FW_RELEASE_BRANCH=\"\"\n"));
    }

    #[test]
    fn test_parse_inside_description() {
        let description = "Release notes\n\n>>>\nFW_RELEASE_BRANCH=\"release-2\"\nFW_RELEASE_COMMIT=\"fix: update api version to 2.0.0\"\n>>>\n";
        let details = ReleaseDetails::parse(description).unwrap();

        assert_eq!(details.branch, "release-2");
        assert_eq!(details.commit, "fix: update api version to 2.0.0");
    }

    #[test]
    fn test_parse_printed_block_back() {
        let details = ReleaseDetails::new("b", "c", "1");
        assert_eq!(ReleaseDetails::parse(&details.to_string()), Some(details));
    }

    #[test]
    fn test_parse_missing_block() {
        assert_eq!(ReleaseDetails::parse("nothing here"), None);
    }
}
