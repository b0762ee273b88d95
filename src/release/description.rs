// src/release/description.rs
// =============================================================================
// Reads the changelog out of a merge request description.
//
// The merge commit message names the MR (`... !20`). We fetch that MR and
// print its description, or only the part above the `***` separator: by
// convention the changelog goes on top, reviewer notes below.
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{GuardianError, Result};
use crate::gitlab::{GitlabClient, MergeRequestQuery};

static MR_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!([0-9]+)").expect("valid regex"));

// everything up to the last run of three or more asterisks
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.*)\*{3,}").expect("valid regex"));

/// The first `!<number>` in a commit message
pub fn find_mr_iid(commit_message: &str) -> Option<u64> {
    MR_REF
        .captures(commit_message)
        .and_then(|caps| caps[1].parse().ok())
}

/// Text above the `***` separator, trimmed; the whole description if there is
/// no separator
pub fn changelog_section(description: &str) -> &str {
    match SEPARATOR.captures(description) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).trim(),
        None => description,
    }
}

/// Fetches the description of the MR named in `commit_message`
pub async fn fetch_mr_description(
    client: &GitlabClient,
    project: &str,
    commit_message: &str,
) -> Result<String> {
    if commit_message.is_empty() {
        return Err(GuardianError::MissingEnv("CI_COMMIT_MESSAGE"));
    }

    let iid = find_mr_iid(commit_message)
        .ok_or_else(|| GuardianError::NoMergeRequestId(commit_message.to_string()))?;

    let merge_requests = client
        .merge_requests(project, &MergeRequestQuery::Iid(iid))
        .await?;

    let mr = merge_requests
        .into_iter()
        .next()
        .ok_or(GuardianError::MergeRequestNotFound(iid))?;
    debug!(iid = mr.iid, branch = %mr.source_branch, "merge request found");
    Ok(mr.description().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_iid() {
        assert_eq!(find_mr_iid("Commit msg !20"), Some(20));
        assert_eq!(find_mr_iid("See merge request group/project!7 and !8"), Some(7));
        assert_eq!(find_mr_iid("Commit msg"), None);
    }

    #[test]
    fn test_section_above_separator() {
        assert_eq!(
            changelog_section("Some\nValue\n***\nOther\nValue"),
            "Some\nValue"
        );
    }

    #[test]
    fn test_section_without_separator() {
        assert_eq!(changelog_section("Some\nValue"), "Some\nValue");
    }

    #[test]
    fn test_section_uses_last_separator() {
        assert_eq!(changelog_section("a\n***\nb\n*****\nc"), "a\n***\nb\n**");
    }

    #[tokio::test]
    async fn test_empty_commit_message() {
        let client = GitlabClient::new(crate::gitlab::GitlabConfig {
            api_url: "https://gitlab.example.com/api/v4".into(),
            token: "token".into(),
        })
        .unwrap();

        let err = fetch_mr_description(&client, "1", "").await.unwrap_err();
        assert_eq!(err.to_string(), "'CI_COMMIT_MESSAGE' is empty");
    }

    #[tokio::test]
    async fn test_commit_message_without_mr() {
        let client = GitlabClient::new(crate::gitlab::GitlabConfig {
            api_url: "https://gitlab.example.com/api/v4".into(),
            token: "token".into(),
        })
        .unwrap();

        let err = fetch_mr_description(&client, "1", "Commit msg").await.unwrap_err();
        assert_eq!(err.to_string(), "Could not find MR ID in Commit msg");
    }
}
