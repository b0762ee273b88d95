// src/release/changelog.rs
// =============================================================================
// Generates a markdown changelog from the merge commits in a revision range.
//
// For each merge commit we read the message and pick out:
// - the title: first non-empty line
// - the merge request: `!<number>` (from "See merge request group/proj!10")
// - issue keys: every `[KEY-123]`, spaces inside the brackets allowed
//
// Output, one block per merge commit (newest first):
//
//   - !10 Some change
//       - FLYW-1 FLYW-2
// =============================================================================

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use super::description::find_mr_iid;
use crate::error::Result;
use crate::git::GitLog;

static ISSUE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*([A-Za-z][A-Za-z0-9_]*)\s*-\s*([0-9]+)\s*\]").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    /// `!10`, or empty when the commit names no merge request
    pub mr: String,
    pub title: String,
    /// Normalized `KEY-123`, sorted by key then number, no duplicates
    pub issues: Vec<String>,
}

impl ChangelogEntry {
    pub fn parse(message: &str) -> Self {
        let title = message
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string();

        let mr = find_mr_iid(message)
            .map(|iid| format!("!{}", iid))
            .unwrap_or_default();

        let keys: BTreeSet<(String, u64)> = ISSUE_KEY
            .captures_iter(message)
            .filter_map(|caps| {
                let number = caps[2].parse().ok()?;
                Some((caps[1].to_string(), number))
            })
            .collect();
        let issues = keys
            .into_iter()
            .map(|(key, number)| format!("{}-{}", key, number))
            .collect();

        Self { mr, title, issues }
    }
}

impl fmt::Display for ChangelogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- {} {}", self.mr, self.title)?;
        if !self.issues.is_empty() {
            writeln!(f, "    - {}", self.issues.join(" "))?;
        }
        Ok(())
    }
}

/// Builds the changelog for `from..to`.
///
/// `from` defaults to the latest tag, `to` to HEAD.
pub fn build_changelog<G: GitLog>(git: &G, from: Option<&str>, to: Option<&str>) -> Result<String> {
    let from = match from {
        Some(rev) => rev.to_string(),
        None => git.describe_latest_tag()?,
    };
    let to = to.unwrap_or("HEAD");

    let mut changelog = String::new();
    for hash in git.merge_hashes(&from, to)? {
        let message = git.show_message(&hash)?;
        changelog.push_str(&ChangelogEntry::parse(&message).to_string());
    }
    Ok(changelog)
}
