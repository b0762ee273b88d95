// src/git/command.rs
// =============================================================================
// Runs the `git` binary.
//
// Every call is `git -C <dir> <args...>`: synchronous, stdout in, String
// out. A non-zero exit status becomes GuardianError::Git with git's stderr.
// =============================================================================

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::error::{GuardianError, Result};

/// The queries the changelog generator needs
pub trait GitLog {
    /// Name of the most recent tag reachable from HEAD
    fn describe_latest_tag(&self) -> Result<String>;

    /// Short hashes of the merge commits in `from..to`, newest first
    fn merge_hashes(&self, from: &str, to: &str) -> Result<Vec<String>>;

    /// Full commit message body of `hash`
    fn show_message(&self, hash: &str) -> Result<String>;
}

/// A working tree driven through the `git` command line
#[derive(Debug, Clone)]
pub struct GitCli {
    dir: PathBuf,
}

impl GitCli {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Clones `url` into `dest` and returns a handle on the new working tree
    pub fn clone_into(url: &str, dest: &Path) -> Result<Self> {
        let dest_str = dest.to_string_lossy();
        run_git(Path::new("."), &["clone", url, &*dest_str])?;
        Ok(Self::new(dest))
    }

    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", branch]).map(drop)
    }

    /// `git commit -am <message>`
    pub fn commit_all(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-am", message]).map(drop)
    }

    pub fn push(&self) -> Result<()> {
        self.run(&["push", "origin"]).map(drop)
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        run_git(&self.dir, args)
    }
}

impl GitLog for GitCli {
    fn describe_latest_tag(&self) -> Result<String> {
        Ok(self
            .run(&["describe", "--tags", "--abbrev=0"])?
            .trim()
            .to_string())
    }

    fn merge_hashes(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let range = format!("{}..{}", from, to);
        let output = self.run(&["log", "--merges", "--format=%h", range.as_str()])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn show_message(&self, hash: &str) -> Result<String> {
        // %b: GitLab merge commits keep the MR title and "See merge request"
        // in the body, the subject is just "Merge branch ..."
        self.run(&["show", "--no-patch", "--format=%b", hash])
    }
}

fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    debug!(dir = %dir.display(), ?args, "git");

    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| GuardianError::Git {
            command: args.join(" "),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(GuardianError::Git {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
