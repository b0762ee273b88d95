// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every command is meant to run inside a CI job, so most options fall back to
// the CI environment variables (`env = ...`) and can still be overridden on
// the command line for local runs.
// =============================================================================

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::error::GuardianError;
use crate::gitlab::GitlabConfig;
use crate::release::{DEFAULT_INFRA_PROJECT, DEFAULT_INFRA_REPO};

#[derive(Parser, Debug)]
#[command(
    name = "ci-guardian",
    version,
    about = "CI helpers: link validation, changelogs and release version bumps",
    long_about = "ci-guardian bundles the small jobs of a release pipeline: checking the links in \
                  documentation, building changelogs from merge commits, and bumping a component's \
                  pinned version in the infrastructure release repository."
)]
pub struct Cli {
    /// Log filter, e.g. "info" or "ci_guardian=debug"
    #[arg(long, global = true, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check local and remote links in files and directories
    ///
    /// Example: ci-guardian links README.md docs/
    Links {
        /// Files or directories to scan (default: current directory)
        paths: Vec<PathBuf>,

        /// Only scan files matching these globs (comma separated)
        #[arg(long, env = "LINK_CHECK_INCLUDE", value_delimiter = ',')]
        include: Vec<String>,

        /// Skip files and directories with these names (comma separated)
        #[arg(long, env = "LINK_CHECK_EXCLUDE", value_delimiter = ',')]
        exclude: Vec<String>,

        /// Extra directory or file names to ignore, on top of .git/.hg/.svn
        #[arg(long = "ignore")]
        ignore: Vec<String>,

        /// Print OK/FAIL instead of unicode check marks
        ///
        /// FORCE_ASCII counts as unset when empty or one of false, no, n,
        /// off, 0
        #[arg(long, env = "FORCE_ASCII", value_parser = FalseyValueParser::new())]
        ascii: bool,

        /// Output results in JSON format instead of result lines
        #[arg(long)]
        json: bool,
    },

    /// Generate a markdown changelog from the merge commits in a range
    ///
    /// By default the range starts at the last tag and ends at HEAD.
    Changelog {
        /// Start revision (default: last tag)
        rev1: Option<String>,

        /// End revision (default: HEAD)
        rev2: Option<String>,
    },

    /// Print the changelog from the description of the merge request named
    /// in the commit message
    MrChangelog {
        /// Print the full description instead of the part above `***`
        #[arg(short, long)]
        full: bool,

        #[command(flatten)]
        mr: MergeRequestArgs,

        #[command(flatten)]
        gitlab: GitlabArgs,
    },

    /// Print FW_RELEASE_BRANCH and FW_RELEASE_COMMIT for a release
    ReleaseMrDetails {
        /// Release version
        #[arg(value_name = "RELEASE_VERSION")]
        version: String,

        /// Component being released
        #[arg(long, env = "FW_RELEASE_COMPONENT")]
        component: Option<String>,

        /// Project path of the infrastructure release repository
        #[arg(long, env = "FW_INFRA_PROJECT", default_value = DEFAULT_INFRA_PROJECT)]
        infra_project: String,

        #[command(flatten)]
        gitlab: GitlabArgs,
    },

    /// Bump the component version in the infrastructure release repository
    InfraUpdate {
        /// Release version
        #[arg(value_name = "FW_RELEASE_VERSION")]
        version: String,

        /// Component being released
        #[arg(long, env = "FW_RELEASE_COMPONENT")]
        component: Option<String>,

        /// Clone URL of the infrastructure release repository
        #[arg(long, env = "FW_INFRA_REPO", default_value = DEFAULT_INFRA_REPO)]
        infra_repo: String,

        #[command(flatten)]
        mr: MergeRequestArgs,

        #[command(flatten)]
        gitlab: GitlabArgs,
    },
}

/// Which merge request the command is about
#[derive(Args, Debug)]
pub struct MergeRequestArgs {
    /// Project whose merge requests are searched
    #[arg(long, env = "CI_PROJECT_ID")]
    pub project_id: String,

    /// Merge commit message containing `!<iid>`
    #[arg(long, env = "CI_COMMIT_MESSAGE", default_value = "")]
    pub commit_message: String,
}

/// GitLab connection settings. Optional at parse time: a command may decide
/// it has nothing to do before it ever talks to GitLab.
#[derive(Args, Debug)]
pub struct GitlabArgs {
    /// GitLab API root, e.g. https://gitlab.com/api/v4
    #[arg(long, env = "CI_API_V4_URL")]
    pub api_url: Option<String>,

    /// Token sent as Private-Token
    #[arg(long, env = "GITLAB_CI_BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl TryFrom<GitlabArgs> for GitlabConfig {
    type Error = GuardianError;

    fn try_from(args: GitlabArgs) -> Result<Self, Self::Error> {
        let api_url = args
            .api_url
            .filter(|url| !url.is_empty())
            .ok_or(GuardianError::MissingEnv("CI_API_V4_URL"))?;
        let token = args
            .token
            .filter(|token| !token.is_empty())
            .ok_or(GuardianError::MissingEnv("GITLAB_CI_BOT_TOKEN"))?;

        Ok(GitlabConfig { api_url, token })
    }
}
