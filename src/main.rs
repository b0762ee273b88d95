// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments (and CI environment variables) using clap
// 2. Set up logging
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = broken links, 2 = error)
//
// Everything runs on a single-threaded tokio runtime: requests are made one
// after another, never in parallel.
// =============================================================================

mod checker; // src/checker/ - link extraction and checking
mod cli; // src/cli.rs - command-line parsing
mod error; // src/error.rs - typed errors
mod git; // src/git/ - git command execution
mod gitlab; // src/gitlab/ - GitLab REST API
mod release; // src/release/ - changelog and release helpers
mod scan; // src/scan/ - file selection

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use checker::{CheckResult, HttpTransport, LinkValidator, Symbols};
use cli::{Cli, Commands, GitlabArgs, MergeRequestArgs};
use error::GuardianError;
use git::GitCli;
use gitlab::{GitlabClient, GitlabConfig};
use release::InfraUpdate;
use scan::{select_targets, SelectorConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Links {
            paths,
            include,
            exclude,
            ignore,
            ascii,
            json,
        } => {
            let config = SelectorConfig::new(include, exclude)?.with_ignored(ignore);
            handle_links(paths, &config, Symbols::new(ascii), json).await
        }
        Commands::Changelog { rev1, rev2 } => handle_changelog(rev1, rev2),
        Commands::MrChangelog { full, mr, gitlab } => handle_mr_changelog(full, mr, gitlab).await,
        Commands::ReleaseMrDetails {
            version,
            component,
            infra_project,
            gitlab,
        } => handle_release_mr_details(&version, component, &infra_project, gitlab).await,
        Commands::InfraUpdate {
            version,
            component,
            infra_repo,
            mr,
            gitlab,
        } => handle_infra_update(version, component, infra_repo, mr, gitlab).await,
    }
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

// Handles the 'links' subcommand
// Returns Ok(1) when at least one reference is broken
async fn handle_links(
    paths: Vec<PathBuf>,
    config: &SelectorConfig,
    symbols: Symbols,
    json: bool,
) -> Result<i32> {
    let roots = if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths
    };

    let targets = select_targets(&roots, config)?;

    // One client for the whole run, dropped when this function returns
    let validator = LinkValidator::new(HttpTransport::new()?);

    let summary = if json {
        let mut results: Vec<CheckResult> = Vec::new();
        let summary = validator
            .run(&targets, |result| results.push(result.clone()))
            .await;
        println!("{}", serde_json::to_string_pretty(&results)?);
        summary
    } else {
        let summary = validator
            .run(&targets, |result| println!("{}", symbols.format(result)))
            .await;
        if summary.checked > 0 {
            println!();
            println!(
                "{} file(s), {} reference(s): {} ok, {} failed",
                targets.len(),
                summary.checked,
                summary.ok_count(),
                summary.failures.len()
            );
        }
        summary
    };

    Ok(summary.exit_code())
}

// Handles the 'changelog' subcommand
fn handle_changelog(rev1: Option<String>, rev2: Option<String>) -> Result<i32> {
    let git = GitCli::new(".");
    let changelog = release::build_changelog(&git, rev1.as_deref(), rev2.as_deref())
        .context("could not build the changelog")?;
    print!("{}", changelog);
    Ok(0)
}

// Handles the 'mr-changelog' subcommand
async fn handle_mr_changelog(full: bool, mr: MergeRequestArgs, gitlab: GitlabArgs) -> Result<i32> {
    let client = GitlabClient::new(GitlabConfig::try_from(gitlab)?)?;
    let description =
        release::fetch_mr_description(&client, &mr.project_id, &mr.commit_message).await?;

    if full {
        println!("{}", description);
    } else {
        println!("{}", release::changelog_section(&description));
    }
    Ok(0)
}

// Handles the 'release-mr-details' subcommand
// A missing component is not an error: the job simply has nothing to do
async fn handle_release_mr_details(
    version: &str,
    component: Option<String>,
    infra_project: &str,
    gitlab: GitlabArgs,
) -> Result<i32> {
    let Some(component) = component.filter(|c| !c.is_empty()) else {
        warn!("No FW_RELEASE_COMPONENT set, exiting");
        return Ok(0);
    };

    let client = GitlabClient::new(GitlabConfig::try_from(gitlab)?)?;
    let details = release::fetch_release_details(&client, infra_project, &component, version).await?;
    println!("{}", details);
    Ok(0)
}

// Handles the 'infra-update' subcommand
async fn handle_infra_update(
    version: String,
    component: Option<String>,
    infra_repo: String,
    mr: MergeRequestArgs,
    gitlab: GitlabArgs,
) -> Result<i32> {
    let component = component
        .filter(|c| !c.is_empty())
        .ok_or(GuardianError::MissingEnv("FW_RELEASE_COMPONENT"))?;

    let client = GitlabClient::new(GitlabConfig::try_from(gitlab)?)?;
    let description =
        release::fetch_mr_description(&client, &mr.project_id, &mr.commit_message).await?;

    let update = InfraUpdate {
        repo_url: infra_repo,
        clone_dir: PathBuf::from(release::CLONE_DIR),
        component,
        version,
    };

    let updated = release::update_infra(&update, &description)
        .with_context(|| format!("could not update {}", update.repo_url))?;
    if !updated {
        println!("Could not extract FW_RELEASE_BRANCH and FW_RELEASE_COMMIT, exiting");
    }
    Ok(0)
}
