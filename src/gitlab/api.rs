// src/gitlab/api.rs
// =============================================================================
// This module talks to the GitLab REST API (v4).
//
// We only need one endpoint:
//   GET {api}/projects/{project}/merge_requests
// filtered either by IID (`iids[]=20`) or by state and target branch.
//
// Authentication is the `Private-Token` header. Any non-2xx answer is an
// error that carries the response body, so CI logs show what GitLab said.
// =============================================================================

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{GuardianError, Result};

const TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for one GitLab instance
#[derive(Debug, Clone)]
pub struct GitlabConfig {
    /// e.g. https://gitlab.com/api/v4 (CI_API_V4_URL)
    pub api_url: String,
    /// GITLAB_CI_BOT_TOKEN
    pub token: String,
}

/// The fields of a merge request we care about
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeRequest {
    #[serde(default)]
    pub iid: u64,
    /// GitLab sends `null` for an empty description
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_branch: String,
}

impl MergeRequest {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// Selects merge requests on the collection endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeRequestQuery {
    Iid(u64),
    Open { target_branch: String },
}

pub struct GitlabClient {
    client: Client,
    config: GitlabConfig,
}

impl GitlabClient {
    pub fn new(config: GitlabConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client, config })
    }

    /// Lists the merge requests of `project` (numeric ID or `group/name`)
    pub async fn merge_requests(
        &self,
        project: &str,
        query: &MergeRequestQuery,
    ) -> Result<Vec<MergeRequest>> {
        let url = merge_requests_url(&self.config.api_url, project, query)?;
        debug!(%url, "GET merge requests");

        let response = self
            .client
            .get(url)
            .header("Content-Type", "application/json")
            .header("Private-Token", &self.config.token)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GuardianError::Api(body));
        }

        Ok(response.json().await?)
    }
}

/// Builds the collection URL; the project path is encoded as one segment
/// (`group/name` -> `group%2Fname`), as GitLab expects.
pub fn merge_requests_url(api_url: &str, project: &str, query: &MergeRequestQuery) -> Result<Url> {
    let mut url = Url::parse(api_url.trim_end_matches('/'))?;

    url.path_segments_mut()
        .map_err(|_| GuardianError::Configuration(format!("API URL cannot be a base: {}", api_url)))?
        .pop_if_empty()
        .push("projects")
        .push(project)
        .push("merge_requests");

    match query {
        MergeRequestQuery::Iid(iid) => {
            url.query_pairs_mut().append_pair("iids[]", &iid.to_string());
        }
        MergeRequestQuery::Open { target_branch } => {
            url.query_pairs_mut()
                .append_pair("state", "opened")
                .append_pair("target_branch", target_branch);
        }
    }

    Ok(url)
}
