mod source;

use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::SecondsFormat;
use http::StatusCode;
use octocrab::{GitHubError, Octocrab, service::middleware::retry::RetryConfig};
use regex::Regex;
use repo_health_core::{
    config::GitHubConfig,
    upstream::{Contributor, Issue, Probe, Release, RepoMetadata, WeeklyCommits, WorkflowRun},
};
use serde::de::DeserializeOwned;
pub use source::{IssueQuery, IssueState, RepositorySource};

#[derive(Clone)]
pub struct GitHub {
    pub client: Octocrab,
}

#[derive(serde::Serialize)]
struct IssueParams {
    state: &'static str,
    per_page: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<String>,
}

#[derive(serde::Serialize)]
struct PageParams {
    per_page: u8,
}

impl GitHub {
    pub async fn new(config: &GitHubConfig) -> Result<Arc<Self>> {
        // Every upstream call is attempted once
        let mut builder = Octocrab::builder().add_retry_config(RetryConfig::None);
        if let Some(base_uri) = &config.base_uri {
            builder = builder.base_uri(base_uri.as_str()).context("Invalid GitHub base URI")?;
        }
        let client = match &config.token {
            Some(token) => builder.personal_token(token.clone()).build(),
            None => builder.build(),
        }
        .context("Failed to create GitHub client")?;
        if config.token.is_some() {
            let profile =
                client.current().user().await.context("Failed to fetch current user")?;
            tracing::info!("Logged in as {}", profile.login);
        } else {
            tracing::warn!("No GitHub token configured, using unauthenticated rate limits");
        }
        Ok(Arc::new(Self { client }))
    }

    /// GET a JSON resource, treating "accepted" and "no content" responses as empty.
    /// The statistics endpoints answer 202 while they are being computed and
    /// empty repositories answer 204 for contributor listings.
    async fn get_or_default<T>(&self, route: String) -> Result<T>
    where T: DeserializeOwned + Default {
        let response = self.client._get(route.as_str()).await?;
        let status = response.status();
        if status == StatusCode::ACCEPTED || status == StatusCode::NO_CONTENT {
            tracing::debug!("{} returned {}, treating as empty", route, status);
            return Ok(T::default());
        }
        let body = self.client.body_to_string(response).await?;
        if !status.is_success() {
            bail!("GitHub API returned {} for {}: {}", status, route, body);
        }
        serde_json::from_str(&body).with_context(|| format!("Failed to parse response for {route}"))
    }

    /// GET a resource only to learn whether it exists.
    async fn exists(&self, route: String) -> Result<bool> {
        match self.client.get::<serde_json::Value, _, ()>(&route, None).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to fetch {route}")),
        }
    }
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(
        err,
        octocrab::Error::GitHub { source, .. }
            if matches!(**source, GitHubError { status_code: StatusCode::NOT_FOUND, .. })
    )
}

#[async_trait]
impl RepositorySource for GitHub {
    async fn repository(&self, owner: &str, repo: &str) -> Result<RepoMetadata> {
        Ok(self.client.get::<RepoMetadata, _, ()>(format!("/repos/{owner}/{repo}"), None).await?)
    }

    async fn contributors(&self, owner: &str, repo: &str, per_page: u8) -> Result<Vec<Contributor>> {
        self.get_or_default(format!("/repos/{owner}/{repo}/contributors?per_page={per_page}")).await
    }

    async fn commit_activity(&self, owner: &str, repo: &str) -> Result<Vec<WeeklyCommits>> {
        self.get_or_default(format!("/repos/{owner}/{repo}/stats/commit_activity")).await
    }

    async fn issues(&self, owner: &str, repo: &str, query: IssueQuery) -> Result<Vec<Issue>> {
        let params = IssueParams {
            state: query.state.as_str(),
            per_page: query.per_page,
            since: query.since.map(|since| since.to_rfc3339_opts(SecondsFormat::Secs, true)),
        };
        Ok(self.client.get(format!("/repos/{owner}/{repo}/issues"), Some(&params)).await?)
    }

    async fn releases(&self, owner: &str, repo: &str, per_page: u8) -> Result<Vec<Release>> {
        Ok(self
            .client
            .get(format!("/repos/{owner}/{repo}/releases"), Some(&PageParams { per_page }))
            .await?)
    }

    async fn probe(&self, owner: &str, repo: &str, probe: Probe) -> Result<bool> {
        let route = match probe {
            Probe::Readme => format!("/repos/{owner}/{repo}/readme"),
            Probe::License => format!("/repos/{owner}/{repo}/license"),
            Probe::Contributing | Probe::CodeOfConduct => {
                let path = probe.path().unwrap_or_default();
                format!("/repos/{owner}/{repo}/contents/{path}")
            }
        };
        self.exists(route).await
    }

    async fn workflow_count(&self, owner: &str, repo: &str) -> Result<u64> {
        match self.client.workflows(owner, repo).list().send().await {
            Ok(page) => Ok(page.total_count.unwrap_or(page.items.len() as u64)),
            // Actions disabled or unavailable
            Err(e) if is_not_found(&e) => Ok(0),
            Err(e) => Err(e).context("Failed to fetch workflows"),
        }
    }

    async fn latest_workflow_run(&self, owner: &str, repo: &str) -> Result<Option<WorkflowRun>> {
        match self.client.workflows(owner, repo).list_all_runs().per_page(1u8).send().await {
            Ok(page) => Ok(page.items.into_iter().next().map(|run| WorkflowRun {
                conclusion: run.conclusion,
                updated_at: run.updated_at,
            })),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e).context("Failed to fetch workflow runs"),
        }
    }
}

/// Extract `(owner, repo)` from a GitHub repository URL. Case is preserved; a
/// trailing `.git` and any deeper path are ignored.
pub fn parse_repository_url(url: &str) -> Option<(&str, &str)> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let caps = REGEX
        .get_or_init(|| {
            Regex::new(
                r"^https?://(?:www\.)?github\.com/(?P<owner>[^/?#\s]+)/(?P<repo>[^/?#\s]+?)(?:\.git)?(?:[/?#]|$)",
            )
            .unwrap()
        })
        .captures(url.trim())?;
    let owner = caps.name("owner").map(|m| m.as_str()).unwrap_or_default();
    let repo = caps.name("repo").map(|m| m.as_str()).unwrap_or_default();
    Some((owner, repo))
}
