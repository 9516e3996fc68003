use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use repo_health_core::upstream::{
    Contributor, Issue, Probe, Release, RepoMetadata, WeeklyCommits, WorkflowRun,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueQuery {
    pub state: IssueState,
    /// Only issues updated at or after this time
    pub since: Option<DateTime<Utc>>,
    pub per_page: u8,
}

/// Read-only access to the hosting API. Every call is attempted once.
///
/// [`probe`](RepositorySource::probe) and the workflow calls report a missing
/// resource as `false`/`0`/`None`; every other failure is an error.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn repository(&self, owner: &str, repo: &str) -> Result<RepoMetadata>;

    async fn contributors(&self, owner: &str, repo: &str, per_page: u8) -> Result<Vec<Contributor>>;

    /// Weekly commit counts for the last year, oldest first. Empty while the
    /// host is still computing the statistics.
    async fn commit_activity(&self, owner: &str, repo: &str) -> Result<Vec<WeeklyCommits>>;

    async fn issues(&self, owner: &str, repo: &str, query: IssueQuery) -> Result<Vec<Issue>>;

    async fn releases(&self, owner: &str, repo: &str, per_page: u8) -> Result<Vec<Release>>;

    async fn probe(&self, owner: &str, repo: &str, probe: Probe) -> Result<bool>;

    async fn workflow_count(&self, owner: &str, repo: &str) -> Result<u64>;

    async fn latest_workflow_run(&self, owner: &str, repo: &str) -> Result<Option<WorkflowRun>>;
}
