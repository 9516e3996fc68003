use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use repo_health_core::{models::Documentation, upstream::FetchedRepository};
use repo_health_github::{IssueQuery, IssueState, RepositorySource};

use crate::probes::{check_ci, check_documentation};

pub const CONTRIBUTORS_PER_PAGE: u8 = 10;
pub const ISSUES_PER_PAGE: u8 = 100;
pub const RELEASES_PER_PAGE: u8 = 10;

/// Fetch everything scoring needs. All requests run concurrently and the first
/// failure aborts the rest.
pub async fn fetch_repository(
    source: &dyn RepositorySource,
    owner: &str,
    repo: &str,
    closed_issue_window_days: u32,
    now: DateTime<Utc>,
) -> Result<FetchedRepository> {
    let start = Instant::now();
    let closed_since = now - TimeDelta::days(closed_issue_window_days as i64);
    let (metadata, contributors, commit_activity, open_issues, closed_issues, releases, docs, cicd) =
        tokio::try_join!(
            async { source.repository(owner, repo).await.context("Failed to fetch repository") },
            async {
                source
                    .contributors(owner, repo, CONTRIBUTORS_PER_PAGE)
                    .await
                    .context("Failed to fetch contributors")
            },
            async {
                source.commit_activity(owner, repo).await.context("Failed to fetch commit activity")
            },
            async {
                let query =
                    IssueQuery { state: IssueState::Open, since: None, per_page: ISSUES_PER_PAGE };
                source.issues(owner, repo, query).await.context("Failed to fetch open issues")
            },
            async {
                let query = IssueQuery {
                    state: IssueState::Closed,
                    since: Some(closed_since),
                    per_page: ISSUES_PER_PAGE,
                };
                source.issues(owner, repo, query).await.context("Failed to fetch closed issues")
            },
            async {
                source
                    .releases(owner, repo, RELEASES_PER_PAGE)
                    .await
                    .context("Failed to fetch releases")
            },
            check_documentation(source, owner, repo),
            check_ci(source, owner, repo),
        )?;
    tracing::info!(
        "Fetched {}/{} ({} contributors, {} open issues, {} closed issues, {} releases) in {}ms",
        owner,
        repo,
        contributors.len(),
        open_issues.len(),
        closed_issues.len(),
        releases.len(),
        start.elapsed().as_millis()
    );
    let documentation = Documentation { wiki: metadata.has_wiki, ..docs };
    Ok(FetchedRepository {
        metadata,
        contributors,
        commit_activity,
        open_issues,
        closed_issues,
        releases,
        documentation,
        cicd,
    })
}
