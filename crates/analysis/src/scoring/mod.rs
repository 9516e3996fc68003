//! Pure scoring over fetched upstream entities. Nothing here performs I/O.

mod activity;
mod cadence;
mod contributors;
mod issues;
mod recommendations;
mod score;

use chrono::{DateTime, Utc};
pub use activity::monthly_commits;
pub use cadence::release_frequency;
pub use contributors::{TOP_CONTRIBUTORS, top_contributors};
pub use issues::avg_response_time;
pub use recommendations::recommendations;
use repo_health_core::{
    models::{DependencySummary, IssueMetrics, ReleaseSummary, Repository, RepositoryAnalysis},
    upstream::{FetchedRepository, RepoMetadata},
};
pub use score::{MAX_SCORE, code_quality, community, health_score, maintenance};

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Fractional days from `from` to `to`.
pub(crate) fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Repository record as it will be stored. The id is assigned by the store.
pub fn repository_record(metadata: &RepoMetadata, now: DateTime<Utc>) -> Repository {
    Repository {
        id: 0,
        full_name: metadata.full_name.clone(),
        owner: metadata.owner.login.clone(),
        name: metadata.name.clone(),
        description: metadata.description.clone(),
        language: metadata.language.clone(),
        stars: metadata.stargazers_count,
        forks: metadata.forks_count,
        watchers: metadata.watchers_count,
        open_issues: metadata.open_issues_count,
        last_analyzed: now,
    }
}

/// Assemble the full report for a fetched repository as of `now`.
pub fn score(fetched: &FetchedRepository, now: DateTime<Utc>) -> RepositoryAnalysis {
    let metadata = &fetched.metadata;
    let code_quality = code_quality(metadata, &fetched.documentation);
    let community = community(metadata, fetched.contributors.len(), fetched.open_issues.len());
    let maintenance = maintenance(metadata, fetched.releases.len(), now);
    let issue_metrics = IssueMetrics {
        avg_response_time: avg_response_time(&fetched.closed_issues),
        open_issues: fetched.open_issues.len() as u32,
        closed_issues: fetched.closed_issues.len() as u32,
    };
    let recommendations =
        recommendations(&fetched.documentation, &fetched.cicd, issue_metrics.avg_response_time);
    RepositoryAnalysis {
        repository: repository_record(metadata, now),
        health_score: health_score(code_quality, community, maintenance),
        code_quality,
        community,
        maintenance,
        commit_activity: monthly_commits(&fetched.commit_activity, now),
        contributors: top_contributors(&fetched.contributors),
        issue_metrics,
        documentation: fetched.documentation,
        cicd: fetched.cicd.clone(),
        dependencies: DependencySummary::default(),
        releases: ReleaseSummary {
            latest: fetched.releases.first().map(|r| r.tag_name.clone()),
            frequency: release_frequency(&fetched.releases),
            total: fetched.releases.len() as u32,
        },
        recommendations,
    }
}
