use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use repo_health_analysis::Analyzer;
use repo_health_core::{
    AnalysisError,
    config::{AnalysisConfig, DbConfig},
    models::{BuildStatus, RecommendationKind},
    upstream::{
        Contributor, Issue, Probe, Release, RepoMetadata, RepoOwner, WeeklyCommits, WorkflowRun,
    },
};
use repo_health_db::Database;
use repo_health_github::{IssueQuery, IssueState, RepositorySource};

struct FakeSource {
    metadata: RepoMetadata,
    present: HashSet<Probe>,
    workflows: u64,
    fail_releases: bool,
    fetches: AtomicUsize,
    closed_since: std::sync::Mutex<Option<DateTime<Utc>>>,
}

impl FakeSource {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            metadata: RepoMetadata {
                full_name: "octocat/hello-world".to_string(),
                owner: RepoOwner { login: "octocat".to_string() },
                name: "hello-world".to_string(),
                description: Some("My first repository".to_string()),
                language: Some("Rust".to_string()),
                stargazers_count: 42,
                forks_count: 7,
                watchers_count: 42,
                open_issues_count: 3,
                has_wiki: true,
                pushed_at: Some(now - TimeDelta::days(3)),
                updated_at: Some(now - TimeDelta::days(1)),
            },
            present: Probe::ALL.into_iter().collect(),
            workflows: 1,
            fail_releases: false,
            fetches: AtomicUsize::new(0),
            closed_since: std::sync::Mutex::new(None),
        }
    }
}

#[async_trait]
impl RepositorySource for FakeSource {
    async fn repository(&self, _owner: &str, _repo: &str) -> Result<RepoMetadata> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.metadata.clone())
    }

    async fn contributors(&self, _: &str, _: &str, _: u8) -> Result<Vec<Contributor>> {
        Ok(vec![
            Contributor {
                login: "octocat".to_string(),
                avatar_url: "https://avatars.githubusercontent.com/u/583231".to_string(),
                contributions: 3,
            },
            Contributor {
                login: "hubot".to_string(),
                avatar_url: "https://avatars.githubusercontent.com/u/480938".to_string(),
                contributions: 1,
            },
        ])
    }

    async fn commit_activity(&self, _: &str, _: &str) -> Result<Vec<WeeklyCommits>> {
        Ok(vec![])
    }

    async fn issues(&self, _: &str, _: &str, query: IssueQuery) -> Result<Vec<Issue>> {
        let now = Utc::now();
        match query.state {
            IssueState::Open => Ok(vec![Issue {
                created_at: now - TimeDelta::days(1),
                updated_at: now,
                comments: 0,
            }]),
            IssueState::Closed => {
                *self.closed_since.lock().unwrap() = query.since;
                Ok(vec![
                    Issue { created_at: now - TimeDelta::days(10), updated_at: now, comments: 2 },
                    Issue { created_at: now - TimeDelta::days(90), updated_at: now, comments: 0 },
                ])
            }
        }
    }

    async fn releases(&self, _: &str, _: &str, _: u8) -> Result<Vec<Release>> {
        if self.fail_releases {
            bail!("API rate limit exceeded");
        }
        let now = Utc::now();
        Ok(vec![
            Release { tag_name: "v0.2.0".to_string(), created_at: now - TimeDelta::days(5) },
            Release { tag_name: "v0.1.0".to_string(), created_at: now - TimeDelta::days(40) },
        ])
    }

    async fn probe(&self, _: &str, _: &str, probe: Probe) -> Result<bool> {
        Ok(self.present.contains(&probe))
    }

    async fn workflow_count(&self, _: &str, _: &str) -> Result<u64> { Ok(self.workflows) }

    async fn latest_workflow_run(&self, _: &str, _: &str) -> Result<Option<WorkflowRun>> {
        Ok(Some(WorkflowRun { conclusion: Some("failure".to_string()), updated_at: Utc::now() }))
    }
}

async fn analyzer(source: FakeSource) -> (Analyzer, Arc<FakeSource>, Arc<Database>) {
    let source = Arc::new(source);
    let db = Arc::new(Database::new(&DbConfig::in_memory()).await.unwrap());
    let analyzer = Analyzer::new(source.clone(), db.clone(), AnalysisConfig::default());
    (analyzer, source, db)
}

const URL: &str = "https://github.com/octocat/hello-world";

#[tokio::test]
async fn analyzes_and_stores_report() {
    let (analyzer, source, db) = analyzer(FakeSource::new(Utc::now())).await;
    let outcome = analyzer.analyze_url(URL).await.unwrap();
    assert!(!outcome.cached);

    let report = outcome.report().unwrap();
    assert_eq!(report.repository.full_name, "octocat/hello-world");
    assert!(report.repository.id > 0);
    assert_eq!(outcome.analysis.repository_id, report.repository.id);
    assert_eq!(outcome.analysis.health_score, report.health_score);
    assert_eq!(report.code_quality, 100);
    assert!(report.documentation.wiki);
    assert_eq!(report.cicd.build_status, BuildStatus::Failing);
    assert_eq!(report.issue_metrics.open_issues, 1);
    assert_eq!(report.issue_metrics.closed_issues, 2);
    assert_eq!(report.issue_metrics.avg_response_time, 10.0);
    assert_eq!(report.releases.latest.as_deref(), Some("v0.2.0"));
    assert_eq!(report.contributors[0].percentage, 75.0);
    assert_eq!(report.contributors[1].percentage, 25.0);
    // Slow issue response is the only recommendation
    assert_eq!(report.recommendations.len(), 1);
    assert_eq!(report.recommendations[0].kind, RecommendationKind::Warning);

    let since = source.closed_since.lock().unwrap().expect("closed issues queried with since");
    let window = Utc::now() - since;
    assert!(window >= TimeDelta::days(30) && window < TimeDelta::days(31));

    let stored = db.get_repository("octocat/hello-world").await.unwrap().unwrap();
    assert_eq!(stored, report.repository);
    let latest = db.latest_analysis(stored.id).await.unwrap().unwrap();
    assert_eq!(latest, outcome.analysis);
}

#[tokio::test]
async fn replays_fresh_analysis_verbatim() {
    let (analyzer, source, db) = analyzer(FakeSource::new(Utc::now())).await;
    let first = analyzer.analyze_url(URL).await.unwrap();
    let second = analyzer.analyze_url(URL).await.unwrap();
    assert!(second.cached);
    assert_eq!(second.analysis.analysis_data, first.analysis.analysis_data);
    assert_eq!(second.analysis.id, first.analysis.id);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(db.recent_analyses(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reanalyzes_after_freshness_window() {
    let (analyzer, source, db) = analyzer(FakeSource::new(Utc::now())).await;
    let first = analyzer.analyze_url(URL).await.unwrap();
    let later = Utc::now() + TimeDelta::hours(1) + TimeDelta::seconds(1);
    let second = analyzer.analyze("octocat", "hello-world", later).await.unwrap();
    assert!(!second.cached);
    assert_ne!(second.analysis.id, first.analysis.id);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);

    let repository = db.get_repository("octocat/hello-world").await.unwrap().unwrap();
    assert_eq!(repository.id, first.report().unwrap().repository.id);
    let latest = db.latest_analysis(repository.id).await.unwrap().unwrap();
    assert_eq!(latest.id, second.analysis.id);
}

#[tokio::test]
async fn upstream_failure_persists_nothing() {
    let mut source = FakeSource::new(Utc::now());
    source.fail_releases = true;
    let (analyzer, _, db) = analyzer(source).await;
    let err = analyzer.analyze_url(URL).await.unwrap_err();
    assert!(matches!(err, AnalysisError::UpstreamFetch(_)));
    let message = err.to_string();
    assert!(message.starts_with("Failed to analyze repository: "), "{message}");
    assert!(message.contains("API rate limit exceeded"), "{message}");
    assert!(db.get_repository("octocat/hello-world").await.unwrap().is_none());
    assert!(db.recent_analyses(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_url_is_rejected_before_fetching() {
    let (analyzer, source, _) = analyzer(FakeSource::new(Utc::now())).await;
    for url in ["https://github.com/onlyonepart", "not-a-url"] {
        let err = analyzer.analyze_url(url).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRepositoryUrl));
    }
    assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_documentation_is_not_an_error() {
    let mut source = FakeSource::new(Utc::now());
    source.present = HashSet::from([Probe::CodeOfConduct]);
    source.workflows = 0;
    let (analyzer, _, _) = analyzer(source).await;
    let report = analyzer.analyze_url(URL).await.unwrap().report().unwrap();
    assert!(!report.documentation.readme);
    assert!(!report.documentation.contributing);
    assert!(report.documentation.code_of_conduct);
    assert!(!report.cicd.has_workflows);
    assert_eq!(report.cicd.build_status, BuildStatus::Unknown);
    let titles = report.recommendations.iter().map(|r| r.title.as_str()).collect::<Vec<_>>();
    assert_eq!(titles, [
        "Missing README",
        "Add Contributing Guidelines",
        "Missing License",
        "Slow Issue Response",
        "Add CI/CD",
    ]);
}
