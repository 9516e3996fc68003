use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored repository record, keyed by `full_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: i64,
    pub full_name: String,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: u32,
    pub forks: u32,
    pub watchers: u32,
    pub open_issues: u32,
    pub last_analyzed: DateTime<Utc>,
}

impl Repository {
    pub fn repo_url(&self) -> String { format!("https://github.com/{}", self.full_name) }
}

/// Immutable scoring snapshot. `analysis_data` holds the serialized
/// [`RepositoryAnalysis`] exactly as it was returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: i64,
    pub repository_id: i64,
    pub health_score: u8,
    pub code_quality: u8,
    pub community: u8,
    pub maintenance: u8,
    pub analysis_data: String,
    pub created_at: DateTime<Utc>,
}

impl Analysis {
    pub fn report(&self) -> serde_json::Result<RepositoryAnalysis> {
        serde_json::from_str(&self.analysis_data)
    }
}

#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub repository_id: i64,
    pub health_score: u8,
    pub code_quality: u8,
    pub community: u8,
    pub maintenance: u8,
    pub analysis_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryAnalysis {
    pub repository: Repository,
    pub health_score: u8,
    pub code_quality: u8,
    pub community: u8,
    pub maintenance: u8,
    pub commit_activity: Vec<MonthlyCommits>,
    pub contributors: Vec<ContributorShare>,
    pub issue_metrics: IssueMetrics,
    pub documentation: Documentation,
    pub cicd: CiStatus,
    pub dependencies: DependencySummary,
    pub releases: ReleaseSummary,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCommits {
    pub month: String,
    pub commits: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorShare {
    pub login: String,
    pub avatar_url: String,
    pub contributions: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueMetrics {
    pub avg_response_time: f64,
    pub open_issues: u32,
    pub closed_issues: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Documentation {
    pub readme: bool,
    pub contributing: bool,
    pub code_of_conduct: bool,
    pub license: bool,
    pub wiki: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiStatus {
    pub has_workflows: bool,
    pub last_build: Option<DateTime<Utc>>,
    pub build_status: BuildStatus,
}

impl CiStatus {
    pub fn none() -> Self {
        Self { has_workflows: false, last_build: None, build_status: BuildStatus::Unknown }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Passing,
    Failing,
    #[default]
    Unknown,
}

impl BuildStatus {
    /// Map a workflow run conclusion onto a build status.
    pub fn from_conclusion(conclusion: Option<&str>) -> Self {
        match conclusion {
            Some("success") => Self::Passing,
            Some("failure") => Self::Failing,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passing => "passing",
            Self::Failing => "failing",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Placeholder counters; dependency manifests are not inspected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySummary {
    pub total: u32,
    pub outdated: u32,
    pub vulnerable: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub latest: Option<String>,
    pub frequency: ReleaseFrequency,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseFrequency {
    Weekly,
    Monthly,
    Quarterly,
    Annually,
    Irregular,
}

impl ReleaseFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Annually => "Annually",
            Self::Irregular => "Irregular",
        }
    }
}

impl fmt::Display for ReleaseFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Error,
    Warning,
    Info,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}
