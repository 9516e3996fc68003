//! Entities fetched from the hosting API, trimmed to the fields scoring reads.
//! Field names follow the GitHub REST payloads so they deserialize directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CiStatus, Documentation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub full_name: String,
    pub owner: RepoOwner,
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub watchers_count: u32,
    #[serde(default)]
    pub open_issues_count: u32,
    #[serde(default)]
    pub has_wiki: bool,
    pub pushed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RepoMetadata {
    /// Last push, or the last metadata update for repositories never pushed to.
    pub fn last_activity(&self) -> Option<DateTime<Utc>> { self.pushed_at.or(self.updated_at) }

    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    pub fn has_language(&self) -> bool {
        self.language.as_deref().is_some_and(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    pub contributions: u32,
}

/// One week of the commit activity series. `week` is the unix timestamp of the
/// week's first day (Sunday) and `days` holds seven per-day counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCommits {
    pub week: i64,
    pub total: u32,
    #[serde(default)]
    pub days: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub conclusion: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Existence checks run against a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    Readme,
    Contributing,
    CodeOfConduct,
    License,
}

impl Probe {
    pub const ALL: [Probe; 4] =
        [Probe::Readme, Probe::Contributing, Probe::CodeOfConduct, Probe::License];

    /// Content path for probes answered by a file lookup.
    pub fn path(&self) -> Option<&'static str> {
        match self {
            Self::Contributing => Some("CONTRIBUTING.md"),
            Self::CodeOfConduct => Some("CODE_OF_CONDUCT.md"),
            Self::Readme | Self::License => None,
        }
    }
}

/// Everything one analysis fetches before scoring.
#[derive(Debug, Clone)]
pub struct FetchedRepository {
    pub metadata: RepoMetadata,
    pub contributors: Vec<Contributor>,
    pub commit_activity: Vec<WeeklyCommits>,
    pub open_issues: Vec<Issue>,
    pub closed_issues: Vec<Issue>,
    pub releases: Vec<Release>,
    pub documentation: Documentation,
    pub cicd: CiStatus,
}
