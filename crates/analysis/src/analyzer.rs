use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use repo_health_core::{
    AnalysisError,
    config::AnalysisConfig,
    models::{Analysis, NewAnalysis, RepositoryAnalysis},
};
use repo_health_db::Database;
use repo_health_github::{RepositorySource, parse_repository_url};

use crate::{fetch::fetch_repository, scoring};

/// Result of [`Analyzer::analyze`]. `analysis.analysis_data` is the serialized
/// report and is what callers should return verbatim.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: Analysis,
    /// Replayed from the store instead of freshly computed
    pub cached: bool,
}

impl AnalysisOutcome {
    pub fn report(&self) -> Result<RepositoryAnalysis, AnalysisError> {
        self.analysis.report().map_err(|e| AnalysisError::Store(e.into()))
    }
}

#[derive(Clone)]
pub struct Analyzer {
    source: Arc<dyn RepositorySource>,
    db: Arc<Database>,
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(source: Arc<dyn RepositorySource>, db: Arc<Database>, config: AnalysisConfig) -> Self {
        Self { source, db, config }
    }

    pub fn db(&self) -> &Database { &self.db }

    pub async fn analyze_url(&self, url: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let (owner, repo) =
            parse_repository_url(url).ok_or(AnalysisError::InvalidRepositoryUrl)?;
        self.analyze(owner, repo, Utc::now()).await
    }

    /// Analyze `owner/repo` as of `now`, replaying the latest stored snapshot if
    /// the repository was analyzed within the freshness window.
    pub async fn analyze(
        &self,
        owner: &str,
        repo: &str,
        now: DateTime<Utc>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let full_name = format!("{owner}/{repo}");
        if let Some(analysis) = self.fresh_analysis(&full_name, now).await? {
            tracing::info!("Returning cached analysis {} for {}", analysis.id, full_name);
            return Ok(AnalysisOutcome { analysis, cached: true });
        }

        let fetched = fetch_repository(
            self.source.as_ref(),
            owner,
            repo,
            self.config.closed_issue_window_days,
            now,
        )
        .await
        .map_err(AnalysisError::UpstreamFetch)?;
        let mut report = scoring::score(&fetched, now);

        let repository = report.repository.clone();
        let (_, analysis) = self
            .db
            .record_analysis(&repository, |stored| {
                // The payload embeds the stored record, including its id
                report.repository = stored.clone();
                Ok(NewAnalysis {
                    repository_id: stored.id,
                    health_score: report.health_score,
                    code_quality: report.code_quality,
                    community: report.community,
                    maintenance: report.maintenance,
                    analysis_data: serde_json::to_string(&report)
                        .context("Failed to serialize analysis")?,
                })
            })
            .await
            .context("Failed to store analysis")
            .map_err(AnalysisError::Store)?;
        tracing::info!(
            "Stored analysis {} for {} (health {}, code quality {}, community {}, maintenance {})",
            analysis.id,
            report.repository.full_name,
            report.health_score,
            report.code_quality,
            report.community,
            report.maintenance
        );
        Ok(AnalysisOutcome { analysis, cached: false })
    }

    async fn fresh_analysis(
        &self,
        full_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Analysis>, AnalysisError> {
        let Some(repository) = self
            .db
            .get_repository(full_name)
            .await
            .context("Failed to fetch repository")
            .map_err(AnalysisError::Store)?
        else {
            return Ok(None);
        };
        let age = (now - repository.last_analyzed).to_std().unwrap_or_default();
        if age >= self.config.freshness_window() {
            tracing::debug!("Analysis of {} is stale ({}s old)", full_name, age.as_secs());
            return Ok(None);
        }
        let analysis = self
            .db
            .latest_analysis(repository.id)
            .await
            .context("Failed to fetch latest analysis")
            .map_err(AnalysisError::Store)?;
        if analysis.is_none() {
            tracing::warn!("Repository {} has no stored analysis", full_name);
        }
        Ok(analysis)
    }
}
