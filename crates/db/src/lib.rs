use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use moka::{future::Cache, ops::compute::Op};
use repo_health_core::{
    config::DbConfig,
    models::{Analysis, NewAnalysis, Repository},
};
use sqlx::{
    Executor, FromRow, Pool, Sqlite, SqlitePool,
    migrate::MigrateDatabase,
    sqlite::SqlitePoolOptions,
};

/// Repository records and analysis snapshots.
///
/// Constructed explicitly and shared by `Arc`; an in-memory URL gives every
/// instance its own isolated database.
#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Sqlite>,
    // Latest snapshot per repository id
    latest_cache: Cache<i64, Arc<Analysis>>,
}

#[derive(FromRow)]
struct RepositoryRow {
    id: i64,
    full_name: String,
    owner: String,
    name: String,
    description: Option<String>,
    language: Option<String>,
    stars: i64,
    forks: i64,
    watchers: i64,
    open_issues: i64,
    last_analyzed: i64,
}

impl TryFrom<RepositoryRow> for Repository {
    type Error = anyhow::Error;

    fn try_from(row: RepositoryRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            full_name: row.full_name,
            owner: row.owner,
            name: row.name,
            description: row.description,
            language: row.language,
            stars: row.stars.try_into()?,
            forks: row.forks.try_into()?,
            watchers: row.watchers.try_into()?,
            open_issues: row.open_issues.try_into()?,
            last_analyzed: from_millis(row.last_analyzed)?,
        })
    }
}

#[derive(FromRow)]
struct AnalysisRow {
    id: i64,
    repository_id: i64,
    health_score: i64,
    code_quality: i64,
    community: i64,
    maintenance: i64,
    analysis_data: String,
    created_at: i64,
}

impl TryFrom<AnalysisRow> for Analysis {
    type Error = anyhow::Error;

    fn try_from(row: AnalysisRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            repository_id: row.repository_id,
            health_score: row.health_score.try_into()?,
            code_quality: row.code_quality.try_into()?,
            community: row.community.try_into()?,
            maintenance: row.maintenance.try_into()?,
            analysis_data: row.analysis_data,
            created_at: from_millis(row.created_at)?,
        })
    }
}

const REPOSITORY_COLUMNS: &str = "id, full_name, owner, name, description, language, stars, \
    forks, watchers, open_issues, last_analyzed";

const ANALYSIS_COLUMNS: &str = "id, repository_id, health_score, code_quality, community, \
    maintenance, analysis_data, created_at";

impl Database {
    pub async fn new(config: &DbConfig) -> Result<Self> {
        let pool = if config.is_in_memory() {
            // Each connection to an in-memory URL opens a separate database, so pin
            // exactly one connection for the lifetime of the pool.
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(&config.url)
                .await
        } else {
            if !Sqlite::database_exists(&config.url).await.unwrap_or(false) {
                tracing::info!(url = %config.url, "Creating database");
                Sqlite::create_database(&config.url).await.context("Failed to create database")?;
                tracing::info!("Database created");
            }
            SqlitePool::connect(&config.url).await
        }
        .context("Failed to connect to database")?;
        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;
        let latest_cache = Cache::<i64, Arc<Analysis>>::builder()
            .max_capacity(4096)
            .eviction_listener(|k, v, cause| {
                tracing::debug!("Evicting analysis {} for repository {}: {:?}", v.id, k, cause);
            })
            .build();
        Ok(Self { pool, latest_cache })
    }

    pub async fn close(&self) { self.pool.close().await }

    pub async fn get_repository(&self, full_name: &str) -> Result<Option<Repository>> {
        sqlx::query_as::<_, RepositoryRow>(&format!(
            "SELECT {REPOSITORY_COLUMNS} FROM repositories WHERE full_name = ?"
        ))
        .bind(full_name)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to fetch repository {full_name}"))?
        .map(Repository::try_from)
        .transpose()
    }

    /// Insert the repository, or refresh the counters and analysis timestamp of the
    /// existing record with the same full name. The `id` of the argument is ignored.
    pub async fn upsert_repository(&self, repository: &Repository) -> Result<Repository> {
        upsert_repository(&self.pool, repository).await
    }

    pub async fn insert_analysis(&self, analysis: NewAnalysis) -> Result<Analysis> {
        let analysis = insert_analysis(&self.pool, analysis).await?;
        self.cache_latest(&analysis).await;
        Ok(analysis)
    }

    /// Upsert the repository and insert its snapshot in one transaction. `snapshot`
    /// builds the analysis from the stored record; if anything fails, neither row
    /// is written.
    pub async fn record_analysis<F>(
        &self,
        repository: &Repository,
        snapshot: F,
    ) -> Result<(Repository, Analysis)>
    where
        F: FnOnce(&Repository) -> Result<NewAnalysis>,
    {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let repository = upsert_repository(&mut *tx, repository).await?;
        let analysis = insert_analysis(&mut *tx, snapshot(&repository)?).await?;
        tx.commit().await.context("Failed to commit analysis")?;
        self.cache_latest(&analysis).await;
        Ok((repository, analysis))
    }

    /// Most recent snapshot for a repository, by creation time then id.
    pub async fn latest_analysis(&self, repository_id: i64) -> Result<Option<Analysis>> {
        if let Some(analysis) = self.latest_cache.get(&repository_id).await {
            return Ok(Some((*analysis).clone()));
        }
        let Some(row) = sqlx::query_as::<_, AnalysisRow>(&format!(
            r#"
            SELECT {ANALYSIS_COLUMNS} FROM analyses
            WHERE repository_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(repository_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to fetch analysis for repository {repository_id}"))?
        else {
            return Ok(None);
        };
        let analysis = Analysis::try_from(row)?;
        self.cache_latest(&analysis).await;
        Ok(Some(analysis))
    }

    /// Cache `analysis` unless a newer snapshot of the same repository is already
    /// cached. Updates to one key are serialized, so a slow read can never replace
    /// the snapshot a concurrent insert just cached.
    async fn cache_latest(&self, analysis: &Analysis) {
        self.latest_cache
            .entry(analysis.repository_id)
            .and_compute_with(|cached| {
                let op = match cached {
                    Some(cached) if is_newer(cached.value(), analysis) => Op::Nop,
                    _ => Op::Put(Arc::new(analysis.clone())),
                };
                std::future::ready(op)
            })
            .await;
    }

    /// Most recent snapshots across all repositories, newest first.
    pub async fn recent_analyses(&self, limit: u32) -> Result<Vec<Analysis>> {
        sqlx::query_as::<_, AnalysisRow>(&format!(
            "SELECT {ANALYSIS_COLUMNS} FROM analyses ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch recent analyses")?
        .into_iter()
        .map(Analysis::try_from)
        .collect()
    }
}

fn is_newer(a: &Analysis, b: &Analysis) -> bool { (a.created_at, a.id) > (b.created_at, b.id) }

async fn upsert_repository<'e, E>(executor: E, repository: &Repository) -> Result<Repository>
where E: Executor<'e, Database = Sqlite> {
    let row = sqlx::query_as::<_, RepositoryRow>(&format!(
        r#"
        INSERT INTO repositories (full_name, owner, name, description, language, stars, forks,
                                  watchers, open_issues, last_analyzed)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (full_name) DO UPDATE
        SET description   = EXCLUDED.description,
            language      = EXCLUDED.language,
            stars         = EXCLUDED.stars,
            forks         = EXCLUDED.forks,
            watchers      = EXCLUDED.watchers,
            open_issues   = EXCLUDED.open_issues,
            last_analyzed = EXCLUDED.last_analyzed
        RETURNING {REPOSITORY_COLUMNS}
        "#
    ))
    .bind(&repository.full_name)
    .bind(&repository.owner)
    .bind(&repository.name)
    .bind(&repository.description)
    .bind(&repository.language)
    .bind(i64::from(repository.stars))
    .bind(i64::from(repository.forks))
    .bind(i64::from(repository.watchers))
    .bind(i64::from(repository.open_issues))
    .bind(repository.last_analyzed.timestamp_millis())
    .fetch_one(executor)
    .await
    .with_context(|| format!("Failed to store repository {}", repository.full_name))?;
    row.try_into()
}

async fn insert_analysis<'e, E>(executor: E, analysis: NewAnalysis) -> Result<Analysis>
where E: Executor<'e, Database = Sqlite> {
    let created_at = Utc::now();
    let row = sqlx::query_as::<_, AnalysisRow>(&format!(
        r#"
        INSERT INTO analyses (repository_id, health_score, code_quality, community, maintenance,
                              analysis_data, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {ANALYSIS_COLUMNS}
        "#
    ))
    .bind(analysis.repository_id)
    .bind(i64::from(analysis.health_score))
    .bind(i64::from(analysis.code_quality))
    .bind(i64::from(analysis.community))
    .bind(i64::from(analysis.maintenance))
    .bind(&analysis.analysis_data)
    .bind(created_at.timestamp_millis())
    .fetch_one(executor)
    .await
    .context("Failed to store analysis")?;
    row.try_into()
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| anyhow!("Invalid timestamp {millis}"))
}
