use std::{sync::Arc, time::Instant};

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use repo_health_core::AppError;
use repo_health_db::Database;
use repo_health_report::{Templates, render, render_html};
use serde::Serialize;

const DASHBOARD_RECENT: u32 = 10;

#[derive(Serialize)]
struct RecentEntry {
    full_name: String,
    health_score: u8,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct IndexContext {
    recent: Vec<RecentEntry>,
}

pub async fn index(
    State(db): State<Arc<Database>>,
    State(templates): State<Templates>,
) -> Result<Response, AppError> {
    let start = Instant::now();
    let recent = db
        .recent_analyses(DASHBOARD_RECENT)
        .await?
        .into_iter()
        .filter_map(|analysis| match analysis.report() {
            Ok(report) => Some(RecentEntry {
                full_name: report.repository.full_name,
                health_score: analysis.health_score,
                created_at: analysis.created_at,
            }),
            Err(e) => {
                tracing::warn!("Skipping unreadable analysis {}: {}", analysis.id, e);
                None
            }
        })
        .collect();
    let rendered = render(&templates, "index.html", IndexContext { recent })?;
    tracing::debug!("Rendered dashboard in {}ms", start.elapsed().as_millis());
    Ok(Html(rendered).into_response())
}

/// Server-rendered report for the latest stored analysis of a repository.
pub async fn report(
    Path((owner, repo)): Path<(String, String)>,
    State(db): State<Arc<Database>>,
    State(templates): State<Templates>,
) -> Result<Response, AppError> {
    let full_name = format!("{owner}/{repo}");
    let Some(repository) = db.get_repository(&full_name).await? else {
        return Err(AppError::Status(StatusCode::NOT_FOUND));
    };
    let Some(analysis) = db.latest_analysis(repository.id).await? else {
        return Err(AppError::Status(StatusCode::NOT_FOUND));
    };
    let report = analysis.report().context("Failed to parse stored analysis")?;
    let rendered = render_html(&templates, &report).map_err(|e| AppError::Internal(e.0))?;
    Ok(Html(rendered).into_response())
}

pub async fn health() -> &'static str { "ok" }
