use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use repo_health_analysis::Analyzer;
use repo_health_core::{
    AnalysisError, AppError,
    models::{Analysis, RepositoryAnalysis},
};
use repo_health_db::Database;
use repo_health_github::parse_repository_url;
use repo_health_report::PdfRenderer;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RECENT_LIMIT: u32 = 10;
pub const MAX_RECENT_LIMIT: u32 = 100;

#[derive(Deserialize)]
pub struct UrlRequest {
    #[serde(default)]
    url: String,
}

fn rejection_message(rejection: &JsonRejection) -> String {
    format!("Invalid request body: {}", rejection.body_text())
}

/// Unreadable request bodies answer with a `{message}` body like every other failure.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>, status: StatusCode) -> Result<T, AppError> {
    payload.map(|Json(value)| value).map_err(|e| AppError::message(status, rejection_message(&e)))
}

/// Analyze a repository, or replay the stored analysis if it is still fresh.
/// The stored payload is returned as-is so replays are byte-identical.
pub async fn analyze(
    State(analyzer): State<Analyzer>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(payload, StatusCode::BAD_REQUEST)?;
    let outcome = analyzer.analyze_url(&request.url).await?;
    Ok((
        [(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())],
        outcome.analysis.analysis_data,
    )
        .into_response())
}

pub async fn generate_pdf(
    State(pdf): State<PdfRenderer>,
    payload: Result<Json<RepositoryAnalysis>, JsonRejection>,
) -> Result<Response, AppError> {
    let report = payload.map(|Json(report)| report).map_err(|e| {
        tracing::warn!("{}", rejection_message(&e));
        AppError::message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate PDF report")
    })?;
    let data = pdf.render(&report).await?;
    let disposition = format!(
        "attachment; filename=\"repository-health-{}.pdf\"",
        file_name_component(&report.repository.name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, mime::APPLICATION_PDF.as_ref()),
            (header::CONTENT_DISPOSITION, disposition.as_str()),
        ],
        data,
    )
        .into_response())
}

/// Keep header-safe characters of a repository name.
fn file_name_component(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}

#[derive(Deserialize)]
pub struct RecentQuery {
    limit: Option<String>,
}

/// Positive limits are capped at [`MAX_RECENT_LIMIT`]; anything else uses the default.
fn recent_limit(limit: Option<&str>) -> u32 {
    match limit.and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(n) if n > 0 => n.min(MAX_RECENT_LIMIT as i64) as u32,
        _ => DEFAULT_RECENT_LIMIT,
    }
}

pub async fn recent_analyses(
    State(db): State<Arc<Database>>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<Analysis>>, AppError> {
    let analyses = db
        .recent_analyses(recent_limit(query.limit.as_deref()))
        .await
        .map_err(|e| {
            tracing::error!("{e:?}");
            AppError::message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recent analyses")
        })?;
    Ok(Json(analyses))
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum UrlValidation {
    Valid { valid: bool, owner: String, repo: String },
    Invalid { valid: bool, message: String },
}

pub async fn validate_url(payload: Result<Json<UrlRequest>, JsonRejection>) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(UrlValidation::Invalid { valid: false, message: rejection_message(&e) }),
            )
                .into_response();
        }
    };
    match parse_repository_url(&request.url) {
        Some((owner, repo)) => Json(UrlValidation::Valid {
            valid: true,
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
        .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(UrlValidation::Invalid {
                valid: false,
                message: AnalysisError::InvalidRepositoryUrl.to_string(),
            }),
        )
            .into_response(),
    }
}
