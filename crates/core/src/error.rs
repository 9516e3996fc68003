use axum::http::StatusCode;
use thiserror::Error;

/// Failures surfaced by an analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid GitHub repository URL")]
    InvalidRepositoryUrl,
    #[error("Failed to analyze repository: {0:#}")]
    UpstreamFetch(anyhow::Error),
    #[error("Failed to access analysis store: {0:#}")]
    Store(anyhow::Error),
}

impl AnalysisError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRepositoryUrl | Self::UpstreamFetch(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// PDF or HTML report generation failed.
#[derive(Debug, Error)]
#[error("Failed to generate PDF report: {0:#}")]
pub struct RenderError(pub anyhow::Error);

impl From<anyhow::Error> for RenderError {
    fn from(err: anyhow::Error) -> Self { Self(err) }
}
