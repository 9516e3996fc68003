use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

mod api;
mod dashboard;

pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/report/{owner}/{repo}", get(dashboard::report))
        .route("/health", get(dashboard::health))
        .route("/api/analyze", post(api::analyze))
        .route("/api/generate-pdf", post(api::generate_pdf))
        .route("/api/recent-analyses", get(api::recent_analyses))
        .route("/api/validate-url", post(api::validate_url))
}
