pub mod config;
pub mod error;
pub mod models;
pub mod upstream;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
pub use error::{AnalysisError, RenderError};
use serde::Serialize;

pub enum AppError {
    Status(StatusCode),
    Message(StatusCode, String),
    Internal(anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

impl AppError {
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Message(status, message.into())
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self { Self::Message(err.status(), err.to_string()) }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        tracing::error!("{:?}", err.0);
        Self::Message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate PDF report".into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self { Self::Internal(err) }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Status(status) if status == StatusCode::NOT_FOUND => {
                (status, "Not found").into_response()
            }
            Self::Status(status) => status.into_response(),
            Self::Message(status, message) => {
                if status.is_server_error() {
                    tracing::error!("{}", message);
                } else {
                    tracing::warn!("{}", message);
                }
                (status, Json(ErrorBody { message: &message })).into_response()
            }
            Self::Internal(err) => {
                tracing::error!("{:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody { message: &format!("Something went wrong: {err}") }),
                )
                    .into_response()
            }
        }
    }
}
