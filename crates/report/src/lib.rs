pub mod pdf;
pub mod templates;

use chrono::{DateTime, Utc};
pub use pdf::PdfRenderer;
use repo_health_core::{RenderError, models::RepositoryAnalysis};
use serde::Serialize;
pub use templates::{Templates, create, health_description, render};

pub const HTML_TEMPLATE: &str = "report.html";

/// Values shared by the HTML and PDF report templates.
#[derive(Serialize)]
pub struct ReportContext<'a> {
    pub report: &'a RepositoryAnalysis,
    pub health: &'static str,
    pub generated_at: DateTime<Utc>,
}

impl<'a> ReportContext<'a> {
    pub fn new(report: &'a RepositoryAnalysis) -> Self {
        Self {
            report,
            health: health_description(report.health_score as u32),
            generated_at: Utc::now(),
        }
    }
}

pub fn render_html(templates: &Templates, report: &RepositoryAnalysis) -> Result<String, RenderError> {
    Ok(render(templates, HTML_TEMPLATE, ReportContext::new(report))?)
}
