use std::{sync::Arc, time::Instant};

use anyhow::{Context, anyhow};
use repo_health_core::{RenderError, models::RepositoryAnalysis};
use svg2pdf::{
    ConversionOptions, PageOptions,
    usvg::{self, fontdb},
};

use crate::{ReportContext, templates::{Templates, render}};

pub const PDF_TEMPLATE: &str = "report.svg";

/// Renders reports to single-page A4 PDFs through an SVG template.
#[derive(Clone)]
pub struct PdfRenderer {
    templates: Templates,
    fontdb: Arc<fontdb::Database>,
}

impl PdfRenderer {
    pub fn new(templates: Templates) -> Self {
        let mut fontdb = fontdb::Database::new();
        fontdb.load_system_fonts();
        tracing::debug!("Loaded {} font faces", fontdb.len());
        Self { templates, fontdb: Arc::new(fontdb) }
    }

    pub fn svg(&self, report: &RepositoryAnalysis) -> Result<String, RenderError> {
        Ok(render(&self.templates, PDF_TEMPLATE, ReportContext::new(report))?)
    }

    pub async fn render(&self, report: &RepositoryAnalysis) -> Result<Vec<u8>, RenderError> {
        let start = Instant::now();
        let svg = self.svg(report)?;
        let fontdb = self.fontdb.clone();
        let pdf = tokio::task::spawn_blocking(move || svg_to_pdf(&svg, fontdb))
            .await
            .context("PDF conversion task failed")??;
        tracing::info!(
            "Rendered PDF report for {} ({} bytes) in {}ms",
            report.repository.full_name,
            pdf.len(),
            start.elapsed().as_millis()
        );
        Ok(pdf)
    }
}

fn svg_to_pdf(svg: &str, fontdb: Arc<fontdb::Database>) -> Result<Vec<u8>, RenderError> {
    let options = usvg::Options { fontdb, ..Default::default() };
    let tree = usvg::Tree::from_str(svg, &options).context("Failed to parse report SVG")?;
    let pdf = svg2pdf::to_pdf(&tree, ConversionOptions::default(), PageOptions::default())
        .map_err(|e| anyhow!("Failed to convert SVG to PDF: {e:?}"))?;
    Ok(pdf)
}
