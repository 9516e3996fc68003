use std::sync::Arc;

use anyhow::{Context, Result};
use argp::FromArgs;
use repo_health_analysis::Analyzer;
use repo_health_core::config::{Config, DbConfig};
use repo_health_db::Database;
use repo_health_github::GitHub;
use repo_health_report::PdfRenderer;
use typed_path::Utf8NativePathBuf;

use crate::native_path;

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Analyze a repository and print the report as JSON.
#[argp(subcommand, name = "analyze")]
pub struct Args {
    #[argp(positional)]
    /// repository URL, e.g. https://github.com/owner/repo
    url: String,
    #[argp(option, short = 'o', from_str_fn(native_path))]
    /// also write a PDF report to this file
    output: Option<Utf8NativePathBuf>,
}

pub async fn run(config_path: &Utf8NativePathBuf, args: Args) -> Result<()> {
    let config = Config::load(config_path.with_platform_encoding())?;
    // Nothing outlives a single invocation
    let db = Arc::new(Database::new(&DbConfig::in_memory()).await?);
    let github = GitHub::new(&config.github).await?;
    let analyzer = Analyzer::new(github, db.clone(), config.analysis.clone());

    let outcome = analyzer.analyze_url(&args.url).await?;
    let report = outcome.report()?;
    println!("{}", serde_json::to_string_pretty(&report).context("Failed to serialize report")?);

    if let Some(out_path) = &args.output {
        let templates = repo_health_report::create(config.templates.path.as_str());
        let pdf = PdfRenderer::new(templates).render(&report).await?;
        std::fs::write(out_path.with_platform_encoding(), pdf)
            .with_context(|| format!("Failed to write output file '{}'", out_path))?;
        tracing::info!("Wrote PDF report to {}", out_path);
    }
    db.close().await;
    Ok(())
}
