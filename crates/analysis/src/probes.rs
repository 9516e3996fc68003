use anyhow::{Context, Result};
use repo_health_core::{
    models::{BuildStatus, CiStatus, Documentation},
    upstream::Probe,
};
use repo_health_github::RepositorySource;

/// Documentation presence. A missing file is `false`, not an error. The wiki
/// flag is part of the repository metadata and is left unset here.
pub async fn check_documentation(
    source: &dyn RepositorySource,
    owner: &str,
    repo: &str,
) -> Result<Documentation> {
    let check = |probe: Probe| async move {
        source
            .probe(owner, repo, probe)
            .await
            .with_context(|| format!("Failed to check {probe:?} for {owner}/{repo}"))
    };
    let (readme, contributing, code_of_conduct, license) = tokio::try_join!(
        check(Probe::Readme),
        check(Probe::Contributing),
        check(Probe::CodeOfConduct),
        check(Probe::License),
    )?;
    Ok(Documentation { readme, contributing, code_of_conduct, license, wiki: false })
}

pub async fn check_ci(source: &dyn RepositorySource, owner: &str, repo: &str) -> Result<CiStatus> {
    let workflows = source.workflow_count(owner, repo).await.context("Failed to list workflows")?;
    if workflows == 0 {
        return Ok(CiStatus::none());
    }
    let run = source
        .latest_workflow_run(owner, repo)
        .await
        .context("Failed to fetch latest workflow run")?;
    Ok(match run {
        Some(run) => CiStatus {
            has_workflows: true,
            last_build: Some(run.updated_at),
            build_status: BuildStatus::from_conclusion(run.conclusion.as_deref()),
        },
        None => {
            CiStatus { has_workflows: true, last_build: None, build_status: BuildStatus::Unknown }
        }
    })
}
