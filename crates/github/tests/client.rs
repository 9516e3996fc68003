use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use repo_health_core::{config::GitHubConfig, upstream::Probe};
use repo_health_github::{GitHub, RepositorySource};
use serde_json::json;
use tokio::net::TcpListener;

const OWNER: &str = "octocat";
const REPO: &str = "hello-world";

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": "Not Found", "documentation_url": "https://docs.github.com/rest"})),
    )
        .into_response()
}

async fn server_error(State(hits): State<Arc<AtomicUsize>>) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "Server Error"}))).into_response()
}

/// Serve a canned subset of the REST API on a local port and point a client at it.
/// `hits` counts requests to the failing endpoint.
async fn github(hits: Arc<AtomicUsize>) -> Arc<GitHub> {
    let base = format!("/repos/{OWNER}/{REPO}");
    let app = Router::new()
        .route(&format!("{base}/readme"), get(server_error))
        .route(&format!("{base}/license"), get(|| async { Json(json!({"name": "LICENSE"})) }))
        .route(&format!("{base}/contents/CONTRIBUTING.md"), get(|| async { not_found() }))
        .route(
            &format!("{base}/contents/CODE_OF_CONDUCT.md"),
            get(|| async { Json(json!({"name": "CODE_OF_CONDUCT.md"})) }),
        )
        .route(&format!("{base}/stats/commit_activity"), get(|| async { StatusCode::ACCEPTED }))
        .route(&format!("{base}/contributors"), get(|| async { StatusCode::NO_CONTENT }))
        .route(&format!("{base}/actions/workflows"), get(|| async { not_found() }))
        .route(&format!("{base}/actions/runs"), get(|| async { not_found() }))
        .route(
            &format!("/repos/{OWNER}/busy/stats/commit_activity"),
            get(|| async {
                Json(json!([{"week": 1700352000, "total": 3, "days": [0, 1, 2, 0, 0, 0, 0]}]))
            }),
        )
        .with_state(hits);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    let config = GitHubConfig { token: None, base_uri: Some(format!("http://{addr}")) };
    GitHub::new(&config).await.unwrap()
}

#[tokio::test]
async fn missing_files_probe_as_absent() {
    let github = github(Arc::default()).await;
    assert!(!github.probe(OWNER, REPO, Probe::Contributing).await.unwrap());
    assert!(github.probe(OWNER, REPO, Probe::CodeOfConduct).await.unwrap());
    assert!(github.probe(OWNER, REPO, Probe::License).await.unwrap());
}

#[tokio::test]
async fn probe_server_error_fails_without_retrying() {
    let hits = Arc::new(AtomicUsize::new(0));
    let github = github(hits.clone()).await;
    assert!(github.probe(OWNER, REPO, Probe::Readme).await.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn pending_statistics_are_empty() {
    let github = github(Arc::default()).await;
    assert!(github.commit_activity(OWNER, REPO).await.unwrap().is_empty());
    assert!(github.contributors(OWNER, REPO, 10).await.unwrap().is_empty());

    let weeks = github.commit_activity(OWNER, "busy").await.unwrap();
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0].total, 3);
    assert_eq!(weeks[0].days, [0, 1, 2, 0, 0, 0, 0]);
}

#[tokio::test]
async fn missing_actions_mean_no_workflows() {
    let github = github(Arc::default()).await;
    assert_eq!(github.workflow_count(OWNER, REPO).await.unwrap(), 0);
    assert_eq!(github.latest_workflow_run(OWNER, REPO).await.unwrap(), None);
}
