use repo_health_core::upstream::Issue;

use super::days_between;

/// Mean time in days from creation to last update across commented issues,
/// rounded to one decimal. Issues without comments never count.
pub fn avg_response_time(closed_issues: &[Issue]) -> f64 {
    let response_times = closed_issues
        .iter()
        .filter(|issue| issue.comments > 0)
        .map(|issue| days_between(issue.created_at, issue.updated_at))
        .collect::<Vec<_>>();
    if response_times.is_empty() {
        return 0.0;
    }
    let average = response_times.iter().sum::<f64>() / response_times.len() as f64;
    (average * 10.0).round() / 10.0
}
