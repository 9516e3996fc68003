use itertools::Itertools;
use repo_health_core::{models::ContributorShare, upstream::Contributor};

pub const TOP_CONTRIBUTORS: usize = 5;

/// The largest contributors with their share of all fetched contributions, in
/// percent with one decimal. Ties keep upstream order.
pub fn top_contributors(contributors: &[Contributor]) -> Vec<ContributorShare> {
    let total = contributors.iter().map(|c| c.contributions as u64).sum::<u64>();
    contributors
        .iter()
        .sorted_by(|a, b| b.contributions.cmp(&a.contributions))
        .take(TOP_CONTRIBUTORS)
        .map(|c| ContributorShare {
            login: c.login.clone(),
            avatar_url: c.avatar_url.clone(),
            contributions: c.contributions,
            percentage: share(c.contributions, total),
        })
        .collect()
}

fn share(contributions: u32, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (contributions as f64 / total as f64 * 1000.0).round() / 10.0
}
