//! Additive subscores. Each starts from a base, adds the bonus of the first
//! matching tier per signal and is capped at [`MAX_SCORE`].

use chrono::{DateTime, Utc};
use repo_health_core::{models::Documentation, upstream::RepoMetadata};

use super::days_between;

pub const MAX_SCORE: u8 = 100;

fn cap(score: u32) -> u8 { score.min(MAX_SCORE as u32) as u8 }

pub fn code_quality(metadata: &RepoMetadata, documentation: &Documentation) -> u8 {
    let mut score = 50;
    if documentation.readme {
        score += 15;
    }
    if documentation.contributing {
        score += 10;
    }
    if documentation.license {
        score += 10;
    }
    if metadata.has_description() {
        score += 5;
    }
    if metadata.has_language() {
        score += 10;
    }
    cap(score)
}

/// `contributors` and `open_issues` are the sizes of the fetched lists, not the
/// repository-wide totals.
pub fn community(metadata: &RepoMetadata, contributors: usize, open_issues: usize) -> u8 {
    let mut score = 30;
    score += match contributors {
        n if n > 10 => 20,
        n if n > 5 => 15,
        n if n > 1 => 10,
        _ => 0,
    };
    score += match open_issues {
        n if n < 50 => 15,
        n if n < 100 => 10,
        _ => 0,
    };
    score += match metadata.stargazers_count {
        n if n > 1000 => 20,
        n if n > 100 => 15,
        n if n > 10 => 10,
        _ => 0,
    };
    score += match metadata.forks_count {
        n if n > 100 => 15,
        n if n > 10 => 10,
        _ => 0,
    };
    cap(score)
}

pub fn maintenance(metadata: &RepoMetadata, releases: usize, now: DateTime<Utc>) -> u8 {
    let mut score = 40;
    if let Some(last_activity) = metadata.last_activity() {
        score += match days_between(last_activity, now) {
            d if d < 7.0 => 25,
            d if d < 30.0 => 20,
            d if d < 90.0 => 15,
            d if d < 365.0 => 10,
            _ => 0,
        };
    }
    score += match releases {
        n if n > 10 => 20,
        n if n > 5 => 15,
        n if n > 0 => 10,
        _ => 0,
    };
    score += match metadata.open_issues_count {
        n if n < 10 => 15,
        n if n < 50 => 10,
        _ => 0,
    };
    cap(score)
}

/// Mean of the three subscores, rounded half away from zero.
pub fn health_score(code_quality: u8, community: u8, maintenance: u8) -> u8 {
    let sum = code_quality as u32 + community as u32 + maintenance as u32;
    cap((sum as f64 / 3.0).round() as u32)
}
