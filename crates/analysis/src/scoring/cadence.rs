use itertools::Itertools;
use repo_health_core::{models::ReleaseFrequency, upstream::Release};

use super::days_between;

/// Classify release cadence from the mean gap between consecutive releases.
pub fn release_frequency(releases: &[Release]) -> ReleaseFrequency {
    if releases.len() < 2 {
        return ReleaseFrequency::Irregular;
    }
    let gaps = releases
        .iter()
        .map(|r| r.created_at)
        .sorted_by(|a, b| b.cmp(a))
        .tuple_windows()
        .map(|(newer, older)| days_between(older, newer))
        .collect::<Vec<_>>();
    let average = gaps.iter().sum::<f64>() / gaps.len() as f64;
    match average {
        d if d < 14.0 => ReleaseFrequency::Weekly,
        d if d < 45.0 => ReleaseFrequency::Monthly,
        d if d < 120.0 => ReleaseFrequency::Quarterly,
        _ => ReleaseFrequency::Annually,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeDelta, Utc};

    use super::*;

    /// Releases published the given number of days before `now`.
    fn releases(now: DateTime<Utc>, ages: &[i64]) -> Vec<Release> {
        ages.iter()
            .enumerate()
            .map(|(i, &days)| Release {
                tag_name: format!("v{i}"),
                created_at: now - TimeDelta::days(days),
            })
            .collect()
    }

    #[test]
    fn test_release_frequency() {
        let now = Utc::now();
        let cases: &[(&[i64], ReleaseFrequency)] = &[
            (&[], ReleaseFrequency::Irregular),
            (&[3], ReleaseFrequency::Irregular),
            // Gaps of 10, 10 and 15 days
            (&[0, 10, 20, 35], ReleaseFrequency::Weekly),
            // Gaps of 50 and 10 days
            (&[0, 50, 60], ReleaseFrequency::Monthly),
            (&[0, 13], ReleaseFrequency::Weekly),
            (&[0, 14], ReleaseFrequency::Monthly),
            (&[0, 44], ReleaseFrequency::Monthly),
            (&[0, 45], ReleaseFrequency::Quarterly),
            (&[0, 119], ReleaseFrequency::Quarterly),
            (&[0, 120], ReleaseFrequency::Annually),
            (&[0, 400, 800], ReleaseFrequency::Annually),
        ];
        for &(ages, expected) in cases {
            assert_eq!(release_frequency(&releases(now, ages)), expected, "{ages:?}");
        }
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let now = Utc::now();
        let sorted = releases(now, &[0, 30, 200]);
        let shuffled = releases(now, &[200, 0, 30]);
        assert_eq!(release_frequency(&sorted), release_frequency(&shuffled));
        assert_eq!(release_frequency(&sorted), ReleaseFrequency::Quarterly);
    }
}
