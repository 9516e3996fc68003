use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta, Utc};
use repo_health_core::{models::MonthlyCommits, upstream::WeeklyCommits};

pub const MONTHS: usize = 12;

/// Bucket the weekly series into the last [`MONTHS`] calendar months ending with
/// the month of `now`, oldest first. Per-day counts are attributed to the month
/// of their day; weeks without a per-day breakdown count towards the month the
/// week starts in. Commits outside the range are dropped.
pub fn monthly_commits(weeks: &[WeeklyCommits], now: DateTime<Utc>) -> Vec<MonthlyCommits> {
    let current = first_of_month(now.date_naive());
    let months = (0..MONTHS as u32)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect::<Vec<_>>();
    let mut commits = vec![0u32; months.len()];
    let mut add = |day: NaiveDate, count: u32| {
        if let Some(i) = months.iter().position(|&m| m == first_of_month(day)) {
            commits[i] += count;
        }
    };
    for week in weeks {
        let Some(start) = DateTime::from_timestamp(week.week, 0) else {
            continue;
        };
        let start = start.date_naive();
        if week.days.is_empty() {
            add(start, week.total);
            continue;
        }
        for (offset, &count) in week.days.iter().enumerate() {
            add(start + TimeDelta::days(offset as i64), count);
        }
    }
    months
        .iter()
        .zip(commits)
        .map(|(month, commits)| MonthlyCommits { month: month.format("%b").to_string(), commits })
        .collect()
}

fn first_of_month(date: NaiveDate) -> NaiveDate { date.with_day(1).unwrap_or(date) }
