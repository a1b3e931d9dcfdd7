//! period.rs
//!
//! Named reporting windows and per-day windows, all computed relative to a
//! single `now` captured at the start of a run.
//!
//! Every window is half-open: `[since, until)`.
//!
//! "today" deliberately starts at the *previous* day's midnight. Collection
//! runs are scheduled late in the UTC day, so a strict single-day window
//! would drop same-day activity of users in other time zones.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Today,
    Week,
    Month,
    Quarter,
    Year,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::Today,
        Period::Week,
        Period::Month,
        Period::Quarter,
        Period::Year,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Week => "Week",
            Period::Month => "Month",
            Period::Quarter => "Quarter",
            Period::Year => "Year",
        }
    }

    /// Number of trailing days the dashboard charts show for this period.
    pub fn chart_days(self) -> usize {
        match self {
            Period::Today => 1,
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
            Period::Year => 365,
        }
    }

    /// Window for this period relative to `now`.
    pub fn window(self, now: DateTime<Utc>) -> Window {
        let since = match self {
            Period::Today => midnight(now.date_naive() - Duration::days(1)),
            Period::Week => now - Duration::days(7),
            Period::Month => now - Duration::days(30),
            Period::Quarter => now - Duration::days(90),
            Period::Year => now - Duration::days(365),
        };
        Window { since, until: now }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.since <= at && at < self.until
    }
}

/// A calendar day and its `[00:00, +24h)` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Day {
    pub date: NaiveDate,
    pub window: Window,
}

impl Day {
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Days from `now - days` up to and including the day of `now`, oldest first.
pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Vec<Day> {
    (0..=days as i64)
        .rev()
        .map(|offset| {
            let date = (now - Duration::days(offset)).date_naive();
            let since = midnight(date);
            Day {
                date,
                window: Window {
                    since,
                    until: since + Duration::days(1),
                },
            }
        })
        .collect()
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// One value per named period. Serializes as an object keyed by period name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTable<T> {
    pub today: T,
    pub week: T,
    pub month: T,
    pub quarter: T,
    pub year: T,
}

impl<T> PeriodTable<T> {
    pub fn get(&self, period: Period) -> &T {
        match period {
            Period::Today => &self.today,
            Period::Week => &self.week,
            Period::Month => &self.month,
            Period::Quarter => &self.quarter,
            Period::Year => &self.year,
        }
    }

    pub fn get_mut(&mut self, period: Period) -> &mut T {
        match period {
            Period::Today => &mut self.today,
            Period::Week => &mut self.week,
            Period::Month => &mut self.month,
            Period::Quarter => &mut self.quarter,
            Period::Year => &mut self.year,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Period, &T)> {
        Period::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}
