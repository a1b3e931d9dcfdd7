//! Display helpers shared by the HTML dashboard and the markdown summary.

use crate::snapshot::MetricsSnapshot;
use crate::source::LanguageBytes;

/// Number of trailing daily buckets embedded for the charts.
pub const CHART_DAYS: usize = 90;
pub const TOP_LANGUAGES: usize = 6;

const FALLBACK_LANGUAGE_COLOR: &str = "#8b949e";

/// Compact number: `1.2M`, `3.4K`, or the plain value below 1000.
pub fn format_number(n: i64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Final path segment of `owner/name`.
pub fn short_name(full_name: &str) -> &str {
    full_name.rsplit('/').next().unwrap_or(full_name)
}

/// Daily buckets as parallel arrays, oldest first.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChartSeries {
    pub dates: Vec<String>,
    pub commits: Vec<u64>,
    pub additions: Vec<u64>,
    pub deletions: Vec<u64>,
}

impl ChartSeries {
    /// The most recent `CHART_DAYS` dates present in the snapshot. Missing
    /// days are not filled in.
    pub fn recent(snapshot: &MetricsSnapshot) -> Self {
        let skip = snapshot.daily.len().saturating_sub(CHART_DAYS);
        let mut series = ChartSeries::default();

        // BTreeMap order is chronological for YYYY-MM-DD keys.
        for (date, bucket) in snapshot.daily.iter().skip(skip) {
            series.dates.push(date.clone());
            series.commits.push(bucket.commits);
            series.additions.push(bucket.additions);
            series.deletions.push(bucket.deletions);
        }
        series
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageShare {
    pub name: String,
    pub bytes: u64,
    /// Share of all language bytes, rounded to one decimal.
    pub percent: f64,
}

impl LanguageShare {
    pub fn color(&self) -> &'static str {
        language_color(&self.name)
    }
}

/// The `TOP_LANGUAGES` largest languages by bytes with their share of the total.
pub fn top_languages(languages: &LanguageBytes) -> Vec<LanguageShare> {
    let total: u64 = languages.values().sum();
    let total = if total == 0 { 1 } else { total };

    let mut sorted: Vec<(&String, &u64)> = languages.iter().collect();
    // Stable sort: equal byte counts keep the map's alphabetical order.
    sorted.sort_by(|a, b| b.1.cmp(a.1));

    sorted
        .into_iter()
        .take(TOP_LANGUAGES)
        .map(|(name, &bytes)| LanguageShare {
            name: name.clone(),
            bytes,
            percent: round1(bytes as f64 / total as f64 * 100.0),
        })
        .collect()
}

/// Round to one decimal, ties to even, so exact halves do not push the
/// shown shares past 100%.
fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

pub fn language_color(name: &str) -> &'static str {
    match name {
        "Python" => "#3572A5",
        "JavaScript" => "#f1e05a",
        "TypeScript" => "#3178c6",
        "HTML" => "#e34c26",
        "CSS" => "#563d7c",
        "Shell" => "#89e051",
        "Go" => "#00ADD8",
        "Rust" => "#dea584",
        "Java" => "#b07219",
        "C++" => "#f34b7d",
        "C" => "#555555",
        "Ruby" => "#701516",
        "PHP" => "#4F5D95",
        "Swift" => "#F05138",
        "Kotlin" => "#A97BFF",
        "Dockerfile" => "#384d54",
        "YAML" => "#cb171e",
        "Vue" => "#41b883",
        _ => FALLBACK_LANGUAGE_COLOR,
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::PeriodTable;
    use crate::snapshot::{GENERATED_BY, Meta};
    use crate::stats::DailyBucket;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn snapshot_with_days(dates: &[String]) -> MetricsSnapshot {
        MetricsSnapshot {
            meta: Meta {
                updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
                username: "octo".to_string(),
                generated_by: GENERATED_BY.to_string(),
                incomplete_repos: Vec::new(),
            },
            summary: PeriodTable::default(),
            repos: BTreeMap::new(),
            daily: dates
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let bucket = DailyBucket {
                        commits: i as u64,
                        additions: 10 * i as u64,
                        deletions: i as u64,
                    };
                    (d.clone(), bucket)
                })
                .collect(),
            languages: LanguageBytes::new(),
            top_repos: Vec::new(),
        }
    }

    #[test]
    fn format_number_uses_suffixes() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1.0K");
        assert_eq!(format_number(12_345), "12.3K");
        assert_eq!(format_number(2_500_000), "2.5M");
        assert_eq!(format_number(-4_000), "-4000");
    }

    #[test]
    fn short_name_takes_last_segment() {
        assert_eq!(short_name("octo/tool"), "tool");
        assert_eq!(short_name("plain"), "plain");
    }

    #[test]
    fn sparse_daily_data_is_not_padded() {
        let dates: Vec<String> = ["2024-05-03", "2024-05-01", "2024-05-10", "2024-05-02", "2024-05-20"]
            .iter()
            .map(|d| d.to_string())
            .collect();
        let series = ChartSeries::recent(&snapshot_with_days(&dates));

        assert_eq!(
            series.dates,
            ["2024-05-01", "2024-05-02", "2024-05-03", "2024-05-10", "2024-05-20"]
        );
        assert_eq!(series.commits.len(), 5);
        assert_eq!(series.additions.len(), 5);
    }

    #[test]
    fn only_the_latest_ninety_days_are_kept() {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<String> = (0..120)
            .map(|i| (start + chrono::Duration::days(i)).format("%Y-%m-%d").to_string())
            .collect();
        let series = ChartSeries::recent(&snapshot_with_days(&dates));

        assert_eq!(series.dates.len(), CHART_DAYS);
        assert_eq!(series.dates.first().unwrap(), &dates[30]);
        assert_eq!(series.dates.last().unwrap(), &dates[119]);
    }

    #[test]
    fn language_shares_follow_byte_counts() {
        let langs = LanguageBytes::from([
            ("Python".to_string(), 800),
            ("JavaScript".to_string(), 200),
        ]);
        let top = top_languages(&langs);

        assert_eq!(
            top,
            vec![
                LanguageShare {
                    name: "Python".to_string(),
                    bytes: 800,
                    percent: 80.0,
                },
                LanguageShare {
                    name: "JavaScript".to_string(),
                    bytes: 200,
                    percent: 20.0,
                },
            ]
        );
        assert_eq!(top[0].color(), "#3572A5");
    }

    #[test]
    fn only_six_languages_are_shown() {
        let langs: LanguageBytes = (1..=9u64)
            .map(|i| (format!("Lang{i}"), i * 111))
            .collect();
        let total: u64 = langs.values().sum();
        let top = top_languages(&langs);

        assert_eq!(top.len(), TOP_LANGUAGES);
        assert_eq!(top[0].name, "Lang9");
        for share in &top {
            assert_eq!(share.percent, round1(share.bytes as f64 / total as f64 * 100.0));
        }
        assert!(top.iter().map(|s| s.percent).sum::<f64>() <= 100.0);
        assert_eq!(top[0].color(), FALLBACK_LANGUAGE_COLOR);
    }

    #[test]
    fn half_percent_ties_round_to_even() {
        let langs = LanguageBytes::from([("A".to_string(), 49), ("B".to_string(), 351)]);
        let top = top_languages(&langs);

        let shares: Vec<(&str, f64)> = top.iter().map(|s| (s.name.as_str(), s.percent)).collect();
        assert_eq!(shares, vec![("B", 87.8), ("A", 12.2)]);
        assert!(top.iter().map(|s| s.percent).sum::<f64>() <= 100.0);
    }

    #[test]
    fn equal_byte_counts_keep_alphabetical_order() {
        let langs = LanguageBytes::from([
            ("Rust".to_string(), 400),
            ("Go".to_string(), 300),
            ("C".to_string(), 300),
        ]);
        let names: Vec<String> = top_languages(&langs).into_iter().map(|s| s.name).collect();

        assert_eq!(names, ["Rust", "C", "Go"]);
    }

    #[test]
    fn empty_languages_do_not_divide_by_zero() {
        assert!(top_languages(&LanguageBytes::new()).is_empty());
    }

    #[test]
    fn escape_html_covers_markup() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
