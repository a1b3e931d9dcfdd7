use crate::period::Period;
use crate::snapshot::{MetricsSnapshot, TOP_REPO_LIMIT};
use crate::view::{format_number, short_name};
use std::fmt::Write;

const SUMMARY_PERIODS: [Period; 4] = [Period::Today, Period::Week, Period::Month, Period::Year];

/// Markdown summary: period table plus the top repositories.
pub fn render_markdown(snapshot: &MetricsSnapshot) -> String {
    let updated_at = snapshot.meta.updated_at.format("%Y-%m-%d %H:%M");

    let mut out = format!(
        "# 📊 Code Metrics Dashboard\n\n\
         > **@{}** · Updated: {updated_at} UTC\n\n\
         | Period | Commits | Additions | Deletions | Net |\n\
         |--------|---------|-----------|-----------|-----|\n",
        snapshot.meta.username
    );

    for period in SUMMARY_PERIODS {
        let s = snapshot.summary.get(period);
        let _ = writeln!(
            out,
            "| {} | {} | +{} | -{} | {} |",
            period.label(),
            s.commits,
            format_number(s.additions as i64),
            format_number(s.deletions as i64),
            format_number(s.net())
        );
    }

    out.push_str(
        "\n## Top Repositories\n\n\
         | Repository | Commits | ++ | -- |\n\
         |------------|---------|----|----|\n",
    );

    for repo in snapshot.top_repos.iter().take(TOP_REPO_LIMIT) {
        let _ = writeln!(
            out,
            "| [{}]({}) | {} | +{} | -{} |",
            short_name(&repo.name),
            repo.url,
            repo.commits,
            format_number(repo.additions as i64),
            format_number(repo.deletions as i64)
        );
    }

    out.push_str("\n---\n🔗 [View Dashboard](../../) · 🤖 Auto-updated daily\n");
    out
}
