//! Static HTML dashboard.
//!
//! The page is self-contained apart from Chart.js: the daily series and the
//! per-period summary are embedded as script literals, and switching period
//! tabs only re-slices that embedded data.

use crate::period::Period;
use crate::snapshot::MetricsSnapshot;
use crate::view::{ChartSeries, escape_html, format_number, short_name, top_languages};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;

/// Tab selected when the page loads.
const DEFAULT_PERIOD: Period = Period::Month;
const TABLE_REPOS: usize = 8;
const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js";
const TAB_ORDER: [Period; 5] = [
    Period::Month,
    Period::Week,
    Period::Today,
    Period::Quarter,
    Period::Year,
];

/// Render the full dashboard page for `snapshot`.
pub fn render_dashboard(snapshot: &MetricsSnapshot) -> Result<String> {
    let username = escape_html(&snapshot.meta.username);
    let updated_at = snapshot.meta.updated_at.format("%Y-%m-%d %H:%M");

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{username} · Code Metrics</title>
    <script src="{CHART_JS_URL}"></script>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <header class="header">
            <div class="avatar">📊</div>
            <div class="header-info">
                <h1>{username}</h1>
                <div class="subtitle">Code Metrics Dashboard</div>
                <div class="updated">Last updated: {updated_at} UTC</div>
            </div>
        </header>
{tabs}
{stats}
{charts}
        <div class="two-columns">
{repos}
{languages}
        </div>
        <footer class="footer">
            Powered by <a href="https://github.com">GitHub API</a> · Auto-updated daily
        </footer>
    </div>
    <script>
{data}
{js}
    </script>
</body>
</html>
"#,
        css = INLINE_CSS,
        tabs = render_tabs(),
        stats = render_stat_boxes(snapshot),
        charts = render_chart_cards(),
        repos = render_repo_table(snapshot),
        languages = render_languages(snapshot),
        data = render_data(snapshot)?,
        js = INLINE_JS,
    ))
}

fn render_tabs() -> String {
    let mut out = String::from("        <nav class=\"nav-tabs\">\n");
    for period in TAB_ORDER {
        let active = if period == DEFAULT_PERIOD { " active" } else { "" };
        let _ = writeln!(
            out,
            r#"            <button class="nav-tab{active}" data-period="{}">{}</button>"#,
            period.key(),
            period.label()
        );
    }
    out.push_str("        </nav>");
    out
}

fn render_stat_boxes(snapshot: &MetricsSnapshot) -> String {
    let s = snapshot.summary.get(DEFAULT_PERIOD);
    let boxes = [
        ("Commits", "commits", s.commits.to_string(), "code changes"),
        (
            "Additions",
            "additions",
            format!("+{}", format_number(s.additions as i64)),
            "lines added",
        ),
        (
            "Deletions",
            "deletions",
            format!("-{}", format_number(s.deletions as i64)),
            "lines removed",
        ),
        ("Net Change", "net", format_number(s.net()), "net lines"),
    ];

    let mut out = String::from("        <div class=\"stats-row\">\n");
    for (label, id, value, note) in boxes {
        let _ = write!(
            out,
            r#"            <div class="stat-box">
                <div class="label">{label}</div>
                <div class="value {id}" id="stat-{id}">{value}</div>
                <div class="change">{note}</div>
            </div>
"#
        );
    }
    out.push_str("        </div>");
    out
}

fn render_chart_cards() -> String {
    let mut out = String::new();
    for (title, canvas) in [
        ("Commits Activity", "commitsChart"),
        ("Lines of Code", "linesChart"),
    ] {
        let _ = write!(
            out,
            r#"        <div class="card">
            <div class="card-header"><h2>{title}</h2></div>
            <div class="card-body">
                <div class="chart-container"><canvas id="{canvas}"></canvas></div>
            </div>
        </div>
"#
        );
    }
    out
}

fn render_repo_table(snapshot: &MetricsSnapshot) -> String {
    let mut rows = String::new();
    for repo in snapshot.top_repos.iter().take(TABLE_REPOS) {
        let _ = write!(
            rows,
            r#"                        <tr>
                            <td class="repo-name"><a href="{url}" target="_blank">{name}</a></td>
                            <td>{commits}</td>
                            <td class="text-success">+{additions}</td>
                            <td class="text-danger">-{deletions}</td>
                        </tr>
"#,
            url = escape_html(&repo.url),
            name = escape_html(short_name(&repo.name)),
            commits = repo.commits,
            additions = format_number(repo.additions as i64),
            deletions = format_number(repo.deletions as i64),
        );
    }

    format!(
        r#"            <div class="card">
                <div class="card-header"><h2>Top Repositories</h2></div>
                <div class="card-body flush">
                    <table>
                        <thead>
                            <tr><th>Repository</th><th>Commits</th><th>++</th><th>--</th></tr>
                        </thead>
                        <tbody>
{rows}                        </tbody>
                    </table>
                </div>
            </div>"#
    )
}

fn render_languages(snapshot: &MetricsSnapshot) -> String {
    let shares = top_languages(&snapshot.languages);

    let mut bar = String::new();
    let mut list = String::new();
    for lang in &shares {
        let color = lang.color();
        let _ = writeln!(
            bar,
            r#"                        <div class="lang-segment" style="width: {:.1}%; background: {color};"></div>"#,
            lang.percent
        );
        let _ = write!(
            list,
            r#"                        <div class="lang-item" title="{} bytes">
                            <span class="lang-dot" style="background: {color};"></span>
                            <span class="lang-name">{}</span>
                            <span class="lang-percent">{:.1}%</span>
                        </div>
"#,
            lang.bytes,
            escape_html(&lang.name),
            lang.percent
        );
    }

    format!(
        r#"            <div class="card">
                <div class="card-header"><h2>Languages</h2></div>
                <div class="card-body">
                    <div class="languages-bar">
{bar}                    </div>
                    <div class="languages-list">
{list}                    </div>
                </div>
            </div>"#
    )
}

/// JSON for an inline `<script>`; `</` is escaped so the data cannot close
/// the element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).context("Failed to serialize dashboard data")?;
    Ok(json.replace("</", "<\\/"))
}

fn render_data(snapshot: &MetricsSnapshot) -> Result<String> {
    let series = ChartSeries::recent(snapshot);
    let period_days: serde_json::Map<String, serde_json::Value> = Period::ALL
        .into_iter()
        .map(|p| (p.key().to_string(), p.chart_days().into()))
        .collect();

    Ok(format!(
        "        const allDates = {};
        const allCommits = {};
        const allAdditions = {};
        const allDeletions = {};
        const periodData = {};
        const periodDays = {};
        const defaultPeriod = {};",
        script_json(&series.dates)?,
        script_json(&series.commits)?,
        script_json(&series.additions)?,
        script_json(&series.deletions)?,
        script_json(&snapshot.summary)?,
        script_json(&period_days)?,
        script_json(DEFAULT_PERIOD.key())?,
    ))
}

const INLINE_CSS: &str = r#"
        :root {
            --color-canvas-default: #ffffff;
            --color-canvas-subtle: #f6f8fa;
            --color-border-default: #d0d7de;
            --color-border-muted: #d8dee4;
            --color-fg-default: #1F2328;
            --color-fg-muted: #656d76;
            --color-fg-subtle: #6e7781;
            --color-accent-fg: #0969da;
            --color-success-fg: #1a7f37;
            --color-danger-fg: #d1242f;
        }
        @media (prefers-color-scheme: dark) {
            :root {
                --color-canvas-default: #0d1117;
                --color-canvas-subtle: #161b22;
                --color-border-default: #30363d;
                --color-border-muted: #21262d;
                --color-fg-default: #e6edf3;
                --color-fg-muted: #8d96a0;
                --color-fg-subtle: #6e7681;
                --color-accent-fg: #58a6ff;
                --color-success-fg: #3fb950;
                --color-danger-fg: #f85149;
            }
        }
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", "Noto Sans", Helvetica, Arial, sans-serif;
            font-size: 14px;
            line-height: 1.5;
            background: var(--color-canvas-default);
            color: var(--color-fg-default);
        }
        .container { max-width: 1280px; margin: 0 auto; padding: 24px 32px; }
        .header {
            display: flex; align-items: center; gap: 16px;
            padding-bottom: 16px; margin-bottom: 16px;
            border-bottom: 1px solid var(--color-border-muted);
        }
        .avatar {
            width: 48px; height: 48px; border-radius: 50%;
            background: var(--color-canvas-subtle);
            border: 1px solid var(--color-border-default);
            display: flex; align-items: center; justify-content: center;
            font-size: 24px;
        }
        .header-info h1 { font-size: 20px; font-weight: 600; }
        .header-info .subtitle { color: var(--color-fg-muted); }
        .header-info .updated { font-size: 12px; color: var(--color-fg-subtle); margin-top: 2px; }
        .nav-tabs { display: flex; gap: 8px; margin-bottom: 24px; border-bottom: 1px solid var(--color-border-muted); }
        .nav-tab {
            padding: 8px 16px; font-size: 14px; font-weight: 500;
            color: var(--color-fg-muted); background: none; border: none;
            border-bottom: 2px solid transparent; cursor: pointer; margin-bottom: -1px;
        }
        .nav-tab:hover { color: var(--color-fg-default); }
        .nav-tab.active { color: var(--color-fg-default); border-bottom-color: #fd8c73; }
        .stats-row { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; margin-bottom: 24px; }
        .stat-box { background: var(--color-canvas-subtle); border: 1px solid var(--color-border-default); border-radius: 6px; padding: 16px; }
        .stat-box .label { font-size: 12px; font-weight: 500; color: var(--color-fg-muted); text-transform: uppercase; letter-spacing: 0.5px; margin-bottom: 4px; }
        .stat-box .value { font-size: 32px; font-weight: 600; line-height: 1.2; }
        .stat-box .value.additions { color: var(--color-success-fg); }
        .stat-box .value.deletions { color: var(--color-danger-fg); }
        .stat-box .value.commits { color: var(--color-accent-fg); }
        .stat-box .change { font-size: 12px; color: var(--color-fg-muted); margin-top: 4px; }
        .card { background: var(--color-canvas-subtle); border: 1px solid var(--color-border-default); border-radius: 6px; margin-bottom: 16px; }
        .card-header { padding: 16px; border-bottom: 1px solid var(--color-border-muted); }
        .card-header h2 { font-size: 14px; font-weight: 600; }
        .card-body { padding: 16px; }
        .card-body.flush { padding: 0; }
        .chart-container { position: relative; height: 230px; }
        .two-columns { display: grid; grid-template-columns: 2fr 1fr; gap: 16px; }
        @media (max-width: 900px) { .two-columns { grid-template-columns: 1fr; } }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 12px 16px; text-align: left; border-bottom: 1px solid var(--color-border-muted); }
        th { font-weight: 600; }
        tr:last-child td { border-bottom: none; }
        .repo-name a { color: var(--color-accent-fg); text-decoration: none; font-weight: 600; }
        .repo-name a:hover { text-decoration: underline; }
        .text-success { color: var(--color-success-fg); }
        .text-danger { color: var(--color-danger-fg); }
        .languages-bar { height: 8px; border-radius: 6px; overflow: hidden; display: flex; margin-bottom: 12px; }
        .lang-segment { height: 100%; }
        .languages-list { display: flex; flex-wrap: wrap; gap: 16px; }
        .lang-item { display: flex; align-items: center; gap: 6px; font-size: 12px; }
        .lang-dot { width: 10px; height: 10px; border-radius: 50%; }
        .lang-name { font-weight: 500; }
        .lang-percent { color: var(--color-fg-muted); }
        .footer {
            text-align: center; padding: 32px 16px; font-size: 12px;
            color: var(--color-fg-muted); border-top: 1px solid var(--color-border-muted); margin-top: 32px;
        }
        .footer a { color: var(--color-accent-fg); text-decoration: none; }
"#;

const INLINE_JS: &str = r#"
        const isDark = window.matchMedia('(prefers-color-scheme: dark)').matches;
        const gridColor = isDark ? '#30363d' : '#d0d7de';
        const textColor = isDark ? '#8d96a0' : '#656d76';
        const barColor = isDark ? '#238636' : '#1f883d';
        const addColor = isDark ? '#3fb950' : '#1a7f37';
        const delColor = isDark ? '#f85149' : '#d1242f';

        function getDataForPeriod(period) {
            const days = Math.min(periodDays[period], allDates.length);
            const start = allDates.length - days;
            return {
                dates: allDates.slice(start),
                commits: allCommits.slice(start),
                additions: allAdditions.slice(start),
                deletions: allDeletions.slice(start)
            };
        }

        function fmt(n) {
            if (n >= 1e6) return (n / 1e6).toFixed(1) + 'M';
            if (n >= 1e3) return (n / 1e3).toFixed(1) + 'K';
            return String(n);
        }

        const tooltip = {
            backgroundColor: isDark ? '#161b22' : '#fff',
            titleColor: isDark ? '#e6edf3' : '#1F2328',
            bodyColor: textColor,
            borderColor: gridColor,
            borderWidth: 1,
            padding: 12
        };
        const xAxis = {
            grid: { display: false },
            ticks: { color: textColor, maxRotation: 0, autoSkip: true, maxTicksLimit: 12 },
            border: { color: gridColor }
        };

        const commitsChart = new Chart(document.getElementById('commitsChart'), {
            type: 'bar',
            data: {
                labels: [],
                datasets: [{ label: 'Commits', data: [], backgroundColor: barColor, borderRadius: 3, barPercentage: 0.7 }]
            },
            options: {
                responsive: true,
                maintainAspectRatio: false,
                plugins: { legend: { display: false }, tooltip: { ...tooltip, displayColors: false } },
                scales: {
                    x: xAxis,
                    y: { beginAtZero: true, grid: { color: gridColor }, ticks: { color: textColor, stepSize: 1 }, border: { display: false } }
                }
            }
        });

        const linesChart = new Chart(document.getElementById('linesChart'), {
            type: 'line',
            data: {
                labels: [],
                datasets: [
                    { label: 'Additions', data: [], borderColor: addColor, backgroundColor: addColor + '20', fill: true, tension: 0.3, pointRadius: 0, pointHoverRadius: 4, yAxisID: 'y' },
                    { label: 'Deletions', data: [], borderColor: delColor, backgroundColor: delColor + '20', fill: true, tension: 0.3, pointRadius: 0, pointHoverRadius: 4, yAxisID: 'y1' }
                ]
            },
            options: {
                responsive: true,
                maintainAspectRatio: false,
                interaction: { mode: 'index', intersect: false },
                plugins: {
                    legend: { display: true, position: 'top', labels: { color: textColor, boxWidth: 12, padding: 16 } },
                    tooltip: { ...tooltip, callbacks: { label: (ctx) => ctx.dataset.label + ': ' + fmt(ctx.raw) } }
                },
                scales: {
                    x: xAxis,
                    y: {
                        type: 'linear', position: 'left', beginAtZero: true,
                        grid: { color: gridColor },
                        ticks: { color: addColor, callback: (v) => fmt(v) },
                        title: { display: true, text: 'Additions', color: addColor },
                        border: { display: false }
                    },
                    y1: {
                        type: 'linear', position: 'right', beginAtZero: true,
                        grid: { drawOnChartArea: false },
                        ticks: { color: delColor, callback: (v) => fmt(v) },
                        title: { display: true, text: 'Deletions', color: delColor },
                        border: { display: false }
                    }
                }
            }
        });

        function updateCharts(period) {
            const data = getDataForPeriod(period);
            const labels = data.dates.map(d => d.slice(5));

            commitsChart.data.labels = labels;
            commitsChart.data.datasets[0].data = data.commits;
            commitsChart.update();

            linesChart.data.labels = labels;
            linesChart.data.datasets[0].data = data.additions;
            linesChart.data.datasets[1].data = data.deletions;
            linesChart.update();
        }

        function updateStats(period) {
            const d = periodData[period];
            document.getElementById('stat-commits').textContent = d.commits;
            document.getElementById('stat-additions').textContent = '+' + fmt(d.additions);
            document.getElementById('stat-deletions').textContent = '-' + fmt(d.deletions);
            document.getElementById('stat-net').textContent = fmt(d.additions - d.deletions);
        }

        updateCharts(defaultPeriod);

        document.querySelectorAll('.nav-tab').forEach(tab => {
            tab.onclick = () => {
                document.querySelectorAll('.nav-tab').forEach(t => t.classList.remove('active'));
                tab.classList.add('active');
                updateStats(tab.dataset.period);
                updateCharts(tab.dataset.period);
            };
        });
"#;
