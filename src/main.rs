mod collect;
mod config;
mod dashboard;
mod github;
mod markdown;
mod period;
mod snapshot;
mod source;
mod stats;
#[cfg(test)]
mod testing;
mod view;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use collect::CollectOptions;
use config::Config;
use github::GithubClient;
use snapshot::{MetricsSnapshot, SNAPSHOT_FILE};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "commit-pulse")]
#[command(about = "Collect per-author commit metrics from GitHub and render a dashboard")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, default_value = "data", help = "Directory holding metrics snapshots")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct RenderArgs {
    #[arg(long, default_value = "docs", help = "Directory for the HTML dashboard")]
    docs_dir: PathBuf,

    #[arg(long, default_value = "README.md", help = "Path of the markdown summary")]
    readme: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Query GitHub and write the metrics snapshot
    Collect,
    /// Render the dashboard and markdown summary from the snapshot
    Render(RenderArgs),
    /// Collect, then render
    Run(RenderArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "commit_pulse=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Collect => run_collect(&cli.data_dir).await,
        Commands::Render(args) => run_render(&cli.data_dir, args),
        Commands::Run(args) => match run_collect(&cli.data_dir).await {
            Ok(()) => run_render(&cli.data_dir, args),
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_collect(data_dir: &Path) -> Result<()> {
    let config = Config::from_env()?;
    info!("Collecting metrics for: {}", config.username);

    let client = GithubClient::new(&config);
    let options = CollectOptions {
        username: &config.username,
        repos_to_track: &config.repos_to_track,
        flag_incomplete: config.flag_incomplete,
    };

    let snapshot = collect::collect(&client, &options, Utc::now()).await;
    let (current, dated) = snapshot.save(data_dir)?;

    let month = &snapshot.summary.month;
    info!(
        "Summary (this month): {} commits, +{} additions, -{} deletions",
        month.commits, month.additions, month.deletions
    );
    info!("Metrics saved to {} and {}", current.display(), dated.display());

    Ok(())
}

fn run_render(data_dir: &Path, args: &RenderArgs) -> Result<()> {
    let snapshot = MetricsSnapshot::load(&data_dir.join(SNAPSHOT_FILE))?;

    fs::create_dir_all(&args.docs_dir)
        .with_context(|| format!("Failed to create {}", args.docs_dir.display()))?;

    let index = args.docs_dir.join("index.html");
    fs::write(&index, dashboard::render_dashboard(&snapshot)?)
        .with_context(|| format!("Failed to write {}", index.display()))?;
    info!("Wrote {}", index.display());

    fs::write(&args.readme, markdown::render_markdown(&snapshot))
        .with_context(|| format!("Failed to write {}", args.readme.display()))?;
    info!("Wrote {}", args.readme.display());

    Ok(())
}
