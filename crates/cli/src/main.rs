use anyhow::Result;
use clap::{Parser, Subcommand};
use downsort_core::config;
use downsort_core::config::AppConfig;
use downsort_core::pipeline::{self, OrganizeOptions, OrganizeRun};
use downsort_core::placer::Placement;
mod watch;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Organize {
            path,
            recursive,
            dry_run,
            json,
        } => run_organize(cfg, path, recursive, dry_run, json).await,
        Commands::Watch { path } => {
            let cfg = with_source(cfg, path);
            watch::watch_downloads(cfg).await
        }
    }
}

#[derive(Parser)]
#[command(name = "downsort")]
#[command(about = "Sorts downloads into category and date subfolders", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot pass over a folder
    Organize {
        /// Folder to organize (defaults to the user's Downloads directory)
        #[arg(short, long)]
        path: Option<String>,
        /// Also organize files inside subfolders
        #[arg(short, long, default_value_t = false)]
        recursive: bool,
        /// Print destinations without moving anything
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Organize existing files, then keep watching for new downloads
    Watch {
        /// Folder to watch (defaults to the user's Downloads directory)
        #[arg(short, long)]
        path: Option<String>,
    },
}

fn with_source(mut cfg: AppConfig, path: Option<String>) -> AppConfig {
    if let Some(p) = path {
        cfg.source.root = Some(p);
    }
    cfg
}

async fn run_organize(
    cfg: AppConfig,
    path: Option<String>,
    recursive: bool,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let cfg = with_source(cfg, path);
    let dry_run = dry_run || cfg.safety.dry_run;
    let run = pipeline::run_organize(&cfg, OrganizeOptions { recursive, dry_run }).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary_json(&run, dry_run))?);
        return Ok(());
    }

    for outcome in &run.outcomes {
        match &outcome.placement {
            Placement::Moved(record) => println!(
                "[MOVE] {} -> {}",
                record.source.display(),
                record.destination.display()
            ),
            Placement::Planned(decision) => println!(
                "[PLAN] {} -> {}",
                decision.source.display(),
                decision.destination.display()
            ),
            Placement::Skipped(reason) if reason.is_failure() => {
                eprintln!("[SKIP] {}: {}", outcome.path.display(), reason)
            }
            Placement::Skipped(_) => {}
        }
    }
    println!(
        "organize summary: discovered={}, moved={}, planned={}, skipped={}",
        run.summary.discovered, run.summary.moved, run.summary.planned, run.summary.skipped
    );
    Ok(())
}

fn summary_json(run: &OrganizeRun, dry_run: bool) -> serde_json::Value {
    let moves: Vec<serde_json::Value> = run
        .outcomes
        .iter()
        .filter_map(|outcome| match &outcome.placement {
            Placement::Moved(record) => Some(serde_json::json!({
                "from": record.source,
                "to": record.destination,
            })),
            Placement::Planned(decision) => Some(serde_json::json!({
                "from": decision.source,
                "to": decision.destination,
                "planned": true,
            })),
            Placement::Skipped(_) => None,
        })
        .collect();
    serde_json::json!({
        "status": "ok",
        "mode": if dry_run { "dry-run" } else { "organize" },
        "discovered": run.summary.discovered,
        "moved": run.summary.moved,
        "planned": run.summary.planned,
        "skipped": run.summary.skipped,
        "moves": moves,
    })
}
