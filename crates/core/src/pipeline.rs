use crate::categories::{self, CategoryRule};
use crate::config::AppConfig;
use crate::logbook::MoveLog;
use crate::placer::{self, Placement};
use crate::scanner::{self, ScanOptions};
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizeOptions {
    pub recursive: bool,
    pub dry_run: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct OrganizeSummary {
    pub discovered: usize,
    pub moved: usize,
    pub planned: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct OrganizeOutcome {
    pub path: PathBuf,
    pub placement: Placement,
}

#[derive(Debug)]
pub struct OrganizeRun {
    pub summary: OrganizeSummary,
    pub outcomes: Vec<OrganizeOutcome>,
}

/// One batch pass: stream candidates from the scanner and place each to
/// completion before the next. Per-file problems are counted as skips; the
/// run itself only fails for run-level problems (missing source directory,
/// unopenable log).
pub async fn run_organize(cfg: &AppConfig, opts: OrganizeOptions) -> anyhow::Result<OrganizeRun> {
    let source = cfg.source_root()?;
    anyhow::ensure!(
        source.is_dir(),
        "source directory does not exist: {}",
        source.display()
    );
    let dest_root = cfg.destination_root(&source);
    let rules = load_rules(cfg)?;
    let log_path = cfg.log_path(&dest_root);
    let mut log = if opts.dry_run {
        MoveLog::disabled(&log_path)
    } else {
        MoveLog::open(&log_path)?
    };

    // Prune the generated subtree only when the destination sits strictly
    // inside the source; when both are the same folder the AlreadyPlaced
    // check keeps recursive re-scans from touching placed files.
    let prune =
        (dest_root != source && dest_root.starts_with(&source)).then(|| dest_root.clone());

    info!(
        source = %source.display(),
        dest = %dest_root.display(),
        recursive = opts.recursive,
        dry_run = opts.dry_run,
        "starting organize pass"
    );

    let scan_opts = ScanOptions {
        recursive: opts.recursive,
        excludes: cfg.source.exclude.clone(),
    };
    let (mut rx, walker) = scanner::spawn_walker(source.clone(), prune, scan_opts)?;

    let mut summary = OrganizeSummary::default();
    let mut outcomes = Vec::new();
    while let Some(candidate) = rx.recv().await {
        summary.discovered += 1;
        let placement = placer::place(&candidate.path, &dest_root, &rules, &mut log, opts.dry_run);
        match &placement {
            Placement::Moved(_) => summary.moved += 1,
            Placement::Planned(_) => summary.planned += 1,
            Placement::Skipped(_) => summary.skipped += 1,
        }
        outcomes.push(OrganizeOutcome {
            path: candidate.path,
            placement,
        });
    }
    walker.await.context("walker task")?;

    info!(
        discovered = summary.discovered,
        moved = summary.moved,
        planned = summary.planned,
        skipped = summary.skipped,
        "organize pass complete"
    );
    Ok(OrganizeRun { summary, outcomes })
}

pub fn load_rules(cfg: &AppConfig) -> anyhow::Result<Vec<CategoryRule>> {
    match &cfg.rules.path {
        Some(dir) => categories::load_rules_from_dir(Path::new(dir)),
        None => Ok(categories::default_rules()),
    }
}
