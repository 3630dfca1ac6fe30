use anyhow::Result;
use downsort_core::config::AppConfig;
use downsort_core::logbook::MoveLog;
use downsort_core::pipeline::{self, OrganizeOptions};
use downsort_core::placer::{self, Placement};
use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

pub async fn watch_downloads(cfg: AppConfig) -> Result<()> {
    let source = cfg.source_root()?;
    anyhow::ensure!(
        source.is_dir(),
        "source directory does not exist: {}",
        source.display()
    );
    let dest_root = cfg.destination_root(&source);
    let rules = pipeline::load_rules(&cfg)?;

    // First pass: place whatever is already sitting in the folder.
    let run = pipeline::run_organize(&cfg, OrganizeOptions::default()).await?;
    println!(
        "initial pass: discovered {}, moved {}, skipped {}",
        run.summary.discovered, run.summary.moved, run.summary.skipped
    );

    let log_path = cfg.log_path(&dest_root);
    let mut log = MoveLog::open(&log_path)?;

    let (tx, rx) = channel();
    let mut watcher: RecommendedWatcher = Watcher::new(
        tx,
        notify::Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;
    // Only the root: placed files live in subfolders and are never revisited.
    watcher.watch(&source, RecursiveMode::NonRecursive)?;

    println!("Watching {} ...", source.display());
    loop {
        match rx.recv() {
            Ok(event) => {
                if let Ok(ev) = event {
                    if !is_arrival(&ev.kind) {
                        continue;
                    }
                    for path in ev.paths {
                        if !path.is_file() {
                            continue;
                        }
                        // The browser may still be writing; give it a moment.
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        let placement = placer::place(&path, &dest_root, &rules, &mut log, false);
                        report(&path, placement);
                    }
                }
            }
            Err(e) => eprintln!("watch error: {:?}", e),
        }
    }
}

/// Created files and renames into place count as arrivals (browsers
/// download to a temp name, then rename to the final one). Data-modify
/// events do not; the file is still being written.
pub fn is_arrival(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(_))
    )
}

fn report(path: &Path, placement: Placement) {
    match placement {
        Placement::Moved(record) => println!(
            "[MOVE] {} -> {}",
            record.source.display(),
            record.destination.display()
        ),
        Placement::Skipped(reason) if reason.is_failure() => {
            eprintln!("[SKIP] {}: {}", path.display(), reason)
        }
        _ => {}
    }
}
