//! The placement engine: decides a destination and moves a file there once.

use crate::calendar;
use crate::categories::{self, CategoryRule};
use crate::logbook::MoveLog;
use crate::models::{MoveRecord, PlacementDecision};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("not a regular file")]
    NotAFile,
    #[error("download still in progress")]
    TemporaryDownload,
    #[error("the move log is never placed")]
    LogFile,
    #[error("already at its destination")]
    AlreadyPlaced,
    #[error("source vanished before the move")]
    SourceVanished,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl SkipReason {
    /// Policy skips are expected traffic; only genuine failures are worth
    /// a log line.
    pub fn is_failure(&self) -> bool {
        matches!(self, SkipReason::SourceVanished | SkipReason::Io(_))
    }
}

#[derive(Debug)]
pub enum Placement {
    Moved(MoveRecord),
    Planned(PlacementDecision),
    Skipped(SkipReason),
}

/// Computes the destination for a file with the given modification date.
/// Deterministic in (extension, date); never touches the filesystem.
pub fn plan(
    source: &Path,
    modified: DateTime<Local>,
    rules: &[CategoryRule],
    dest_root: &Path,
) -> PlacementDecision {
    let extension = source.extension().and_then(|e| e.to_str()).unwrap_or("");
    let category = categories::classify(rules, extension).to_string();
    let bucket = calendar::bucket(modified);
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let destination = dest_root
        .join(&category)
        .join(bucket.year.to_string())
        .join(bucket.month)
        .join(bucket.half)
        .join(&file_name);
    PlacementDecision {
        source: source.to_path_buf(),
        file_name,
        category,
        bucket,
        destination,
    }
}

/// Classifies and moves one file under the destination root. Per-file
/// problems become a `Skipped` outcome; this function never fails a run.
pub fn place(
    source: &Path,
    dest_root: &Path,
    rules: &[CategoryRule],
    log: &mut MoveLog,
    dry_run: bool,
) -> Placement {
    match try_place(source, dest_root, rules, log, dry_run) {
        Ok(placement) => placement,
        Err(reason) => {
            if reason.is_failure() {
                warn!(path = %source.display(), %reason, "skipping file");
                if let Err(e) = log.record_skip(source, &reason) {
                    warn!(error = %e, "could not write to move log");
                }
            } else {
                debug!(path = %source.display(), %reason, "skipping file");
            }
            Placement::Skipped(reason)
        }
    }
}

fn try_place(
    source: &Path,
    dest_root: &Path,
    rules: &[CategoryRule],
    log: &mut MoveLog,
    dry_run: bool,
) -> Result<Placement, SkipReason> {
    if log.is_log_path(source) {
        return Err(SkipReason::LogFile);
    }
    if categories::is_temp_download(source) {
        return Err(SkipReason::TemporaryDownload);
    }
    let meta = match fs::metadata(source) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(SkipReason::SourceVanished),
        Err(e) => return Err(SkipReason::Io(e)),
    };
    if !meta.is_file() {
        return Err(SkipReason::NotAFile);
    }
    let modified = DateTime::<Local>::from(meta.modified()?);

    let decision = plan(source, modified, rules, dest_root);
    // A file already sitting in its bucket stays put; duplicate events and
    // recursive re-scans are no-ops.
    if source.parent() == decision.destination.parent() {
        return Err(SkipReason::AlreadyPlaced);
    }

    if dry_run {
        return Ok(Placement::Planned(decision));
    }

    if let Some(dir) = decision.destination.parent() {
        fs::create_dir_all(dir)?;
    }
    let target = resolve_collision(&decision.destination);
    move_file(source, &target)?;

    let record = MoveRecord {
        source: source.to_path_buf(),
        destination: target,
        moved_at: Local::now(),
    };
    if let Err(e) = log.record_move(&record) {
        warn!(error = %e, "could not write to move log");
    }
    Ok(Placement::Moved(record))
}

/// Picks a free destination name. While the name is taken, appends `_{n}`
/// before the extension, counting from 1. Never overwrites.
fn resolve_collision(dest: &Path) -> PathBuf {
    if !dest.exists() {
        return dest.to_path_buf();
    }
    let stem = dest
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_string();
    let ext = dest
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string();
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut counter = 1;
    loop {
        let name = if ext.is_empty() {
            format!("{}_{}", stem, counter)
        } else {
            format!("{}_{}.{}", stem, counter, ext)
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

fn move_file(from: &Path, to: &Path) -> Result<(), SkipReason> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SkipReason::SourceVanished),
        Err(_) => {
            // rename cannot cross filesystems; fall back to copy + delete.
            fs::copy(from, to).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => SkipReason::SourceVanished,
                _ => SkipReason::Io(e),
            })?;
            fs::remove_file(from)?;
            Ok(())
        }
    }
}
