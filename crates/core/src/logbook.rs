//! Append-only move log, one human-readable line per action.

use crate::models::MoveRecord;
use anyhow::Context;
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const LOG_FILE_NAME: &str = "_downsort.log";

/// Scoped log handle. Opened once per run; every record is flushed so the
/// log survives an interrupted watch session. A disabled log (dry runs)
/// keeps the path for self-exclusion checks but writes nothing.
pub struct MoveLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl MoveLog {
    pub fn open(path: &Path) -> anyhow::Result<MoveLog> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening move log {}", path.display()))?;
        Ok(MoveLog {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Log that records nothing but still knows its own path.
    pub fn disabled(path: &Path) -> MoveLog {
        MoveLog {
            path: path.to_path_buf(),
            writer: None,
        }
    }

    pub fn default_path(dest_root: &Path) -> PathBuf {
        dest_root.join(LOG_FILE_NAME)
    }

    /// The log file must never be placed by the engine itself.
    pub fn is_log_path(&self, path: &Path) -> bool {
        path == self.path
    }

    pub fn record_move(&mut self, record: &MoveRecord) -> io::Result<()> {
        let line = format!(
            "[{}] MOVE {} -> {}",
            record.moved_at.format("%Y-%m-%d %H:%M:%S"),
            record.source.display(),
            record.destination.display()
        );
        self.append(&line)
    }

    pub fn record_skip(&mut self, path: &Path, reason: &dyn Display) -> io::Result<()> {
        let line = format!(
            "[{}] SKIP {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            path.display(),
            reason
        );
        self.append(&line)
    }

    fn append(&mut self, line: &str) -> io::Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for MoveLog {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}
