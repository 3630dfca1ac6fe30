use crate::calendar::DateBucket;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

/// Pure output of classification: where a file belongs, derived only from
/// its extension and modification time.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementDecision {
    pub source: PathBuf,
    pub file_name: String,
    pub category: String,
    pub bucket: DateBucket,
    pub destination: PathBuf,
}

/// One executed move. Appended to the move log, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct MoveRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub moved_at: DateTime<Local>,
}
