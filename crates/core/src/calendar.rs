use chrono::{DateTime, Datelike, Local};
use serde::Serialize;
use std::time::SystemTime;

// Folder names stay Spanish; they already exist on users' disks.
pub const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Year / month-name / half-month triple a file is bucketed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBucket {
    pub year: i32,
    pub month: &'static str,
    pub half: &'static str,
}

/// Buckets a date: half is "1-15" iff day-of-month <= 15, else "16-31".
pub fn bucket(date: DateTime<Local>) -> DateBucket {
    DateBucket {
        year: date.year(),
        month: MONTH_NAMES[date.month0() as usize],
        half: if date.day() <= 15 { "1-15" } else { "16-31" },
    }
}

pub fn bucket_for_mtime(mtime: SystemTime) -> DateBucket {
    bucket(DateTime::<Local>::from(mtime))
}
