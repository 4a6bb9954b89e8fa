//! Ingestion of the uploaded schedule sheet.
//!
//! - `io`: xlsx/xls/ods (calamine) and CSV reading
//! - `columns`: tolerant header resolution
//! - `availability`: visiting-faculty availability from remarks
//! - `ingest`: rows normalised into divisions
//! - `sessions`: hours expanded into concrete sessions

mod columns;
mod io;

pub mod availability;
pub mod ingest;
pub mod sessions;

pub use availability::{parse_availability, parse_combined_classes, availability_to_vf_timing, AvailabilityWindow};
pub use columns::{Column, ColumnMap};
pub use ingest::{normalize_divisions, schedule_from_file, schedule_from_table, ProcessedSchedule, UploadSummary};
pub use io::{parse_csv, read_table};
pub use sessions::{create_sessions, SessionPools};

use crate::error::Result;
use std::fs;
use std::path::Path;

/// Make a name safe to use as a file name component.
pub fn safe_file_stem(name: &str) -> String {
    name.replace(' ', "_").replace('/', "-").replace(['(', ')'], "")
}

/// Write the intermediate ingestion files: `divisions.json`,
/// `whole_class_sessions.json` and one `labs_<division>.json` per division.
pub fn write_session_files<P: AsRef<Path>>(processed: &ProcessedSchedule, out_dir: P) -> Result<()> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join("divisions.json"), serde_json::to_string_pretty(&processed.divisions)?)?;
    fs::write(
        out_dir.join("whole_class_sessions.json"),
        serde_json::to_string_pretty(&processed.sessions.whole_class_sessions)?,
    )?;
    for (div, labs) in &processed.sessions.labs {
        let fname = format!("labs_{}.json", div.replace(' ', "_").replace('/', "_"));
        fs::write(out_dir.join(fname), serde_json::to_string_pretty(labs)?)?;
    }
    log::info!("saved ingestion outputs to {}", out_dir.display());
    Ok(())
}
