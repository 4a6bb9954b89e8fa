// Timetable generation: limits, rooms, the scheduler and result export.
pub mod constraints;
pub mod export;
pub mod rooms;
pub mod scheduler;

pub use constraints::{Limits, Placement, Violation};
pub use export::{OutputDir, clean_dir, export_outcome};
pub use rooms::{RoomPool, floor_of};
pub use scheduler::{ScheduleOutcome, Scheduler, group_sessions, schedule, units_for};

use crate::error::Result;
use crate::models::Division;
use std::path::Path;

/// Load divisions from a JSON file (the processed upload or a
/// `divisions.json` written by the ingestion step).
pub fn load_divisions<P: AsRef<Path>>(path: P) -> Result<Vec<Division>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Schedule and export in one go.
pub fn schedule_and_export(divisions: &[Division], out_dir: &Path, xlsx: bool) -> Result<ScheduleOutcome> {
    let outcome = schedule(divisions);
    export_outcome(&outcome, out_dir, xlsx)?;
    Ok(outcome)
}

/// Schedule, then replace the content of the shared output directory.
pub fn schedule_into(divisions: &[Division], outputs: &OutputDir, xlsx: bool) -> Result<ScheduleOutcome> {
    let outcome = schedule(divisions);
    outputs.replace(&outcome, xlsx)?;
    Ok(outcome)
}
