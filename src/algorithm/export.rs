use super::scheduler::ScheduleOutcome;
use crate::error::Result;
use crate::excel::safe_file_stem;
use crate::models::{Assignment, FacultySlot, WeekGrid, Weekday, slot_labels};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub const DIVISION_TIMETABLES_FILE: &str = "division_timetables.json";
pub const FACULTY_TIMETABLES_FILE: &str = "faculty_timetables.json";
pub const UNASSIGNED_FILE: &str = "unassigned_sessions.json";
pub const TEACHER_PAIRS_FILE: &str = "teacher_subject_pairs.json";

/// Cell text in a division sheet: subject, optional batch, faculty, room.
pub fn division_cell_text(a: &Assignment) -> String {
    let batch = a.batch.as_ref().map(|b| format!("\n({})", b)).unwrap_or_default();
    format!("{}{}\n({})\n[{}]", a.subject, batch, a.faculty, a.room)
}

/// Cell text in a faculty sheet: division, subject, room.
pub fn faculty_cell_text(s: &FacultySlot) -> String {
    format!("{}\n{}\n[{}]", s.division, s.subject, s.room)
}

fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value)?)?;
    Ok(path)
}

/// Write one grid as a styled single-sheet workbook: weekdays across,
/// slot labels down.
pub fn write_grid_xlsx<T, F>(grid: &WeekGrid<T>, cell_text: F, path: &Path) -> Result<()>
where
    F: Fn(&T) -> String,
{
    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_background_color(Color::RGB(0xDDEBF7));
    let cell = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Timetable")?;
    for col in 0..=Weekday::ALL.len() as u16 {
        sheet.set_column_width(col, 25)?;
    }
    for (i, day) in Weekday::ALL.iter().enumerate() {
        sheet.write_string_with_format(0, i as u16 + 1, day.as_str(), &header)?;
    }
    for (row, label) in slot_labels().iter().enumerate() {
        let row = row as u32 + 1;
        sheet.write_string_with_format(row, 0, label, &header)?;
        for (i, day) in Weekday::ALL.iter().enumerate() {
            let text = grid.get(*day, row as usize - 1).map(&cell_text).unwrap_or_default();
            sheet.write_string_with_format(row, i as u16 + 1, &text, &cell)?;
        }
    }
    workbook.save(path)?;
    Ok(())
}

/// Remove every regular file in `dir` (the directory itself is kept).
/// Files that vanish while cleaning are ignored.
pub fn clean_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    for entry in fs::read_dir(dir)?.flatten() {
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        match fs::remove_file(&p) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Output directory shared by every generation. A run replaces the whole
/// content under a lock, so the directory always holds exactly one run.
#[derive(Debug)]
pub struct OutputDir {
    path: PathBuf,
    lock: Mutex<()>,
}

impl OutputDir {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        OutputDir { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clean the directory and export `outcome` into it.
    pub fn replace(&self, outcome: &ScheduleOutcome, xlsx: bool) -> Result<Vec<PathBuf>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        clean_dir(&self.path)?;
        export_outcome(outcome, &self.path, xlsx)
    }
}

/// Export the outcome as JSON files and, when `xlsx` is set, one workbook
/// per division (`timetable_<name>.xlsx`) and per teacher
/// (`faculty_<name>.xlsx`). Returns the written paths.
pub fn export_outcome(outcome: &ScheduleOutcome, out_dir: &Path, xlsx: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut written = vec![
        write_json(out_dir, DIVISION_TIMETABLES_FILE, &outcome.division_timetables)?,
        write_json(out_dir, FACULTY_TIMETABLES_FILE, &outcome.faculty_timetables)?,
        write_json(out_dir, UNASSIGNED_FILE, &outcome.unassigned)?,
        write_json(out_dir, TEACHER_PAIRS_FILE, &outcome.teacher_subject_pairs)?,
    ];

    if xlsx {
        for (name, grid) in &outcome.division_timetables {
            let path = out_dir.join(format!("timetable_{}.xlsx", safe_file_stem(name)));
            write_grid_xlsx(grid, division_cell_text, &path)?;
            log::info!("Exported styled timetable for {} -> {}", name, path.display());
            written.push(path);
        }
        for (name, grid) in &outcome.faculty_timetables {
            if grid.is_empty() {
                continue;
            }
            let path = out_dir.join(format!("faculty_{}.xlsx", safe_file_stem(name)));
            write_grid_xlsx(grid, faculty_cell_text, &path)?;
            written.push(path);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionKind;

    #[test]
    fn cell_texts() {
        let a = Assignment {
            subject: "DBMS Lab".to_string(),
            faculty: "Ms. Roy".to_string(),
            room: "CL-404".to_string(),
            kind: SessionKind::Practical,
            batch: Some("Batch 2".to_string()),
        };
        assert_eq!(division_cell_text(&a), "DBMS Lab\n(Batch 2)\n(Ms. Roy)\n[CL-404]");
        let f = FacultySlot {
            division: "CSE-5-A".to_string(),
            subject: "DBMS".to_string(),
            room: "CR-302".to_string(),
            kind: SessionKind::Theory,
        };
        assert_eq!(faculty_cell_text(&f), "CSE-5-A\nDBMS\n[CR-302]");
    }

    #[test]
    fn clean_dir_ignores_missing_directory_entries() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fresh");
        clean_dir(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn clean_dir_keeps_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old.json"), "{}").unwrap();
        clean_dir(dir.path()).unwrap();
        assert!(dir.path().exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
