use super::availability::{availability_to_vf_timing, parse_availability};
use super::columns::{Column, ColumnMap};
use super::io::read_table;
use super::sessions::{SessionPools, create_sessions};
use crate::error::{Result, TimetableError};
use crate::models::{Division, N_SLOTS, Shift, Subject, Weekday};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Result of ingesting a sheet: divisions plus the derived session pools.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedSchedule {
    pub divisions: Vec<Division>,
    #[serde(flatten)]
    pub sessions: SessionPools,
}

/// Counts shown to the user after an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct UploadSummary {
    #[serde(rename = "Programs")]
    pub programs: usize,
    #[serde(rename = "Faculty")]
    pub faculty: usize,
    #[serde(rename = "Courses")]
    pub courses: usize,
}

impl ProcessedSchedule {
    /// Every faculty name that teaches at least one session.
    pub fn unique_faculty(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for s in &self.sessions.whole_class_sessions {
            out.insert(s.faculty.clone());
        }
        for labs in self.sessions.labs.values() {
            for l in labs {
                out.insert(l.faculty.clone());
            }
        }
        out
    }

    pub fn summary(&self) -> UploadSummary {
        UploadSummary {
            programs: self.divisions.len(),
            faculty: self.unique_faculty().len(),
            courses: self.sessions.whole_class_sessions.len()
                + self.sessions.labs.values().map(Vec::len).sum::<usize>(),
        }
    }
}

/// Upper bound for any weekly hour count read from the sheet.
pub const MAX_WEEKLY_HOURS: u32 = (Weekday::ALL.len() * N_SLOTS) as u32;
/// Upper bound for the number of lab batches of one subject.
pub const MAX_BATCHES: u32 = 10;

struct Row<'a> {
    cells: &'a [String],
    map: &'a ColumnMap,
}

impl<'a> Row<'a> {
    fn get(&self, col: Column) -> Option<&'a str> {
        let i = self.map.get(col)?;
        self.cells.get(i).map(|s| s.trim()).filter(|s| !s.is_empty())
    }

    fn text(&self, col: Column) -> String {
        self.get(col).unwrap_or_default().to_string()
    }

    /// Lenient integer: `"3.0"` -> 3, blanks and garbage -> `default`.
    fn int(&self, col: Column, default: u32) -> u32 {
        match self.get(col).and_then(|s| s.parse::<f64>().ok()) {
            Some(v) if v.is_finite() && v >= 0.0 => v.trunc() as u32,
            Some(_) => 0,
            None => default,
        }
    }

    /// Like `int`, capped at `max` with a warning.
    fn capped(&self, col: Column, default: u32, max: u32) -> u32 {
        let v = self.int(col, default);
        if v > max {
            log::warn!("'{}' value {} is above {}; capped", col.header(), v, max);
            max
        } else {
            v
        }
    }
}

fn division_name(program: &str, semester: &str, division: &str) -> String {
    let mut name = format!("{}-{}", program, semester);
    if !division.is_empty() {
        name.push('-');
        name.push_str(division);
    }
    let name = name.trim_matches('-').trim().to_string();
    if name.is_empty() { "UnknownDivision".to_string() } else { name }
}

fn subject_from_row(row: &Row<'_>) -> Subject {
    let name = row.get(Column::Course).unwrap_or("Unknown").to_string();

    let batch_faculty: Vec<String> = [Column::BatchFaculty1, Column::BatchFaculty2, Column::BatchFaculty3]
        .into_iter()
        .filter_map(|c| row.get(c).map(str::to_string))
        .collect();
    let fallback_batches = std::cmp::max(1, batch_faculty.len() as u32);

    let visiting = row
        .get(Column::CourseType)
        .map(|s| s.to_lowercase().contains("vf"))
        .unwrap_or(false);

    let faculty = match (row.get(Column::TheoryFaculty), batch_faculty.first()) {
        (Some(f), _) => f.to_string(),
        (None, Some(b)) => b.clone(),
        (None, None) => format!("FAC_{}", name),
    };

    let elective = row.int(Column::Elective, 0);
    let combined_class = match row.get(Column::Combined) {
        Some(raw) if elective == 1 => raw
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let remarks = [Column::VfHours, Column::Remarks, Column::Availability]
        .into_iter()
        .find_map(|c| row.get(c));
    let vf_timing = if visiting {
        availability_to_vf_timing(&parse_availability(remarks))
            .into_iter()
            .filter(|(_, slots)| slots.iter().any(|s| *s != 0))
            .collect()
    } else {
        Default::default()
    };

    Subject {
        theory: row.capped(Column::Theory, 0, MAX_WEEKLY_HOURS),
        practical: row.capped(Column::Practical, 0, MAX_WEEKLY_HOURS),
        tutorial: row.capped(Column::Tutorial, 0, MAX_WEEKLY_HOURS),
        credits: row.int(Column::Credits, 0),
        batches: std::cmp::max(1, row.capped(Column::Batches, fallback_batches, MAX_BATCHES)),
        batch_faculty,
        visiting,
        faculty,
        elective,
        combined_class,
        vf_timing,
        name,
    }
}

/// Turn a raw table (header row first) into divisions grouped by
/// (division, department) in first-seen order.
pub fn normalize_divisions(table: &[Vec<String>]) -> Result<Vec<Division>> {
    let header_idx = table
        .iter()
        .position(|r| r.iter().any(|c| !c.trim().is_empty()))
        .ok_or(TimetableError::EmptySheet)?;
    let map = ColumnMap::resolve(&table[header_idx]);
    if !map.contains(Column::Course) {
        log::warn!("no '{}' column found; subjects will be named Unknown", Column::Course.header());
    }

    let mut divisions: Vec<Division> = Vec::new();
    let mut by_key: HashMap<(String, String), usize> = HashMap::new();

    for cells in &table[header_idx + 1..] {
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let row = Row { cells, map: &map };
        let name = division_name(&row.text(Column::Program), &row.text(Column::Semester), &row.text(Column::Division));
        let department = row.get(Column::Department).unwrap_or("Unknown").to_string();
        let subject = subject_from_row(&row);

        let idx = *by_key.entry((name.clone(), department.clone())).or_insert_with(|| {
            divisions.push(Division {
                division: name,
                department,
                morning_or_evening: Shift::Morning,
                subjects: Vec::new(),
                dept_floors: Vec::new(),
            });
            divisions.len() - 1
        });
        divisions[idx].subjects.push(subject);
    }

    log::info!(
        "normalized {} divisions with {} subjects",
        divisions.len(),
        divisions.iter().map(|d| d.subjects.len()).sum::<usize>()
    );
    Ok(divisions)
}

pub fn schedule_from_table(table: &[Vec<String>]) -> Result<ProcessedSchedule> {
    let divisions = normalize_divisions(table)?;
    let sessions = create_sessions(&divisions);
    Ok(ProcessedSchedule { divisions, sessions })
}

/// Read an Excel/CSV sheet and normalise it.
pub fn schedule_from_file<P: AsRef<Path>>(path: P) -> Result<ProcessedSchedule> {
    let table = read_table(path)?;
    schedule_from_table(&table)
}
