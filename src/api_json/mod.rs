use crate::algorithm::ScheduleOutcome;
use crate::error::{Result, TimetableError};
use crate::excel::UploadSummary;
use crate::models::{Assignment, SessionKind, WeekGrid, slot_labels};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Name of the ingested schedule written next to the uploads.
pub const PROCESSED_FILE: &str = "processed_schedule.json";

/// Body returned by `POST /upload`.
///
/// ```json
/// {
///   "message": "File processed successfully",
///   "summary": { "Programs": 4, "Faculty": 31, "Courses": 52 },
///   "processed_file": "processed_schedule.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub summary: UploadSummary,
    pub processed_file: String,
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub processed_file: String,
}

pub fn parse_generate_request(json_str: &str) -> std::result::Result<GenerateRequest, serde_json::Error> {
    serde_json::from_str(json_str)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Theory,
    Practical,
    Tutorial,
}

impl SessionType {
    /// Type from a free-text subject label: "Tut" wins over lab markers.
    pub fn from_label(label: &str) -> SessionType {
        if label.contains("Tut") {
            SessionType::Tutorial
        } else if ["Lab", "(P)", "Practical"].iter().any(|kw| label.contains(kw)) {
            SessionType::Practical
        } else {
            SessionType::Theory
        }
    }

    /// Type of a scheduled session; the subject name plays no part.
    pub fn from_kind(kind: SessionKind) -> SessionType {
        match kind {
            SessionKind::Practical => SessionType::Practical,
            SessionKind::Tutorial => SessionType::Tutorial,
            SessionKind::Theory | SessionKind::Elective => SessionType::Theory,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Theory => "theory",
            SessionType::Practical => "practical",
            SessionType::Tutorial => "tutorial",
        }
    }
}

/// One occupied slot as sent to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub subject: String,
    pub faculty: String,
    pub room: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    #[serde(default)]
    pub batch: Option<String>,
}

impl From<&Assignment> for SessionView {
    fn from(a: &Assignment) -> Self {
        SessionView {
            subject: a.subject.clone(),
            faculty: a.faculty.clone(),
            room: a.room.clone(),
            session_type: SessionType::from_kind(a.kind),
            batch: a.batch.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyLoad {
    pub hours: u32,
    pub courses: Vec<String>,
}

/// Body returned by `POST /generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub message: String,
    pub timetables: BTreeMap<String, WeekGrid<SessionView>>,
    pub teacher_subjects: BTreeMap<String, Vec<(String, String)>>,
    pub unassigned_lectures: BTreeMap<String, Vec<String>>,
    pub faculty_load: BTreeMap<String, FacultyLoad>,
    #[serde(default = "slot_labels")]
    pub slot_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// `" cse_3-a "` -> `"Cse 3 A"`: trim, separators to spaces, then title
/// case (a letter is upper-cased when the previous char is not a letter).
pub fn normalize_division_key(name: &str) -> String {
    let spaced = name.trim().replace(['_', '-'], " ");
    let mut out = String::with_capacity(spaced.len());
    let mut prev_cased = false;
    for ch in spaced.chars() {
        if ch.is_alphabetic() {
            if prev_cased {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(ch);
            prev_cased = false;
        }
    }
    out
}

fn normalize_keys<V: Clone>(map: &BTreeMap<String, V>, what: &str) -> BTreeMap<String, V> {
    let mut out = BTreeMap::new();
    for (name, value) in map {
        let key = normalize_division_key(name);
        if out.insert(key.clone(), value.clone()).is_some() {
            log::warn!("{} for division '{}' collide with another division after normalisation as '{}'", what, name, key);
        }
    }
    out
}

/// Per teacher: one hour per occupied slot across every division grid,
/// plus the sorted set of subjects taught.
pub fn calculate_faculty_load(timetables: &BTreeMap<String, WeekGrid<SessionView>>) -> BTreeMap<String, FacultyLoad> {
    let mut acc: BTreeMap<String, (u32, BTreeSet<String>)> = BTreeMap::new();
    for grid in timetables.values() {
        for (_, _, session) in grid.entries() {
            if session.faculty.is_empty() {
                continue;
            }
            let entry = acc.entry(session.faculty.clone()).or_default();
            entry.0 += 1;
            entry.1.insert(session.subject.clone());
        }
    }
    acc.into_iter()
        .map(|(faculty, (hours, courses))| {
            (faculty, FacultyLoad { hours, courses: courses.into_iter().collect() })
        })
        .collect()
}

fn to_view_grid(grid: &WeekGrid<Assignment>) -> WeekGrid<SessionView> {
    let mut out = WeekGrid::new();
    for (day, slot, a) in grid.entries() {
        out.fill(day, slot, 1, &SessionView::from(a));
    }
    out
}

/// Build the `/generate` payload from a scheduling run.
pub fn build_generate_response(outcome: &ScheduleOutcome) -> Result<GenerateResponse> {
    let grids: BTreeMap<String, WeekGrid<SessionView>> = outcome
        .division_timetables
        .iter()
        .map(|(name, grid)| (name.clone(), to_view_grid(grid)))
        .collect();
    let timetables = normalize_keys(&grids, "timetables");
    if timetables.is_empty() {
        return Err(TimetableError::NoTimetables);
    }

    let faculty_load = calculate_faculty_load(&timetables);
    Ok(GenerateResponse {
        message: format!("{} timetables generated!", timetables.len()),
        teacher_subjects: normalize_keys(&outcome.teacher_subject_pairs, "teacher-subject pairs"),
        unassigned_lectures: normalize_keys(&outcome.unassigned, "unassigned lectures"),
        timetables,
        faculty_load,
        slot_labels: slot_labels(),
        generated_at: Some(chrono::Utc::now()),
    })
}

/// Strip a client-supplied file name down to a safe basename: path parts
/// dropped, whitespace to `_`, only ASCII alphanumerics and `._-` kept,
/// leading dots removed.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}
