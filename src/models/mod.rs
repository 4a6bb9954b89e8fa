// Core data: divisions, subjects and sessions.

mod grid;

pub use grid::WeekGrid;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// First teaching hour of the day (08:00).
pub const FIRST_HOUR: u32 = 8;
/// Hourly slots per day, 08:00 to 18:00.
pub const N_SLOTS: usize = 10;

/// Label of an hourly slot, e.g. `"08:00-09:00"`.
pub fn slot_label(slot_idx: usize) -> String {
    let start = FIRST_HOUR as usize + slot_idx;
    format!("{:02}:00-{:02}:00", start, start + 1)
}

pub fn slot_labels() -> Vec<String> {
    (0..N_SLOTS).map(slot_label).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }

    /// Three-letter lowercase key used by visiting-faculty availability maps.
    pub fn short(self) -> &'static str {
        match self {
            Weekday::Monday => "mon",
            Weekday::Tuesday => "tue",
            Weekday::Wednesday => "wed",
            Weekday::Thursday => "thu",
            Weekday::Friday => "fri",
            Weekday::Saturday => "sat",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Accepts full names and three-letter prefixes in any case.
    pub fn parse(s: &str) -> Option<Weekday> {
        let lower = s.trim().to_lowercase();
        if lower.len() < 3 {
            return None;
        }
        Weekday::ALL
            .into_iter()
            .find(|d| lower.starts_with(d.short()) && d.as_str().to_lowercase().starts_with(&lower))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    #[default]
    Morning,
    Evening,
}

fn one() -> u32 {
    1
}

/// A course taught to one division, as read from the uploaded sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    #[serde(rename = "Theory", default)]
    pub theory: u32,
    #[serde(rename = "Pra", default)]
    pub practical: u32,
    #[serde(rename = "Tut", default)]
    pub tutorial: u32,
    #[serde(rename = "Credits", default)]
    pub credits: u32,
    #[serde(rename = "Batches", default = "one")]
    pub batches: u32,
    #[serde(default)]
    pub batch_faculty: Vec<String>,
    #[serde(default)]
    pub visiting: bool,
    #[serde(default)]
    pub faculty: String,
    /// Elective group id; 0 means core subject.
    #[serde(default)]
    pub elective: u32,
    #[serde(default)]
    pub combined_class: Vec<String>,
    /// Visiting faculty availability: `"mon"` -> one flag per slot.
    #[serde(default)]
    pub vf_timing: BTreeMap<String, Vec<u8>>,
}

impl Subject {
    pub fn new(name: &str, faculty: &str) -> Self {
        Subject {
            name: name.to_string(),
            theory: 0,
            practical: 0,
            tutorial: 0,
            credits: 0,
            batches: 1,
            batch_faculty: Vec::new(),
            visiting: false,
            faculty: faculty.to_string(),
            elective: 0,
            combined_class: Vec::new(),
            vf_timing: BTreeMap::new(),
        }
    }

    /// True when the visiting teacher declared availability and the given
    /// slot falls outside it.
    pub fn outside_vf_window(&self, day: Weekday, slot_idx: usize, duration: usize) -> bool {
        if !self.visiting || self.vf_timing.is_empty() {
            return false;
        }
        match self.vf_timing.get(day.short()) {
            Some(slots) => (0..duration).any(|j| slots.get(slot_idx + j).copied().unwrap_or(0) == 0),
            None => true,
        }
    }
}

/// A class/section with its own weekly timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub division: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub morning_or_evening: Shift,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    /// Floors this division may use; empty means any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dept_floors: Vec<u32>,
}

impl Division {
    pub fn new(name: &str, subjects: Vec<Subject>) -> Self {
        Division {
            division: name.to_string(),
            department: "Unknown".to_string(),
            morning_or_evening: Shift::Morning,
            subjects,
            dept_floors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Theory,
    Tutorial,
    Practical,
    #[serde(rename = "Theory (Elective)")]
    Elective,
}

impl SessionKind {
    /// Theory-like sessions count towards the continuous-theory limit.
    pub fn is_theory_like(self) -> bool {
        !matches!(self, SessionKind::Practical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Theory => "Theory",
            SessionKind::Tutorial => "Tutorial",
            SessionKind::Practical => "Practical",
            SessionKind::Elective => "Theory (Elective)",
        }
    }
}

/// What a division sees in one of its slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub subject: String,
    pub faculty: String,
    pub room: String,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
}

/// What a teacher sees in one of their slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultySlot {
    pub division: String,
    pub subject: String,
    pub room: String,
    #[serde(rename = "type")]
    pub kind: SessionKind,
}

/// One-hour whole-class session (theory or tutorial).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WholeClassSession {
    pub division: String,
    pub subject: String,
    pub faculty: String,
    pub duration: u32,
    pub is_lab: bool,
    pub is_tut: bool,
    pub visiting: bool,
    #[serde(rename = "type")]
    pub kind: SessionKind,
}

/// One practical block for a single batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabSession {
    pub subject: String,
    pub faculty: String,
    pub duration: u32,
    pub visiting: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_parse_accepts_prefixes() {
        assert_eq!(Weekday::parse("mon"), Some(Weekday::Monday));
        assert_eq!(Weekday::parse("THURSDAY"), Some(Weekday::Thursday));
        assert_eq!(Weekday::parse("Wedn"), Some(Weekday::Wednesday));
        assert_eq!(Weekday::parse("Sun"), None);
        assert_eq!(Weekday::parse("mo"), None);
        assert_eq!(Weekday::parse("Monkey"), None);
    }

    #[test]
    fn slot_labels_cover_the_day() {
        let labels = slot_labels();
        assert_eq!(labels.len(), N_SLOTS);
        assert_eq!(labels[0], "08:00-09:00");
        assert_eq!(labels[9], "17:00-18:00");
    }

    #[test]
    fn subject_defaults_from_json() {
        let s: Subject = serde_json::from_str(r#"{"name": "Maths", "Theory": 3}"#).unwrap();
        assert_eq!(s.theory, 3);
        assert_eq!(s.batches, 1);
        assert!(s.faculty.is_empty());
    }

    #[test]
    fn vf_window_only_applies_to_visiting() {
        let mut s = Subject::new("Law", "Adv. Rao");
        s.vf_timing.insert("mon".to_string(), vec![0, 1, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert!(!s.outside_vf_window(Weekday::Monday, 0, 1));
        s.visiting = true;
        assert!(s.outside_vf_window(Weekday::Monday, 0, 1));
        assert!(!s.outside_vf_window(Weekday::Monday, 1, 2));
        assert!(s.outside_vf_window(Weekday::Monday, 2, 2));
        assert!(s.outside_vf_window(Weekday::Tuesday, 1, 1));
    }
}
