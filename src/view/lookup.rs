//! Lenient reading of `/generate` responses.
//!
//! Rendering works on `serde_json::Value` so it accepts our own response
//! as well as payloads of another shape: dashed keys, multi-line text
//! cells or pairs written as objects.

use crate::api_json::{SessionType, SessionView, normalize_division_key};
use crate::models::Weekday;
use serde_json::{Map, Value};

/// Keys that may wrap the real per-division map one level down.
const WRAPPER_KEYS: [&str; 4] = ["data", "divisions", "timetables", "result"];

/// Lower-case alphanumerics only: `"CSE-3 A"` -> `"cse3a"`.
pub fn compact_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn match_in<'a>(map: &'a Map<String, Value>, division: &str) -> Option<&'a Value> {
    if let Some(v) = map.get(division) {
        return Some(v);
    }
    let wanted = normalize_division_key(division);
    if let Some((_, v)) = map.iter().find(|(k, _)| normalize_division_key(k) == wanted) {
        return Some(v);
    }
    let wanted = compact_key(division);
    map.iter().find(|(k, _)| compact_key(k) == wanted).map(|(_, v)| v)
}

/// Find the entry for `division` in a per-division map: exact key, then
/// normalised key, then compact key, then the same inside one wrapper key.
pub fn find_division_entry<'a>(map: &'a Value, division: &str) -> Option<&'a Value> {
    let obj = map.as_object()?;
    if let Some(v) = match_in(obj, division) {
        return Some(v);
    }
    WRAPPER_KEYS
        .iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_object))
        .find_map(|inner| match_in(inner, division))
}

/// Division names present in the `timetables` map, in key order.
pub fn division_names(response: &Value) -> Vec<String> {
    response
        .get("timetables")
        .and_then(Value::as_object)
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TeacherSubjectRow {
    pub faculty: String,
    pub subject: String,
}

fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(value_text))
        .unwrap_or_default()
}

fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn row_from_string(s: &str) -> Option<TeacherSubjectRow> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let split = s.split_once(" - ").or_else(|| s.split_once(':'));
    Some(match split {
        Some((faculty, subject)) => TeacherSubjectRow {
            faculty: faculty.trim().to_string(),
            subject: subject.trim().to_string(),
        },
        None => TeacherSubjectRow { faculty: String::new(), subject: s.to_string() },
    })
}

fn row_from_item(item: &Value) -> Option<TeacherSubjectRow> {
    match item {
        Value::Array(pair) => {
            let faculty = pair.first().and_then(value_text).unwrap_or_default();
            let subject = pair.get(1).and_then(value_text).unwrap_or_default();
            (!faculty.is_empty() || !subject.is_empty()).then_some(TeacherSubjectRow { faculty, subject })
        }
        Value::Object(obj) => {
            let faculty = str_field(obj, &["faculty", "teacher", "Faculty", "Teacher"]);
            let subject = str_field(obj, &["subject", "course", "Subject", "Course"]);
            (!faculty.is_empty() || !subject.is_empty()).then_some(TeacherSubjectRow { faculty, subject })
        }
        Value::String(s) => row_from_string(s),
        _ => None,
    }
}

/// Teacher/subject rows from whatever a division entry holds: a list of
/// `[faculty, subject]` pairs, a list of objects or strings, a map of
/// faculty to subject(s), or a single string.
pub fn teacher_subject_rows(entry: &Value) -> Vec<TeacherSubjectRow> {
    let mut rows: Vec<TeacherSubjectRow> = match entry {
        Value::Array(items) => items.iter().filter_map(row_from_item).collect(),
        Value::Object(obj) => obj
            .iter()
            .flat_map(|(faculty, subjects)| {
                let subjects: Vec<String> = match subjects {
                    Value::Array(list) => list.iter().filter_map(value_text).collect(),
                    other => value_text(other).into_iter().collect(),
                };
                subjects.into_iter().map(move |subject| TeacherSubjectRow {
                    faculty: faculty.clone(),
                    subject,
                })
            })
            .collect(),
        Value::String(s) => s.lines().filter_map(row_from_string).collect(),
        _ => Vec::new(),
    };
    rows.sort();
    rows.dedup();
    rows
}

/// Decode one slot: an object with named fields, a multi-line string
/// (`subject\nfaculty\nroom\nbatch`) or null/blank for a free slot.
pub fn decode_session(cell: &Value) -> Option<SessionView> {
    match cell {
        Value::Object(obj) => {
            let subject = str_field(obj, &["subject", "Subject"]);
            if subject.is_empty() {
                return None;
            }
            let session_type = match str_field(obj, &["type", "Type"]).to_lowercase().as_str() {
                "practical" | "lab" => SessionType::Practical,
                "tutorial" => SessionType::Tutorial,
                "theory" => SessionType::Theory,
                _ => SessionType::from_label(&subject),
            };
            let batch = Some(str_field(obj, &["batch", "Batch"])).filter(|b| !b.is_empty());
            Some(SessionView {
                faculty: str_field(obj, &["faculty", "Faculty"]),
                room: str_field(obj, &["room", "Room"]),
                subject,
                session_type,
                batch,
            })
        }
        Value::String(s) => {
            let parts: Vec<&str> = s.trim().split('\n').map(str::trim).collect();
            let subject = parts.first().copied().filter(|p| !p.is_empty())?;
            let part = |i: usize| parts.get(i).map(|p| p.to_string()).unwrap_or_default();
            Some(SessionView {
                subject: subject.to_string(),
                faculty: part(1),
                room: part(2),
                session_type: SessionType::from_label(subject),
                batch: parts.get(3).map(|p| p.to_string()),
            })
        }
        _ => None,
    }
}

/// Slots of `day` in a division timetable; day keys match
/// case-insensitively by full name or three-letter prefix.
pub fn day_sessions(timetable: &Value, day: Weekday) -> Option<&Vec<Value>> {
    let obj = timetable.as_object()?;
    if let Some(v) = obj.get(day.as_str()).and_then(Value::as_array) {
        return Some(v);
    }
    obj.iter()
        .find(|(k, _)| Weekday::parse(k) == Some(day))
        .and_then(|(_, v)| v.as_array())
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacultyLoadRow {
    pub faculty: String,
    pub hours: f64,
    pub course_count: usize,
    pub courses: Vec<String>,
}

/// Load rows from `{name: {hours, courses}}` or `{name: hours}`, sorted
/// by hours descending then name.
pub fn faculty_load_rows(load: &Value) -> Vec<FacultyLoadRow> {
    let Some(obj) = load.as_object() else {
        return Vec::new();
    };
    let mut rows: Vec<FacultyLoadRow> = obj
        .iter()
        .map(|(faculty, v)| {
            let (hours, courses, course_count) = match v {
                Value::Object(d) => {
                    let hours = d.get("hours").and_then(Value::as_f64).unwrap_or(0.0);
                    match d.get("courses") {
                        Some(Value::Array(list)) => {
                            let courses: Vec<String> = list.iter().filter_map(value_text).collect();
                            let n = courses.len();
                            (hours, courses, n)
                        }
                        Some(n) => (hours, Vec::new(), n.as_u64().unwrap_or(0) as usize),
                        None => (hours, Vec::new(), 0),
                    }
                }
                other => (other.as_f64().unwrap_or(0.0), Vec::new(), 0),
            };
            FacultyLoadRow { faculty: faculty.clone(), hours, course_count, courses }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.hours
            .partial_cmp(&a.hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.faculty.cmp(&b.faculty))
    });
    rows
}

/// Unassigned lectures as display strings; objects are flattened to
/// their `description`/`session`/`reason` text or `key: value` pairs.
pub fn unassigned_entries(entry: &Value) -> Vec<String> {
    let items: Vec<&Value> = match entry {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Object(obj) => {
                let main = str_field(obj, &["description", "session", "subject"]);
                let reason = str_field(obj, &["reason", "error"]);
                match (main.is_empty(), reason.is_empty()) {
                    (false, false) => Some(format!("{} ({})", main, reason)),
                    (false, true) => Some(main),
                    (true, false) => Some(reason),
                    (true, true) => {
                        let joined: Vec<String> = obj
                            .iter()
                            .map(|(k, v)| format!("{}: {}", k, value_text(v).unwrap_or_else(|| v.to_string())))
                            .collect();
                        (!joined.is_empty()).then(|| joined.join(", "))
                    }
                }
            }
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn division_entry_resolution() {
        let map = json!({ "Cse 3 A": 1, "data": { "MBA-1": 2 } });
        assert_eq!(find_division_entry(&map, "Cse 3 A"), Some(&json!(1)));
        assert_eq!(find_division_entry(&map, "cse_3-a"), Some(&json!(1)));
        assert_eq!(find_division_entry(&map, "CSE3A"), Some(&json!(1)));
        assert_eq!(find_division_entry(&map, "mba 1"), Some(&json!(2)));
        assert_eq!(find_division_entry(&map, "IT 2"), None);
        assert_eq!(find_division_entry(&json!([1, 2]), "x"), None);
    }

    #[test]
    fn teacher_rows_from_any_shape() {
        let pairs = json!([["Dr. Rao", "DBMS"], ["Ms. Iyer", "OS"]]);
        let objects = json!([{ "teacher": "Dr. Rao", "subject": "DBMS" }, { "faculty": "Ms. Iyer", "course": "OS" }]);
        let strings = json!(["Dr. Rao - DBMS", "Ms. Iyer: OS"]);
        let map = json!({ "Dr. Rao": "DBMS", "Ms. Iyer": ["OS"] });
        let expected = vec![
            TeacherSubjectRow { faculty: "Dr. Rao".into(), subject: "DBMS".into() },
            TeacherSubjectRow { faculty: "Ms. Iyer".into(), subject: "OS".into() },
        ];
        for v in [pairs, objects, strings, map] {
            assert_eq!(teacher_subject_rows(&v), expected, "shape {}", v);
        }
        assert!(teacher_subject_rows(&Value::Null).is_empty());
    }

    #[test]
    fn decode_cells() {
        let s = decode_session(&json!("DBMS Lab\nMs. Roy\nCL-404\nBatch 2")).unwrap();
        assert_eq!(s.subject, "DBMS Lab");
        assert_eq!(s.room, "CL-404");
        assert_eq!(s.session_type, SessionType::Practical);
        assert_eq!(s.batch.as_deref(), Some("Batch 2"));

        let o = decode_session(&json!({"subject": "Maths", "faculty": "T", "room": "CR-302", "type": "tutorial", "batch": null})).unwrap();
        assert_eq!(o.session_type, SessionType::Tutorial);
        assert_eq!(o.batch, None);

        assert!(decode_session(&Value::Null).is_none());
        assert!(decode_session(&json!("   ")).is_none());
    }

    #[test]
    fn day_lookup_tolerates_case_and_prefix() {
        let tt = json!({ "mon": [null], "TUESDAY": [null, null] });
        assert_eq!(day_sessions(&tt, Weekday::Monday).map(Vec::len), Some(1));
        assert_eq!(day_sessions(&tt, Weekday::Tuesday).map(Vec::len), Some(2));
        assert!(day_sessions(&tt, Weekday::Friday).is_none());
    }

    #[test]
    fn faculty_rows_sorted() {
        let load = json!({
            "B": { "hours": 4, "courses": ["X", "Y"] },
            "A": { "hours": 4, "courses": 3 },
            "C": 9
        });
        let rows = faculty_load_rows(&load);
        let names: Vec<&str> = rows.iter().map(|r| r.faculty.as_str()).collect();
        assert_eq!(names, ["C", "A", "B"]);
        assert_eq!(rows[1].course_count, 3);
        assert_eq!(rows[2].course_count, 2);
    }

    #[test]
    fn unassigned_strings_and_objects() {
        let v = json!(["Theory for OS (Faculty: T)", { "session": "Lab for DBMS", "reason": "no lab free" }, null, { "x": 1 }]);
        assert_eq!(
            unassigned_entries(&v),
            vec!["Theory for OS (Faculty: T)", "Lab for DBMS (no lab free)", "x: 1"]
        );
    }
}
