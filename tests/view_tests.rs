use serde_json::json;
use timetabler::algorithm::schedule;
use timetabler::api_json::{GenerateResponse, SessionType, build_generate_response};
use timetabler::models::{Division, Subject, Weekday};
use timetabler::view::lookup::{day_sessions, decode_session, faculty_load_rows, find_division_entry};
use timetabler::view::{report_fragment, report_page};

fn divisions() -> Vec<Division> {
    let mut dbms = Subject::new("DBMS", "Dr. Rao");
    dbms.theory = 2;
    dbms.practical = 2;
    let mut maths = Subject::new("Maths", "Dr. Iyer");
    maths.theory = 1;
    maths.tutorial = 1;
    vec![
        Division::new("cse_3-a", vec![dbms.clone(), maths]),
        Division::new("IT-2", vec![dbms]),
    ]
}

fn response() -> GenerateResponse {
    build_generate_response(&schedule(&divisions())).unwrap()
}

#[test]
fn response_keys_are_normalised() {
    let resp = response();
    assert_eq!(resp.message, "2 timetables generated!");
    let keys: Vec<&str> = resp.timetables.keys().map(String::as_str).collect();
    assert_eq!(keys, ["Cse 3 A", "It 2"]);
    assert!(resp.teacher_subjects.contains_key("Cse 3 A"));
    assert_eq!(resp.slot_labels[0], "08:00-09:00");
}

#[test]
fn faculty_load_is_aggregated_across_divisions() {
    let resp = response();
    let rao = &resp.faculty_load["Dr. Rao"];
    // two theory hours plus a 2h lab in each division
    assert_eq!(rao.hours, 8);
    assert_eq!(rao.courses, vec!["DBMS"]);
    let iyer = &resp.faculty_load["Dr. Iyer"];
    assert_eq!(iyer.hours, 2);
}

#[test]
fn session_types_reach_the_wire() {
    let value = serde_json::to_value(response()).unwrap();
    let timetable = find_division_entry(&value["timetables"], "CSE-3-A").unwrap();
    let mut types = Vec::new();
    for day in Weekday::ALL {
        for cell in day_sessions(timetable, day).unwrap() {
            if let Some(s) = decode_session(cell) {
                types.push(s.session_type);
            }
        }
    }
    assert!(types.contains(&SessionType::Theory));
    assert!(types.contains(&SessionType::Practical));
    assert!(types.contains(&SessionType::Tutorial));
}

#[test]
fn report_page_renders_generated_response() {
    let value = serde_json::to_value(response()).unwrap();
    let html = report_page(&value, Some("IT-2"));
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h2>Timetable: It 2</h2>"));
    assert!(html.contains("<td class=\"practical\"><strong>DBMS</strong>"));
    assert!(html.contains("All lectures were assigned."));
    // load table is sorted by hours, Dr. Rao first
    let rao = html.find("<td>Dr. Rao</td><td>8</td>").unwrap();
    let iyer = html.find("<td>Dr. Iyer</td><td>2</td>").unwrap();
    assert!(rao < iyer);
}

#[test]
fn loosely_shaped_payload_still_renders() {
    let payload = json!({
        "message": "1 timetables generated!",
        "data": {},
        "timetables": {
            "ECE_1": {
                "mon": ["Signals\nDr. Bose\nCR-401", null, "Signals Lab\nDr. Bose\nCL-404\nBatch 1"],
                "Tue": [null, { "subject": "Maths Tut", "faculty": "Dr. Iyer", "room": "CR-302" }]
            }
        },
        "teacherSubjects": { "data": { "Ece 1": ["Dr. Bose - Signals"] } },
        "unassignedLectures": { "ECE-1": [{ "session": "Lab for Signals", "reason": "no lab free" }] },
        "facultyLoad": { "Dr. Bose": 3, "Dr. Iyer": { "hours": 1, "courses": 1 } }
    });
    let html = report_fragment(&payload, Some("ece 1"));
    assert!(html.contains("<h2>Timetable: ECE_1</h2>"));
    assert!(html.contains("<th>Monday</th><th>Tuesday</th>"));
    assert!(html.contains("<td class=\"practical\"><strong>Signals Lab</strong><br><span class=\"batch\">Batch 1</span>"));
    assert!(html.contains("<td class=\"tutorial\"><strong>Maths Tut</strong>"));
    assert!(html.contains("<td>Dr. Bose</td><td>Signals</td>"));
    assert!(html.contains("<li>Lab for Signals (no lab free)</li>"));
    // slot labels fall back to the default day
    assert!(html.contains("<th>08:00-09:00</th>"));

    let rows = faculty_load_rows(&payload["facultyLoad"]);
    assert_eq!(rows[0].faculty, "Dr. Bose");
    assert_eq!(rows[1].course_count, 1);
}

#[test]
fn markup_in_names_is_escaped() {
    let payload = json!({
        "timetables": { "<b>X</b>": { "Monday": ["<script>\nT\nR"] } }
    });
    let html = report_fragment(&payload, None);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("&lt;b&gt;X&lt;/b&gt;"));
}
