use std::fs;
use timetabler::TimetableError;
use timetabler::excel::{schedule_from_file, write_session_files};
use timetabler::models::Shift;

const SHEET: &str = "\
Program,Semester,Division,Name of the Course,Theory,PRA,Tutorial,Credits,No. of Batches for Practical/ Tutorial,Name of Faculty (Theory),Name of Faculty Batch 1 (Lab/Tut),Name of Faculty Batch 2 (Lab/Tut),C/VF,Remarks
BTech,3,A,DBMS,3,2,0,4,2,Dr. Rao,Ms. Roy,Mr. Das,C,
BTech,3,A,Maths,3,0,1,4,1,Dr. Iyer,,,C,
BTech,3,B,DBMS,3,2,0,4,1,Dr. Rao,Ms. Roy,,C,
MBA,1,,Law,2,0,0,2,1,Adv. Mehta,,,VF,Monday 10 am to 1 pm
";

fn write_sheet(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn csv_sheet_is_grouped_into_divisions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sheet(dir.path(), "schedule.csv", SHEET);

    let processed = schedule_from_file(&path).unwrap();
    let names: Vec<&str> = processed.divisions.iter().map(|d| d.division.as_str()).collect();
    assert_eq!(names, ["BTech-3-A", "BTech-3-B", "MBA-1"]);

    let a = &processed.divisions[0];
    assert_eq!(a.morning_or_evening, Shift::Morning);
    assert_eq!(a.subjects.len(), 2);
    assert_eq!(a.subjects[0].batches, 2);
    assert_eq!(a.subjects[0].batch_faculty, vec!["Ms. Roy", "Mr. Das"]);
    assert!(!a.subjects[0].visiting);
}

#[test]
fn upload_summary_counts_sessions_and_faculty() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sheet(dir.path(), "schedule.csv", SHEET);
    let summary = schedule_from_file(&path).unwrap().summary();

    assert_eq!(summary.programs, 3);
    // whole-class: 3 + (3 + 1) + 3 + 2, lab blocks: 2 batches + 1 batch
    assert_eq!(summary.courses, 12 + 3);
    // Dr. Rao, Ms. Roy, Mr. Das, Dr. Iyer, Adv. Mehta
    assert_eq!(summary.faculty, 5);

    let json = serde_json::to_value(summary).unwrap();
    assert_eq!(json["Programs"], 3);
    assert_eq!(json["Courses"], 15);
}

#[test]
fn visiting_faculty_availability_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sheet(dir.path(), "schedule.csv", SHEET);
    let processed = schedule_from_file(&path).unwrap();

    let law = &processed.divisions[2].subjects[0];
    assert!(law.visiting);
    assert_eq!(law.vf_timing.keys().collect::<Vec<_>>(), ["mon"]);
    let mon = &law.vf_timing["mon"];
    assert_eq!(&mon[1..6], &[0, 1, 1, 1, 0]);
}

#[test]
fn session_files_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sheet(dir.path(), "schedule.csv", SHEET);
    let processed = schedule_from_file(&path).unwrap();

    let out = dir.path().join("work");
    write_session_files(&processed, &out).unwrap();
    assert!(out.join("divisions.json").is_file());
    assert!(out.join("whole_class_sessions.json").is_file());
    assert!(out.join("labs_BTech-3-A.json").is_file());

    let back: Vec<timetabler::models::Division> =
        serde_json::from_str(&fs::read_to_string(out.join("divisions.json")).unwrap()).unwrap();
    assert_eq!(back, processed.divisions);
}

#[test]
fn unsupported_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let txt = write_sheet(dir.path(), "notes.txt", "hello");
    match schedule_from_file(&txt) {
        Err(TimetableError::UnsupportedExtension(ext)) => assert_eq!(ext, ".txt"),
        other => panic!("unexpected result: {:?}", other.map(|p| p.divisions.len())),
    }
    assert!(matches!(
        schedule_from_file(dir.path().join("absent.csv")),
        Err(TimetableError::MissingFile(_))
    ));
}

#[test]
fn xlsx_round_trip_through_calamine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.xlsx");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    let rows: Vec<Vec<&str>> = SHEET.lines().map(|l| l.split(',').collect()).collect();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if let Ok(n) = cell.parse::<f64>() {
                sheet.write_number(r as u32, c as u16, n).unwrap();
            } else if !cell.is_empty() {
                sheet.write_string(r as u32, c as u16, *cell).unwrap();
            }
        }
    }
    workbook.save(&path).unwrap();

    let processed = schedule_from_file(&path).unwrap();
    assert_eq!(processed.divisions.len(), 3);
    assert_eq!(processed.divisions[0].subjects[0].theory, 3);
    assert_eq!(processed.summary().courses, 15);
}
