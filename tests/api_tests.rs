use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{App, test, web};
use serde_json::{Value, json};
use std::path::Path;
use timetabler::api_json::{GenerateRequest, parse_generate_request};
use timetabler::config::AppConfig;
use timetabler::server::{AppState, configure};

const BOUNDARY: &str = "----timetablerboundary";

const SHEET: &str = "\
Program,Semester,Division,Name of the Course,Theory,PRA,Tutorial,No. of Batches for Practical/ Tutorial,Name of Faculty (Theory),Name of Faculty Batch 1 (Lab/Tut)
BTech,3,A,DBMS,3,2,0,1,Dr. Rao,Ms. Roy
BTech,3,A,Maths,3,0,1,1,Dr. Iyer,
BTech,3,B,DBMS,3,0,0,1,Dr. Rao,
";

fn config(root: &Path) -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        upload_dir: root.join("uploads"),
        output_dir: root.join("outputs"),
        max_jobs: 1,
        export_xlsx: false,
    }
}

fn multipart(field: &str, filename: &str, content: &str) -> Vec<u8> {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n--{b}--\r\n",
        b = BOUNDARY,
    )
    .into_bytes()
}

macro_rules! app {
    ($root:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(config($root))))
                .configure(configure),
        )
        .await
    };
}

fn upload_request(body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/upload")
        .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY)))
        .set_payload(body)
}

#[::core::prelude::v1::test]
fn generate_request_parses() {
    let req = parse_generate_request(r#"{"processed_file": "processed_schedule.json"}"#).unwrap();
    assert_eq!(req.processed_file, "processed_schedule.json");
    assert!(parse_generate_request(r#"{"file": "x"}"#).is_err());
}

#[actix_web::test]
async fn help_describes_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(dir.path());
    let resp = test::call_service(&app, test::TestRequest::get().uri("/help").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["generate_example"]["processed_file"], "processed_schedule.json");
    assert!(body["endpoints"]["POST /upload"].is_string());
}

#[actix_web::test]
async fn upload_requires_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(dir.path());

    let resp = test::call_service(&app, upload_request(multipart("other", "x.csv", "a,b")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No file part");

    let resp = test::call_service(&app, upload_request(multipart("file", "", "")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No selected file");
}

#[actix_web::test]
async fn unsupported_upload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(dir.path());
    let resp = test::call_service(&app, upload_request(multipart("file", "notes.txt", "hello")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "An error occurred: Unsupported file extension: .txt");
}

#[actix_web::test]
async fn generate_without_upload_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(dir.path());
    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(GenerateRequest { processed_file: "processed_schedule.json".to_string() })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Processed file not found.");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/report").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn upload_generate_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(dir.path());

    let resp = test::call_service(&app, upload_request(multipart("file", "My Schedule.csv", SHEET)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "File processed successfully");
    assert_eq!(body["processed_file"], "processed_schedule.json");
    assert_eq!(body["summary"]["Programs"], 2);
    assert_eq!(body["summary"]["Faculty"], 3);
    // 3 + 4 + 3 whole-class sessions, 1 lab block
    assert_eq!(body["summary"]["Courses"], 11);
    assert!(dir.path().join("uploads/My_Schedule.csv").is_file());
    assert!(dir.path().join("uploads/processed_schedule.json").is_file());

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"processed_file": "processed_schedule.json"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "2 timetables generated!");
    assert!(body["timetables"]["Btech 3 A"]["Monday"].is_array());
    assert!(body["teacherSubjects"]["Btech 3 A"].is_array());
    assert_eq!(body["facultyLoad"]["Dr. Rao"]["hours"], 6);
    assert_eq!(body["slotLabels"].as_array().map(Vec::len), Some(10));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/report?division=BTech-3-B").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("<h2>Timetable: Btech 3 B</h2>"));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/report?fragment=1").to_request()).await;
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(!html.contains("<!DOCTYPE html>"));
    assert!(html.contains("id=\"division-select\""));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("<li><strong>Programs:</strong> 2</li>"));
    assert!(html.contains("<h2>Timetable: Btech 3 A</h2>"));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/outputs").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    let files: Vec<&str> = body["files"].as_array().unwrap().iter().filter_map(Value::as_str).collect();
    assert!(files.contains(&"division_timetables.json"));
    assert!(files.contains(&"teacher_subject_pairs.json"));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/outputs/unassigned_sessions.json").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = test::call_service(&app, test::TestRequest::get().uri("/outputs/missing.json").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn concurrent_generations_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.max_jobs = 4;
    cfg.export_xlsx = true;
    let app = test::init_service(App::new().app_data(web::Data::new(AppState::new(cfg))).configure(configure)).await;

    let resp = test::call_service(&app, upload_request(multipart("file", "schedule.csv", SHEET)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let calls = (0..4).map(|_| {
        let req = test::TestRequest::post()
            .uri("/generate")
            .set_json(json!({"processed_file": "processed_schedule.json"}))
            .to_request();
        test::call_service(&app, req)
    });
    for resp in futures_util::future::join_all(calls).await {
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = test::call_service(&app, test::TestRequest::get().uri("/outputs").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    let files: Vec<&str> = body["files"].as_array().unwrap().iter().filter_map(Value::as_str).collect();
    // 4 JSON files, 2 division workbooks, 3 faculty workbooks
    assert_eq!(files.len(), 9, "{:?}", files);
}

#[actix_web::test]
async fn render_posted_response() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(dir.path());
    let payload = json!({
        "timetables": { "Mba 1": { "Monday": ["Finance\nDr. K\nCR-302"] } },
        "teacherSubjects": {},
        "unassignedLectures": { "Mba 1": ["Theory for Law (Faculty: Adv. Rao)"] },
        "facultyLoad": {}
    });
    let req = test::TestRequest::post().uri("/render?division=MBA-1").set_json(&payload).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("<strong>Finance</strong>"));
    assert!(html.contains("<li>Theory for Law (Faculty: Adv. Rao)</li>"));

    let req = test::TestRequest::post().uri("/render").set_json(json!([1, 2])).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
