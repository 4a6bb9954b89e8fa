use actix_web::{HttpResponse, Responder};
use serde_json::json;

use crate::api_json::{GenerateRequest, PROCESSED_FILE};
use crate::models::slot_labels;

/// GET /help
pub async fn help_handler() -> impl Responder {
    let example = GenerateRequest { processed_file: PROCESSED_FILE.to_string() };

    let help = json!({
        "description": "Timetable generator. Upload a schedule sheet, then generate timetables for every division.",
        "endpoints": {
            "GET /": "HTML page with the upload form and the last report",
            "POST /upload": "multipart form with a 'file' field (xlsx, xls, xlsm, xlsb, ods, csv); returns {message, summary, processed_file}",
            "POST /generate": "JSON body (see 'generate_example'); returns {message, timetables, teacherSubjects, unassignedLectures, facultyLoad, slotLabels}",
            "GET /report?division=NAME": "HTML report of the last generation",
            "POST /render?division=NAME": "HTML report for a posted /generate response",
            "GET /outputs": "list exported files",
            "GET /outputs/{name}": "download an exported file",
            "GET /help": "this document"
        },
        "generate_example": example,
        "slot_labels": slot_labels(),
        "note": "Division keys in /generate responses are title-cased with '_' and '-' replaced by spaces."
    });

    HttpResponse::Ok().json(help)
}
