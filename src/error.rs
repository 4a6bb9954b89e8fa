use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

/// Errors raised while ingesting, scheduling or exporting timetables.
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write spreadsheet: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("{0}")]
    MissingFile(String),

    #[error("invalid file name: {0}")]
    InvalidName(String),

    #[error("the sheet has no header row")]
    EmptySheet,

    #[error("Scheduler ran, but no output timetables were found.")]
    NoTimetables,

    #[error("generation task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, TimetableError>;

impl ResponseError for TimetableError {
    fn status_code(&self) -> StatusCode {
        match self {
            TimetableError::UnsupportedExtension(_)
            | TimetableError::InvalidName(_)
            | TimetableError::EmptySheet
            | TimetableError::Json(_) => StatusCode::BAD_REQUEST,
            TimetableError::MissingFile(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({"error": self.to_string()}))
    }
}
