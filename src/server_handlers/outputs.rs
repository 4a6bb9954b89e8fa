use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::api_json::secure_filename;
use crate::server::AppState;

/// GET /outputs
/// Lista los archivos exportados por la última generación.
pub async fn outputs_list_handler(state: web::Data<AppState>) -> impl Responder {
    let dir = state.outputs.path();
    let mut files: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return HttpResponse::InternalServerError().json(json!({"error": format!("failed to list outputs: {}", e)})),
    };
    files.sort();
    HttpResponse::Ok().json(json!({"files": files}))
}

/// GET /outputs/{name}
pub async fn output_download_handler(state: web::Data<AppState>, name: web::Path<String>) -> impl Responder {
    let name = name.into_inner();
    if name.contains("..") || secure_filename(&name) != name {
        return HttpResponse::BadRequest().json(json!({"error": "invalid name"}));
    }
    let path = state.outputs.path().join(&name);
    if !path.is_file() {
        return HttpResponse::NotFound().json(json!({"error": "file not found"}));
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = match path.extension().and_then(std::ffi::OsStr::to_str) {
                Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                Some("json") => "application/json",
                Some("csv") => "text/csv",
                _ => "application/octet-stream",
            };
            HttpResponse::Ok()
                .content_type(mime)
                .append_header((actix_web::http::header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", name)))
                .body(bytes)
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": format!("failed to read file: {}", e)})),
    }
}
