use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use std::collections::HashMap;

use crate::server::AppState;
use crate::view::{index_page, not_found_page, report_fragment, report_page};

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body)
}

fn query_flag(query: &HashMap<String, String>, key: &str) -> bool {
    matches!(query.get(key).map(|v| v.trim().to_lowercase()).as_deref(), Some("1" | "true" | "yes"))
}

fn query_division(query: &HashMap<String, String>) -> Option<&str> {
    query.get("division").map(|d| d.trim()).filter(|d| !d.is_empty())
}

/// GET /
pub async fn index_handler(state: web::Data<AppState>) -> impl Responder {
    let upload = state.last_upload().and_then(|s| serde_json::to_value(s).ok());
    let report = state.last_report().and_then(|r| serde_json::to_value(r).ok());
    html(index_page(upload.as_ref(), report.as_ref()))
}

/// GET /report?division=CSE-3-A[&fragment=1]
/// Reporte HTML de la última generación; `fragment` devuelve solo el
/// cuerpo para insertarlo en la página principal.
pub async fn report_handler(state: web::Data<AppState>, query: web::Query<HashMap<String, String>>) -> impl Responder {
    let Some(report) = state.last_report() else {
        return HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(not_found_page("No timetables have been generated yet."));
    };
    let value = match serde_json::to_value(&report) {
        Ok(v) => v,
        Err(e) => return HttpResponse::InternalServerError().json(json!({"error": format!("failed to serialise report: {}", e)})),
    };
    let division = query_division(&query);
    if query_flag(&query, "fragment") {
        html(report_fragment(&value, division))
    } else {
        html(report_page(&value, division))
    }
}

/// POST /render?division=...
/// Renderiza una respuesta de `/generate` enviada en el cuerpo, con la
/// forma que tenga.
pub async fn render_handler(
    query: web::Query<HashMap<String, String>>,
    body: web::Json<serde_json::Value>,
) -> impl Responder {
    let value = body.into_inner();
    if !value.is_object() {
        return HttpResponse::BadRequest().json(json!({"error": "expected a JSON object"}));
    }
    html(report_page(&value, query_division(&query)))
}
