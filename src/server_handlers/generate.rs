use actix_web::{HttpResponse, Responder, ResponseError, web};
use serde_json::json;

use crate::algorithm::{load_divisions, schedule_into};
use crate::api_json::{build_generate_response, parse_generate_request, secure_filename};
use crate::error::TimetableError;
use crate::server::AppState;

/// POST /generate `{"processed_file": "processed_schedule.json"}`
/// Ejecuta el planificador en un hilo bloqueante (limitado por el semáforo
/// del estado), reemplaza el contenido del directorio de salida bajo su
/// candado y devuelve las grillas agregadas.
pub async fn generate_handler(state: web::Data<AppState>, body: web::Json<serde_json::Value>) -> impl Responder {
    let body_value = body.into_inner();
    let json_str = match serde_json::to_string(&body_value) {
        Ok(s) => s,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": format!("invalid JSON body: {}", e)})),
    };
    let request = match parse_generate_request(&json_str) {
        Ok(r) => r,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": format!("failed to parse input: {}", e)})),
    };

    let name = secure_filename(&request.processed_file);
    let input_path = state.config.upload_dir.join(&name);
    if name.is_empty() || !input_path.is_file() {
        return HttpResponse::NotFound().json(json!({"error": "Processed file not found."}));
    }

    let permit = match state.jobs.clone().acquire_owned().await {
        Ok(p) => p,
        Err(_) => return HttpResponse::InternalServerError().json(json!({"error": "failed to acquire semaphore"})),
    };

    let outputs = state.outputs.clone();
    let xlsx = state.config.export_xlsx;
    let start = std::time::Instant::now();
    let blocking = tokio::task::spawn_blocking(move || -> crate::error::Result<_> {
        let _permit = permit;
        let divisions = load_divisions(&input_path)?;
        let outcome = schedule_into(&divisions, &outputs, xlsx)?;
        log::info!(
            "scheduled {} divisions, {} sessions unassigned",
            outcome.division_timetables.len(),
            outcome.unassigned_count()
        );
        build_generate_response(&outcome)
    });

    match blocking.await {
        Ok(Ok(report)) => {
            log::info!("/generate finished in {} ms", start.elapsed().as_millis());
            state.remember_report(report.clone());
            HttpResponse::Ok().json(report)
        }
        Ok(Err(TimetableError::NoTimetables)) => {
            HttpResponse::InternalServerError().json(json!({"error": TimetableError::NoTimetables.to_string()}))
        }
        Ok(Err(e)) => {
            log::error!("Error in /generate: {}", e);
            HttpResponse::InternalServerError().json(json!({"error": format!("An error occurred during generation: {}", e)}))
        }
        Err(e) => TimetableError::Task(e.to_string()).error_response(),
    }
}
