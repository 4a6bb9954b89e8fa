use actix_multipart::Multipart;
use actix_web::{HttpResponse, Responder, ResponseError, web};
use futures_util::stream::StreamExt;
use serde_json::json;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use crate::api_json::{PROCESSED_FILE, UploadResponse, secure_filename};
use crate::error::TimetableError;
use crate::excel::schedule_from_file;
use crate::server::AppState;

/// POST /upload (multipart, campo `file`)
/// Guarda la planilla, la normaliza a divisiones y escribe
/// `processed_schedule.json` en el directorio de subidas.
pub async fn upload_handler(state: web::Data<AppState>, mut payload: Multipart) -> impl Responder {
    let upload_dir = state.config.upload_dir.clone();
    if let Err(e) = tokio::fs::create_dir_all(&upload_dir).await {
        return HttpResponse::InternalServerError().json(json!({"error": format!("failed to create upload dir: {}", e)}));
    }

    let mut saved: Option<PathBuf> = None;
    let mut saw_file_part = false;
    while let Some(field_res) = payload.next().await {
        let mut field = match field_res {
            Ok(f) => f,
            Err(e) => {
                log::warn!("multipart field error: {}", e);
                return HttpResponse::BadRequest().json(json!({"error": format!("invalid multipart body: {}", e)}));
            }
        };
        if field.content_disposition().get_name() != Some("file") {
            // descartar campos que no interesan
            while let Some(_chunk) = field.next().await {}
            continue;
        }
        saw_file_part = true;

        let original = field.content_disposition().get_filename().unwrap_or_default().to_string();
        if original.trim().is_empty() {
            return HttpResponse::BadRequest().json(json!({"error": "No selected file"}));
        }
        let filename = secure_filename(&original);
        if filename.is_empty() {
            return TimetableError::InvalidName(original).error_response();
        }

        let filepath = upload_dir.join(&filename);
        let mut f = match tokio::fs::File::create(&filepath).await {
            Ok(f) => f,
            Err(e) => {
                return HttpResponse::InternalServerError().json(json!({"error": format!("failed to create upload file: {}", e)}));
            }
        };
        while let Some(chunk) = field.next().await {
            let write = match chunk {
                Ok(bytes) => f.write_all(&bytes).await.map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            if let Err(e) = write {
                return HttpResponse::InternalServerError().json(json!({"error": format!("failed to store upload: {}", e)}));
            }
        }
        if let Err(e) = f.flush().await {
            return HttpResponse::InternalServerError().json(json!({"error": format!("failed to store upload: {}", e)}));
        }
        log::info!("stored upload {} as {}", original, filepath.display());
        saved = Some(filepath);
        break;
    }

    let filepath = match (saved, saw_file_part) {
        (Some(p), _) => p,
        (None, true) => return HttpResponse::BadRequest().json(json!({"error": "No selected file"})),
        (None, false) => return HttpResponse::BadRequest().json(json!({"error": "No file part"})),
    };

    let processed_path = upload_dir.join(PROCESSED_FILE);
    let blocking = tokio::task::spawn_blocking(move || -> crate::error::Result<_> {
        let processed = schedule_from_file(&filepath)?;
        std::fs::write(&processed_path, serde_json::to_string_pretty(&processed.divisions)?)?;
        Ok(processed.summary())
    });

    match blocking.await {
        Ok(Ok(summary)) => {
            log::info!(
                "processed upload: {} programs, {} faculty, {} courses",
                summary.programs,
                summary.faculty,
                summary.courses
            );
            state.remember_upload(summary);
            HttpResponse::Ok().json(UploadResponse {
                message: "File processed successfully".to_string(),
                summary,
                processed_file: PROCESSED_FILE.to_string(),
            })
        }
        Ok(Err(e)) => {
            log::error!("upload processing failed: {}", e);
            HttpResponse::build(e.status_code())
                .json(json!({"error": format!("An error occurred: {}", e)}))
        }
        Err(e) => TimetableError::Task(e.to_string()).error_response(),
    }
}
