use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::algorithm::OutputDir;
use crate::api_json::GenerateResponse;
use crate::config::AppConfig;
use crate::excel::UploadSummary;
use crate::server_handlers::{
    generate_handler, help_handler, index_handler, output_download_handler, outputs_list_handler,
    render_handler, report_handler, upload_handler,
};

/// Estado compartido entre workers.
pub struct AppState {
    pub config: AppConfig,
    pub last_upload: Mutex<Option<UploadSummary>>,
    pub last_report: Mutex<Option<GenerateResponse>>,
    /// Limita las generaciones simultáneas a `config.max_jobs`.
    pub jobs: Arc<Semaphore>,
    /// Directorio de salida compartido; una sola exportación a la vez.
    pub outputs: Arc<OutputDir>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let jobs = Arc::new(Semaphore::new(config.max_jobs.max(1)));
        let outputs = Arc::new(OutputDir::new(config.output_dir.clone()));
        AppState {
            outputs,
            config,
            last_upload: Mutex::new(None),
            last_report: Mutex::new(None),
            jobs,
        }
    }

    pub fn remember_upload(&self, summary: UploadSummary) {
        if let Ok(mut slot) = self.last_upload.lock() {
            *slot = Some(summary);
        }
    }

    pub fn last_upload(&self) -> Option<UploadSummary> {
        self.last_upload.lock().ok().and_then(|s| s.clone())
    }

    pub fn remember_report(&self, report: GenerateResponse) {
        if let Ok(mut slot) = self.last_report.lock() {
            *slot = Some(report);
        }
    }

    pub fn last_report(&self) -> Option<GenerateResponse> {
        self.last_report.lock().ok().and_then(|r| r.clone())
    }
}

/// Registra todas las rutas; compartido por `run_server` y los tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index_handler))
        .route("/upload", web::post().to(upload_handler))
        .route("/generate", web::post().to(generate_handler))
        .route("/report", web::get().to(report_handler))
        .route("/render", web::post().to(render_handler))
        .route("/outputs", web::get().to(outputs_list_handler))
        .route("/outputs/{name}", web::get().to(output_download_handler))
        .route("/help", web::get().to(help_handler));
}

pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    config.ensure_dirs()?;
    let bind_addr = config.bind_addr.clone();
    let state = web::Data::new(AppState::new(config));
    log::info!("listening on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(actix_web::middleware::Logger::default())
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(16 * 1024 * 1024))
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
