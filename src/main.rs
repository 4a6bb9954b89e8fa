// --- Generador de horarios - servidor HTTP ---

use timetabler::{AppConfig, run_server};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = AppConfig::from_env();
    log::info!("=== Timetable generator (API) ===");
    log::info!(
        "uploads: {}, outputs: {}, max jobs: {}",
        config.upload_dir.display(),
        config.output_dir.display(),
        config.max_jobs
    );
    run_server(config).await
}
