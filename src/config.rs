use std::env;
use std::path::PathBuf;

/// Runtime configuration. Values come from the environment (a `.env` file is
/// honoured when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Max number of generations running at once.
    pub max_jobs: usize,
    pub export_xlsx: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: "127.0.0.1:8080".to_string(),
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("outputs"),
            max_jobs: std::cmp::max(1, num_cpus::get()),
            export_xlsx: true,
        }
    }
}

fn load_dotenv() {
    let _ = dotenv::dotenv();
}

fn env_non_empty(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Build the configuration from `TIMETABLE_*` variables, falling back to
    /// the defaults for anything missing or unparsable.
    pub fn from_env() -> Self {
        load_dotenv();
        let mut cfg = AppConfig::default();

        if let Some(bind) = env_non_empty("TIMETABLE_BIND") {
            cfg.bind_addr = bind;
        }
        if let Some(dir) = env_non_empty("TIMETABLE_UPLOAD_DIR") {
            cfg.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env_non_empty("TIMETABLE_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(dir);
        }
        if let Some(jobs) = env_non_empty("TIMETABLE_MAX_JOBS") {
            match jobs.parse::<usize>() {
                Ok(n) if n > 0 => cfg.max_jobs = n,
                _ => log::warn!("ignoring invalid TIMETABLE_MAX_JOBS={:?}", jobs),
            }
        }
        if let Some(flag) = env_non_empty("TIMETABLE_EXPORT_XLSX") {
            match parse_flag(&flag) {
                Some(b) => cfg.export_xlsx = b,
                None => log::warn!("ignoring invalid TIMETABLE_EXPORT_XLSX={:?}", flag),
            }
        }
        cfg
    }

    /// Create the upload and output directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }
}
