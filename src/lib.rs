// Biblioteca raíz del crate `timetabler`.
// Ingesta de planillas, planificador de horarios, exportación y servidor HTTP.
pub mod algorithm;
pub mod api_json;
pub mod config;
pub mod error;
pub mod excel;
pub mod models;
pub mod server;
pub mod server_handlers;
pub mod view;

pub use config::AppConfig;
pub use error::{Result, TimetableError};
/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
