//! # File Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor de archivos.

use file_server::config::Config;
use file_server::server::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    // Crear configuración (CLI + variables de entorno)
    let config = Config::new();

    // RUST_LOG tiene prioridad sobre --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .init();

    info!(
        port = config.port,
        host = %config.host,
        threads = config.threads,
        queue_capacity = config.queue_capacity(),
        policy = %config.lock_policy(),
        data_dir = %config.data_dir,
        "starting file server"
    );

    // Iniciar el servidor (esto bloqueará el thread)
    let server = Server::new(config);
    if let Err(e) = server.run() {
        error!(error = %e, "fatal error");
        std::process::exit(1);
    }
}
