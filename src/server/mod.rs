//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Este módulo une las piezas del servidor de archivos:
//! 1. `tcp`: acepta conexiones y las encola (dispatcher)
//! 2. `pool`: workers que atienden las conexiones encoladas
//! 3. `service`: interfaces que consumen los workers
//! 4. `files`: implementación sobre HTTP y el sistema de archivos

pub mod files;
pub mod pool;
pub mod service;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use files::FileService;
pub use pool::{handle_connection, Handled, WorkerPool};
pub use service::{Listener, Outcome, Service};
pub use tcp::{Dispatcher, Server};
