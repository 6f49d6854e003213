//! # File Server
//! src/lib.rs
//!
//! Servidor de archivos HTTP/1.1 multihilo. Un dispatcher acepta
//! conexiones y las encola en una cola acotada; un pool fijo de workers
//! las atiende. Cada archivo tiene su propio lock lector/escritor, así que
//! los GET concurrentes sobre un mismo archivo se solapan y un PUT nunca
//! se mezcla con otra operación sobre ese archivo.
//!
//! ## Arquitectura
//!
//! - `sync`: semáforo, cola acotada, lock con prioridad y registro de locks
//! - `http`: parsing de requests, responses y lectura desde el socket
//! - `server`: dispatcher, pool de workers y servicio de archivos
//! - `metrics`: estadísticas de los workers
//! - `config`: CLI y variables de entorno
//! - `error`: errores de arranque
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use file_server::config::Config;
//! use file_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::new(config);
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod server;
pub mod sync;
