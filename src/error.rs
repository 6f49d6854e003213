//! # Errores del Servidor
//! src/error.rs
//!
//! Tipos de error que cruzan los límites de los módulos. Los errores de
//! parsing HTTP viven en `http::request` porque se traducen directamente
//! a una respuesta.

use std::io;
use thiserror::Error;

/// Valores inválidos en la configuración
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("port must be in 1..=65535")]
    InvalidPort,

    #[error("worker threads must be >= 1")]
    ZeroThreads,

    #[error("queue capacity must be >= 1")]
    ZeroQueueCapacity,

    #[error("n-way bound must be >= 1")]
    ZeroNWay,
}

/// Error de construcción de la cola acotada
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue capacity must be >= 1")]
    ZeroCapacity,
}

/// Errores fatales al arrancar o correr el servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid queue: {0}")]
    Queue(#[from] QueueError),

    #[error("failed to spawn worker {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: io::Error,
    },

    #[error("data directory {0} is not a directory")]
    NotADirectory(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
