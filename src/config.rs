//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de archivos con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./file_server 8080 -t 8 --policy n-way --n-way 3 --data-dir ./files
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 WORKER_THREADS=8 LOCK_POLICY=writers ./file_server
//! ```

use crate::error::ConfigError;
use crate::sync::LockPolicy;
use clap::{Parser, ValueEnum};

/// Política de los locks por recurso, tal como se escribe en la CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Preferencia a lectores (GET)
    Readers,
    /// Preferencia a escritores (PUT)
    Writers,
    /// Hasta N lectores por turno de escritor
    NWay,
}

/// Configuración del servidor de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor de archivos HTTP/1.1 multihilo con locks lector/escritor por recurso")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(value_name = "PORT", default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Número de workers
    #[arg(short = 't', long = "threads", default_value = "4", env = "WORKER_THREADS")]
    pub threads: usize,

    /// Capacidad de la cola de conexiones (por defecto, igual a --threads)
    #[arg(long = "queue-capacity", env = "QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Política de prioridad de los locks
    #[arg(long, value_enum, default_value = "n-way", env = "LOCK_POLICY")]
    pub policy: PolicyKind,

    /// Lectores admitidos por turno de escritor con la política n-way
    #[arg(long = "n-way", default_value = "1", env = "LOCK_N_WAY")]
    pub n_way: usize,

    /// Directorio desde donde se sirven y guardan archivos
    #[arg(long = "data-dir", default_value = ".", env = "DATA_DIR")]
    pub data_dir: String,

    /// Nivel de log (RUST_LOG tiene prioridad)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Capacidad efectiva de la cola
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(self.threads)
    }

    /// Política con la que se crean los locks
    pub fn lock_policy(&self) -> LockPolicy {
        match self.policy {
            PolicyKind::Readers => LockPolicy::Readers,
            PolicyKind::Writers => LockPolicy::Writers,
            PolicyKind::NWay => LockPolicy::n_way(self.n_way),
        }
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.queue_capacity() == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.policy == PolicyKind::NWay && self.n_way == 0 {
            return Err(ConfigError::ZeroNWay);
        }

        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            threads: 4,
            queue_capacity: None,
            policy: PolicyKind::NWay,
            n_way: 1,
            data_dir: ".".to_string(),
            log_level: "info".to_string(),
        }
    }
}
