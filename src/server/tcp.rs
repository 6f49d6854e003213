//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Un único hilo dispatcher acepta conexiones y las encola en el pool de
//! workers. Cuando la cola está llena el dispatcher se bloquea y deja de
//! aceptar: la contrapresión llega hasta el backlog del socket.

use super::files::FileService;
use super::pool::WorkerPool;
use super::service::{Listener, Service};
use crate::config::Config;
use crate::error::ServerError;
use crate::http::HttpConnection;
use std::fs;
use std::io;
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

impl Listener for TcpListener {
    type Conn = HttpConnection<TcpStream>;

    fn accept(&self) -> io::Result<Self::Conn> {
        let (stream, peer) = TcpListener::accept(self)?;
        debug!(%peer, "connection accepted");
        Ok(HttpConnection::new(stream))
    }
}

/// Acepta conexiones y las entrega al pool
pub struct Dispatcher<L, S>
where
    L: Listener,
    S: Service<Conn = L::Conn>,
{
    listener: L,
    pool: WorkerPool<S>,
}

impl<L, S> Dispatcher<L, S>
where
    L: Listener,
    S: Service<Conn = L::Conn>,
{
    pub fn new(listener: L, pool: WorkerPool<S>) -> Self {
        Self { listener, pool }
    }

    /// Acepta una conexión y la encola (bloquea si la cola está llena)
    pub fn dispatch_one(&self) -> io::Result<()> {
        let conn = self.listener.accept()?;
        self.pool.submit(conn);
        Ok(())
    }

    /// Loop de aceptación; un error de accept no detiene el servidor
    pub fn run(&self) {
        loop {
            if let Err(e) = self.dispatch_one() {
                warn!(error = %e, "failed to accept connection");
            }
        }
    }

    pub fn pool(&self) -> &WorkerPool<S> {
        &self.pool
    }

    /// Devuelve el pool para poder detenerlo
    pub fn into_pool(self) -> WorkerPool<S> {
        self.pool
    }
}

/// Servidor de archivos completo: listener, registro de locks y workers
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Arranca el servidor; solo retorna si falla el arranque
    pub fn run(&self) -> Result<(), ServerError> {
        self.config.validate()?;

        let root = PathBuf::from(&self.config.data_dir);
        if !fs::metadata(&root)?.is_dir() {
            return Err(ServerError::NotADirectory(root.display().to_string()));
        }

        let service = Arc::new(FileService::<TcpStream>::new(root));
        let address = self.config.address();
        let listener = TcpListener::bind(&address)?;
        info!(
            %address,
            data_dir = %service.root().display(),
            policy = %self.config.lock_policy(),
            "listening"
        );

        let pool = WorkerPool::with_policy(
            self.config.threads,
            self.config.queue_capacity(),
            service,
            self.config.lock_policy(),
        )?;

        Dispatcher::new(listener, pool).run();
        Ok(())
    }
}
