//! # Pool de Workers
//! src/server/pool.rs
//!
//! N hilos de vida larga consumen conexiones de una `BoundedQueue`. Cada
//! worker repite el mismo ciclo:
//!
//! 1. Desencola una conexión (bloquea si la cola está vacía)
//! 2. Parsea el request; si falla responde el error sin tocar ningún lock
//! 3. Resuelve el lock del recurso en el registro
//! 4. GET toma el lock de lectura, PUT el de escritura, solo durante la
//!    transferencia del archivo
//! 5. Suelta el lock, envía la respuesta y cierra la conexión
//!
//! El lock se libera con un guard, así que ningún camino de salida (error de
//! I/O o panic del colaborador) lo deja tomado.
//!
//! ## Terminación
//!
//! En producción los workers viven lo que vive el proceso. `shutdown`
//! encola una marca de cierre por worker detrás del trabajo pendiente: las
//! conexiones ya encoladas se atienden en orden FIFO y luego cada worker
//! termina.

use super::service::Service;
use crate::error::{ConfigError, ServerError};
use crate::http::{Method, ParseError, Response, StatusCode};
use crate::metrics::{ServerStats, StatsSnapshot};
use crate::sync::{BoundedQueue, LockPolicy, ResourceLockRegistry};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, info_span};

/// Elemento de la cola de trabajo
enum Task<C> {
    Serve(C),
    Shutdown,
}

/// Lo que un worker hizo con una conexión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handled {
    /// `None` si el request no se pudo parsear
    pub method: Option<Method>,
    pub status: StatusCode,
}

struct Worker {
    id: usize,
    handle: JoinHandle<()>,
}

/// Pool fijo de workers alimentado por una cola acotada
pub struct WorkerPool<S: Service> {
    queue: Arc<BoundedQueue<Task<S::Conn>>>,
    workers: Vec<Worker>,
    registry: Arc<ResourceLockRegistry>,
    stats: ServerStats,
}

impl<S: Service> WorkerPool<S> {
    /// Crea la cola y lanza `threads` workers
    ///
    /// La política de los locks viene dada por el `registry`.
    pub fn start(
        threads: usize,
        queue_capacity: usize,
        service: Arc<S>,
        registry: Arc<ResourceLockRegistry>,
    ) -> Result<Self, ServerError> {
        if threads == 0 {
            return Err(ConfigError::ZeroThreads.into());
        }

        let queue = Arc::new(BoundedQueue::new(queue_capacity)?);
        let stats = ServerStats::new();
        let mut workers = Vec::with_capacity(threads);

        for id in 0..threads {
            let context = WorkerContext {
                id,
                queue: Arc::clone(&queue),
                service: Arc::clone(&service),
                registry: Arc::clone(&registry),
                stats: stats.clone(),
            };

            let spawned = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || context.run());

            match spawned {
                Ok(handle) => workers.push(Worker { id, handle }),
                Err(source) => {
                    // Los workers ya lanzados no deben quedar colgados en pop()
                    for _ in &workers {
                        queue.push(Task::Shutdown);
                    }
                    return Err(ServerError::Spawn { index: id, source });
                }
            }
        }

        info!(
            threads,
            queue_capacity,
            policy = %registry.policy(),
            "worker pool started"
        );

        Ok(Self {
            queue,
            workers,
            registry,
            stats,
        })
    }

    /// Como `start`, con un registro nuevo cuyos locks usan `policy`
    pub fn with_policy(
        threads: usize,
        queue_capacity: usize,
        service: Arc<S>,
        policy: LockPolicy,
    ) -> Result<Self, ServerError> {
        let registry = Arc::new(ResourceLockRegistry::new(policy));
        Self::start(threads, queue_capacity, service, registry)
    }

    /// Encola una conexión; bloquea mientras la cola está llena
    pub fn submit(&self, conn: S::Conn) {
        self.queue.push(Task::Serve(conn));
    }

    /// Conexiones esperando un worker
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Cantidad de workers
    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Registro de locks compartido por los workers
    pub fn registry(&self) -> &Arc<ResourceLockRegistry> {
        &self.registry
    }

    /// Métricas acumuladas
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Drena la cola, detiene a los workers y devuelve las métricas finales
    pub fn shutdown(self) -> StatsSnapshot {
        for _ in &self.workers {
            self.queue.push(Task::Shutdown);
        }

        for worker in self.workers {
            if worker.handle.join().is_err() {
                error!(worker = worker.id, "worker thread panicked");
            }
        }

        let snapshot = self.stats.snapshot();
        info!(stats = %snapshot.to_json(), "worker pool stopped");
        snapshot
    }
}

/// Todo lo que un worker necesita, movido a su hilo
struct WorkerContext<S: Service> {
    id: usize,
    queue: Arc<BoundedQueue<Task<S::Conn>>>,
    service: Arc<S>,
    registry: Arc<ResourceLockRegistry>,
    stats: ServerStats,
}

impl<S: Service> WorkerContext<S> {
    fn run(self) {
        let span = info_span!("worker", id = self.id);
        let _enter = span.enter();
        debug!("worker started");

        loop {
            let conn = match self.queue.pop() {
                Task::Serve(conn) => conn,
                Task::Shutdown => break,
            };

            let start = Instant::now();
            self.stats.worker_busy();

            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                handle_connection(self.service.as_ref(), &self.registry, conn)
            }));

            self.stats.worker_idle();

            match result {
                Ok(Some(handled)) => {
                    self.stats
                        .record_request(handled.method, handled.status, start.elapsed());
                }
                Ok(None) => {}
                Err(_) => {
                    self.stats.record_panic();
                    error!("request handler panicked, connection dropped");
                }
            }
        }

        debug!("worker stopped");
    }
}

/// Atiende una conexión completa: parseo, lock, transferencia, respuesta
///
/// Devuelve `None` si el cliente cerró sin enviar nada (no hay a quién
/// responder). La conexión se cierra al salir (se descarta).
pub fn handle_connection<S: Service>(
    service: &S,
    registry: &ResourceLockRegistry,
    mut conn: S::Conn,
) -> Option<Handled> {
    let request = match service.parse(&mut conn) {
        Ok(request) => request,
        Err(ParseError::EmptyRequest) => {
            // El cliente conectó y cerró sin enviar nada
            debug!("connection closed without a request");
            return None;
        }
        Err(err) => {
            debug!(error = %err, "rejecting request");
            let status = err.status();
            service.send(&mut conn, &Response::status_message(status));
            return Some(Handled {
                method: None,
                status,
            });
        }
    };

    let method = request.method();
    let resource = request.resource_id();
    let lock = registry.resolve(resource);

    let outcome = match method {
        Method::GET => {
            let _guard = lock.read();
            service.read_resource(resource, &mut conn)
        }
        Method::PUT => {
            let length = request.content_length().unwrap_or(0);
            let _guard = lock.write();
            service.write_resource(resource, &mut conn, length)
        }
    };

    let status = outcome.status();
    info!(
        target: "audit",
        method = method.as_str(),
        uri = request.uri(),
        status = status.as_u16(),
        request_id = request.request_id(),
        "request handled"
    );

    if let Some(response) = outcome.response() {
        service.send(&mut conn, &response);
    }

    Some(Handled {
        method: Some(method),
        status,
    })
}
