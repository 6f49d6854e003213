//! # Registro de Locks por Recurso
//! src/sync/registry.rs
//!
//! Asocia cada identificador de recurso (path normalizado) con exactamente
//! un `PriorityRWLock`, creado la primera vez que se pide y compartido por
//! todos los hilos durante la vida del proceso. Las entradas nunca se
//! eliminan.
//!
//! El mapa vive detrás de un único mutex que solo cubre la búsqueda o
//! inserción. Adquirir el lock del recurso ocurre después de soltarlo.

use crate::sync::rwlock::{LockPolicy, PriorityRWLock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Mapa recurso → lock, con creación perezosa
pub struct ResourceLockRegistry {
    locks: Mutex<HashMap<String, Arc<PriorityRWLock>>>,
    policy: LockPolicy,
    created: AtomicUsize,
}

impl ResourceLockRegistry {
    /// Crea un registro vacío; todos sus locks usarán `policy`
    pub fn new(policy: LockPolicy) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            policy,
            created: AtomicUsize::new(0),
        }
    }

    /// Devuelve el lock del recurso, creándolo si es la primera referencia
    pub fn resolve(&self, id: &str) -> Arc<PriorityRWLock> {
        let mut locks = self.locks.lock();

        if let Some(lock) = locks.get(id) {
            return Arc::clone(lock);
        }

        let lock = Arc::new(PriorityRWLock::new(self.policy));
        locks.insert(id.to_string(), Arc::clone(&lock));
        self.created.fetch_add(1, Ordering::Relaxed);
        debug!(resource = id, policy = %self.policy, "created resource lock");

        lock
    }

    /// Cantidad de locks creados desde el arranque
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// Recursos registrados
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Verifica si aún no se creó ningún lock
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Política con la que se crean los locks
    pub fn policy(&self) -> LockPolicy {
        self.policy
    }
}

impl Default for ResourceLockRegistry {
    fn default() -> Self {
        Self::new(LockPolicy::default())
    }
}
