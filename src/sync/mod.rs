//! # Primitivas de Sincronización
//!
//! - `semaphore`: semáforo contador (wait/post)
//! - `queue`: cola acotada productor/consumidor
//! - `rwlock`: lock lector/escritor con política de prioridad
//! - `registry`: un lock por recurso, compartido entre hilos

pub mod queue;
pub mod registry;
pub mod rwlock;
pub mod semaphore;

pub use queue::BoundedQueue;
pub use registry::ResourceLockRegistry;
pub use rwlock::{LockPolicy, LockSnapshot, PriorityRWLock, ReadGuard, WriteGuard};
pub use semaphore::Semaphore;
