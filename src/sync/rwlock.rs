//! # Lock Lector/Escritor con Prioridad Configurable
//! src/sync/rwlock.rs
//!
//! Coordina lectores (GET) y escritores (PUT) sobre un mismo recurso.
//! La política de equidad se elige al construir el lock:
//!
//! - **Readers**: un lector solo espera si hay un escritor activo. Un
//!   escritor espera a que terminen los lectores activos y los que ya
//!   estaban esperando. Puede dejar sin turno a los escritores.
//! - **Writers**: un lector espera si hay un escritor activo o esperando.
//!   Puede dejar sin turno a los lectores.
//! - **NWay(n)**: como mucho `n` lectores son admitidos seguidos mientras
//!   un escritor espera; cuando el escritor libera, el contador se reinicia
//!   y hasta `n` lectores vuelven a pasar antes que el siguiente escritor.
//!
//! ## Estados
//!
//! ```text
//! IDLE → READING (1..k lectores) → IDLE → WRITING (1 escritor) → IDLE → ...
//! ```
//!
//! Liberar sin haber adquirido es una violación de contrato: se detecta con
//! `debug_assert!` y no se reporta como error.

use parking_lot::{Condvar, Mutex};
use serde::Serialize;

/// Política de equidad del lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockPolicy {
    /// Preferencia a lectores
    Readers,

    /// Preferencia a escritores
    Writers,

    /// Alternancia acotada: hasta N lectores por turno de escritor
    NWay(usize),
}

impl LockPolicy {
    /// Política N-way; `n` menor a 1 se ajusta a 1
    pub fn n_way(n: usize) -> Self {
        LockPolicy::NWay(n.max(1))
    }

    /// Nombre corto para logs
    pub fn as_str(&self) -> &'static str {
        match self {
            LockPolicy::Readers => "readers",
            LockPolicy::Writers => "writers",
            LockPolicy::NWay(_) => "n-way",
        }
    }
}

impl Default for LockPolicy {
    fn default() -> Self {
        LockPolicy::NWay(1)
    }
}

impl std::fmt::Display for LockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockPolicy::NWay(n) => write!(f, "n-way({})", n),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Contadores internos, protegidos por el mutex del lock
#[derive(Debug, Default)]
struct LockState {
    readers: usize,
    writer: bool,
    waiting_readers: usize,
    waiting_writers: usize,
    /// Lectores admitidos desde que el último escritor liberó
    served_readers: usize,
}

/// Foto de los contadores del lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockSnapshot {
    pub active_readers: usize,
    pub active_writers: usize,
    pub waiting_readers: usize,
    pub waiting_writers: usize,
    pub served_readers: usize,
}

/// Lock lector/escritor con política de prioridad
pub struct PriorityRWLock {
    state: Mutex<LockState>,
    read: Condvar,
    write: Condvar,
    policy: LockPolicy,
}

impl PriorityRWLock {
    /// Crea un lock libre con la política dada
    pub fn new(policy: LockPolicy) -> Self {
        let policy = match policy {
            LockPolicy::NWay(n) => LockPolicy::n_way(n),
            other => other,
        };

        Self {
            state: Mutex::new(LockState::default()),
            read: Condvar::new(),
            write: Condvar::new(),
            policy,
        }
    }

    /// Política configurada
    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    /// ¿Puede entrar un lector en este estado?
    fn reader_admissible(&self, state: &LockState) -> bool {
        if state.writer {
            return false;
        }

        match self.policy {
            LockPolicy::Readers => true,
            LockPolicy::Writers => state.waiting_writers == 0,
            LockPolicy::NWay(n) => state.waiting_writers == 0 || state.served_readers < n,
        }
    }

    /// ¿Puede entrar un escritor en este estado?
    fn writer_admissible(&self, state: &LockState) -> bool {
        if state.writer || state.readers > 0 {
            return false;
        }

        match self.policy {
            LockPolicy::Readers => state.waiting_readers == 0,
            LockPolicy::Writers => true,
            // Los lectores en espera aún no recibieron su turno acotado
            LockPolicy::NWay(n) => state.waiting_readers == 0 || state.served_readers >= n,
        }
    }

    /// Adquiere el lock en modo lectura, bloqueando según la política
    pub fn acquire_read(&self) {
        let mut state = self.state.lock();
        state.waiting_readers += 1;

        while !self.reader_admissible(&state) {
            self.read.wait(&mut state);
        }

        state.waiting_readers -= 1;
        state.readers += 1;
        state.served_readers = state.served_readers.saturating_add(1);
    }

    /// Libera un lector; el último en salir despierta a un escritor
    pub fn release_read(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.readers > 0, "release_read without acquire_read");
        state.readers = state.readers.saturating_sub(1);

        if state.readers == 0 && state.waiting_writers > 0 {
            self.write.notify_one();
        }
    }

    /// Adquiere el lock en modo escritura, bloqueando según la política
    pub fn acquire_write(&self) {
        let mut state = self.state.lock();
        state.waiting_writers += 1;

        while !self.writer_admissible(&state) {
            self.write.wait(&mut state);
        }

        state.waiting_writers -= 1;
        state.writer = true;
    }

    /// Libera al escritor, reinicia el turno de lectores y despierta según la política
    pub fn release_write(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.writer, "release_write without acquire_write");
        state.writer = false;
        state.served_readers = 0;

        match self.policy {
            LockPolicy::Writers => {
                if state.waiting_writers > 0 {
                    self.write.notify_one();
                } else {
                    self.read.notify_all();
                }
            }
            LockPolicy::Readers | LockPolicy::NWay(_) => {
                // Cada lector despertado vuelve a evaluar su condición,
                // así que despertar de más no admite a nadie de más.
                if state.waiting_readers > 0 {
                    self.read.notify_all();
                } else if state.waiting_writers > 0 {
                    self.write.notify_one();
                }
            }
        }
    }

    /// Adquiere en modo lectura y devuelve un guard que libera al salir de scope
    pub fn read(&self) -> ReadGuard<'_> {
        self.acquire_read();
        ReadGuard { lock: self }
    }

    /// Adquiere en modo escritura y devuelve un guard que libera al salir de scope
    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire_write();
        WriteGuard { lock: self }
    }

    /// Contadores actuales del lock
    pub fn snapshot(&self) -> LockSnapshot {
        let state = self.state.lock();
        LockSnapshot {
            active_readers: state.readers,
            active_writers: usize::from(state.writer),
            waiting_readers: state.waiting_readers,
            waiting_writers: state.waiting_writers,
            served_readers: state.served_readers,
        }
    }
}

impl std::fmt::Debug for PriorityRWLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityRWLock")
            .field("policy", &self.policy)
            .field("state", &self.snapshot())
            .finish()
    }
}

/// Guard de lectura; llama a `release_read` en `Drop`
#[must_use = "el lock se libera en cuanto se descarta el guard"]
pub struct ReadGuard<'a> {
    lock: &'a PriorityRWLock,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// Guard de escritura; llama a `release_write` en `Drop`
#[must_use = "el lock se libera en cuanto se descarta el guard"]
pub struct WriteGuard<'a> {
    lock: &'a PriorityRWLock,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn wait_until(lock: &PriorityRWLock, check: impl Fn(LockSnapshot) -> bool) {
        for _ in 0..500 {
            if check(lock.snapshot()) {
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("timed out, last snapshot: {:?}", lock.snapshot());
    }

    #[test]
    fn test_n_way_zero_is_clamped() {
        assert_eq!(LockPolicy::n_way(0), LockPolicy::NWay(1));
        let lock = PriorityRWLock::new(LockPolicy::NWay(0));
        assert_eq!(lock.policy(), LockPolicy::NWay(1));
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(LockPolicy::Readers.to_string(), "readers");
        assert_eq!(LockPolicy::Writers.to_string(), "writers");
        assert_eq!(LockPolicy::NWay(3).to_string(), "n-way(3)");
        assert_eq!(LockPolicy::default(), LockPolicy::NWay(1));
    }

    #[test]
    fn test_multiple_readers_share() {
        let lock = PriorityRWLock::new(LockPolicy::Readers);
        lock.acquire_read();
        lock.acquire_read();

        let snap = lock.snapshot();
        assert_eq!(snap.active_readers, 2);
        assert_eq!(snap.active_writers, 0);

        lock.release_read();
        lock.release_read();
        assert_eq!(lock.snapshot().active_readers, 0);
    }

    #[test]
    fn test_guards_release_on_drop() {
        let lock = PriorityRWLock::new(LockPolicy::default());
        {
            let _w = lock.write();
            assert_eq!(lock.snapshot().active_writers, 1);
        }
        {
            let _r1 = lock.read();
            let _r2 = lock.read();
            assert_eq!(lock.snapshot().active_readers, 2);
        }
        let snap = lock.snapshot();
        assert_eq!(snap.active_readers, 0);
        assert_eq!(snap.active_writers, 0);
    }

    #[test]
    fn test_writer_waits_for_reader() {
        let lock = Arc::new(PriorityRWLock::new(LockPolicy::Writers));
        lock.acquire_read();

        let writer = thread::spawn({
            let lock = Arc::clone(&lock);
            move || {
                lock.acquire_write();
                lock.release_write();
            }
        });

        wait_until(&lock, |s| s.waiting_writers == 1);
        assert!(!writer.is_finished());

        lock.release_read();
        writer.join().unwrap();
    }

    #[test]
    fn test_reader_waits_for_writer() {
        let lock = Arc::new(PriorityRWLock::new(LockPolicy::Readers));
        lock.acquire_write();

        let reader = thread::spawn({
            let lock = Arc::clone(&lock);
            move || {
                lock.acquire_read();
                lock.release_read();
            }
        });

        wait_until(&lock, |s| s.waiting_readers == 1);
        lock.release_write();
        reader.join().unwrap();
    }

    #[test]
    fn test_release_write_resets_served_readers() {
        let lock = PriorityRWLock::new(LockPolicy::n_way(2));
        lock.acquire_read();
        lock.release_read();
        lock.acquire_read();
        lock.release_read();
        assert_eq!(lock.snapshot().served_readers, 2);

        lock.acquire_write();
        lock.release_write();
        assert_eq!(lock.snapshot().served_readers, 0);
    }

    #[test]
    fn test_reader_preference_admits_reader_past_waiting_writer() {
        let lock = Arc::new(PriorityRWLock::new(LockPolicy::Readers));
        lock.acquire_read();

        let writer = thread::spawn({
            let lock = Arc::clone(&lock);
            move || {
                lock.acquire_write();
                lock.release_write();
            }
        });
        wait_until(&lock, |s| s.waiting_writers == 1);

        // Con preferencia a lectores un lector nuevo entra aunque haya un escritor esperando
        lock.acquire_read();
        assert_eq!(lock.snapshot().active_readers, 2);

        lock.release_read();
        lock.release_read();
        writer.join().unwrap();
    }

    #[test]
    fn test_n_way_readers_pass_when_no_writer_waits() {
        let lock = PriorityRWLock::new(LockPolicy::n_way(1));
        // Sin escritores esperando el tope no aplica
        for _ in 0..5 {
            lock.acquire_read();
        }
        assert_eq!(lock.snapshot().active_readers, 5);
        for _ in 0..5 {
            lock.release_read();
        }
    }
}
