//! # Semáforo Contador
//! src/sync/semaphore.rs
//!
//! Semáforo clásico (wait/post) construido sobre un `Mutex` y un `Condvar`.
//! La cola acotada usa dos de estos para contar espacios libres y ocupados.

use parking_lot::{Condvar, Mutex};

/// Semáforo contador bloqueante
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Crea un semáforo con `permits` permisos iniciales
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Toma un permiso, bloqueando mientras el contador sea 0 (`sem_wait`)
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// Toma un permiso solo si hay uno disponible
    pub fn try_acquire(&self) -> bool {
        let mut permits = self.permits.lock();
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    /// Devuelve un permiso y despierta a un hilo en espera (`sem_post`)
    pub fn release(&self) {
        let mut permits = self.permits.lock();
        *permits += 1;
        self.available.notify_one();
    }

    /// Permisos disponibles en este instante
    pub fn available(&self) -> usize {
        *self.permits.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_acquire_release_counts() {
        let sem = Semaphore::new(2);
        sem.acquire();
        sem.acquire();
        assert_eq!(sem.available(), 0);
        assert!(!sem.try_acquire());

        sem.release();
        assert_eq!(sem.available(), 1);
        assert!(sem.try_acquire());
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let sem = Arc::new(Semaphore::new(0));

        let waiter = thread::spawn({
            let sem = Arc::clone(&sem);
            move || {
                sem.acquire();
            }
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());

        sem.release();
        waiter.join().unwrap();
        assert_eq!(sem.available(), 0);
    }
}
