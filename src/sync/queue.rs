//! # Cola Acotada Productor/Consumidor
//! src/sync/queue.rs
//!
//! Cola FIFO de capacidad fija que entrega conexiones del dispatcher a los
//! workers. Se coordina con tres primitivas:
//!
//! - `free`: semáforo de espacios libres (inicia en `capacity`)
//! - `filled`: semáforo de espacios ocupados (inicia en 0)
//! - `ring`: mutex que protege los índices head/tail del buffer circular
//!
//! `push` bloquea mientras la cola está llena y `pop` mientras está vacía.
//! Nunca se descartan elementos.

use crate::error::QueueError;
use crate::sync::semaphore::Semaphore;
use parking_lot::Mutex;

/// Buffer circular con índices que dan la vuelta (`(i + 1) % capacity`)
struct Ring<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> Ring<T> {
    fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    fn put(&mut self, item: T) {
        debug_assert!(self.len < self.slots.len());
        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.slots.len();
        self.len += 1;
    }

    fn take(&mut self) -> Option<T> {
        let item = self.slots[self.head].take()?;
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        Some(item)
    }
}

/// Cola FIFO bloqueante de capacidad fija
pub struct BoundedQueue<T> {
    ring: Mutex<Ring<T>>,
    free: Semaphore,
    filled: Semaphore,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Crea una cola con capacidad fija
    ///
    /// # Errores
    ///
    /// `QueueError::ZeroCapacity` si `capacity == 0`
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }

        Ok(Self {
            ring: Mutex::new(Ring::with_capacity(capacity)),
            free: Semaphore::new(capacity),
            filled: Semaphore::new(0),
            capacity,
        })
    }

    /// Inserta al final, bloqueando hasta que haya un espacio libre
    pub fn push(&self, item: T) {
        self.free.acquire();
        self.ring.lock().put(item);
        self.filled.release();
    }

    /// Remueve el elemento del frente, bloqueando hasta que exista uno
    pub fn pop(&self) -> T {
        loop {
            self.filled.acquire();
            // `filled` solo se libera después de `put`, así que el slot
            // del frente siempre está ocupado aquí.
            if let Some(item) = self.ring.lock().take() {
                self.free.release();
                return item;
            }
            self.filled.release();
        }
    }

    /// Número de elementos encolados
    pub fn len(&self) -> usize {
        self.ring.lock().len
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacidad máxima
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
