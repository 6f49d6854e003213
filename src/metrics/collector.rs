//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Cuenta lo que hacen los workers: requests por método y por código,
//! requests rechazados antes de tocar un lock, panics recuperados y
//! workers ocupados en este instante.

use crate::http::{Method, StatusCode};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct ServerStats {
    inner: Arc<Mutex<StatsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
#[derive(Default)]
struct StatsData {
    total_requests: u64,
    gets: u64,
    puts: u64,

    /// Requests rechazados en el parsing (nunca tomaron un lock)
    rejected: u64,

    /// Panics capturados en el borde del worker
    panics: u64,

    status_codes: BTreeMap<u16, u64>,

    /// Suma de latencias en microsegundos
    latency_total_us: u128,

    busy_workers: u64,
}

/// Foto serializable de las métricas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub uptime_secs: u64,
    pub total_requests: u64,
    pub gets: u64,
    pub puts: u64,
    pub rejected: u64,
    pub panics: u64,
    pub busy_workers: u64,
    pub avg_latency_us: u64,
    pub status_codes: BTreeMap<u16, u64>,
}

impl StatsSnapshot {
    /// Serializa la foto a JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
    }
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StatsData::default())),
            start_time: Instant::now(),
        }
    }

    /// Registra un request terminado
    ///
    /// `method` es `None` cuando el request no llegó a parsearse.
    pub fn record_request(&self, method: Option<Method>, status: StatusCode, latency: Duration) {
        let mut data = self.inner.lock();

        data.total_requests += 1;
        match method {
            Some(Method::GET) => data.gets += 1,
            Some(Method::PUT) => data.puts += 1,
            None => data.rejected += 1,
        }
        *data.status_codes.entry(status.as_u16()).or_insert(0) += 1;
        data.latency_total_us += latency.as_micros();
    }

    /// Registra un panic recuperado
    pub fn record_panic(&self) {
        self.inner.lock().panics += 1;
    }

    /// Un worker tomó una conexión
    pub fn worker_busy(&self) {
        self.inner.lock().busy_workers += 1;
    }

    /// Un worker volvió a la cola
    pub fn worker_idle(&self) {
        let mut data = self.inner.lock();
        data.busy_workers = data.busy_workers.saturating_sub(1);
    }

    /// Obtiene un snapshot de las métricas
    pub fn snapshot(&self) -> StatsSnapshot {
        let data = self.inner.lock();

        let avg_latency_us = if data.total_requests == 0 {
            0
        } else {
            (data.latency_total_us / u128::from(data.total_requests)) as u64
        };

        StatsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            total_requests: data.total_requests,
            gets: data.gets,
            puts: data.puts,
            rejected: data.rejected,
            panics: data.panics,
            busy_workers: data.busy_workers,
            avg_latency_us,
            status_codes: data.status_codes.clone(),
        }
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}
