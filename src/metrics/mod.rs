//! # Sistema de Métricas
//!
//! Estadísticas de los workers: requests atendidos, códigos de estado,
//! latencia promedio y workers ocupados.

pub mod collector;

pub use collector::{ServerStats, StatsSnapshot};
