//! Simulation core for the QComm dashboard.
//!
//! Holds the stateful pieces with real state-machine shape: per-entity
//! connection strengths, the session registry, the stability oscillator and
//! the bounded repair loop. Everything here is free of timers and I/O; the
//! application layer owns scheduling and wiring.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod notification;
pub mod random;
pub mod reading;
pub mod repair;
pub mod session;
pub mod stability;
pub mod translation;

// Re-export common error type
pub use error::{QCommError, Result};
