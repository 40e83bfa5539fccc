//! Application layer for the qcomm dashboard.
//!
//! Owns the simulation state behind [`DashboardService`], drives its periodic
//! timers through an injectable [`Clock`](scheduler::Clock) and reports every
//! operation as an [`OperationOutcome`].

pub mod dashboard;
pub mod outcome;
pub mod scheduler;

pub use dashboard::{DashboardBuilder, DashboardService, DashboardSnapshot, RoutedResponse, SentMessage};
pub use outcome::OperationOutcome;
pub use scheduler::{Clock, ManualClock, TickControl, TimerHandle, TimerKind, TokioClock};
