//! Runtime plumbing shared by the qcomm front ends: subscriber setup and
//! the event layer that feeds dashboard views.

pub mod telemetry;
pub mod tracing_layer;

pub use telemetry::{InitError, TelemetryOptions, init_tracing};
pub use tracing_layer::{DASHBOARD_TARGETS, DashboardEvent, DashboardEventLayer};
