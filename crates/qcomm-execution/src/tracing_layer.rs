//! Tracing layer that streams simulation events to a dashboard channel.
//!
//! Only events emitted under the simulation's own targets are forwarded;
//! everything else (tokio internals, dependencies) is ignored.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Tracing targets used by the simulation crates.
pub const DASHBOARD_TARGETS: &[&str] = &[
    "connection",
    "stability",
    "session",
    "repair",
    "scheduler",
    "notification",
    "transmission",
];

/// A captured event, ready for a frontend.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardEvent {
    /// Event target (e.g. "repair")
    pub target: String,
    /// Log level (INFO, DEBUG, WARN, ERROR)
    pub level: String,
    pub message: String,
    /// Structured fields, minus `message`
    pub fields: HashMap<String, Value>,
    pub timestamp: String,
}

pub struct DashboardEventLayer {
    sender: mpsc::UnboundedSender<DashboardEvent>,
    targets: Vec<String>,
}

impl DashboardEventLayer {
    /// Creates a layer forwarding events from [`DASHBOARD_TARGETS`].
    pub fn new(sender: mpsc::UnboundedSender<DashboardEvent>) -> Self {
        Self::with_targets(sender, DASHBOARD_TARGETS.iter().copied())
    }

    pub fn with_targets<'a>(
        sender: mpsc::UnboundedSender<DashboardEvent>,
        targets: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            sender,
            targets: targets.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DashboardEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn accepts(&self, target: &str) -> bool {
        self.targets.iter().any(|t| t == target)
    }
}

impl<S> Layer<S> for DashboardEventLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !self.accepts(metadata.target()) {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        let message = match fields.remove("message") {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let dashboard_event = DashboardEvent {
            target: metadata.target().to_string(),
            level: metadata.level().to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver gone means nobody is watching
        let _ = self.sender.send(dashboard_event);
    }
}

/// Collects event fields into JSON values.
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}
