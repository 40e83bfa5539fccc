//! Notification sinks.

use qcomm_core::notification::{Notification, Notifier, Severity};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Writes notifications to the tracing pipeline.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Error => tracing::error!(target: "notification", title = %n.title, "{}", n.body),
            Severity::Warning => tracing::warn!(target: "notification", title = %n.title, "{}", n.body),
            Severity::Info | Severity::Success => {
                tracing::info!(target: "notification", title = %n.title, severity = %n.severity, "{}", n.body)
            }
        }
    }
}

/// Forwards notifications to a presentation channel.
///
/// If the receiver is dropped the notification is discarded.
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new(sender: mpsc::UnboundedSender<Notification>) -> Self {
        Self { sender }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.sender.send(notification);
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    records: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Notification> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut records) = self.records.lock() {
            records.push(notification);
        }
    }
}
