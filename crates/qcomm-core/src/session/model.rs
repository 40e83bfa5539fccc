//! Session domain model.

use super::message::Message;
use serde::{Deserialize, Serialize};

/// Per-entity conversation state.
///
/// Exactly one session exists per entity; the registry enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// The entity this session talks to (unique key in the registry).
    pub entity: String,
    /// Simulated link quality in `[0, 1]`.
    pub connection_strength: f64,
    /// Creation time (ISO 8601 format).
    pub timestamp: String,
    pub messages: Vec<Message>,
    pub link_verified: bool,
    pub last_message: Option<String>,
    pub last_timestamp: Option<String>,
    pub unread_count: u32,
}

impl Session {
    pub(crate) fn new(id: String, entity: String, connection_strength: f64) -> Self {
        Self {
            id,
            entity,
            connection_strength: connection_strength.clamp(0.0, 1.0),
            timestamp: chrono::Utc::now().to_rfc3339(),
            messages: Vec::new(),
            link_verified: false,
            last_message: None,
            last_timestamp: None,
            unread_count: 0,
        }
    }

    /// Appends a message and refreshes the "last message" metadata.
    ///
    /// Only inbound messages count toward `unread_count`.
    pub(crate) fn push_message(&mut self, message: Message, inbound: bool) {
        self.last_message = Some(message.content.clone());
        self.last_timestamp = Some(message.timestamp.clone());
        if inbound {
            self.unread_count += 1;
        }
        self.messages.push(message);
    }
}
