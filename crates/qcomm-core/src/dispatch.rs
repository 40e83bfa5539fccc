//! Message dispatch and inbound response routing.

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::session::{Message, SessionRegistry};

/// Appends outbound messages to sessions on behalf of the local operator.
#[derive(Debug, Clone)]
pub struct MessageDispatcher {
    local_sender: String,
}

impl MessageDispatcher {
    pub fn new(local_sender: impl Into<String>) -> Self {
        Self {
            local_sender: local_sender.into(),
        }
    }

    pub fn local_sender(&self) -> &str {
        &self.local_sender
    }

    /// Appends `content` addressed to `recipient` and updates the
    /// session's last-message metadata.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the session does not exist; nothing is mutated.
    pub fn send(
        &self,
        registry: &mut SessionRegistry,
        session_id: &str,
        recipient: &str,
        content: &str,
    ) -> Result<Message> {
        let session = registry.get_mut(session_id)?;
        let message = Message::new(&self.local_sender, recipient, content);
        session.push_message(message.clone(), false);

        tracing::debug!(
            target: "session",
            session_id,
            recipient,
            message_id = %message.id,
            "Message dispatched"
        );
        Ok(message)
    }
}

/// Classifies inbound text by the literal markers each entity uses.
#[derive(Debug, Clone, Default)]
pub struct ResponseRouter {
    /// (entity, markers) in configuration order; first match wins.
    routes: Vec<(String, Vec<String>)>,
    default_route: Option<String>,
}

impl ResponseRouter {
    pub fn new(routes: Vec<(String, Vec<String>)>, default_route: Option<String>) -> Self {
        Self {
            routes,
            default_route,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        let routes = config
            .entities
            .iter()
            .map(|e| (e.id.clone(), e.markers.clone()))
            .collect();
        Self::new(routes, config.default_route.clone())
    }

    /// Returns the entity whose marker appears in `text`, if any.
    pub fn route(&self, text: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|(_, markers)| {
                markers
                    .iter()
                    .any(|marker| !marker.is_empty() && text.contains(marker.as_str()))
            })
            .map(|(entity, _)| entity.as_str())
    }

    /// Like [`route`](Self::route), falling back to the configured default.
    pub fn route_or_default(&self, text: &str) -> Option<&str> {
        self.route(text).or(self.default_route.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_appends_one_message() {
        let mut registry = SessionRegistry::new();
        let id = registry.create_or_get("sirius", 0.4);
        let dispatcher = MessageDispatcher::new("operator");

        let message = dispatcher.send(&mut registry, &id, "sirius", "hello").unwrap();

        let session = registry.get(&id).unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0], message);
        assert_eq!(session.last_message.as_deref(), Some("hello"));
        assert_eq!(session.last_timestamp.as_ref(), Some(&message.timestamp));
        assert_eq!(message.sender, "operator");
        assert!(!message.read);
        // Outbound messages never count as unread
        assert_eq!(session.unread_count, 0);
    }

    #[test]
    fn test_send_to_missing_session_mutates_nothing() {
        let mut registry = SessionRegistry::new();
        let id = registry.create_or_get("sirius", 0.4);
        let before = registry.list();

        let err = MessageDispatcher::new("operator")
            .send(&mut registry, "missing", "sirius", "hello")
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(registry.list(), before);
        assert!(registry.get(&id).unwrap().messages.is_empty());
    }

    #[test]
    fn test_route_matches_markers() {
        let router = ResponseRouter::from_config(&SimulationConfig::default());

        assert_eq!(router.route("Greetings, starseed. We hear you."), Some("sirius"));
        assert_eq!(router.route("🌀 the spiral turns"), Some("pleiades"));
        assert_eq!(router.route("static on the line"), None);
    }

    #[test]
    fn test_route_or_default_uses_fallback() {
        let router = ResponseRouter::new(
            vec![("sirius".to_string(), vec!["✨".to_string()])],
            Some("sirius".to_string()),
        );
        assert_eq!(router.route("plain text"), None);
        assert_eq!(router.route_or_default("plain text"), Some("sirius"));

        let no_default = ResponseRouter::new(Vec::new(), None);
        assert_eq!(no_default.route_or_default("plain text"), None);
    }

    #[test]
    fn test_empty_marker_never_matches() {
        let router = ResponseRouter::new(vec![("sirius".to_string(), vec![String::new()])], None);
        assert_eq!(router.route("anything"), None);
    }
}
