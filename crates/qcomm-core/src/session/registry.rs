use super::analysis::{LinkVerification, LinkVerifier, PatternAnalysis, PatternAnalyzer};
use super::message::Message;
use super::model::Session;
use crate::error::{QCommError, Result};
use std::collections::HashMap;
use uuid::Uuid;

/// Entity-keyed registry of sessions.
///
/// `SessionRegistry` is responsible for:
/// - Creating sessions on first reference to an entity
/// - Guaranteeing at most one session per entity
/// - Applying link verification and history analysis results
///
/// Sessions are never removed; they live as long as the registry.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
    /// entity -> session id
    by_entity: HashMap<String, String>,
    /// Session ids in creation order
    order: Vec<String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session id for `entity`, creating the session if needed.
    ///
    /// `connection_strength` is only used when a new session is created.
    pub fn create_or_get(&mut self, entity: &str, connection_strength: f64) -> String {
        if let Some(id) = self.by_entity.get(entity) {
            return id.clone();
        }

        let id = Uuid::new_v4().to_string();
        let session = Session::new(id.clone(), entity.to_string(), connection_strength);
        self.sessions.insert(id.clone(), session);
        self.by_entity.insert(entity.to_string(), id.clone());
        self.order.push(id.clone());

        tracing::info!(target: "session", session_id = %id, entity, "Session created");
        id
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn find_by_entity(&self, entity: &str) -> Option<&Session> {
        self.by_entity
            .get(entity)
            .and_then(|id| self.sessions.get(id))
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Snapshot of all sessions in creation order.
    pub fn list(&self) -> Vec<Session> {
        self.order
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .cloned()
            .collect()
    }

    pub(crate) fn get_mut(&mut self, session_id: &str) -> Result<&mut Session> {
        self.sessions
            .get_mut(session_id)
            .ok_or_else(|| QCommError::not_found("Session", session_id))
    }

    /// Applies `updater` to a single session.
    ///
    /// The updater runs on a copy; the session is only replaced when it
    /// returns `Ok`, so a failing update leaves no partial mutation.
    pub fn update<F>(&mut self, session_id: &str, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        let session = self.get_mut(session_id)?;
        let mut draft = session.clone();
        updater(&mut draft)?;
        draft.connection_strength = draft.connection_strength.clamp(0.0, 1.0);
        *session = draft;
        Ok(())
    }

    /// Applies `updater` to every session.
    pub fn update_all<F>(&mut self, mut updater: F)
    where
        F: FnMut(&mut Session),
    {
        for session in self.sessions.values_mut() {
            updater(session);
            session.connection_strength = session.connection_strength.clamp(0.0, 1.0);
        }
    }

    /// Runs the external link check and marks the session verified on success.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist (the verifier is not called)
    /// - any error reported by the verifier; the session is left unchanged
    pub async fn verify_link(
        &mut self,
        session_id: &str,
        verifier: &dyn LinkVerifier,
    ) -> Result<LinkVerification> {
        if !self.contains(session_id) {
            return Err(QCommError::not_found("Session", session_id));
        }

        let verification = verifier.verify_link(session_id).await?;
        if verification.verified {
            self.get_mut(session_id)?.link_verified = true;
        }

        tracing::debug!(
            target: "session",
            session_id,
            verified = verification.verified,
            "Link verification finished"
        );
        Ok(verification)
    }

    /// Delegates the session's message history to `analyzer`.
    pub async fn analyze_history(
        &self,
        session_id: &str,
        analyzer: &dyn PatternAnalyzer,
    ) -> Result<PatternAnalysis> {
        let session = self
            .get(session_id)
            .ok_or_else(|| QCommError::not_found("Session", session_id))?;
        analyzer.analyze_patterns(&session.messages).await
    }

    /// Appends an inbound message from `sender`, counting it as unread.
    pub fn receive(
        &mut self,
        session_id: &str,
        sender: &str,
        local_recipient: &str,
        content: &str,
    ) -> Result<Message> {
        let session = self.get_mut(session_id)?;
        let message = Message::new(sender, local_recipient, content);
        session.push_message(message.clone(), true);
        Ok(message)
    }

    /// Marks every message read and resets the unread counter.
    ///
    /// Returns the number of messages that were unread.
    pub fn mark_read(&mut self, session_id: &str) -> Result<u32> {
        let session = self.get_mut(session_id)?;
        let cleared = session.unread_count;
        for message in session.messages.iter_mut() {
            message.read = true;
        }
        session.unread_count = 0;
        Ok(cleared)
    }
}
