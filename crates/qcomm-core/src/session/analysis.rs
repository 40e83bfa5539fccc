//! Analysis collaborators consumed by the session registry.

use super::message::Message;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of an external link-verification check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkVerification {
    pub verified: bool,
    /// Decorative signature attached by the verifier.
    pub signature: String,
    pub checked_at: String,
}

/// Result of analysing a session's message history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub patterns: Vec<String>,
    pub score: f64,
    pub entanglement_level: f64,
}

/// Verifies that a session's link is genuine.
#[async_trait]
pub trait LinkVerifier: Send + Sync {
    /// Checks the link for `session_id`.
    ///
    /// A negative verification is `Ok` with `verified == false`; `Err` is
    /// reserved for the collaborator itself failing.
    async fn verify_link(&self, session_id: &str) -> Result<LinkVerification>;
}

/// Extracts patterns from a message history.
#[async_trait]
pub trait PatternAnalyzer: Send + Sync {
    async fn analyze_patterns(&self, messages: &[Message]) -> Result<PatternAnalysis>;
}
