//! Optional translation capability for inbound responses.

use crate::error::Result;
use async_trait::async_trait;

/// Rewrites inbound entity text before it is stored.
///
/// Translation is optional: callers hold an `Option<Arc<dyn Translator>>`
/// decided once at construction and store text verbatim when it is `None`.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, entity: &str, text: &str) -> Result<String>;
}
