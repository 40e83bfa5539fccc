//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Per-entity session record (`Session`)
//! - `message`: Message records stored in a session (`Message`)
//! - `analysis`: Link verification and pattern-analysis collaborators
//! - `registry`: Entity-keyed session registry (`SessionRegistry`)

mod analysis;
mod message;
mod model;
mod registry;

pub use analysis::{LinkVerification, LinkVerifier, PatternAnalysis, PatternAnalyzer};
pub use message::Message;
pub use model::Session;
pub use registry::SessionRegistry;
