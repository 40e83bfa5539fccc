//! In-process collaborators and configuration loading for QComm.

pub mod config_service;
pub mod link_verifier;
pub mod marker_translator;
pub mod notifier;
pub mod paths;
pub mod pattern_analyzer;
pub mod signature;
pub mod simulated_diagnostics;
pub mod transmitter;

pub use crate::config_service::ConfigService;
pub use crate::link_verifier::SignatureLinkVerifier;
pub use crate::marker_translator::GlyphTranslator;
pub use crate::notifier::{ChannelNotifier, RecordingNotifier, TracingNotifier};
pub use crate::pattern_analyzer::KeywordPatternAnalyzer;
pub use crate::simulated_diagnostics::SimulatedDiagnostics;
pub use crate::transmitter::{LocalTransmitter, TransmissionReceipt};
