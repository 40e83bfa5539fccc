//! Global tracing subscriber setup.

use crate::tracing_layer::{DashboardEvent, DashboardEventLayer};
use std::io::IsTerminal;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "QCOMM_LOG";

#[derive(Debug, Default)]
pub struct TelemetryOptions {
    /// Emit newline-delimited JSON instead of human-readable lines.
    pub json: bool,
    /// Filter used when neither `QCOMM_LOG` nor `RUST_LOG` is set. Defaults to "info".
    pub default_filter: Option<String>,
    /// Also stream simulation events to this channel.
    pub events: Option<mpsc::UnboundedSender<DashboardEvent>>,
}

/// Installs the global subscriber. Logs go to stderr so stdout stays free
/// for command output.
pub fn init_tracing(options: TelemetryOptions) -> Result<(), InitError> {
    INITIALISED
        .set(())
        .map_err(|_| InitError::AlreadyInitialised)?;

    let default_filter = options.default_filter.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let ansi = std::io::stderr().is_terminal();
    let (json_layer, text_layer) = if options.json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr);
        (Some(layer), None)
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(ansi)
            .with_writer(std::io::stderr);
        (None, Some(layer))
    };
    let event_layer = options.events.map(DashboardEventLayer::new);

    Registry::default()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(event_layer)
        .try_init()
        .map_err(|e| InitError::Subscriber(e.to_string()))
}

/// Errors emitted when configuring the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("tracing has already been initialised")]
    AlreadyInitialised,
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        // The first call may race other tests for the global default; only the guard matters here
        let _ = init_tracing(TelemetryOptions::default());
        assert!(matches!(
            init_tracing(TelemetryOptions::default()),
            Err(InitError::AlreadyInitialised)
        ));
    }
}
