//! Local stand-in for message transmission.
//!
//! Nothing leaves the process: a transmission is acknowledged immediately
//! (or after a fixed delay) with a decorative signature.

use crate::signature::sign;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionStatus {
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionReceipt {
    pub status: TransmissionStatus,
    pub signature: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default)]
pub struct LocalTransmitter {
    delay: Option<Duration>,
}

impl LocalTransmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay) }
    }

    pub async fn transmit(&self, session_id: &str, payload: &str) -> TransmissionReceipt {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let timestamp = chrono::Utc::now().to_rfc3339();
        let signature = sign(&[session_id, payload, &timestamp]);
        tracing::debug!(target: "transmission", session_id, signature = %signature, "Payload transmitted");
        TransmissionReceipt {
            status: TransmissionStatus::Delivered,
            signature,
            timestamp,
        }
    }
}
