//! Explicit operation results for the presentation boundary.

use qcomm_core::error::QCommError;
use serde::Serialize;

/// Result shape returned by every dashboard operation.
///
/// Errors never cross the service boundary; they arrive here as
/// `success == false` with a human-readable `reason`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationOutcome<T> {
    pub success: bool,
    pub value: Option<T>,
    pub reason: Option<String>,
    /// Set when the failure was a missing session or entity.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub not_found: bool,
}

impl<T> OperationOutcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            reason: None,
            not_found: false,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            value: None,
            reason: Some(reason.into()),
            not_found: false,
        }
    }

    pub fn from_error(err: &QCommError) -> Self {
        Self {
            not_found: err.is_not_found(),
            ..Self::failed(err.to_string())
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_not_found(&self) -> bool {
        self.not_found
    }

    /// Converts back into a `Result`, for callers that want `?`.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.value) {
            (true, Some(value)) => Ok(value),
            (_, _) => Err(self.reason.unwrap_or_else(|| "operation failed".to_string())),
        }
    }
}
