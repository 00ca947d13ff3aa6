//! Runtime status snapshots.

use serde::{Deserialize, Serialize};

/// A point-in-time view of a runtime's state.
///
/// Computed fresh on every query — never cached — because the underlying
/// runtime process can change out-of-band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    /// Whether a model is loaded and serving.
    pub is_running: bool,
    /// Whether the runtime's server answered at all.
    pub is_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_model: Option<String>,
}

impl RuntimeStatus {
    /// Status for a runtime whose server did not answer.
    #[must_use]
    pub fn unreachable(error: impl Into<String>) -> Self {
        Self {
            is_running: false,
            is_connected: false,
            error: Some(error.into()),
            current_model: None,
        }
    }

    /// Status for a reachable runtime with the given current model.
    #[must_use]
    pub fn connected(current_model: Option<String>) -> Self {
        Self {
            is_running: current_model.is_some(),
            is_connected: true,
            error: None,
            current_model,
        }
    }
}
