//! Per-call runtime configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration selecting a runtime protocol for one call.
///
/// Created fresh by the caller per invocation and never persisted.
/// `parameters` carries adapter-specific overrides; the only key the
/// built-in adapter reads is `baseUrl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Which registered adapter handles this call.
    pub protocol_id: String,
    /// Adapter-specific overrides, opaque to the core.
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl RuntimeConfig {
    /// Create a minimal configuration for the given protocol.
    #[must_use]
    pub fn new(protocol_id: impl Into<String>) -> Self {
        let protocol_id = protocol_id.into();
        Self {
            id: protocol_id.clone(),
            name: protocol_id.clone(),
            description: String::new(),
            protocol_id,
            parameters: HashMap::new(),
        }
    }

    /// Set an adapter-specific parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Read a string-valued parameter, if present.
    #[must_use]
    pub fn string_parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(serde_json::Value::as_str)
    }
}
