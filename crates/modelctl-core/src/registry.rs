//! Adapter registry: protocol id → adapter instance routing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::debug;

use crate::ports::RuntimeAdapter;

/// Errors that can occur when resolving an adapter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No adapter is registered under the requested protocol id. This is
    /// a programmer/configuration error and is surfaced immediately.
    #[error("protocol not found: {0}")]
    ProtocolNotFound(String),
}

/// Process-wide lookup from protocol identifier to adapter instance.
///
/// Pure routing: the registry holds no model state. Construct one at
/// process start (see `modelctl-bootstrap`), register the built-in
/// adapters, and share it as `Arc<AdapterRegistry>`. Registering under an
/// existing id overwrites the prior adapter.
#[derive(Debug, Default)]
pub struct AdapterRegistry {
    adapters: RwLock<HashMap<String, Arc<dyn RuntimeAdapter>>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an adapter keyed by its declared protocol id, overwriting
    /// any prior registration for that key.
    pub fn register(&self, adapter: Arc<dyn RuntimeAdapter>) {
        let id = adapter.protocol_id().to_string();
        debug!(protocol = %id, "registering runtime adapter");
        self.adapters
            .write()
            .expect("adapter registry lock poisoned")
            .insert(id, adapter);
    }

    /// Return the adapter registered for `protocol_id`.
    pub fn resolve(&self, protocol_id: &str) -> Result<Arc<dyn RuntimeAdapter>, RegistryError> {
        self.adapters
            .read()
            .expect("adapter registry lock poisoned")
            .get(protocol_id)
            .cloned()
            .ok_or_else(|| RegistryError::ProtocolNotFound(protocol_id.to_string()))
    }

    /// Protocol ids currently registered, in no particular order.
    #[must_use]
    pub fn protocol_ids(&self) -> Vec<String> {
        self.adapters
            .read()
            .expect("adapter registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InteractionResult, RuntimeConfig, RuntimeStatus};
    use crate::ports::{AdapterError, ChunkHandler};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct StubAdapter {
        id: &'static str,
        version: &'static str,
    }

    #[async_trait]
    impl RuntimeAdapter for StubAdapter {
        fn protocol_id(&self) -> &'static str {
            self.id
        }

        fn protocol_name(&self) -> &'static str {
            self.id
        }

        fn protocol_version(&self) -> &'static str {
            self.version
        }

        async fn initialize(&self, _config: &RuntimeConfig) -> Result<(), AdapterError> {
            Ok(())
        }

        async fn start(&self) -> Result<(), AdapterError> {
            Ok(())
        }

        async fn stop(&self) {}

        async fn status(&self) -> RuntimeStatus {
            RuntimeStatus::connected(None)
        }

        async fn load_model(&self, _model_id: &str) -> Result<(), AdapterError> {
            Ok(())
        }

        async fn unload_model(&self) {}

        async fn list_available_models(&self) -> Vec<String> {
            vec![]
        }

        async fn generate_response(
            &self,
            _prompt: &str,
            _context: Option<&str>,
        ) -> Result<InteractionResult, AdapterError> {
            Err(AdapterError::NoModelLoaded)
        }

        async fn stream_response(
            &self,
            _prompt: &str,
            _context: Option<&str>,
            _on_chunk: Option<ChunkHandler<'_>>,
        ) -> Result<InteractionResult, AdapterError> {
            Err(AdapterError::NoModelLoaded)
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = AdapterRegistry::new();
        registry.register(Arc::new(StubAdapter {
            id: "stub",
            version: "1",
        }));

        let adapter = registry.resolve("stub").unwrap();
        assert_eq!(adapter.protocol_id(), "stub");
    }

    #[test]
    fn test_resolve_unknown_protocol() {
        let registry = AdapterRegistry::new();
        let err = registry.resolve("missing").unwrap_err();
        assert_eq!(err, RegistryError::ProtocolNotFound("missing".to_string()));
    }

    #[test]
    fn test_register_overwrites_prior_registration() {
        let registry = AdapterRegistry::new();
        registry.register(Arc::new(StubAdapter {
            id: "stub",
            version: "1",
        }));
        registry.register(Arc::new(StubAdapter {
            id: "stub",
            version: "2",
        }));

        let adapter = registry.resolve("stub").unwrap();
        assert_eq!(adapter.protocol_version(), "2");
        assert_eq!(registry.protocol_ids(), vec!["stub".to_string()]);
    }
}
