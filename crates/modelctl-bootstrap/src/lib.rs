//! Composition root for the modelctl control plane.
//!
//! Constructs one registry and one orchestrator at process start and
//! hands both to the embedding shell as explicit values — process-scoped
//! state passed by handle, not a global singleton. New runtimes plug in
//! by registering another adapter on the returned registry.

use std::sync::Arc;

use tracing::info;

use modelctl_core::{AdapterRegistry, LifecycleOrchestrator, RuntimeConfig};
use modelctl_ollama::OllamaAdapter;

/// The assembled control plane, ready to be threaded to the boundary
/// layer.
#[derive(Debug)]
pub struct ControlPlane {
    pub registry: Arc<AdapterRegistry>,
    pub orchestrator: LifecycleOrchestrator,
}

/// Build the control plane with the built-in Ollama adapter
/// pre-registered.
#[must_use]
pub fn build_control_plane() -> ControlPlane {
    let registry = Arc::new(AdapterRegistry::new());
    registry.register(Arc::new(OllamaAdapter::new()));
    info!("control plane assembled with built-in ollama adapter");

    let orchestrator = LifecycleOrchestrator::new(Arc::clone(&registry));
    ControlPlane {
        registry,
        orchestrator,
    }
}

/// The per-call configuration the boundary layer uses for the built-in
/// Ollama runtime.
#[must_use]
pub fn ollama_config() -> RuntimeConfig {
    RuntimeConfig {
        id: "ollama".to_string(),
        name: "Ollama".to_string(),
        description: "Local Ollama models".to_string(),
        protocol_id: "ollama".to_string(),
        parameters: std::collections::HashMap::new(),
    }
}
