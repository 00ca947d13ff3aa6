//! Lifecycle orchestrator - the facade the boundary layer calls.
//!
//! Sequences initialize → load → start → generate → stop against whatever
//! adapter the configuration selects, and enforces that interactions only
//! happen against a model that is actually loaded and running.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::{InteractionResult, RuntimeConfig, RuntimeStatus};
use crate::ports::{AdapterError, ChunkHandler, RuntimeAdapter};
use crate::registry::{AdapterRegistry, RegistryError};

/// Errors surfaced at the orchestrator boundary.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An interaction was attempted before any model was started.
    #[error("no model selected")]
    NoModelSelected,

    /// The selected model's runtime reports it is not running.
    #[error("model is not running")]
    ModelNotRunning,

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

/// Orchestrates the lifecycle of one current model.
///
/// State machine over a single current-model slot:
/// `Idle → Loading → Ready → Generating → Ready → … → Idle`.
/// The slot's mutex is held across the whole start/stop sequence, so
/// concurrent lifecycle calls cannot race into two "current" models.
#[derive(Debug)]
pub struct LifecycleOrchestrator {
    registry: Arc<AdapterRegistry>,
    current_model: Mutex<Option<String>>,
}

impl LifecycleOrchestrator {
    /// Create an orchestrator routing through the given registry.
    #[must_use]
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self {
            registry,
            current_model: Mutex::new(None),
        }
    }

    /// The registry this orchestrator resolves adapters from.
    #[must_use]
    pub fn registry(&self) -> &Arc<AdapterRegistry> {
        &self.registry
    }

    /// List the models the configured runtime has available.
    pub async fn list_models(
        &self,
        config: &RuntimeConfig,
    ) -> Result<Vec<String>, OrchestratorError> {
        let adapter = self.registry.resolve(&config.protocol_id)?;
        Ok(adapter.list_available_models().await)
    }

    /// Start `model_id` on the configured runtime.
    ///
    /// If a model is already current, the full stop sequence runs first —
    /// at most one active model at a time. Any setup step failing clears
    /// the current-model slot and yields an error-carrying status, never a
    /// partially-started view.
    pub async fn start(
        &self,
        config: &RuntimeConfig,
        model_id: &str,
    ) -> Result<RuntimeStatus, OrchestratorError> {
        let adapter = self.registry.resolve(&config.protocol_id)?;
        let mut current = self.current_model.lock().await;

        if let Some(previous) = current.take() {
            info!(model = %previous, "stopping running model before start");
            adapter.stop().await;
        }

        info!(model = %model_id, protocol = %config.protocol_id, "starting model");
        match Self::run_start_sequence(adapter.as_ref(), config, model_id).await {
            Ok(()) => {
                *current = Some(model_id.to_string());
                Ok(adapter.status().await)
            }
            Err(err) => {
                warn!(model = %model_id, error = %err, "model start failed");
                *current = None;
                Ok(RuntimeStatus {
                    is_running: false,
                    is_connected: false,
                    error: Some(format!("failed to start model: {err}")),
                    current_model: None,
                })
            }
        }
    }

    /// Stop the configured runtime's current model and return fresh status.
    pub async fn stop(&self, config: &RuntimeConfig) -> Result<RuntimeStatus, OrchestratorError> {
        let adapter = self.registry.resolve(&config.protocol_id)?;
        let mut current = self.current_model.lock().await;

        adapter.stop().await;
        *current = None;
        Ok(adapter.status().await)
    }

    /// Current status of the configured runtime, verbatim from the adapter.
    pub async fn status(&self, config: &RuntimeConfig) -> Result<RuntimeStatus, OrchestratorError> {
        let adapter = self.registry.resolve(&config.protocol_id)?;
        Ok(adapter.status().await)
    }

    /// Send a prompt to the current model and aggregate its response.
    pub async fn send(
        &self,
        config: &RuntimeConfig,
        prompt: &str,
    ) -> Result<InteractionResult, OrchestratorError> {
        let adapter = self.check_ready(config).await?;
        Ok(adapter.generate_response(prompt, None).await?)
    }

    /// Like [`Self::send`], forwarding each decoded fragment to `on_chunk`
    /// as it arrives.
    pub async fn send_streaming(
        &self,
        config: &RuntimeConfig,
        prompt: &str,
        on_chunk: ChunkHandler<'_>,
    ) -> Result<InteractionResult, OrchestratorError> {
        let adapter = self.check_ready(config).await?;
        Ok(adapter.stream_response(prompt, None, Some(on_chunk)).await?)
    }

    /// Resolve the adapter and verify a model is selected and running.
    ///
    /// The current-model guard is released before the (potentially long)
    /// generation call, so status queries and cleanup are never blocked by
    /// an in-flight stream.
    async fn check_ready(
        &self,
        config: &RuntimeConfig,
    ) -> Result<Arc<dyn RuntimeAdapter>, OrchestratorError> {
        let adapter = self.registry.resolve(&config.protocol_id)?;
        if self.current_model.lock().await.is_none() {
            return Err(OrchestratorError::NoModelSelected);
        }
        let status = adapter.status().await;
        if !status.is_running {
            return Err(OrchestratorError::ModelNotRunning);
        }
        Ok(adapter)
    }

    async fn run_start_sequence(
        adapter: &dyn RuntimeAdapter,
        config: &RuntimeConfig,
        model_id: &str,
    ) -> Result<(), AdapterError> {
        adapter.initialize(config).await?;
        adapter.load_model(model_id).await?;
        adapter.start().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InteractionMetadata;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug)]
    struct MockAdapter {
        reachable: AtomicBool,
        fail_load: AtomicBool,
        loaded: StdMutex<Option<String>>,
        calls: StdMutex<Vec<&'static str>>,
    }

    impl MockAdapter {
        fn new() -> Self {
            Self {
                reachable: AtomicBool::new(true),
                fail_load: AtomicBool::new(false),
                loaded: StdMutex::new(None),
                calls: StdMutex::new(vec![]),
            }
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RuntimeAdapter for MockAdapter {
        fn protocol_id(&self) -> &'static str {
            "mock"
        }

        fn protocol_name(&self) -> &'static str {
            "Mock"
        }

        fn protocol_version(&self) -> &'static str {
            "0.0.0"
        }

        async fn initialize(&self, _config: &RuntimeConfig) -> Result<(), AdapterError> {
            self.record("initialize");
            Ok(())
        }

        async fn start(&self) -> Result<(), AdapterError> {
            self.record("start");
            if self.reachable.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(AdapterError::ServerUnreachable(
                    "connection refused".to_string(),
                ))
            }
        }

        async fn stop(&self) {
            self.record("stop");
            *self.loaded.lock().unwrap() = None;
        }

        async fn status(&self) -> RuntimeStatus {
            if self.reachable.load(Ordering::SeqCst) {
                RuntimeStatus::connected(self.loaded.lock().unwrap().clone())
            } else {
                RuntimeStatus::unreachable("connection refused")
            }
        }

        async fn load_model(&self, model_id: &str) -> Result<(), AdapterError> {
            self.record("load_model");
            if self.fail_load.load(Ordering::SeqCst) {
                return Err(AdapterError::ModelLoadFailed {
                    model: model_id.to_string(),
                    reason: "HTTP 404".to_string(),
                });
            }
            *self.loaded.lock().unwrap() = Some(model_id.to_string());
            Ok(())
        }

        async fn unload_model(&self) {
            self.record("unload_model");
            *self.loaded.lock().unwrap() = None;
        }

        async fn list_available_models(&self) -> Vec<String> {
            vec!["llama2".to_string(), "mistral".to_string()]
        }

        async fn generate_response(
            &self,
            prompt: &str,
            context: Option<&str>,
        ) -> Result<InteractionResult, AdapterError> {
            self.stream_response(prompt, context, None).await
        }

        async fn stream_response(
            &self,
            _prompt: &str,
            _context: Option<&str>,
            mut on_chunk: Option<ChunkHandler<'_>>,
        ) -> Result<InteractionResult, AdapterError> {
            let model = self
                .loaded
                .lock()
                .unwrap()
                .clone()
                .ok_or(AdapterError::NoModelLoaded)?;
            for piece in ["po", "ng"] {
                if let Some(cb) = on_chunk.as_mut() {
                    cb(piece);
                }
            }
            Ok(InteractionResult::success(
                "pong".to_string(),
                InteractionMetadata::now(model),
            ))
        }
    }

    fn control_plane() -> (Arc<MockAdapter>, LifecycleOrchestrator, RuntimeConfig) {
        let adapter = Arc::new(MockAdapter::new());
        let registry = Arc::new(AdapterRegistry::new());
        registry.register(adapter.clone());
        let orchestrator = LifecycleOrchestrator::new(registry);
        (adapter, orchestrator, RuntimeConfig::new("mock"))
    }

    #[tokio::test]
    async fn test_start_runs_full_sequence() {
        let (adapter, orchestrator, config) = control_plane();

        let status = orchestrator.start(&config, "llama2").await.unwrap();
        assert!(status.is_running);
        assert!(status.is_connected);
        assert_eq!(status.current_model.as_deref(), Some("llama2"));
        assert_eq!(adapter.calls(), vec!["initialize", "load_model", "start"]);
    }

    #[tokio::test]
    async fn test_start_stops_running_model_first() {
        let (adapter, orchestrator, config) = control_plane();

        orchestrator.start(&config, "llama2").await.unwrap();
        let status = orchestrator.start(&config, "mistral").await.unwrap();

        assert_eq!(status.current_model.as_deref(), Some("mistral"));
        let calls = adapter.calls();
        // Second sequence begins with the full stop.
        assert_eq!(
            calls,
            vec![
                "initialize",
                "load_model",
                "start",
                "stop",
                "initialize",
                "load_model",
                "start"
            ]
        );
    }

    #[tokio::test]
    async fn test_start_failure_clears_current_model() {
        let (adapter, orchestrator, config) = control_plane();
        adapter.fail_load.store(true, Ordering::SeqCst);

        let status = orchestrator.start(&config, "llama2").await.unwrap();
        assert!(!status.is_running);
        assert!(status.error.unwrap().contains("failed to start model"));
        assert!(status.current_model.is_none());

        // The orchestrator no longer considers any model selected.
        let err = orchestrator.send(&config, "hi").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::NoModelSelected));
    }

    #[tokio::test]
    async fn test_second_stop_is_noop() {
        let (_, orchestrator, config) = control_plane();

        orchestrator.start(&config, "llama2").await.unwrap();
        let first = orchestrator.stop(&config).await.unwrap();
        assert!(!first.is_running);
        assert!(first.error.is_none());

        let second = orchestrator.stop(&config).await.unwrap();
        assert!(!second.is_running);
        assert!(second.error.is_none());
    }

    #[tokio::test]
    async fn test_send_without_model_fails() {
        let (_, orchestrator, config) = control_plane();

        let err = orchestrator.send(&config, "hi").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::NoModelSelected));
    }

    #[tokio::test]
    async fn test_send_when_not_running_fails() {
        let (adapter, orchestrator, config) = control_plane();

        orchestrator.start(&config, "llama2").await.unwrap();
        adapter.reachable.store(false, Ordering::SeqCst);

        let err = orchestrator.send(&config, "hi").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::ModelNotRunning));
    }

    #[tokio::test]
    async fn test_send_delegates_to_adapter() {
        let (_, orchestrator, config) = control_plane();

        orchestrator.start(&config, "llama2").await.unwrap();
        let result = orchestrator.send(&config, "hi").await.unwrap();
        assert_eq!(result.content, "pong");
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_send_streaming_forwards_chunks_in_order() {
        let (_, orchestrator, config) = control_plane();

        orchestrator.start(&config, "llama2").await.unwrap();
        let mut chunks: Vec<String> = vec![];
        let result = orchestrator
            .send_streaming(&config, "hi", &mut |chunk| chunks.push(chunk.to_string()))
            .await
            .unwrap();

        assert_eq!(result.content, "pong");
        assert_eq!(chunks, vec!["po", "ng"]);
    }

    #[tokio::test]
    async fn test_unknown_protocol_is_surfaced() {
        let (_, orchestrator, _) = control_plane();
        let config = RuntimeConfig::new("does-not-exist");

        let err = orchestrator.list_models(&config).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Registry(RegistryError::ProtocolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_models_delegates() {
        let (_, orchestrator, config) = control_plane();
        let models = orchestrator.list_models(&config).await.unwrap();
        assert_eq!(models, vec!["llama2".to_string(), "mistral".to_string()]);
    }
}
