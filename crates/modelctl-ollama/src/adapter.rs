//! The Ollama runtime adapter.
//!
//! Drives a locally-running Ollama server over HTTP. Lifecycle calls
//! fail loud, interaction calls degrade to error-carrying results, and
//! cleanup calls are best-effort — see the contract documentation on
//! [`RuntimeAdapter`].

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use modelctl_core::domain::{InteractionMetadata, InteractionResult, RuntimeConfig, RuntimeStatus};
use modelctl_core::ports::{AdapterError, ChunkHandler, RuntimeAdapter};

use crate::api::{GenerateRequest, ModelNameRequest, TagsResponse};
use crate::stream::{NdjsonDecoder, StreamError};

/// Default local Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Parameter-map key overriding the endpoint base URL.
const BASE_URL_PARAMETER: &str = "baseUrl";

impl From<StreamError> for AdapterError {
    fn from(err: StreamError) -> Self {
        Self::MalformedStreamRecord(err.to_string())
    }
}

#[derive(Debug)]
struct OllamaState {
    base_url: String,
    current_model: Option<String>,
}

/// Adapter for the Ollama model-serving protocol.
///
/// Owns the protocol's only mutable state: the base endpoint and the
/// single current model. State sits behind an async lock that is never
/// held across a network call, so status queries are not blocked by an
/// in-flight generation stream.
#[derive(Debug)]
pub struct OllamaAdapter {
    client: Client,
    state: RwLock<OllamaState>,
}

impl Default for OllamaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaAdapter {
    /// Create an adapter pointed at the default local endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create an adapter pointed at a specific endpoint.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            state: RwLock::new(OllamaState {
                base_url: base_url.into(),
                current_model: None,
            }),
        }
    }

    async fn base_url(&self) -> String {
        self.state.read().await.base_url.clone()
    }

    async fn current_model(&self) -> Option<String> {
        self.state.read().await.current_model.clone()
    }

    async fn clear_current_model(&self) {
        self.state.write().await.current_model = None;
    }

    /// Map an interaction failure into the structured error result the
    /// contract promises instead of a raw error.
    async fn handle_error(&self, err: &AdapterError) -> InteractionResult {
        let model = self
            .current_model()
            .await
            .unwrap_or_else(|| "unknown".to_string());
        InteractionResult::failure(err.to_string(), InteractionMetadata::now(model))
    }

    /// Issue the streamed generation request and drain it through the
    /// decoder. Every failure in here is converted by the caller.
    async fn run_generation(
        &self,
        base_url: &str,
        model: &str,
        prompt: &str,
        context: Option<&str>,
        mut on_chunk: Option<ChunkHandler<'_>>,
    ) -> Result<InteractionResult, AdapterError> {
        let response = self
            .client
            .post(format!("{base_url}/api/generate"))
            .json(&GenerateRequest {
                model,
                prompt,
                context,
                stream: true,
            })
            .send()
            .await
            .map_err(|e| AdapterError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Request(format!(
                "generate returned HTTP {status}"
            )));
        }

        let mut decoder = NdjsonDecoder::new();
        let mut body = response.bytes_stream();
        while let Some(fragment) = body.next().await {
            let fragment = fragment.map_err(|e| AdapterError::Request(e.to_string()))?;
            decoder.push_fragment(&fragment, on_chunk.as_deref_mut())?;
        }

        let decoded = decoder.finish();
        debug!(model, tokens = ?decoded.eval_count, "generation stream complete");
        Ok(InteractionResult::success(
            decoded.content,
            InteractionMetadata::now(model).with_tokens(decoded.eval_count),
        ))
    }

    /// Best-effort request to terminate the model's server-side process.
    async fn kill_model(&self, base_url: &str, model: &str) {
        match self
            .client
            .post(format!("{base_url}/api/kill"))
            .json(&ModelNameRequest { name: model })
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!(model, "model process killed");
            }
            Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                debug!(model, "model process already gone");
            }
            Ok(response) => {
                warn!(model, status = %response.status(), "failed to kill model");
            }
            Err(e) => {
                warn!(model, error = %e, "error killing model");
            }
        }
    }

    /// Best-effort request to release the model server-side. A 404 means
    /// it was already unloaded.
    async fn request_unload(&self, base_url: &str, model: &str) {
        match self
            .client
            .post(format!("{base_url}/api/unload"))
            .json(&ModelNameRequest { name: model })
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!(model, "model unloaded");
            }
            Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                debug!(model, "model already unloaded");
            }
            Ok(response) => {
                warn!(model, status = %response.status(), "failed to unload model");
            }
            Err(e) => {
                warn!(model, error = %e, "error unloading model");
            }
        }
    }

    /// Lightweight reachability probe against `/api/version`.
    async fn ping(&self, base_url: &str) -> Result<(), String> {
        match self
            .client
            .get(format!("{base_url}/api/version"))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => Err(format!("version endpoint returned HTTP {}", response.status())),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[async_trait]
impl RuntimeAdapter for OllamaAdapter {
    fn protocol_id(&self) -> &'static str {
        "ollama"
    }

    fn protocol_name(&self) -> &'static str {
        "Ollama"
    }

    fn protocol_version(&self) -> &'static str {
        "1.0.0"
    }

    async fn initialize(&self, config: &RuntimeConfig) -> Result<(), AdapterError> {
        if let Some(base_url) = config.string_parameter(BASE_URL_PARAMETER) {
            let mut state = self.state.write().await;
            state.base_url = base_url.trim_end_matches('/').to_string();
            debug!(base_url = %state.base_url, "ollama endpoint overridden");
        }
        Ok(())
    }

    async fn start(&self) -> Result<(), AdapterError> {
        let base_url = self.base_url().await;
        self.ping(&base_url)
            .await
            .map_err(AdapterError::ServerUnreachable)?;
        info!(%base_url, "ollama server reachable");
        Ok(())
    }

    async fn stop(&self) {
        let base_url = self.base_url().await;
        let Some(model) = self.current_model().await else {
            debug!("no model to stop");
            return;
        };

        self.kill_model(&base_url, &model).await;
        self.request_unload(&base_url, &model).await;

        // Local bookkeeping is corrected no matter how the network
        // calls went.
        self.clear_current_model().await;
        info!(%model, "model stopped");
    }

    async fn status(&self) -> RuntimeStatus {
        let base_url = self.base_url().await;
        if let Err(e) = self.ping(&base_url).await {
            debug!(error = %e, "ollama server unreachable");
            return RuntimeStatus::unreachable("ollama server is not running");
        }

        let Some(model) = self.current_model().await else {
            return RuntimeStatus::connected(None);
        };

        // The server can drop a model out-of-band; verify it still exists.
        let lookup = self
            .client
            .post(format!("{base_url}/api/show"))
            .json(&ModelNameRequest { name: &model })
            .send()
            .await;
        let model_exists = matches!(&lookup, Ok(response) if response.status().is_success());
        if !model_exists {
            warn!(%model, "current model disappeared from server");
            self.clear_current_model().await;
            return RuntimeStatus {
                is_running: false,
                is_connected: true,
                error: Some("model not found".to_string()),
                current_model: None,
            };
        }

        RuntimeStatus::connected(Some(model))
    }

    async fn load_model(&self, model_id: &str) -> Result<(), AdapterError> {
        let base_url = self.base_url().await;
        let response = self
            .client
            .post(format!("{base_url}/api/show"))
            .json(&ModelNameRequest { name: model_id })
            .send()
            .await
            .map_err(|e| AdapterError::ModelLoadFailed {
                model: model_id.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::ModelLoadFailed {
                model: model_id.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        self.state.write().await.current_model = Some(model_id.to_string());
        info!(model = model_id, "model loaded");
        Ok(())
    }

    async fn unload_model(&self) {
        let base_url = self.base_url().await;
        if let Some(model) = self.current_model().await {
            self.request_unload(&base_url, &model).await;
        }
        self.clear_current_model().await;
    }

    async fn list_available_models(&self) -> Vec<String> {
        let base_url = self.base_url().await;
        let response = match self
            .client
            .get(format!("{base_url}/api/tags"))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(status = %response.status(), "failed to list models");
                return vec![];
            }
            Err(e) => {
                warn!(error = %e, "failed to list models");
                return vec![];
            }
        };

        match response.json::<TagsResponse>().await {
            Ok(tags) => tags.models.into_iter().map(|m| m.name).collect(),
            Err(e) => {
                warn!(error = %e, "failed to parse model catalog");
                vec![]
            }
        }
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
        prompt: &str,
        context: Option<&str>,
        on_chunk: Option<ChunkHandler<'_>>,
    ) -> Result<InteractionResult, AdapterError> {
        let (base_url, model) = {
            let state = self.state.read().await;
            let model = state
                .current_model
                .clone()
                .ok_or(AdapterError::NoModelLoaded)?;
            (state.base_url.clone(), model)
        };

        match self
            .run_generation(&base_url, &model, prompt, context, on_chunk)
            .await
        {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!(%model, error = %err, "generation failed");
                Ok(self.handle_error(&err).await)
            }
        }
    }
}
