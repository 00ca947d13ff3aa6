//! Runtime adapter port: the uniform lifecycle/interaction contract.
//!
//! Every supported model-serving protocol implements this trait once;
//! callers go through the registry and never branch on protocol ids.
//! New runtimes are added by implementing the contract and registering.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::domain::{InteractionResult, RuntimeConfig, RuntimeStatus};

/// Observer invoked with each incremental text fragment, in arrival order.
pub type ChunkHandler<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Errors that can occur during adapter operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The runtime's server did not answer the reachability probe.
    #[error("runtime server is not reachable: {0}")]
    ServerUnreachable(String),

    /// The model's metadata lookup failed during load; the adapter's
    /// current model is left untouched.
    #[error("failed to load model {model}: {reason}")]
    ModelLoadFailed { model: String, reason: String },

    /// An interaction was attempted with no model loaded.
    #[error("no model loaded")]
    NoModelLoaded,

    /// A generation stream contained a record that is not valid JSON.
    /// The in-flight call aborts and partial content is discarded.
    #[error("malformed stream record: {0}")]
    MalformedStreamRecord(String),

    /// A transport-level failure (connection error, unexpected HTTP
    /// status) outside the cases above.
    #[error("runtime request failed: {0}")]
    Request(String),
}

/// The uniform contract every runtime adapter implements.
///
/// Failure policy, by operation class:
/// - lifecycle setup (`start`, `load_model`) fails loud — callers need to
///   know setup did not succeed;
/// - interaction (`generate_response`, `stream_response`) fails soft: any
///   failure past the no-model precondition is returned as an
///   error-carrying [`InteractionResult`], never as `Err`;
/// - cleanup (`stop`, `unload_model`) is best-effort and infallible:
///   sub-step failures are logged and swallowed, and the adapter's notion
///   of its current model is always cleared.
///
/// An adapter holds at most one current model; exactly one adapter
/// instance exists per protocol id for the lifetime of the process.
#[async_trait]
pub trait RuntimeAdapter: Send + Sync + fmt::Debug {
    /// Stable identifier the registry keys on (e.g. `"ollama"`).
    fn protocol_id(&self) -> &'static str;

    /// Human-readable protocol name.
    fn protocol_name(&self) -> &'static str;

    /// Version of the adapter's protocol implementation.
    fn protocol_version(&self) -> &'static str;

    /// Store configuration (notably a `baseUrl` override from the
    /// parameter map). Idempotent; never contacts the network.
    async fn initialize(&self, config: &RuntimeConfig) -> Result<(), AdapterError>;

    /// Verify the runtime's server is reachable via a lightweight
    /// version/ping call.
    async fn start(&self) -> Result<(), AdapterError>;

    /// Best-effort shutdown: terminate the current model server-side,
    /// then unload it. No-op when no model is current; always concludes
    /// with the current model cleared.
    async fn stop(&self);

    /// Compute a fresh status snapshot. A metadata-lookup failure for the
    /// current model means the model disappeared out-of-band: the adapter
    /// clears it and reports not-running-but-connected.
    async fn status(&self) -> RuntimeStatus;

    /// Verify the model exists server-side and record it as current.
    /// On failure the previous current model is left untouched.
    async fn load_model(&self, model_id: &str) -> Result<(), AdapterError>;

    /// Best-effort request to release the model server-side. Always
    /// clears the adapter's current model, regardless of network outcome.
    async fn unload_model(&self);

    /// Names from the server's catalog; empty on any failure (the listing
    /// is advisory, not critical-path).
    async fn list_available_models(&self) -> Vec<String>;

    /// Run a generation to completion, aggregating the streamed response.
    ///
    /// Fails fast with [`AdapterError::NoModelLoaded`]; every other
    /// failure degrades to an error-carrying result.
    async fn generate_response(
        &self,
        prompt: &str,
        context: Option<&str>,
    ) -> Result<InteractionResult, AdapterError>;

    /// Like [`Self::generate_response`], additionally invoking `on_chunk`
    /// synchronously for each decoded text fragment, in arrival order.
    async fn stream_response(
        &self,
        prompt: &str,
        context: Option<&str>,
        on_chunk: Option<ChunkHandler<'_>>,
    ) -> Result<InteractionResult, AdapterError>;
}
