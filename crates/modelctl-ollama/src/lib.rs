//! Ollama runtime adapter for modelctl.
//!
//! Implements the [`modelctl_core::RuntimeAdapter`] contract against the
//! Ollama HTTP API (`/api/version`, `/api/show`, `/api/generate`,
//! `/api/tags`, `/api/kill`, `/api/unload`) and decodes its
//! newline-delimited JSON generation streams.

pub mod adapter;
pub mod api;
pub mod stream;

pub use adapter::{DEFAULT_BASE_URL, OllamaAdapter};
pub use stream::{DecodedResponse, NdjsonDecoder, StreamError};
