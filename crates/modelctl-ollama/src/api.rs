//! Wire types for the Ollama HTTP API.
//!
//! One struct per endpoint payload; nothing here leaks outside the
//! adapter crate.

use serde::{Deserialize, Serialize};

/// Body for `POST /api/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a str>,
    pub stream: bool,
}

/// One newline-terminated record of the `/api/generate` NDJSON stream.
///
/// Intermediate records carry a `response` text fragment; the terminal
/// `done:true` record carries the token count instead.
#[derive(Debug, Deserialize)]
pub struct GenerateRecord {
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
    pub eval_count: Option<u32>,
}

/// Body for the name-keyed endpoints (`/api/show`, `/api/kill`,
/// `/api/unload`).
#[derive(Debug, Serialize)]
pub struct ModelNameRequest<'a> {
    pub name: &'a str,
}

/// Response of `GET /api/tags`.
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One catalog entry in the tags response; extra fields are ignored.
#[derive(Debug, Deserialize)]
pub struct ModelTag {
    pub name: String,
}
