//! Generation results and boundary-layer messages.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Metadata attached to every generation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionMetadata {
    /// Model that produced (or failed to produce) the content.
    pub model: String,
    /// Milliseconds since the Unix epoch, taken when the result was built.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    /// Tokens generated, when the runtime reported a count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,
}

impl InteractionMetadata {
    /// Metadata stamped with the current wall-clock time.
    #[must_use]
    pub fn now(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            timestamp_ms: Utc::now().timestamp_millis(),
            tokens: None,
        }
    }

    /// Attach a token count.
    #[must_use]
    pub const fn with_tokens(mut self, tokens: Option<u32>) -> Self {
        self.tokens = tokens;
        self
    }
}

/// The outcome of one generate/stream call.
///
/// Immutable after return. A failed interaction still produces one of
/// these, with empty `content` and `error` set, so chat-style callers can
/// render an error turn instead of handling exceptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionResult {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: InteractionMetadata,
}

impl InteractionResult {
    /// A successful result with the given aggregated content.
    #[must_use]
    pub const fn success(content: String, metadata: InteractionMetadata) -> Self {
        Self {
            content,
            error: None,
            metadata,
        }
    }

    /// An error-carrying result with empty content.
    #[must_use]
    pub fn failure(error: impl Into<String>, metadata: InteractionMetadata) -> Self {
        Self {
            content: String::new(),
            error: Some(error.into()),
            metadata,
        }
    }

    /// Whether this result carries an error instead of content.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// The role of a conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Convert role to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One conversation turn as the boundary layer records it.
///
/// The core never stores these; it produces [`InteractionResult`] values
/// which the boundary wraps via [`Message::from_result`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InteractionMetadata>,
}

impl Message {
    /// A user turn carrying a prompt.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            error: None,
            metadata: None,
        }
    }

    /// Wrap a generation result as an assistant turn.
    #[must_use]
    pub fn from_result(result: InteractionResult) -> Self {
        Self {
            role: Role::Assistant,
            content: result.content,
            error: result.error,
            metadata: Some(result.metadata),
        }
    }
}
