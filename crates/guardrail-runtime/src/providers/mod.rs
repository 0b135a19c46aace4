//! Text-generation providers.
//!
//! A provider turns the few-shot conversation into raw text. Nothing it
//! returns is trusted: the harness recovers and judges every answer.
//!
//! - [`ReplayProvider`] serves recorded outputs, one per case.
//! - `OpenAiProvider` (feature `openai`) calls an OpenAI-compatible
//!   `/chat/completions` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod factory;
mod replay;

#[cfg(feature = "openai")]
mod openai;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use replay::{ReplayProvider, ReplayProviderFactory};

#[cfg(feature = "openai")]
pub use openai::{OpenAiProvider, OpenAiProviderFactory};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Unreadable provider response: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("No recorded response left (served {served})")]
    Exhausted { served: usize },
}

impl ProviderError {
    /// Whether the same request may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::HttpError(_)
            | ProviderError::RateLimited { .. }
            | ProviderError::Timeout(_) => true,
            ProviderError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Parameters of one generation attempt.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub model: String,
    pub max_tokens: u32,
    /// 0.0 keeps answers reproducible across runs
    pub temperature: f32,
    /// Bound on a single attempt
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 768,
            temperature: 0.0,
            timeout: Duration::from_secs(30),
        }
    }
}

/// One turn of the few-shot conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content)
    }
}

/// Raw answer to one conversation.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    /// Model that actually answered
    pub model: String,
    pub stop_reason: Option<String>,
}

/// Source of raw guardrail reports.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Cheap readiness check run once before a corpus.
    async fn health_check(&self) -> bool;

    /// Name used in logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        let roles: Vec<String> = [
            ChatMessage::system("s"),
            ChatMessage::user("u"),
            ChatMessage::assistant("a"),
        ]
        .into_iter()
        .map(|m| m.role)
        .collect();
        assert_eq!(roles, ["system", "user", "assistant"]);
    }

    #[test]
    fn test_transient_errors() {
        assert!(ProviderError::HttpError("reset".into()).is_transient());
        assert!(ProviderError::RateLimited { retry_after: None }.is_transient());
        assert!(ProviderError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(ProviderError::ApiError { status: 503, message: String::new() }.is_transient());

        assert!(!ProviderError::ApiError { status: 400, message: String::new() }.is_transient());
        assert!(!ProviderError::AuthError.is_transient());
        assert!(!ProviderError::Exhausted { served: 3 }.is_transient());
    }
}
