/// LLM Client: the single point of entry for all text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Handlers obtain a `Box<dyn TextGenerator>` from `build_generator` and never see
/// the request/response shapes of the individual providers.
///
/// There is no retry: a failed call is classified and surfaced immediately.
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::models::catalog::ProviderId;
use crate::models::generation::GenerationConfig;

pub mod anthropic;
pub mod groq;

pub use anthropic::AnthropicProvider;
pub use groq::GroqProvider;

/// Shown next to `ModelUnavailable` failures.
pub const MODEL_RESELECT_HINT: &str =
    "The selected model is currently unavailable. Please choose a different model.";

/// Generated text, or why there is none. Generation is all-or-nothing.
pub type GenerationResult = Result<String, ProviderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    Authentication,
    ModelUnavailable,
    Quota,
    Generic,
}

impl ProviderErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ProviderErrorKind::Authentication => "PROVIDER_AUTHENTICATION",
            ProviderErrorKind::ModelUnavailable => "PROVIDER_MODEL_UNAVAILABLE",
            ProviderErrorKind::Quota => "PROVIDER_QUOTA",
            ProviderErrorKind::Generic => "PROVIDER_ERROR",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProviderErrorKind::Authentication => "authentication failed",
            ProviderErrorKind::ModelUnavailable => "model unavailable",
            ProviderErrorKind::Quota => "quota or rate limit exceeded",
            ProviderErrorKind::Generic => "request failed",
        })
    }
}

/// A classified provider failure. `message` is the provider's own text.
#[derive(Debug, Clone, Error)]
#[error("{provider} {kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub provider: ProviderId,
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(
        kind: ProviderErrorKind,
        provider: ProviderId,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            provider,
            status,
            message: message.into(),
        }
    }

    /// Network-level failures (connect, timeout, unreadable body) are generic.
    pub fn transport(provider: ProviderId, err: reqwest::Error) -> Self {
        Self::new(
            ProviderErrorKind::Generic,
            provider,
            err.status().map(|s| s.as_u16()),
            err.to_string(),
        )
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self.kind {
            ProviderErrorKind::ModelUnavailable => Some(MODEL_RESELECT_HINT),
            _ => None,
        }
    }

    /// Classifies a non-2xx provider response from its status and body.
    ///
    /// Both providers wrap failures as `{"error": {"type": .., "code": .., "message": ..}}`;
    /// the raw body is kept when it does not parse.
    pub fn from_response(provider: ProviderId, status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|e| e.error);
        let markers: Vec<String> = parsed
            .iter()
            .flat_map(|e| [e.error_type.as_deref(), e.code.as_deref()])
            .flatten()
            .map(str::to_ascii_lowercase)
            .collect();
        let has_marker = |needle: &str| markers.iter().any(|m| m.contains(needle));

        let message = parsed
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| body.trim().to_string());
        let message = if message.is_empty() {
            format!("HTTP {status} with empty body")
        } else {
            message
        };

        let kind = if has_marker("model_not_found")
            || body.contains("model_not_found")
            || (status == 404 && (has_marker("not_found") || message.contains("model")))
        {
            ProviderErrorKind::ModelUnavailable
        } else if status == 401
            || status == 403
            || has_marker("authentication")
            || has_marker("permission")
            || has_marker("invalid_api_key")
        {
            ProviderErrorKind::Authentication
        } else if status == 429 || has_marker("rate_limit") || has_marker("quota") {
            ProviderErrorKind::Quota
        } else {
            ProviderErrorKind::Generic
        };

        Self::new(kind, provider, Some(status), message)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

/// User-supplied provider credential. Never logged; `Debug` is redacted.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for a missing or whitespace-only key.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// One text-generation provider. Implementations translate the prompt and config
/// into their own wire shape and return the first completion's text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> ProviderId;

    /// Sends `prompt` as the sole user message. No system prompt, no history.
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> GenerationResult;
}

/// Builds the shared outbound HTTP client.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Builds the generator for `provider`, bound to the caller's credential.
pub fn build_generator(
    provider: ProviderId,
    client: Client,
    config: &Config,
    api_key: ApiKey,
) -> Box<dyn TextGenerator> {
    match provider {
        ProviderId::Claude => Box::new(AnthropicProvider::new(
            client,
            config.anthropic_api_url.clone(),
            api_key,
        )),
        ProviderId::Groq => Box::new(GroqProvider::new(
            client,
            config.groq_api_url.clone(),
            api_key,
        )),
    }
}
