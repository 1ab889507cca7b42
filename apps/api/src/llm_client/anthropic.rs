//! Anthropic Messages API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ApiKey, GenerationResult, ProviderError, ProviderErrorKind, TextGenerator};
use crate::models::catalog::ProviderId;
use crate::models::generation::GenerationConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    /// Text of the first text block.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

pub struct AnthropicProvider {
    client: Client,
    url: String,
    api_key: ApiKey,
}

impl AnthropicProvider {
    pub fn new(client: Client, url: String, api_key: ApiKey) -> Self {
        Self {
            client,
            url,
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicProvider {
    fn provider(&self) -> ProviderId {
        ProviderId::Claude
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> GenerationResult {
        let request_body = MessagesRequest {
            model: config.model().id,
            max_tokens: config.max_tokens(),
            temperature: config.temperature(),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(ProviderId::Claude, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_response(
                ProviderId::Claude,
                status.as_u16(),
                &body,
            ));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::transport(ProviderId::Claude, e))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Claude call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        match parsed.text() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(ProviderError::new(
                ProviderErrorKind::Generic,
                ProviderId::Claude,
                Some(status.as_u16()),
                "Claude returned no text content",
            )),
        }
    }
}
