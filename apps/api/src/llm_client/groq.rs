//! Groq chat completions (OpenAI-compatible).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ApiKey, GenerationResult, ProviderError, ProviderErrorKind, TextGenerator};
use crate::models::catalog::ProviderId;
use crate::models::generation::GenerationConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

pub struct GroqProvider {
    client: Client,
    url: String,
    api_key: ApiKey,
}

impl GroqProvider {
    pub fn new(client: Client, url: String, api_key: ApiKey) -> Self {
        Self {
            client,
            url,
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for GroqProvider {
    fn provider(&self) -> ProviderId {
        ProviderId::Groq
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> GenerationResult {
        let request_body = ChatRequest {
            model: config.model().id,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: config.temperature(),
            max_tokens: config.max_tokens(),
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(ProviderId::Groq, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_response(
                ProviderId::Groq,
                status.as_u16(),
                &body,
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::transport(ProviderId::Groq, e))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Groq call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::new(
                    ProviderErrorKind::Generic,
                    ProviderId::Groq,
                    Some(status.as_u16()),
                    "Groq returned no completion text",
                )
            })
    }
}
