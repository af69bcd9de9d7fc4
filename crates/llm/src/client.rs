//! Chat-completions client.

use crate::LlmConfig;
use pitch_core::{Error, Result};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// A hosted model that answers a system + user message pair with text.
pub trait ChatModel {
    /// Send one request and return the model's reply verbatim.
    fn complete(&self, system: &str, user: &str) -> Result<String>;
}

impl<M: ChatModel + ?Sized> ChatModel for &M {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        (**self).complete(system, user)
    }
}

impl<M: ChatModel + ?Sized> ChatModel for Box<M> {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        (**self).complete(system, user)
    }
}

/// Blocking client for any OpenAI-compatible `/chat/completions` endpoint.
///
/// One round trip per call. Errors are returned as-is; nothing is retried.
#[derive(Debug)]
pub struct ChatCompletionsClient {
    http: reqwest::blocking::Client,
    config: LlmConfig,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// Build a client from validated settings.
    pub fn new(config: LlmConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

impl ChatModel for ChatCompletionsClient {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = self.config.completions_url();
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature,
        };

        log::info!("Requesting completion from {} ({})", url, self.config.model);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .map_err(|e| Error::Http(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let raw = response
            .text()
            .map_err(|e| Error::Http(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            log::warn!("Model endpoint returned {}", status);
            return Err(Error::Api {
                status: status.as_u16(),
                body: raw,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidApiResponse(format!("{}: {}", e, raw)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::InvalidApiResponse(format!("no message content: {}", raw)))?;

        log::debug!("Received {} bytes of model output", content.len());
        Ok(content)
    }
}
