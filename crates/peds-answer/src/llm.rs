//! Blocking client for OpenAI-compatible `/chat/completions` endpoints.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use peds_core::config::{secret_from_env, ChatSettings};
use peds_core::error::{Error, Result};
use peds_core::traits::Generator;
use peds_core::types::ChatMessage;

pub struct ChatClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("building HTTP client: {e}")))?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string(), model: model.into(), api_key: api_key.into() })
    }

    pub fn from_settings(settings: &ChatSettings) -> Result<Self> {
        let api_key = secret_from_env(&settings.api_key_env)?;
        Self::new(&settings.base_url, &settings.model, api_key, Duration::from_secs(settings.timeout_secs))
    }
}

impl Generator for ChatClient {
    fn generate(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> {
        let start = Instant::now();
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest { model: &self.model, messages, temperature })
            .send()
            .map_err(|e| {
                warn!(error = %e, model = %self.model, "chat request failed");
                Error::Generation(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = %status, error = %body, "chat API error");
            return Err(Error::Generation(format!("HTTP {status}: {body}")));
        }

        let parsed: ChatResponse = response.json().map_err(|e| Error::Generation(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::Generation("empty completion".into()))?;
        debug!(model = %self.model, ms = start.elapsed().as_millis() as u64, chars = content.len(), "completion received");
        Ok(content)
    }
}
