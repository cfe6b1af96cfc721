//! OpenAI-compatible `/embeddings` client used for the semantic search channel.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use peds_core::config::{secret_from_env, RemoteEmbeddingSettings};
use peds_core::error::{Error, Result};
use peds_core::traits::Embedder;

const SERVICE: &str = "embedding";

pub struct RemoteEmbedder {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
    dim: usize,
    id: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Output width of the well-known hosted models.
pub fn known_dim(model: &str) -> Option<usize> {
    match model {
        "text-embedding-ada-002" | "text-embedding-3-small" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        _ => None,
    }
}

impl RemoteEmbedder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>, dim: usize, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("building HTTP client: {e}")))?;
        let model = model.into();
        let id = format!("remote:{model}:d{dim}");
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string(), model, api_key: api_key.into(), dim, id })
    }

    pub fn from_settings(settings: &RemoteEmbeddingSettings) -> Result<Self> {
        let api_key = secret_from_env(&settings.api_key_env)?;
        let dim = known_dim(&settings.model)
            .ok_or_else(|| Error::Configuration(format!("unknown output dimension for model {}", settings.model)))?;
        Self::new(&settings.base_url, &settings.model, api_key, dim, Duration::from_secs(settings.timeout_secs))
    }
}

impl Embedder for RemoteEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(vec![]); }
        let response = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { model: &self.model, input: texts })
            .send()
            .map_err(|e| Error::upstream(SERVICE, e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::upstream(SERVICE, format!("HTTP {status}: {body}")));
        }
        let mut parsed: EmbeddingResponse = response.json().map_err(|e| Error::upstream(SERVICE, e))?;
        if parsed.data.len() != texts.len() {
            return Err(Error::upstream(SERVICE, format!("expected {} vectors, got {}", texts.len(), parsed.data.len())));
        }
        parsed.data.sort_by_key(|d| d.index);
        debug!(n = texts.len(), model = %self.model, "remote embeddings received");
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}
