//! Elasticsearch adapter serving both retrieval channels.
//!
//! Keyword channel: `match` on `original_text` with `operator: or`.
//! Semantic channel: `script_score` over `match_all`, scoring
//! `cosineSimilarity(params.query_vector, 'embedding') + 1.0`.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use peds_core::config::ElasticsearchSettings;
use peds_core::error::{Error, Result};
use peds_core::traits::{KeywordSearch, SemanticSearch};
use peds_core::types::{Relationship, SearchHit};

const SERVICE: &str = "elasticsearch";

pub struct ElasticsearchClient {
    http: Client,
    base_url: String,
    index: String,
    auth: Option<(String, String)>,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source", default)]
    source: Value,
}

impl ElasticsearchClient {
    pub fn new(base_url: impl Into<String>, index: impl Into<String>, auth: Option<(String, String)>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("building HTTP client: {e}")))?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string(), index: index.into(), auth })
    }

    /// Password is read from the env var named in the settings; without it
    /// requests go out unauthenticated.
    pub fn from_settings(settings: &ElasticsearchSettings) -> Result<Self> {
        let auth = match std::env::var(&settings.password_env) {
            Ok(password) => Some((settings.username.clone(), password)),
            Err(_) => {
                warn!(var = %settings.password_env, "no Elasticsearch password in environment; using anonymous access");
                None
            }
        };
        Self::new(&settings.url, &settings.index, auth, Duration::from_secs(settings.timeout_secs))
    }

    pub fn keyword_query(query_text: &str, limit: usize) -> Value {
        json!({
            "size": limit,
            "query": { "match": { "original_text": { "query": query_text, "operator": "or" } } }
        })
    }

    pub fn semantic_query(query_vec: &[f32], limit: usize) -> Value {
        json!({
            "size": limit,
            "query": {
                "script_score": {
                    "query": { "match_all": {} },
                    "script": {
                        "source": "cosineSimilarity(params.query_vector, 'embedding') + 1.0",
                        "params": { "query_vector": query_vec }
                    }
                }
            }
        })
    }

    fn search(&self, body: &Value) -> Result<Vec<SearchHit>> {
        let mut request = self.http.post(format!("{}/{}/_search", self.base_url, self.index)).json(body);
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, Some(password));
        }
        let response = request.send().map_err(|e| Error::upstream(SERVICE, e))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(Error::upstream(SERVICE, format!("HTTP {status}: {text}")));
        }
        let parsed: SearchResponse = response.json().map_err(|e| Error::upstream(SERVICE, e))?;
        debug!(hits = parsed.hits.hits.len(), index = %self.index, "search completed");
        Ok(parsed.hits.hits.into_iter().map(parse_hit).collect())
    }
}

/// Map one `_source` document onto a [`SearchHit`], tolerating missing fields.
pub fn parse_hit_source(score: f32, source: &Value) -> SearchHit {
    let info = source.get("source");
    let source_title = info.and_then(|s| s.get("title")).and_then(Value::as_str).map(str::to_string);
    let source_page = info.and_then(|s| s.get("page_number")).and_then(|p| match p {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });
    let text = source.get("original_text").and_then(Value::as_str).unwrap_or_default().to_string();
    let relationships = source
        .get("relationships")
        .and_then(Value::as_array)
        .map(|rels| rels.iter().filter_map(|r| serde_json::from_value::<Relationship>(r.clone()).ok()).collect())
        .unwrap_or_default();
    SearchHit { score, source_title, source_page, text, relationships }
}

fn parse_hit(hit: RawHit) -> SearchHit {
    parse_hit_source(hit.score.unwrap_or(0.0), &hit.source)
}

impl KeywordSearch for ElasticsearchClient {
    fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        self.search(&Self::keyword_query(query, limit))
    }
}

impl SemanticSearch for ElasticsearchClient {
    fn semantic_search(&self, query_vec: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        self.search(&Self::semantic_query(query_vec, limit))
    }
}
