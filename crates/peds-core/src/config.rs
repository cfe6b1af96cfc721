//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Nested keys are addressed with `__` in env vars, e.g.
//! `APP_SEARCH__ALPHA=0.3`. Provides helpers to expand `~` and `${VAR}` and to
//! resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        tracing::debug!(env = %env_name, "configuration loaded");
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    #[default]
    Elasticsearch,
    Local,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub elasticsearch: ElasticsearchSettings,
    pub local: LocalIndexSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub corpus: CorpusSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.search.alpha) {
            return Err(Error::Configuration(format!("search.alpha must be within [0, 1], got {}", self.search.alpha)));
        }
        if self.search.top_k == 0 {
            return Err(Error::Configuration("search.top_k must be positive".into()));
        }
        if self.corpus.final_k > self.corpus.top_k {
            return Err(Error::Configuration(format!(
                "corpus.final_k ({}) cannot exceed corpus.top_k ({})",
                self.corpus.final_k, self.corpus.top_k
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub backend: SearchBackend,
    /// Weight on the keyword channel.
    pub alpha: f32,
    pub top_k: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { backend: SearchBackend::Elasticsearch, alpha: 0.2, top_k: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchSettings {
    pub url: String,
    pub index: String,
    pub username: String,
    /// Name of the env var holding the password.
    pub password_env: String,
    pub timeout_secs: u64,
}

impl Default for ElasticsearchSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".into(),
            index: "ped_literature".into(),
            username: "elastic".into(),
            password_env: "ES_PASSWORD".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalIndexSettings {
    pub data_dir: String,
    pub tantivy_index_dir: String,
    pub vector_store_path: String,
}

impl Default for LocalIndexSettings {
    fn default() -> Self {
        Self {
            data_dir: "data/reference".into(),
            tantivy_index_dir: "data/indexes/tantivy".into(),
            vector_store_path: "data/indexes/pages.vectors.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteEmbeddingSettings {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for RemoteEmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "text-embedding-ada-002".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub remote: RemoteEmbeddingSettings,
    /// Directory holding `config.json`, `tokenizer.json` and weights of the
    /// sentence encoder used for the conversation corpus.
    pub local_model_dir: Option<String>,
    pub max_len: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { remote: RemoteEmbeddingSettings::default(), local_model_dir: None, max_len: 128 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.x.ai/v1".into(),
            model: "grok-3-latest".into(),
            api_key_env: "XAI_API_KEY".into(),
            timeout_secs: 120,
            temperature: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub detailed: ChatSettings,
    pub simple: ChatSettings,
    /// Run the query-analysis call before the simplified answer.
    pub analyze_query: bool,
    /// Study the selected conversations (insights, style patterns, knowledge
    /// gaps, questioning flowchart) before the simplified answer.
    pub analyze_examples: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            detailed: ChatSettings::default(),
            simple: ChatSettings { temperature: 0.2, ..ChatSettings::default() },
            analyze_query: true,
            analyze_examples: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    /// JSONL file of `{department, ask, answer}` rows. `None` disables examples.
    pub path: Option<String>,
    /// Empty keeps every department.
    pub allowed_departments: Vec<String>,
    pub top_k: usize,
    pub final_k: usize,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            path: Some("data/conversations.jsonl".into()),
            allowed_departments: ["内科", "耳鼻喉科", "营养保健科", "消化内科", "新生儿科", "外科", "儿科急诊", "眼科", "骨科"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            top_k: 5,
            final_k: 3,
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

/// Read a secret from the environment variable named by a setting.
pub fn secret_from_env(var_name: &str) -> Result<String, Error> {
    env::var(var_name).map_err(|_| Error::Configuration(format!("environment variable {var_name} is not set")))
}
