//! peds-embed
//!
//! Embedding providers behind `peds_core::traits::Embedder`:
//! a local candle BERT sentence encoder (conversation corpus and example
//! queries), an OpenAI-compatible HTTP client (semantic search channel), and a
//! deterministic hashing embedder for tests and offline development.

pub mod device;
pub mod pool;
pub mod remote;
pub mod tokenize;

pub use pool::masked_mean_l2;
pub use remote::RemoteEmbedder;

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;
use tracing::{info, warn};

use peds_core::error::Error;
use peds_core::traits::Embedder;

/// Sentence encoder (BERT family, e.g. multilingual MiniLM) run with candle.
pub struct LocalEmbeddingModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    pad_id: u32,
    id: String,
}

impl LocalEmbeddingModel {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = device::select_device();
        info!(dir = %model_dir.display(), "loading sentence encoder");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let config_text = std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&config_text)?;
        let dim = serde_json::from_str::<serde_json::Value>(&config_text)?
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| anyhow!("config.json has no hidden_size"))? as usize;
        let pad_id = serde_json::from_str::<serde_json::Value>(&config_text)?
            .get("pad_token_id")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32;

        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DTYPE, &device);
        let model = BertModel::load(vb, &config)?;
        let id = format!(
            "local:{}:d{}",
            model_dir.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "bert".into()),
            dim
        );
        info!(embedder = %id, "sentence encoder loaded");
        Ok(Self { model, tokenizer, device, dim, max_len, pad_id, id })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize::tokenize_on_device(&self.tokenizer, text, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != self.dim { return Err(anyhow!("encoder produced {} dims, expected {}", emb.len(), self.dim)); }
        if start.elapsed().as_millis() > 100 { warn!(ms = start.elapsed().as_millis() as u64, "slow embedding"); }
        Ok(emb)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<std::collections::HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&pickle).with_context(|| format!("reading {}", pickle.display()))?;
    let mut out = std::collections::HashMap::with_capacity(weights.len());
    for (name, tensor) in weights { out.insert(name, tensor.to_device(device)?); }
    Ok(out)
}

impl Embedder for LocalEmbeddingModel {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> peds_core::error::Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|t| self.embed_text(t).map_err(|e| Error::upstream("local-encoder", e)))
            .collect()
    }
}

/// Hashed bag-of-words embedder: deterministic, L2-normalized, no model files.
pub struct FakeEmbedder { dim: usize, id: String }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim, id: format!("fake:xxhash:d{dim}") } }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> peds_core::error::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

pub const FAKE_DIM: usize = 384;

pub fn fake_embeddings_requested() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Sentence encoder for the conversation corpus, or the fake one when
/// `APP_USE_FAKE_EMBEDDINGS=1`.
pub fn get_default_embedder(model_dir: Option<&str>, max_len: usize) -> Result<Box<dyn Embedder>> {
    if fake_embeddings_requested() { info!("using FakeEmbedder"); return Ok(Box::new(FakeEmbedder::new(FAKE_DIM))); }
    let dir = resolve_model_dir(model_dir)?;
    Ok(Box::new(LocalEmbeddingModel::load(&dir, max_len)?))
}

fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured { let p = peds_core::config::expand_path(dir); if p.exists() { return Ok(p); } warn!(dir = %p.display(), "configured model dir does not exist"); }
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") { let p = PathBuf::from(&dir); if p.exists() { info!(dir = %p.display(), "using APP_MODEL_DIR"); return Ok(p); } }
    let root = Path::new("models/paraphrase-multilingual-MiniLM-L12-v2"); if root.exists() { return Ok(root.to_path_buf()); }
    Err(anyhow!("Could not locate sentence encoder model directory"))
}
