use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use peds_answer::{AnswerOrchestrator, AnswerRequest, ChatClient, SimplifiedAnswerGenerator};
use peds_core::config::{expand_path, Config, SearchBackend, Settings};
use peds_core::reference::ReferenceLoader;
use peds_core::traits::{Embedder, KeywordSearch, SemanticSearch};
use peds_embed::{get_default_embedder, RemoteEmbedder};
use peds_hybrid::HybridSearchEngine;
use peds_style::StyleParameters;
use peds_text::{ElasticsearchClient, TantivyIndexer};
use peds_vector::{DiversitySelector, PageVectorStore};

type Engine = HybridSearchEngine<Arc<dyn KeywordSearch>, Arc<dyn SemanticSearch>>;

const USAGE: &str = "Usage:
  peds ingest [data_dir] [--limit-files N]
  peds search \"<query>\" [--top-k N]
  peds ask \"<query>\" [--top-k N] [--parent NAME] [--tone T] [--detail D] [--empathy E] [--professional P]";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

struct Args {
    positional: Vec<String>,
    flags: Vec<(String, String)>,
}

impl Args {
    fn parse(raw: Vec<String>) -> anyhow::Result<Self> {
        let mut positional = Vec::new();
        let mut flags = Vec::new();
        let mut it = raw.into_iter();
        while let Some(arg) = it.next() {
            if let Some(name) = arg.strip_prefix("--") {
                let value = it.next().with_context(|| format!("--{name} requires a value"))?;
                flags.push((name.to_string(), value));
            } else {
                positional.push(arg);
            }
        }
        Ok(Self { positional, flags })
    }

    fn flag(&self, name: &str) -> Option<&str> {
        self.flags.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    fn usize_flag(&self, name: &str, default: usize) -> anyhow::Result<usize> {
        match self.flag(name) {
            Some(v) => v.parse().with_context(|| format!("--{name} requires a number")),
            None => Ok(default),
        }
    }
}

/// Embedder whose vectors live in the semantic index: the hosted model
/// behind Elasticsearch, or the local encoder for the offline store.
fn semantic_embedder(settings: &Settings) -> anyhow::Result<Arc<dyn Embedder>> {
    match settings.search.backend {
        SearchBackend::Elasticsearch => Ok(Arc::new(RemoteEmbedder::from_settings(&settings.embedding.remote)?)),
        SearchBackend::Local => local_embedder(settings),
    }
}

fn local_embedder(settings: &Settings) -> anyhow::Result<Arc<dyn Embedder>> {
    let embedder = get_default_embedder(settings.embedding.local_model_dir.as_deref(), settings.embedding.max_len)?;
    Ok(Arc::from(embedder))
}

fn build_engine(settings: &Settings) -> anyhow::Result<Engine> {
    let embedder = semantic_embedder(settings)?;
    let (keyword, semantic): (Arc<dyn KeywordSearch>, Arc<dyn SemanticSearch>) = match settings.search.backend {
        SearchBackend::Elasticsearch => {
            let client = Arc::new(ElasticsearchClient::from_settings(&settings.elasticsearch)?);
            let keyword: Arc<dyn KeywordSearch> = client.clone();
            let semantic: Arc<dyn SemanticSearch> = client;
            (keyword, semantic)
        }
        SearchBackend::Local => {
            let tantivy = TantivyIndexer::open(&expand_path(&settings.local.tantivy_index_dir))?;
            let store = PageVectorStore::load(&expand_path(&settings.local.vector_store_path))?;
            if store.embedder_id() != embedder.embedder_id() {
                warn!(store = store.embedder_id(), query = embedder.embedder_id(), "page vectors were built with a different embedder");
            }
            let keyword: Arc<dyn KeywordSearch> = Arc::new(tantivy);
            let semantic: Arc<dyn SemanticSearch> = Arc::new(store);
            (keyword, semantic)
        }
    };
    Ok(HybridSearchEngine::new(keyword, semantic, embedder, settings.search.alpha)?)
}

fn ingest(settings: &Settings, args: &Args) -> anyhow::Result<()> {
    let data_dir = args.positional.first().map(PathBuf::from).unwrap_or_else(|| expand_path(&settings.local.data_dir));
    let loader = match args.flag("limit-files") {
        Some(n) => ReferenceLoader::with_max_files(n.parse().context("--limit-files requires a number")?),
        None => ReferenceLoader::new(),
    };
    let pages = loader.load_dir(&data_dir)?;
    if pages.is_empty() {
        bail!("no reference pages found under {}", data_dir.display());
    }
    info!(pages = pages.len(), dir = %data_dir.display(), "reference pages loaded");

    let tantivy_dir = expand_path(&settings.local.tantivy_index_dir);
    let indexed = TantivyIndexer::create(&tantivy_dir)?.index_pages(&pages)?;
    info!(indexed, dir = %tantivy_dir.display(), "keyword index built");

    let embedder = local_embedder(settings)?;
    let store = PageVectorStore::build(pages, embedder.as_ref())?;
    store.save(&expand_path(&settings.local.vector_store_path))?;
    println!("Ingest complete ({} pages)", store.len());
    Ok(())
}

fn search(settings: &Settings, args: &Args) -> anyhow::Result<()> {
    let query = args.positional.first().context(USAGE)?;
    let top_k = args.usize_flag("top-k", settings.search.top_k)?;
    let engine = build_engine(settings)?;
    let results = engine.hybrid_search(query, top_k)?;
    println!("Found {} results for: \"{}\"", results.len(), query);
    for (i, r) in results.iter().enumerate() {
        println!(
            "\n  {}. final={:.3}  keyword={:.3}  semantic={:.3}  {}",
            i + 1,
            r.final_score,
            r.keyword_score,
            r.semantic_score,
            r.source().citation()
        );
        println!("     {}", r.result.text_preview);
    }
    Ok(())
}

fn ask(settings: &Settings, args: &Args) -> anyhow::Result<()> {
    let query = args.positional.first().context(USAGE)?;
    let top_k = args.usize_flag("top-k", settings.search.top_k)?;
    let defaults = StyleParameters::default();
    let request = AnswerRequest {
        style: StyleParameters {
            tone: args.flag("tone").map(str::to_string).unwrap_or(defaults.tone),
            detail_level: args.flag("detail").map(str::to_string).unwrap_or(defaults.detail_level),
            empathy: args.flag("empathy").map(str::to_string).unwrap_or(defaults.empathy),
            professional_style: args.flag("professional").map(str::to_string).unwrap_or(defaults.professional_style),
        },
        parent_name: args.flag("parent").unwrap_or_default().to_string(),
    };

    let engine = build_engine(settings)?;
    let generation = &settings.generation;
    let detailed = ChatClient::from_settings(&generation.detailed)?;
    let simplifier = SimplifiedAnswerGenerator::new(ChatClient::from_settings(&generation.simple)?)
        .with_temperature(generation.simple.temperature)
        .with_query_analysis(generation.analyze_query)
        .with_example_analysis(generation.analyze_examples);
    let selector = DiversitySelector::from_settings(&settings.corpus, || local_embedder(settings));
    let orchestrator = AnswerOrchestrator::new(detailed, simplifier, selector)
        .with_detailed_temperature(generation.detailed.temperature)
        .with_examples(settings.corpus.top_k, settings.corpus.final_k);

    let outcome = orchestrator.answer(&engine, query, top_k, &request)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let mut raw: Vec<String> = env::args().skip(1).collect();
    if raw.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }
    let cmd = raw.remove(0);
    let args = Args::parse(raw)?;
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let settings = config.settings()?;

    match cmd.as_str() {
        "ingest" => ingest(&settings, &args),
        "search" => search(&settings, &args),
        "ask" => ask(&settings, &args),
        _ => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
    }
}
