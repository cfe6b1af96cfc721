//! peds-answer
//!
//! Turns fused retrieval results into the payload handed back to the chat
//! layer: cited evidence, a detailed styled answer, and a simplified answer
//! grounded in real conversations.

pub mod conversation;
pub mod llm;
pub mod prompt;
pub mod simple;

pub use conversation::ConversationStudy;
pub use llm::ChatClient;
pub use prompt::{Evidence, TextSnippet};
pub use simple::SimplifiedAnswerGenerator;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{error, info, warn};

use peds_core::error::Result;
use peds_core::traits::{Generator, KeywordSearch, SemanticSearch};
use peds_core::types::{FusedResult, Relationship};
use peds_hybrid::HybridSearchEngine;
use peds_style::StyleParameters;
use peds_vector::DiversitySelector;

pub const DETAILED_ERROR: &str = "Error generating analysis. Please try again.";
pub const SIMPLE_ERROR: &str = "Error generating simplified analysis based on real conversations.";
pub const DETAILED_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerRequest {
    pub style: StyleParameters,
    pub parent_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisMetadata {
    pub num_results: usize,
    pub num_sources: usize,
    pub style_parameters: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub text_content: Vec<TextSnippet>,
    pub sources: Vec<String>,
    pub analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple_analysis: Option<String>,
    pub metadata: AnalysisMetadata,
    pub relationships: Vec<Relationship>,
}

/// Relationship triples of all results, deduplicated, first-seen order.
pub fn flatten_relationships(results: &[FusedResult]) -> Vec<Relationship> {
    let mut seen = HashSet::new();
    results
        .iter()
        .flat_map(|r| r.result.relationships.iter())
        .filter(|rel| seen.insert(rel.key()))
        .cloned()
        .collect()
}

pub struct AnswerOrchestrator<D: Generator, S: Generator> {
    detailed: D,
    detailed_temperature: f32,
    simplifier: SimplifiedAnswerGenerator<S>,
    selector: DiversitySelector,
    example_top_k: usize,
    example_final_k: usize,
}

impl<D: Generator, S: Generator> AnswerOrchestrator<D, S> {
    pub fn new(detailed: D, simplifier: SimplifiedAnswerGenerator<S>, selector: DiversitySelector) -> Self {
        Self { detailed, detailed_temperature: DETAILED_TEMPERATURE, simplifier, selector, example_top_k: 5, example_final_k: 3 }
    }

    pub fn with_detailed_temperature(mut self, temperature: f32) -> Self {
        self.detailed_temperature = temperature;
        self
    }

    pub fn with_examples(mut self, top_k: usize, final_k: usize) -> Self {
        self.example_top_k = top_k;
        self.example_final_k = final_k;
        self
    }

    /// Build the answer payload for already-retrieved results.
    ///
    /// Only an invalid style selection fails the call; generation failures
    /// are reported through the placeholder texts.
    pub fn process_search_results(&self, results: &[FusedResult], query: &str, request: &AnswerRequest) -> Result<AnalysisOutcome> {
        let profile = request.style.resolve()?;
        let evidence = Evidence::from_results(results);
        let parent_name = request.parent_name.trim();
        info!(results = results.len(), sources = evidence.sources.len(), parent = parent_name, "processing search results");

        let messages = prompt::detailed_messages(&profile, parent_name, query, &evidence);
        let detailed = self.detailed.generate(&messages, self.detailed_temperature).and_then(|text| {
            if text.trim().is_empty() {
                Err(peds_core::error::Error::Generation("empty detailed answer".into()))
            } else {
                Ok(text)
            }
        });

        let (analysis, simple_analysis) = match detailed {
            Ok(text) => {
                let simple = self.simplified(query, &text, parent_name);
                (text, Some(simple))
            }
            Err(e) => {
                error!(error = %e, "detailed answer generation failed");
                (DETAILED_ERROR.to_string(), None)
            }
        };

        Ok(AnalysisOutcome {
            metadata: AnalysisMetadata {
                num_results: results.len(),
                num_sources: evidence.sources.len(),
                style_parameters: profile.parameters().into_iter().collect(),
                parent_name: (!parent_name.is_empty()).then(|| parent_name.to_string()),
            },
            relationships: flatten_relationships(results),
            text_content: evidence.text_content,
            sources: evidence.sources,
            analysis,
            simple_analysis,
        })
    }

    fn simplified(&self, query: &str, detailed: &str, parent_name: &str) -> String {
        let attempt = self
            .selector
            .select(query, self.example_top_k, self.example_final_k)
            .and_then(|examples| {
                if examples.is_empty() {
                    warn!("no conversation examples; simplifying from the detailed answer alone");
                }
                self.simplifier.generate(query, detailed, &examples, parent_name)
            });
        match attempt {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "simplified answer generation failed");
                SIMPLE_ERROR.to_string()
            }
        }
    }

    /// Retrieve with `engine`, then answer. Retrieval failures are returned
    /// as errors; nothing is generated from partial evidence.
    pub fn answer<K, V>(&self, engine: &HybridSearchEngine<K, V>, query: &str, top_k: usize, request: &AnswerRequest) -> Result<AnalysisOutcome>
    where
        K: KeywordSearch,
        V: SemanticSearch,
    {
        let results = engine.hybrid_search(query, top_k)?;
        self.process_search_results(&results, query, request)
    }
}
