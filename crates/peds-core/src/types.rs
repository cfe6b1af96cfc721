//! Domain types shared by the retrieval, fusion and answer crates.

use serde::{Deserialize, Serialize};

/// Title used when a hit carries no source title.
pub const UNKNOWN_TITLE: &str = "Unknown";
/// Placeholder for a relationship field the engine left empty.
pub const MISSING_FIELD: &str = "N/A";

/// A `(subject, predicate, object)` triple attached to a reference page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default = "missing_field")]
    pub subject: String,
    #[serde(default = "missing_field")]
    pub predicate: String,
    #[serde(default = "missing_field")]
    pub object: String,
}

fn missing_field() -> String {
    MISSING_FIELD.to_string()
}

impl Relationship {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: impl Into<String>) -> Self {
        Self { subject: subject.into(), predicate: predicate.into(), object: object.into() }
    }

    /// Normalized identity used for de-duplication.
    pub fn key(&self) -> (String, String, String) {
        (self.subject.clone(), self.predicate.clone(), self.object.clone())
    }
}

/// Where a piece of evidence came from: document title and page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub page_number: i64,
}

impl SourceRef {
    pub fn new(title: impl Into<String>, page_number: i64) -> Self {
        Self { title: title.into(), page_number }
    }

    /// Grouping identity, `"{title}_{page}"`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.title, self.page_number)
    }

    /// Inline citation text, `"{title} (Page {page})"`.
    pub fn citation(&self) -> String {
        format!("{} (Page {})", self.title, self.page_number)
    }
}

/// One raw engine result.
///
/// `score` is engine-specific but higher is always better. Title and page are
/// optional because the engine may return documents without source metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub score: f32,
    pub source_title: Option<String>,
    pub source_page: Option<i64>,
    pub text: String,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl SearchHit {
    /// Source with the documented defaults applied.
    pub fn source(&self) -> SourceRef {
        SourceRef {
            title: self.source_title.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            page_number: self.source_page.unwrap_or(0),
        }
    }
}

/// One record per unique source key within a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedResult {
    pub score: f32,
    pub source: SourceRef,
    pub text_preview: String,
    pub full_text: String,
    pub relationships: Vec<Relationship>,
}

/// A grouped result with its min-max normalized score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    #[serde(flatten)]
    pub result: GroupedResult,
    pub normalized_score: f32,
}

/// A result after blending both channels.
///
/// `keyword_score` and `semantic_score` are the normalized per-channel scores,
/// 0.0 when the channel did not return this source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    #[serde(flatten)]
    pub result: GroupedResult,
    pub keyword_score: f32,
    pub semantic_score: f32,
    pub final_score: f32,
}

impl FusedResult {
    pub fn source(&self) -> &SourceRef {
        &self.result.source
    }
}

/// A page of reference literature as stored in the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePage {
    pub title: String,
    pub page_number: i64,
    pub original_text: String,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl ReferencePage {
    pub fn source(&self) -> SourceRef {
        SourceRef::new(self.title.clone(), self.page_number)
    }
}

/// A real parent/doctor exchange used to illustrate the simplified answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationExample {
    pub question: String,
    pub answer: String,
    pub embedding_index: usize,
}

/// Role of a message sent to a generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged block of a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_source_defaults() {
        let hit = SearchHit { score: 1.0, source_title: None, source_page: None, text: String::new(), relationships: vec![] };
        let source = hit.source();
        assert_eq!(source.key(), "Unknown_0");
        assert_eq!(source.citation(), "Unknown (Page 0)");
    }

    #[test]
    fn relationship_fields_default_when_missing() {
        let rel: Relationship = serde_json::from_str(r#"{"subject":"fever"}"#).unwrap();
        assert_eq!(rel, Relationship::new("fever", "N/A", "N/A"));
    }
}
