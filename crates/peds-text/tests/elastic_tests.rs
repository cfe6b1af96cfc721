use std::time::Duration;

use peds_core::traits::{KeywordSearch, SemanticSearch};
use peds_text::elastic::parse_hit_source;
use peds_text::ElasticsearchClient;
use serde_json::json;

#[test]
fn keyword_query_matches_original_text_with_or() {
    let body = ElasticsearchClient::keyword_query("fever in infant", 10);
    assert_eq!(body["size"], 10);
    assert_eq!(body["query"]["match"]["original_text"]["operator"], "or");
    assert_eq!(body["query"]["match"]["original_text"]["query"], "fever in infant");
}

#[test]
fn semantic_query_uses_shifted_cosine_script() {
    let body = ElasticsearchClient::semantic_query(&[0.5, 0.25], 4);
    let script = &body["query"]["script_score"]["script"];
    assert_eq!(script["source"], "cosineSimilarity(params.query_vector, 'embedding') + 1.0");
    assert_eq!(script["params"]["query_vector"], json!([0.5, 0.25]));
    assert!(body["query"]["script_score"]["query"]["match_all"].is_object());
}

#[test]
fn hit_source_parsing_tolerates_missing_and_stringly_fields() {
    let hit = parse_hit_source(
        2.5,
        &json!({
            "source": {"title": "Nutrition", "page_number": "7"},
            "original_text": "Iron-rich foods",
            "relationships": [{"subject": "iron", "predicate": "prevents", "object": "anemia"}, {"subject": "zinc"}]
        }),
    );
    assert_eq!(hit.source_title.as_deref(), Some("Nutrition"));
    assert_eq!(hit.source_page, Some(7));
    assert_eq!(hit.relationships.len(), 2);
    assert_eq!(hit.relationships[1].predicate, "N/A");

    let bare = parse_hit_source(1.0, &json!({}));
    assert_eq!(bare.source().key(), "Unknown_0");
    assert!(bare.text.is_empty());
}

#[test]
fn unreachable_engine_is_upstream_unavailable() {
    let client = ElasticsearchClient::new("http://127.0.0.1:9", "ped", None, Duration::from_millis(500)).unwrap();
    assert!(client.keyword_search("fever", 3).unwrap_err().is_external());
    assert!(client.semantic_search(&[0.1, 0.2], 3).unwrap_err().is_external());
}
