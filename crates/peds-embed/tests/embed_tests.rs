use peds_core::traits::Embedder;
use peds_embed::{get_default_embedder, FakeEmbedder, RemoteEmbedder, FAKE_DIM};
use std::time::Duration;

#[test]
fn fake_embedder_shapes_and_determinism() {
    // Force fake embedder to avoid loading model files
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");

    let embedder = get_default_embedder(None, 128).expect("embedder");
    let texts = vec!["fever in infant".to_string(), "fever in infant".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), FAKE_DIM);
    assert_eq!(embedder.dim(), FAKE_DIM);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_single_text_matches_batch() {
    let embedder = FakeEmbedder::new(64);
    let one = embedder.embed("cough at night").unwrap();
    let batch = embedder.embed_batch(&["cough at night".to_string()]).unwrap();
    assert_eq!(one, batch[0]);
    assert!(embedder.embedder_id().starts_with("fake:"));
}

#[test]
fn remote_embedder_unreachable_is_upstream_error() {
    // Port 9 (discard) on localhost is not an HTTP server.
    let embedder = RemoteEmbedder::new("http://127.0.0.1:9", "text-embedding-ada-002", "key", 1536, Duration::from_millis(500)).unwrap();
    let err = embedder.embed_batch(&["hello".to_string()]).unwrap_err();
    assert!(err.is_external(), "got {err:?}");
}
