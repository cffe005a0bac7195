use std::path::Path;

use kbase_core::config::RetrievalSettings;
use kbase_core::traits::Embedder;
use kbase_embed::{default_embedder, HashEmbedder};

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn hash_embedder_shapes_and_determinism() {
    let embedder = HashEmbedder::new(256);
    let texts = vec!["Доставка и самовывоз".to_string(), "Доставка и самовывоз".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 256);
    assert_eq!(embedder.dim(), 256);
    assert_eq!(embedder.model_id(), "hash-xxh64-d256");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn shared_tokens_are_more_similar() {
    let e = HashEmbedder::new(4096);
    let q = e.embed("доставка самовывоз").unwrap();
    let near = e.embed("самовывоз со склада").unwrap();
    let far = e.embed("салон в гродно").unwrap();
    assert!(cosine(&q, &near) > cosine(&q, &far));
}

#[test]
fn empty_text_is_a_zero_vector() {
    let e = HashEmbedder::new(8);
    assert!(e.embed("   ").unwrap().iter().all(|x| *x == 0.0));
}

#[test]
fn settings_flag_selects_hash_embedder() {
    let settings = RetrievalSettings { use_fake_embeddings: true, fake_dim: 64, ..RetrievalSettings::default() };
    let embedder = default_embedder(&settings, Path::new(".")).expect("embedder");
    assert_eq!(embedder.dim(), 64);
    assert!(embedder.model_id().starts_with("hash-"));
}
