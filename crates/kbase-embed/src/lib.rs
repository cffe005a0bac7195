//! kbase-embed
//!
//! Embedding capability for the knowledge base: a candle XLM-RoBERTa sentence
//! encoder with masked mean pooling, and a deterministic hashing embedder.
//! `default_embedder` chooses between them from settings and the environment.

pub mod device;
pub mod hashing;
pub mod model;
pub mod pool;
pub mod tokenize;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kbase_core::config::RetrievalSettings;
use kbase_core::error::{Error, Result};
use kbase_core::traits::Embedder;

pub use hashing::HashEmbedder;
pub use model::SentenceEncoder;
pub use pool::masked_mean_l2;

/// `APP_USE_FAKE_EMBEDDINGS=1` (or `use_fake_embeddings = true`) selects the
/// hashing embedder; otherwise the model is loaded from disk.
pub fn default_embedder(settings: &RetrievalSettings, base: &Path) -> Result<Arc<dyn Embedder>> {
    let env_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if env_fake || settings.use_fake_embeddings {
        tracing::warn!(dim = settings.fake_dim, "using HashEmbedder, results are lexical-only quality");
        return Ok(Arc::new(HashEmbedder::new(settings.fake_dim)));
    }
    let dir = resolve_model_dir(settings, base)?;
    let encoder = SentenceEncoder::load(&dir, &settings.model_name)
        .map_err(|e| Error::EmbeddingUnavailable(format!("{}: {e:#}", settings.model_name)))?;
    Ok(Arc::new(encoder))
}

fn resolve_model_dir(settings: &RetrievalSettings, base: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = settings.model_dir(base) { candidates.push(dir); }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) { candidates.push(PathBuf::from(dir)); }
    }
    let short_name = settings.model_name.rsplit('/').next().unwrap_or(&settings.model_name);
    candidates.push(base.join("models").join(short_name));

    for dir in &candidates {
        if dir.join("tokenizer.json").exists() {
            tracing::debug!(dir = %dir.display(), "using model dir");
            return Ok(dir.clone());
        }
    }
    Err(Error::EmbeddingUnavailable(format!(
        "could not locate model directory for {} (tried {:?})",
        settings.model_name, candidates
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_dir_is_embedding_unavailable() {
        let tmp = std::env::temp_dir().join("kbase-embed-no-model");
        let settings = RetrievalSettings {
            model_dir: Some(tmp.join("absent").to_string_lossy().into_owned()),
            model_name: "org/definitely-not-here".into(),
            ..RetrievalSettings::default()
        };
        match resolve_model_dir(&settings, &tmp) {
            Err(Error::EmbeddingUnavailable(msg)) => assert!(msg.contains("definitely-not-here")),
            other => panic!("unexpected: {:?}", other.map(|p| p.display().to_string())),
        }
    }
}
