/// Text → dense vector capability. Implementations must return vectors of
/// exactly `dim()` components for a given `model_id()`.
pub trait Embedder: Send + Sync {
    /// Stable identifier of the model, persisted in index metadata.
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

/// Per-document lexical relevance. `scores` returns one raw score per
/// document, in document order; documents that do not match score `0.0`.
pub trait LexicalScorer: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }
    fn scores(&self, query_tokens: &[String]) -> anyhow::Result<Vec<f32>>;
}

/// Stand-in used when no lexical index could be built.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLexical;

impl LexicalScorer for NoLexical {
    fn is_available(&self) -> bool {
        false
    }

    fn scores(&self, _query_tokens: &[String]) -> anyhow::Result<Vec<f32>> {
        Ok(Vec::new())
    }
}

/// Lowercase + whitespace split. Documents and queries must go through the
/// same function so lexical terms line up.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
