use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use kbase_core::config::RetrievalSettings;
use kbase_core::corpus::{Corpus, CorpusLoader};
use kbase_core::error::{Error, Result};
use kbase_core::traits::{tokenize, Embedder};
use kbase_core::types::{Document, DocumentKind, SearchHit};
use kbase_vector::{l2_normalize, read_index, write_index, IndexDir, IndexMetadata};

use crate::builder::{rebuild_lexical, BuiltIndices, IndexBuilder, DEFAULT_BATCH_SIZE};
use crate::fusion::{CandidateSet, CANDIDATE_MULTIPLIER};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MIN_SCORE: f32 = 0.30;
/// Result count used when gathering context for answer generation.
pub const ANSWER_TOP_K: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub top_k: usize,
    pub min_score: f32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K, min_score: DEFAULT_MIN_SCORE }
    }
}

impl SearchParams {
    pub fn answer() -> Self {
        Self { top_k: ANSWER_TOP_K, ..Self::default() }
    }
}

impl From<&RetrievalSettings> for SearchParams {
    fn from(s: &RetrievalSettings) -> Self {
        Self { top_k: s.top_k, min_score: s.min_score }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStats {
    pub total_documents: usize,
    pub total_locations: usize,
    pub total_sections: usize,
    pub embedding_dim: usize,
    pub model_name: String,
    pub has_semantic_index: bool,
    pub has_lexical_index: bool,
}

/// Hybrid semantic + BM25 retrieval over one corpus.
///
/// An engine starts empty; `build` or a successful `load` makes it
/// searchable. After that it is read-only and can be shared behind an `Arc`.
pub struct HybridEngine {
    corpus: Corpus,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    progress: bool,
    state: Option<BuiltIndices>,
}

impl HybridEngine {
    pub fn new(corpus: Corpus, embedder: Arc<dyn Embedder>) -> Self {
        Self { corpus, embedder, batch_size: DEFAULT_BATCH_SIZE, progress: true, state: None }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Show an indicatif bar while building.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Load persisted indices from `index_dir`, or build and persist them.
    /// A failed save is logged; the freshly built engine is returned anyway.
    pub fn open_or_build(corpus: Corpus, embedder: Arc<dyn Embedder>, index_dir: &Path) -> Result<Self> {
        Self::new(corpus, embedder).into_ready(index_dir)
    }

    /// Corpus, embedder and index location all taken from settings; relative
    /// paths resolve against `base`.
    pub fn from_settings(settings: &RetrievalSettings, base: &Path) -> Result<Self> {
        let corpus = CorpusLoader::new()
            .with_store_label(settings.store_label.clone())
            .load(&settings.knowledge_base_path(base))?;
        let embedder = kbase_embed::default_embedder(settings, base)?;
        Self::new(corpus, embedder)
            .with_batch_size(settings.batch_size)
            .into_ready(&settings.index_dir(base))
    }

    fn into_ready(mut self, index_dir: &Path) -> Result<Self> {
        if self.load(index_dir) {
            return Ok(self);
        }
        self.build()?;
        if let Err(e) = self.save(index_dir) {
            tracing::warn!(error = %e, dir = %index_dir.display(), "index not persisted, will rebuild next start");
        }
        Ok(self)
    }

    pub fn build(&mut self) -> Result<()> {
        let built = IndexBuilder::new(self.embedder.as_ref(), self.batch_size)
            .with_progress(self.progress)
            .build(self.corpus.documents())?;
        self.state = Some(built);
        Ok(())
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let state = self.state.as_ref().ok_or(Error::NotInitialized)?;
        let dir = IndexDir::new(dir);
        std::fs::create_dir_all(dir.root())
            .map_err(|e| Error::PersistenceWrite(format!("{}: {e}", dir.root().display())))?;
        write_index(state.semantic(), &dir.index_path()).map_err(|e| Error::PersistenceWrite(format!("{e:#}")))?;

        let meta = IndexMetadata {
            model_name: self.embedder.model_id().to_string(),
            embedding_dim: state.semantic().dim(),
            total_documents: self.corpus.len(),
            has_lexical: state.has_lexical(),
        };
        meta.write(&dir.metadata_path()).map_err(|e| Error::PersistenceWrite(format!("{e:#}")))?;
        tracing::info!(dir = %dir.root().display(), documents = meta.total_documents, "indices saved");
        Ok(())
    }

    /// Restore the semantic index from `dir` and rebuild the lexical index
    /// from the current corpus. Returns `false`, leaving the engine as it was,
    /// when nothing usable is on disk.
    pub fn load(&mut self, dir: &Path) -> bool {
        let started = Instant::now();
        let dir = IndexDir::new(dir);
        if !dir.is_complete() {
            tracing::debug!(dir = %dir.root().display(), "no persisted indices");
            return false;
        }
        let semantic = match read_index(&dir.index_path()) {
            Ok(index) => index,
            Err(e) => {
                let err = Error::PersistenceRead(format!("{e:#}"));
                tracing::warn!(error = %err, "ignoring persisted indices");
                return false;
            }
        };
        if semantic.dim() != self.embedder.dim() || semantic.len() != self.corpus.len() {
            tracing::warn!(
                dim = semantic.dim(),
                expected_dim = self.embedder.dim(),
                rows = semantic.len(),
                documents = self.corpus.len(),
                "persisted index does not match corpus or embedder"
            );
            return false;
        }
        match IndexMetadata::read(&dir.metadata_path()) {
            Ok(meta) if meta.model_name != self.embedder.model_id() => {
                tracing::warn!(saved = %meta.model_name, current = self.embedder.model_id(), "index was built with a different model");
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %format!("{e:#}"), "metadata unreadable"),
        }

        let lexical = rebuild_lexical(self.corpus.documents());
        self.state = Some(BuiltIndices { semantic, lexical });
        tracing::info!(
            dir = %dir.root().display(),
            documents = self.corpus.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "indices loaded"
        );
        true
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_some()
    }

    pub fn search_with(&self, query: &str, params: &SearchParams) -> Result<Vec<SearchHit<'_>>> {
        self.search(query, params.top_k, params.min_score)
    }

    /// Ranked hits for `query`, best first. Errors only with
    /// `NotInitialized`; any other failure yields an empty result.
    pub fn search(&self, query: &str, top_k: usize, min_score: f32) -> Result<Vec<SearchHit<'_>>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let state = self.state.as_ref().ok_or(Error::NotInitialized)?;
        let documents = self.corpus.documents();

        let mut query_vec = match self.embedder.embed(query) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "query embedding failed");
                return Ok(Vec::new());
            }
        };
        l2_normalize(&mut query_vec);
        let k = top_k.saturating_mul(CANDIDATE_MULTIPLIER).min(documents.len());
        let neighbors = match state.semantic().search(&query_vec, k) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "semantic search failed");
                return Ok(Vec::new());
            }
        };
        let mut candidates = CandidateSet::from_semantic(&neighbors);

        if state.has_lexical() {
            match state.lexical().scores(&tokenize(query)) {
                Ok(raw) => candidates.fuse_lexical(&raw),
                Err(e) => tracing::warn!(error = %format!("{e:#}"), "lexical scoring failed, semantic only"),
            }
        }

        candidates.apply_boost(documents, self.corpus.keywords(), &query.to_lowercase());
        let considered = candidates.len();
        let hits: Vec<SearchHit<'_>> = candidates
            .select(top_k, min_score)
            .into_iter()
            .filter_map(|c| documents.get(c.position).map(|document| SearchHit { document, score: c.score }))
            .collect();
        tracing::debug!(query, candidates = considered, returned = hits.len(), "search");
        Ok(hits)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            total_documents: self.corpus.len(),
            total_locations: self.corpus.count(DocumentKind::Location),
            total_sections: self.corpus.count(DocumentKind::Section),
            embedding_dim: self.embedder.dim(),
            model_name: self.embedder.model_id().to_string(),
            has_semantic_index: self.state.is_some(),
            has_lexical_index: self.state.as_ref().is_some_and(BuiltIndices::has_lexical),
        }
    }

    pub fn documents(&self) -> &[Document] {
        self.corpus.documents()
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }
}
