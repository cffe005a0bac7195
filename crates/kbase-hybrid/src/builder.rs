//! One lockstep pass over the corpus that fills the semantic and lexical
//! indices together, so row `i` of each always belongs to document `i`.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use kbase_core::error::{Error, Result};
use kbase_core::traits::{Embedder, LexicalScorer, NoLexical};
use kbase_core::types::Document;
use kbase_text::{Bm25Index, Bm25Writer};
use kbase_vector::{l2_normalize, FlatIpIndex};

pub const DEFAULT_BATCH_SIZE: usize = 32;

/// The searchable state of an engine.
pub struct BuiltIndices {
    pub(crate) semantic: FlatIpIndex,
    pub(crate) lexical: Box<dyn LexicalScorer>,
}

impl BuiltIndices {
    pub fn semantic(&self) -> &FlatIpIndex {
        &self.semantic
    }

    pub fn lexical(&self) -> &dyn LexicalScorer {
        self.lexical.as_ref()
    }

    pub fn has_lexical(&self) -> bool {
        self.lexical.is_available()
    }
}

pub struct IndexBuilder<'a> {
    embedder: &'a dyn Embedder,
    batch_size: usize,
    progress: bool,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(embedder: &'a dyn Embedder, batch_size: usize) -> Self {
        Self { embedder, batch_size: batch_size.max(1), progress: true }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn build(&self, documents: &[Document]) -> Result<BuiltIndices> {
        let started = Instant::now();
        let dim = self.embedder.dim();
        let mut semantic = FlatIpIndex::with_capacity(dim, documents.len());
        let mut lexical = match Bm25Writer::new() {
            Ok(w) => Some(w),
            Err(e) => {
                degrade(&e);
                None
            }
        };

        let pb = self.progress_bar(documents.len());
        for batch in documents.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();
            let vectors = self
                .embedder
                .embed_batch(&texts)
                .map_err(|e| Error::EmbeddingUnavailable(format!("{}: {e:#}", self.embedder.model_id())))?;
            if vectors.len() != batch.len() {
                return Err(Error::EmbeddingUnavailable(format!(
                    "{} returned {} vectors for {} texts",
                    self.embedder.model_id(),
                    vectors.len(),
                    batch.len()
                )));
            }

            for (doc, mut vector) in batch.iter().zip(vectors) {
                if vector.len() != dim {
                    return Err(Error::EmbeddingUnavailable(format!(
                        "{} produced {} components for {}, expected {dim}",
                        self.embedder.model_id(),
                        vector.len(),
                        doc.id
                    )));
                }
                l2_normalize(&mut vector);
                semantic.add(&vector).map_err(|e| Error::EmbeddingUnavailable(format!("{e:#}")))?;

                let failed = lexical.as_mut().and_then(|w| w.add(&doc.text).err());
                if let Some(e) = failed {
                    degrade(&e);
                    lexical = None;
                }
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();

        let lexical: Box<dyn LexicalScorer> = match lexical.map(Bm25Writer::finish) {
            Some(Ok(index)) => Box::new(index),
            Some(Err(e)) => {
                degrade(&e);
                Box::new(NoLexical)
            }
            None => Box::new(NoLexical),
        };

        tracing::info!(
            documents = documents.len(),
            dim,
            model = self.embedder.model_id(),
            max_tokens = self.embedder.max_len(),
            lexical = lexical.is_available(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "indices built"
        );
        Ok(BuiltIndices { semantic, lexical })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("embedding");
        pb
    }
}

/// Lexical index over `documents` alone, used when the semantic index comes
/// from disk. Falls back to `NoLexical` on failure.
pub fn rebuild_lexical(documents: &[Document]) -> Box<dyn LexicalScorer> {
    let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
    match Bm25Index::build(&texts) {
        Ok(index) => Box::new(index),
        Err(e) => {
            degrade(&e);
            Box::new(NoLexical)
        }
    }
}

fn degrade(e: &anyhow::Error) {
    let err = Error::LexicalUnavailable(format!("{e:#}"));
    tracing::warn!(error = %err, "continuing with semantic scoring only");
}
