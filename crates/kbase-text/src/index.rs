use anyhow::Result;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, Searcher};

use kbase_core::traits::tokenize;

use crate::tantivy_utils::{build_schema, register_tokenizer, Bm25Fields};

const WRITER_MEMORY_BYTES: usize = 50_000_000;

/// Append-only writer. Documents must be added in corpus order; the n-th
/// `add` becomes row `n`.
pub struct Bm25Writer {
	index: Index,
	writer: IndexWriter,
	fields: Bm25Fields,
	next_position: u64,
}

impl Bm25Writer {
	pub fn new() -> Result<Self> {
		let (schema, fields) = build_schema();
		let index = Index::create_in_ram(schema);
		register_tokenizer(&index);
		let writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
		Ok(Self { index, writer, fields, next_position: 0 })
	}

	pub fn add(&mut self, text: &str) -> Result<()> {
		// Pre-tokenize so the stored terms are exactly what `tokenize` yields for queries.
		let body = tokenize(text).join(" ");
		self.writer.add_document(doc!(
			self.fields.position => self.next_position,
			self.fields.body => body,
		))?;
		self.next_position += 1;
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.next_position as usize
	}

	pub fn is_empty(&self) -> bool {
		self.next_position == 0
	}

	pub fn finish(mut self) -> Result<Bm25Index> {
		self.writer.commit()?;
		let reader: IndexReader = self.index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		let searcher = reader.searcher();
		tracing::debug!(documents = self.next_position, segments = searcher.segment_readers().len(), "bm25 index committed");
		Ok(Bm25Index { searcher, fields: self.fields, len: self.next_position as usize })
	}
}

/// Read-only BM25 index over the corpus.
pub struct Bm25Index {
	pub(crate) searcher: Searcher,
	pub(crate) fields: Bm25Fields,
	pub(crate) len: usize,
}

impl Bm25Index {
	/// Index `texts` in order.
	pub fn build<S: AsRef<str>>(texts: &[S]) -> Result<Self> {
		let mut writer = Bm25Writer::new()?;
		for t in texts { writer.add(t.as_ref())?; }
		writer.finish()
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}
}
