use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED};
use tantivy::tokenizer::{LowerCaser, TextAnalyzer, WhitespaceTokenizer};
use tantivy::Index;

pub const TOKENIZER_NAME: &str = "kb_whitespace";

pub struct Bm25Fields {
	pub position: Field,
	pub body: Field,
}

pub fn build_schema() -> (Schema, Bm25Fields) {
	let mut schema_builder = Schema::builder();
	let position = schema_builder.add_u64_field("position", STORED);
	// BM25 needs term frequencies and field norms; positions are not used.
	let body_indexing = TextFieldIndexing::default().set_tokenizer(TOKENIZER_NAME).set_index_option(IndexRecordOption::WithFreqs);
	let body = schema_builder.add_text_field("body", TextOptions::default().set_indexing_options(body_indexing));
	(schema_builder.build(), Bm25Fields { position, body })
}

/// Whitespace split + lowercase, matching `kbase_core::tokenize`. No stop
/// words or stemming.
pub fn register_tokenizer(index: &Index) {
	let tokenizer = TextAnalyzer::builder(WhitespaceTokenizer::default())
		.filter(LowerCaser)
		.build();
	index.tokenizers().register(TOKENIZER_NAME, tokenizer);
}
