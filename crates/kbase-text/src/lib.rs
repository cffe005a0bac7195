//! kbase-text
//!
//! BM25 lexical scoring over the knowledge-base documents, backed by an
//! in-RAM Tantivy index. Rows are keyed by document position so scores line
//! up with the semantic index.

pub mod tantivy_utils;
pub mod index;
pub mod score;

pub use index::{Bm25Index, Bm25Writer};
