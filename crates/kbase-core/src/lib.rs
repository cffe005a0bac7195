//! kbase-core
//!
//! Document model, knowledge-base loader, category keyword table, error
//! taxonomy and the capability traits shared by the index crates.

pub mod config;
pub mod corpus;
pub mod error;
pub mod keywords;
pub mod traits;
pub mod types;

pub use corpus::{Corpus, CorpusLoader};
pub use error::{Error, Result};
pub use keywords::CategoryKeywords;
pub use traits::{tokenize, Embedder, LexicalScorer, NoLexical};
pub use types::{Document, DocumentDetail, DocumentKind, SearchHit};
