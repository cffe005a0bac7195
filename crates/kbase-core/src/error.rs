use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Knowledge base not found: {}", .0.display())]
    MissingCorpus(PathBuf),

    #[error("Malformed knowledge base: {0}")]
    CorpusFormat(String),

    #[error("Embedding model unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Lexical index unavailable: {0}")]
    LexicalUnavailable(String),

    #[error("Search indices are not initialized")]
    NotInitialized,

    #[error("Failed to read persisted index: {0}")]
    PersistenceRead(String),

    #[error("Failed to write persisted index: {0}")]
    PersistenceWrite(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
