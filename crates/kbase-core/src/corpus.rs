//! Knowledge-base loader.
//!
//! Reads the JSON knowledge base (`locations` + `sections`, optionally
//! `category_keywords`) and materializes the positional document collection.
//! Sections come first in artifact order, then locations in array order.

use std::fs;
use std::path::Path;
use std::time::Instant;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::keywords::CategoryKeywords;
use crate::types::{Document, DocumentDetail, DocumentKind, LineRef, LocationFields, SectionFields};

pub const DEFAULT_STORE_LABEL: &str = "Салон ORTOS";

#[derive(Debug, Deserialize)]
struct RawKnowledgeBase {
    #[serde(default)]
    locations: Vec<RawLocation>,
    // Kept as a raw map so iteration follows artifact order (serde_json
    // `preserve_order`).
    #[serde(default)]
    sections: Map<String, Value>,
    #[serde(default)]
    category_keywords: Option<CategoryKeywords>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    title: String,
    content: String,
    #[serde(default)]
    lines: Vec<LineRef>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    city: String,
    address: String,
    #[serde(default)]
    working_hours: String,
    #[serde(default)]
    phones: Vec<String>,
    #[serde(default)]
    full_text: String,
}

/// The loaded corpus: documents in index order plus the keyword table.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    keywords: CategoryKeywords,
}

impl Corpus {
    pub fn new(documents: Vec<Document>, keywords: CategoryKeywords) -> Self {
        Self { documents, keywords }
    }

    /// Load with the default store label.
    pub fn load(path: &Path) -> Result<Self> {
        CorpusLoader::new().load(path)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn keywords(&self) -> &CategoryKeywords {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn count(&self, kind: DocumentKind) -> usize {
        self.documents.iter().filter(|d| d.kind() == kind).count()
    }
}

#[derive(Debug, Clone)]
pub struct CorpusLoader {
    store_label: String,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self { store_label: DEFAULT_STORE_LABEL.to_string() }
    }
}

impl CorpusLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix of the synthesized location sentence (`"<label> <city>. Адрес: ..."`).
    pub fn with_store_label(mut self, label: impl Into<String>) -> Self {
        self.store_label = label.into();
        self
    }

    pub fn load(&self, path: &Path) -> Result<Corpus> {
        if !path.exists() {
            return Err(Error::MissingCorpus(path.to_path_buf()));
        }
        let started = Instant::now();
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::CorpusFormat(format!("{}: {e}", path.display())))?;
        let corpus = self.parse(&raw)?;
        tracing::info!(
            path = %path.display(),
            sections = corpus.count(DocumentKind::Section),
            locations = corpus.count(DocumentKind::Location),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "knowledge base loaded"
        );
        Ok(corpus)
    }

    pub fn parse(&self, raw: &str) -> Result<Corpus> {
        let kb: RawKnowledgeBase =
            serde_json::from_str(raw).map_err(|e| Error::CorpusFormat(e.to_string()))?;

        let mut documents = Vec::with_capacity(kb.sections.len() + kb.locations.len());
        for (i, (key, value)) in kb.sections.into_iter().enumerate() {
            let section: RawSection = serde_json::from_value(value)
                .map_err(|e| Error::CorpusFormat(format!("section '{key}': {e}")))?;
            documents.push(Document {
                id: format!("section_{i}"),
                text: format!("{}. {}", section.title, section.content),
                detail: DocumentDetail::Section(SectionFields {
                    title: section.title,
                    category_key: key,
                    lines: section.lines,
                }),
            });
        }
        for (i, loc) in kb.locations.into_iter().enumerate() {
            documents.push(Document {
                id: format!("location_{i}"),
                text: self.location_sentence(&loc),
                detail: DocumentDetail::Location(LocationFields {
                    city: loc.city,
                    address: loc.address,
                    phones: loc.phones,
                    working_hours: loc.working_hours,
                    full_text: loc.full_text,
                }),
            });
        }

        let keywords = kb.category_keywords.unwrap_or_else(CategoryKeywords::builtin);
        Ok(Corpus { documents, keywords })
    }

    fn location_sentence(&self, loc: &RawLocation) -> String {
        format!(
            "{} {}. Адрес: {}. Часы: {}. Телефоны: {}.",
            self.store_label,
            loc.city,
            loc.address,
            loc.working_hours,
            loc.phones.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_sentence_joins_phones() {
        let kb = r#"{"locations":[{"city":"Брест","address":"ул. Советская, 1","working_hours":"10-19","phones":["+375 1","+375 2"],"full_text":"x"}]}"#;
        let corpus = CorpusLoader::new().with_store_label("Салон").parse(kb).unwrap();
        assert_eq!(
            corpus.documents()[0].text,
            "Салон Брест. Адрес: ул. Советская, 1. Часы: 10-19. Телефоны: +375 1, +375 2."
        );
    }

    #[test]
    fn section_with_wrong_shape_is_a_format_error() {
        let kb = r#"{"sections":{"delivery":{"title":"Доставка"}}}"#;
        let err = CorpusLoader::new().parse(kb).unwrap_err();
        assert!(matches!(err, Error::CorpusFormat(msg) if msg.contains("delivery")));
    }
}
