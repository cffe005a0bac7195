//! Domain types shared by the lexical, semantic and hybrid engines.

use serde::{Deserialize, Serialize};

pub type DocumentId = String;

/// Which source a document was materialized from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Section,
    Location,
}

/// A line reference attached to a knowledge section. The knowledge base mixes
/// numeric line numbers and free-form labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LineRef {
    Number(u64),
    Label(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionFields {
    pub title: String,
    /// Key into the category keyword table. Used for boosting only, never embedded.
    pub category_key: String,
    #[serde(default)]
    pub lines: Vec<LineRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationFields {
    pub city: String,
    pub address: String,
    pub phones: Vec<String>,
    pub working_hours: String,
    /// Long-form description handed to answer generation; not indexed.
    pub full_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentDetail {
    Section(SectionFields),
    Location(LocationFields),
}

/// A retrievable unit of the corpus.
///
/// - `id`: `section_<n>` / `location_<n>`, assigned in corpus order
/// - `text`: the exact string that is embedded and tokenized
/// - `detail`: kind-specific fields
///
/// Documents are positionally aligned with both indices: the document at
/// position `i` owns vector `i` and lexical row `i`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub text: String,
    #[serde(flatten)]
    pub detail: DocumentDetail,
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self.detail {
            DocumentDetail::Section(_) => DocumentKind::Section,
            DocumentDetail::Location(_) => DocumentKind::Location,
        }
    }

    pub fn as_section(&self) -> Option<&SectionFields> {
        match &self.detail {
            DocumentDetail::Section(s) => Some(s),
            DocumentDetail::Location(_) => None,
        }
    }

    pub fn as_location(&self) -> Option<&LocationFields> {
        match &self.detail {
            DocumentDetail::Location(l) => Some(l),
            DocumentDetail::Section(_) => None,
        }
    }
}

/// One ranked search result: the document and its fused, boosted score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<'a> {
    pub document: &'a Document,
    pub score: f32,
}
