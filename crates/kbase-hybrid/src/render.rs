//! Plain-text views of search hits for prompt context and source lists.

use kbase_core::types::{DocumentDetail, SearchHit};

/// Hits included in an answer-generation context.
pub const CONTEXT_LIMIT: usize = 5;
/// Hits listed under the sources header.
pub const SOURCES_LIMIT: usize = 3;

const SOURCES_HEADER: &str = "🔎 Источники поиска:";

/// One block per hit, blank-line separated: `[РАЗДЕЛ: title]` with the section
/// text, or `[САЛОН: city]` with the location's long description.
pub fn render_context(hits: &[SearchHit<'_>], limit: usize) -> String {
    hits.iter()
        .take(limit)
        .map(|hit| match &hit.document.detail {
            DocumentDetail::Section(s) => format!("[РАЗДЕЛ: {}]\n{}", s.title, hit.document.text),
            DocumentDetail::Location(l) => {
                // Empty `full_text` falls back to the address rather than an empty block.
                let body = if l.full_text.is_empty() { &l.address } else { &l.full_text };
                format!("[САЛОН: {}]\n{}", l.city, body)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Bulleted source list with two-decimal scores; empty when there are no hits.
pub fn render_sources(hits: &[SearchHit<'_>], limit: usize) -> String {
    if hits.is_empty() {
        return String::new();
    }
    let mut lines = vec![SOURCES_HEADER.to_string()];
    for hit in hits.iter().take(limit) {
        lines.push(match &hit.document.detail {
            DocumentDetail::Section(s) => format!("• {} (score {:.2})", s.title, hit.score),
            DocumentDetail::Location(l) => format!("• {} — {} (score {:.2})", l.city, l.address, hit.score),
        });
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbase_core::types::{Document, LocationFields, SectionFields};

    fn docs() -> Vec<Document> {
        vec![
            Document {
                id: "section_0".into(),
                text: "Доставка. Курьером по городу".into(),
                detail: DocumentDetail::Section(SectionFields {
                    title: "Доставка".into(),
                    category_key: "delivery".into(),
                    lines: vec![],
                }),
            },
            Document {
                id: "location_0".into(),
                text: "Салон ORTOS Гродно. Адрес: ул. Горького, 5.".into(),
                detail: DocumentDetail::Location(LocationFields {
                    city: "Гродно".into(),
                    address: "ул. Горького, 5".into(),
                    phones: vec![],
                    working_hours: String::new(),
                    full_text: String::new(),
                }),
            },
        ]
    }

    #[test]
    fn context_blocks() {
        let docs = docs();
        let hits = vec![
            SearchHit { document: &docs[0], score: 0.9 },
            SearchHit { document: &docs[1], score: 0.5 },
        ];
        assert_eq!(
            render_context(&hits, CONTEXT_LIMIT),
            "[РАЗДЕЛ: Доставка]\nДоставка. Курьером по городу\n\n[САЛОН: Гродно]\nул. Горького, 5"
        );
        assert_eq!(render_context(&hits, 1), "[РАЗДЕЛ: Доставка]\nДоставка. Курьером по городу");
    }

    #[test]
    fn sources_list() {
        let docs = docs();
        let hits = vec![
            SearchHit { document: &docs[0], score: 0.874 },
            SearchHit { document: &docs[1], score: 0.5 },
        ];
        assert_eq!(
            render_sources(&hits, SOURCES_LIMIT),
            "🔎 Источники поиска:\n• Доставка (score 0.87)\n• Гродно — ул. Горького, 5 (score 0.50)"
        );
        assert_eq!(render_sources(&[], SOURCES_LIMIT), "");
    }
}
